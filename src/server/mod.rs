//! Server-side protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, bind)
//!     → dispatcher.rs (method/content-type checks, route lookup,
//!       body buffering, handler invocation)
//!     → response framing (payload on success, JSON envelope on failure)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod server;

pub use server::TwirpServer;
