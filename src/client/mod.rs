//! Client-side RPC transport subsystem.
//!
//! # Data Flow
//! ```text
//! Typed call (generated stub)
//!     → transport.rs (POST to <prefix><Method>, proto or JSON body)
//!     → 200: raw bytes (proto) / recased JSON value (json.rs)
//!     → non-200: decode the error envelope, fall back to
//!       intermediary-status classification
//! ```

pub mod json;
pub mod transport;

pub use transport::{ClientError, TwirpClient, TwirpClientConfig};
