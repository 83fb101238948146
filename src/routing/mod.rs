//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at server construction):
//!     service FQN + (method name, handler) pairs
//!     → builder collects handlers
//!     → Freeze as immutable ServiceRouter
//!
//! Incoming Request (path):
//!     → router.rs (exact prefix + method-name lookup)
//!     → Return: handler or explicit no-match
//! ```
//!
//! # Design Decisions
//! - Table built once, immutable at runtime (lock-free concurrent lookups)
//! - Exact, case-sensitive path match (one POST endpoint per method)
//! - Explicit `None` on miss rather than a silent default handler

pub mod router;

pub use router::{handler_fn, RpcHandler, ServiceRouter, ServiceRouterBuilder};
