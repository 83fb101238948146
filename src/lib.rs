//! Twirp protocol runtime: shared server and client plumbing for
//! RPC-over-HTTP with binary or JSON payloads and a fixed JSON error
//! envelope.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ──▶ client::TwirpClient ──HTTP POST──▶ server dispatcher
//!                                                    │
//!                                          routing::ServiceRouter
//!                                                    │
//!                                            application handler
//!                                                    │
//!   caller ◀── payload / error envelope ◀── response framing
//! ```
//!
//! Error classification lives in [`error`]; both sides share it. The code
//! generator that produces typed stubs is an external collaborator: this
//! runtime only ever sees method names and raw payload bytes.

pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod routing;
pub mod server;

pub use client::{ClientError, TwirpClient, TwirpClientConfig};
pub use config::ServerConfig;
pub use content::ContentType;
pub use error::{ErrorCode, TwirpError};
pub use routing::{handler_fn, RpcHandler, ServiceRouter};
pub use server::TwirpServer;
