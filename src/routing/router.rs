//! Method lookup and the handler capability table.
//!
//! # Responsibilities
//! - Store the per-service method table, frozen at construction
//! - Resolve a request path to a handler (exact, case-sensitive)
//! - Expose the service path prefix for clients and generated stubs
//!
//! # Design Decisions
//! - One handler per method name; handlers are opaque capabilities over
//!   raw bytes (payload codecs belong to the generated stubs)
//! - Handlers fail with `anyhow::Error` so applications can raise anything;
//!   pre-classified `TwirpError`s survive the boundary via downcast

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::content::ContentType;

/// Default mount point for Twirp services.
pub const DEFAULT_PREFIX: &str = "/twirp";

/// A method handler: raw request bytes in, raw response bytes out.
///
/// Invoked at most once per inbound request, always with a negotiated
/// content type (never `Unknown`). Bail with a
/// [`TwirpError`](crate::error::TwirpError) to control the response code;
/// any other failure is surfaced as `internal`.
#[async_trait]
pub trait RpcHandler: Send + Sync {
    async fn call(&self, body: Bytes, content_type: ContentType) -> anyhow::Result<Vec<u8>>;
}

struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> RpcHandler for FnHandler<F>
where
    F: Fn(Bytes, ContentType) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send,
{
    async fn call(&self, body: Bytes, content_type: ContentType) -> anyhow::Result<Vec<u8>> {
        (self.f)(body, content_type).await
    }
}

/// Wrap an async closure as an [`RpcHandler`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn RpcHandler>
where
    F: Fn(Bytes, ContentType) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

/// Immutable route table for one Twirp service.
///
/// Paths follow `<prefix>/<fully-qualified service name>/<MethodName>`.
pub struct ServiceRouter {
    prefix: String,
    handlers: HashMap<String, Arc<dyn RpcHandler>>,
}

impl ServiceRouter {
    /// Start building a router for the given fully-qualified service name,
    /// e.g. `twitch.twirp.example.Haberdasher`.
    pub fn builder(service_fqn: impl Into<String>) -> ServiceRouterBuilder {
        ServiceRouterBuilder {
            mount: DEFAULT_PREFIX.to_string(),
            service_fqn: service_fqn.into(),
            handlers: HashMap::new(),
        }
    }

    /// Resolve a request path to its handler. Exact, case-sensitive match.
    pub fn resolve(&self, path: &str) -> Option<&dyn RpcHandler> {
        let method = path.strip_prefix(&self.prefix)?;
        self.handlers.get(method).map(Arc::as_ref)
    }

    /// The path prefix every method of this service is mounted under,
    /// including the trailing slash.
    pub fn path_prefix(&self) -> &str {
        &self.prefix
    }
}

/// Builder for [`ServiceRouter`]. Consumed by `build`; no route mutation
/// is possible afterwards.
pub struct ServiceRouterBuilder {
    mount: String,
    service_fqn: String,
    handlers: HashMap<String, Arc<dyn RpcHandler>>,
}

impl ServiceRouterBuilder {
    /// Override the mount literal (default `/twirp`).
    pub fn mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }

    /// Register a handler for a method name.
    pub fn method(mut self, name: impl Into<String>, handler: Arc<dyn RpcHandler>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Freeze the table.
    pub fn build(self) -> ServiceRouter {
        ServiceRouter {
            prefix: format!("{}/{}/", self.mount, self.service_fqn),
            handlers: self.handlers,
        }
    }
}
