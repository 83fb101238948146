//! Outbound RPC transport.
//!
//! # Responsibilities
//! - Issue one HTTP POST per call, proto or JSON encoded
//! - Decode non-success responses through the error envelope
//! - Surface transport failures unwrapped (they are not Twirp errors)
//!
//! # Design Decisions
//! - One outstanding exchange per call, no retries and no call state
//! - An intermediary that never produced an envelope is still classified,
//!   via the fixed status mapping

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

use crate::client::json::camelize_keys;
use crate::content::ContentType;
use crate::error::{ErrorCode, TwirpError};

/// Failures surfaced to the caller of an RPC.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The exchange never produced an HTTP response (connection refused,
    /// reset, timeout before the status line).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server (or an intermediary) answered with a non-success status.
    #[error(transparent)]
    Twirp(#[from] TwirpError),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct TwirpClientConfig {
    /// Server base URL, e.g. "http://localhost:8080".
    pub base_url: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TwirpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl TwirpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// RPC client for one Twirp service.
pub struct TwirpClient {
    http: reqwest::Client,
    base_url: String,
    prefix: String,
}

impl TwirpClient {
    /// Create a client for the given fully-qualified service name, mounted
    /// under the default `/twirp` prefix.
    pub fn new(config: TwirpClientConfig, service_fqn: &str) -> Result<Self, ClientError> {
        Self::with_prefix(config, format!("/twirp/{service_fqn}/"))
    }

    /// Create a client with an explicit service path prefix (as exposed by
    /// `ServiceRouter::path_prefix`).
    pub fn with_prefix(
        config: TwirpClientConfig,
        prefix: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            prefix: prefix.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}{}{}", self.base_url, self.prefix, method)
    }

    /// Binary call: send encoded protobuf bytes, get raw response bytes.
    ///
    /// Decoding to a typed message is the generated stub's job.
    pub async fn call_proto(&self, method: &str, request: &[u8]) -> Result<Bytes, ClientError> {
        let url = self.method_url(method);
        tracing::debug!(url = %url, request_len = request.len(), "Proto RPC call");

        let response = self
            .http
            .post(&url)
            .header(
                reqwest::header::CONTENT_TYPE,
                ContentType::Protobuf.mime().unwrap_or_default(),
            )
            .body(request.to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        // Twirp success is exactly 200; any other status (even 2xx from an
        // intermediary) carries no payload contract.
        if status != reqwest::StatusCode::OK {
            return Err(decode_failure(status, &body).into());
        }

        Ok(body)
    }

    /// JSON call: serialize the argument, get back a JSON value with every
    /// object key recased from snake_case to camelCase.
    pub async fn call_json<T: Serialize>(
        &self,
        method: &str,
        request: &T,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.method_url(method);
        tracing::debug!(url = %url, "JSON RPC call");

        let response = self.http.post(&url).json(request).send().await?;

        let status = response.status();
        let body = response.bytes().await?;
        if status != reqwest::StatusCode::OK {
            return Err(decode_failure(status, &body).into());
        }

        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| TwirpError::internal(format!("invalid JSON response body: {e}")))?;
        Ok(camelize_keys(value))
    }
}

/// Turn a non-success response into a [`TwirpError`]: decode the envelope,
/// or classify the status if no Twirp server produced it.
fn decode_failure(status: reqwest::StatusCode, body: &[u8]) -> TwirpError {
    match TwirpError::decode(body) {
        Ok(error) => error,
        Err(_) => TwirpError::new(
            ErrorCode::from_intermediary_status(status),
            format!("HTTP {status} from intermediary with no Twirp error envelope"),
        ),
    }
}
