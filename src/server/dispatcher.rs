//! Per-request dispatch.
//!
//! # Responsibilities
//! - Validate method and negotiate content type
//! - Resolve the request path against the route table
//! - Buffer the full body, invoke the handler once
//! - Frame the success payload or the JSON error envelope
//!
//! # Design Decisions
//! - Every branch is terminal: each failure writes a well-formed envelope,
//!   never a dropped connection
//! - The body is fully materialized before any header is sent, so the
//!   status line always reflects the true outcome
//! - Handler failures are normalized exactly here: a `TwirpError` passes
//!   through, anything else becomes `internal` with its message preserved

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, Response},
};

use crate::content::ContentType;
use crate::error::TwirpError;
use crate::server::server::AppState;

/// Axum handler for every path under the service mount.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let path = request.uri().path().to_string();

    tracing::debug!(method = %request.method(), path = %path, "Dispatching RPC");

    // 1. Only POST is routable.
    if request.method() != Method::POST {
        return error_response(TwirpError::bad_route(format!(
            "unsupported method {} (only POST is allowed)",
            request.method()
        )));
    }

    // 2. + 3. Content-Type presence and negotiation.
    let mime = match request.headers().get(header::CONTENT_TYPE) {
        None => return error_response(TwirpError::bad_route("missing Content-Type header")),
        Some(value) => match value.to_str() {
            Ok(mime) => mime.to_string(),
            Err(_) => {
                return error_response(TwirpError::bad_route(
                    "unreadable Content-Type header",
                ))
            }
        },
    };

    let content_type = ContentType::from_mime(&mime);
    if content_type == ContentType::Unknown {
        return error_response(TwirpError::bad_route(format!(
            "unexpected Content-Type: {mime}"
        )));
    }

    // 4. Route resolution.
    let handler = match state.service.resolve(&path) {
        Some(handler) => handler,
        None => {
            tracing::warn!(path = %path, "No handler matched");
            return error_response(TwirpError::bad_route(format!(
                "no handler for path {path}"
            )));
        }
    };

    // 5. Buffer the full body (Twirp has no streaming mode).
    let body = match axum::body::to_bytes(request.into_body(), state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to read request body");
            return error_response(TwirpError::internal(e.to_string()));
        }
    };

    // 6. Invoke the handler, normalizing whatever it raises.
    let payload = match handler.call(body, content_type).await {
        Ok(payload) => payload,
        Err(e) => {
            let error = match e.downcast::<TwirpError>() {
                Ok(twirp) => twirp,
                Err(other) => TwirpError::internal(other.to_string()),
            };
            tracing::warn!(path = %path, code = %error.code(), "Handler failed");
            return error_response(error);
        }
    };

    // 7. Success frame: echo the negotiated content type.
    let mime = content_type.mime().unwrap_or("application/json");
    match Response::builder()
        .header(header::CONTENT_TYPE, mime)
        .body(Body::from(payload))
    {
        Ok(response) => response,
        Err(e) => error_response(TwirpError::internal(e.to_string())),
    }
}

/// Frame a [`TwirpError`] as an HTTP response: status from the code's fixed
/// mapping, JSON envelope body.
pub fn error_response(error: TwirpError) -> Response<Body> {
    let body = error.encode();
    Response::builder()
        .status(error.http_status())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        // Status and header are statically valid.
        .unwrap_or_default()
}
