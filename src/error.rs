//! Twirp error taxonomy and wire envelope.
//!
//! # Responsibilities
//! - Define the closed set of canonical error codes
//! - Map every code to its fixed HTTP status
//! - Encode/decode the `{"code", "msg"}` JSON envelope
//! - Classify HTTP failures from non-Twirp intermediaries
//!
//! # Design Decisions
//! - Flat code enum instead of an error class hierarchy (exhaustive matching)
//! - Status mapping is an exhaustive `match`: an unmapped code cannot compile
//! - The envelope is always JSON, even for protobuf-encoded calls

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Canonical Twirp error codes.
///
/// The serde names are the wire strings; the set is closed, so decoding an
/// unrecognized code fails rather than defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The operation was cancelled, typically by the caller.
    Canceled,
    /// Unknown error, e.g. from an API that returned no usable information.
    Unknown,
    /// The caller specified an argument that is invalid regardless of
    /// system state (malformed name, number out of range, ...).
    InvalidArgument,
    /// The operation expired before completion.
    DeadlineExceeded,
    /// A requested entity was not found.
    NotFound,
    /// The URL path was not routable to a Twirp service and method. Emitted
    /// by the server runtime; applications should prefer `NotFound` or
    /// `Unimplemented`.
    BadRoute,
    /// An attempt to create an entity failed because one already exists.
    AlreadyExists,
    /// The caller is identified but lacks permission for the operation.
    PermissionDenied,
    /// The request carries no valid authentication credentials.
    Unauthenticated,
    /// Some resource has been exhausted, e.g. a per-user quota.
    ResourceExhausted,
    /// The system is not in a state required for the operation.
    FailedPrecondition,
    /// The operation was aborted, typically due to a concurrency issue.
    Aborted,
    /// The operation was attempted past the valid range. Unlike
    /// `InvalidArgument`, a state change may fix it.
    OutOfRange,
    /// The operation is not implemented or not enabled in this service.
    Unimplemented,
    /// An invariant expected by the underlying system was broken.
    Internal,
    /// The service is currently unavailable; likely transient.
    Unavailable,
    /// Unrecoverable data loss or corruption.
    DataLoss,
}

impl ErrorCode {
    /// Every code, for exhaustive checks.
    pub const ALL: [ErrorCode; 17] = [
        ErrorCode::Canceled,
        ErrorCode::Unknown,
        ErrorCode::InvalidArgument,
        ErrorCode::DeadlineExceeded,
        ErrorCode::NotFound,
        ErrorCode::BadRoute,
        ErrorCode::AlreadyExists,
        ErrorCode::PermissionDenied,
        ErrorCode::Unauthenticated,
        ErrorCode::ResourceExhausted,
        ErrorCode::FailedPrecondition,
        ErrorCode::Aborted,
        ErrorCode::OutOfRange,
        ErrorCode::Unimplemented,
        ErrorCode::Internal,
        ErrorCode::Unavailable,
        ErrorCode::DataLoss,
    ];

    /// The snake_case token used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            ErrorCode::Canceled => "canceled",
            ErrorCode::Unknown => "unknown",
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::DeadlineExceeded => "deadline_exceeded",
            ErrorCode::NotFound => "not_found",
            ErrorCode::BadRoute => "bad_route",
            ErrorCode::AlreadyExists => "already_exists",
            ErrorCode::PermissionDenied => "permission_denied",
            ErrorCode::Unauthenticated => "unauthenticated",
            ErrorCode::ResourceExhausted => "resource_exhausted",
            ErrorCode::FailedPrecondition => "failed_precondition",
            ErrorCode::Aborted => "aborted",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::Unimplemented => "unimplemented",
            ErrorCode::Internal => "internal",
            ErrorCode::Unavailable => "unavailable",
            ErrorCode::DataLoss => "data_loss",
        }
    }

    /// HTTP response status for this code.
    ///
    /// Total over the enum; mirrors the mapping used by the reference Twirp
    /// servers so responses stay interoperable.
    pub fn http_status(self) -> StatusCode {
        match self {
            ErrorCode::Canceled => StatusCode::REQUEST_TIMEOUT,
            ErrorCode::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::DeadlineExceeded => StatusCode::REQUEST_TIMEOUT,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::BadRoute => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::ResourceExhausted => StatusCode::FORBIDDEN,
            ErrorCode::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
            ErrorCode::Aborted => StatusCode::CONFLICT,
            ErrorCode::OutOfRange => StatusCode::BAD_REQUEST,
            ErrorCode::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify an HTTP failure from a non-Twirp source (proxy, gateway,
    /// load balancer) that never produced a proper error envelope.
    ///
    /// The mapping follows the gRPC HTTP status convention. 400 maps to
    /// `Internal`: a bad request the client runtime did not itself detect
    /// means something between the peers rewrote it.
    pub fn from_intermediary_status(status: StatusCode) -> ErrorCode {
        if status.is_redirection() {
            return ErrorCode::Internal;
        }
        match status.as_u16() {
            400 => ErrorCode::Internal,
            401 => ErrorCode::Unauthenticated,
            403 => ErrorCode::PermissionDenied,
            404 => ErrorCode::BadRoute,
            429 | 502 | 503 | 504 => ErrorCode::Unavailable,
            _ => ErrorCode::Unknown,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A classified RPC failure.
///
/// The HTTP status is fully determined by the code; the message is free
/// text and never structurally parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct TwirpError {
    code: ErrorCode,
    message: String,
}

/// The two-field JSON object every non-success response carries.
#[derive(Serialize, Deserialize)]
struct ErrorEnvelope {
    code: ErrorCode,
    msg: String,
}

impl TwirpError {
    /// Create an error with an explicit code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A requested entity was not found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// An argument has an invalid format, is out of range, is a bad
    /// option, etc.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// A required argument was missing or zero-valued.
    pub fn required_argument(argument: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, format!("{argument} is required"))
    }

    /// Something bad or unexpected happened.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// The request could not be routed to a service method. Used by the
    /// server runtime.
    pub fn bad_route(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRoute, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP status this error is framed with.
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Serialize to the wire envelope. This is the only wire representation
    /// of an error, regardless of the call's content type.
    pub fn encode(&self) -> Vec<u8> {
        let envelope = ErrorEnvelope {
            code: self.code,
            msg: self.message.clone(),
        };
        // A two-field struct of a unit enum and a string cannot fail to
        // serialize.
        serde_json::to_vec(&envelope).unwrap_or_default()
    }

    /// Parse a wire envelope back into an error.
    pub fn decode(bytes: &[u8]) -> Result<Self, MalformedEnvelope> {
        let envelope: ErrorEnvelope =
            serde_json::from_slice(bytes).map_err(|_| MalformedEnvelope)?;
        Ok(Self {
            code: envelope.code,
            message: envelope.msg,
        })
    }
}

/// The bytes of a non-success response were not a valid error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed error envelope")]
pub struct MalformedEnvelope;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_total_and_standard() {
        for code in ErrorCode::ALL {
            let status = code.http_status();
            assert!(
                (400..=599).contains(&status.as_u16()),
                "{code} mapped outside the failure range"
            );
            // Stable across calls.
            assert_eq!(status, code.http_status());
        }
    }

    #[test]
    fn status_mapping_fixed_points() {
        assert_eq!(ErrorCode::Canceled.http_status().as_u16(), 408);
        assert_eq!(ErrorCode::BadRoute.http_status().as_u16(), 404);
        assert_eq!(ErrorCode::ResourceExhausted.http_status().as_u16(), 403);
        assert_eq!(ErrorCode::FailedPrecondition.http_status().as_u16(), 412);
        assert_eq!(ErrorCode::Unimplemented.http_status().as_u16(), 501);
        assert_eq!(ErrorCode::DataLoss.http_status().as_u16(), 500);
    }

    #[test]
    fn envelope_round_trip() {
        for code in ErrorCode::ALL {
            let error = TwirpError::new(code, "something went wrong");
            let decoded = TwirpError::decode(&error.encode()).unwrap();
            assert_eq!(decoded, error);
        }
    }

    #[test]
    fn envelope_wire_shape() {
        let error = TwirpError::bad_route("no handler for path /x");
        let value: serde_json::Value = serde_json::from_slice(&error.encode()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"code": "bad_route", "msg": "no handler for path /x"})
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(TwirpError::decode(b"not json"), Err(MalformedEnvelope));
        assert_eq!(TwirpError::decode(b"{}"), Err(MalformedEnvelope));
        assert_eq!(
            TwirpError::decode(br#"{"code":"definitely_not_a_code","msg":"x"}"#),
            Err(MalformedEnvelope)
        );
        assert_eq!(TwirpError::decode(br#"["code","msg"]"#), Err(MalformedEnvelope));
    }

    #[test]
    fn intermediary_classification() {
        use ErrorCode::*;
        let cases = [
            (301, Internal),
            (399, Internal),
            (400, Internal),
            (401, Unauthenticated),
            (403, PermissionDenied),
            (404, BadRoute),
            (429, Unavailable),
            (502, Unavailable),
            (503, Unavailable),
            (504, Unavailable),
            (418, Unknown),
            (500, Unknown),
        ];
        for (status, expected) in cases {
            let status = StatusCode::from_u16(status).unwrap();
            assert_eq!(ErrorCode::from_intermediary_status(status), expected);
        }
    }

    #[test]
    fn required_argument_message() {
        let error = TwirpError::required_argument("size");
        assert_eq!(error.code(), ErrorCode::InvalidArgument);
        assert_eq!(error.message(), "size is required");
    }
}
