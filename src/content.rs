//! Content-type negotiation.
//!
//! Twirp carries exactly two payload encodings. Anything else on the
//! `Content-Type` header is a routing failure, not a payload variant.

/// Payload encoding negotiated from the `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Protobuf,
    Json,
    Unknown,
}

impl ContentType {
    /// Negotiate from a MIME value.
    pub fn from_mime(mime: &str) -> ContentType {
        match mime {
            "application/protobuf" => ContentType::Protobuf,
            "application/json" => ContentType::Json,
            _ => ContentType::Unknown,
        }
    }

    /// The MIME value for a negotiated encoding. `Unknown` is never framed
    /// into a response, so it has no MIME value.
    pub fn mime(self) -> Option<&'static str> {
        match self {
            ContentType::Protobuf => Some("application/protobuf"),
            ContentType::Json => Some("application/json"),
            ContentType::Unknown => None,
        }
    }
}
