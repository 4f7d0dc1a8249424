// Error types shared by the transport, the auth client and the upload
// orchestrator. Callers branch on the enum variant, never on message text.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// A failure reported by the remote service: HTTP status plus the business
/// code and message when the body could be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

/// The `{code, message}` envelope every endpoint answers with.
#[derive(Deserialize)]
struct FailureEnvelope {
    code: Option<String>,
    message: Option<String>,
}

impl ApiFailure {
    pub fn new(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        ApiFailure {
            status,
            code,
            message: message.into(),
        }
    }

    /// Build a failure from a raw response body. JSON bodies contribute their
    /// `code` and `message`; anything else degrades to `fallback`.
    pub fn from_body(status: u16, body: &str, fallback: impl Into<String>) -> Self {
        match serde_json::from_str::<FailureEnvelope>(body) {
            Ok(envelope) => ApiFailure {
                status,
                code: envelope.code,
                message: envelope.message.unwrap_or_else(|| fallback.into()),
            },
            Err(_) => ApiFailure::new(status, None, fallback),
        }
    }

    /// Whether the business code matches `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {} (HTTP {})", code, self.message, self.status),
            None => write!(f, "{} (HTTP {})", self.message, self.status),
        }
    }
}

/// Network level failures: connect errors, timeouts, broken bodies.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Io {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Everything `handle_file_upload` can fail with.
#[derive(Debug, Error)]
pub enum UploadError {
    /// A required argument was empty or the file could not be read. Raised
    /// before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(ApiFailure),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The upload endpoint rejected the bearer token (code 29011).
    #[error("token rejected: {0}")]
    TokenInvalid(ApiFailure),

    /// Terminal upload failure, after the retry if one applied.
    #[error("upload failed: {0}")]
    UploadFailed(ApiFailure),
}

impl UploadError {
    /// Business code of the remote failure, if there is one.
    pub fn business_code(&self) -> Option<&str> {
        match self {
            UploadError::AuthenticationFailed(f)
            | UploadError::TokenInvalid(f)
            | UploadError::UploadFailed(f) => f.code.as_deref(),
            UploadError::InvalidArgument(_) | UploadError::Transport(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_body_reads_json_envelope() {
        let f = ApiFailure::from_body(200, r#"{"code":"29011","message":"no auth"}"#, "generic");
        assert_eq!(f.code.as_deref(), Some("29011"));
        assert_eq!(f.message, "no auth");
        assert!(f.has_code("29011"));
    }

    #[test]
    fn from_body_degrades_on_garbage() {
        let f = ApiFailure::from_body(502, "<html>bad gateway</html>", "HTTP error code: 502");
        assert_eq!(f.code, None);
        assert_eq!(f.message, "HTTP error code: 502");
        assert_eq!(f.to_string(), "HTTP error code: 502 (HTTP 502)");
    }

    #[test]
    fn business_code_is_exposed_on_remote_variants() {
        let failure = ApiFailure::new(200, Some("30001".into()), "bad brand");
        let err = UploadError::UploadFailed(failure);
        assert_eq!(err.business_code(), Some("30001"));
        assert_eq!(UploadError::InvalidArgument("x".into()).business_code(), None);
    }
}
