//! Error taxonomy for the fetch pipeline.
//!
//! Every failure surfaces to the immediate caller through a `Result`-carrying
//! completion; nothing is retried internally, and no error is fatal — the
//! coordinator stays queryable on every failure path.

use serde::Deserialize;

/// Structured error body returned by the photo API.
///
/// Also a wire type: non-2xx responses (and 2xx responses that fail to decode
/// as a page) are tried against this shape before giving up with
/// [`Error::InvalidData`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiError {
    /// HTTP 401. The consuming layer can branch on this without string
    /// matching (e.g. to force a credential-reset flow).
    pub fn is_authorization_error(&self) -> bool {
        self.status == 401
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "API error {}: {} {}", self.status, self.code, message),
            None => write!(f, "API error {}: {}", self.status, self.code),
        }
    }
}

impl std::error::Error for ApiError {}

/// Fetch pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Network/connectivity failure, reported verbatim.
    Transport(String),
    /// Fetched bytes could not be decoded into an image.
    Decode(String),
    /// Structured status+code response from the server.
    Api(ApiError),
    /// No API key configured. Fails before any network call.
    ApiKeyMissing,
    /// Malformed endpoint construction. Never reaches the network.
    InvalidUrl(String),
    /// Unusable payload: non-2xx body that is not error-shaped, or a 2xx body
    /// that decodes as neither a page nor an error.
    InvalidData,
    /// The fetch was cancelled via its handle. Not a failure to report.
    Cancelled,
}

impl Error {
    /// True when the server rejected the request as unauthorized.
    pub fn is_authorization_error(&self) -> bool {
        matches!(self, Error::Api(api) if api.is_authorization_error())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::Decode(e) => write!(f, "Decode error: {}", e),
            Error::Api(e) => write!(f, "{}", e),
            Error::ApiKeyMissing => write!(f, "API key not configured"),
            Error::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            Error::InvalidData => write!(f, "Invalid data"),
            Error::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_decodes_from_wire() {
        let body = br#"{"status": 401, "code": "unauthorized"}"#;
        let api: ApiError = serde_json::from_slice(body).unwrap();
        assert_eq!(api.status, 401);
        assert_eq!(api.code, "unauthorized");
        assert_eq!(api.message, None);
        assert!(api.is_authorization_error());
    }

    #[test]
    fn test_authorization_flag_requires_401() {
        let forbidden = ApiError {
            status: 403,
            code: "forbidden".into(),
            message: Some("nope".into()),
        };
        assert!(!forbidden.is_authorization_error());
        assert!(!Error::Api(forbidden).is_authorization_error());
        assert!(!Error::InvalidData.is_authorization_error());
    }
}
