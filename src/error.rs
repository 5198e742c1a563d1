use thiserror::Error;

/// ApiError
///
/// The error taxonomy every network-touching operation in this crate resolves to.
/// Status-code mapping happens in exactly one place (`from_status`) so that views
/// and stores never inspect raw HTTP responses themselves.
///
/// The enum is `Clone` because results travel through watch channels when
/// concurrent callers share a coalesced request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The backend rejected the input as malformed (400/422). Carries the
    /// backend-provided message when one is present.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The one-time code was wrong or expired. The backend is the sole arbiter;
    /// the client never decides this locally.
    #[error("the code was rejected or has expired")]
    InvalidCredentials,

    /// The session token was missing, expired, or revoked (401 on an
    /// authenticated call). Observing this anywhere invalidates the session.
    #[error("session expired or unauthorized")]
    Authorization,

    /// The requested entity does not exist (404).
    #[error("resource not found")]
    NotFound,

    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered 2xx but the body did not match the expected schema.
    /// Raised at the client boundary so malformed payloads fail fast instead of
    /// leaking partial data into views.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Fallback for any status this client has no dedicated mapping for.
    #[error("unexpected response ({0}): {1}")]
    Unknown(u16, String),
}

impl ApiError {
    /// Maps a non-2xx status and its body to a taxonomy variant.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 | 422 => ApiError::Validation(message_from_body(body)),
            401 => ApiError::Authorization,
            404 => ApiError::NotFound,
            _ => ApiError::Unknown(status, message_from_body(body)),
        }
    }

    /// True for the variant that must force the session back to anonymous.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Authorization)
    }

    /// A short human-readable message suitable for store `error` state.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            // Timeouts, connect failures, and request build errors all surface
            // as transport problems to the caller.
            ApiError::Network(err.to_string())
        }
    }
}

/// Extracts the `message` field from a JSON error body, falling back to a
/// trimmed snippet of the raw text.
fn message_from_body(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    let snippet: String = body.chars().take(120).collect();
    if snippet.is_empty() {
        "request failed".to_string()
    } else {
        snippet
    }
}
