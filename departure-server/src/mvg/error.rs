//! MVG client error types.

/// Errors from the MVG HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum MvgError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Feature not configured or not available
    #[error("not configured: {0}")]
    NotConfigured(String),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_ref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

impl MvgError {
    /// Whether the error happened below HTTP: no usable response arrived.
    pub fn is_transport(&self) -> bool {
        match self {
            MvgError::Http(e) => !e.is_decode() && !e.is_status(),
            _ => false,
        }
    }
}
