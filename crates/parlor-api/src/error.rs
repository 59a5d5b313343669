use thiserror::Error;

/// Errors produced by the request gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request never completed (connect failure, timeout, TLS, ...).
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status and a failure envelope.
    /// `message` is the server's human-readable text, surfaced verbatim.
    #[error("Rejected ({code}): {}", message.as_deref().unwrap_or("no message"))]
    Rejection {
        status: u16,
        code: String,
        message: Option<String>,
    },

    /// The response body was not a valid envelope.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL and path did not form a valid URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Machine-readable envelope code, when the server rejected the request.
    pub fn code(&self) -> Option<&str> {
        match self {
            GatewayError::Rejection { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GatewayError>;
