/// Errors surfaced by the HTTP boundary.
///
/// `Status` carries the provider's own error message when the response body
/// contained one; everything else is a local failure before or after the
/// request itself.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response body was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token acquisition failed: {0}")]
    Auth(String),
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
}

pub type TransportResult<T> = Result<T, TransportError>;
