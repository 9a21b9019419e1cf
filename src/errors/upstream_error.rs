use thiserror::Error;

/// Failures surfaced by the YouTube Data API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("API Error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Request timeout after retries")]
    Timeout,
    #[error("Max retries exceeded")]
    MaxRetries,
    #[error("Authentication token is required")]
    MissingToken,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Invalid JSON from YouTube API: {0}")]
    Decode(String),
}
