use thiserror::Error;

/// Errors returned by the `YouTube` Data API client and adapter.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status and an error envelope.
    #[error("YouTube API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The daily quota is spent; further calls will fail until it resets.
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// No client handle exists, usually because `YOUTUBE_API_KEY` is unset.
    #[error("YouTube metadata provider is not configured")]
    NotConfigured,
}
