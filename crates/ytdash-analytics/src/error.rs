use thiserror::Error;

/// Conditions that abort a fetch action before any channel is processed.
///
/// Per-channel failures never surface here; they are reported through
/// [`crate::InvalidChannel`] on an otherwise successful cycle.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No provider handle exists, so every fetch action is disabled.
    #[error("YouTube metadata provider is not configured; set YOUTUBE_API_KEY")]
    ProviderUnavailable,
}
