//! Validated inputs of one fetch action.

use std::collections::HashSet;

use crate::model::DateWindow;
use crate::ValidationError;

/// Everything the aggregation pipeline needs for one fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    channel_ids: Vec<String>,
    window: DateWindow,
    max_videos_per_channel: usize,
}

impl FetchRequest {
    /// Trims and de-duplicates `channel_ids`, keeping first-occurrence order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoChannels`] if nothing is left after
    /// trimming blank entries.
    pub fn new<I, S>(
        channel_ids: I,
        window: DateWindow,
        max_videos_per_channel: usize,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let channel_ids: Vec<String> = channel_ids
            .into_iter()
            .map(|id| id.as_ref().trim().to_string())
            .filter(|id| !id.is_empty())
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if channel_ids.is_empty() {
            return Err(ValidationError::NoChannels);
        }

        Ok(Self {
            channel_ids,
            window,
            max_videos_per_channel,
        })
    }

    /// Builds a request from the dashboard's newline-separated text area.
    ///
    /// # Errors
    ///
    /// See [`FetchRequest::new`].
    pub fn from_text(
        text: &str,
        window: DateWindow,
        max_videos_per_channel: usize,
    ) -> Result<Self, ValidationError> {
        Self::new(text.lines(), window, max_videos_per_channel)
    }

    #[must_use]
    pub fn channel_ids(&self) -> &[String] {
        &self.channel_ids
    }

    #[must_use]
    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    #[must_use]
    pub fn max_videos_per_channel(&self) -> usize {
        self.max_videos_per_channel
    }
}
