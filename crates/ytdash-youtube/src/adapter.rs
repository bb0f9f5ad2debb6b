//! Metadata adapter: channel lookup, upload-list pagination and batched
//! video detail retrieval on top of a [`YoutubeApi`] handle.
//!
//! The adapter never retries and never panics on provider failure. Channel
//! lookups come back as a [`ChannelLookup`] so that "nothing matched" and
//! "the call failed" stay distinguishable; list and detail calls return
//! `Result` so the caller decides how to isolate a failing channel.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use ytdash_core::{ChannelSummary, VideoDetails};

use crate::client::YoutubeApi;
use crate::error::YoutubeError;
use crate::normalize;

/// Provider page size for `playlistItems.list`.
pub const PAGE_SIZE: u32 = 50;

/// Provider cap on IDs per `videos.list` call.
pub const DETAIL_BATCH_SIZE: usize = 50;

/// Outcome of a single channel lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelLookup {
    Found(ChannelSummary),
    /// The provider answered but matched no channel.
    NotFound,
    /// The call failed or the response was unusable.
    Failed(String),
}

impl ChannelLookup {
    /// Human-readable reason for anything other than [`ChannelLookup::Found`].
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Found(_) => None,
            Self::NotFound => Some("channel not found".to_string()),
            Self::Failed(reason) => Some(reason.clone()),
        }
    }

    #[must_use]
    pub fn into_summary(self) -> Option<ChannelSummary> {
        match self {
            Self::Found(summary) => Some(summary),
            Self::NotFound | Self::Failed(_) => None,
        }
    }
}

/// Wraps an optional provider handle and counts every call issued through it.
///
/// A fresh adapter is meant to be built per fetch action so that
/// [`MetadataAdapter::provider_calls`] reflects that action alone.
pub struct MetadataAdapter<'a, A: YoutubeApi> {
    api: Option<&'a A>,
    calls: AtomicU32,
}

impl<'a, A: YoutubeApi> MetadataAdapter<'a, A> {
    #[must_use]
    pub fn new(api: &'a A) -> Self {
        Self {
            api: Some(api),
            calls: AtomicU32::new(0),
        }
    }

    /// An adapter with no handle; every lookup reports the provider as
    /// unavailable.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            api: None,
            calls: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api.is_some()
    }

    /// Number of provider requests issued so far.
    #[must_use]
    pub fn provider_calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    fn handle(&self) -> Result<&'a A, YoutubeError> {
        let api = self.api.ok_or(YoutubeError::NotConfigured)?;
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(api)
    }

    /// Looks up one channel's statistics and uploads playlist.
    pub async fn fetch_channel_summary(&self, channel_id: &str) -> ChannelLookup {
        let api = match self.handle() {
            Ok(api) => api,
            Err(e) => return ChannelLookup::Failed(e.to_string()),
        };

        match api.channel(channel_id).await {
            Ok(Some(item)) => match normalize::channel_summary(item) {
                Ok(summary) => ChannelLookup::Found(summary),
                Err(e) => ChannelLookup::Failed(e.to_string()),
            },
            Ok(None) => ChannelLookup::NotFound,
            Err(e) => {
                tracing::warn!(channel_id, error = %e, "channel lookup failed");
                ChannelLookup::Failed(e.to_string())
            }
        }
    }

    /// Pages through an uploads playlist, returning at most `max_results`
    /// distinct IDs in provider order (newest first).
    ///
    /// An upload landing between page fetches shifts an item from one page
    /// onto the next; such repeats keep their first position only.
    ///
    /// Stops when `max_results` is reached, when the provider returns no
    /// continuation token, or when a page adds no new IDs (empty or fully
    /// repeated). `max_results == 0` issues no calls.
    ///
    /// # Errors
    ///
    /// Returns the first provider error; IDs from earlier pages are discarded.
    pub async fn list_uploaded_video_ids(
        &self,
        playlist_id: &str,
        max_results: usize,
    ) -> Result<Vec<String>, YoutubeError> {
        let mut ids: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;

        while ids.len() < max_results {
            let api = self.handle()?;
            let page = api
                .playlist_items(playlist_id, PAGE_SIZE, page_token.as_deref())
                .await?;

            let before = ids.len();
            for item in page.items {
                let video_id = item.content_details.video_id;
                if seen.insert(video_id.clone()) {
                    ids.push(video_id);
                }
            }
            if ids.len() == before {
                break;
            }

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        ids.truncate(max_results);
        tracing::debug!(playlist_id, count = ids.len(), "listed uploaded videos");
        Ok(ids)
    }

    /// Fetches details for `video_ids` in batches of [`DETAIL_BATCH_SIZE`],
    /// preserving batch order and provider order within each batch.
    ///
    /// Videos without a usable publish timestamp are skipped and logged.
    ///
    /// # Errors
    ///
    /// Returns the first provider error.
    pub async fn fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoDetails>, YoutubeError> {
        let mut details = Vec::with_capacity(video_ids.len());

        for batch in video_ids.chunks(DETAIL_BATCH_SIZE) {
            let api = self.handle()?;
            for item in api.videos(batch).await? {
                let video_id = item.id.clone();
                match normalize::video_details(item) {
                    Some(d) => details.push(d),
                    None => {
                        tracing::warn!(
                            video_id = %video_id,
                            "skipping video without a valid publish time"
                        );
                    }
                }
            }
        }

        Ok(details)
    }
}
