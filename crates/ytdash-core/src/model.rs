//! Domain records produced by one fetch cycle.
//!
//! [`ChannelSummary`] and [`VideoRecord`] are immutable once built. The
//! [`ResultsTable`] is the unified, date-filtered concatenation of every valid
//! channel's videos; downstream consumers only ever see it by shared reference.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Headline statistics for one requested channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel_id: String,
    pub channel_name: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
    /// Opaque handle of the channel's uploads playlist, used for pagination.
    pub uploads_playlist_id: String,
}

/// Per-video data as returned by the detail lookup, before it is attributed
/// to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub thumbnail_url: Option<String>,
}

/// One row of the unified results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub thumbnail_url: Option<String>,
    pub channel_id: String,
    pub channel_name: String,
    /// `duration_seconds / 60`, computed once at construction.
    pub minutes: f64,
    /// `(likes + comments) / max(views, 1)`, computed once at construction.
    pub engagement_rate: f64,
}

impl VideoRecord {
    /// Attributes `details` to `channel` and computes the derived metrics.
    #[must_use]
    pub fn new(details: VideoDetails, channel: &ChannelSummary) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let minutes = details.duration_seconds as f64 / 60.0;
        let engagement_rate = engagement_rate(
            details.like_count,
            details.comment_count,
            details.view_count,
        );

        Self {
            video_id: details.video_id,
            title: details.title,
            view_count: details.view_count,
            like_count: details.like_count,
            comment_count: details.comment_count,
            published_at: details.published_at,
            duration_seconds: details.duration_seconds,
            thumbnail_url: details.thumbnail_url,
            channel_id: channel.channel_id.clone(),
            channel_name: channel.channel_name.clone(),
            minutes,
            engagement_rate,
        }
    }
}

/// Engagement rate with a zero-view denominator replaced by 1.
///
/// A video with no views therefore reports its raw like + comment count as
/// its rate. The result is always finite and non-negative.
#[must_use]
pub fn engagement_rate(likes: u64, comments: u64, views: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let interactions = likes.saturating_add(comments) as f64;
    #[allow(clippy::cast_precision_loss)]
    let denominator = views.max(1) as f64;
    interactions / denominator
}

/// Days covered by the window used when the caller picks no dates.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Inclusive calendar-date window applied to `published_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDateRange`] when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days`-long window ending on `today`, which is what the dashboard
    /// shows before the user picks dates.
    #[must_use]
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_days(chrono::Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Fills whichever bound is missing from the default window ending on
    /// `today`, then validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDateRange`] when the resolved start
    /// falls after the resolved end.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let default = Self::trailing_days(today, DEFAULT_WINDOW_DAYS);
        Self::new(start.unwrap_or(default.start), end.unwrap_or(default.end))
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Date-only comparison; time of day is ignored.
    #[must_use]
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        let date = at.date_naive();
        self.start <= date && date <= self.end
    }
}

/// Unified, date-filtered rows of one fetch cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultsTable {
    rows: Vec<VideoRecord>,
}

impl ResultsTable {
    #[must_use]
    pub fn from_rows(rows: Vec<VideoRecord>) -> Self {
        Self { rows }
    }

    /// Keeps only rows published inside `window`, preserving order.
    #[must_use]
    pub fn filtered(self, window: &DateWindow) -> Self {
        Self {
            rows: self
                .rows
                .into_iter()
                .filter(|r| window.contains(&r.published_at))
                .collect(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[VideoRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VideoRecord> {
        self.rows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResultsTable {
    type Item = &'a VideoRecord;
    type IntoIter = std::slice::Iter<'a, VideoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
