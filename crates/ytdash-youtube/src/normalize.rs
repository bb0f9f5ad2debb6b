//! Normalization from `YouTube` wire types into ytdash domain records.

use chrono::{DateTime, Utc};
use thiserror::Error;
use ytdash_core::{parse_duration, ChannelSummary, VideoDetails};

use crate::types::{ChannelItem, VideoItem};

/// Why a channel item could not become a [`ChannelSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelShapeError {
    #[error("channel has no uploads playlist")]
    MissingUploadsPlaylist,
}

/// Converts a `channels.list` item into a [`ChannelSummary`].
///
/// Missing counters default to `0`. The uploads playlist is required because
/// the pipeline cannot page through videos without it.
///
/// # Errors
///
/// Returns [`ChannelShapeError::MissingUploadsPlaylist`] if the item has no
/// `contentDetails.relatedPlaylists.uploads`.
pub fn channel_summary(item: ChannelItem) -> Result<ChannelSummary, ChannelShapeError> {
    let uploads_playlist_id = item
        .content_details
        .and_then(|cd| cd.related_playlists.uploads)
        .filter(|p| !p.is_empty())
        .ok_or(ChannelShapeError::MissingUploadsPlaylist)?;

    let stats = item.statistics.unwrap_or_default();

    Ok(ChannelSummary {
        channel_name: item.snippet.map(|s| s.title).unwrap_or_default(),
        channel_id: item.id,
        subscriber_count: parse_count(stats.subscriber_count.as_deref()),
        view_count: parse_count(stats.view_count.as_deref()),
        video_count: parse_count(stats.video_count.as_deref()),
        uploads_playlist_id,
    })
}

/// Converts a `videos.list` item into [`VideoDetails`].
///
/// Counters and thumbnail default to `0` / `None`. Returns `None` only when
/// the publish timestamp is missing or not RFC 3339, since date filtering
/// cannot place such a video.
#[must_use]
pub fn video_details(item: VideoItem) -> Option<VideoDetails> {
    let snippet = item.snippet?;
    let published_at = parse_timestamp(snippet.published_at.as_deref()?)?;
    let stats = item.statistics.unwrap_or_default();
    let duration_seconds = item
        .content_details
        .and_then(|cd| cd.duration)
        .map_or(0, |d| parse_duration(&d));

    Some(VideoDetails {
        video_id: item.id,
        title: snippet.title,
        view_count: parse_count(stats.view_count.as_deref()),
        like_count: parse_count(stats.like_count.as_deref()),
        comment_count: parse_count(stats.comment_count.as_deref()),
        published_at,
        duration_seconds,
        thumbnail_url: snippet.thumbnails.and_then(|t| t.medium).map(|m| m.url),
    })
}

/// Parses a string counter; absent or non-numeric values become `0`.
#[must_use]
pub fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn channel_item(body: serde_json::Value) -> ChannelItem {
        serde_json::from_value(body).expect("channel fixture")
    }

    fn video_item(body: serde_json::Value) -> VideoItem {
        serde_json::from_value(body).expect("video fixture")
    }

    #[test]
    fn channel_summary_reads_all_fields() {
        let item = channel_item(serde_json::json!({
            "id": "UC123",
            "snippet": { "title": "Rust Talks" },
            "statistics": { "subscriberCount": "1200", "viewCount": "98765", "videoCount": "42" },
            "contentDetails": { "relatedPlaylists": { "uploads": "UU123" } }
        }));
        let summary = channel_summary(item).unwrap();
        assert_eq!(summary.channel_id, "UC123");
        assert_eq!(summary.channel_name, "Rust Talks");
        assert_eq!(summary.subscriber_count, 1200);
        assert_eq!(summary.view_count, 98_765);
        assert_eq!(summary.video_count, 42);
        assert_eq!(summary.uploads_playlist_id, "UU123");
    }

    #[test]
    fn hidden_subscriber_count_defaults_to_zero() {
        let item = channel_item(serde_json::json!({
            "id": "UC1",
            "snippet": { "title": "Quiet" },
            "statistics": { "viewCount": "5", "hiddenSubscriberCount": true, "videoCount": "1" },
            "contentDetails": { "relatedPlaylists": { "uploads": "UU1" } }
        }));
        assert_eq!(channel_summary(item).unwrap().subscriber_count, 0);
    }

    #[test]
    fn channel_without_uploads_playlist_is_rejected() {
        let item = channel_item(serde_json::json!({
            "id": "UC1",
            "snippet": { "title": "No uploads" }
        }));
        assert_eq!(
            channel_summary(item).unwrap_err(),
            ChannelShapeError::MissingUploadsPlaylist
        );
    }

    #[test]
    fn channel_shape_error_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ChannelShapeError::MissingUploadsPlaylist);
        assert_eq!(err.to_string(), "channel has no uploads playlist");
    }

    #[test]
    fn video_details_parses_duration_and_thumbnail() {
        let item = video_item(serde_json::json!({
            "id": "v1",
            "snippet": {
                "title": "Ownership explained",
                "publishedAt": "2025-01-15T17:00:07Z",
                "thumbnails": { "medium": { "url": "https://i.ytimg.com/vi/v1/mqdefault.jpg" } }
            },
            "statistics": { "viewCount": "1000", "likeCount": "50", "commentCount": "7" },
            "contentDetails": { "duration": "PT12M5S" }
        }));
        let details = video_details(item).unwrap();
        assert_eq!(details.video_id, "v1");
        assert_eq!(details.view_count, 1000);
        assert_eq!(details.like_count, 50);
        assert_eq!(details.comment_count, 7);
        assert_eq!(details.duration_seconds, 725);
        assert_eq!(
            details.published_at,
            Utc.with_ymd_and_hms(2025, 1, 15, 17, 0, 7).unwrap()
        );
        assert_eq!(
            details.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/v1/mqdefault.jpg")
        );
    }

    #[test]
    fn video_details_defaults_missing_counters() {
        let item = video_item(serde_json::json!({
            "id": "v2",
            "snippet": { "title": "Comments off", "publishedAt": "2025-01-15T17:00:07+02:00" },
            "statistics": { "viewCount": "10" }
        }));
        let details = video_details(item).unwrap();
        assert_eq!(details.like_count, 0);
        assert_eq!(details.comment_count, 0);
        assert_eq!(details.duration_seconds, 0);
        assert!(details.thumbnail_url.is_none());
        assert_eq!(
            details.published_at,
            Utc.with_ymd_and_hms(2025, 1, 15, 15, 0, 7).unwrap()
        );
    }

    #[test]
    fn video_without_publish_time_is_dropped() {
        let item = video_item(serde_json::json!({
            "id": "v3",
            "snippet": { "title": "Scheduled", "publishedAt": "soon" }
        }));
        assert!(video_details(item).is_none());
    }

    #[test]
    fn parse_count_handles_garbage() {
        assert_eq!(parse_count(Some("12")), 12);
        assert_eq!(parse_count(Some("-3")), 0);
        assert_eq!(parse_count(Some("lots")), 0);
        assert_eq!(parse_count(None), 0);
    }
}
