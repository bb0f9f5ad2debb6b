//! Fetch-cycle orchestration.

use ytdash_core::{ChannelSummary, FetchRequest, ResultsTable, VideoRecord};
use ytdash_youtube::{ChannelLookup, MetadataAdapter, YoutubeApi};

use crate::error::PipelineError;
use crate::types::{FetchCycle, InvalidChannel, NoDataReason};

/// Run one fetch action for `request`.
///
/// 1. Look up every channel in request order; failed or unknown IDs are
///    recorded as invalid and skipped.
/// 2. List up to `max_videos_per_channel` uploads for each valid channel.
/// 3. Fetch details in batches and attribute each video to its channel.
/// 4. Concatenate all channels' rows into one table.
/// 5. Keep only rows published inside the request's date window.
///
/// Channels are processed strictly one after another with no retries, so the
/// provider call count stays within the per-action provider quota. A listing or
/// detail failure invalidates only that channel; its summary is withheld.
///
/// # Errors
///
/// Returns [`PipelineError::ProviderUnavailable`] if `adapter` has no provider
/// handle. No calls are made in that case.
pub async fn run<A: YoutubeApi>(
    adapter: &MetadataAdapter<'_, A>,
    request: &FetchRequest,
) -> Result<FetchCycle, PipelineError> {
    if !adapter.is_configured() {
        return Err(PipelineError::ProviderUnavailable);
    }

    let calls_before = adapter.provider_calls();
    let mut channels: Vec<ChannelSummary> = Vec::new();
    let mut invalid_channels: Vec<InvalidChannel> = Vec::new();
    let mut rows: Vec<VideoRecord> = Vec::new();

    for channel_id in request.channel_ids() {
        let summary = match adapter.fetch_channel_summary(channel_id).await {
            ChannelLookup::Found(summary) => summary,
            lookup => {
                let reason = lookup
                    .reason()
                    .unwrap_or_else(|| "channel lookup failed".to_string());
                tracing::warn!(channel_id = %channel_id, reason = %reason, "invalid channel");
                invalid_channels.push(InvalidChannel {
                    channel_id: channel_id.clone(),
                    reason,
                });
                continue;
            }
        };

        match collect_channel_rows(adapter, &summary, request.max_videos_per_channel()).await {
            Ok(channel_rows) => {
                tracing::debug!(
                    channel_id = %summary.channel_id,
                    videos = channel_rows.len(),
                    "channel videos collected"
                );
                rows.extend(channel_rows);
                channels.push(summary);
            }
            Err(reason) => {
                tracing::warn!(
                    channel_id = %channel_id,
                    reason = %reason,
                    "channel videos unavailable"
                );
                invalid_channels.push(InvalidChannel {
                    channel_id: channel_id.clone(),
                    reason,
                });
            }
        }
    }

    let unfiltered = rows.len();
    let table = ResultsTable::from_rows(rows).filtered(request.window());

    let no_data = if channels.is_empty() {
        Some(NoDataReason::NoValidChannels)
    } else if unfiltered == 0 {
        Some(NoDataReason::NoVideos)
    } else if table.is_empty() {
        Some(NoDataReason::EmptyDateWindow)
    } else {
        None
    };

    let provider_calls = adapter.provider_calls().saturating_sub(calls_before);

    tracing::info!(
        requested = request.channel_ids().len(),
        valid = channels.len(),
        invalid = invalid_channels.len(),
        videos = unfiltered,
        in_window = table.len(),
        provider_calls,
        "fetch cycle complete"
    );

    Ok(FetchCycle {
        window: *request.window(),
        table,
        channels,
        invalid_channels,
        no_data,
        provider_calls,
    })
}

/// Lists and fetches one channel's uploads, stamping each row with the
/// channel's identity. Errors are flattened to the user-facing reason.
async fn collect_channel_rows<A: YoutubeApi>(
    adapter: &MetadataAdapter<'_, A>,
    summary: &ChannelSummary,
    max_videos: usize,
) -> Result<Vec<VideoRecord>, String> {
    let video_ids = adapter
        .list_uploaded_video_ids(&summary.uploads_playlist_id, max_videos)
        .await
        .map_err(|e| format!("failed to list uploads: {e}"))?;

    let details = adapter
        .fetch_video_details(&video_ids)
        .await
        .map_err(|e| format!("failed to fetch video details: {e}"))?;

    Ok(details
        .into_iter()
        .map(|d| VideoRecord::new(d, summary))
        .collect())
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
