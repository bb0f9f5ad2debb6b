//! One-shot fetch: run the pipeline once, print the summary and optionally
//! write the PDF report.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Args;
use ytdash_analytics::{overall_metrics, render_report, top_by_views, FetchCycle};
use ytdash_core::{AppConfig, DateWindow, FetchRequest};
use ytdash_youtube::{MetadataAdapter, YoutubeClient};

const CLI_TOP_N: usize = 10;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// File with one channel ID per line, or `-` to read stdin
    #[arg(long, conflicts_with = "channel", required_unless_present = "channel")]
    pub channels: Option<PathBuf>,
    /// Channel ID to fetch; repeat for several channels
    #[arg(long)]
    pub channel: Vec<String>,
    /// First publish date to include (YYYY-MM-DD, default 30 days ago)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last publish date to include (YYYY-MM-DD, default today)
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Upload cap per channel (default `YTDASH_MAX_VIDEOS_PER_CHANNEL`)
    #[arg(long)]
    pub max_videos: Option<usize>,
    /// Write the PDF report to this path
    #[arg(long)]
    pub pdf: Option<PathBuf>,
}

/// Runs one fetch cycle from the command line.
///
/// # Errors
///
/// Returns an error if the API key is missing, the input is invalid, the
/// channel list cannot be read, or the PDF cannot be written.
pub(crate) async fn run_fetch(config: &AppConfig, args: &FetchArgs) -> anyhow::Result<()> {
    let api_key = config
        .youtube_api_key
        .as_deref()
        .context("YOUTUBE_API_KEY is not set; fetching is disabled")?;

    let window = DateWindow::resolve(args.start, args.end, Utc::now().date_naive())?;
    let max_videos = args.max_videos.unwrap_or(config.max_videos_per_channel);
    let request = match &args.channels {
        Some(source) => FetchRequest::from_text(&read_channel_list(source)?, window, max_videos)?,
        None => FetchRequest::new(&args.channel, window, max_videos)?,
    };

    let client = YoutubeClient::with_base_url(
        api_key,
        config.youtube_timeout_secs,
        &config.user_agent,
        &config.youtube_base_url,
    )?;
    let adapter = MetadataAdapter::new(&client);
    let cycle = ytdash_analytics::run(&adapter, &request).await?;

    print!("{}", format_summary(&cycle));

    if let Some(path) = &args.pdf {
        let bytes = render_report(&cycle.table, &cycle.channels);
        std::fs::write(path, &bytes)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("report written to {} ({} bytes)", path.display(), bytes.len());
    }

    Ok(())
}

fn read_channel_list(source: &Path) -> anyhow::Result<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read channel IDs from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source)
        .with_context(|| format!("failed to read channel list {}", source.display()))
}

/// Plain-text rendering of a cycle for terminal output.
fn format_summary(cycle: &FetchCycle) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "window: {} .. {}\n",
        cycle.window.start(),
        cycle.window.end()
    ));

    for ch in &cycle.channels {
        out.push_str(&format!(
            "channel {} ({}): {} subscribers, {} views, {} videos\n",
            ch.channel_name, ch.channel_id, ch.subscriber_count, ch.view_count, ch.video_count
        ));
    }
    for invalid in &cycle.invalid_channels {
        out.push_str(&format!(
            "invalid channel {}: {}\n",
            invalid.channel_id, invalid.reason
        ));
    }

    if let Some(reason) = cycle.no_data {
        out.push_str(&format!("no data: {}\n", reason.message()));
    } else {
        let metrics = overall_metrics(&cycle.table);
        out.push_str(&format!(
            "total views: {}\ntotal videos: {}\nmean engagement: {:.2}%\n",
            metrics.total_views,
            metrics.total_videos,
            metrics.mean_engagement_rate * 100.0
        ));
        out.push_str("top videos:\n");
        for (rank, video) in top_by_views(&cycle.table, CLI_TOP_N).iter().enumerate() {
            out.push_str(&format!(
                "{:>3}. {} ({} views, {})\n",
                rank + 1,
                video.title,
                video.view_count,
                video.channel_name
            ));
        }
    }

    out.push_str(&format!("provider calls: {}\n", cycle.provider_calls));
    out
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
