//! Read-only views over a fetch cycle's results table and channel summaries.
//!
//! Every function here is pure: same input, same output, no mutation of the
//! table. Empty inputs produce zero or empty outputs rather than errors.

use std::collections::BTreeMap;

use chrono::Timelike;
use serde::Serialize;
use ytdash_core::{ChannelSummary, ResultsTable, VideoRecord};

/// Headline totals shown above the charts and in the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub total_views: u64,
    pub total_videos: usize,
    /// Mean of per-video engagement rates; `0.0` for an empty table.
    pub mean_engagement_rate: f64,
}

#[must_use]
pub fn overall_metrics(table: &ResultsTable) -> OverallMetrics {
    let total_views = table
        .iter()
        .fold(0_u64, |acc, r| acc.saturating_add(r.view_count));
    let total_videos = table.len();
    let mean_engagement_rate = if total_videos == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let denom = total_videos as f64;
        table.iter().map(|r| r.engagement_rate).sum::<f64>() / denom
    };

    OverallMetrics {
        total_views,
        total_videos,
        mean_engagement_rate,
    }
}

/// The `n` most viewed rows, descending by views. Ties keep table order.
#[must_use]
pub fn top_by_views(table: &ResultsTable, n: usize) -> Vec<&VideoRecord> {
    let mut rows: Vec<&VideoRecord> = table.iter().collect();
    // `sort_by` is stable.
    rows.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    rows.truncate(n);
    rows
}

/// Average views of one channel's videos published in one UTC hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyViews {
    pub channel_name: String,
    pub hour: u32,
    pub average_views: f64,
}

/// Groups rows by `(channel_name, hour of published_at)` and averages views.
///
/// Channels appear in first-appearance order, hours ascending within each.
#[must_use]
pub fn hourly_average_views(table: &ResultsTable) -> Vec<HourlyViews> {
    let mut groups: Vec<(&str, BTreeMap<u32, (u64, u32)>)> = Vec::new();

    for row in table {
        let idx = match groups.iter().position(|(name, _)| *name == row.channel_name) {
            Some(idx) => idx,
            None => {
                groups.push((row.channel_name.as_str(), BTreeMap::new()));
                groups.len() - 1
            }
        };
        let slot = groups[idx].1.entry(row.published_at.hour()).or_insert((0, 0));
        slot.0 = slot.0.saturating_add(row.view_count);
        slot.1 += 1;
    }

    groups
        .into_iter()
        .flat_map(|(name, hours)| {
            hours.into_iter().map(move |(hour, (sum, count))| {
                #[allow(clippy::cast_precision_loss)]
                let average_views = sum as f64 / f64::from(count);
                HourlyViews {
                    channel_name: name.to_string(),
                    hour,
                    average_views,
                }
            })
        })
        .collect()
}

/// Every title in table order, whitespace-joined.
///
/// No stemming or stopword removal happens here; that is the word-cloud
/// renderer's concern.
#[must_use]
pub fn combined_corpus(table: &ResultsTable) -> String {
    join_titles(table.iter())
}

/// Title corpus for a single channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCorpus {
    pub channel_id: String,
    pub channel_name: String,
    pub text: String,
}

/// One corpus per channel that has rows, in first-appearance order.
#[must_use]
pub fn channel_corpora(table: &ResultsTable) -> Vec<ChannelCorpus> {
    let mut order: Vec<&VideoRecord> = Vec::new();
    for row in table {
        if !order.iter().any(|r| r.channel_id == row.channel_id) {
            order.push(row);
        }
    }

    order
        .into_iter()
        .map(|first| ChannelCorpus {
            channel_id: first.channel_id.clone(),
            channel_name: first.channel_name.clone(),
            text: join_titles(table.iter().filter(|r| r.channel_id == first.channel_id)),
        })
        .collect()
}

fn join_titles<'a>(rows: impl Iterator<Item = &'a VideoRecord>) -> String {
    rows.map(|r| r.title.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Side-by-side channel statistics for the comparison charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelComparison {
    pub channel_id: String,
    pub channel_name: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
}

#[must_use]
pub fn channel_comparison(channels: &[ChannelSummary]) -> Vec<ChannelComparison> {
    channels
        .iter()
        .map(|c| ChannelComparison {
            channel_id: c.channel_id.clone(),
            channel_name: c.channel_name.clone(),
            subscriber_count: c.subscriber_count,
            view_count: c.view_count,
            video_count: c.video_count,
        })
        .collect()
}

/// The radar comparison only means something with two or more channels.
#[must_use]
pub fn comparison_available(channels: &[ChannelSummary]) -> bool {
    channels.len() >= 2
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementPoint {
    pub channel_name: String,
    pub title: String,
    pub view_count: u64,
    pub engagement_rate: f64,
}

#[must_use]
pub fn engagement_points(table: &ResultsTable) -> Vec<EngagementPoint> {
    table
        .iter()
        .map(|r| EngagementPoint {
            channel_name: r.channel_name.clone(),
            title: r.title.clone(),
            view_count: r.view_count,
            engagement_rate: r.engagement_rate,
        })
        .collect()
}

/// Least-squares line `engagement_rate = slope * views + intercept` for one
/// channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trendline {
    pub channel_name: String,
    pub slope: f64,
    pub intercept: f64,
}

/// Per-channel trendlines over the engagement scatter.
///
/// Channels with fewer than two videos, or whose videos all have the same view
/// count, get no line.
#[must_use]
pub fn engagement_trends(table: &ResultsTable) -> Vec<Trendline> {
    let mut series: Vec<(&str, Vec<(f64, f64)>)> = Vec::new();
    for row in table {
        #[allow(clippy::cast_precision_loss)]
        let point = (row.view_count as f64, row.engagement_rate);
        match series.iter_mut().find(|(name, _)| *name == row.channel_name) {
            Some((_, points)) => points.push(point),
            None => series.push((row.channel_name.as_str(), vec![point])),
        }
    }

    series
        .into_iter()
        .filter_map(|(name, points)| {
            least_squares(&points).map(|(slope, intercept)| Trendline {
                channel_name: name.to_string(),
                slope,
                intercept,
            })
        })
        .collect()
}

/// Ordinary least squares over `(x, y)` pairs, returning `(slope, intercept)`.
fn least_squares(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });

    if sxx <= 0.0 || !sxx.is_finite() {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationPoint {
    pub channel_name: String,
    pub title: String,
    pub minutes: f64,
    pub view_count: u64,
}

#[must_use]
pub fn duration_points(table: &ResultsTable) -> Vec<DurationPoint> {
    table
        .iter()
        .map(|r| DurationPoint {
            channel_name: r.channel_name.clone(),
            title: r.title.clone(),
            minutes: r.minutes,
            view_count: r.view_count,
        })
        .collect()
}
