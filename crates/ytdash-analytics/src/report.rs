//! Fixed-layout PDF summary of one fetch cycle.

use ytdash_core::{ChannelSummary, ResultsTable};

use crate::pdf::{Font, PdfDocument};
use crate::projections::{overall_metrics, top_by_views};

pub const REPORT_FILENAME: &str = "youtube_analytics_report.pdf";
pub const REPORT_CONTENT_TYPE: &str = "application/pdf";

/// Rows listed in the report's top-videos section.
pub const REPORT_TOP_N: usize = 10;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const SECTION_GAP: f32 = 12.0;

/// Renders the report: title, channel overview, aggregate statistics and the
/// top videos by views, in that order.
///
/// Output is byte-for-byte deterministic for the same input. Empty channel
/// lists and empty tables render placeholder lines and zero totals.
#[must_use]
pub fn render_report(table: &ResultsTable, channels: &[ChannelSummary]) -> Vec<u8> {
    let mut doc = PdfDocument::new();

    doc.text("YouTube Analytics Report", Font::Bold, TITLE_SIZE);
    doc.space(SECTION_GAP);

    doc.text("Channel Overview", Font::Bold, HEADING_SIZE);
    if channels.is_empty() {
        doc.text("No channels.", Font::Regular, BODY_SIZE);
    }
    for ch in channels {
        doc.text(
            &format!(
                "- {}: {} subscribers, {} views, {} videos",
                ch.channel_name,
                thousands(ch.subscriber_count),
                thousands(ch.view_count),
                thousands(ch.video_count)
            ),
            Font::Regular,
            BODY_SIZE,
        );
    }
    doc.space(SECTION_GAP);

    let metrics = overall_metrics(table);
    doc.text("Overall Video Statistics", Font::Bold, HEADING_SIZE);
    doc.text(
        &format!("Total Views: {}", thousands(metrics.total_views)),
        Font::Regular,
        BODY_SIZE,
    );
    doc.text(
        &format!("Total Videos: {}", thousands(metrics.total_videos as u64)),
        Font::Regular,
        BODY_SIZE,
    );
    doc.text(
        &format!("Avg Engagement: {}", percent(metrics.mean_engagement_rate)),
        Font::Regular,
        BODY_SIZE,
    );
    doc.space(SECTION_GAP);

    doc.text("Top 10 Most Viewed Videos", Font::Bold, HEADING_SIZE);
    let top = top_by_views(table, REPORT_TOP_N);
    if top.is_empty() {
        doc.text("No videos.", Font::Regular, BODY_SIZE);
    }
    for video in top {
        doc.text(
            &format!(
                "{} \u{2013} {} views ({})",
                video.title,
                thousands(video.view_count),
                video.channel_name
            ),
            Font::Regular,
            BODY_SIZE,
        );
    }

    doc.finish()
}

/// `1234567` -> `"1,234,567"`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fraction to percentage with two decimals: `0.1234` -> `"12.34%"`.
fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}
