//! Aggregation pipeline, reporting projections and the PDF report for one
//! fetch cycle.
//!
//! The pipeline is the only writer of a [`ResultsTable`]; projections and the
//! report exporter read it by shared reference and never mutate it.
//!
//! [`ResultsTable`]: ytdash_core::ResultsTable

pub mod error;
pub mod pipeline;
pub mod projections;
pub mod report;
pub mod types;

mod pdf;

pub use error::PipelineError;
pub use pipeline::run;
pub use projections::{
    channel_comparison, channel_corpora, combined_corpus, comparison_available,
    duration_points, engagement_points, engagement_trends, hourly_average_views,
    overall_metrics, top_by_views, ChannelComparison, ChannelCorpus, DurationPoint,
    EngagementPoint, HourlyViews, OverallMetrics, Trendline,
};
pub use report::{render_report, REPORT_CONTENT_TYPE, REPORT_FILENAME};
pub use types::{FetchCycle, InvalidChannel, NoDataReason};
