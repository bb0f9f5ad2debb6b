use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use serde::Serialize;
use ytdash_analytics::{
    channel_comparison, channel_corpora, combined_corpus, comparison_available, duration_points,
    engagement_points, engagement_trends, hourly_average_views, overall_metrics, top_by_views,
    ChannelComparison, ChannelCorpus, DurationPoint, EngagementPoint, FetchCycle, HourlyViews,
    InvalidChannel, NoDataReason, OverallMetrics, Trendline,
};
use ytdash_core::VideoRecord;

use crate::middleware::{RequestId, SessionContext};

use super::{ApiError, ApiResponse, AppState};

/// Rows shown in the "most viewed" chart.
const DASHBOARD_TOP_N: usize = 15;

/// Everything the dashboard page renders for one fetch cycle.
#[derive(Debug, Serialize)]
pub(super) struct DashboardView {
    status: &'static str,
    no_data_reason: Option<NoDataReason>,
    message: Option<&'static str>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    metrics: OverallMetrics,
    channels: Vec<ChannelComparison>,
    invalid_channels: Vec<InvalidChannel>,
    comparison_available: bool,
    top_videos: Vec<VideoRecord>,
    hourly_views: Vec<HourlyViews>,
    engagement_points: Vec<EngagementPoint>,
    engagement_trends: Vec<Trendline>,
    duration_points: Vec<DurationPoint>,
    combined_corpus: String,
    channel_corpora: Vec<ChannelCorpus>,
    provider_calls: u32,
}

impl DashboardView {
    pub(super) fn from_cycle(cycle: &FetchCycle) -> Self {
        let table = &cycle.table;
        Self {
            status: if cycle.is_no_data() { "no_data" } else { "ok" },
            no_data_reason: cycle.no_data,
            message: cycle.no_data.map(NoDataReason::message),
            start_date: cycle.window.start(),
            end_date: cycle.window.end(),
            metrics: overall_metrics(table),
            channels: channel_comparison(&cycle.channels),
            invalid_channels: cycle.invalid_channels.clone(),
            comparison_available: comparison_available(&cycle.channels),
            top_videos: top_by_views(table, DASHBOARD_TOP_N)
                .into_iter()
                .cloned()
                .collect(),
            hourly_views: hourly_average_views(table),
            engagement_points: engagement_points(table),
            engagement_trends: engagement_trends(table),
            duration_points: duration_points(table),
            combined_corpus: combined_corpus(table),
            channel_corpora: channel_corpora(table),
            provider_calls: cycle.provider_calls,
        }
    }
}

/// Returns the dashboard for the session's last fetch cycle.
pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<ApiResponse<DashboardView>>, ApiError> {
    let cycle = state
        .sessions
        .get(session.token)
        .await
        .and_then(|s| s.last_cycle)
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                "no fetch has been run in this session",
            )
        })?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        DashboardView::from_cycle(&cycle),
    )))
}
