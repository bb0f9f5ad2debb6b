use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use ytdash_analytics::PipelineError;
use ytdash_core::{DateWindow, FetchRequest, ValidationError};
use ytdash_youtube::MetadataAdapter;

use crate::middleware::{RequestId, SessionContext};

use super::dashboard::DashboardView;
use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct FetchBody {
    /// Newline-separated channel IDs, as typed into the dashboard.
    channel_ids: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    max_videos_per_channel: Option<usize>,
}

/// Runs one fetch action and replaces the session's cycle with its result.
///
/// Input errors are rejected before any provider call. A missing provider
/// leaves the previous cycle in place; success and the "no data" state both
/// replace it.
pub(super) async fn run_fetch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<FetchBody>,
) -> Result<Json<ApiResponse<DashboardView>>, ApiError> {
    let validation =
        |e: ValidationError| ApiError::new(req_id.0.clone(), "validation_error", e.to_string());

    let window = DateWindow::resolve(body.start_date, body.end_date, Utc::now().date_naive())
        .map_err(validation)?;
    let max_videos = body
        .max_videos_per_channel
        .unwrap_or(state.config.max_videos_per_channel);
    let request =
        FetchRequest::from_text(&body.channel_ids, window, max_videos).map_err(validation)?;

    let unavailable = || {
        ApiError::new(
            req_id.0.clone(),
            "provider_unavailable",
            PipelineError::ProviderUnavailable.to_string(),
        )
    };
    let client = state.youtube.as_deref().ok_or_else(unavailable)?;

    tracing::info!(
        email = %session.email,
        channels = request.channel_ids().len(),
        start = %window.start(),
        end = %window.end(),
        "fetch requested"
    );

    let adapter = MetadataAdapter::new(client);
    let cycle = ytdash_analytics::run(&adapter, &request)
        .await
        .map_err(|e| match e {
            PipelineError::ProviderUnavailable => unavailable(),
        })?;

    let cycle = Arc::new(cycle);
    if !state.sessions.store_cycle(session.token, Arc::clone(&cycle)).await {
        tracing::warn!(email = %session.email, "session ended during fetch; cycle discarded");
    }

    Ok(Json(ApiResponse::new(
        req_id.0.clone(),
        DashboardView::from_cycle(&cycle),
    )))
}
