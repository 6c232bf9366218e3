//! Time clock API endpoints.

use axum::extract::{Path, State};

use super::{error, success, ApiResult};
use crate::db::RECENT_TIME_CLOCK_LIMIT;
use crate::models::TimeClockEntry;
use crate::AppState;

/// GET /api/staff/:id/time-clock - Recent time clock activity.
pub async fn list_time_clock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<TimeClockEntry>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .repo
        .recent_time_clock(&id, RECENT_TIME_CLOCK_LIMIT)
        .await
    {
        Ok(entries) => success(entries, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/staff/:id/clock-in
pub async fn clock_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TimeClockEntry> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.clock_in(&id).await {
        Ok(entry) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/staff/:id/clock-out
pub async fn clock_out(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TimeClockEntry> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.clock_out(&id).await {
        Ok(entry) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
