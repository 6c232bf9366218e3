//! Staff and per-day schedule API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, parse_day, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateStaffRequest, ScheduleEntry, StaffMember, UpdateStaffRequest, UpsertScheduleRequest,
};
use crate::AppState;

/// GET /api/staff - List all staff members.
pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Vec<StaffMember>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_staff().await {
        Ok(staff) => success(staff, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/staff/:id - Get a single staff member.
pub async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StaffMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_staff(&id).await {
        Ok(Some(staff)) => success(staff, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Staff member {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/staff - Add a staff member.
pub async fn create_staff(
    State(state): State<AppState>,
    Json(request): Json<CreateStaffRequest>,
) -> ApiResult<StaffMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = request.validate() {
        return error(e, revision_id);
    }

    match state.repo.create_staff(&request).await {
        Ok(staff) => {
            state.board.refresh_after_write().await;
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(staff, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/staff/:id - Edit a staff member.
pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStaffRequest>,
) -> ApiResult<StaffMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = request.validate() {
        return error(e, revision_id);
    }

    match state.repo.update_staff(&id, &request).await {
        Ok(staff) => {
            state.board.refresh_after_write().await;
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(staff, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/staff/:id/schedule - The staff member's weekly template.
pub async fn get_staff_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<ScheduleEntry>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_schedules_for_staff(&id).await {
        Ok(entries) => success(entries, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/staff/:id/schedule/:day - Set the working window for one day.
pub async fn update_schedule_day(
    State(state): State<AppState>,
    Path((id, day)): Path<(String, String)>,
    Json(request): Json<UpsertScheduleRequest>,
) -> ApiResult<ScheduleEntry> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let day = match parse_day(&day) {
        Ok(day) => day,
        Err(e) => return error(e, revision_id),
    };
    let (start_time, end_time) = match request.normalized() {
        Ok(times) => times,
        Err(e) => return error(e, revision_id),
    };

    match state
        .board
        .save_schedule_entry(&id, day, start_time, end_time)
        .await
    {
        Ok(entry) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/staff/:id/schedule/:day - Mark the day as a day off.
///
/// Returns `null` data when there was no entry to clear.
pub async fn set_day_off(
    State(state): State<AppState>,
    Path((id, day)): Path<(String, String)>,
) -> ApiResult<Option<ScheduleEntry>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let day = match parse_day(&day) {
        Ok(day) => day,
        Err(e) => return error(e, revision_id),
    };

    match state.board.set_day_off(&id, day).await {
        Ok(entry) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(entry, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
