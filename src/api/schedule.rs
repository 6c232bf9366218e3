//! Weekly schedule, week navigation and department rollup endpoints.
//!
//! Every read re-fetches from the store before deriving its view. The week a
//! client is looking at is passed as `?weekStart=YYYY-MM-DD` (any date in the
//! week); without it the week containing today is used.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{StaffWithSchedule, HOURS_PER_MONTH};
use crate::schedule::rollup::{FULL_TIME_FALLBACK_HOURS, PART_TIME_FALLBACK_HOURS};
use crate::schedule::{DepartmentRollup, DisplayRow, WeekNavigator, WeekView};
use crate::AppState;

/// The client's displayed week.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekQuery {
    pub week_start: Option<String>,
}

impl WeekQuery {
    fn navigator(&self) -> Result<WeekNavigator, AppError> {
        match self.week_start.as_deref().map(str::trim) {
            None | Some("") => Ok(WeekNavigator::current_week()),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(WeekNavigator::new)
                .map_err(|_| {
                    AppError::BadRequest(format!("Invalid weekStart {:?}, expected YYYY-MM-DD", raw))
                }),
        }
    }
}

/// The schedule grid for the displayed week.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub week: WeekView,
    pub rows: Vec<DisplayRow>,
}

/// GET /api/schedule - One display row per staff member.
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<ScheduleView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let week = match query.navigator() {
        Ok(nav) => nav.range(),
        Err(e) => return error(e, revision_id),
    };
    if let Err(e) = state.board.refresh(week).await {
        return error(e, revision_id);
    }

    let view = ScheduleView {
        week: WeekView::from(week),
        rows: state.board.display_rows().await,
    };
    success(view, revision_id)
}

/// GET /api/schedule/staff - Staff joined with their schedule entries.
pub async fn get_schedule_staff(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Vec<StaffWithSchedule>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let week = match query.navigator() {
        Ok(nav) => nav.range(),
        Err(e) => return error(e, revision_id),
    };
    match state.board.refresh(week).await {
        Ok(_) => success(state.board.staff().await, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/schedule/week - The displayed week.
pub async fn get_week(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<WeekView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match query.navigator() {
        Ok(nav) => success(WeekView::from(nav.range()), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/schedule/week/previous - The week before the displayed one.
pub async fn previous_week(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<WeekView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let range = match query.navigator() {
        Ok(mut nav) => nav.go_to_previous_week(),
        Err(e) => return error(e, revision_id),
    };
    tracing::debug!(week = %range.label(), "Moved to previous week");
    if let Err(e) = state.board.refresh(range).await {
        return error(e, revision_id);
    }
    success(WeekView::from(range), revision_id)
}

/// POST /api/schedule/week/next - The week after the displayed one.
pub async fn next_week(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<WeekView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let range = match query.navigator() {
        Ok(mut nav) => nav.go_to_next_week(),
        Err(e) => return error(e, revision_id),
    };
    tracing::debug!(week = %range.label(), "Moved to next week");
    if let Err(e) = state.board.refresh(range).await {
        return error(e, revision_id);
    }
    success(WeekView::from(range), revision_id)
}

/// GET /api/departments - Headcount, scheduled hours and pay per department.
pub async fn get_departments(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<BTreeMap<String, DepartmentRollup>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let week = match query.navigator() {
        Ok(nav) => nav.range(),
        Err(e) => return error(e, revision_id),
    };
    match state.board.refresh(week).await {
        Ok(_) => success(state.board.department_rollups().await, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// Constants and policies the rollups are computed with.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    pub overnight_shifts: &'static str,
    pub hours_per_month: f64,
    pub full_time_fallback_hours: f64,
    pub part_time_fallback_hours: f64,
}

/// GET /api/schedule/settings
pub async fn get_schedule_settings(State(state): State<AppState>) -> ApiResult<ScheduleSettings> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let settings = ScheduleSettings {
        overnight_shifts: state.config.overnight_policy.as_str(),
        hours_per_month: HOURS_PER_MONTH,
        full_time_fallback_hours: FULL_TIME_FALLBACK_HOURS,
        part_time_fallback_hours: PART_TIME_FALLBACK_HOURS,
    };
    success(settings, revision_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_query_uses_any_date_in_week() {
        let query = WeekQuery {
            week_start: Some("2026-10-22".to_string()),
        };
        assert_eq!(query.navigator().unwrap().label(), "Oct 19, 2026 - Oct 25, 2026");
    }

    #[test]
    fn test_week_query_defaults_to_current_week() {
        let nav = WeekQuery::default().navigator().unwrap();
        assert_eq!(nav.range(), WeekNavigator::current_week().range());

        let blank = WeekQuery {
            week_start: Some(" ".to_string()),
        };
        assert_eq!(blank.navigator().unwrap().range(), nav.range());
    }

    #[test]
    fn test_week_query_rejects_bad_dates() {
        let query = WeekQuery {
            week_start: Some("10/22/2026".to_string()),
        };
        assert!(matches!(query.navigator(), Err(AppError::BadRequest(_))));
    }
}
