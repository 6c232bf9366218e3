//! The schedule board: fetched staff data and the derived views computed
//! from it.
//!
//! Every refresh re-fetches everything and replaces the snapshot; nothing is
//! updated incrementally. Refreshes are numbered so that a slow fetch that
//! completes after a newer one cannot overwrite it.
//!
//! The board holds no per-client state. Which week a client is looking at
//! travels with each request and is passed in to `refresh`.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use super::aggregator::{display_rows, join_schedules, DisplayRow};
use super::rollup::{department_rollups, DepartmentRollup, OvernightPolicy};
use super::week::WeekRange;
use crate::errors::AppError;
use crate::models::{DayOfWeek, ScheduleEntry, StaffMember, StaffWithSchedule};

/// Data access the board needs from the store.
pub trait ScheduleSource: Send + Sync {
    fn list_staff_members(
        &self,
    ) -> impl Future<Output = Result<Vec<StaffMember>, AppError>> + Send;

    /// Schedules are day-of-week templates; `week` does not filter them.
    fn list_schedule_entries_for_week(
        &self,
        staff_ids: &[String],
        week: WeekRange,
    ) -> impl Future<Output = Result<Vec<ScheduleEntry>, AppError>> + Send;

    fn upsert_schedule_entry(
        &self,
        staff_id: &str,
        day: DayOfWeek,
        start_time: Option<String>,
        end_time: Option<String>,
    ) -> impl Future<Output = Result<ScheduleEntry, AppError>> + Send;

    /// Clear both times of an existing entry. `None` when there is no entry.
    fn set_day_off(
        &self,
        staff_id: &str,
        day: DayOfWeek,
    ) -> impl Future<Output = Result<Option<ScheduleEntry>, AppError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RefreshToken(u64);

#[derive(Debug)]
struct Snapshot {
    token: u64,
    week: WeekRange,
    staff: Vec<StaffWithSchedule>,
}

pub struct ScheduleBoard<S> {
    source: S,
    policy: OvernightPolicy,
    snapshot: RwLock<Snapshot>,
    issued: AtomicU64,
}

impl<S: ScheduleSource> ScheduleBoard<S> {
    /// Writes refresh for `week` until the first read names another one.
    pub fn new(source: S, week: WeekRange, policy: OvernightPolicy) -> Self {
        Self {
            source,
            policy,
            snapshot: RwLock::new(Snapshot {
                token: 0,
                week,
                staff: Vec::new(),
            }),
            issued: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> OvernightPolicy {
        self.policy
    }

    /// Fetch staff and schedules for `week` and replace the snapshot.
    /// Returns `false` when a newer refresh already landed.
    pub async fn refresh(&self, week: WeekRange) -> Result<bool, AppError> {
        let token = self.begin_refresh();

        let staff = self.source.list_staff_members().await?;
        let staff_ids: Vec<String> = staff.iter().map(|s| s.id.clone()).collect();
        let entries = self
            .source
            .list_schedule_entries_for_week(&staff_ids, week)
            .await?;

        Ok(self.apply(token, week, join_schedules(staff, entries)).await)
    }

    /// Refresh for the week of the last applied snapshot.
    async fn refresh_latest(&self) -> Result<bool, AppError> {
        let week = self.snapshot.read().await.week;
        self.refresh(week).await
    }

    /// Refresh after a committed write. The write stands either way; a
    /// failed re-fetch only leaves the snapshot stale until the next read.
    pub async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh_latest().await {
            tracing::warn!("Schedule board refresh after write failed: {}", e);
        }
    }

    fn begin_refresh(&self) -> RefreshToken {
        RefreshToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn apply(
        &self,
        token: RefreshToken,
        week: WeekRange,
        staff: Vec<StaffWithSchedule>,
    ) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if token.0 <= snapshot.token {
            tracing::debug!(
                stale = token.0,
                applied = snapshot.token,
                "Discarding stale schedule refresh"
            );
            return false;
        }

        tracing::debug!(token = token.0, staff = staff.len(), "Schedule snapshot refreshed");
        *snapshot = Snapshot {
            token: token.0,
            week,
            staff,
        };
        true
    }

    pub async fn staff(&self) -> Vec<StaffWithSchedule> {
        self.snapshot.read().await.staff.clone()
    }

    pub async fn display_rows(&self) -> Vec<DisplayRow> {
        display_rows(&self.snapshot.read().await.staff)
    }

    pub async fn department_rollups(&self) -> BTreeMap<String, DepartmentRollup> {
        department_rollups(&self.snapshot.read().await.staff, self.policy)
    }

    /// Write one day of a schedule, then refresh.
    pub async fn save_schedule_entry(
        &self,
        staff_id: &str,
        day: DayOfWeek,
        start_time: Option<String>,
        end_time: Option<String>,
    ) -> Result<ScheduleEntry, AppError> {
        let entry = self
            .source
            .upsert_schedule_entry(staff_id, day, start_time, end_time)
            .await?;
        self.refresh_after_write().await;
        Ok(entry)
    }

    /// Mark a day off, then refresh. Nothing happens without an existing entry.
    pub async fn set_day_off(
        &self,
        staff_id: &str,
        day: DayOfWeek,
    ) -> Result<Option<ScheduleEntry>, AppError> {
        let entry = self.source.set_day_off(staff_id, day).await?;
        if entry.is_some() {
            self.refresh_after_write().await;
        }
        Ok(entry)
    }
}
