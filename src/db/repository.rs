//! Database repository for staff, schedule and time clock operations.
//!
//! Writes are last-write-wins; there is no version check on staff or schedules.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    hourly_rate_from_monthly, monthly_pay_from_hourly, CreateStaffRequest, DayOfWeek,
    RevisionInfo, ScheduleEntry, StaffMember, TimeClockEntry, UpdateStaffRequest,
};
use crate::schedule::{ScheduleSource, WeekRange};

/// Number of time clock entries shown on the staff details view.
pub const RECENT_TIME_CLOCK_LIMIT: i64 = 10;

const STAFF_COLUMNS: &str =
    "id, name, position, department, hourly_rate, status, created_at, updated_at";
const SCHEDULE_COLUMNS: &str =
    "id, staff_id, day_of_week, start_time, end_time, created_at, updated_at";
const TIME_CLOCK_COLUMNS: &str =
    "id, staff_id, clock_in, clock_out, total_hours, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    // ==================== STAFF OPERATIONS ====================

    /// List all staff members ordered by name.
    pub async fn list_staff(&self) -> Result<Vec<StaffMember>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM staff_members ORDER BY name",
            STAFF_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(staff_from_row).collect())
    }

    /// Get a staff member by ID.
    pub async fn get_staff(&self, id: &str) -> Result<Option<StaffMember>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM staff_members WHERE id = ?",
            STAFF_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(staff_from_row))
    }

    async fn require_staff(&self, id: &str) -> Result<StaffMember, AppError> {
        self.get_staff(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
    }

    /// Add a staff member. Monthly pay is stored as an hourly rate.
    pub async fn create_staff(&self, request: &CreateStaffRequest) -> Result<StaffMember, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO staff_members (id, name, position, department, hourly_rate, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(request.name.trim())
        .bind(request.position.trim())
        .bind(request.department.trim())
        .bind(hourly_rate_from_monthly(request.monthly_pay))
        .bind(request.status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        tracing::info!(staff_id = %id, department = %request.department, "Staff member added");

        self.require_staff(&id).await
    }

    /// Update a staff member. Absent fields keep their stored value.
    pub async fn update_staff(
        &self,
        id: &str,
        request: &UpdateStaffRequest,
    ) -> Result<StaffMember, AppError> {
        let existing = self.require_staff(id).await?;
        let now = Utc::now().to_rfc3339();

        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or(existing.name.as_str());
        let position = request
            .position
            .as_deref()
            .map(str::trim)
            .unwrap_or(existing.position.as_str());
        let department = request
            .department
            .as_deref()
            .map(str::trim)
            .unwrap_or(existing.department.as_str());
        let monthly_pay = request.monthly_pay.unwrap_or(existing.monthly_pay);
        let status = request.status.as_ref().unwrap_or(&existing.status);

        sqlx::query(
            "UPDATE staff_members SET name = ?, position = ?, department = ?, hourly_rate = ?, status = ?, updated_at = ? WHERE id = ?"
        )
        .bind(name)
        .bind(position)
        .bind(department)
        .bind(hourly_rate_from_monthly(monthly_pay))
        .bind(status.as_str())
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        self.require_staff(id).await
    }

    // ==================== SCHEDULE OPERATIONS ====================

    /// Schedule template entries for one staff member.
    pub async fn list_schedules_for_staff(
        &self,
        staff_id: &str,
    ) -> Result<Vec<ScheduleEntry>, AppError> {
        self.require_staff(staff_id).await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM staff_schedules WHERE staff_id = ? ORDER BY created_at, id",
            SCHEDULE_COLUMNS
        ))
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(schedule_from_row).collect())
    }

    /// Schedule entries belonging to any of `staff_ids`.
    pub async fn list_schedules(&self, staff_ids: &[String]) -> Result<Vec<ScheduleEntry>, AppError> {
        if staff_ids.is_empty() {
            return Ok(Vec::new());
        }

        let wanted: HashSet<&str> = staff_ids.iter().map(String::as_str).collect();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM staff_schedules ORDER BY created_at, id",
            SCHEDULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .filter_map(schedule_from_row)
            .filter(|entry| wanted.contains(entry.staff_id.as_str()))
            .collect())
    }

    async fn get_schedule(
        &self,
        staff_id: &str,
        day: DayOfWeek,
    ) -> Result<Option<ScheduleEntry>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM staff_schedules WHERE staff_id = ? AND day_of_week = ?",
            SCHEDULE_COLUMNS
        ))
        .bind(staff_id)
        .bind(day.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(schedule_from_row))
    }

    /// Create or replace one day of a staff member's schedule.
    pub async fn upsert_schedule(
        &self,
        staff_id: &str,
        day: DayOfWeek,
        start_time: Option<String>,
        end_time: Option<String>,
    ) -> Result<ScheduleEntry, AppError> {
        self.require_staff(staff_id).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO staff_schedules (id, staff_id, day_of_week, start_time, end_time, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (staff_id, day_of_week) DO UPDATE SET
                   start_time = excluded.start_time,
                   end_time = excluded.end_time,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&id)
        .bind(staff_id)
        .bind(day.as_str())
        .bind(&start_time)
        .bind(&end_time)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        tracing::info!(staff_id, day = %day, "Schedule updated");

        self.get_schedule(staff_id, day).await?.ok_or_else(|| {
            AppError::Internal(format!("Schedule for {} on {} vanished after write", staff_id, day))
        })
    }

    /// Clear both times of an existing entry. Returns `None` when the staff
    /// member has no entry for that day.
    pub async fn clear_schedule(
        &self,
        staff_id: &str,
        day: DayOfWeek,
    ) -> Result<Option<ScheduleEntry>, AppError> {
        self.require_staff(staff_id).await?;

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE staff_schedules SET start_time = NULL, end_time = NULL, updated_at = ? WHERE staff_id = ? AND day_of_week = ?"
        )
        .bind(&now)
        .bind(staff_id)
        .bind(day.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.increment_revision().await?;
        tracing::info!(staff_id, day = %day, "Day off set");

        self.get_schedule(staff_id, day).await
    }

    // ==================== TIME CLOCK OPERATIONS ====================

    async fn open_time_clock(&self, staff_id: &str) -> Result<Option<TimeClockEntry>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM time_clock WHERE staff_id = ? AND clock_out IS NULL LIMIT 1",
            TIME_CLOCK_COLUMNS
        ))
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .as_ref()
            .map(time_clock_from_row)
            .filter(TimeClockEntry::is_open))
    }

    /// Open a time clock entry. Fails if one is already open.
    pub async fn clock_in(&self, staff_id: &str) -> Result<TimeClockEntry, AppError> {
        self.require_staff(staff_id).await?;

        if self.open_time_clock(staff_id).await?.is_some() {
            return Err(already_clocked_in());
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let inserted = sqlx::query(
            "INSERT INTO time_clock (id, staff_id, clock_in, clock_out, total_hours, created_at, updated_at) VALUES (?, ?, ?, NULL, NULL, ?, ?)"
        )
        .bind(&id)
        .bind(staff_id)
        .bind(&now)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            // The partial unique index on open entries caught a concurrent clock-in.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(already_clocked_in());
            }
            Err(e) => return Err(e.into()),
        }

        self.increment_revision().await?;
        tracing::info!(staff_id, "Clocked in");

        Ok(TimeClockEntry {
            id,
            staff_id: staff_id.to_string(),
            clock_in: Some(now.clone()),
            clock_out: None,
            total_hours: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Close the open time clock entry and record the hours worked.
    pub async fn clock_out(&self, staff_id: &str) -> Result<TimeClockEntry, AppError> {
        self.require_staff(staff_id).await?;

        let open = self.open_time_clock(staff_id).await?.ok_or_else(|| {
            AppError::Conflict("This staff member is not currently clocked in.".to_string())
        })?;

        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let total_hours = open
            .clock_in
            .as_deref()
            .and_then(|raw| match DateTime::parse_from_rfc3339(raw) {
                Ok(clock_in) => Some(hours_between(clock_in.with_timezone(&Utc), now)),
                Err(e) => {
                    tracing::warn!(entry_id = %open.id, "Unreadable clock-in timestamp: {}", e);
                    None
                }
            });

        sqlx::query(
            "UPDATE time_clock SET clock_out = ?, total_hours = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&now_str)
        .bind(total_hours)
        .bind(&now_str)
        .bind(&open.id)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        tracing::info!(staff_id, hours = ?total_hours, "Clocked out");

        Ok(TimeClockEntry {
            clock_out: Some(now_str.clone()),
            total_hours,
            updated_at: now_str,
            ..open
        })
    }

    /// Most recent time clock entries for a staff member, newest first.
    pub async fn recent_time_clock(
        &self,
        staff_id: &str,
        limit: i64,
    ) -> Result<Vec<TimeClockEntry>, AppError> {
        self.require_staff(staff_id).await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM time_clock WHERE staff_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
            TIME_CLOCK_COLUMNS
        ))
        .bind(staff_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(time_clock_from_row).collect())
    }
}

impl ScheduleSource for Repository {
    async fn list_staff_members(&self) -> Result<Vec<StaffMember>, AppError> {
        self.list_staff().await
    }

    async fn list_schedule_entries_for_week(
        &self,
        staff_ids: &[String],
        week: WeekRange,
    ) -> Result<Vec<ScheduleEntry>, AppError> {
        tracing::debug!(week = %week.label(), staff = staff_ids.len(), "Loading schedule templates");
        self.list_schedules(staff_ids).await
    }

    async fn upsert_schedule_entry(
        &self,
        staff_id: &str,
        day: DayOfWeek,
        start_time: Option<String>,
        end_time: Option<String>,
    ) -> Result<ScheduleEntry, AppError> {
        self.upsert_schedule(staff_id, day, start_time, end_time).await
    }

    async fn set_day_off(
        &self,
        staff_id: &str,
        day: DayOfWeek,
    ) -> Result<Option<ScheduleEntry>, AppError> {
        self.clear_schedule(staff_id, day).await
    }
}

fn already_clocked_in() -> AppError {
    AppError::Conflict("This staff member is already clocked in.".to_string())
}

/// Elapsed hours rounded to two decimals.
fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let hours = (end - start).num_seconds() as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}

// ==================== ROW MAPPING ====================

fn staff_from_row(row: &sqlx::sqlite::SqliteRow) -> StaffMember {
    let hourly_rate: f64 = row.get("hourly_rate");
    let status: String = row.get("status");
    StaffMember {
        id: row.get("id"),
        name: row.get("name"),
        position: row.get("position"),
        department: row.get("department"),
        monthly_pay: monthly_pay_from_hourly(hourly_rate),
        status: status.into(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn schedule_from_row(row: &sqlx::sqlite::SqliteRow) -> Option<ScheduleEntry> {
    let id: String = row.get("id");
    let day: String = row.get("day_of_week");
    let Some(day_of_week) = DayOfWeek::from_str(&day) else {
        tracing::warn!(schedule_id = %id, day = %day, "Skipping schedule with unknown weekday");
        return None;
    };

    Some(ScheduleEntry {
        id,
        staff_id: row.get("staff_id"),
        day_of_week,
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn time_clock_from_row(row: &sqlx::sqlite::SqliteRow) -> TimeClockEntry {
    TimeClockEntry {
        id: row.get("id"),
        staff_id: row.get("staff_id"),
        clock_in: row.get("clock_in"),
        clock_out: row.get("clock_out"),
        total_hours: row.get("total_hours"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::EmploymentStatus;
    use chrono::Duration;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn new_staff(name: &str, department: &str, monthly_pay: f64) -> CreateStaffRequest {
        CreateStaffRequest {
            name: name.to_string(),
            position: "Server".to_string(),
            department: department.to_string(),
            monthly_pay,
            status: EmploymentStatus::PartTime,
        }
    }

    #[test]
    fn test_hours_between_rounds() {
        let start = Utc::now();
        assert_eq!(hours_between(start, start + Duration::minutes(90)), 1.5);
        assert_eq!(hours_between(start, start + Duration::seconds(1000)), 0.28);
    }

    #[tokio::test]
    async fn test_staff_pay_round_trips_through_hourly_rate() {
        let (repo, _dir) = repo().await;
        let created = repo.create_staff(&new_staff("Alex Johnson", "Service", 2400.0)).await.unwrap();
        assert_eq!(created.monthly_pay, 2400.0);

        let row = sqlx::query("SELECT hourly_rate FROM staff_members WHERE id = ?")
            .bind(&created.id)
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        let hourly: f64 = row.get("hourly_rate");
        assert_eq!(hourly, 15.0);
    }

    #[tokio::test]
    async fn test_staff_listed_by_name() {
        let (repo, _dir) = repo().await;
        repo.create_staff(&new_staff("Sarah Wilson", "Bar", 2960.0)).await.unwrap();
        repo.create_staff(&new_staff("Emily Davis", "Service", 2400.0)).await.unwrap();

        let names: Vec<String> = repo.list_staff().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Emily Davis", "Sarah Wilson"]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_day() {
        let (repo, _dir) = repo().await;
        let staff = repo.create_staff(&new_staff("Michael Brown", "Service", 2240.0)).await.unwrap();

        let first = repo
            .upsert_schedule(&staff.id, DayOfWeek::Wednesday, Some("17:00:00".into()), Some("21:00:00".into()))
            .await
            .unwrap();
        let second = repo
            .upsert_schedule(&staff.id, DayOfWeek::Wednesday, Some("12:00:00".into()), Some("20:00:00".into()))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.start_time.as_deref(), Some("12:00:00"));
        assert_eq!(repo.list_schedules_for_staff(&staff.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_schedule_without_entry_is_none() {
        let (repo, _dir) = repo().await;
        let staff = repo.create_staff(&new_staff("Michael Brown", "Service", 2240.0)).await.unwrap();
        let before = repo.get_revision_id().await.unwrap();

        assert!(repo.clear_schedule(&staff.id, DayOfWeek::Monday).await.unwrap().is_none());
        assert_eq!(repo.get_revision_id().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_weekday_rows_are_skipped() {
        let (repo, _dir) = repo().await;
        let staff = repo.create_staff(&new_staff("Maria Garcia", "Kitchen", 3520.0)).await.unwrap();
        sqlx::query(
            "INSERT INTO staff_schedules (id, staff_id, day_of_week, start_time, end_time, created_at, updated_at) VALUES ('x', ?, 'Funday', '09:00:00', '17:00:00', 'now', 'now')"
        )
        .bind(&staff.id)
        .execute(&repo.pool)
        .await
        .unwrap();

        assert!(repo.list_schedules(&[staff.id.clone()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_filter_by_staff_ids() {
        let (repo, _dir) = repo().await;
        let a = repo.create_staff(&new_staff("Alex Johnson", "Service", 2400.0)).await.unwrap();
        let b = repo.create_staff(&new_staff("Blake Hill", "Bar", 2400.0)).await.unwrap();
        repo.upsert_schedule(&a.id, DayOfWeek::Monday, None, None).await.unwrap();
        repo.upsert_schedule(&b.id, DayOfWeek::Monday, None, None).await.unwrap();

        let only_a = repo.list_schedules(&[a.id.clone()]).await.unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].staff_id, a.id);
        assert!(repo.list_schedules(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clock_in_and_out() {
        let (repo, _dir) = repo().await;
        let staff = repo.create_staff(&new_staff("John Smith", "Kitchen", 4560.0)).await.unwrap();

        let opened = repo.clock_in(&staff.id).await.unwrap();
        assert!(opened.is_open());
        assert!(matches!(repo.clock_in(&staff.id).await, Err(AppError::Conflict(_))));

        let closed = repo.clock_out(&staff.id).await.unwrap();
        assert_eq!(closed.id, opened.id);
        assert!(!closed.is_open());
        assert!(closed.total_hours.unwrap() >= 0.0);
        assert!(matches!(repo.clock_out(&staff.id).await, Err(AppError::Conflict(_))));

        let recent = repo.recent_time_clock(&staff.id, RECENT_TIME_CLOCK_LIMIT).await.unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_staff_is_not_found() {
        let (repo, _dir) = repo().await;
        assert!(matches!(repo.clock_in("missing").await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.upsert_schedule("missing", DayOfWeek::Monday, None, None).await,
            Err(AppError::NotFound(_))
        ));
    }
}
