//! Per-day schedule lookup and the row-per-staff display model.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::time::format_time_range;
use crate::models::{DayOfWeek, ScheduleEntry, StaffMember, StaffWithSchedule};

pub const OFF: &str = "Off";
pub const PARTIAL_SCHEDULE: &str = "Partial Schedule";

/// One row of the weekly schedule grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub staff_id: String,
    pub staff_name: String,
    pub per_day: BTreeMap<DayOfWeek, String>,
}

/// First entry for `day`. Duplicate entries for the same day are ignored.
pub fn schedule_for_day(staff: &StaffWithSchedule, day: DayOfWeek) -> Option<&ScheduleEntry> {
    staff.schedules.iter().find(|s| s.day_of_week == day)
}

/// Display text for one cell of the grid.
pub fn day_display(entry: Option<&ScheduleEntry>) -> String {
    match entry {
        None => OFF.to_string(),
        Some(e) if e.is_day_off() => OFF.to_string(),
        Some(e) => match (e.start_time.as_deref(), e.end_time.as_deref()) {
            (Some(start), Some(end)) => format_time_range(start, end),
            _ => PARTIAL_SCHEDULE.to_string(),
        },
    }
}

pub fn display_row(staff: &StaffWithSchedule) -> DisplayRow {
    let per_day = DayOfWeek::ALL
        .iter()
        .map(|day| (*day, day_display(schedule_for_day(staff, *day))))
        .collect();

    DisplayRow {
        staff_id: staff.member.id.clone(),
        staff_name: staff.member.name.clone(),
        per_day,
    }
}

pub fn display_rows(staff: &[StaffWithSchedule]) -> Vec<DisplayRow> {
    staff.iter().map(display_row).collect()
}

/// Attach each member's entries, keeping the store's order for both lists.
/// Entries for unknown staff ids are dropped.
pub fn join_schedules(
    staff: Vec<StaffMember>,
    entries: Vec<ScheduleEntry>,
) -> Vec<StaffWithSchedule> {
    let mut by_staff: HashMap<String, Vec<ScheduleEntry>> = HashMap::new();
    for entry in entries {
        by_staff.entry(entry.staff_id.clone()).or_default().push(entry);
    }

    staff
        .into_iter()
        .map(|member| {
            let schedules = by_staff.remove(&member.id).unwrap_or_default();
            StaffWithSchedule::new(member, schedules)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmploymentStatus;

    fn member(id: &str, name: &str) -> StaffMember {
        StaffMember {
            id: id.to_string(),
            name: name.to_string(),
            position: "Server".to_string(),
            department: "Service".to_string(),
            monthly_pay: 2400.0,
            status: EmploymentStatus::PartTime,
            created_at: None,
            updated_at: None,
        }
    }

    fn entry(staff_id: &str, day: DayOfWeek, start: Option<&str>, end: Option<&str>) -> ScheduleEntry {
        ScheduleEntry {
            id: format!("{}-{}", staff_id, day),
            staff_id: staff_id.to_string(),
            day_of_week: day,
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_day_display_policy() {
        assert_eq!(day_display(None), "Off");

        let off = entry("a", DayOfWeek::Monday, None, None);
        assert_eq!(day_display(Some(&off)), "Off");

        let shift = entry("a", DayOfWeek::Monday, Some("09:00:00"), Some("17:00:00"));
        assert_eq!(day_display(Some(&shift)), "9AM-5PM");

        let half_hour = entry("a", DayOfWeek::Monday, Some("09:30:00"), Some("17:00:00"));
        assert_eq!(day_display(Some(&half_hour)), "9:30AM-5PM");

        let start_only = entry("a", DayOfWeek::Monday, Some("09:00:00"), None);
        assert_eq!(day_display(Some(&start_only)), "Partial Schedule");

        let end_only = entry("a", DayOfWeek::Monday, None, Some("17:00:00"));
        assert_eq!(day_display(Some(&end_only)), "Partial Schedule");
    }

    #[test]
    fn test_display_row_covers_every_day() {
        let staff = StaffWithSchedule::new(
            member("a", "Alex Johnson"),
            vec![
                entry("a", DayOfWeek::Tuesday, Some("16:00:00"), Some("22:00:00")),
                entry("a", DayOfWeek::Saturday, Some("12:00:00"), Some("20:00:00")),
            ],
        );

        let row = display_row(&staff);
        assert_eq!(row.staff_name, "Alex Johnson");
        assert_eq!(row.per_day.len(), 7);
        assert_eq!(row.per_day[&DayOfWeek::Monday], "Off");
        assert_eq!(row.per_day[&DayOfWeek::Tuesday], "4PM-10PM");
        assert_eq!(row.per_day[&DayOfWeek::Saturday], "12PM-8PM");
        assert_eq!(row.per_day[&DayOfWeek::Sunday], "Off");
    }

    #[test]
    fn test_first_match_wins() {
        let staff = StaffWithSchedule::new(
            member("a", "Alex"),
            vec![
                entry("a", DayOfWeek::Friday, Some("10:00:00"), Some("14:00:00")),
                entry("a", DayOfWeek::Friday, None, None),
            ],
        );
        assert_eq!(
            display_row(&staff).per_day[&DayOfWeek::Friday],
            "10AM-2PM"
        );
    }

    #[test]
    fn test_malformed_time_falls_back_to_raw() {
        let staff = StaffWithSchedule::new(
            member("a", "Alex"),
            vec![entry("a", DayOfWeek::Monday, Some("opening"), Some("17:00:00"))],
        );
        assert_eq!(
            display_row(&staff).per_day[&DayOfWeek::Monday],
            "opening-5PM"
        );
    }

    #[test]
    fn test_display_row_is_idempotent() {
        let staff = StaffWithSchedule::new(
            member("a", "Alex"),
            vec![entry("a", DayOfWeek::Monday, Some("09:00:00"), Some("17:00:00"))],
        );
        let before = staff.clone();
        let first = display_row(&staff);
        let second = display_row(&staff);
        assert_eq!(first, second);
        assert_eq!(staff.schedules, before.schedules);
    }

    #[test]
    fn test_per_day_serializes_in_week_order() {
        let row = display_row(&StaffWithSchedule::new(member("a", "Alex"), vec![]));
        let json = serde_json::to_string(&row.per_day).unwrap();
        assert!(json.starts_with("{\"monday\":\"Off\",\"tuesday\""));
        assert!(json.ends_with("\"sunday\":\"Off\"}"));
    }

    #[test]
    fn test_join_schedules() {
        let staff = vec![member("a", "Alex"), member("b", "Blake")];
        let entries = vec![
            entry("b", DayOfWeek::Monday, Some("09:00:00"), Some("17:00:00")),
            entry("ghost", DayOfWeek::Monday, Some("09:00:00"), Some("17:00:00")),
            entry("b", DayOfWeek::Tuesday, None, None),
        ];

        let joined = join_schedules(staff, entries);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].member.id, "a");
        assert!(joined[0].schedules.is_empty());
        assert_eq!(joined[1].schedules.len(), 2);
        assert_eq!(joined[1].schedules[0].day_of_week, DayOfWeek::Monday);
    }
}
