//! Department rollups: headcount, scheduled hours and pay per department.

use std::collections::BTreeMap;

use serde::Serialize;

use super::aggregator::schedule_for_day;
use super::time::decimal_hours;
use crate::models::{DayOfWeek, EmploymentStatus, ScheduleEntry, StaffWithSchedule};

/// Weekly hours assumed for a full-time member with no schedule entries.
pub const FULL_TIME_FALLBACK_HOURS: f64 = 40.0;
/// Weekly hours assumed for anyone else with no schedule entries.
pub const PART_TIME_FALLBACK_HOURS: f64 = 25.0;

/// What to do with a shift whose end time is earlier than its start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OvernightPolicy {
    /// Count `end - start` as is, which is negative.
    #[default]
    Preserve,
    /// Count the shift as zero hours.
    Clamp,
    /// Treat the shift as ending the next day.
    Wrap,
}

impl OvernightPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OvernightPolicy::Preserve => "preserve",
            OvernightPolicy::Clamp => "clamp",
            OvernightPolicy::Wrap => "wrap",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Some(OvernightPolicy::Preserve),
            "clamp" => Some(OvernightPolicy::Clamp),
            "wrap" => Some(OvernightPolicy::Wrap),
            _ => None,
        }
    }
}

/// Aggregate figures for one department.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRollup {
    pub member_count: usize,
    pub total_hours: f64,
    pub total_pay: f64,
}

/// Hours of a single entry. Entries missing either time, or with a
/// malformed one, count as zero.
pub fn shift_hours(entry: &ScheduleEntry, policy: OvernightPolicy) -> f64 {
    let (Some(start), Some(end)) = (entry.start_time.as_deref(), entry.end_time.as_deref()) else {
        return 0.0;
    };

    let (start, end) = match (decimal_hours(start), decimal_hours(end)) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(
                staff_id = %entry.staff_id,
                day = %entry.day_of_week,
                "Ignoring shift in rollup: {}",
                e
            );
            return 0.0;
        }
    };

    let span = end - start;
    if span >= 0.0 {
        return span;
    }

    match policy {
        OvernightPolicy::Preserve => {
            tracing::debug!(
                staff_id = %entry.staff_id,
                day = %entry.day_of_week,
                "Overnight shift counted as {} hours",
                span
            );
            span
        }
        OvernightPolicy::Clamp => 0.0,
        OvernightPolicy::Wrap => span + 24.0,
    }
}

/// Weekly hours for one staff member. Uses the status-based estimate when
/// the member has no schedule entries at all.
pub fn scheduled_hours(staff: &StaffWithSchedule, policy: OvernightPolicy) -> f64 {
    if staff.schedules.is_empty() {
        return fallback_hours(&staff.member.status);
    }

    DayOfWeek::ALL
        .iter()
        .filter_map(|day| schedule_for_day(staff, *day))
        .map(|entry| shift_hours(entry, policy))
        .sum()
}

fn fallback_hours(status: &EmploymentStatus) -> f64 {
    if status.is_full_time() {
        FULL_TIME_FALLBACK_HOURS
    } else {
        PART_TIME_FALLBACK_HOURS
    }
}

/// Fold the staff list into per-department totals, keyed by department name.
pub fn department_rollups(
    staff: &[StaffWithSchedule],
    policy: OvernightPolicy,
) -> BTreeMap<String, DepartmentRollup> {
    staff.iter().fold(BTreeMap::new(), |mut acc, member| {
        let rollup: &mut DepartmentRollup =
            acc.entry(member.member.department.clone()).or_default();
        rollup.member_count += 1;
        rollup.total_pay += member.member.monthly_pay;
        rollup.total_hours += scheduled_hours(member, policy);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffMember;

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

    fn staff(
        id: &str,
        department: &str,
        pay: f64,
        status: EmploymentStatus,
        schedules: Vec<ScheduleEntry>,
    ) -> StaffWithSchedule {
        StaffWithSchedule::new(
            StaffMember {
                id: id.to_string(),
                name: format!("Staff {}", id),
                position: "Cook".to_string(),
                department: department.to_string(),
                monthly_pay: pay,
                status,
                created_at: None,
                updated_at: None,
            },
            schedules,
        )
    }

    #[test]
    fn test_single_kitchen_shift() {
        let list = vec![staff(
            "k1",
            "Kitchen",
            4000.0,
            EmploymentStatus::FullTime,
            vec![entry("k1", DayOfWeek::Monday, Some("09:00:00"), Some("17:00:00"))],
        )];

        let rollups = department_rollups(&list, OvernightPolicy::default());
        assert_eq!(
            rollups["Kitchen"],
            DepartmentRollup {
                member_count: 1,
                total_hours: 8.0,
                total_pay: 4000.0,
            }
        );
    }

    #[test]
    fn test_fallback_hours_without_schedules() {
        let list = vec![
            staff("p1", "Service", 2400.0, EmploymentStatus::PartTime, vec![]),
            staff("f1", "Service", 3200.0, EmploymentStatus::FullTime, vec![]),
            staff("o1", "Bar", 1000.0, EmploymentStatus::Other("Seasonal".into()), vec![]),
        ];

        let rollups = department_rollups(&list, OvernightPolicy::default());
        assert_eq!(rollups["Service"].member_count, 2);
        assert_eq!(rollups["Service"].total_hours, 65.0);
        assert_eq!(rollups["Service"].total_pay, 5600.0);
        assert_eq!(rollups["Bar"].total_hours, 25.0);
    }

    #[test]
    fn test_days_off_count_zero_not_fallback() {
        let list = vec![staff(
            "f1",
            "Kitchen",
            4000.0,
            EmploymentStatus::FullTime,
            vec![
                entry("f1", DayOfWeek::Monday, None, None),
                entry("f1", DayOfWeek::Tuesday, Some("10:00:00"), None),
            ],
        )];

        let rollups = department_rollups(&list, OvernightPolicy::default());
        assert_eq!(rollups["Kitchen"].total_hours, 0.0);
    }

    #[test]
    fn test_minutes_count_as_fractional_hours() {
        let member = staff(
            "s1",
            "Service",
            2000.0,
            EmploymentStatus::PartTime,
            vec![
                entry("s1", DayOfWeek::Friday, Some("16:30:00"), Some("22:00:00")),
                entry("s1", DayOfWeek::Saturday, Some("12:00:00"), Some("20:15:00")),
            ],
        );
        assert_eq!(scheduled_hours(&member, OvernightPolicy::default()), 13.75);
    }

    #[test]
    fn test_duplicate_day_uses_first_entry() {
        let member = staff(
            "s1",
            "Bar",
            2000.0,
            EmploymentStatus::PartTime,
            vec![
                entry("s1", DayOfWeek::Monday, Some("09:00:00"), Some("13:00:00")),
                entry("s1", DayOfWeek::Monday, Some("09:00:00"), Some("21:00:00")),
            ],
        );
        assert_eq!(scheduled_hours(&member, OvernightPolicy::default()), 4.0);
    }

    #[test]
    fn test_overnight_policies() {
        let late = entry("b1", DayOfWeek::Saturday, Some("22:00:00"), Some("02:00:00"));
        assert_eq!(shift_hours(&late, OvernightPolicy::Preserve), -20.0);
        assert_eq!(shift_hours(&late, OvernightPolicy::Clamp), 0.0);
        assert_eq!(shift_hours(&late, OvernightPolicy::Wrap), 4.0);
    }

    #[test]
    fn test_malformed_times_contribute_nothing() {
        let bad = entry("b1", DayOfWeek::Sunday, Some("noon"), Some("17:00:00"));
        assert_eq!(shift_hours(&bad, OvernightPolicy::default()), 0.0);
    }

    #[test]
    fn test_member_count_and_pay_per_department() {
        let list = vec![
            staff("k1", "Kitchen", 4560.0, EmploymentStatus::FullTime, vec![]),
            staff("k2", "Kitchen", 3520.0, EmploymentStatus::FullTime, vec![]),
            staff("s1", "Service", 2400.0, EmploymentStatus::PartTime, vec![]),
            staff("b1", "Bar", 2960.0, EmploymentStatus::FullTime, vec![]),
        ];

        let rollups = department_rollups(&list, OvernightPolicy::default());
        assert_eq!(rollups.len(), 3);
        assert_eq!(rollups["Kitchen"].member_count, 2);
        assert_eq!(rollups["Kitchen"].total_pay, 8080.0);
        assert_eq!(rollups["Service"].member_count, 1);
        assert_eq!(rollups["Bar"].member_count, 1);
        assert_eq!(
            rollups.keys().cloned().collect::<Vec<_>>(),
            vec!["Bar", "Kitchen", "Service"]
        );
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(OvernightPolicy::from_str("Clamp"), Some(OvernightPolicy::Clamp));
        assert_eq!(OvernightPolicy::from_str(" wrap "), Some(OvernightPolicy::Wrap));
        assert_eq!(OvernightPolicy::from_str("never"), None);
        assert_eq!(OvernightPolicy::Preserve.as_str(), "preserve");
    }
}
