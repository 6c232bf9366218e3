//! Day-of-week schedule template model.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::schedule::time::normalize_time;

/// Day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Display order of the weekly schedule columns.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "monday" => Some(DayOfWeek::Monday),
            "tuesday" => Some(DayOfWeek::Tuesday),
            "wednesday" => Some(DayOfWeek::Wednesday),
            "thursday" => Some(DayOfWeek::Thursday),
            "friday" => Some(DayOfWeek::Friday),
            "saturday" => Some(DayOfWeek::Saturday),
            "sunday" => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One staff member's working window on one weekday.
///
/// Both times absent means a day off; exactly one present is a partial
/// schedule, which is displayed but never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub staff_id: String,
    pub day_of_week: DayOfWeek,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ScheduleEntry {
    pub fn is_day_off(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none()
    }
}

/// Request body for editing one day of a staff member's schedule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertScheduleRequest {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl UpsertScheduleRequest {
    /// Validate both times and normalize them to `HH:MM:SS`.
    /// Blank strings mean "not set".
    pub fn normalized(&self) -> Result<(Option<String>, Option<String>), AppError> {
        Ok((
            normalize_field("startTime", self.start_time.as_deref())?,
            normalize_field("endTime", self.end_time.as_deref())?,
        ))
    }
}

fn normalize_field(field: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => normalize_time(raw)
            .map(Some)
            .map_err(|e| AppError::Validation(format!("{}: {}", field, e))),
    }
}
