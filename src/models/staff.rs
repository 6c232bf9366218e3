//! Staff member model and the add/edit request bodies.

use serde::{Deserialize, Serialize};

use super::ScheduleEntry;
use crate::errors::AppError;

/// Fixed number of paid hours per month used to convert between the
/// stored hourly rate and the monthly pay shown to admins.
pub const HOURS_PER_MONTH: f64 = 160.0;

/// Convert a stored hourly rate to monthly pay.
pub fn monthly_pay_from_hourly(hourly_rate: f64) -> f64 {
    hourly_rate * HOURS_PER_MONTH
}

/// Convert monthly pay entered on a form to the stored hourly rate.
pub fn hourly_rate_from_monthly(monthly_pay: f64) -> f64 {
    monthly_pay / HOURS_PER_MONTH
}

/// Employment status. The store keeps free text, so unknown values survive
/// a round trip as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmploymentStatus {
    FullTime,
    PartTime,
    Other(String),
}

impl EmploymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EmploymentStatus::FullTime => "Full-time",
            EmploymentStatus::PartTime => "Part-time",
            EmploymentStatus::Other(s) => s,
        }
    }

    pub fn is_full_time(&self) -> bool {
        matches!(self, EmploymentStatus::FullTime)
    }
}

impl From<String> for EmploymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Full-time" => EmploymentStatus::FullTime,
            "Part-time" => EmploymentStatus::PartTime,
            _ => EmploymentStatus::Other(s),
        }
    }
}

impl From<EmploymentStatus> for String {
    fn from(status: EmploymentStatus) -> Self {
        match status {
            EmploymentStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// A member of staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub position: String,
    /// Kitchen, Service, Bar, Management, or any other free text
    pub department: String,
    pub monthly_pay: f64,
    pub status: EmploymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A staff member joined with their day-of-week schedule template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffWithSchedule {
    #[serde(flatten)]
    pub member: StaffMember,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
}

impl StaffWithSchedule {
    pub fn new(member: StaffMember, schedules: Vec<ScheduleEntry>) -> Self {
        Self { member, schedules }
    }
}

/// Request body for adding a staff member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    pub name: String,
    pub position: String,
    pub department: String,
    pub monthly_pay: f64,
    pub status: EmploymentStatus,
}

impl CreateStaffRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name(&self.name)?;
        validate_position(&self.position)?;
        validate_department(&self.department)?;
        validate_monthly_pay(self.monthly_pay)?;
        validate_status(&self.status)
    }
}

/// Request body for editing a staff member. Absent fields keep their value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub monthly_pay: Option<f64>,
    #[serde(default)]
    pub status: Option<EmploymentStatus>,
}

impl UpdateStaffRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(position) = &self.position {
            validate_position(position)?;
        }
        if let Some(department) = &self.department {
            validate_department(department)?;
        }
        if let Some(pay) = self.monthly_pay {
            validate_monthly_pay(pay)?;
        }
        if let Some(status) = &self.status {
            validate_status(status)?;
        }
        Ok(())
    }
}

fn min_len(value: &str, min: usize, message: &str) -> Result<(), AppError> {
    if value.trim().chars().count() < min {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), AppError> {
    min_len(name, 2, "Name must be at least 2 characters.")
}

fn validate_position(position: &str) -> Result<(), AppError> {
    min_len(position, 2, "Position is required.")
}

fn validate_department(department: &str) -> Result<(), AppError> {
    min_len(department, 2, "Department is required.")
}

fn validate_monthly_pay(pay: f64) -> Result<(), AppError> {
    if !pay.is_finite() || pay <= 0.0 {
        return Err(AppError::Validation(
            "Monthly pay must be positive.".to_string(),
        ));
    }
    Ok(())
}

fn validate_status(status: &EmploymentStatus) -> Result<(), AppError> {
    match status {
        EmploymentStatus::FullTime | EmploymentStatus::PartTime => Ok(()),
        EmploymentStatus::Other(s) => Err(AppError::Validation(format!(
            "Status must be Full-time or Part-time, got {:?}",
            s
        ))),
    }
}
