//! Time clock model.

use serde::{Deserialize, Serialize};

/// A clock-in/clock-out record. An entry without `clock_out` is open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeClockEntry {
    pub id: String,
    pub staff_id: String,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub total_hours: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TimeClockEntry {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}
