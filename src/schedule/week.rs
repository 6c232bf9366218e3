//! Monday-start week arithmetic for the schedule header.

use chrono::{Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// The displayed 7-day window, Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl WeekRange {
    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let week = date.week(Weekday::Mon);
        Self {
            start_date: week.first_day(),
            end_date: week.last_day(),
        }
    }

    /// Same window shifted by exactly seven days back.
    pub fn previous(&self) -> Self {
        self.shifted(-7)
    }

    /// Same window shifted by exactly seven days forward.
    pub fn next(&self) -> Self {
        self.shifted(7)
    }

    fn shifted(&self, days: i64) -> Self {
        let delta = Duration::days(days);
        match (
            self.start_date.checked_add_signed(delta),
            self.end_date.checked_add_signed(delta),
        ) {
            (Some(start_date), Some(end_date)) => Self {
                start_date,
                end_date,
            },
            // Edge of the representable calendar.
            _ => *self,
        }
    }

    /// `Oct 19, 2026 - Oct 25, 2026`
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%b %-d, %Y"),
            self.end_date.format("%b %-d, %Y")
        )
    }
}

/// Week range plus its display label, as sent to the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    #[serde(flatten)]
    pub range: WeekRange,
    pub label: String,
}

impl From<WeekRange> for WeekView {
    fn from(range: WeekRange) -> Self {
        Self {
            label: range.label(),
            range,
        }
    }
}

/// Holds the week currently shown and moves it backward or forward.
#[derive(Debug, Clone)]
pub struct WeekNavigator {
    range: WeekRange,
}

impl WeekNavigator {
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            range: WeekRange::containing(reference),
        }
    }

    /// Starts at the week containing today's local date.
    pub fn current_week() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn range(&self) -> WeekRange {
        self.range
    }

    pub fn label(&self) -> String {
        self.range.label()
    }

    pub fn go_to_previous_week(&mut self) -> WeekRange {
        self.range = self.range.previous();
        self.range
    }

    pub fn go_to_next_week(&mut self) -> WeekRange {
        self.range = self.range.next();
        self.range
    }
}
