//! Weekly schedule aggregation.
//!
//! Joins staff to their day-of-week schedule templates and derives the
//! schedule grid, department rollups and the displayed week.

pub mod aggregator;
mod board;
pub mod rollup;
pub mod time;
pub mod week;

pub use aggregator::DisplayRow;
pub use board::{ScheduleBoard, ScheduleSource};
pub use rollup::{DepartmentRollup, OvernightPolicy};
pub use week::{WeekNavigator, WeekRange, WeekView};
