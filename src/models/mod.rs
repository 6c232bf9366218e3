//! Data models for the staff schedule backend.
//!
//! Field names serialize in camelCase to match the frontend.

mod revision;
mod schedule;
mod staff;
mod time_clock;

pub use revision::*;
pub use schedule::*;
pub use staff::*;
pub use time_clock::*;
