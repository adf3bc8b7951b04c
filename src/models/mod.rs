//! Data models for attendance records.
//!
//! This module contains the data structures shared across the app:
//!
//! - `AttendanceRecord`, `TimeSpent`: records as the backend sends them
//! - `RecordFilter`, `StatusFilter`, `NotifiedFilter`: view filtering

pub mod filter;
pub mod record;

pub use filter::{NotifiedFilter, RecordFilter, StatusFilter};
pub use record::{AttendanceRecord, TimeSpent, STATUS_CHECKED_IN, STATUS_CHECKED_OUT};
