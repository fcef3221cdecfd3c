//! Use-case services layered on the repository.
//!
//! # Responsibility
//! - Daily task list workflows (add/toggle/delete, day views).
//! - Experiment start-date changes.
//! - Word-compatible experiment document rendering.

pub mod document;
pub mod experiment_service;
pub mod task_service;

use chrono::{Local, NaiveDate, NaiveTime, TimeZone};

/// Local calendar day of an epoch-millisecond timestamp.
///
/// Returns `None` for timestamps outside chrono's supported range.
pub fn local_day(epoch_ms: i64) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(epoch_ms)
        .earliest()
        .map(|datetime| datetime.date_naive())
}

/// Epoch milliseconds of local noon on `day`.
pub fn local_noon_ms(day: NaiveDate) -> i64 {
    let noon = day.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default());
    Local
        .from_local_datetime(&noon)
        .earliest()
        .map_or_else(|| noon.and_utc().timestamp_millis(), |time| time.timestamp_millis())
}
