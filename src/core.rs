pub mod account;
pub mod consumption;
pub mod dispatch;
pub mod gas;
pub mod live_power;
pub mod saving_session;
pub mod smart_device;
pub mod snapshot;
pub mod tariff;

use std::ops::Range;

use chrono::{DateTime, Local, NaiveDateTime};

/// Time interval in local time.
pub type Interval = Range<DateTime<Local>>;

/// Resolve a wall-clock time in the local timezone.
///
/// In a DST gap, the instant is shifted by the same amount as the wall clock.
pub fn to_local(naive: NaiveDateTime, reference: DateTime<Local>) -> DateTime<Local> {
    naive
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or_else(|| reference + (naive - reference.naive_local()))
}
