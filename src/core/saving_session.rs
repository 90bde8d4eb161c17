use chrono::{DateTime, Local};

use crate::core::Interval;

/// Demand-response event rewarding reduced consumption.
#[must_use]
#[derive(Clone, Debug)]
pub struct SavingSession {
    pub code: String,
    pub interval: Interval,

    /// Reward in Octopoints per kilowatt-hour saved.
    pub reward_per_kwh: u32,
}

impl SavingSession {
    pub fn is_active(&self, now: DateTime<Local>) -> bool {
        self.interval.contains(&now)
    }

    pub fn is_over(&self, now: DateTime<Local>) -> bool {
        self.interval.end <= now
    }
}
