use chrono::{DateTime, Local};

use crate::{core::Interval, quantity::energy::KilowattHours};

/// Smart-charging window scheduled by the provider.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub interval: Interval,
    pub source: String,
}

impl Dispatch {
    pub fn contains(&self, now: DateTime<Local>) -> bool {
        self.interval.start <= now && now <= self.interval.end
    }
}

/// Past charging session.
#[must_use]
#[derive(Clone, Debug)]
pub struct CompletedDispatch {
    pub interval: Interval,
    pub energy: KilowattHours,
}

#[must_use]
#[derive(Clone, Debug, Default)]
pub struct DispatchStatus {
    pub current: Option<Dispatch>,
    pub next: Option<Dispatch>,
}

impl DispatchStatus {
    /// Find the active and the upcoming dispatch among dispatches sorted by start.
    pub fn at(dispatches: &[Dispatch], now: DateTime<Local>) -> Self {
        let mut status = Self::default();
        for dispatch in dispatches {
            if dispatch.contains(now) {
                status.current = Some(dispatch.clone());
            } else if dispatch.interval.start > now && status.next.is_none() {
                status.next = Some(dispatch.clone());
            }
        }
        status
    }

    pub const fn is_dispatching(&self) -> bool {
        self.current.is_some()
    }
}
