use chrono::{DateTime, Local};

use crate::quantity::{energy::KilowattHours, power::Watts, rate::UnitRate};

/// Latest smart meter telemetry from a Home Mini.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct LivePower {
    pub demand: Watts,
    pub read_at: DateTime<Local>,
    pub consumption: Option<KilowattHours>,
}

impl LivePower {
    /// Hourly running cost at the current demand, in minor currency units.
    pub fn cost_per_hour(&self, rate: UnitRate) -> f64 {
        self.demand.cost_per_hour(rate)
    }
}
