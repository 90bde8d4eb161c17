use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local};

use crate::quantity::{money::Currency, power::Watts, rate::UnitRate};

/// Format a countdown as `Xh Ym` or `Ym`, or `now` when it has elapsed.
pub fn format_time_delta(seconds: i64) -> String {
    if seconds <= 0 {
        return "now".to_owned();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 { format!("{hours}h {minutes}m") } else { format!("{minutes}m") }
}

/// Countdown from `now` until `until`.
pub fn format_time_until(until: DateTime<Local>, now: DateTime<Local>) -> String {
    format_time_delta((until - now).num_seconds())
}

/// Power in watts below one kilowatt, otherwise in kilowatts.
pub struct FormattedPower(pub Watts);

impl Display for FormattedPower {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 >= Watts::ONE_KILOWATT {
            write!(f, "{:.2} kW", self.0.kilowatts())
        } else {
            write!(f, "{:.0} W", self.0.0)
        }
    }
}

/// Amount in minor currency units: `37p` or `¥37`.
pub struct FormattedMinor {
    pub amount: f64,
    pub currency: Currency,
    pub precision: usize,
}

impl FormattedMinor {
    pub const fn new(amount: f64, currency: Currency, precision: usize) -> Self {
        Self { amount, currency, precision }
    }

    pub const fn rate(rate: UnitRate, currency: Currency) -> Self {
        Self::new(rate.0, currency, 1)
    }
}

impl Display for FormattedMinor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.currency {
            Currency::Gbp => write!(f, "{:.precision$}p", self.amount, precision = self.precision),
            Currency::Jpy => write!(f, "¥{:.precision$}", self.amount, precision = self.precision),
        }
    }
}
