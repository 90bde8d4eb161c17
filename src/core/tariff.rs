use chrono::{DateTime, Days, Local, NaiveTime};

use crate::{
    core::to_local,
    quantity::rate::{StandingCharge, UnitRate},
};

/// Start of the nightly off-peak window (Intelligent Octopus Go).
pub const OFF_PEAK_START: NaiveTime = NaiveTime::from_hms_opt(23, 30, 0).unwrap();

/// End of the nightly off-peak window.
pub const OFF_PEAK_END: NaiveTime = NaiveTime::from_hms_opt(5, 30, 0).unwrap();

/// Only this many unit rates are classified, newest first.
const N_CLASSIFIED_RATES: usize = 4;

#[must_use]
#[derive(Clone, Debug)]
pub struct Tariff {
    pub name: String,
    pub product_code: String,
    pub standing_charge: StandingCharge,
    pub off_peak_rate: Option<UnitRate>,
    pub peak_rate: Option<UnitRate>,
}

impl Tariff {
    /// Assign the most recent published unit rates to the off-peak and peak slots.
    ///
    /// When several rates fall into the same slot, the last one wins.
    pub fn with_unit_rates(mut self, unit_rates: impl IntoIterator<Item = UnitRate>) -> Self {
        for rate in unit_rates.into_iter().take(N_CLASSIFIED_RATES) {
            if rate.is_off_peak() {
                self.off_peak_rate = Some(rate);
            } else {
                self.peak_rate = Some(rate);
            }
        }
        self
    }

    pub fn off_peak_rate_or_default(&self) -> UnitRate {
        self.off_peak_rate.unwrap_or(UnitRate::DEFAULT_OFF_PEAK)
    }

    pub fn peak_rate_or_default(&self) -> UnitRate {
        self.peak_rate.unwrap_or(UnitRate::DEFAULT_PEAK)
    }

    /// Rate in effect at the specified moment.
    pub fn rate_at(&self, now: DateTime<Local>) -> Rate {
        let time = now.time();
        let today = now.date_naive();
        if time >= OFF_PEAK_START || time < OFF_PEAK_END {
            let end_date = if time >= OFF_PEAK_START {
                today.checked_add_days(Days::new(1)).unwrap_or(today)
            } else {
                today
            };
            Rate {
                rate: self.off_peak_rate_or_default(),
                is_off_peak: true,
                period_end: to_local(end_date.and_time(OFF_PEAK_END), now),
                next_rate: self.peak_rate_or_default(),
            }
        } else {
            Rate {
                rate: self.peak_rate_or_default(),
                is_off_peak: false,
                period_end: to_local(today.and_time(OFF_PEAK_START), now),
                next_rate: self.off_peak_rate_or_default(),
            }
        }
    }
}

/// Current rate with the time it stays in effect.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct Rate {
    pub rate: UnitRate,
    pub is_off_peak: bool,
    pub period_end: DateTime<Local>,
    pub next_rate: UnitRate,
}
