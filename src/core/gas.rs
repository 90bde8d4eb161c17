use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    core::{Interval, consumption::DailyUsage},
    quantity::{
        energy::KilowattHours,
        rate::{StandingCharge, UnitRate},
        volume::CubicMeters,
    },
};

/// Readings below this are assumed to be volumes from a SMETS2 meter.
const VOLUME_THRESHOLD: f64 = 10.0;

/// Half-hourly gas reading normalized to energy.
#[must_use]
#[derive(Clone, Debug)]
pub struct GasConsumption {
    pub interval: Interval,
    pub energy: KilowattHours,

    /// Reported volume when the meter reports cubic meters.
    pub volume: Option<CubicMeters>,
}

impl GasConsumption {
    /// SMETS1 meters report kilowatt-hours, SMETS2 meters report cubic meters.
    pub fn from_reported(interval: Interval, value: f64) -> Self {
        if value < VOLUME_THRESHOLD {
            let volume = CubicMeters(value);
            Self { interval, energy: volume.into(), volume: Some(volume) }
        } else {
            Self { interval, energy: KilowattHours(value), volume: None }
        }
    }
}

/// Energy and metered volume per local calendar date.
pub fn daily_gas_usage(readings: &[GasConsumption]) -> BTreeMap<NaiveDate, DailyUsage> {
    let mut totals = BTreeMap::<NaiveDate, DailyUsage>::new();
    for reading in readings {
        totals.entry(reading.interval.start.date_naive()).or_default().add(
            reading.energy,
            None,
            reading.volume,
        );
    }
    totals
}

#[must_use]
#[derive(Clone, Debug)]
pub struct GasTariff {
    pub name: String,
    pub product_code: String,
    pub standing_charge: StandingCharge,

    /// Zero when the rate could not be fetched.
    pub unit_rate: UnitRate,
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{Local, TimeDelta, TimeZone};

    use super::*;

    fn interval() -> Interval {
        let start = Local.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        start..(start + TimeDelta::minutes(30))
    }

    #[test]
    fn test_volume_is_converted() {
        let reading = GasConsumption::from_reported(interval(), 0.5);
        assert_eq!(reading.volume, Some(CubicMeters(0.5)));
        assert_abs_diff_eq!(reading.energy.0, 5.5934);
    }

    #[test]
    fn test_daily_gas_usage_keeps_volume() {
        let later = interval().start + TimeDelta::hours(1);
        let readings = [
            GasConsumption::from_reported(interval(), 0.5),
            GasConsumption::from_reported(later..(later + TimeDelta::minutes(30)), 0.25),
        ];
        let totals = daily_gas_usage(&readings);
        assert_eq!(totals.len(), 1);
        let usage = totals.values().next().unwrap();
        assert_eq!(usage.volume, Some(CubicMeters(0.75)));
        assert_abs_diff_eq!(usage.energy.0, 8.3901, epsilon = 1e-9);
        assert_eq!(usage.cost, None);
    }

    #[test]
    fn test_energy_is_kept() {
        let reading = GasConsumption::from_reported(interval(), 12.0);
        assert_eq!(reading.volume, None);
        assert_abs_diff_eq!(reading.energy.0, 12.0);
    }
}
