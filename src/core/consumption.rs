use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, Timelike};

use crate::{
    core::Interval,
    quantity::{energy::KilowattHours, volume::CubicMeters},
};

/// Half-hourly electricity reading.
#[must_use]
#[derive(Clone, Debug)]
pub struct Consumption {
    pub interval: Interval,
    pub energy: KilowattHours,

    /// Cost estimate in minor currency units, when the region reports one.
    pub cost_estimate: Option<f64>,
}

/// Sum the readings per local calendar date.
pub fn daily_totals(
    readings: impl IntoIterator<Item = (DateTime<Local>, KilowattHours)>,
) -> BTreeMap<NaiveDate, KilowattHours> {
    let mut totals = BTreeMap::<NaiveDate, KilowattHours>::new();
    for (start, energy) in readings {
        *totals.entry(start.date_naive()).or_default() += energy;
    }
    totals
}

/// Totals of one local calendar day.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DailyUsage {
    pub energy: KilowattHours,

    /// Sum of the reported cost estimates in minor currency units, when any reading has one.
    pub cost: Option<f64>,

    /// Gas volume, when the meter reports cubic meters.
    pub volume: Option<CubicMeters>,
}

impl DailyUsage {
    pub fn add(&mut self, energy: KilowattHours, cost: Option<f64>, volume: Option<CubicMeters>) {
        self.energy += energy;
        if let Some(cost) = cost {
            *self.cost.get_or_insert(0.0) += cost;
        }
        if let Some(volume) = volume {
            *self.volume.get_or_insert_default() += volume;
        }
    }
}

/// Energy and cost estimates per local calendar date.
pub fn daily_usage(readings: &[Consumption]) -> BTreeMap<NaiveDate, DailyUsage> {
    let mut totals = BTreeMap::<NaiveDate, DailyUsage>::new();
    for reading in readings {
        totals.entry(reading.interval.start.date_naive()).or_default().add(
            reading.energy,
            reading.cost_estimate,
            None,
        );
    }
    totals
}

/// Sum the readings per local hour of the specified date.
pub fn hourly_totals(readings: &[Consumption], on: NaiveDate) -> [KilowattHours; 24] {
    let mut totals = [KilowattHours::ZERO; 24];
    for reading in readings.iter().filter(|reading| reading.interval.start.date_naive() == on) {
        totals[reading.interval.start.hour() as usize] += reading.energy;
    }
    totals
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn reading(hour: u32, minute: u32, kwh: f64) -> Consumption {
        let start = Local.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap();
        Consumption {
            interval: start..(start + TimeDelta::minutes(30)),
            energy: KilowattHours(kwh),
            cost_estimate: None,
        }
    }

    #[test]
    fn test_daily_totals() {
        let readings = [reading(10, 0, 0.5), reading(10, 30, 0.25), reading(11, 0, 1.0)];
        let totals = daily_totals(readings.iter().map(|r| (r.interval.start, r.energy)));
        assert_eq!(totals.len(), 1);
        let (date, total) = totals.iter().next().unwrap();
        assert_eq!(*date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_abs_diff_eq!(total.0, 1.75);
    }

    #[test]
    fn test_daily_usage_sums_cost_estimates() {
        let mut readings = vec![reading(10, 0, 0.5), reading(10, 30, 0.25)];
        readings[0].cost_estimate = Some(15.0);
        readings[1].cost_estimate = Some(7.5);
        let totals = daily_usage(&readings);
        let usage = totals[&NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()];
        assert_abs_diff_eq!(usage.energy.0, 0.75);
        assert_eq!(usage.cost, Some(22.5));
        assert_eq!(usage.volume, None);
    }

    #[test]
    fn test_daily_usage_without_cost_estimates() {
        let totals = daily_usage(&[reading(10, 0, 0.5)]);
        assert_eq!(totals.values().next().unwrap().cost, None);
    }

    #[test]
    fn test_hourly_totals() {
        let readings = [reading(0, 0, 0.1), reading(0, 30, 0.2), reading(23, 30, 0.4)];
        let totals = hourly_totals(&readings, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_abs_diff_eq!(totals[0].0, 0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(totals[12].0, 0.0);
        assert_abs_diff_eq!(totals[23].0, 0.4);

        let other_day = hourly_totals(&readings, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert!(other_day.iter().all(|total| *total == KilowattHours::ZERO));
    }
}
