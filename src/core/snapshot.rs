use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};

use crate::{
    api::{Capability, DataSource, Error, PERIODS_PER_DAY},
    core::{
        account::Account,
        consumption::{daily_totals, hourly_totals},
        dispatch::{Dispatch, DispatchStatus},
        live_power::LivePower,
        saving_session::SavingSession,
        tariff::{Rate, Tariff},
    },
    prelude::*,
    quantity::energy::KilowattHours,
};

/// Days of history shown on the dashboard.
pub const N_HISTORY_DAYS: usize = 7;

/// Everything the dashboard shows, fetched at one moment.
///
/// Every section is optional: a failed or unsupported request leaves it empty.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub account: Option<Account>,
    pub tariff: Option<Tariff>,
    pub rate: Option<Rate>,
    pub live_power: Option<LivePower>,
    pub dispatch_status: Option<DispatchStatus>,
    pub dispatches: Vec<Dispatch>,
    pub saving_sessions: Vec<SavingSession>,
    pub daily_usage: BTreeMap<NaiveDate, KilowattHours>,

    /// Today's consumption per local hour, when any readings are available.
    pub hourly_usage: Option<[KilowattHours; 24]>,
}

impl Snapshot {
    #[instrument(skip_all)]
    pub async fn fetch(source: &dyn DataSource, now: DateTime<Local>) -> Self {
        let region = source.region();
        let supports = |capability| region.supports(capability);
        info!(%region, "fetching the snapshot…");

        let account = best_effort("account", source.get_account().await);
        let tariff = if supports(Capability::Tariff) {
            best_effort("tariff", source.get_tariff().await).flatten()
        } else {
            None
        };
        let rate = tariff.as_ref().map(|tariff| tariff.rate_at(now));
        let live_power = if supports(Capability::LivePower) {
            best_effort("live power", source.get_live_power(None).await).flatten()
        } else {
            None
        };
        let dispatches = if supports(Capability::Dispatches) {
            best_effort("dispatches", source.get_dispatches().await)
        } else {
            None
        };
        let saving_sessions = if supports(Capability::SavingSessions) {
            best_effort("saving sessions", source.get_saving_sessions(now).await)
        } else {
            None
        };
        let readings = if supports(Capability::Consumption) {
            best_effort(
                "consumption",
                source.get_consumption(N_HISTORY_DAYS * PERIODS_PER_DAY, None, None).await,
            )
        } else {
            None
        }
        .unwrap_or_default();

        let today = now.date_naive();
        let hourly_usage = readings
            .iter()
            .any(|reading| reading.interval.start.date_naive() == today)
            .then(|| hourly_totals(&readings, today));

        let dispatch_status =
            dispatches.as_deref().map(|dispatches| DispatchStatus::at(dispatches, now));
        let daily_usage =
            daily_totals(readings.iter().map(|reading| (reading.interval.start, reading.energy)));

        Self {
            account,
            tariff,
            rate,
            live_power,
            dispatch_status,
            dispatches: dispatches.unwrap_or_default(),
            saving_sessions: saving_sessions.unwrap_or_default(),
            daily_usage,
            hourly_usage,
        }
    }
}

/// Failures are logged at debug level only, since the dashboard may own the terminal.
fn best_effort<T>(section: &str, result: Result<T, Error>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) if error.is_unsupported() => {
            trace!(section, "skipped: {error}");
            None
        }
        Err(error) => {
            debug!(section, "unavailable: {:#}", anyhow::Error::from(error));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{
        api::{Region, fake::FakeSource},
        core::consumption::Consumption,
        quantity::rate::{StandingCharge, UnitRate},
    };

    fn reading(start: DateTime<Local>, energy: f64) -> Consumption {
        Consumption {
            interval: start..(start + TimeDelta::minutes(30)),
            energy: KilowattHours(energy),
            cost_estimate: None,
        }
    }

    fn source(region: Region, now: DateTime<Local>) -> FakeSource {
        let today = now - TimeDelta::hours(2);
        FakeSource {
            region,
            tariff: Some(Tariff {
                name: "Intelligent Octopus Go".into(),
                product_code: "INTELLI-VAR-24-10-29".into(),
                standing_charge: StandingCharge(45.0),
                off_peak_rate: Some(UnitRate(7.0)),
                peak_rate: Some(UnitRate(24.5)),
            }),
            consumption: vec![
                reading(now - TimeDelta::days(1), 2.0),
                reading(today, 1.0),
                reading(today + TimeDelta::minutes(30), 0.5),
            ],
            dispatches: vec![Dispatch {
                interval: (now + TimeDelta::hours(1))..(now + TimeDelta::hours(2)),
                source: "smart-charge".into(),
            }],
            ..FakeSource::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_uk_keeps_sections_that_succeed() {
        let now = Local.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let snapshot = Snapshot::fetch(&source(Region::Uk, now), now).await;

        assert!(snapshot.account.is_none());
        let rate = snapshot.rate.unwrap();
        assert!(!rate.is_off_peak);
        assert_abs_diff_eq!(rate.rate.0, 24.5);

        let status = snapshot.dispatch_status.unwrap();
        assert!(!status.is_dispatching());
        assert_eq!(status.next.unwrap().source, "smart-charge");

        assert_eq!(snapshot.daily_usage.len(), 2);
        assert_abs_diff_eq!(snapshot.daily_usage[&now.date_naive()].0, 1.5);
        let hourly = snapshot.hourly_usage.unwrap();
        assert_abs_diff_eq!(hourly[10].0, 1.5);
        assert_abs_diff_eq!(hourly[11].0, 0.0);
    }

    #[tokio::test]
    async fn test_fetch_japan_skips_unsupported_sections() {
        let now = Local.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let snapshot = Snapshot::fetch(&source(Region::Japan, now), now).await;

        assert!(snapshot.rate.is_some());
        assert!(snapshot.dispatch_status.is_none());
        assert!(snapshot.dispatches.is_empty());
        assert!(snapshot.live_power.is_none());
        assert!(snapshot.hourly_usage.is_some());
    }
}
