use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};

use crate::{
    api::DataSource,
    core::{dispatch::DispatchStatus, snapshot::Snapshot},
    prelude::*,
    tables::{
        build_account_table,
        build_completed_dispatches_table,
        build_devices_table,
        build_dispatch_table,
        build_gas_tariff_table,
        build_live_power_table,
        build_rate_table,
        build_saving_sessions_table,
        build_status_table,
        build_usage_table,
    },
};

/// One-shot commands that print a report and exit.
#[derive(Subcommand)]
pub enum ReportCommand {
    /// Account name, status, balance, and address.
    #[clap(name = "account")]
    Account,

    /// Current electricity rate and when it changes.
    #[clap(name = "rate")]
    Rate,

    /// Intelligent Octopus smart-charging dispatches.
    #[clap(name = "dispatch")]
    Dispatch,

    /// Live power demand from the Home Mini.
    #[clap(name = "power")]
    Power,

    /// Upcoming saving sessions.
    #[clap(name = "sessions")]
    Sessions,

    /// Daily electricity usage.
    #[clap(name = "usage")]
    Usage(DaysArgs),

    /// Daily gas usage and the gas tariff.
    #[clap(name = "gas")]
    Gas(DaysArgs),

    /// Registered smart devices.
    #[clap(name = "devices")]
    Devices,

    /// Completed smart-charging sessions.
    #[clap(name = "charges")]
    Charges(LimitArgs),

    /// Everything at a glance.
    #[clap(name = "status")]
    Status,
}

#[derive(Copy, Clone, Parser)]
pub struct DaysArgs {
    /// Number of days to show.
    #[clap(short, long, default_value = "7")]
    pub days: usize,
}

#[derive(Copy, Clone, Parser)]
pub struct LimitArgs {
    /// Maximum number of charges to show.
    #[clap(long, default_value = "10")]
    pub limit: usize,
}

impl ReportCommand {
    /// Fetch the data and render the report.
    #[instrument(skip_all)]
    pub async fn render(self, source: &dyn DataSource, now: DateTime<Local>) -> Result<String> {
        let currency = source.region().currency();
        let output = match self {
            Self::Account => build_account_table(&source.get_account().await?).to_string(),

            Self::Rate => {
                let tariff =
                    source.get_tariff().await?.context("no active electricity tariff found")?;
                build_rate_table(&tariff, &tariff.rate_at(now), currency, now).to_string()
            }

            Self::Dispatch => {
                let dispatches = source.get_dispatches().await?;
                let status = DispatchStatus::at(&dispatches, now);
                build_dispatch_table(&status, &dispatches, now).to_string()
            }

            Self::Power => {
                let Some(live_power) = source.get_live_power(None).await? else {
                    return Ok("No live power data (is a Home Mini installed?)".to_owned());
                };
                let rate = match source.get_tariff().await {
                    Ok(tariff) => tariff.map(|tariff| tariff.rate_at(now)),
                    Err(error) => {
                        warn!("failed to fetch the tariff: {error:#}");
                        None
                    }
                };
                build_live_power_table(&live_power, rate.as_ref(), currency).to_string()
            }

            Self::Sessions => {
                let sessions = source.get_saving_sessions(now).await?;
                if sessions.is_empty() {
                    return Ok("No upcoming saving sessions".to_owned());
                }
                build_saving_sessions_table(&sessions, now).to_string()
            }

            Self::Usage(args) => {
                let daily = source.get_daily_usage(args.days).await?;
                if daily.is_empty() {
                    return Ok("No consumption data".to_owned());
                }
                build_usage_table(&daily, currency).to_string()
            }

            Self::Gas(args) => {
                let daily = source.get_daily_gas_usage(args.days).await?;
                let tariff = source.get_gas_tariff().await?;
                let mut output = if daily.is_empty() {
                    "No gas consumption data".to_owned()
                } else {
                    build_usage_table(&daily, currency).to_string()
                };
                if let Some(tariff) = tariff {
                    output.push('\n');
                    output.push_str(&build_gas_tariff_table(&tariff, currency).to_string());
                }
                output
            }

            Self::Devices => {
                let devices = source.get_smart_devices().await?;
                if devices.is_empty() {
                    return Ok("No smart devices registered".to_owned());
                }
                build_devices_table(&devices).to_string()
            }

            Self::Charges(args) => {
                let dispatches = source.get_completed_dispatches(args.limit).await?;
                if dispatches.is_empty() {
                    return Ok("No completed charges".to_owned());
                }
                build_completed_dispatches_table(&dispatches).to_string()
            }

            Self::Status => {
                build_status_table(&Snapshot::fetch(source, now).await, currency, now).to_string()
            }
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{
        api::{Region, fake::FakeSource},
        core::{
            account::Account,
            consumption::Consumption,
            dispatch::{CompletedDispatch, Dispatch},
            live_power::LivePower,
            tariff::Tariff,
        },
        quantity::{
            energy::KilowattHours,
            money::{Currency, Money},
            power::Watts,
            rate::{StandingCharge, UnitRate},
        },
    };

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, 22, 0, 0).unwrap()
    }

    fn tariff() -> Tariff {
        Tariff {
            name: "Intelligent Octopus Go".into(),
            product_code: "INTELLI-VAR-24-10-29".into(),
            standing_charge: StandingCharge(45.12),
            off_peak_rate: Some(UnitRate(7.0)),
            peak_rate: Some(UnitRate(24.5)),
        }
    }

    #[tokio::test]
    async fn test_account_owed() -> Result {
        let source = FakeSource {
            account: Some(Account {
                number: "A-1234ABCD".into(),
                name: "Jane Doe".into(),
                status: "ACTIVE".into(),
                address: "1 Test Street".into(),
                balance: Money::new(-42.17, Currency::Gbp),
            }),
            ..FakeSource::default()
        };
        let output = ReportCommand::Account.render(&source, now()).await?;
        assert!(output.contains("£42.17 owed"), "{output}");
        assert!(output.contains("A-1234ABCD"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rate_peak_until_off_peak() -> Result {
        let source = FakeSource { tariff: Some(tariff()), ..FakeSource::default() };
        let output = ReportCommand::Rate.render(&source, now()).await?;
        assert!(output.contains("PEAK 24.5p/kWh"), "{output}");
        assert!(output.contains("Cheap rate in"));
        assert!(output.contains("1h 30m (at 23:30)"));
        assert!(output.contains("45.1p/day"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rate_propagates_failure() {
        let result = ReportCommand::Rate.render(&FakeSource::default(), now()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_charging_now() -> Result {
        let now = now();
        let source = FakeSource {
            dispatches: vec![Dispatch {
                interval: (now - TimeDelta::minutes(30))..(now + TimeDelta::minutes(30)),
                source: "smart-charge".into(),
            }],
            ..FakeSource::default()
        };
        let output = ReportCommand::Dispatch.render(&source, now).await?;
        assert!(output.contains("CHARGING NOW"), "{output}");
        assert!(output.contains("until 22:30"));
        Ok(())
    }

    #[tokio::test]
    async fn test_power_estimates_cost() -> Result {
        let now = now();
        let source = FakeSource {
            tariff: Some(tariff()),
            live_power: Some(LivePower {
                demand: Watts(2000.0),
                read_at: now,
                consumption: None,
            }),
            ..FakeSource::default()
        };
        let output = ReportCommand::Power.render(&source, now).await?;
        assert!(output.contains("2.00 kW"), "{output}");
        assert!(output.contains("~49.0p/hour"));
        Ok(())
    }

    #[tokio::test]
    async fn test_power_without_home_mini() -> Result {
        let output = ReportCommand::Power.render(&FakeSource::default(), now()).await?;
        assert!(output.starts_with("No live power data"));
        Ok(())
    }

    #[tokio::test]
    async fn test_charges_total() -> Result {
        let now = now();
        let charge = |hours: i64, energy: f64| CompletedDispatch {
            interval: (now - TimeDelta::hours(hours))..(now - TimeDelta::hours(hours - 1)),
            energy: KilowattHours(energy),
        };
        let source = FakeSource {
            completed_dispatches: vec![charge(2, 3.5), charge(26, 4.0), charge(50, 1.0)],
            ..FakeSource::default()
        };
        let output = ReportCommand::Charges(LimitArgs { limit: 2 }).render(&source, now).await?;
        assert!(output.contains("7.5 kWh"), "{output}");
        assert!(!output.contains("1.0 kWh"));
        Ok(())
    }

    #[tokio::test]
    async fn test_japan_usage_shows_cost_estimates() -> Result {
        let start = now() - TimeDelta::hours(1);
        let source = FakeSource {
            region: Region::Japan,
            consumption: vec![Consumption {
                interval: start..(start + TimeDelta::minutes(30)),
                energy: KilowattHours(1.2),
                cost_estimate: Some(36.0),
            }],
            ..FakeSource::default()
        };
        let output = ReportCommand::Usage(DaysArgs { days: 1 }).render(&source, now()).await?;
        assert!(output.contains("Wed 2025-01-15"), "{output}");
        assert!(output.contains("¥36"));
        Ok(())
    }

    #[tokio::test]
    async fn test_japan_dispatch_is_unsupported() {
        let source = FakeSource { region: Region::Japan, ..FakeSource::default() };
        let error = ReportCommand::Dispatch.render(&source, now()).await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "smart charging dispatches is not available in the japan region"
        );
    }
}
