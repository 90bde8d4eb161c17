use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};

use crate::{
    api::{Error, Region},
    core::{
        account::Account,
        consumption::{Consumption, DailyUsage, daily_usage},
        dispatch::{CompletedDispatch, Dispatch},
        gas::{GasConsumption, GasTariff, daily_gas_usage},
        live_power::LivePower,
        saving_session::SavingSession,
        smart_device::SmartDevice,
        tariff::Tariff,
    },
    prelude::*,
};

/// Half-hourly settlement periods in a day.
pub const PERIODS_PER_DAY: usize = 48;

/// Energy account data, normalized across regions.
#[async_trait]
pub trait DataSource: Sync {
    fn region(&self) -> Region;

    async fn get_account(&self) -> Result<Account, Error>;

    /// Half-hourly readings sorted by start.
    ///
    /// Without an explicit window, the latest `periods` readings are requested.
    async fn get_consumption(
        &self,
        periods: usize,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<Consumption>, Error>;

    #[instrument(skip_all, fields(days = days))]
    async fn get_daily_usage(
        &self,
        days: usize,
    ) -> Result<BTreeMap<NaiveDate, DailyUsage>, Error> {
        let readings = self.get_consumption(days * PERIODS_PER_DAY, None, None).await?;
        Ok(daily_usage(&readings))
    }

    async fn get_gas_consumption(
        &self,
        periods: usize,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<GasConsumption>, Error>;

    #[instrument(skip_all, fields(days = days))]
    async fn get_daily_gas_usage(
        &self,
        days: usize,
    ) -> Result<BTreeMap<NaiveDate, DailyUsage>, Error> {
        let readings = self.get_gas_consumption(days * PERIODS_PER_DAY, None, None).await?;
        Ok(daily_gas_usage(&readings))
    }

    async fn get_gas_tariff(&self) -> Result<Option<GasTariff>, Error>;

    async fn get_tariff(&self) -> Result<Option<Tariff>, Error>;

    /// Planned smart-charging dispatches sorted by start.
    async fn get_dispatches(&self) -> Result<Vec<Dispatch>, Error>;

    /// Completed dispatches, newest first.
    async fn get_completed_dispatches(&self, limit: usize) -> Result<Vec<CompletedDispatch>, Error>;

    /// Active and upcoming saving sessions sorted by start.
    async fn get_saving_sessions(&self, now: DateTime<Local>) -> Result<Vec<SavingSession>, Error>;

    /// Latest telemetry, discovering the Home Mini when no device is specified.
    async fn get_live_power(&self, device_id: Option<&str>) -> Result<Option<LivePower>, Error>;

    async fn get_smart_devices(&self) -> Result<Vec<SmartDevice>, Error>;
}
