//! In-memory data source for tests of the commands and the dashboard.

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::{
    api::{Capability, DataSource, Error, Region},
    core::{
        account::Account,
        consumption::Consumption,
        dispatch::{CompletedDispatch, Dispatch},
        gas::{GasConsumption, GasTariff},
        live_power::LivePower,
        saving_session::SavingSession,
        smart_device::SmartDevice,
        tariff::Tariff,
    },
};

/// Returns canned data; a missing account or tariff fails like a broken API would.
#[derive(Default)]
pub struct FakeSource {
    pub region: Region,
    pub account: Option<Account>,
    pub tariff: Option<Tariff>,
    pub consumption: Vec<Consumption>,
    pub gas_consumption: Vec<GasConsumption>,
    pub gas_tariff: Option<GasTariff>,
    pub dispatches: Vec<Dispatch>,
    pub completed_dispatches: Vec<CompletedDispatch>,
    pub saving_sessions: Vec<SavingSession>,
    pub live_power: Option<LivePower>,
    pub smart_devices: Vec<SmartDevice>,
}

#[async_trait]
impl DataSource for FakeSource {
    fn region(&self) -> Region {
        self.region
    }

    async fn get_account(&self) -> Result<Account, Error> {
        self.region.ensure(Capability::Account)?;
        self.account.clone().ok_or_else(|| Error::Api("account is unavailable".into()))
    }

    async fn get_consumption(
        &self,
        periods: usize,
        _start: Option<DateTime<Local>>,
        _end: Option<DateTime<Local>>,
    ) -> Result<Vec<Consumption>, Error> {
        self.region.ensure(Capability::Consumption)?;
        let skip = self.consumption.len().saturating_sub(periods);
        Ok(self.consumption[skip..].to_vec())
    }

    async fn get_gas_consumption(
        &self,
        periods: usize,
        _start: Option<DateTime<Local>>,
        _end: Option<DateTime<Local>>,
    ) -> Result<Vec<GasConsumption>, Error> {
        self.region.ensure(Capability::GasConsumption)?;
        let skip = self.gas_consumption.len().saturating_sub(periods);
        Ok(self.gas_consumption[skip..].to_vec())
    }

    async fn get_gas_tariff(&self) -> Result<Option<GasTariff>, Error> {
        self.region.ensure(Capability::GasTariff)?;
        Ok(self.gas_tariff.clone())
    }

    async fn get_tariff(&self) -> Result<Option<Tariff>, Error> {
        self.region.ensure(Capability::Tariff)?;
        self.tariff
            .clone()
            .map(Some)
            .ok_or_else(|| Error::Api("tariff is unavailable".into()))
    }

    async fn get_dispatches(&self) -> Result<Vec<Dispatch>, Error> {
        self.region.ensure(Capability::Dispatches)?;
        Ok(self.dispatches.clone())
    }

    async fn get_completed_dispatches(&self, limit: usize) -> Result<Vec<CompletedDispatch>, Error> {
        self.region.ensure(Capability::Dispatches)?;
        Ok(self.completed_dispatches.iter().take(limit).cloned().collect())
    }

    async fn get_saving_sessions(&self, now: DateTime<Local>) -> Result<Vec<SavingSession>, Error> {
        self.region.ensure(Capability::SavingSessions)?;
        let sessions = self.saving_sessions.iter().filter(|session| !session.is_over(now));
        Ok(sessions.cloned().collect())
    }

    async fn get_live_power(&self, _device_id: Option<&str>) -> Result<Option<LivePower>, Error> {
        self.region.ensure(Capability::LivePower)?;
        Ok(self.live_power)
    }

    async fn get_smart_devices(&self) -> Result<Vec<SmartDevice>, Error> {
        self.region.ensure(Capability::SmartDevices)?;
        Ok(self.smart_devices.clone())
    }
}
