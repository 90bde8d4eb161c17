use chrono::{DateTime, Local};
use serde_json::json;

use crate::{
    api::{
        Capability,
        Error,
        kraken::{Api, tariff::Data},
        rest::{ConsumptionWindow, Fuel},
    },
    core::gas::{GasConsumption, GasTariff},
    prelude::*,
    quantity::rate::{StandingCharge, UnitRate},
};

const TARIFF_QUERY: &str = "query GetGasTariff($account: String!) { account(accountNumber: $account) { gasAgreements(active: true) { tariff { ... on StandardTariff { displayName productCode standingCharge } } } } }";

impl Api {
    #[instrument(skip_all, fields(region = %self.region, periods = periods))]
    pub async fn get_gas_consumption(
        &self,
        periods: usize,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<GasConsumption>, Error> {
        self.region.ensure(Capability::GasConsumption)?;
        let (Some(mprn), Some(serial)) = (&self.meters.gas_mprn, &self.meters.gas_meter_serial)
        else {
            return Err(Error::configuration(
                "MPRN and gas meter serial are required for gas consumption",
            ));
        };
        let window = ConsumptionWindow { periods, start, end };
        let mut readings: Vec<_> = self
            .rest(Capability::GasConsumption)?
            .get_gas_consumption(mprn, serial, &window)
            .await?
            .into_iter()
            .map(|reading| {
                GasConsumption::from_reported(
                    reading.interval_start..reading.interval_end,
                    reading.consumption,
                )
            })
            .collect();
        readings.sort_by_key(|reading| reading.interval.start);
        Ok(readings)
    }

    #[instrument(skip_all, fields(region = %self.region))]
    pub async fn get_gas_tariff(&self) -> Result<Option<GasTariff>, Error> {
        self.region.ensure(Capability::GasTariff)?;
        let rest = self.rest(Capability::GasTariff)?;
        let number = self.account_number().await?;
        info!(number, "fetching the gas tariff…");
        let data: Data = self.query(TARIFF_QUERY, json!({ "account": number })).await?;
        let Some(tariff) = data.account.active_tariff() else {
            info!("no active gas agreement");
            return Ok(None);
        };
        let unit_rate = if tariff.product_code.is_empty() {
            UnitRate::ZERO
        } else {
            rest.get_unit_rates(Fuel::Gas, &tariff.product_code, &self.tariff_region, 1)
                .await
                .into_iter()
                .next()
                .map_or(UnitRate::ZERO, UnitRate)
        };
        Ok(Some(GasTariff {
            name: tariff.display_name(),
            product_code: tariff.product_code,
            standing_charge: StandingCharge(tariff.standing_charge),
            unit_rate,
        }))
    }
}
