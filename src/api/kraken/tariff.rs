use serde::Deserialize;
use serde_json::json;
use serde_with::{DefaultOnNull, serde_as};

use crate::{
    api::{Capability, Error, kraken::Api, rest::Fuel},
    core::tariff::Tariff,
    prelude::*,
    quantity::rate::{StandingCharge, UnitRate},
};

const QUERY: &str = "query GetTariff($account: String!) { account(accountNumber: $account) { electricityAgreements(active: true) { tariff { ... on HalfHourlyTariff { displayName productCode standingCharge } ... on StandardTariff { displayName productCode standingCharge } } } } }";

/// Enough to cover both day and night rates of the current and the previous period.
const N_UNIT_RATES: usize = 10;

impl Api {
    #[instrument(skip_all, fields(region = %self.region))]
    pub async fn get_tariff(&self) -> Result<Option<Tariff>, Error> {
        self.region.ensure(Capability::Tariff)?;
        let number = self.account_number().await?;
        info!(number, "fetching the electricity tariff…");
        let data: Data = self.query(QUERY, json!({ "account": number })).await?;
        let Some(tariff) = data.account.active_tariff() else {
            info!("no active electricity agreement");
            return Ok(None);
        };
        let tariff = Tariff {
            name: tariff.display_name(),
            product_code: tariff.product_code,
            standing_charge: StandingCharge(tariff.standing_charge),
            off_peak_rate: None,
            peak_rate: None,
        };
        let unit_rates = match &self.rest {
            Some(rest) if !tariff.product_code.is_empty() => {
                rest.get_unit_rates(
                    Fuel::Electricity,
                    &tariff.product_code,
                    &self.tariff_region,
                    N_UNIT_RATES,
                )
                .await
            }
            _ => Vec::new(),
        };
        Ok(Some(tariff.with_unit_rates(unit_rates.into_iter().map(UnitRate))))
    }
}

#[derive(Deserialize)]
pub struct Data {
    pub account: AgreementsNode,
}

#[serde_as]
#[derive(Deserialize)]
pub struct AgreementsNode {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "electricityAgreements", alias = "gasAgreements", default)]
    pub agreements: Vec<Agreement>,
}

impl AgreementsNode {
    pub fn active_tariff(self) -> Option<TariffNode> {
        self.agreements.into_iter().next().map(|agreement| agreement.tariff.unwrap_or_default())
    }
}

#[derive(Deserialize)]
pub struct Agreement {
    #[serde(default)]
    pub tariff: Option<TariffNode>,
}

/// Tariff fragment shared by the electricity and gas agreements.
#[serde_as]
#[derive(Default, Deserialize)]
pub struct TariffNode {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "productCode", default)]
    pub product_code: String,

    /// Minor currency units per day.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "standingCharge", default)]
    pub standing_charge: f64,
}

impl TariffNode {
    pub fn display_name(&self) -> String {
        self.display_name.clone().unwrap_or_else(|| "Unknown".to_owned())
    }
}
