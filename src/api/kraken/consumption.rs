use chrono::{DateTime, Local, TimeDelta};
use serde::Deserialize;
use serde_json::json;
use serde_with::{DefaultOnNull, DisplayFromStr, PickFirst, VecSkipError, serde_as};

use crate::{
    api::{Capability, Error, Region, kraken::Api, rest::ConsumptionWindow},
    core::consumption::Consumption,
    prelude::*,
    quantity::energy::KilowattHours,
};

const HALF_HOURLY_READINGS_QUERY: &str = "query halfHourlyReadings($accountNumber: String!, $fromDatetime: DateTime, $toDatetime: DateTime) { account(accountNumber: $accountNumber) { properties { electricitySupplyPoints { status halfHourlyReadings(fromDatetime: $fromDatetime, toDatetime: $toDatetime) { startAt value costEstimate } } } } }";

/// Settlement period length.
pub const PERIOD: TimeDelta = TimeDelta::minutes(30);

impl Api {
    #[instrument(skip_all, fields(region = %self.region, periods = periods))]
    pub async fn get_consumption(
        &self,
        periods: usize,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<Consumption>, Error> {
        self.region.ensure(Capability::Consumption)?;
        let mut readings = match self.region {
            Region::Japan => self.get_half_hourly_readings(periods, start, end).await?,
            Region::Uk => {
                let (Some(mpan), Some(serial)) = (&self.meters.mpan, &self.meters.meter_serial)
                else {
                    return Err(Error::configuration(
                        "MPAN and meter serial are required for electricity consumption",
                    ));
                };
                let window = ConsumptionWindow { periods, start, end };
                self.rest(Capability::Consumption)?
                    .get_electricity_consumption(mpan, serial, &window)
                    .await?
                    .into_iter()
                    .map(|reading| Consumption {
                        interval: reading.interval_start..reading.interval_end,
                        energy: KilowattHours(reading.consumption),
                        cost_estimate: None,
                    })
                    .collect()
            }
        };
        readings.sort_by_key(|reading| reading.interval.start);
        info!(n_readings = readings.len(), "fetched");
        Ok(readings)
    }

    async fn get_half_hourly_readings(
        &self,
        periods: usize,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<Consumption>, Error> {
        let end = end.unwrap_or_else(Local::now);
        let start = start
            .unwrap_or_else(|| end - PERIOD * i32::try_from(periods).unwrap_or(i32::MAX));
        let number = self.account_number().await?;
        info!(number, %start, %end, "fetching half-hourly readings…");
        let variables = json!({
            "accountNumber": number,
            "fromDatetime": start.to_rfc3339(),
            "toDatetime": end.to_rfc3339(),
        });
        let data: Data = self.query(HALF_HOURLY_READINGS_QUERY, variables).await?;
        Ok(data.into_consumption())
    }
}

#[derive(Deserialize)]
struct Data {
    account: AccountNode,
}

#[serde_as]
#[derive(Deserialize)]
struct AccountNode {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    properties: Vec<Property>,
}

#[serde_as]
#[derive(Deserialize)]
struct Property {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "electricitySupplyPoints", default)]
    supply_points: Vec<SupplyPoint>,
}

#[serde_as]
#[derive(Deserialize)]
struct SupplyPoint {
    /// Invalid readings are skipped.
    #[serde_as(as = "DefaultOnNull<VecSkipError<_>>")]
    #[serde(rename = "halfHourlyReadings", default)]
    readings: Vec<HalfHourlyReading>,
}

#[serde_as]
#[derive(Deserialize)]
struct HalfHourlyReading {
    #[serde(rename = "startAt")]
    start_at: DateTime<Local>,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    value: f64,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "costEstimate")]
    cost_estimate: Option<f64>,
}

impl Data {
    fn into_consumption(self) -> Vec<Consumption> {
        self.account
            .properties
            .into_iter()
            .flat_map(|property| property.supply_points)
            .flat_map(|supply_point| supply_point.readings)
            .map(|reading| Consumption {
                interval: reading.start_at..(reading.start_at + PERIOD),
                energy: KilowattHours(reading.value),
                cost_estimate: reading.cost_estimate,
            })
            .collect()
    }
}
