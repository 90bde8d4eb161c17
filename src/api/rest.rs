//! UK REST API for meter readings and published unit rates.

use chrono::{DateTime, Local};
use reqwest::{Client, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_with::{VecSkipError, serde_as};

use crate::{api::Error, prelude::*};

pub struct Api {
    client: Client,
    base_url: Url,
    api_key: String,
}

/// Consumption request parameters.
#[derive(Copy, Clone, Debug)]
pub struct ConsumptionWindow {
    /// Page size, one reading per half-hour period.
    pub periods: usize,

    pub start: Option<DateTime<Local>>,
    pub end: Option<DateTime<Local>>,
}

#[derive(Copy, Clone, Debug, derive_more::Display)]
pub enum Fuel {
    #[display("electricity")]
    Electricity,

    #[display("gas")]
    Gas,
}

impl Fuel {
    const fn meter_points(self) -> &'static str {
        match self {
            Self::Electricity => "electricity-meter-points",
            Self::Gas => "gas-meter-points",
        }
    }

    const fn tariffs(self) -> &'static str {
        match self {
            Self::Electricity => "electricity-tariffs",
            Self::Gas => "gas-tariffs",
        }
    }

    /// Single-register tariff code prefix.
    const fn tariff_prefix(self) -> &'static str {
        match self {
            Self::Electricity => "E-1R",
            Self::Gas => "G-1R",
        }
    }
}

impl Api {
    pub const fn new(client: Client, base_url: Url, api_key: String) -> Self {
        Self { client, base_url, api_key }
    }

    #[instrument(skip_all, fields(periods = window.periods))]
    pub async fn get_electricity_consumption(
        &self,
        mpan: &str,
        serial_number: &str,
        window: &ConsumptionWindow,
    ) -> Result<Vec<IntervalReading>, Error> {
        self.get_consumption(Fuel::Electricity, mpan, serial_number, window).await
    }

    #[instrument(skip_all, fields(periods = window.periods))]
    pub async fn get_gas_consumption(
        &self,
        mprn: &str,
        serial_number: &str,
        window: &ConsumptionWindow,
    ) -> Result<Vec<IntervalReading>, Error> {
        self.get_consumption(Fuel::Gas, mprn, serial_number, window).await
    }

    async fn get_consumption(
        &self,
        fuel: Fuel,
        meter_point: &str,
        serial_number: &str,
        window: &ConsumptionWindow,
    ) -> Result<Vec<IntervalReading>, Error> {
        let mut url =
            self.url([fuel.meter_points(), meter_point, "meters", serial_number, "consumption"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_size", &window.periods.to_string());
            if let Some(start) = window.start {
                query.append_pair("period_from", &start.to_rfc3339());
            }
            if let Some(end) = window.end {
                query.append_pair("period_to", &end.to_rfc3339());
            }
        }
        info!(%fuel, "fetching consumption…");
        let page = self.get::<ConsumptionPage>(url).await?;
        info!(n_results = page.results.len(), "fetched");
        Ok(page.results)
    }

    /// Latest published unit rates (including VAT) for the product in the region, newest first.
    ///
    /// Failures are logged and yield no rates.
    #[instrument(skip_all, fields(fuel = %fuel, product_code = product_code, region = region))]
    pub async fn get_unit_rates(
        &self,
        fuel: Fuel,
        product_code: &str,
        region: &str,
        page_size: usize,
    ) -> Vec<f64> {
        match self.get_unit_rates_fallible(fuel, product_code, region, page_size).await {
            Ok(rates) => rates,
            Err(error) => {
                warn!("failed to fetch the unit rates: {:#}", anyhow::Error::from(error));
                Vec::new()
            }
        }
    }

    async fn get_unit_rates_fallible(
        &self,
        fuel: Fuel,
        product_code: &str,
        region: &str,
        page_size: usize,
    ) -> Result<Vec<f64>, Error> {
        let tariff_code = format!("{}-{product_code}-{region}", fuel.tariff_prefix());
        let mut url = self.url([
            "products",
            product_code,
            fuel.tariffs(),
            tariff_code.as_str(),
            "standard-unit-rates",
        ])?;
        url.query_pairs_mut().append_pair("page_size", &page_size.to_string());
        info!("fetching…");
        let page = self.get::<UnitRatePage>(url).await?;
        Ok(page.results.into_iter().map(|rate| rate.value_inc_vat).collect())
    }

    async fn get<R: DeserializeOwned>(&self, url: Url) -> Result<R, Error> {
        Ok(self
            .client
            .get(url)
            .basic_auth(&self.api_key, None::<&str>)
            .send()
            .await?
            .error_for_status()?
            .json::<R>()
            .await?)
    }

    /// Build an endpoint URL with the trailing slash the API expects.
    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::configuration(format!("invalid REST base URL `{}`", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }
}

#[serde_as]
#[derive(Deserialize)]
struct ConsumptionPage {
    #[serde_as(as = "VecSkipError<_>")]
    results: Vec<IntervalReading>,
}

#[must_use]
#[derive(Deserialize)]
pub struct IntervalReading {
    pub interval_start: DateTime<Local>,
    pub interval_end: DateTime<Local>,
    pub consumption: f64,
}

#[serde_as]
#[derive(Deserialize)]
struct UnitRatePage {
    #[serde_as(as = "VecSkipError<_>")]
    results: Vec<UnitRate>,
}

#[derive(Deserialize)]
struct UnitRate {
    value_inc_vat: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> Result<Api> {
        Ok(Api::new(Client::new(), Url::parse(base_url)?, "sk_test".into()))
    }

    #[test]
    fn test_url_has_trailing_slash() -> Result {
        let url = api("https://api.octopus.energy/v1/")?.url([
            Fuel::Electricity.meter_points(),
            "2000012345678",
            "meters",
            "21L1234567",
            "consumption",
        ])?;
        assert_eq!(
            url.as_str(),
            "https://api.octopus.energy/v1/electricity-meter-points/2000012345678/meters/21L1234567/consumption/",
        );
        Ok(())
    }

    #[test]
    fn test_url_without_trailing_slash_in_base() -> Result {
        let url = api("http://127.0.0.1:8080/v1")?.url(["products", "AGILE", "gas-tariffs"])?;
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v1/products/AGILE/gas-tariffs/");
        Ok(())
    }

    #[test]
    fn test_deserialize_consumption_page() -> Result {
        // language=JSON
        const PAGE: &str = r#"
            {
                "count": 2,
                "next": null,
                "previous": null,
                "results": [
                    {"consumption": 0.246, "interval_start": "2025-01-15T00:30:00Z", "interval_end": "2025-01-15T01:00:00Z"},
                    {"consumption": "oops", "interval_start": "2025-01-15T00:00:00Z", "interval_end": "2025-01-15T00:30:00Z"}
                ]
            }
        "#;
        let page = serde_json::from_str::<ConsumptionPage>(PAGE)?;
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].consumption, 0.246);
        Ok(())
    }
}
