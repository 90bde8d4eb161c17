//! Kraken GraphQL access layer shared by the UK and Japan deployments.

mod account;
mod auth;
mod consumption;
mod device;
mod dispatch;
mod gas;
mod region;
mod response;
mod saving_session;
mod tariff;
mod telemetry;

use async_trait::async_trait;
use bon::bon;
use chrono::{DateTime, Local};
use http::header::AUTHORIZATION;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex, OnceCell};

pub use self::{
    auth::Credentials,
    region::{Capability, Region},
};
use self::{
    auth::{ObtainTokenData, Token, TokenVariables},
    response::{Request, Response},
};
use crate::{
    api::{DataSource, Error, client, rest},
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
    prelude::*,
};

/// UK meter identifiers used by the REST API.
#[derive(Clone, Debug, Default)]
pub struct Meters {
    /// Electricity meter point administration number.
    pub mpan: Option<String>,

    pub meter_serial: Option<String>,

    /// Gas meter point reference number.
    pub gas_mprn: Option<String>,

    pub gas_meter_serial: Option<String>,
}

pub struct Api {
    client: Client,
    region: Region,
    credentials: Credentials,
    graphql_url: Url,
    rest: Option<rest::Api>,
    meters: Meters,

    /// Distribution network region letter, used to build REST tariff codes.
    tariff_region: String,

    account_number: OnceCell<String>,
    token: Mutex<Option<Token>>,
}

#[bon]
impl Api {
    #[builder]
    pub fn new(
        region: Region,
        credentials: Credentials,
        #[builder(into)] account_number: Option<String>,
        #[builder(default)] meters: Meters,
        #[builder(into, default = String::from("J"))] tariff_region: String,
        graphql_url: Option<Url>,
        rest_url: Option<Url>,
    ) -> Result<Self, Error> {
        match (region, &credentials) {
            (Region::Uk, Credentials::ApiKey(_))
            | (Region::Japan, Credentials::Password { .. }) => {}
            (Region::Uk, Credentials::Password { .. }) => {
                return Err(Error::Authentication("UK region requires an API key".into()));
            }
            (Region::Japan, Credentials::ApiKey(_)) => {
                return Err(Error::Authentication(
                    "Japan region requires an email and password".into(),
                ));
            }
        }
        let client = client::try_new()?;
        let graphql_url = match graphql_url {
            Some(url) => url,
            None => parse_url(region.graphql_url())?,
        };
        let rest = match (rest_url, region.rest_url(), credentials.api_key()) {
            (Some(base_url), _, Some(api_key)) => {
                Some(rest::Api::new(client.clone(), base_url, api_key.to_owned()))
            }
            (None, Some(default_url), Some(api_key)) => {
                Some(rest::Api::new(client.clone(), parse_url(default_url)?, api_key.to_owned()))
            }
            _ => None,
        };
        Ok(Self {
            client,
            region,
            credentials,
            graphql_url,
            rest,
            meters,
            tariff_region,
            account_number: OnceCell::new_with(account_number.filter(|number| !number.is_empty())),
            token: Mutex::new(None),
        })
    }
}

impl Api {
    /// Return a fresh token, obtaining a new one when the cached one has expired.
    ///
    /// The lock is held while the mutation is in flight, so concurrent callers share one request.
    #[instrument(skip_all, fields(region = %self.region))]
    pub async fn obtain_token(&self) -> Result<String, Error> {
        let mut cached = self.token.lock().await;
        let now = Local::now();
        if let Some(token) = cached.as_ref()
            && token.is_fresh(now)
        {
            return Ok(token.token.clone());
        }

        let previous_refresh_token = cached.take().and_then(|token| token.refresh_token);
        let variables = TokenVariables::new(&self.credentials, previous_refresh_token.as_deref());
        info!(using_refresh_token = previous_refresh_token.is_some(), "obtaining a token…");
        let obtained = self
            .post::<_, ObtainTokenData>(variables.mutation(), &variables, None)
            .await
            .map_err(|error| match error {
                Error::Api(message) => Error::Authentication(message),
                error => error,
            })?
            .obtain_kraken_token;

        let token = Token::new(
            obtained.token,
            obtained.refresh_token.or(previous_refresh_token),
            Local::now(),
        );
        debug!(expires_at = %token.expires_at, "obtained");
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Execute an authenticated GraphQL query.
    pub async fn query<V: Serialize, D: DeserializeOwned>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<D, Error> {
        let token = self.obtain_token().await?;
        self.post(query, &variables, Some(&token)).await
    }

    async fn post<V: Serialize, D: DeserializeOwned>(
        &self,
        query: &str,
        variables: &V,
        token: Option<&str>,
    ) -> Result<D, Error> {
        let mut request =
            self.client.post(self.graphql_url.clone()).json(&Request { query, variables });
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token);
        }
        let response = request.send().await?.error_for_status()?.json::<Response>().await?;
        let data = Result::<serde_json::Value, Error>::from(response)?;
        trace!(%data, "received");
        Ok(serde_json::from_value(data)?)
    }

    /// Configured account number, or the first account of the logged-in user (Japan only).
    pub async fn account_number(&self) -> Result<&str, Error> {
        self.account_number
            .get_or_try_init(|| self.discover_account_number())
            .await
            .map(String::as_str)
    }

    #[instrument(skip_all)]
    async fn discover_account_number(&self) -> Result<String, Error> {
        const QUERY: &str = "query accountViewer { viewer { accounts { number } } }";

        #[derive(Deserialize)]
        struct Data {
            viewer: Viewer,
        }

        #[derive(Deserialize)]
        struct Viewer {
            #[serde(default)]
            accounts: Vec<ViewerAccount>,
        }

        #[derive(Deserialize)]
        struct ViewerAccount {
            number: String,
        }

        if self.region == Region::Uk {
            return Err(Error::configuration("account number is required for the UK region"));
        }
        info!("discovering the account number…");
        let data: Data = self.query(QUERY, serde_json::json!({})).await?;
        let number = data
            .viewer
            .accounts
            .into_iter()
            .next()
            .ok_or_else(|| Error::configuration("no account found for this user"))?
            .number;
        info!(%number, "discovered");
        Ok(number)
    }

    /// REST client, available for the regions that have the REST API.
    fn rest(&self, capability: Capability) -> Result<&rest::Api, Error> {
        self.rest.as_ref().ok_or(Error::Unsupported { region: self.region, capability })
    }
}

#[async_trait]
impl DataSource for Api {
    fn region(&self) -> Region {
        self.region
    }

    async fn get_account(&self) -> Result<Account, Error> {
        Self::get_account(self).await
    }

    async fn get_consumption(
        &self,
        periods: usize,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<Consumption>, Error> {
        Self::get_consumption(self, periods, start, end).await
    }

    async fn get_gas_consumption(
        &self,
        periods: usize,
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
    ) -> Result<Vec<GasConsumption>, Error> {
        Self::get_gas_consumption(self, periods, start, end).await
    }

    async fn get_gas_tariff(&self) -> Result<Option<GasTariff>, Error> {
        Self::get_gas_tariff(self).await
    }

    async fn get_tariff(&self) -> Result<Option<Tariff>, Error> {
        Self::get_tariff(self).await
    }

    async fn get_dispatches(&self) -> Result<Vec<Dispatch>, Error> {
        Self::get_dispatches(self).await
    }

    async fn get_completed_dispatches(
        &self,
        limit: usize,
    ) -> Result<Vec<CompletedDispatch>, Error> {
        Self::get_completed_dispatches(self, limit).await
    }

    async fn get_saving_sessions(
        &self,
        now: DateTime<Local>,
    ) -> Result<Vec<SavingSession>, Error> {
        Self::get_saving_sessions(self, now).await
    }

    async fn get_live_power(
        &self,
        device_id: Option<&str>,
    ) -> Result<Option<LivePower>, Error> {
        Self::get_live_power(self, device_id).await
    }

    async fn get_smart_devices(&self) -> Result<Vec<SmartDevice>, Error> {
        Self::get_smart_devices(self).await
    }
}

fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|error| Error::configuration(format!("invalid URL `{url}`: {error}")))
}
