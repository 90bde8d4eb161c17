use clap::Parser;
use reqwest::Url;

use crate::{
    api::{Api, Credentials, Meters, Region},
    prelude::*,
};

/// Connection options shared by all commands.
#[derive(Parser)]
pub struct ConnectionArgs {
    #[clap(long, value_enum, default_value_t, env = "OCTOPUS_REGION", global = true)]
    pub region: Region,

    /// API key (UK).
    #[clap(long = "api-key", env = "OCTOPUS_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Account email (Japan).
    #[clap(long, env = "OCTOPUS_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password (Japan).
    #[clap(long, env = "OCTOPUS_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Account number, for example: `A-1234ABCD`. Discovered automatically in Japan.
    #[clap(long = "account", env = "OCTOPUS_ACCOUNT", global = true)]
    pub account_number: Option<String>,

    /// Electricity meter point administration number (UK).
    #[clap(long, env = "OCTOPUS_MPAN", global = true)]
    pub mpan: Option<String>,

    #[clap(long = "meter-serial", env = "OCTOPUS_METER_SERIAL", global = true)]
    pub meter_serial: Option<String>,

    /// Gas meter point reference number (UK).
    #[clap(long = "gas-mprn", env = "OCTOPUS_GAS_MPRN", global = true)]
    pub gas_mprn: Option<String>,

    #[clap(long = "gas-meter-serial", env = "OCTOPUS_GAS_METER_SERIAL", global = true)]
    pub gas_meter_serial: Option<String>,

    /// Distribution network region letter, used to build the REST tariff codes.
    #[clap(
        long = "tariff-region",
        default_value = "J",
        env = "OCTOPUS_TARIFF_REGION",
        global = true
    )]
    pub tariff_region: String,

    #[clap(long = "graphql-url", env = "OCTOPUS_GRAPHQL_URL", global = true)]
    pub graphql_url: Option<Url>,

    #[clap(long = "rest-url", env = "OCTOPUS_REST_URL", global = true)]
    pub rest_url: Option<Url>,
}

impl ConnectionArgs {
    pub fn try_build(self) -> Result<Api> {
        let credentials =
            Credentials::for_region(self.region, self.api_key, self.email, self.password)?;
        let api = Api::builder()
            .region(self.region)
            .credentials(credentials)
            .maybe_account_number(self.account_number)
            .meters(Meters {
                mpan: self.mpan,
                meter_serial: self.meter_serial,
                gas_mprn: self.gas_mprn,
                gas_meter_serial: self.gas_meter_serial,
            })
            .tariff_region(self.tariff_region)
            .maybe_graphql_url(self.graphql_url)
            .maybe_rest_url(self.rest_url)
            .build()
            .with_context(|| format!("failed to set up the {} client", self.region))?;
        Ok(api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::DataSource, cli::Args};

    #[test]
    fn test_japan_requires_password() {
        let args = Args::try_parse_from([
            "octopus",
            "--region",
            "japan",
            "--email",
            "taro@example.jp",
            "account",
        ])
        .unwrap();
        let error = args.connection.try_build().err().unwrap();
        assert!(error.to_string().contains("email and password"), "{error:#}");
    }

    #[test]
    fn test_uk_builds_with_api_key() -> Result {
        let args = Args::try_parse_from([
            "octopus",
            "rate",
            "--api-key",
            "sk_live_test",
            "--account",
            "A-1234ABCD",
        ])?;
        let api = args.connection.try_build()?;
        assert_eq!(api.region(), Region::Uk);
        Ok(())
    }
}
