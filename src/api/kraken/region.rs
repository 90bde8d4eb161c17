use enumset::EnumSet;

use crate::{api::Error, quantity::money::Currency};

/// Independent Kraken deployment.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    clap::ValueEnum,
    derive_more::Display,
)]
pub enum Region {
    /// Octopus Energy UK: API key authentication, REST API for meter data.
    #[default]
    #[display("uk")]
    Uk,

    /// Octopus Energy Japan: email and password authentication, GraphQL only.
    #[display("japan")]
    Japan,
}

impl Region {
    pub const fn graphql_url(self) -> &'static str {
        match self {
            Self::Uk => "https://api.octopus.energy/v1/graphql/",
            Self::Japan => "https://api.oejp-kraken.energy/v1/graphql/",
        }
    }

    pub const fn rest_url(self) -> Option<&'static str> {
        match self {
            Self::Uk => Some("https://api.octopus.energy/v1/"),
            Self::Japan => None,
        }
    }

    pub const fn currency(self) -> Currency {
        match self {
            Self::Uk => Currency::Gbp,
            Self::Japan => Currency::Jpy,
        }
    }

    pub fn capabilities(self) -> EnumSet<Capability> {
        match self {
            Self::Uk => EnumSet::all(),
            Self::Japan => Capability::Account | Capability::Consumption | Capability::Tariff,
        }
    }

    pub fn supports(self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    pub fn ensure(self, capability: Capability) -> Result<(), Error> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(Error::Unsupported { region: self, capability })
        }
    }
}

#[derive(Debug, derive_more::Display, enumset::EnumSetType)]
pub enum Capability {
    #[display("account")]
    Account,

    #[display("electricity consumption")]
    Consumption,

    #[display("electricity tariff")]
    Tariff,

    #[display("gas consumption")]
    GasConsumption,

    #[display("gas tariff")]
    GasTariff,

    #[display("smart charging dispatches")]
    Dispatches,

    #[display("saving sessions")]
    SavingSessions,

    #[display("live power")]
    LivePower,

    #[display("smart devices")]
    SmartDevices,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_japan_capabilities() {
        let region = Region::Japan;
        assert!(region.supports(Capability::Account));
        assert!(region.supports(Capability::Consumption));
        assert!(!region.supports(Capability::Dispatches));
        assert!(!region.supports(Capability::LivePower));
        assert!(region.rest_url().is_none());
    }

    #[test]
    fn test_uk_supports_everything() {
        assert_eq!(Region::Uk.capabilities(), EnumSet::all());
        assert!(Region::Uk.ensure(Capability::GasTariff).is_ok());
    }

    #[test]
    fn test_unsupported_error_message() {
        let error = Region::Japan.ensure(Capability::SavingSessions).unwrap_err();
        assert_eq!(error.to_string(), "saving sessions is not available in the japan region");
    }
}
