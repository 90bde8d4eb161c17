use crate::api::kraken::{Capability, Region};

/// API access failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Token could not be obtained, or the credentials do not match the region.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The GraphQL envelope carried an error.
    #[error("API error: {0}")]
    Api(String),

    /// Required identifiers are missing.
    #[error("{0}")]
    Configuration(String),

    #[error("{capability} is not available in the {region} region")]
    Unsupported { region: Region, capability: Capability },

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("the response is missing `{0}`")]
    MissingData(&'static str),

    #[error("failed to deserialize the response")]
    Deserialization(#[from] serde_json::Error),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the failure means the feature is simply not there for this account or region.
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. } | Self::Configuration(_))
    }
}
