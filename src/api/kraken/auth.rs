use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::api::{Error, Region};

/// Tokens are treated as expired this long after they were obtained,
/// which is just under the server-side lifetime of one hour.
pub const TOKEN_LIFETIME: TimeDelta = TimeDelta::minutes(55);

#[derive(Clone)]
pub enum Credentials {
    /// UK personal API key (`sk_live_…`).
    ApiKey(String),

    /// Japan account login.
    Password { email: String, password: String },
}

impl Credentials {
    /// Pick the credentials the region authenticates with.
    pub fn for_region(
        region: Region,
        api_key: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self, Error> {
        match region {
            Region::Uk => api_key
                .map(Self::ApiKey)
                .ok_or_else(|| Error::Authentication("UK region requires an API key".into())),
            Region::Japan => match (email, password) {
                (Some(email), Some(password)) => Ok(Self::Password { email, password }),
                _ => Err(Error::Authentication(
                    "Japan region requires an email and password".into(),
                )),
            },
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::ApiKey(api_key) => Some(api_key),
            Self::Password { .. } => None,
        }
    }
}

/// Debug output never reveals the secrets.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(…)"),
            Self::Password { email, .. } => {
                f.debug_struct("Password").field("email", email).finish_non_exhaustive()
            }
        }
    }
}

#[must_use]
#[derive(Clone)]
pub struct Token {
    pub token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Local>,
}

impl Token {
    pub fn new(token: String, refresh_token: Option<String>, obtained_at: DateTime<Local>) -> Self {
        Self { token, refresh_token, expires_at: obtained_at + TOKEN_LIFETIME }
    }

    pub fn is_fresh(&self, now: DateTime<Local>) -> bool {
        now < self.expires_at
    }
}

/// `obtainKrakenToken` mutation variables.
#[derive(Serialize)]
#[serde(untagged)]
pub enum TokenVariables<'a> {
    ApiKey {
        key: &'a str,
    },

    Input {
        input: TokenInput<'a>,
    },
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum TokenInput<'a> {
    Password { email: &'a str, password: &'a str },

    Refresh {
        #[serde(rename = "refreshToken")]
        refresh_token: &'a str,
    },
}

impl<'a> TokenVariables<'a> {
    /// Japan prefers the refresh token over the password once it has one.
    pub fn new(credentials: &'a Credentials, refresh_token: Option<&'a str>) -> Self {
        match (credentials, refresh_token) {
            (Credentials::ApiKey(key), _) => Self::ApiKey { key },
            (Credentials::Password { .. }, Some(refresh_token)) => {
                Self::Input { input: TokenInput::Refresh { refresh_token } }
            }
            (Credentials::Password { email, password }, None) => {
                Self::Input { input: TokenInput::Password { email, password } }
            }
        }
    }

    pub const fn mutation(&self) -> &'static str {
        match self {
            Self::ApiKey { .. } => {
                "mutation ObtainToken($key: String!) { obtainKrakenToken(input: {APIKey: $key}) { token } }"
            }
            Self::Input { .. } => {
                "mutation obtainKrakenToken($input: ObtainJSONWebTokenInput!) { obtainKrakenToken(input: $input) { token refreshToken } }"
            }
        }
    }
}

#[derive(Deserialize)]
pub struct ObtainTokenData {
    #[serde(rename = "obtainKrakenToken")]
    pub obtain_kraken_token: ObtainedToken,
}

#[derive(Deserialize)]
pub struct ObtainedToken {
    pub token: String,

    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}
