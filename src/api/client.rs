use std::time::Duration;

use reqwest::Client;

use crate::api::Error;

/// Build a default client.
pub fn try_new() -> Result<Client, Error> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("open-octopus/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
