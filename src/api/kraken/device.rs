use serde::Deserialize;
use serde_json::json;

use crate::{
    api::{Capability, Error, kraken::Api},
    core::smart_device::SmartDevice,
    prelude::*,
};

const QUERY: &str = "query GetDevices($account: String!) { registeredKrakenflexDevice(accountNumber: $account) { krakenflexDeviceId provider status } }";

impl Api {
    #[instrument(skip_all, fields(region = %self.region))]
    pub async fn get_smart_devices(&self) -> Result<Vec<SmartDevice>, Error> {
        self.region.ensure(Capability::SmartDevices)?;
        let number = self.account_number().await?;
        info!(number, "fetching smart devices…");
        let data: Data = self.query(QUERY, json!({ "account": number })).await?;
        Ok(data.device.into_iter().map(SmartDevice::from).collect())
    }
}

#[derive(Deserialize)]
struct Data {
    #[serde(rename = "registeredKrakenflexDevice", default)]
    device: Option<Device>,
}

#[derive(Deserialize)]
struct Device {
    #[serde(rename = "krakenflexDeviceId")]
    device_id: String,

    #[serde(default)]
    provider: Option<String>,

    #[serde(default)]
    status: Option<String>,
}

impl From<Device> for SmartDevice {
    fn from(device: Device) -> Self {
        Self {
            device_id: device.device_id,
            provider: device.provider.unwrap_or_default(),
            status: device.status.unwrap_or_else(|| "ACTIVE".to_owned()),
        }
    }
}
