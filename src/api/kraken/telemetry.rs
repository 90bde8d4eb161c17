use chrono::{DateTime, Local, SecondsFormat, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::json;
use serde_with::{DefaultOnNull, DisplayFromStr, PickFirst, VecSkipError, serde_as};

use crate::{
    api::{Capability, Error, kraken::Api},
    core::live_power::LivePower,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts},
};

const TELEMETRY_QUERY: &str = "query GetTelemetry($deviceId: String!, $start: DateTime!, $end: DateTime!) { smartMeterTelemetry(deviceId: $deviceId, grouping: HALF_HOURLY, start: $start, end: $end) { readAt demand consumption } }";

const DISCOVERY_QUERY: &str = "query DiscoverDevices($account: String!) { account(accountNumber: $account) { properties { electricityMeterPoints { meters { smartDevices { deviceId } } } } } }";

/// Telemetry look-back window.
const WINDOW: TimeDelta = TimeDelta::minutes(30);

impl Api {
    /// Latest Home Mini reading, or `None` when there is no device or no recent telemetry.
    #[instrument(skip_all, fields(region = %self.region))]
    pub async fn get_live_power(
        &self,
        device_id: Option<&str>,
    ) -> Result<Option<LivePower>, Error> {
        self.region.ensure(Capability::LivePower)?;
        let device_id = match device_id {
            Some(device_id) => device_id.to_owned(),
            None => match self.discover_meter_device().await? {
                Some(device_id) => device_id,
                None => {
                    info!("no smart meter device found");
                    return Ok(None);
                }
            },
        };

        let end = Utc::now();
        let start = end - WINDOW;
        info!(%device_id, "fetching telemetry…");
        let variables = json!({
            "deviceId": device_id,
            "start": start.to_rfc3339_opts(SecondsFormat::Secs, true),
            "end": end.to_rfc3339_opts(SecondsFormat::Secs, true),
        });
        let data: TelemetryData = self.query(TELEMETRY_QUERY, variables).await?;
        Ok(data.into_latest())
    }

    #[instrument(skip_all)]
    async fn discover_meter_device(&self) -> Result<Option<String>, Error> {
        let number = self.account_number().await?;
        info!(number, "discovering the smart meter device…");
        let data: DiscoveryData =
            self.query(DISCOVERY_QUERY, json!({ "account": number })).await?;
        Ok(data.into_device_id())
    }
}

#[serde_as]
#[derive(Deserialize)]
struct TelemetryData {
    #[serde_as(as = "DefaultOnNull<VecSkipError<_>>")]
    #[serde(rename = "smartMeterTelemetry", default)]
    telemetry: Vec<Telemetry>,
}

#[serde_as]
#[derive(Deserialize)]
struct Telemetry {
    #[serde(rename = "readAt")]
    read_at: DateTime<Local>,

    /// Watts.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    demand: Option<f64>,

    /// Kilowatt-hours.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    consumption: Option<f64>,
}

impl TelemetryData {
    fn into_latest(self) -> Option<LivePower> {
        self.telemetry.into_iter().next_back().map(|telemetry| LivePower {
            demand: Watts(telemetry.demand.unwrap_or_default()),
            read_at: telemetry.read_at,
            consumption: telemetry.consumption.map(KilowattHours),
        })
    }
}

#[derive(Deserialize)]
struct DiscoveryData {
    account: DiscoveryAccount,
}

#[serde_as]
#[derive(Deserialize)]
struct DiscoveryAccount {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    properties: Vec<DiscoveryProperty>,
}

#[serde_as]
#[derive(Deserialize)]
struct DiscoveryProperty {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "electricityMeterPoints", default)]
    meter_points: Vec<MeterPoint>,
}

#[serde_as]
#[derive(Deserialize)]
struct MeterPoint {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    meters: Vec<Meter>,
}

#[serde_as]
#[derive(Deserialize)]
struct Meter {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "smartDevices", default)]
    smart_devices: Vec<SmartDeviceNode>,
}

#[derive(Deserialize)]
struct SmartDeviceNode {
    #[serde(rename = "deviceId", default)]
    device_id: Option<String>,
}

impl DiscoveryData {
    fn into_device_id(self) -> Option<String> {
        self.account
            .properties
            .into_iter()
            .flat_map(|property| property.meter_points)
            .flat_map(|meter_point| meter_point.meters)
            .flat_map(|meter| meter.smart_devices)
            .filter_map(|device| device.device_id)
            .find(|device_id| !device_id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_latest_telemetry_wins() -> Result {
        // language=JSON
        const DATA: &str = r#"
            {
                "smartMeterTelemetry": [
                    {"readAt": "2025-01-15T12:00:00+00:00", "demand": "350.0", "consumption": "0.1"},
                    {"readAt": "2025-01-15T12:00:10+00:00", "demand": 1234, "consumption": null}
                ]
            }
        "#;
        let live_power = serde_json::from_str::<TelemetryData>(DATA)?.into_latest().unwrap();
        assert_abs_diff_eq!(live_power.demand.0, 1234.0);
        assert!(live_power.consumption.is_none());
        Ok(())
    }

    #[test]
    fn test_no_telemetry() -> Result {
        // language=JSON
        let data = serde_json::from_str::<TelemetryData>(r#"{"smartMeterTelemetry": null}"#)?;
        assert!(data.into_latest().is_none());
        Ok(())
    }

    #[test]
    fn test_discover_first_device() -> Result {
        // language=JSON
        const DATA: &str = r#"
            {
                "account": {
                    "properties": [
                        {"electricityMeterPoints": [{"meters": [{"smartDevices": []}]}]},
                        {
                            "electricityMeterPoints": [
                                {"meters": [{"smartDevices": [{"deviceId": ""}, {"deviceId": "00-11-22-33"}]}]}
                            ]
                        }
                    ]
                }
            }
        "#;
        let device_id = serde_json::from_str::<DiscoveryData>(DATA)?.into_device_id();
        assert_eq!(device_id.as_deref(), Some("00-11-22-33"));
        Ok(())
    }
}
