use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::json;
use serde_with::{DefaultOnNull, VecSkipError, serde_as};

use crate::{
    api::{Capability, Error, kraken::Api},
    core::saving_session::SavingSession,
    prelude::*,
};

const QUERY: &str = "query GetSavingSessions($account: String!) { savingSessions(accountNumber: $account) { events { code startAt endAt rewardPerKwhInOctoPoints } } }";

impl Api {
    #[instrument(skip_all, fields(region = %self.region))]
    pub async fn get_saving_sessions(
        &self,
        now: DateTime<Local>,
    ) -> Result<Vec<SavingSession>, Error> {
        self.region.ensure(Capability::SavingSessions)?;
        let number = self.account_number().await?;
        info!(number, "fetching saving sessions…");
        let data: Data = self.query(QUERY, json!({ "account": number })).await?;
        Ok(data.into_upcoming(now))
    }
}

#[serde_as]
#[derive(Deserialize)]
struct Data {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "savingSessions", default)]
    saving_sessions: SavingSessions,
}

#[serde_as]
#[derive(Default, Deserialize)]
struct SavingSessions {
    #[serde_as(as = "DefaultOnNull<VecSkipError<_>>")]
    #[serde(default)]
    events: Vec<Event>,
}

#[serde_as]
#[derive(Deserialize)]
struct Event {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    code: String,

    #[serde(rename = "startAt")]
    start_at: DateTime<Local>,

    #[serde(rename = "endAt")]
    end_at: DateTime<Local>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "rewardPerKwhInOctoPoints", default)]
    reward_per_kwh: u32,
}

impl Data {
    /// Keep the sessions that have not ended yet, sorted by start.
    fn into_upcoming(self, now: DateTime<Local>) -> Vec<SavingSession> {
        let mut sessions: Vec<_> = self
            .saving_sessions
            .events
            .into_iter()
            .map(|event| SavingSession {
                code: event.code,
                interval: event.start_at..event.end_at,
                reward_per_kwh: event.reward_per_kwh,
            })
            .filter(|session| !session.is_over(now))
            .collect();
        sessions.sort_by_key(|session| session.interval.start);
        sessions
    }
}
