use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::json;
use serde_with::{DefaultOnNull, DisplayFromStr, PickFirst, VecSkipError, serde_as};

use crate::{
    api::{Capability, Error, kraken::Api},
    core::dispatch::{CompletedDispatch, Dispatch},
    prelude::*,
    quantity::energy::KilowattHours,
};

const PLANNED_QUERY: &str = "query GetDispatches($account: String!) { plannedDispatches(accountNumber: $account) { start end delta } }";

const COMPLETED_QUERY: &str = "query GetCompletedDispatches($account: String!) { completedDispatches(accountNumber: $account) { start end delta } }";

const SOURCE: &str = "smart-charge";

impl Api {
    #[instrument(skip_all, fields(region = %self.region))]
    pub async fn get_dispatches(&self) -> Result<Vec<Dispatch>, Error> {
        self.region.ensure(Capability::Dispatches)?;
        let number = self.account_number().await?;
        info!(number, "fetching planned dispatches…");
        let data: PlannedData = self.query(PLANNED_QUERY, json!({ "account": number })).await?;
        let dispatches = data.into_dispatches();
        info!(n_dispatches = dispatches.len(), "fetched");
        Ok(dispatches)
    }

    #[instrument(skip_all, fields(region = %self.region, limit = limit))]
    pub async fn get_completed_dispatches(
        &self,
        limit: usize,
    ) -> Result<Vec<CompletedDispatch>, Error> {
        self.region.ensure(Capability::Dispatches)?;
        let number = self.account_number().await?;
        info!(number, "fetching completed dispatches…");
        let data: CompletedData =
            self.query(COMPLETED_QUERY, json!({ "account": number })).await?;
        Ok(data.into_completed_dispatches(limit))
    }
}

#[serde_as]
#[derive(Deserialize)]
struct PlannedData {
    #[serde_as(as = "DefaultOnNull<VecSkipError<_>>")]
    #[serde(rename = "plannedDispatches", default)]
    dispatches: Vec<DispatchNode>,
}

impl PlannedData {
    fn into_dispatches(self) -> Vec<Dispatch> {
        let mut dispatches: Vec<_> = self
            .dispatches
            .into_iter()
            .map(|node| Dispatch { interval: node.start..node.end, source: SOURCE.to_owned() })
            .collect();
        dispatches.sort_by_key(|dispatch| dispatch.interval.start);
        dispatches
    }
}

#[serde_as]
#[derive(Deserialize)]
struct CompletedData {
    #[serde_as(as = "DefaultOnNull<VecSkipError<_>>")]
    #[serde(rename = "completedDispatches", default)]
    dispatches: Vec<DispatchNode>,
}

impl CompletedData {
    fn into_completed_dispatches(self, limit: usize) -> Vec<CompletedDispatch> {
        let mut dispatches: Vec<_> = self
            .dispatches
            .into_iter()
            .map(|node| CompletedDispatch {
                interval: node.start..node.end,
                energy: KilowattHours(node.delta.unwrap_or_default()).abs(),
            })
            .collect();
        dispatches.sort_by_key(|dispatch| std::cmp::Reverse(dispatch.interval.start));
        dispatches.truncate(limit);
        dispatches
    }
}

#[serde_as]
#[derive(Deserialize)]
struct DispatchNode {
    start: DateTime<Local>,
    end: DateTime<Local>,

    /// Energy change in kilowatt-hours, negative when charging.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    delta: Option<f64>,
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_planned_dispatches_sorted_and_invalid_skipped() -> Result {
        // language=JSON
        const DATA: &str = r#"
            {
                "plannedDispatches": [
                    {"start": "2025-01-16 03:00:00+00:00", "end": "2025-01-16 04:00:00+00:00", "delta": "-5.2"},
                    {"start": "garbage", "end": "2025-01-16 02:00:00+00:00", "delta": null},
                    {"start": "2025-01-16T01:00:00Z", "end": "2025-01-16T02:00:00Z", "delta": -3.1}
                ]
            }
        "#;
        let dispatches = serde_json::from_str::<PlannedData>(DATA)?.into_dispatches();
        assert_eq!(dispatches.len(), 2);
        assert!(dispatches[0].interval.start < dispatches[1].interval.start);
        assert_eq!(dispatches[0].source, "smart-charge");
        Ok(())
    }

    #[test]
    fn test_null_planned_dispatches() -> Result {
        // language=JSON
        let data = serde_json::from_str::<PlannedData>(r#"{"plannedDispatches": null}"#)?;
        assert!(data.into_dispatches().is_empty());
        Ok(())
    }

    #[test]
    fn test_completed_dispatches_newest_first() -> Result {
        // language=JSON
        const DATA: &str = r#"
            {
                "completedDispatches": [
                    {"start": "2025-01-14T01:00:00Z", "end": "2025-01-14T02:00:00Z", "delta": "-4.5"},
                    {"start": "2025-01-15T01:00:00Z", "end": "2025-01-15T02:00:00Z", "delta": -2.0},
                    {"start": "2025-01-13T01:00:00Z", "end": "2025-01-13T02:00:00Z", "delta": null}
                ]
            }
        "#;
        let dispatches = serde_json::from_str::<CompletedData>(DATA)?.into_completed_dispatches(2);
        assert_eq!(dispatches.len(), 2);
        assert_abs_diff_eq!(dispatches[0].energy.0, 2.0);
        assert_abs_diff_eq!(dispatches[1].energy.0, 4.5);
        Ok(())
    }
}
