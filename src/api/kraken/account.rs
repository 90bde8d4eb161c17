use serde::Deserialize;
use serde_json::json;
use serde_with::{DefaultOnNull, DisplayFromStr, PickFirst, serde_as};

use crate::{
    api::{Capability, Error, kraken::Api},
    core::account::Account,
    prelude::*,
    quantity::money::{Currency, Money},
};

const QUERY: &str = "query GetAccount($account: String!) { account(accountNumber: $account) { balance billingName status properties { address } } }";

impl Api {
    #[instrument(skip_all, fields(region = %self.region))]
    pub async fn get_account(&self) -> Result<Account, Error> {
        self.region.ensure(Capability::Account)?;
        let number = self.account_number().await?;
        info!(number, "fetching the account…");
        let data: Data = self.query(QUERY, json!({ "account": number })).await?;
        Ok(data.account.into_account(number.to_owned(), self.region.currency()))
    }
}

#[derive(Deserialize)]
struct Data {
    account: AccountNode,
}

#[serde_as]
#[derive(Deserialize)]
struct AccountNode {
    /// Minor currency units for the UK, whole yen for Japan.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    balance: f64,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "billingName", default)]
    billing_name: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    status: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    properties: Vec<Property>,
}

#[serde_as]
#[derive(Deserialize)]
struct Property {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    address: String,
}

impl AccountNode {
    fn into_account(self, number: String, currency: Currency) -> Account {
        Account {
            number,
            name: self.billing_name,
            status: self.status,
            address: self
                .properties
                .into_iter()
                .next()
                .map(|property| property.address)
                .unwrap_or_default(),
            balance: Money::from_minor_units(self.balance, currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_deserialize_uk_account() -> Result {
        // language=JSON
        const DATA: &str = r#"
            {
                "account": {
                    "balance": -4217,
                    "billingName": "Ada Lovelace",
                    "status": "ACTIVE",
                    "properties": [{"address": "1 Example Street, London"}]
                }
            }
        "#;
        let account =
            serde_json::from_str::<Data>(DATA)?.account.into_account("A-1".into(), Currency::Gbp);
        assert_abs_diff_eq!(account.balance.amount, -42.17);
        assert!(!account.is_in_credit());
        assert_eq!(account.name, "Ada Lovelace");
        assert_eq!(account.address, "1 Example Street, London");
        Ok(())
    }

    #[test]
    fn test_deserialize_japan_account_with_nulls() -> Result {
        // language=JSON
        const DATA: &str = r#"
            {"account": {"balance": 1234, "billingName": null, "status": null, "properties": []}}
        "#;
        let account =
            serde_json::from_str::<Data>(DATA)?.account.into_account("A-2".into(), Currency::Jpy);
        assert_abs_diff_eq!(account.balance.amount, 1234.0);
        assert_eq!(account.balance.to_string(), "¥1234");
        assert!(account.name.is_empty());
        assert!(account.status.is_empty());
        assert!(account.address.is_empty());
        Ok(())
    }
}
