use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::api::Error;

#[derive(Serialize)]
pub struct Request<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

/// Generic GraphQL response.
///
/// I first read the data into [`serde_json::Value`] in order to log it.
/// And only then, I do parse it.
#[serde_as]
#[derive(Deserialize)]
pub struct Response {
    #[serde(default)]
    data: Option<serde_json::Value>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Deserialize)]
struct ResponseError {
    #[serde(default)]
    message: Option<String>,
}

impl From<Response> for Result<serde_json::Value, Error> {
    fn from(response: Response) -> Self {
        if let Some(error) = response.errors.into_iter().next() {
            Err(Error::Api(error.message.unwrap_or_else(|| "unknown error".to_owned())))
        } else {
            response.data.filter(|data| !data.is_null()).ok_or(Error::MissingData("data"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Result;

    fn parse(body: &str) -> Result<Result<serde_json::Value, Error>> {
        Ok(serde_json::from_str::<Response>(body)?.into())
    }

    #[test]
    fn test_data_ok() -> Result {
        // language=JSON
        let data = parse(r#"{"data": {"account": {"balance": 1234}}}"#)??;
        assert_eq!(data["account"]["balance"], 1234);
        Ok(())
    }

    #[test]
    fn test_first_error_wins() -> Result {
        // language=JSON
        const BODY: &str = r#"
            {
                "data": null,
                "errors": [
                    {"message": "Invalid API key.", "extensions": {"errorCode": "KT-CT-1139"}},
                    {"message": "Second"}
                ]
            }
        "#;
        match parse(BODY)? {
            Err(Error::Api(message)) => assert_eq!(message, "Invalid API key."),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
        Ok(())
    }

    #[test]
    fn test_null_errors_ignored() -> Result {
        // language=JSON
        let data = parse(r#"{"data": {"ok": true}, "errors": null}"#)??;
        assert_eq!(data["ok"], true);
        Ok(())
    }

    #[test]
    fn test_missing_data() -> Result {
        assert!(matches!(parse("{}")?, Err(Error::MissingData("data"))));
        assert!(matches!(parse(r#"{"data": null}"#)?, Err(Error::MissingData("data"))));
        Ok(())
    }
}
