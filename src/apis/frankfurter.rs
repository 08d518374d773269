use std::collections::HashMap;

use reqwest::{Client, Error};
use serde_json::Value;

/// Client for a Frankfurter-compatible exchange rate API.
#[derive(Debug, Clone)]
pub struct RatesApi {
    client: Client,
    url: String,
}

impl RatesApi {
    pub fn new(url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        Self {
            client: Client::new(),
            url,
        }
    }

    /// Latest rates quoted as units of each currency per EUR.
    pub async fn latest_eur_rates(&self) -> Result<HashMap<String, f64>, Error> {
        let response = self
            .client
            .get(format!("{}latest", &self.url))
            .query(&[("base", "EUR")])
            .send()
            .await?
            .error_for_status()?;

        let response_json = response.json::<Value>().await?;

        Ok(parse_rates(&response_json))
    }
}

/// Reads the `rates` object, skipping entries that are not numbers. A body
/// without rates yields an empty map.
pub fn parse_rates(response_json: &Value) -> HashMap<String, f64> {
    let rates = match response_json.get("rates").and_then(Value::as_object) {
        Some(rates) => rates,
        None => return HashMap::new(),
    };

    rates
        .iter()
        .filter_map(|(code, rate)| Some((code.to_uppercase(), rate.as_f64()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rates() {
        let body = json!({
            "amount": 1.0,
            "base": "EUR",
            "date": "2025-03-03",
            "rates": {"USD": 1.0465, "GBP": 0.8249, "BAD": "n/a"}
        });
        let rates = parse_rates(&body);

        assert_eq!(rates.len(), 2);
        assert_eq!(rates["USD"], 1.0465);
        assert_eq!(rates["GBP"], 0.8249);
    }

    #[test]
    fn missing_rates_are_empty() {
        assert!(parse_rates(&json!({"message": "not found"})).is_empty());
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(RatesApi::new("http://localhost:8080/v1").url, "http://localhost:8080/v1/");
        assert_eq!(RatesApi::new("https://api.frankfurter.dev/v1/").url, "https://api.frankfurter.dev/v1/");
    }
}
