use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: Uuid,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "rateToEUR")]
    pub rate_to_eur: f64,
}

impl Currency {
    /// ISO code of the currency: the symbol when it already is one (`USD`),
    /// otherwise a trailing `(XXX)` in the name (`US Dollar (USD)`).
    pub fn code(&self) -> Option<String> {
        let symbol = self.symbol.trim();
        if is_iso_code(symbol) {
            return Some(symbol.to_string());
        }
        let inner = self.name.trim().strip_suffix(')')?;
        let (_, code) = inner.rsplit_once('(')?;
        is_iso_code(code).then(|| code.to_string())
    }

    pub fn is_euro(&self) -> bool {
        self.symbol == "€" || self.code().as_deref() == Some("EUR")
    }

    /// EUR value of one unit, given rates quoted as units per EUR. `None`
    /// when the rates do not cover this currency.
    pub fn live_rate(&self, rates: &HashMap<String, f64>) -> Option<f64> {
        if self.is_euro() {
            return Some(1.0);
        }
        let per_euro = rates.get(&self.code()?)?;
        (*per_euro > 0.0).then(|| 1.0 / per_euro)
    }
}

fn is_iso_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPayload {
    pub name: String,
    pub symbol: String,
    #[serde(default, rename = "rateToEUR")]
    pub rate_to_eur: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyUpdate {
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(default, rename = "rateToEUR")]
    pub rate_to_eur: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency(name: &str, symbol: &str) -> Currency {
        Currency {
            id: Uuid::new_v4(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            rate_to_eur: 1.0,
        }
    }

    #[test]
    fn code_from_symbol_or_name() {
        assert_eq!(currency("Dollar", "USD").code().as_deref(), Some("USD"));
        assert_eq!(currency("US Dollar (USD)", "$").code().as_deref(), Some("USD"));
        assert_eq!(currency("Pound", "£").code(), None);
    }

    #[test]
    fn euro_is_always_one() {
        let rates = HashMap::new();
        assert_eq!(currency("Euro (EUR)", "€").live_rate(&rates), Some(1.0));
        assert_eq!(currency("Euro", "EUR").live_rate(&rates), Some(1.0));
    }

    #[test]
    fn live_rate_inverts_units_per_euro() {
        let rates = HashMap::from([("USD".to_string(), 1.25), ("GBP".to_string(), 0.0)]);

        assert_eq!(currency("US Dollar (USD)", "$").live_rate(&rates), Some(0.8));
        assert_eq!(currency("British Pound (GBP)", "£").live_rate(&rates), None);
        assert_eq!(currency("Costa Rican Colón (CRC)", "₡").live_rate(&rates), None);
    }
}
