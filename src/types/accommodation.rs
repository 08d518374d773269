use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{deserialize_some, Currency, RoomType};

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    pub id: Uuid,
    pub trip_stop_id: Uuid,
    pub name: String,
    pub provider: Option<String>,
    pub room_type_id: Option<String>,
    pub nightly_rate: Option<f64>,
    pub total_price: Option<f64>,
    pub currency_id: Uuid,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: Option<f64>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationImage {
    pub id: Uuid,
    pub accommodation_id: Uuid,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationView {
    #[serde(flatten)]
    pub accommodation: Accommodation,
    pub currency: Option<Currency>,
    pub room_type: Option<RoomType>,
    pub images: Vec<AccommodationImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationPayload {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub room_type_id: Option<String>,
    pub nightly_rate: Option<f64>,
    pub total_price: Option<f64>,
    pub currency_id: Option<Uuid>,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: Option<f64>,
    pub notes: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub provider: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub room_type_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub nightly_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub total_price: Option<Option<f64>>,
    pub currency_id: Option<Uuid>,
    #[serde(default, rename = "totalCostEUR", deserialize_with = "deserialize_some")]
    pub total_cost_eur: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub url: Option<Option<String>>,
    pub images: Option<Vec<String>>,
}

impl AccommodationUpdate {
    /// Whether the update touches any input of the EUR total.
    pub fn changes_cost(&self) -> bool {
        self.nightly_rate.is_some()
            || self.total_price.is_some()
            || self.total_cost_eur.is_some()
            || self.currency_id.is_some()
    }

    /// Merges the plain fields. The EUR total is recomputed by the caller.
    pub fn apply(&mut self, accommodation: &mut Accommodation) {
        if let Some(name) = self.name.take() {
            accommodation.name = name;
        }
        if let Some(provider) = self.provider.take() {
            accommodation.provider = provider.filter(|p| !p.is_empty());
        }
        if let Some(room_type_id) = self.room_type_id.take() {
            accommodation.room_type_id = room_type_id.filter(|id| !id.is_empty());
        }
        if let Some(rate) = self.nightly_rate {
            accommodation.nightly_rate = rate.filter(|rate| *rate != 0.0);
        }
        if let Some(price) = self.total_price {
            accommodation.total_price = price.filter(|price| *price != 0.0);
        }
        if let Some(currency_id) = self.currency_id {
            accommodation.currency_id = currency_id;
        }
        if let Some(notes) = self.notes.take() {
            accommodation.notes = notes;
        }
        if let Some(url) = self.url.take() {
            accommodation.url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_cost_inputs_and_blanks_empty_provider() {
        let mut accommodation = Accommodation {
            id: Uuid::new_v4(),
            trip_stop_id: Uuid::new_v4(),
            name: "Casa Luna".to_string(),
            provider: Some("Booking".to_string()),
            room_type_id: None,
            nightly_rate: Some(80.0),
            total_price: None,
            currency_id: Uuid::new_v4(),
            total_cost_eur: Some(240.0),
            notes: None,
            url: None,
            created_at: Utc::now(),
        };
        let mut update: AccommodationUpdate =
            serde_json::from_str(r#"{"provider":"","notes":"pool"}"#).unwrap();

        assert!(!update.changes_cost());
        update.apply(&mut accommodation);

        assert_eq!(accommodation.provider, None);
        assert_eq!(accommodation.notes.as_deref(), Some("pool"));
        assert_eq!(accommodation.nightly_rate, Some(80.0));
    }

    #[test]
    fn rate_change_marks_cost_dirty() {
        let update: AccommodationUpdate = serde_json::from_str(r#"{"nightlyRate":95}"#).unwrap();
        assert!(update.changes_cost());
    }
}
