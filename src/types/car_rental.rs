use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, CarType, Currency};
use crate::error::Error;

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarRental {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub trip_option_id: Option<Uuid>,
    pub provider: String,
    pub car_type_id: Option<String>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub dropoff_date: Option<DateTime<Utc>>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub base_rate: f64,
    pub fees: f64,
    pub insurance_per_day: f64,
    pub currency_id: Uuid,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: f64,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarRentalView {
    #[serde(flatten)]
    pub rental: CarRental,
    pub currency: Option<Currency>,
    pub car_type: Option<CarType>,
}

/// Body of both create and update. An update replaces every field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarRentalPayload {
    #[serde(alias = "company")]
    pub provider: Option<String>,
    pub car_type_id: Option<String>,
    pub pickup_date: Option<DateTime<Utc>>,
    #[serde(alias = "dropOffDate")]
    pub dropoff_date: Option<DateTime<Utc>>,
    pub pickup_location: Option<String>,
    #[serde(alias = "dropOffLocation")]
    pub dropoff_location: Option<String>,
    pub base_rate: Option<f64>,
    pub fees: Option<f64>,
    pub insurance_per_day: Option<f64>,
    pub currency_id: Option<Uuid>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub trip_option_id: Option<Uuid>,
}

impl CarRentalPayload {
    /// Builds the stored rental with a zero EUR total; the caller prices it.
    pub fn into_rental(self, id: Uuid, trip_id: Uuid) -> Result<CarRental, Error> {
        let provider = non_blank(self.provider);
        let pickup_location = non_blank(self.pickup_location);
        let dropoff_location = non_blank(self.dropoff_location);

        let missing: Vec<&str> = [
            ("provider", provider.is_none()),
            ("pickupLocation", pickup_location.is_none()),
            ("dropoffLocation", dropoff_location.is_none()),
            ("currencyId", self.currency_id.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            return Err(Error::BadRequest(format!("Missing fields: {}", missing.join(", "))));
        }

        Ok(CarRental {
            id,
            trip_id,
            trip_option_id: self.trip_option_id,
            provider: provider.unwrap_or_default(),
            car_type_id: non_blank(self.car_type_id),
            pickup_date: self.pickup_date,
            dropoff_date: self.dropoff_date,
            pickup_location: pickup_location.unwrap_or_default(),
            dropoff_location: dropoff_location.unwrap_or_default(),
            base_rate: self.base_rate.unwrap_or(0.0),
            fees: self.fees.unwrap_or(0.0),
            insurance_per_day: self.insurance_per_day.unwrap_or(0.0),
            currency_id: self.currency_id.unwrap_or_default(),
            total_cost_eur: 0.0,
            notes: non_blank(self.notes),
            url: non_blank(self.url),
            image_url: non_blank(self.image_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legacy_field_names() {
        let payload: CarRentalPayload = serde_json::from_str(
            r#"{
                "company": " Adobe ",
                "pickupLocation": "SJO",
                "dropOffLocation": "LIR",
                "dropOffDate": "2025-03-10T10:00:00Z",
                "baseRate": 300,
                "currencyId": "5f1e4d5c-7a57-4c43-9d43-8e4a5e1b2b61"
            }"#,
        )
        .unwrap();
        let rental = payload.into_rental(Uuid::new_v4(), Uuid::new_v4()).unwrap();

        assert_eq!(rental.provider, "Adobe");
        assert_eq!(rental.dropoff_location, "LIR");
        assert!(rental.dropoff_date.is_some());
        assert_eq!(rental.base_rate, 300.0);
        assert_eq!(rental.fees, 0.0);
    }

    #[test]
    fn reports_every_missing_field() {
        let payload = CarRentalPayload {
            provider: Some("  ".to_string()),
            pickup_location: Some("SJO".to_string()),
            ..Default::default()
        };
        let error = payload.into_rental(Uuid::new_v4(), Uuid::new_v4()).unwrap_err();

        assert_eq!(error.to_string(), "Missing fields: provider, dropoffLocation, currencyId");
    }
}
