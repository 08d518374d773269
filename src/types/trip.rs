use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{deserialize_some, CarRentalView, Currency, FlightView, StopView, TripOption};
use crate::error::Error;

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub title: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub people: i32,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: f64,
    pub image_url: Option<String>,
    pub currency_id: Uuid,
    pub start_location_name: Option<String>,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_location_name: Option<String>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    pub split_flight_cost: bool,
    pub split_car_rental_cost: bool,
    pub split_accommodation_cost: bool,
    pub selected_flight_id: Option<Uuid>,
    pub selected_car_rental_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Checks the fields every stored trip must carry.
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::BadRequest("Title is required.".to_string()));
        }
        if self.start_date.is_none() {
            return Err(Error::BadRequest("Start date is required.".to_string()));
        }
        if self.end_date.is_none() {
            return Err(Error::BadRequest("End date is required.".to_string()));
        }
        if self.people < 1 {
            return Err(Error::BadRequest("people must be >= 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrip {
    pub title: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub currency_id: Option<Uuid>,
    pub people: Option<i32>,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: Option<f64>,
    pub image_url: Option<String>,
    pub start_location_name: Option<String>,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_location_name: Option<String>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    pub split_flight_cost: Option<bool>,
    pub split_car_rental_cost: Option<bool>,
    pub split_accommodation_cost: Option<bool>,
}

impl CreateTrip {
    /// Builds the trip to insert. Fails on the first missing required field.
    pub fn into_trip(self) -> Result<Trip, Error> {
        let trip = Trip {
            id: Uuid::new_v4(),
            title: self.title.unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
            people: self.people.unwrap_or(1),
            total_cost_eur: self.total_cost_eur.unwrap_or(0.0),
            image_url: self.image_url,
            currency_id: self.currency_id.unwrap_or_default(),
            start_location_name: self.start_location_name,
            start_lat: self.start_lat,
            start_lng: self.start_lng,
            end_location_name: self.end_location_name,
            end_lat: self.end_lat,
            end_lng: self.end_lng,
            split_flight_cost: self.split_flight_cost.unwrap_or(false),
            split_car_rental_cost: self.split_car_rental_cost.unwrap_or(true),
            split_accommodation_cost: self.split_accommodation_cost.unwrap_or(true),
            selected_flight_id: None,
            selected_car_rental_id: None,
            created_at: Utc::now(),
        };
        trip.validate()?;
        if self.currency_id.is_none() {
            return Err(Error::BadRequest("Currency is required.".to_string()));
        }
        Ok(trip)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub people: Option<i32>,
    pub currency_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub start_location_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub start_lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub start_lng: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_location_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_lng: Option<Option<f64>>,
    pub split_flight_cost: Option<bool>,
    pub split_car_rental_cost: Option<bool>,
    pub split_accommodation_cost: Option<bool>,
}

impl TripUpdate {
    /// Merges the supplied fields into `trip` and validates the result.
    pub fn apply(self, trip: &mut Trip) -> Result<(), Error> {
        if let Some(people) = self.people {
            if people < 1 {
                return Err(Error::BadRequest("people must be >= 1".to_string()));
            }
            trip.people = people;
        }
        if let Some(title) = self.title {
            trip.title = title;
        }
        if let Some(start_date) = self.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            trip.end_date = end_date;
        }
        if let Some(currency_id) = self.currency_id {
            trip.currency_id = currency_id;
        }
        if let Some(image_url) = self.image_url {
            trip.image_url = image_url.filter(|url| !url.is_empty());
        }
        if let Some(name) = self.start_location_name {
            trip.start_location_name = name;
        }
        if let Some(lat) = self.start_lat {
            trip.start_lat = lat;
        }
        if let Some(lng) = self.start_lng {
            trip.start_lng = lng;
        }
        if let Some(name) = self.end_location_name {
            trip.end_location_name = name;
        }
        if let Some(lat) = self.end_lat {
            trip.end_lat = lat;
        }
        if let Some(lng) = self.end_lng {
            trip.end_lng = lng;
        }
        if let Some(split) = self.split_flight_cost {
            trip.split_flight_cost = split;
        }
        if let Some(split) = self.split_car_rental_cost {
            trip.split_car_rental_cost = split;
        }
        if let Some(split) = self.split_accommodation_cost {
            trip.split_accommodation_cost = split;
        }
        trip.validate()
    }
}

/// Trip with its currency, as listed and returned from mutations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    #[serde(flatten)]
    pub trip: Trip,
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_flight: Option<FlightView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_car_rental: Option<CarRentalView>,
}

/// Everything planned for one trip.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: Trip,
    pub currency: Option<Currency>,
    pub flights: Vec<FlightView>,
    pub car_rentals: Vec<CarRentalView>,
    pub trip_stops: Vec<StopView>,
    pub trip_options: Vec<TripOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalFlight {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub flight_id: Option<Option<Uuid>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalCarRental {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub car_rental_id: Option<Option<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateTrip {
        CreateTrip {
            title: Some("Costa Rica".to_string()),
            start_date: Some(Utc::now()),
            end_date: Some(Utc::now()),
            currency_id: Some(Uuid::new_v4()),
            ..Default::default()
        }
    }

    fn message(error: Error) -> String {
        error.to_string()
    }

    #[test]
    fn create_applies_defaults() {
        let trip = create_request().into_trip().unwrap();

        assert_eq!(trip.people, 1);
        assert_eq!(trip.total_cost_eur, 0.0);
        assert!(!trip.split_flight_cost);
        assert!(trip.split_car_rental_cost);
        assert!(trip.split_accommodation_cost);
    }

    #[test]
    fn create_requires_fields_in_order() {
        let blank_title = CreateTrip {
            title: Some("   ".to_string()),
            ..create_request()
        };
        assert_eq!(message(blank_title.into_trip().unwrap_err()), "Title is required.");

        let no_end = CreateTrip {
            end_date: None,
            ..create_request()
        };
        assert_eq!(message(no_end.into_trip().unwrap_err()), "End date is required.");

        let no_currency = CreateTrip {
            currency_id: None,
            ..create_request()
        };
        assert_eq!(message(no_currency.into_trip().unwrap_err()), "Currency is required.");
    }

    #[test]
    fn update_merges_and_revalidates() {
        let mut trip = create_request().into_trip().unwrap();
        let update: TripUpdate =
            serde_json::from_str(r#"{"people":4,"imageUrl":"","endLocationName":"San José"}"#).unwrap();
        update.apply(&mut trip).unwrap();

        assert_eq!(trip.people, 4);
        assert_eq!(trip.image_url, None);
        assert_eq!(trip.end_location_name.as_deref(), Some("San José"));

        let clear_start: TripUpdate = serde_json::from_str(r#"{"startDate":null}"#).unwrap();
        assert_eq!(message(clear_start.apply(&mut trip).unwrap_err()), "Start date is required.");
    }

    #[test]
    fn update_rejects_empty_party() {
        let mut trip = create_request().into_trip().unwrap();
        let update = TripUpdate {
            people: Some(0),
            ..Default::default()
        };
        assert_eq!(message(update.apply(&mut trip).unwrap_err()), "people must be >= 1");
    }

    #[test]
    fn final_flight_distinguishes_missing_from_null() {
        let missing: FinalFlight = serde_json::from_str("{}").unwrap();
        let cleared: FinalFlight = serde_json::from_str(r#"{"flightId":null}"#).unwrap();

        assert_eq!(missing.flight_id, None);
        assert_eq!(cleared.flight_id, Some(None));
    }
}
