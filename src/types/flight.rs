use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{deserialize_some, serialize_json_text, Currency};
use crate::itinerary::FlightLeg;

#[derive(Debug, sqlx::FromRow, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub trip_option_id: Option<Uuid>,
    pub airline: String,
    pub flight_number: Option<String>,
    pub from_airport: String,
    pub to_airport: String,
    pub departure_date: Option<DateTime<Utc>>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub travel_class: String,
    pub base_fare: f64,
    #[serde(serialize_with = "serialize_json_text")]
    pub extras: Option<String>,
    pub currency_id: Uuid,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: f64,
    pub booking_url: Option<String>,
    pub airline_logo_url: Option<String>,
    pub notes: Option<String>,
    pub stops: i32,
    pub duration_min: Option<i64>,
    pub is_round_trip: bool,
    pub return_departure_date: Option<DateTime<Utc>>,
    pub return_arrival_date: Option<DateTime<Utc>>,
    pub outbound_duration_min: Option<i64>,
    pub outbound_net_duration_min: Option<i64>,
    pub outbound_stopover_min: Option<i64>,
    pub return_duration_min: Option<i64>,
    pub return_net_duration_min: Option<i64>,
    pub return_stopover_min: Option<i64>,
    pub stop_over_duration_minutes: Option<i64>,
    #[serde(serialize_with = "serialize_json_text")]
    pub stop_over_airports: Option<String>,
    #[serde(serialize_with = "serialize_json_text")]
    pub segments: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightView {
    #[serde(flatten)]
    pub flight: Flight,
    pub currency: Option<Currency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlight {
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub from_airport: Option<String>,
    pub to_airport: Option<String>,
    pub departure_date: Option<DateTime<Utc>>,
    pub arrival_date: Option<DateTime<Utc>>,
    pub travel_class: Option<String>,
    pub base_fare: Option<f64>,
    pub currency_id: Option<Uuid>,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: Option<f64>,
    pub extras: Option<Value>,
    pub booking_url: Option<String>,
    pub airline_logo_url: Option<String>,
    pub notes: Option<String>,
    pub stops: Option<i32>,
    pub is_round_trip: Option<bool>,
    pub return_departure_date: Option<DateTime<Utc>>,
    pub return_arrival_date: Option<DateTime<Utc>>,
    pub trip_option_id: Option<Uuid>,
    pub segments: Option<Vec<FlightLeg>>,
}

/// Partial flight update. Omitted fields stay as they are; `null` clears a
/// nullable field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightUpdate {
    pub airline: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub flight_number: Option<Option<String>>,
    pub from_airport: Option<String>,
    pub to_airport: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub departure_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub arrival_date: Option<Option<DateTime<Utc>>>,
    pub travel_class: Option<String>,
    pub stops: Option<i32>,
    pub base_fare: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub extras: Option<Option<Value>>,
    pub currency_id: Option<Uuid>,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub booking_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub airline_logo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub stop_over_duration_minutes: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub stop_over_airports: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub segments: Option<Option<Vec<FlightLeg>>>,
    pub is_round_trip: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub return_departure_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub return_arrival_date: Option<Option<DateTime<Utc>>>,
}
