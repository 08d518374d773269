use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{deserialize_some, AccommodationView};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, sqlx::Type, Deserialize, Serialize)]
#[sqlx(type_name = "stop_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum StopType {
    Hub,
    Stop,
}

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripStop {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[sqlx(rename = "stop_type")]
    #[serde(rename = "type")]
    pub stop_type: StopType,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub selected_accommodation_id: Option<Uuid>,
}

impl AsRef<TripStop> for TripStop {
    fn as_ref(&self) -> &TripStop {
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopView {
    #[serde(flatten)]
    pub stop: TripStop,
    pub accommodations: Vec<AccommodationView>,
    pub selected_accommodation: Option<AccommodationView>,
}

impl AsRef<TripStop> for StopView {
    fn as_ref(&self) -> &TripStop {
        &self.stop
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPayload {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "type")]
    pub stop_type: Option<StopType>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopUpdate {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub lng: Option<Option<f64>>,
    #[serde(rename = "type")]
    pub stop_type: Option<StopType>,
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub selected_accommodation_id: Option<Option<Uuid>>,
}

impl StopUpdate {
    pub fn apply(self, stop: &mut TripStop) {
        if let Some(name) = self.name {
            stop.name = name;
        }
        if let Some(start_date) = self.start_date {
            stop.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            stop.end_date = end_date;
        }
        if let Some(lat) = self.lat {
            stop.lat = lat;
        }
        if let Some(lng) = self.lng {
            stop.lng = lng;
        }
        if let Some(stop_type) = self.stop_type {
            stop.stop_type = stop_type;
        }
        if let Some(order) = self.order {
            stop.order = order;
        }
        if let Some(selected) = self.selected_accommodation_id {
            stop.selected_accommodation_id = selected;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopOrder {
    pub id: Uuid,
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStopUpdate {
    pub id: Uuid,
    pub order: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}
