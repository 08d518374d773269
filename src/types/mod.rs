mod accommodation;
mod car_rental;
mod catalog;
mod currency;
mod flight;
mod journal;
mod snapshot;
mod trip;
mod trip_option;
mod trip_stop;

pub use accommodation::{Accommodation, AccommodationImage, AccommodationPayload, AccommodationUpdate, AccommodationView};
pub use car_rental::{CarRental, CarRentalPayload, CarRentalView};
pub use catalog::{Airline, CarType, CatalogQuery, RoomType};
pub use currency::{Currency, CurrencyPayload, CurrencyUpdate};
pub use flight::{CreateFlight, Flight, FlightUpdate, FlightView};
pub use journal::{JournalEntry, JournalEntryView, JournalPayload, JournalPhoto, PhotoPayload};
pub use snapshot::{ComparisonSnapshot, SnapshotPayload};
pub use trip::{CreateTrip, FinalCarRental, FinalFlight, Trip, TripDetail, TripUpdate, TripView};
pub use trip_option::{OptionAssignment, TripOption, TripOptionPayload};
pub use trip_stop::{BatchStopUpdate, StopOrder, StopPayload, StopType, StopUpdate, StopView, TripStop};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Deserializes a field that is present (even as `null`) into `Some(..)`.
/// Combined with `#[serde(default)]` on an `Option<Option<T>>`, this tells
/// an omitted field apart from an explicit `null`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Serializes a column holding JSON text as the JSON it contains. Missing or
/// unparseable text becomes `null`.
pub fn serialize_json_text<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    parse_json_text(value.as_deref()).serialize(serializer)
}

pub fn parse_json_text(text: Option<&str>) -> Option<Value> {
    text.and_then(|text| serde_json::from_str::<Value>(text).ok())
}

/// Stores a client-provided JSON value as text. A string is assumed to
/// already hold JSON and is kept as-is.
pub fn to_json_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Trims a string, mapping blank input to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        notes: Option<Option<String>>,
    }

    #[test]
    fn omitted_and_null_fields_differ() {
        let omitted: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"notes":null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"notes":"aisle seat"}"#).unwrap();

        assert_eq!(omitted.notes, None);
        assert_eq!(cleared.notes, Some(None));
        assert_eq!(set.notes, Some(Some("aisle seat".to_string())));
    }

    #[test]
    fn json_text_round_trips_structured_values() {
        let value = serde_json::json!({"checkedBaggage": 40});
        let text = to_json_text(&value).unwrap();
        assert_eq!(parse_json_text(Some(&text)), Some(value));
    }

    #[test]
    fn json_text_keeps_strings_and_drops_garbage() {
        assert_eq!(to_json_text(&Value::from("[\"LHR\"]")).as_deref(), Some("[\"LHR\"]"));
        assert_eq!(to_json_text(&Value::Null), None);
        assert_eq!(parse_json_text(Some("not json")), None);
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  Hertz ".to_string())).as_deref(), Some("Hertz"));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}
