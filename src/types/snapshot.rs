use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{serialize_json_text, to_json_text};
use crate::error::Error;

/// A saved combination of selections, kept for side-by-side comparison.
#[derive(Debug, sqlx::FromRow, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSnapshot {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: String,
    pub flight_id: Option<Uuid>,
    pub car_rental_id: Option<Uuid>,
    #[serde(serialize_with = "serialize_json_text")]
    pub stop_selections: Option<String>,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: f64,
    pub reasoning: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub name: Option<String>,
    pub flight_id: Option<Uuid>,
    pub car_rental_id: Option<Uuid>,
    #[serde(default)]
    pub stop_selections: Value,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: Option<f64>,
    pub reasoning: Option<String>,
}

impl SnapshotPayload {
    pub fn into_snapshot(self, trip_id: Uuid) -> Result<ComparisonSnapshot, Error> {
        let name = super::non_blank(self.name)
            .ok_or_else(|| Error::BadRequest("Name is required.".to_string()))?;
        let selections = to_json_text(&self.stop_selections).unwrap_or_else(|| "{}".to_string());

        Ok(ComparisonSnapshot {
            id: Uuid::new_v4(),
            trip_id,
            name,
            flight_id: self.flight_id,
            car_rental_id: self.car_rental_id,
            stop_selections: Some(selections),
            total_cost_eur: self.total_cost_eur.unwrap_or(0.0),
            reasoning: self.reasoning,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selections_are_stored_as_text_and_served_as_json() {
        let payload: SnapshotPayload = serde_json::from_str(
            r#"{"name":"Budget","stopSelections":{"stop-1":"acc-9"},"totalCostEUR":1830.5}"#,
        )
        .unwrap();
        let snapshot = payload.into_snapshot(Uuid::new_v4()).unwrap();

        assert_eq!(snapshot.stop_selections.as_deref(), Some(r#"{"stop-1":"acc-9"}"#));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["stopSelections"]["stop-1"], "acc-9");
        assert_eq!(json["totalCostEUR"], 1830.5);
    }

    #[test]
    fn missing_selections_become_empty_object() {
        let payload: SnapshotPayload = serde_json::from_str(r#"{"name":"Empty"}"#).unwrap();
        let snapshot = payload.into_snapshot(Uuid::new_v4()).unwrap();
        assert_eq!(snapshot.stop_selections.as_deref(), Some("{}"));
    }
}
