use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deserialize_some;

/// Named bucket used to group competing flights and car rentals.
#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripOption {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TripOptionPayload {
    pub name: Option<String>,
}

impl TripOptionPayload {
    /// The given name, or "Option N" where N follows the existing count.
    pub fn name_or_default(self, existing: i64) -> String {
        super::non_blank(self.name).unwrap_or_else(|| format!("Option {}", existing + 1))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionAssignment {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub trip_option_id: Option<Option<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_options_are_numbered() {
        assert_eq!(TripOptionPayload::default().name_or_default(2), "Option 3");
        let named = TripOptionPayload {
            name: Some(" Cheap ".to_string()),
        };
        assert_eq!(named.name_or_default(2), "Cheap");
    }
}
