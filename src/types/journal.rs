use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub date: DateTime<Utc>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalPhoto {
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryView {
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub photos: Vec<JournalPhoto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoPayload {
    pub url: String,
    pub caption: Option<String>,
}

/// Create and update body. An update replaces the photo list.
#[derive(Debug, Deserialize)]
pub struct JournalPayload {
    pub date: Option<DateTime<Utc>>,
    pub content: Option<String>,
    #[serde(default)]
    pub photos: Vec<PhotoPayload>,
}

impl JournalPayload {
    pub fn required(&self) -> Result<(DateTime<Utc>, &str), Error> {
        let date = self
            .date
            .ok_or_else(|| Error::BadRequest("Date is required.".to_string()))?;
        let content = self
            .content
            .as_deref()
            .ok_or_else(|| Error::BadRequest("Content is required.".to_string()))?;
        Ok((date, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photos_default_to_empty() {
        let payload: JournalPayload =
            serde_json::from_str(r#"{"date":"2025-03-04T00:00:00Z","content":"Sloths!"}"#).unwrap();
        let (_, content) = payload.required().unwrap();

        assert_eq!(content, "Sloths!");
        assert!(payload.photos.is_empty());
    }

    #[test]
    fn date_is_required() {
        let payload: JournalPayload = serde_json::from_str(r#"{"content":"Rain"}"#).unwrap();
        assert_eq!(payload.required().unwrap_err().to_string(), "Date is required.");
    }
}
