use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airline {
    pub code: String,
    pub name: String,
}

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct CarType {
    pub id: String,
    pub name: String,
}

#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoomType {
    pub id: String,
    pub name: String,
}

const DEFAULT_LIMIT: usize = 50;

/// `?search=&limit=` as sent by the pickers. `limit` arrives as text and
/// falls back to 50 when missing or not a positive number.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub limit: Option<String>,
}

impl CatalogQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|limit| limit.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_LIMIT, |limit| limit as usize)
    }

    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|search| search.trim().to_lowercase())
            .filter(|search| !search.is_empty())
    }

    /// Case-insensitive match against any of `fields`.
    pub fn matches(&self, fields: &[&str]) -> bool {
        match self.needle() {
            Some(needle) => fields.iter().any(|field| field.to_lowercase().contains(&needle)),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(search: Option<&str>, limit: Option<&str>) -> CatalogQuery {
        CatalogQuery {
            search: search.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn limit_falls_back_to_default() {
        assert_eq!(query(None, None).limit(), 50);
        assert_eq!(query(None, Some("0")).limit(), 50);
        assert_eq!(query(None, Some("-3")).limit(), 50);
        assert_eq!(query(None, Some("ten")).limit(), 50);
        assert_eq!(query(None, Some("10")).limit(), 10);
    }

    #[test]
    fn search_is_case_insensitive() {
        let search = query(Some(" luft "), None);
        assert!(search.matches(&["LH", "Lufthansa"]));
        assert!(!search.matches(&["BA", "British Airways"]));
        assert!(query(Some(""), None).matches(&["anything"]));
    }
}
