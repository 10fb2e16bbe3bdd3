use serde::Serialize;
use serde_json::{Map, Value};

use crate::search::SearchError;

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 25;

/// An unvalidated record proposed by the model in one round.
pub type Candidate = Map<String, Value>;

/// Inbound search body: `{ "query": string, "limit"?: integer }`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
}

impl SearchRequest {
    /// Parses a raw request body. Anything that is not an object with a non-blank string
    /// `query` is `InvalidInput`; an unusable `limit` falls back to the default.
    pub fn from_body(body: &[u8]) -> Result<Self, SearchError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SearchError::InvalidInput(format!("body is not JSON: {e}")))?;

        let query = value
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| SearchError::InvalidInput("query must be a non-empty string".into()))?;

        let limit = value
            .get("limit")
            .and_then(Value::as_u64)
            .map(|l| (l as usize).min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);

        Ok(SearchRequest {
            query: query.to_string(),
            limit,
        })
    }
}

/// Anything the search loop can accumulate. The title is the de-duplication key.
pub trait SearchItem: Serialize + Send + 'static {
    fn title(&self) -> &str;
}

/// Case- and whitespace-insensitive form of a title, used for duplicate suppression.
pub fn title_key(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A place confirmed by the geocoder. Coordinates are the geocoder's, not the model's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceResult {
    pub name: String,
    pub description: String,
    pub reason: String,
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SearchItem for PlaceResult {
    fn title(&self) -> &str {
        &self.name
    }
}

/// A conceptual match (an idea, work, or reference rather than a location).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptResult {
    pub title: String,
    pub description: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SearchItem for ConceptResult {
    fn title(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_defaults_limit() {
        let req = SearchRequest::from_body(r#"{"query": "  cafés calmes  "}"#.as_bytes()).unwrap();
        assert_eq!(req.query, "cafés calmes");
        assert_eq!(req.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_from_body_caps_limit() {
        let req = SearchRequest::from_body(br#"{"query": "museums", "limit": 500}"#).unwrap();
        assert_eq!(req.limit, MAX_LIMIT);
    }

    #[test]
    fn test_from_body_accepts_zero_limit() {
        let req = SearchRequest::from_body(br#"{"query": "museums", "limit": 0}"#).unwrap();
        assert_eq!(req.limit, 0);
    }

    #[test]
    fn test_from_body_bad_limit_falls_back_to_default() {
        let negative = SearchRequest::from_body(br#"{"query": "x", "limit": -3}"#).unwrap();
        assert_eq!(negative.limit, DEFAULT_LIMIT);
        let text = SearchRequest::from_body(br#"{"query": "x", "limit": "ten"}"#).unwrap();
        assert_eq!(text.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_from_body_rejects_non_string_query() {
        assert!(matches!(
            SearchRequest::from_body(br#"{"query": 42}"#),
            Err(SearchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_body_rejects_blank_query_and_garbage() {
        assert!(SearchRequest::from_body(br#"{"query": "   "}"#).is_err());
        assert!(SearchRequest::from_body(b"not json").is_err());
        assert!(SearchRequest::from_body(b"[]").is_err());
    }

    #[test]
    fn test_title_key_normalizes_case_and_spacing() {
        assert_eq!(title_key("  Le  Louvre "), title_key("le louvre"));
        assert_ne!(title_key("Louvre"), title_key("Orsay"));
    }

    #[test]
    fn test_place_result_omits_missing_source() {
        let place = PlaceResult {
            name: "Musée d'Orsay".into(),
            description: "Impressionist collection in a former station".into(),
            reason: "Matches 'art in old buildings'".into(),
            address: "1 Rue de la Légion d'Honneur".into(),
            city: "Paris".into(),
            latitude: 48.86,
            longitude: 2.3266,
            source: None,
        };
        let json = serde_json::to_value(&place).unwrap();
        assert!(json.get("source").is_none());
        assert_eq!(json["city"], "Paris");
    }
}
