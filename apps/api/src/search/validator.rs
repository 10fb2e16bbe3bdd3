//! Result Validator: decides accept/reject for every raw candidate in a round.
//!
//! Every field coming back from the model is untrusted. Structural checks run for all
//! candidates; place candidates are additionally confirmed against the geocoder.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::geocoding::Geocoder;
use crate::search::models::{Candidate, ConceptResult, PlaceResult, SearchItem};

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;
const SOURCE_KEYS: &[&str] = &["source", "url", "source_url"];

#[derive(Debug, Error, PartialEq)]
pub enum Rejection {
    #[error("missing or empty field '{0}'")]
    Missing(&'static str),

    #[error("field '{0}' is not a finite coordinate in range")]
    BadCoordinate(&'static str),

    #[error("geocoder could not resolve '{0}'")]
    NotFound(String),

    #[error("geocoder placed it in '{resolved}', not '{claimed}'")]
    WrongLocality { claimed: String, resolved: String },

    #[error("geocoder lookup failed: {0}")]
    Lookup(String),
}

#[async_trait]
pub trait CandidateValidator: Send + Sync + 'static {
    type Output: SearchItem;

    async fn validate(&self, candidate: Candidate) -> Result<Self::Output, Rejection>;
}

// ────────────────────────────────────────────────────────────────────────────
// Field checks
// ────────────────────────────────────────────────────────────────────────────

fn required_str(candidate: &Candidate, key: &'static str) -> Result<String, Rejection> {
    candidate
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or(Rejection::Missing(key))
}

/// Absent or null → `None`. Numbers and numeric strings are coerced to `f64`.
fn optional_coordinate(
    candidate: &Candidate,
    key: &'static str,
    bound: f64,
) -> Result<Option<f64>, Rejection> {
    let value = match candidate.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(v) if v.is_finite() && v.abs() <= bound => Ok(Some(v)),
        _ => Err(Rejection::BadCoordinate(key)),
    }
}

/// First source-like field that is an absolute http(s) URL. Invalid ones are dropped.
fn optional_source(candidate: &Candidate) -> Option<String> {
    SOURCE_KEYS
        .iter()
        .filter_map(|key| candidate.get(*key).and_then(Value::as_str))
        .find_map(|raw| {
            let url = Url::parse(raw.trim()).ok()?;
            let web = matches!(url.scheme(), "http" | "https") && url.host_str().is_some();
            web.then(|| url.to_string())
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Validators
// ────────────────────────────────────────────────────────────────────────────

/// Structural validation only.
pub struct ConceptValidator;

#[async_trait]
impl CandidateValidator for ConceptValidator {
    type Output = ConceptResult;

    async fn validate(&self, candidate: Candidate) -> Result<ConceptResult, Rejection> {
        Ok(ConceptResult {
            title: required_str(&candidate, "title")?,
            description: required_str(&candidate, "description")?,
            reason: required_str(&candidate, "reason")?,
            source: optional_source(&candidate),
        })
    }
}

/// Structural validation plus geocoder confirmation of the claimed city.
pub struct PlaceValidator {
    geocoder: Arc<dyn Geocoder>,
}

impl PlaceValidator {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }
}

#[async_trait]
impl CandidateValidator for PlaceValidator {
    type Output = PlaceResult;

    async fn validate(&self, candidate: Candidate) -> Result<PlaceResult, Rejection> {
        let name = required_str(&candidate, "name")?;
        let description = required_str(&candidate, "description")?;
        let reason = required_str(&candidate, "reason")?;
        let address = required_str(&candidate, "address")?;
        let city = required_str(&candidate, "city")?;
        optional_coordinate(&candidate, "latitude", MAX_LATITUDE)?;
        optional_coordinate(&candidate, "longitude", MAX_LONGITUDE)?;

        let query = format!("{address}, {city}");
        let place = self
            .geocoder
            .geocode(&query)
            .await
            .map_err(|e| Rejection::Lookup(e.to_string()))?
            .ok_or_else(|| Rejection::NotFound(query.clone()))?;

        if !place.locality.to_lowercase().contains(&city.to_lowercase()) {
            return Err(Rejection::WrongLocality {
                claimed: city,
                resolved: place.locality,
            });
        }

        Ok(PlaceResult {
            name,
            description,
            reason,
            address,
            city,
            latitude: place.latitude,
            longitude: place.longitude,
            source: optional_source(&candidate),
        })
    }
}

/// Validates one round's candidates concurrently and waits for all of them.
/// Accepted results keep the order in which the model proposed them.
pub async fn validate_round<V: CandidateValidator>(
    validator: &Arc<V>,
    candidates: Vec<Candidate>,
) -> Vec<V::Output> {
    let mut tasks = JoinSet::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        let validator = Arc::clone(validator);
        tasks.spawn(async move { (index, validator.validate(candidate).await) });
    }

    let mut accepted = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(item))) => accepted.push((index, item)),
            Ok((index, Err(rejection))) => {
                debug!(candidate = index, %rejection, "candidate rejected");
            }
            Err(e) => warn!("candidate validation task failed: {e}"),
        }
    }

    accepted.sort_by_key(|(index, _)| *index);
    accepted.into_iter().map(|(_, item)| item).collect()
}
