//! Axum route handlers for the search API.
//!
//! These endpoints never fail at the HTTP level: bad input, generation failures and
//! exhaustion all answer `200` with a (possibly empty) JSON array.

use std::sync::Arc;

use axum::{
    extract::{rejection::BytesRejection, State},
    Json,
};
use bytes::Bytes;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::search::models::{ConceptResult, PlaceResult, SearchRequest};
use crate::search::requester::{SearchProfile, CONCEPTS, PLACES};
use crate::search::validator::{CandidateValidator, ConceptValidator, PlaceValidator};
use crate::state::AppState;

/// POST /api/v1/search/places
///
/// Real places matching a free-text request, each confirmed by the geocoder.
pub async fn handle_place_search(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<Vec<PlaceResult>> {
    let Some(body) = readable_body(&PLACES, body) else {
        return Json(Vec::new());
    };
    let validator = Arc::new(PlaceValidator::new(Arc::clone(&state.geocoder)));
    Json(run_search(&state, &PLACES, validator, &body).await)
}

/// POST /api/v1/search/concepts
///
/// Ideas, works and references related to a theme.
pub async fn handle_concept_search(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<Vec<ConceptResult>> {
    let Some(body) = readable_body(&CONCEPTS, body) else {
        return Json(Vec::new());
    };
    Json(run_search(&state, &CONCEPTS, Arc::new(ConceptValidator), &body).await)
}

/// An unreadable body (too large, aborted upload) is treated like invalid input.
fn readable_body(
    profile: &SearchProfile,
    body: Result<Bytes, BytesRejection>,
) -> Option<Bytes> {
    match body {
        Ok(body) => Some(body),
        Err(rejection) => {
            warn!(
                profile = profile.name,
                "unreadable search body: {}",
                rejection.body_text()
            );
            None
        }
    }
}

async fn run_search<V: CandidateValidator>(
    state: &AppState,
    profile: &SearchProfile,
    validator: Arc<V>,
    body: &[u8],
) -> Vec<V::Output> {
    let request = match SearchRequest::from_body(body) {
        Ok(request) => request,
        Err(e) => {
            warn!(profile = profile.name, "rejecting search request: {e}");
            return Vec::new();
        }
    };

    let span = info_span!("search", request_id = %Uuid::new_v4(), profile = profile.name);
    async {
        let outcome = state
            .search
            .run(state.completion.as_ref(), profile, &validator, &request)
            .await;
        info!(
            rounds = outcome.rounds,
            returned = outcome.results.len(),
            limit = request.limit,
            "search finished"
        );
        outcome.results
    }
    .instrument(span)
    .await
}
