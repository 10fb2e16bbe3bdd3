use std::sync::Arc;

use crate::geocoding::Geocoder;
use crate::llm_client::Completion;
use crate::search::orchestrator::SearchLoop;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every search owns its own round state.
#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<dyn Completion>,
    pub geocoder: Arc<dyn Geocoder>,
    /// Round budget for the search endpoints.
    pub search: SearchLoop,
}
