pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::relay::categorize::Categorize;
use crate::relay::classify::ClassifyQuestion;
use crate::relay::decline::AnalyzeDecline;
use crate::relay::questions::GenerateQuestions;
use crate::relay::relay;
use crate::relay::report::GenerateReport;
use crate::search::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Prompt relays
        .route("/categorize", post(relay::<Categorize>))
        .route(
            "/api/v1/questions/classify",
            post(relay::<ClassifyQuestion>),
        )
        .route(
            "/api/v1/questions/generate",
            post(relay::<GenerateQuestions>),
        )
        .route("/api/v1/reports/survey", post(relay::<GenerateReport>))
        .route("/api/v1/analysis/decline", post(relay::<AnalyzeDecline>))
        // Search
        .route(
            "/api/v1/search/places",
            post(handlers::handle_place_search),
        )
        .route(
            "/api/v1/search/concepts",
            post(handlers::handle_concept_search),
        )
        .with_state(state)
}
