//! Prompt relay: one handler shape for every "validate body → prompt → completion →
//! parse → post-filter → respond" endpoint. Each endpoint is a `PromptRelay` impl.

pub mod categorize;
pub mod classify;
pub mod decline;
pub mod prompts;
pub mod questions;
pub mod report;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::call_json;
use crate::llm_client::prompts::json_system;
use crate::state::AppState;

/// Configuration of one relay endpoint: its body, the JSON the model must return,
/// and what the caller receives.
pub trait PromptRelay: Send + Sync + 'static {
    type Request: DeserializeOwned + Send + 'static;
    type Reply: DeserializeOwned + Send;
    type Output: Serialize + Send + 'static;

    const NAME: &'static str;
    const SYSTEM: &'static str;

    /// Input validation. `Err` becomes a 400.
    fn check(request: &Self::Request) -> Result<(), String>;

    fn prompt(request: &Self::Request) -> String;

    /// Post-filters the model reply. `Err` means the reply was unusable (500).
    fn finish(request: Self::Request, reply: Self::Reply) -> Result<Self::Output, String>;
}

/// Generic axum handler for any `PromptRelay`.
pub async fn relay<R: PromptRelay>(
    State(state): State<AppState>,
    payload: Result<Json<R::Request>, JsonRejection>,
) -> Result<Json<R::Output>, AppError> {
    let Json(request) = payload?;
    R::check(&request).map_err(AppError::Validation)?;

    let prompt = R::prompt(&request);
    let system = json_system(R::SYSTEM);
    let reply: R::Reply = call_json(state.completion.as_ref(), &prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("{} failed: {e}", R::NAME)))?;

    let output = R::finish(request, reply)
        .map_err(|e| AppError::Llm(format!("{} returned an unusable reply: {e}", R::NAME)))?;

    info!("{} relay succeeded", R::NAME);
    Ok(Json(output))
}

/// Survey question shapes shared by the classification and generation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Scale,
    OpenEnded,
    YesNo,
    Ranking,
}

pub(crate) fn require_text(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    Ok(())
}
