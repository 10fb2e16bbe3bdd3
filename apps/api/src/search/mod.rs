// Validated, budget-bounded search: a batch requester asks the model for a few candidates
// per round, a validator filters them, and the orchestrator loops until the target count,
// the round ceiling, or a zero-progress round.

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod requester;
pub mod validator;

use thiserror::Error;

use crate::llm_client::LlmError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Generation returned no list: {0}")]
    Malformed(String),
}
