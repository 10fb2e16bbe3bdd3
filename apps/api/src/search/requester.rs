//! Batch Requester: one completion call per round, asking for at most `count` new
//! candidates and telling the model which titles are already taken.

use serde_json::Value;
use tracing::debug;

use crate::llm_client::prompts::{bullet_list, json_system};
use crate::llm_client::{call_json, Completion};
use crate::search::models::Candidate;
use crate::search::prompts::{
    CONCEPT_SEARCH_PROMPT_TEMPLATE, CONCEPT_SEARCH_SYSTEM, PLACE_SEARCH_PROMPT_TEMPLATE,
    PLACE_SEARCH_SYSTEM,
};
use crate::search::SearchError;

/// Prompt configuration for one search flavour.
#[derive(Debug, Clone, Copy)]
pub struct SearchProfile {
    pub name: &'static str,
    pub system: &'static str,
    pub template: &'static str,
}

pub const PLACES: SearchProfile = SearchProfile {
    name: "places",
    system: PLACE_SEARCH_SYSTEM,
    template: PLACE_SEARCH_PROMPT_TEMPLATE,
};

pub const CONCEPTS: SearchProfile = SearchProfile {
    name: "concepts",
    system: CONCEPT_SEARCH_SYSTEM,
    template: CONCEPT_SEARCH_PROMPT_TEMPLATE,
};

impl SearchProfile {
    pub fn build_prompt(&self, topic: &str, count: usize, seen_titles: &[String]) -> String {
        self.template
            .replace("{topic}", topic)
            .replace("{count}", &count.to_string())
            .replace("{exclusions}", &bullet_list(seen_titles))
    }
}

/// Issues exactly one completion call and returns the raw candidates it proposed.
///
/// Non-object entries are dropped here; everything else is left to the validator.
pub async fn request_batch(
    completion: &dyn Completion,
    profile: &SearchProfile,
    topic: &str,
    count: usize,
    seen_titles: &[String],
) -> Result<Vec<Candidate>, SearchError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(SearchError::InvalidInput("topic cannot be empty".into()));
    }

    let prompt = profile.build_prompt(topic, count, seen_titles);
    let system = json_system(profile.system);
    let reply: Value = call_json(completion, &prompt, &system).await?;
    let candidates = extract_candidates(reply)?;

    debug!(
        profile = profile.name,
        requested = count,
        received = candidates.len(),
        "batch received"
    );
    Ok(candidates)
}

/// Accepts a bare array or an object wrapping one under `results`.
fn extract_candidates(reply: Value) -> Result<Vec<Candidate>, SearchError> {
    let items = match reply {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SearchError::Malformed(
                    "object reply without a results array".into(),
                ))
            }
        },
        other => {
            return Err(SearchError::Malformed(format!(
                "expected a JSON array, got {other}"
            )))
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(obj),
            _ => None,
        })
        .collect())
}
