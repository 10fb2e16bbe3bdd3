//! Search loop: START → REQUESTING → VALIDATING → (CONTINUE | DONE).
//!
//! Rounds run strictly one after another: each prompt carries the titles accumulated so
//! far. The loop stops when the target is met, when `max_rounds` rounds have run, when a
//! round adds nothing new, or when a generation call fails. None of these is an error;
//! the caller gets whatever was accumulated.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::llm_client::Completion;
use crate::search::models::{title_key, SearchItem, SearchRequest};
use crate::search::requester::{request_batch, SearchProfile};
use crate::search::validator::{validate_round, CandidateValidator};

pub const DEFAULT_MAX_ROUNDS: u32 = 3;
pub const DEFAULT_BATCH_CEILING: usize = 5;

/// Budget for one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLoop {
    pub max_rounds: u32,
    pub batch_ceiling: usize,
}

impl Default for SearchLoop {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            batch_ceiling: DEFAULT_BATCH_CEILING,
        }
    }
}

#[derive(Debug)]
pub struct SearchOutcome<T> {
    pub results: Vec<T>,
    pub rounds: u32,
}

/// Per-request state. Owned exclusively by one `run` call.
struct RoundState<T> {
    rounds_attempted: u32,
    accumulated: Vec<T>,
    seen: HashSet<String>,
}

impl<T: SearchItem> RoundState<T> {
    fn new() -> Self {
        Self {
            rounds_attempted: 0,
            accumulated: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn seen_titles(&self) -> Vec<String> {
        self.accumulated
            .iter()
            .map(|item| item.title().to_string())
            .collect()
    }

    /// Appends unseen items until `target` is reached. Returns how many were added.
    fn merge(&mut self, items: Vec<T>, target: usize) -> usize {
        let before = self.accumulated.len();
        for item in items {
            if self.accumulated.len() >= target {
                break;
            }
            if self.seen.insert(title_key(item.title())) {
                self.accumulated.push(item);
            }
        }
        self.accumulated.len() - before
    }
}

impl SearchLoop {
    pub fn new(max_rounds: u32, batch_ceiling: usize) -> Self {
        Self {
            max_rounds,
            batch_ceiling: batch_ceiling.max(1),
        }
    }

    pub async fn run<V: CandidateValidator>(
        &self,
        completion: &dyn Completion,
        profile: &SearchProfile,
        validator: &Arc<V>,
        request: &SearchRequest,
    ) -> SearchOutcome<V::Output> {
        let target = request.limit;
        let mut state = RoundState::new();

        while state.accumulated.len() < target && state.rounds_attempted < self.max_rounds {
            let remaining = target - state.accumulated.len();
            let count = remaining.min(self.batch_ceiling);
            state.rounds_attempted += 1;

            let candidates = match request_batch(
                completion,
                profile,
                &request.query,
                count,
                &state.seen_titles(),
            )
            .await
            {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(
                        round = state.rounds_attempted,
                        profile = profile.name,
                        "search round ended early: {e}"
                    );
                    break;
                }
            };

            let proposed = candidates.len();
            let accepted = validate_round(validator, candidates).await;
            let added = state.merge(accepted, target);

            info!(
                round = state.rounds_attempted,
                profile = profile.name,
                requested = count,
                proposed,
                added,
                total = state.accumulated.len(),
                target,
                "search round complete"
            );

            if added == 0 {
                break;
            }
        }

        SearchOutcome {
            results: state.accumulated,
            rounds: state.rounds_attempted,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::geocoding::fake::FakeGeocoder;
    use crate::llm_client::fake::ScriptedCompletion;
    use crate::llm_client::LlmError;
    use crate::search::requester::{CONCEPTS, PLACES};
    use crate::search::validator::{ConceptValidator, PlaceValidator};

    fn concepts(titles: &[&str]) -> String {
        let items: Vec<_> = titles
            .iter()
            .map(|t| json!({"title": t, "description": "d", "reason": "r"}))
            .collect();
        serde_json::to_string(&items).unwrap()
    }

    fn request(limit: usize) -> SearchRequest {
        SearchRequest {
            query: "stoic philosophy".into(),
            limit,
        }
    }

    async fn run_concepts(
        search: SearchLoop,
        completion: &ScriptedCompletion,
        limit: usize,
    ) -> SearchOutcome<crate::search::models::ConceptResult> {
        search
            .run(completion, &CONCEPTS, &Arc::new(ConceptValidator), &request(limit))
            .await
    }

    #[tokio::test]
    async fn test_single_round_fills_target() {
        let completion = ScriptedCompletion::replying(&[&concepts(&["A", "B", "C", "D", "E"])]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 5).await;
        assert_eq!(outcome.results.len(), 5);
        assert_eq!(outcome.rounds, 1);
    }

    #[tokio::test]
    async fn test_rounds_equal_ceil_of_limit_over_ceiling_when_all_succeed() {
        let completion = ScriptedCompletion::replying(&[
            &concepts(&["A", "B", "C", "D", "E"]),
            &concepts(&["F", "G", "H", "I", "J"]),
            &concepts(&["K", "L"]),
        ]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 12).await;
        assert_eq!(outcome.results.len(), 12);
        assert_eq!(outcome.rounds, 3);
        assert!(completion.prompts.lock().unwrap()[2].contains("up to 2 distinct"));
    }

    #[tokio::test]
    async fn test_surplus_is_truncated_to_limit() {
        let completion = ScriptedCompletion::replying(&[&concepts(&["A", "B", "C", "D", "E"])]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 3).await;
        let titles: Vec<_> = outcome.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_duplicates_suppressed_across_and_within_rounds() {
        let completion = ScriptedCompletion::replying(&[
            &concepts(&["Seneca", "seneca ", "Epictetus"]),
            &concepts(&["SENECA", "Zeno"]),
        ]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 4).await;
        let titles: Vec<_> = outcome.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Seneca", "Epictetus", "Zeno"]);
        assert!(completion.prompts.lock().unwrap()[1].contains("- Epictetus"));
    }

    #[tokio::test]
    async fn test_first_round_failure_returns_empty() {
        let completion = ScriptedCompletion::new(vec![Err(LlmError::Api {
            status: 401,
            message: "bad key".into(),
        })]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 5).await;
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.rounds, 1);
    }

    #[tokio::test]
    async fn test_malformed_content_every_round_returns_empty() {
        let completion = ScriptedCompletion::replying(&["not json", "still not json", "nope"]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 5).await;
        assert!(outcome.results.is_empty());
        assert_eq!(completion.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_progress_round_stops_the_loop() {
        let completion = ScriptedCompletion::replying(&[
            &concepts(&["A", "B"]),
            r#"[{"title": "C"}]"#,
            &concepts(&["D"]),
        ]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 10).await;
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.rounds, 2);
        assert_eq!(completion.calls(), 2);
    }

    #[tokio::test]
    async fn test_round_count_never_exceeds_max_rounds() {
        let completion = ScriptedCompletion::replying(&[
            &concepts(&["A"]),
            &concepts(&["B"]),
            &concepts(&["C"]),
            &concepts(&["D"]),
        ]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 10).await;
        assert_eq!(outcome.rounds, 3);
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(completion.calls(), 3);
    }

    #[tokio::test]
    async fn test_zero_limit_makes_no_calls() {
        let completion = ScriptedCompletion::replying(&[&concepts(&["A"])]);
        let outcome = run_concepts(SearchLoop::default(), &completion, 0).await;
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.rounds, 0);
        assert_eq!(completion.calls(), 0);
    }

    #[tokio::test]
    async fn test_small_batch_ceiling_is_respected() {
        let completion = ScriptedCompletion::replying(&[
            &concepts(&["A", "B"]),
            &concepts(&["C", "D"]),
        ]);
        let outcome = run_concepts(SearchLoop::new(3, 2), &completion, 4).await;
        assert_eq!(outcome.results.len(), 4);
        assert_eq!(outcome.rounds, 2);
        assert!(completion.prompts.lock().unwrap()[0].contains("up to 2 distinct"));
    }

    fn place(name: &str, city: &str) -> serde_json::Value {
        json!({
            "name": name,
            "description": "d",
            "reason": "r",
            "address": format!("{name} street"),
            "city": city
        })
    }

    #[tokio::test]
    async fn test_place_search_ten_with_geocode_failures_runs_three_rounds() {
        let mut geocoder = FakeGeocoder::default();
        for name in ["P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8"] {
            geocoder = geocoder.with(&format!("{name} street, Lyon"), "Lyon", 45.76, 4.83);
        }
        let round1: Vec<_> = ["P1", "P2", "P3", "P4", "P5"]
            .iter()
            .map(|n| place(n, "Lyon"))
            .collect();
        let round2: Vec<_> = ["P6", "P7", "P8", "Ghost1", "Ghost2"]
            .iter()
            .map(|n| place(n, "Lyon"))
            .collect();
        let completion = ScriptedCompletion::replying(&[
            &serde_json::to_string(&round1).unwrap(),
            &serde_json::to_string(&round2).unwrap(),
            "[]",
        ]);

        let outcome = SearchLoop::default()
            .run(
                &completion,
                &PLACES,
                &Arc::new(PlaceValidator::new(Arc::new(geocoder))),
                &SearchRequest {
                    query: "bouchons lyonnais".into(),
                    limit: 10,
                },
            )
            .await;

        assert_eq!(outcome.results.len(), 8);
        assert_eq!(outcome.rounds, 3);
        assert!(completion.prompts.lock().unwrap()[2].contains("up to 2 real places"));
    }
}
