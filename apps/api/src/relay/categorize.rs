//! Answer categorization: maps a survey question and its answers onto 1 to 3 of the
//! caller's allowed categories.

use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::bullet_list;
use crate::relay::prompts::{CATEGORIZE_PROMPT_TEMPLATE, CATEGORIZE_SYSTEM};
use crate::relay::{require_text, PromptRelay};

const MAX_CATEGORIES: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct CategorizeRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizeResponse {
    pub categories: Vec<String>,
}

pub struct Categorize;

impl PromptRelay for Categorize {
    type Request = CategorizeRequest;
    type Reply = Vec<String>;
    type Output = CategorizeResponse;

    const NAME: &'static str = "categorize";
    const SYSTEM: &'static str = CATEGORIZE_SYSTEM;

    fn check(request: &CategorizeRequest) -> Result<(), String> {
        require_text(&request.question, "question")?;
        if request.categories.iter().all(|c| c.trim().is_empty()) {
            return Err("categories cannot be empty".to_string());
        }
        Ok(())
    }

    fn prompt(request: &CategorizeRequest) -> String {
        CATEGORIZE_PROMPT_TEMPLATE
            .replace("{question}", request.question.trim())
            .replace("{answers}", &bullet_list(&request.answers))
            .replace("{categories}", &request.categories.join(", "))
    }

    /// Keeps only allowed categories (canonical spelling), de-duplicated, at most three.
    fn finish(
        request: CategorizeRequest,
        reply: Vec<String>,
    ) -> Result<CategorizeResponse, String> {
        let mut categories: Vec<String> = Vec::new();
        for proposed in &reply {
            let proposed = proposed.trim().to_lowercase();
            let Some(allowed) = request
                .categories
                .iter()
                .find(|c| c.trim().to_lowercase() == proposed)
            else {
                continue;
            };
            if !categories.contains(allowed) {
                categories.push(allowed.clone());
            }
            if categories.len() == MAX_CATEGORIES {
                break;
            }
        }

        if categories.is_empty() {
            return Err(format!("none of {reply:?} is an allowed category"));
        }
        Ok(CategorizeResponse { categories })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CategorizeRequest {
        CategorizeRequest {
            question: "Qu'est-ce qui vous a fait choisir notre magasin ?".into(),
            answers: vec!["Les prix bas".into(), "Le parking".into()],
            categories: vec!["Prix".into(), "Accessibilité".into(), "Service".into()],
        }
    }

    #[test]
    fn test_check_rejects_missing_question_or_categories() {
        let missing: CategorizeRequest = serde_json::from_str(r#"{"categories": ["A"]}"#).unwrap();
        assert!(Categorize::check(&missing).is_err());

        let mut no_categories = request();
        no_categories.categories.clear();
        assert!(Categorize::check(&no_categories).is_err());

        assert!(Categorize::check(&request()).is_ok());
    }

    #[test]
    fn test_answers_are_optional() {
        let req: CategorizeRequest =
            serde_json::from_str(r#"{"question": "Q?", "categories": ["A"]}"#).unwrap();
        assert!(req.answers.is_empty());
        assert!(Categorize::prompt(&req).contains("(none)"));
    }

    #[test]
    fn test_prompt_lists_answers_and_categories() {
        let prompt = Categorize::prompt(&request());
        assert!(prompt.contains("- Les prix bas"));
        assert!(prompt.contains("Prix, Accessibilité, Service"));
    }

    #[test]
    fn test_finish_drops_invented_categories_and_uses_canonical_spelling() {
        let reply = vec!["prix".into(), "Ambiance".into(), "ACCESSIBILITÉ".into()];
        let out = Categorize::finish(request(), reply).unwrap();
        assert_eq!(out.categories, vec!["Prix", "Accessibilité"]);
    }

    #[test]
    fn test_finish_caps_at_three_and_dedups() {
        let mut req = request();
        req.categories.push("Choix".into());
        let reply = vec![
            "Prix".into(),
            "Prix".into(),
            "Service".into(),
            "Choix".into(),
            "Accessibilité".into(),
        ];
        let out = Categorize::finish(req, reply).unwrap();
        assert_eq!(out.categories, vec!["Prix", "Service", "Choix"]);
    }

    #[test]
    fn test_finish_fails_when_nothing_allowed() {
        assert!(Categorize::finish(request(), vec!["Météo".into()]).is_err());
        assert!(Categorize::finish(request(), vec![]).is_err());
    }
}
