//! Question generation: drafts survey questions for a topic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::relay::prompts::{QUESTIONS_PROMPT_TEMPLATE, QUESTIONS_SYSTEM};
use crate::relay::{require_text, PromptRelay, QuestionType};
use crate::search::models::title_key;

const DEFAULT_COUNT: usize = 5;
const MAX_COUNT: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateQuestionsRequest {
    #[serde(default)]
    pub topic: String,
    pub count: Option<usize>,
    pub audience: Option<String>,
}

impl GenerateQuestionsRequest {
    fn count(&self) -> usize {
        self.count.unwrap_or(DEFAULT_COUNT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestions {
    pub questions: Vec<GeneratedQuestion>,
}

pub struct GenerateQuestions;

impl PromptRelay for GenerateQuestions {
    type Request = GenerateQuestionsRequest;
    type Reply = GeneratedQuestions;
    type Output = GeneratedQuestions;

    const NAME: &'static str = "generate_questions";
    const SYSTEM: &'static str = QUESTIONS_SYSTEM;

    fn check(request: &GenerateQuestionsRequest) -> Result<(), String> {
        require_text(&request.topic, "topic")?;
        let count = request.count();
        if !(1..=MAX_COUNT).contains(&count) {
            return Err(format!("count must be between 1 and {MAX_COUNT}"));
        }
        Ok(())
    }

    fn prompt(request: &GenerateQuestionsRequest) -> String {
        let audience = request
            .audience
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or("general public");

        QUESTIONS_PROMPT_TEMPLATE
            .replace("{topic}", request.topic.trim())
            .replace("{count}", &request.count().to_string())
            .replace("{audience}", audience)
    }

    /// Drops blank and duplicate questions, then truncates to the requested count.
    fn finish(
        request: GenerateQuestionsRequest,
        reply: GeneratedQuestions,
    ) -> Result<GeneratedQuestions, String> {
        let mut seen = HashSet::new();
        let questions: Vec<GeneratedQuestion> = reply
            .questions
            .into_iter()
            .filter_map(|mut q| {
                q.text = q.text.trim().to_string();
                q.answers.retain(|a| !a.trim().is_empty());
                (!q.text.is_empty() && seen.insert(title_key(&q.text))).then_some(q)
            })
            .take(request.count())
            .collect();

        if questions.is_empty() {
            return Err("no usable questions".to_string());
        }
        Ok(GeneratedQuestions { questions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(count: Option<usize>) -> GenerateQuestionsRequest {
        GenerateQuestionsRequest {
            topic: "Satisfaction des usagers de la médiathèque".into(),
            count,
            audience: None,
        }
    }

    fn question(text: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            text: text.into(),
            question_type: QuestionType::OpenEnded,
            answers: vec![],
        }
    }

    #[test]
    fn test_check_bounds_count() {
        assert!(GenerateQuestions::check(&request(None)).is_ok());
        assert!(GenerateQuestions::check(&request(Some(0))).is_err());
        assert!(GenerateQuestions::check(&request(Some(21))).is_err());
    }

    #[test]
    fn test_prompt_defaults_audience() {
        let prompt = GenerateQuestions::prompt(&request(Some(3)));
        assert!(prompt.contains("Write 3 survey questions"));
        assert!(prompt.contains("general public"));
    }

    #[test]
    fn test_finish_dedups_drops_blank_and_truncates() {
        let reply = GeneratedQuestions {
            questions: vec![
                question("Quels services utilisez-vous ?"),
                question("   "),
                question("quels services  utilisez-vous ?"),
                question("À quelle fréquence venez-vous ?"),
                question("Que faudrait-il améliorer ?"),
            ],
        };
        let out = GenerateQuestions::finish(request(Some(2)), reply).unwrap();
        let texts: Vec<_> = out.questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Quels services utilisez-vous ?", "À quelle fréquence venez-vous ?"]
        );
    }

    #[test]
    fn test_finish_fails_on_empty_reply() {
        let reply = GeneratedQuestions { questions: vec![] };
        assert!(GenerateQuestions::finish(request(None), reply).is_err());
    }
}
