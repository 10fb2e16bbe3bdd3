//! Question classification: which survey format a question is written for.

use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::bullet_list;
use crate::relay::prompts::{CLASSIFY_PROMPT_TEMPLATE, CLASSIFY_SYSTEM};
use crate::relay::{require_text, PromptRelay, QuestionType};

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub question_type: QuestionType,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub rationale: String,
}

pub struct ClassifyQuestion;

impl PromptRelay for ClassifyQuestion {
    type Request = ClassifyRequest;
    type Reply = Classification;
    type Output = Classification;

    const NAME: &'static str = "classify_question";
    const SYSTEM: &'static str = CLASSIFY_SYSTEM;

    fn check(request: &ClassifyRequest) -> Result<(), String> {
        require_text(&request.question, "question")
    }

    fn prompt(request: &ClassifyRequest) -> String {
        CLASSIFY_PROMPT_TEMPLATE
            .replace("{question}", request.question.trim())
            .replace("{answers}", &bullet_list(&request.answers))
    }

    fn finish(
        _request: ClassifyRequest,
        mut reply: Classification,
    ) -> Result<Classification, String> {
        reply.confidence = if reply.confidence.is_finite() {
            reply.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        reply.rationale = reply.rationale.trim().to_string();
        Ok(reply)
    }
}
