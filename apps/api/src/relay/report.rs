//! Survey report: executive summary, findings and recommendations from tallied answers.
//! Percentages are computed here so the model only has to interpret them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::relay::prompts::{REPORT_PROMPT_TEMPLATE, REPORT_SYSTEM};
use crate::relay::PromptRelay;

const MAX_ITEMS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionResults {
    pub question: String,
    #[serde(default)]
    pub answers: Vec<AnswerCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurveyReportRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub responses: Vec<QuestionResults>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportReply {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyReport {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub struct GenerateReport;

/// Renders each question with `label: count (pct%)` lines.
fn render_results(responses: &[QuestionResults]) -> String {
    responses
        .iter()
        .map(|q| {
            let total = q
                .answers
                .iter()
                .fold(0u64, |acc, a| acc.saturating_add(a.count));
            let lines = q
                .answers
                .iter()
                .map(|a| {
                    let pct = if total == 0 {
                        0.0
                    } else {
                        a.count as f64 * 100.0 / total as f64
                    };
                    format!("  - {}: {} ({:.1}%)", a.label.trim(), a.count, pct)
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("Q: {} ({} answers)\n{}", q.question.trim(), total, lines)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_ITEMS)
        .collect()
}

impl PromptRelay for GenerateReport {
    type Request = SurveyReportRequest;
    type Reply = ReportReply;
    type Output = SurveyReport;

    const NAME: &'static str = "survey_report";
    const SYSTEM: &'static str = REPORT_SYSTEM;

    fn check(request: &SurveyReportRequest) -> Result<(), String> {
        if request.responses.is_empty() {
            return Err("responses cannot be empty".to_string());
        }
        if request.responses.iter().any(|q| q.question.trim().is_empty()) {
            return Err("every response needs a question".to_string());
        }
        Ok(())
    }

    fn prompt(request: &SurveyReportRequest) -> String {
        let title = match request.title.trim() {
            "" => "Untitled survey",
            t => t,
        };
        REPORT_PROMPT_TEMPLATE
            .replace("{title}", title)
            .replace("{results}", &render_results(&request.responses))
    }

    fn finish(_request: SurveyReportRequest, reply: ReportReply) -> Result<SurveyReport, String> {
        let summary = reply.summary.trim().to_string();
        if summary.is_empty() {
            return Err("empty summary".to_string());
        }
        Ok(SurveyReport {
            summary,
            key_findings: clean_list(reply.key_findings),
            recommendations: clean_list(reply.recommendations),
            generated_at: Utc::now(),
        })
    }
}
