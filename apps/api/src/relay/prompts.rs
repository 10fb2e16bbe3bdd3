// All LLM prompt constants for the relay endpoints.
// Templates use `{placeholder}` markers replaced before sending.

/// System prompt for answer categorization.
pub const CATEGORIZE_SYSTEM: &str = "You are a classification system for survey data. \
    Your reply is a JSON array of category strings.";

/// Replace: {question}, {answers}, {categories}
pub const CATEGORIZE_PROMPT_TEMPLATE: &str = r#"Here is a survey question and its answer options.

Question:
"{question}"

Answer options:
{answers}

Allowed categories:
{categories}

RULES:
- Choose between 1 and 3 categories
- NEVER create a new category; use the allowed spelling exactly
- Answer with a JSON array only, e.g. ["Category1","Category2"]"#;

/// System prompt for question classification.
pub const CLASSIFY_SYSTEM: &str = "You are a survey methodologist. \
    Your reply is a single JSON object.";

/// Replace: {question}, {answers}
pub const CLASSIFY_PROMPT_TEMPLATE: &str = r#"Classify the format of this survey question.

Question:
"{question}"

Answer options (may be empty for open questions):
{answers}

Return a JSON object:
{
  "question_type": "single_choice | multiple_choice | scale | open_ended | yes_no | ranking",
  "confidence": 0.9,
  "rationale": "One sentence"
}"#;

/// System prompt for question generation.
pub const QUESTIONS_SYSTEM: &str = "You are an expert survey designer writing clear, \
    neutral, non-leading questions. \
    Your reply is a single JSON object.";

/// Replace: {topic}, {count}, {audience}
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"Write {count} survey questions about:
"{topic}"

Target audience: {audience}

Return a JSON object:
{
  "questions": [
    {
      "text": "How satisfied are you with ...?",
      "question_type": "single_choice | multiple_choice | scale | open_ended | yes_no | ranking",
      "answers": ["Very satisfied", "Satisfied", "Neutral", "Dissatisfied"]
    }
  ]
}

RULES:
1. Every question must be distinct
2. "answers" is empty for open_ended questions
3. Write in the language of the topic"#;

/// System prompt for survey report generation.
pub const REPORT_SYSTEM: &str = "You are a senior research analyst writing survey reports \
    for decision makers. Base every statement on the figures given. \
    Your reply is a single JSON object.";

/// Replace: {title}, {results}
pub const REPORT_PROMPT_TEMPLATE: &str = r#"Write a report for the survey "{title}".

RESULTS (answer: count, share of respondents for that question):
{results}

Return a JSON object:
{
  "summary": "One paragraph executive summary",
  "key_findings": ["Finding backed by a figure from the results"],
  "recommendations": ["Concrete, actionable recommendation"]
}

RULES:
1. Quote the percentages given; never invent numbers
2. At most 5 key findings and 5 recommendations
3. Write in the language of the survey"#;

/// System prompt for decline analysis.
pub const DECLINE_SYSTEM: &str = "You are a business analyst explaining changes in metrics. \
    Your reply is a single JSON object.";

/// Replace: {metric}, {series}, {change}, {context}
pub const DECLINE_PROMPT_TEMPLATE: &str = r#"Analyse the evolution of the metric "{metric}".

Data points (period: value):
{series}

Overall change from first to last period: {change}%

Additional context: {context}

Return a JSON object:
{
  "likely_causes": ["Plausible cause"],
  "impact": "What this change means for the organisation",
  "actions": ["Recommended action"]
}"#;
