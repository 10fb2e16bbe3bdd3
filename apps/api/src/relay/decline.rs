//! Decline analysis: explains the movement of a metric over time. The size and
//! direction of the change are computed here; the model only supplies the narrative.

use serde::{Deserialize, Serialize};

use crate::relay::prompts::{DECLINE_PROMPT_TEMPLATE, DECLINE_SYSTEM};
use crate::relay::{require_text, PromptRelay};

/// Changes within ±2% count as stable.
const STABLE_BAND_PERCENT: f64 = 2.0;

#[derive(Debug, Clone, Deserialize)]
pub struct DataPoint {
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeclineRequest {
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub series: Vec<DataPoint>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Declining,
    Stable,
    Growing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeclineReply {
    #[serde(default)]
    pub likely_causes: Vec<String>,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeclineAnalysis {
    pub trend: Trend,
    /// Positive when the metric went down, negative when it went up.
    pub decline_percent: f64,
    pub likely_causes: Vec<String>,
    pub impact: String,
    pub actions: Vec<String>,
}

/// Percentage drop from the first to the last point, rounded to one decimal.
fn decline_percent(series: &[DataPoint]) -> f64 {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return 0.0;
    };
    let raw = (first.value - last.value) / first.value.abs() * 100.0;
    (raw * 10.0).round() / 10.0
}

fn trend(decline: f64) -> Trend {
    if decline > STABLE_BAND_PERCENT {
        Trend::Declining
    } else if decline < -STABLE_BAND_PERCENT {
        Trend::Growing
    } else {
        Trend::Stable
    }
}

pub struct AnalyzeDecline;

impl PromptRelay for AnalyzeDecline {
    type Request = DeclineRequest;
    type Reply = DeclineReply;
    type Output = DeclineAnalysis;

    const NAME: &'static str = "decline_analysis";
    const SYSTEM: &'static str = DECLINE_SYSTEM;

    fn check(request: &DeclineRequest) -> Result<(), String> {
        require_text(&request.metric, "metric")?;
        if request.series.len() < 2 {
            return Err("series needs at least two data points".to_string());
        }
        if request.series.iter().any(|p| !p.value.is_finite()) {
            return Err("series values must be finite numbers".to_string());
        }
        if request.series[0].value == 0.0 {
            return Err("first value cannot be zero".to_string());
        }
        Ok(())
    }

    fn prompt(request: &DeclineRequest) -> String {
        let series = request
            .series
            .iter()
            .map(|p| format!("- {}: {}", p.period.trim(), p.value))
            .collect::<Vec<_>>()
            .join("\n");
        let context = request
            .context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("(none)");

        DECLINE_PROMPT_TEMPLATE
            .replace("{metric}", request.metric.trim())
            .replace("{series}", &series)
            .replace("{change}", &format!("{:.1}", -decline_percent(&request.series)))
            .replace("{context}", context)
    }

    fn finish(request: DeclineRequest, reply: DeclineReply) -> Result<DeclineAnalysis, String> {
        let impact = reply.impact.trim().to_string();
        if impact.is_empty() && reply.likely_causes.is_empty() {
            return Err("reply has neither causes nor impact".to_string());
        }
        let decline = decline_percent(&request.series);
        Ok(DeclineAnalysis {
            trend: trend(decline),
            decline_percent: decline,
            likely_causes: reply.likely_causes,
            impact,
            actions: reply.actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint {
                period: format!("2026-Q{}", i + 1),
                value: *v,
            })
            .collect()
    }

    fn request(values: &[f64]) -> DeclineRequest {
        DeclineRequest {
            metric: "Taux de réponse".into(),
            series: series(values),
            context: None,
        }
    }

    #[test]
    fn test_decline_percent_first_to_last() {
        assert_eq!(decline_percent(&series(&[200.0, 180.0, 150.0])), 25.0);
        assert_eq!(decline_percent(&series(&[100.0, 110.0])), -10.0);
        assert_eq!(decline_percent(&series(&[3.0, 2.0])), 33.3);
    }

    #[test]
    fn test_trend_band() {
        assert_eq!(trend(25.0), Trend::Declining);
        assert_eq!(trend(1.5), Trend::Stable);
        assert_eq!(trend(-2.0), Trend::Stable);
        assert_eq!(trend(-10.0), Trend::Growing);
    }

    #[test]
    fn test_check_requires_two_points_and_nonzero_start() {
        assert!(AnalyzeDecline::check(&request(&[10.0])).is_err());
        assert!(AnalyzeDecline::check(&request(&[0.0, 5.0])).is_err());
        assert!(AnalyzeDecline::check(&request(&[10.0, 5.0])).is_ok());
    }

    #[test]
    fn test_prompt_reports_signed_change() {
        let prompt = AnalyzeDecline::prompt(&request(&[200.0, 150.0]));
        assert!(prompt.contains("-25.0%"));
        assert!(prompt.contains("- 2026-Q2: 150"));
    }

    #[test]
    fn test_finish_ignores_model_and_uses_computed_trend() {
        let reply = DeclineReply {
            likely_causes: vec!["Survey fatigue".into()],
            impact: "Smaller samples".into(),
            actions: vec!["Shorten the questionnaire".into()],
        };
        let out = AnalyzeDecline::finish(request(&[200.0, 150.0]), reply).unwrap();
        assert_eq!(out.trend, Trend::Declining);
        assert_eq!(out.decline_percent, 25.0);
    }

    #[test]
    fn test_finish_rejects_empty_reply() {
        let reply: DeclineReply = serde_json::from_str("{}").unwrap();
        assert!(AnalyzeDecline::finish(request(&[200.0, 150.0]), reply).is_err());
    }
}
