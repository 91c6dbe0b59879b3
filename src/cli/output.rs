//! Output formatting for CLI commands.
//!
//! Every command renders through one of three formats: human-readable
//! text, pretty JSON, or newline-delimited JSON for piping.

use std::fmt::Write;

use serde::Serialize;

use crate::agent::LedgerEntry;
use crate::core::{ActOutcome, CaseResult, IterationRecord};
use crate::error::CommandError;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// One compact JSON document per line.
    Ndjson,
}

impl OutputFormat {
    /// Parses a format string. Unknown values fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Serializes `value` according to the format.
    ///
    /// Text falls back to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::OutputFormat`] if serialization fails.
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> Result<String, CommandError> {
        let rendered = match self {
            Self::Ndjson => serde_json::to_string(value),
            Self::Text | Self::Json => serde_json::to_string_pretty(value),
        };
        rendered.map_err(|e| CommandError::OutputFormat(format!("JSON serialization failed: {e}")))
    }
}

/// Compact per-session line used in history summaries.
#[derive(Debug, Serialize)]
pub struct HistorySummary<'a> {
    /// 1-based position in the ledger.
    pub index: usize,
    /// Case query.
    pub query: &'a str,
    /// Case image, if any.
    pub image: Option<&'a str>,
    /// Terminal status.
    pub status: String,
    /// Final confidence.
    pub confidence: f64,
    /// Iterations used.
    pub iterations_used: usize,
    /// Whether a clarification was requested.
    pub clarification: bool,
}

impl<'a> HistorySummary<'a> {
    fn from_entry(index: usize, entry: &'a LedgerEntry) -> Self {
        Self {
            index: index + 1,
            query: &entry.input.query,
            image: entry.input.image(),
            status: entry.result.status.to_string(),
            confidence: entry.result.confidence,
            iterations_used: entry.iterations_used,
            clarification: entry.result.clarification.is_some(),
        }
    }
}

/// Summarizes ledger entries in append order.
#[must_use]
pub fn history_summaries(entries: &[LedgerEntry]) -> Vec<HistorySummary<'_>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| HistorySummary::from_entry(i, e))
        .collect()
}

/// Formats one evaluation result.
///
/// # Errors
///
/// Returns [`CommandError::OutputFormat`] if JSON serialization fails.
pub fn format_case_result(result: &CaseResult, format: OutputFormat) -> Result<String, CommandError> {
    match format {
        OutputFormat::Text => Ok(case_result_text(result)),
        OutputFormat::Json | OutputFormat::Ndjson => format.to_json(result),
    }
}

/// Formats the session history as a summary.
///
/// # Errors
///
/// Returns [`CommandError::OutputFormat`] if JSON serialization fails.
pub fn format_history(entries: &[LedgerEntry], format: OutputFormat) -> Result<String, CommandError> {
    let summaries = history_summaries(entries);

    match format {
        OutputFormat::Text => {
            let mut out = format!("History: {} session(s)\n", summaries.len());
            for s in &summaries {
                let _ = writeln!(
                    out,
                    "  {}. {:<9} confidence {:>5.2}  iterations {}{}  {}",
                    s.index,
                    s.status,
                    s.confidence,
                    s.iterations_used,
                    if s.clarification { " (clarification)" } else { "" },
                    truncate(&describe_case(s.query, s.image), 60),
                );
            }
            Ok(out)
        }
        OutputFormat::Json => format.to_json(&serde_json::json!({ "history": summaries })),
        OutputFormat::Ndjson => {
            let mut out = String::new();
            for s in &summaries {
                out.push_str(&format.to_json(s)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn describe_case(query: &str, image: Option<&str>) -> String {
    match (query.trim().is_empty(), image) {
        (false, Some(img)) => format!("{query} [{img}]"),
        (false, None) => query.to_string(),
        (true, Some(img)) => format!("[{img}]"),
        (true, None) => "(empty)".to_string(),
    }
}

#[allow(clippy::format_push_string)]
fn case_result_text(result: &CaseResult) -> String {
    let mut out = format!(
        "Status: {}\nConfidence: {:.2}\nIterations: {}\n",
        result.status, result.confidence, result.iterations_used
    );

    if let Some(ref error) = result.error {
        out.push_str(&format!("Error: {error}\n"));
    }

    if !result.iteration_log.is_empty() {
        out.push_str("\nIteration log:\n");
        for record in &result.iteration_log {
            out.push_str(&format!("  {}\n", iteration_line(record)));
        }
    }

    if let Some(ref clarification) = result.clarification {
        out.push_str(&format!("\nClarification: {}\n", clarification.message));
        if !clarification.missing_fields.is_empty() {
            out.push_str(&format!(
                "  Missing: {}\n",
                clarification.missing_fields.join(", ")
            ));
        }
    }

    for (label, report) in [
        ("Image analysis", result.image_analysis.as_ref()),
        ("Text analysis", result.text_analysis.as_ref()),
    ] {
        if let Some(report) = report {
            out.push_str(&format!(
                "\n{label}: confidence {}, urgency {}\n",
                report.confidence_level, report.urgency_level
            ));
            for flag in &report.urgent_flags {
                out.push_str(&format!("  ! {flag}\n"));
            }
            for finding in &report.findings {
                out.push_str(&format!("  * {finding}\n"));
            }
        }
    }

    if !result.recommendations.is_empty() {
        out.push_str("\nRecommendations:\n");
        for rec in &result.recommendations {
            out.push_str(&format!("  - {rec}\n"));
        }
    }

    if let Some(ref text) = result.evaluation_text {
        out.push_str(&format!("\nEvaluation:\n{}\n", text.trim_end()));
    }

    out.push_str(&format!(
        "\n---\nTokens: {} | Time: {:.1}s\n",
        result.total_tokens,
        result.elapsed.as_secs_f64()
    ));
    out
}

fn iteration_line(record: &IterationRecord) -> String {
    let outcome = match &record.outcome {
        ActOutcome::ImageAnalyzed { .. } => "image analyzed".to_string(),
        ActOutcome::TextAnalyzed { .. } => "text analyzed".to_string(),
        ActOutcome::InfoRequested { fields } => format!("requested {}", fields.join(", ")),
        ActOutcome::ReadyToEvaluate => "ready to evaluate".to_string(),
        ActOutcome::Failed { reason } => format!("failed: {reason}"),
    };
    let marker = if record.fallback { " (fallback plan)" } else { "" };
    format!(
        "{}. {} ({}) -> {} [{:.2}]{marker}",
        record.iteration, record.action, record.reason, outcome, record.confidence_after
    )
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionKind, CaseInput, CaseStatus, ClarificationRequest};
    use std::time::Duration;
    use test_case::test_case;

    fn sample_result() -> CaseResult {
        CaseResult {
            status: CaseStatus::Completed,
            confidence: -0.6,
            evaluation_text: Some("Report body".to_string()),
            image_analysis: None,
            text_analysis: None,
            recommendations: vec!["Ultrasound.".to_string()],
            iterations_used: 1,
            clarification: Some(ClarificationRequest::new(vec!["age".to_string()], -0.6)),
            error: None,
            iteration_log: vec![IterationRecord {
                iteration: 1,
                action: ActionKind::RequestInfo,
                reason: "need age".to_string(),
                outcome: ActOutcome::InfoRequested {
                    fields: vec!["age".to_string()],
                },
                confidence_after: -0.2,
                fallback: false,
            }],
            total_tokens: 42,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test_case("text", OutputFormat::Text ; "text")]
    #[test_case("JSON", OutputFormat::Json ; "json uppercase")]
    #[test_case("ndjson", OutputFormat::Ndjson ; "ndjson")]
    #[test_case("jsonl", OutputFormat::Ndjson ; "jsonl alias")]
    #[test_case("yaml", OutputFormat::Text ; "unknown falls back")]
    fn test_output_format_parse(input: &str, expected: OutputFormat) {
        assert_eq!(OutputFormat::parse(input), expected);
    }

    #[test]
    fn test_case_result_text() {
        let text = format_case_result(&sample_result(), OutputFormat::Text).unwrap_or_default();
        assert!(text.contains("Status: completed"));
        assert!(text.contains("Confidence: -0.60"));
        assert!(text.contains("1. request_info (need age) -> requested age [-0.20]"));
        assert!(text.contains("Missing: age"));
        assert!(text.contains("  - Ultrasound."));
        assert!(text.contains("Evaluation:\nReport body"));
        assert!(text.contains("Tokens: 42 | Time: 1.5s"));
    }

    #[test]
    fn test_fallback_iteration_is_marked() {
        let mut result = sample_result();
        result.iteration_log[0].fallback = true;
        let text = format_case_result(&result, OutputFormat::Text).unwrap_or_default();
        assert!(text.contains("[-0.20] (fallback plan)"));
    }

    #[test]
    fn test_case_result_ndjson_single_line() {
        let line = format_case_result(&sample_result(), OutputFormat::Ndjson).unwrap_or_default();
        assert!(!line.contains('\n'));
        let value: serde_json::Value =
            serde_json::from_str(&line).unwrap_or_else(|_| unreachable!());
        assert_eq!(value["status"], "completed");
        assert_eq!(value["iterations_used"], 1);
    }

    #[test]
    fn test_history_text() {
        let entries = vec![LedgerEntry {
            input: CaseInput::new("").with_image("scan.png"),
            result: sample_result(),
            iterations_used: 1,
        }];
        let text = format_history(&entries, OutputFormat::Text).unwrap_or_default();
        assert!(text.starts_with("History: 1 session(s)"));
        assert!(text.contains("(clarification)"));
        assert!(text.contains("[scan.png]"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijk", 8), "abcde...");
    }
}
