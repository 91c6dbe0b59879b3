//! System prompts and template builders for agents.
//!
//! Prompts are the core instructions that define each agent's behavior.
//! Template builders format user messages from the evaluation state.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::core::{ActionKind, AnalysisReport};

/// System prompt for the planner (Think step).
pub const PLANNER_SYSTEM_PROMPT: &str = r#"You are the coordinator of a breast health evaluation workflow. At each step you inspect the current state of a case and choose exactly one next action.

## Actions

- `analyze_image`: the case has an image that has not been analyzed yet.
- `analyze_text`: the case has a text description that has not been analyzed yet.
- `request_info`: specific information is missing and must be requested from the patient or clinician. List every missing item in `required_fields`.
- `evaluate`: the evidence gathered so far is enough for a final evaluation.

## Output Format (JSON)

```json
{
  "action": "analyze_image" | "analyze_text" | "request_info" | "evaluate",
  "reason": "<one sentence>",
  "required_fields": ["field1", "field2"]
}
```

## Guidelines

- Never choose `analyze_image` when no image is available.
- `required_fields` must be an empty list unless the action is `request_info`.
- Prefer analyzing available evidence before requesting more.
- Return ONLY the JSON object, no surrounding text."#;

/// System prompt for the image analyst.
pub const IMAGE_SYSTEM_PROMPT: &str = r"You are an expert radiologist specializing in mammography and breast imaging.

Your task is to analyze mammography images and provide:
1. Detailed description of visible structures and tissues
2. Identification of any abnormalities, masses, calcifications, or other concerning findings
3. Assessment of breast density and tissue patterns
4. Risk assessment based on findings
5. Specific recommendations for follow-up or additional imaging

Be thorough but concise. Use medical terminology appropriately.
If you identify concerning findings, clearly state their significance and urgency.
If the image quality is poor or findings are unclear, acknowledge these limitations.";

/// System prompt for the text analyst.
pub const TEXT_SYSTEM_PROMPT: &str = r"You are an expert medical professional specializing in breast health and mammography.

Your task is to analyze medical text and provide:
1. Identification of key medical findings and abnormalities
2. Assessment of risk factors and concerning patterns
3. Identification of symptoms and clinical indicators
4. Medical terminology extraction and explanation
5. Recommendations for follow-up or additional evaluation

Be thorough but concise. Use medical terminology appropriately.
If you identify concerning findings, clearly state their significance and urgency.
If the information is unclear or insufficient, acknowledge these limitations.";

/// System prompt for the final evaluation.
pub const EVALUATOR_SYSTEM_PROMPT: &str = r"You are a senior breast health specialist writing the final evaluation of a case from the analyses gathered by your team.

## Output Format

Write a structured medical report with these sections:

- **Summary of Findings**: what the image and text analyses found, with the key evidence.
- **Risk Assessment**: overall risk level and the factors that drive it.
- **Recommendations**: concrete follow-up actions, ordered by priority.
- **Next Steps**: what the patient should do now and what information is still missing.

## Guidelines

- Base every statement on the provided analyses. Do not invent findings.
- If an analysis is not available, say so rather than guessing.
- If the gathered confidence is low, state the limitations explicitly.";

/// Default prompt directory under user config.
const DEFAULT_PROMPT_DIR: &str = ".config/mamaria/prompts";

/// Filename for the planner prompt template.
const PLANNER_FILENAME: &str = "planner.md";
/// Filename for the image analyst prompt template.
const IMAGE_FILENAME: &str = "image.md";
/// Filename for the text analyst prompt template.
const TEXT_FILENAME: &str = "text.md";
/// Filename for the evaluator prompt template.
const EVALUATOR_FILENAME: &str = "evaluator.md";

/// A set of system prompts for all agents.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// System prompt for the planner.
    pub planner: String,
    /// System prompt for the image analyst.
    pub image: String,
    /// System prompt for the text analyst.
    pub text: String,
    /// System prompt for the evaluator.
    pub evaluator: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Each file is loaded independently: a missing or unreadable file
    /// uses its default. With `None`, the defaults are returned as-is.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let Some(dir) = prompt_dir else {
            return Self::defaults();
        };

        let load_file = |filename: &str, default: &str| -> String {
            std::fs::read_to_string(dir.join(filename))
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            planner: load_file(PLANNER_FILENAME, PLANNER_SYSTEM_PROMPT),
            image: load_file(IMAGE_FILENAME, IMAGE_SYSTEM_PROMPT),
            text: load_file(TEXT_FILENAME, TEXT_SYSTEM_PROMPT),
            evaluator: load_file(EVALUATOR_FILENAME, EVALUATOR_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            planner: PLANNER_SYSTEM_PROMPT.to_string(),
            image: IMAGE_SYSTEM_PROMPT.to_string(),
            text: TEXT_SYSTEM_PROMPT.to_string(),
            evaluator: EVALUATOR_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten. Returns the paths that were written.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (PLANNER_FILENAME, PLANNER_SYSTEM_PROMPT),
            (IMAGE_FILENAME, IMAGE_SYSTEM_PROMPT),
            (TEXT_FILENAME, TEXT_SYSTEM_PROMPT),
            (EVALUATOR_FILENAME, EVALUATOR_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    ///
    /// Returns `None` if the home directory cannot be determined.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// State summary handed to the planner.
pub struct ThinkingContext<'a> {
    /// Case query text.
    pub query: &'a str,
    /// Whether an image is attached.
    pub has_image: bool,
    /// Whether the image has already been analyzed.
    pub image_analyzed: bool,
    /// Whether the text has already been analyzed.
    pub text_analyzed: bool,
    /// Current accumulated confidence.
    pub confidence: f64,
    /// Fields currently known to be missing.
    pub missing_fields: &'a [String],
    /// 1-based iteration number.
    pub iteration: usize,
    /// Iteration cap.
    pub max_iterations: usize,
}

/// Builds the user message for the planner.
#[must_use]
pub fn build_thinking_prompt(ctx: &ThinkingContext<'_>) -> String {
    let query = if ctx.query.trim().is_empty() {
        "N/A"
    } else {
        ctx.query
    };
    let yes_no = |b: bool| if b { "Yes" } else { "No" };
    let missing = if ctx.missing_fields.is_empty() {
        "none".to_string()
    } else {
        ctx.missing_fields.join(", ")
    };
    let actions = ActionKind::ALL
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "<state>\n\
         - User query: {query}\n\
         - Image available: {}\n\
         - Image analyzed: {}\n\
         - Text analyzed: {}\n\
         - Current confidence: {:.2}\n\
         - Missing information: {missing}\n\
         - Iteration: {} of {}\n\
         </state>\n\n\
         Based on this state, what is the next action needed? \
         Choose one of: {actions}.",
        yes_no(ctx.has_image),
        yes_no(ctx.image_analyzed),
        yes_no(ctx.text_analyzed),
        ctx.confidence,
        ctx.iteration,
        ctx.max_iterations,
    )
}

/// Builds the user message for the final evaluation.
#[must_use]
pub fn build_evaluation_prompt(
    query: &str,
    metadata: &BTreeMap<String, serde_json::Value>,
    image_analysis: Option<&AnalysisReport>,
    text_analysis: Option<&AnalysisReport>,
    confidence: f64,
    missing_fields: &[String],
) -> String {
    let query = if query.trim().is_empty() { "N/A" } else { query };
    let mut prompt = format!("<query>{query}</query>\n\n");

    if !metadata.is_empty() {
        prompt.push_str("<metadata>\n");
        for (key, value) in metadata {
            let _ = writeln!(prompt, "- {key}: {value}");
        }
        prompt.push_str("</metadata>\n\n");
    }

    let render = |report: Option<&AnalysisReport>| {
        report.map_or_else(
            || "Not available".to_string(),
            |r| serde_json::to_string_pretty(r).unwrap_or_else(|_| r.raw_analysis.clone()),
        )
    };

    let _ = write!(
        prompt,
        "<image_analysis>\n{}\n</image_analysis>\n\n\
         <text_analysis>\n{}\n</text_analysis>\n\n\
         <confidence>{confidence:.2}</confidence>\n",
        render(image_analysis),
        render(text_analysis),
    );

    if !missing_fields.is_empty() {
        let _ = writeln!(
            prompt,
            "\n<missing_information>{}</missing_information>",
            missing_fields.join(", ")
        );
    }

    prompt.push_str(
        "\nPlease provide a comprehensive medical evaluation including: \
         summary of findings, risk assessment, recommendations, and next steps.",
    );
    prompt
}

/// Builds the user message for the image analyst.
#[must_use]
pub fn build_image_prompt() -> String {
    "Please analyze this mammography image and provide a comprehensive medical assessment. \
     Focus on identifying any abnormalities, patterns, or concerning findings that require \
     medical attention."
        .to_string()
}

/// Builds the user message for the text analyst.
#[must_use]
pub fn build_text_prompt(text: &str) -> String {
    format!(
        "Please analyze the following medical text and provide a comprehensive assessment:\n\n\
         <text>\n{text}\n</text>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnalysisSource, AnalysisStatus};

    #[test]
    fn test_build_thinking_prompt() {
        let missing = vec!["age".to_string(), "family history".to_string()];
        let prompt = build_thinking_prompt(&ThinkingContext {
            query: "",
            has_image: true,
            image_analyzed: false,
            text_analyzed: false,
            confidence: 0.3,
            missing_fields: &missing,
            iteration: 2,
            max_iterations: 3,
        });
        assert!(prompt.contains("User query: N/A"));
        assert!(prompt.contains("Image available: Yes"));
        assert!(prompt.contains("Current confidence: 0.30"));
        assert!(prompt.contains("age, family history"));
        assert!(prompt.contains("Iteration: 2 of 3"));
        assert!(prompt.contains("request_info"));
    }

    #[test]
    fn test_build_evaluation_prompt() {
        let mut metadata = BTreeMap::new();
        metadata.insert("age".to_string(), serde_json::json!(52));
        let mut report = AnalysisReport::new(AnalysisStatus::Completed, AnalysisSource::Text);
        report.raw_analysis = "No mass detected.".to_string();

        let prompt =
            build_evaluation_prompt("breast pain", &metadata, None, Some(&report), 0.7, &[]);
        assert!(prompt.contains("<query>breast pain</query>"));
        assert!(prompt.contains("- age: 52"));
        assert!(prompt.contains("<image_analysis>\nNot available\n</image_analysis>"));
        assert!(prompt.contains("No mass detected."));
        assert!(prompt.contains("<confidence>0.70</confidence>"));
        assert!(!prompt.contains("missing_information"));
        assert!(prompt.contains("risk assessment"));
    }

    #[test]
    fn test_build_text_prompt() {
        let prompt = build_text_prompt("lump in left breast");
        assert!(prompt.contains("<text>\nlump in left breast\n</text>"));
    }

    #[test]
    fn test_prompts_not_empty() {
        let set = PromptSet::defaults();
        assert!(!set.planner.is_empty());
        assert!(!set.image.is_empty());
        assert!(!set.text.is_empty());
        assert!(!set.evaluator.is_empty());
    }

    #[test]
    fn test_load_without_dir_returns_defaults() {
        assert_eq!(PromptSet::load(None), PromptSet::defaults());
    }

    #[test]
    fn test_write_then_load_with_override() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let written = PromptSet::write_defaults(dir.path()).unwrap_or_default();
        assert_eq!(written.len(), 4);

        std::fs::write(dir.path().join(PLANNER_FILENAME), "custom planner")
            .unwrap_or_else(|_| unreachable!());
        std::fs::remove_file(dir.path().join(TEXT_FILENAME)).unwrap_or_else(|_| unreachable!());

        let set = PromptSet::load(Some(dir.path()));
        assert_eq!(set.planner, "custom planner");
        assert_eq!(set.text, TEXT_SYSTEM_PROMPT);
        assert_eq!(set.image, IMAGE_SYSTEM_PROMPT);

        // second write keeps existing files
        let rewritten = PromptSet::write_defaults(dir.path()).unwrap_or_default();
        assert_eq!(rewritten.len(), 1);
    }
}
