//! Keyword heuristics that turn free-text model output into an
//! [`AnalysisReport`].
//!
//! Matching is case-insensitive substring search. Line-based extractors
//! split on newlines, sentence-based ones on `.`. Fragments of ten
//! characters or fewer are ignored.

use regex::Regex;

use crate::core::{AnalysisReport, AnalysisSource, AnalysisStatus, Level};

/// Minimum trimmed length of a line or sentence worth keeping.
const MIN_FRAGMENT_LEN: usize = 10;

const MAX_FINDINGS: usize = 5;
const MAX_RISK_FACTORS: usize = 3;
const MAX_SYMPTOMS: usize = 5;
const MAX_RECOMMENDATIONS: usize = 3;
const MAX_MEDICAL_TERMS: usize = 10;

/// Capitalized phrases, then hyphenated lowercase words.
const MEDICAL_TERM_PATTERNS: [&str; 2] = [
    r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b",
    r"\b[a-z]+(?:-[a-z]+)+\b",
];

/// Words that start sentences often enough to look like terms.
const TERM_STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "these", "there", "which", "however", "please",
];

const FINDING_INDICATORS: &[&str] = &[
    "finding",
    "abnormality",
    "lesion",
    "mass",
    "calcification",
    "density",
    "asymmetry",
    "distortion",
    "thickening",
];

/// Extra indicators for clinical text.
const TEXT_FINDING_INDICATORS: &[&str] = &["diagnosis", "condition", "disease", "pathology"];

const RISK_KEYWORDS: &[&str] = &[
    "high risk",
    "low risk",
    "moderate risk",
    "suspicious",
    "concerning",
];

const RISK_FACTOR_KEYWORDS: &[&str] = &[
    "risk factor",
    "risk",
    "suspicious",
    "concerning",
    "worrisome",
];

const SYMPTOM_KEYWORDS: &[&str] = &[
    "symptom",
    "pain",
    "discomfort",
    "tenderness",
    "swelling",
    "lump",
    "mass",
    "discharge",
    "bleeding",
    "irregularity",
];

const RECOMMENDATION_KEYWORDS: &[&str] = &["recommend", "suggest", "advise", "should", "consider"];

/// Extra recommendation keywords for clinical text.
const TEXT_RECOMMENDATION_KEYWORDS: &[&str] = &["follow-up", "monitor", "evaluate", "assess"];

const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "immediate",
    "suspicious",
    "concerning",
    "worrisome",
    "malignant",
    "cancer",
    "metastasis",
    "invasive",
];

/// Indicators per level, checked in order High, Medium, Low.
const CONFIDENCE_INDICATORS: [(Level, &[&str]); 3] = [
    (
        Level::High,
        &["clear", "definite", "obvious", "distinct", "well-defined", "certain"],
    ),
    (
        Level::Medium,
        &["appears", "suggests", "indicates", "consistent with", "likely"],
    ),
    (
        Level::Low,
        &["unclear", "vague", "subtle", "questionable", "indeterminate", "uncertain"],
    ),
];

const URGENCY_INDICATORS: [(Level, &[&str]); 3] = [
    (
        Level::High,
        &["urgent", "immediate", "emergency", "critical", "severe"],
    ),
    (
        Level::Medium,
        &["moderate", "concerning", "suspicious", "follow-up needed"],
    ),
    (
        Level::Low,
        &["routine", "stable", "benign", "normal", "no immediate concern"],
    ),
];

/// Builds a completed report from raw model output.
///
/// Image reports use the imaging vocabulary; text reports add clinical
/// terms for findings and recommendations.
#[must_use]
pub fn build_report(raw: &str, source: AnalysisSource, tokens_used: u32) -> AnalysisReport {
    let is_text = matches!(source, AnalysisSource::Text);
    let mut report = AnalysisReport::new(AnalysisStatus::Completed, source);

    let finding_keywords: Vec<&str> = if is_text {
        [FINDING_INDICATORS, TEXT_FINDING_INDICATORS].concat()
    } else {
        FINDING_INDICATORS.to_vec()
    };
    let recommendation_keywords: Vec<&str> = if is_text {
        [RECOMMENDATION_KEYWORDS, TEXT_RECOMMENDATION_KEYWORDS].concat()
    } else {
        RECOMMENDATION_KEYWORDS.to_vec()
    };

    report.findings = matching_lines(raw, &finding_keywords, MAX_FINDINGS);
    report.risk_assessment = risk_assessment(raw);
    report.risk_factors = matching_sentences(raw, RISK_FACTOR_KEYWORDS, MAX_RISK_FACTORS);
    report.symptoms = matching_sentences(raw, SYMPTOM_KEYWORDS, MAX_SYMPTOMS);
    report.recommendations = matching_lines(raw, &recommendation_keywords, MAX_RECOMMENDATIONS);
    report.urgent_flags = urgent_flags(raw);
    report.confidence_level = assess_level(raw, &CONFIDENCE_INDICATORS);
    report.urgency_level = assess_level(raw, &URGENCY_INDICATORS);
    report.summary = summarize(raw);
    if is_text {
        report.medical_terms = medical_terms(raw);
    }
    report.tokens_used = tokens_used;
    report.raw_analysis = raw.to_string();
    report
}

/// Builds a text report and records the input it was produced from.
#[must_use]
pub fn build_text_report(raw: &str, input: &str, tokens_used: u32) -> AnalysisReport {
    let mut report = build_report(raw, AnalysisSource::Text, tokens_used);
    report.original_input = Some(input.to_string());
    report
}

/// Candidate medical terms in order of appearance, at most
/// [`MAX_MEDICAL_TERMS`] unique ones. Terms of three characters or fewer
/// and stopwords are skipped.
#[must_use]
pub fn medical_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for pattern in MEDICAL_TERM_PATTERNS {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        for m in re.find_iter(text) {
            let term = m.as_str();
            if term.len() > 3
                && !TERM_STOPWORDS.contains(&term.to_lowercase().as_str())
                && !terms.iter().any(|t| t == term)
            {
                terms.push(term.to_string());
                if terms.len() == MAX_MEDICAL_TERMS {
                    return terms;
                }
            }
        }
    }
    terms
}

/// Lines containing any keyword, first `limit` in order.
#[must_use]
pub fn matching_lines(text: &str, keywords: &[&str], limit: usize) -> Vec<String> {
    select(text.lines(), keywords, limit)
}

/// Sentences containing any keyword, first `limit` in order.
#[must_use]
pub fn matching_sentences(text: &str, keywords: &[&str], limit: usize) -> Vec<String> {
    select(text.split('.'), keywords, limit)
}

fn select<'a>(
    fragments: impl Iterator<Item = &'a str>,
    keywords: &[&str],
    limit: usize,
) -> Vec<String> {
    fragments
        .map(str::trim)
        .filter(|f| f.len() > MIN_FRAGMENT_LEN && contains_any(f, keywords))
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn contains_any(fragment: &str, keywords: &[&str]) -> bool {
    let lower = fragment.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// First sentence carrying a risk statement, keywords tried in priority order.
#[must_use]
pub fn risk_assessment(text: &str) -> Option<String> {
    RISK_KEYWORDS.iter().find_map(|keyword| {
        text.split('.')
            .find(|s| s.to_lowercase().contains(keyword))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// For each urgent keyword, the first sentence that mentions it.
///
/// A sentence that matches several keywords is reported once.
#[must_use]
pub fn urgent_flags(text: &str) -> Vec<String> {
    let mut flags: Vec<String> = Vec::new();
    for keyword in URGENT_KEYWORDS {
        let hit = text
            .split('.')
            .map(str::trim)
            .find(|s| s.to_lowercase().contains(keyword));
        if let Some(sentence) = hit
            && !sentence.is_empty()
            && !flags.iter().any(|f| f == sentence)
        {
            flags.push(sentence.to_string());
        }
    }
    flags
}

/// Returns the first level whose indicators appear in the text, else `Medium`.
#[must_use]
pub fn assess_level(text: &str, table: &[(Level, &[&str])]) -> Level {
    let lower = text.to_lowercase();
    table
        .iter()
        .find(|(_, indicators)| indicators.iter().any(|i| lower.contains(i)))
        .map_or(Level::Medium, |(level, _)| *level)
}

/// First two sentences of the analysis.
#[must_use]
pub fn summarize(text: &str) -> Option<String> {
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(2)
        .collect();
    if sentences.is_empty() {
        None
    } else {
        Some(format!("{}.", sentences.join(". ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SAMPLE: &str = "The mammogram shows a well-defined mass in the upper outer quadrant.\n\
        Scattered calcifications are noted bilaterally.\n\
        These findings are suspicious for malignancy. Family history is a risk factor.\n\
        I recommend a targeted ultrasound and biopsy.\n\
        Short line.";

    #[test]
    fn test_findings_by_line() {
        let findings = matching_lines(SAMPLE, FINDING_INDICATORS, MAX_FINDINGS);
        assert_eq!(findings.len(), 3);
        assert!(findings[0].contains("well-defined mass"));
        assert!(findings[1].contains("calcifications"));
    }

    #[test]
    fn test_findings_respect_limit_and_min_length() {
        let text = "mass\nmass one here ok\nmass two here ok\nmass three here\nmass four here\nmass five here\nmass six here";
        let findings = matching_lines(text, FINDING_INDICATORS, MAX_FINDINGS);
        assert_eq!(findings.len(), 5);
        assert!(findings.iter().all(|f| f.len() > MIN_FRAGMENT_LEN));
    }

    #[test]
    fn test_risk_assessment_priority() {
        let text = "The lesion is concerning. Overall this is low risk.";
        // "low risk" is checked before "concerning"
        assert_eq!(
            risk_assessment(text).as_deref(),
            Some("Overall this is low risk")
        );
        assert_eq!(risk_assessment("Nothing notable"), None);
    }

    #[test]
    fn test_urgent_flags_deduplicated() {
        let flags = urgent_flags("Suspicious and concerning mass. Invasive features noted.");
        assert_eq!(
            flags,
            vec!["Suspicious and concerning mass", "Invasive features noted"]
        );
    }

    #[test_case("A clear and definite mass", Level::High ; "high wins")]
    #[test_case("It appears benign", Level::Medium ; "medium indicator")]
    #[test_case("The margin is vague", Level::Low ; "low indicator")]
    #[test_case("Nothing to say", Level::Medium ; "default medium")]
    fn test_confidence_level(text: &str, expected: Level) {
        assert_eq!(assess_level(text, &CONFIDENCE_INDICATORS), expected);
    }

    #[test_case("Immediate biopsy required", Level::High ; "high urgency")]
    #[test_case("Routine screening", Level::Low ; "low urgency")]
    fn test_urgency_level(text: &str, expected: Level) {
        assert_eq!(assess_level(text, &URGENCY_INDICATORS), expected);
    }

    #[test]
    fn test_summarize_first_two_sentences() {
        assert_eq!(
            summarize("One. Two. Three.").as_deref(),
            Some("One. Two.")
        );
        assert_eq!(summarize("   "), None);
    }

    #[test]
    fn test_build_report_text_vocabulary() {
        let raw = "The diagnosis is fibroadenoma.\nPlease monitor the area closely.";
        let text = build_report(raw, AnalysisSource::Text, 42);
        assert_eq!(text.findings.len(), 1);
        assert_eq!(text.recommendations.len(), 1);
        assert_eq!(text.tokens_used, 42);
        assert!(text.is_completed());

        let image = build_report(
            raw,
            AnalysisSource::Image {
                path: "scan.png".to_string(),
            },
            0,
        );
        assert!(image.findings.is_empty());
        assert!(image.recommendations.is_empty());
    }

    #[test_case(
        "Invasive Ductal Carcinoma is suspected. A well-defined mass, follow-up advised.",
        &["Invasive Ductal Carcinoma", "well-defined", "follow-up"] ;
        "capitalized phrase then hyphenated"
    )]
    #[test_case(
        "The mass is stable. This needs routine care.",
        &[] ;
        "stopwords and short words skipped"
    )]
    #[test_case(
        "Fibroadenoma noted. Fibroadenoma confirmed on follow-up and follow-up again.",
        &["Fibroadenoma", "follow-up"] ;
        "duplicates kept once"
    )]
    #[test_case(
        "aa-a bb-b cc-c dd-d ee-e ff-f gg-g hh-h ii-i jj-j kk-k ll-l",
        &["aa-a", "bb-b", "cc-c", "dd-d", "ee-e", "ff-f", "gg-g", "hh-h", "ii-i", "jj-j"] ;
        "at most ten"
    )]
    fn test_medical_terms(text: &str, expected: &[&str]) {
        assert_eq!(medical_terms(text), expected);
    }

    #[test_case("left breast pain for two weeks", "Tenderness suggests Mastitis." ; "query kept verbatim")]
    #[test_case("  lump  ", "A lump-like density." ; "whitespace preserved")]
    fn test_text_report_keeps_input_and_terms(input: &str, raw: &str) {
        let report = build_text_report(raw, input, 7);
        assert_eq!(report.original_input.as_deref(), Some(input));
        assert_eq!(report.source, AnalysisSource::Text);
        assert_eq!(report.medical_terms, medical_terms(raw));
        assert!(!report.medical_terms.is_empty());
        assert_eq!(report.tokens_used, 7);
    }

    #[test]
    fn test_image_report_has_no_terms_or_input() {
        let report = build_report(
            "Invasive Ductal Carcinoma suspected.",
            AnalysisSource::Image {
                path: "scan.png".to_string(),
            },
            0,
        );
        assert!(report.medical_terms.is_empty());
        assert!(report.original_input.is_none());
    }

    #[test]
    fn test_build_report_sample() {
        let report = build_report(SAMPLE, AnalysisSource::Text, 0);
        assert_eq!(report.confidence_level, Level::High);
        assert_eq!(report.urgency_level, Level::Medium);
        assert_eq!(report.recommendations.len(), 1);
        assert!(!report.urgent_flags.is_empty());
        assert!(report.risk_assessment.is_some());
        assert_eq!(report.raw_analysis, SAMPLE);
    }
}
