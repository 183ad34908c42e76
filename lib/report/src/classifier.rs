//! Best-effort heuristics over free-text reports.
//!
//! These never feed back into the structured severity computed by
//! [`motiondx_core::aggregate`]; they only annotate generated text.

use motiondx_core::Severity;
use tracing::debug;

/// Derives a severity from free text.
pub trait SeverityClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Severity;
}

/// Pulls recommendation lines out of free text.
pub trait RecommendationExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<String>;
}

pub const CRITICAL_KEYWORDS: &[&str] = &[
    "critical",
    "severe",
    "immediate",
    "urgent",
    "parkinson",
    "high risk",
];

pub const WARNING_KEYWORDS: &[&str] = &[
    "warning",
    "moderate",
    "caution",
    "monitor",
    "irregular",
    "compensation",
];

pub const CONDITION_KEYWORDS: &[&str] = &[
    "limping",
    "tremor",
    "instability",
    "imbalance",
    "shuffling",
    "irregular",
    "compensation",
    "impact",
];

pub const DEFAULT_RECOMMENDATIONS: &[&str] = &[
    "Continue monitoring gait patterns",
    "Consult with a healthcare professional if symptoms persist",
    "Ensure proper sensor calibration",
];

pub const MAX_RECOMMENDATIONS: usize = 5;

const SECTION_START: &str = "recommendation";
const SECTION_END: &str = "follow-up";

/// Case-insensitive keyword matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Condition keywords present in `text`, in keyword-list order.
    pub fn conditions(&self, text: &str) -> Vec<&'static str> {
        let lower = text.to_lowercase();
        CONDITION_KEYWORDS
            .iter()
            .copied()
            .filter(|k| lower.contains(k))
            .collect()
    }
}

impl SeverityClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Severity {
        let lower = text.to_lowercase();
        if CRITICAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Severity::Critical
        } else if WARNING_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

impl RecommendationExtractor for KeywordClassifier {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut in_section = false;

        for line in text.lines() {
            let lower = line.to_lowercase();
            if lower.contains(SECTION_START) {
                in_section = true;
                continue;
            }
            if lower.contains(SECTION_END) {
                break;
            }
            if !in_section {
                continue;
            }
            let cleaned = line
                .trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '•' | '-' | '*' | '.' | ' '));
            if !cleaned.is_empty() {
                found.push(cleaned.to_string());
            }
        }

        if found.is_empty() {
            debug!("no recommendation section found, using defaults");
            return DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect();
        }
        found.truncate(MAX_RECOMMENDATIONS);
        found
    }
}
