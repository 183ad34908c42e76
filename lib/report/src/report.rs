use crate::classifier::{KeywordClassifier, RecommendationExtractor, SeverityClassifier};
use crate::summary::MatchSummary;
use motiondx_core::Severity;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use thiserror::Error;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report generation failed: {0}")]
    Generation(String),
}

/// Turns a match summary into a natural-language report.
pub trait ReportGenerator: Send + Sync {
    fn generate(&self, summary: &MatchSummary) -> Result<String>;
}

/// A generated report with the severity and recommendations derived from its
/// text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub overall_diagnosis: String,
    pub severity_level: Severity,
    pub recommendations: Vec<String>,
    pub conditions: Vec<String>,
}

impl DiagnosisReport {
    pub fn compose<C, R>(text: String, classifier: &C, extractor: &R) -> Self
    where
        C: SeverityClassifier + ?Sized,
        R: RecommendationExtractor + ?Sized,
    {
        let severity_level = classifier.classify(&text);
        let recommendations = extractor.extract(&text);
        let conditions = KeywordClassifier
            .conditions(&text)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            overall_diagnosis: text,
            severity_level,
            recommendations,
            conditions,
        }
    }

    /// Generate and classify in one step using [`KeywordClassifier`].
    pub fn generate<G: ReportGenerator + ?Sized>(generator: &G, summary: &MatchSummary) -> Result<Self> {
        let text = generator.generate(summary).map_err(|e| {
            warn!(error = %e, detected = summary.detected.len(), "report generation failed");
            e
        })?;
        let report = Self::compose(text, &KeywordClassifier, &KeywordClassifier);
        debug!(
            severity = %report.severity_level,
            recommendations = report.recommendations.len(),
            "report generated"
        );
        Ok(report)
    }
}

/// Deterministic generator that lays the summary out in report sections
/// without any language model.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateReportGenerator;

impl TemplateReportGenerator {
    fn advice(severity: Severity) -> &'static [&'static str] {
        match severity {
            Severity::Critical => &[
                "Seek an immediate clinical gait assessment",
                "Limit unsupervised walking until assessed",
            ],
            Severity::Warning => &[
                "Monitor the affected movement over the coming weeks",
                "Consider a physiotherapy consultation",
            ],
            Severity::Normal => &["Continue regular activity"],
        }
    }
}

impl ReportGenerator for TemplateReportGenerator {
    fn generate(&self, summary: &MatchSummary) -> Result<String> {
        let mut out = String::new();
        let mut detected = summary.detected.iter();

        out.push_str("1. Primary Condition\n");
        match detected.next() {
            Some(top) => {
                let _ = writeln!(
                    out,
                    "{} on {} ({}, {:.1}% match)",
                    top.diagnosis_text, top.channel, top.severity, top.similarity
                );
            }
            None => out.push_str("No condition matched above the report threshold\n"),
        }

        out.push_str("\n2. Secondary Findings\n");
        let mut any_secondary = false;
        for c in detected {
            any_secondary = true;
            let _ = writeln!(out, "- {} on {} ({:.1}% match)", c.diagnosis_text, c.channel, c.similarity);
        }
        if !any_secondary {
            out.push_str("- none\n");
        }

        let severity = summary.severity();
        let _ = write!(out, "\n3. Overall Gait Assessment\nOverall severity: {}\n", severity);

        out.push_str("\n4. Specific Recommendations\n");
        for line in Self::advice(severity) {
            let _ = writeln!(out, "- {}", line);
        }

        out.push_str("\n5. Follow-up Suggestions\n");
        out.push_str("- Repeat the measurement to confirm the findings\n");
        Ok(out)
    }
}
