//! Report boundary for motiondx.
//!
//! [`MatchSummary`] is what a [`ReportGenerator`] consumes. The keyword
//! heuristics in [`classifier`] annotate whatever text comes back.

pub mod classifier;
pub mod report;
pub mod summary;

pub use classifier::{KeywordClassifier, RecommendationExtractor, SeverityClassifier};
pub use report::{DiagnosisReport, ReportError, ReportGenerator, Result, TemplateReportGenerator};
pub use summary::MatchSummary;
