use motiondx_core::{AggregatedResult, Channel, MatchCandidate, Severity, SignalStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Structured input for a report generator: the detected conditions and
/// the raw statistics of every analysed channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Candidates above the report threshold, best first
    pub detected: Vec<MatchCandidate>,
    pub channel_stats: BTreeMap<Channel, SignalStats>,
    /// Threshold `detected` was filtered at, on the 0-100 scale
    pub report_threshold: f32,
}

impl MatchSummary {
    pub fn new(detected: &AggregatedResult, report_threshold: f32) -> Self {
        Self {
            detected: detected.ranked.clone(),
            channel_stats: BTreeMap::new(),
            report_threshold,
        }
    }

    pub fn with_channel_stats(mut self, channel: Channel, stats: SignalStats) -> Self {
        self.channel_stats.insert(channel, stats);
        self
    }

    /// Highest severity among the detected conditions.
    pub fn severity(&self) -> Severity {
        self.detected
            .iter()
            .map(|c| c.severity)
            .max()
            .unwrap_or_default()
    }

    /// Plain-text rendering: detected conditions with severity and
    /// confidence, then raw statistics per channel in canonical order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Detected Conditions (similarity > {:.0}%):",
            self.report_threshold
        );
        if self.detected.is_empty() {
            out.push_str("- none\n");
        }
        for candidate in &self.detected {
            let _ = writeln!(
                out,
                "- [{}] {} (Severity: {}, Confidence: {:.1}%)",
                candidate.channel, candidate.diagnosis_text, candidate.severity, candidate.similarity
            );
        }

        if !self.channel_stats.is_empty() {
            out.push_str("\nRaw Sensor Statistics:\n");
            for (channel, stats) in &self.channel_stats {
                let _ = writeln!(out, "{}:", channel);
                let _ = writeln!(out, "  - Mean: {:.4}", stats.mean);
                let _ = writeln!(out, "  - Variance: {:.4}", stats.variance);
                let _ = writeln!(out, "  - Peak: {:.4}", stats.peak);
                let _ = writeln!(out, "  - Outliers: {}", stats.outlier_count);
                let _ = writeln!(out, "  - Zero-crossing rate: {:.4}", stats.zero_crossing_rate);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motiondx_core::PatternStats;

    fn candidate(channel: Channel, text: &str, severity: Severity, similarity: f32) -> MatchCandidate {
        MatchCandidate {
            channel,
            knowledge_entry_id: text.to_lowercase(),
            diagnosis_text: text.to_string(),
            severity,
            condition_type: String::new(),
            similarity,
            pattern_stats: PatternStats::default(),
        }
    }

    #[test]
    fn test_render_lists_conditions_and_stats() {
        let summary = MatchSummary {
            detected: vec![
                candidate(Channel::GyrX, "Tremor", Severity::Critical, 92.345),
                candidate(Channel::AccX, "Limp", Severity::Warning, 81.0),
            ],
            channel_stats: BTreeMap::new(),
            report_threshold: 80.0,
        }
        .with_channel_stats(Channel::AccX, SignalStats::compute(&[1.0, -1.0, 1.0, -1.0]).unwrap());

        let text = summary.render();
        assert!(text.starts_with("Detected Conditions (similarity > 80%):\n"));
        assert!(text.contains("- [GyrX] Tremor (Severity: critical, Confidence: 92.3%)"));
        assert!(text.contains("- [AccX] Limp (Severity: warning, Confidence: 81.0%)"));
        assert!(text.contains("AccX:\n  - Mean: 0.0000\n  - Variance: 1.0000\n  - Peak: 1.0000"));
        assert!(text.contains("  - Zero-crossing rate: 0.7500"));
        assert_eq!(summary.severity(), Severity::Critical);
    }

    #[test]
    fn test_render_without_matches() {
        let summary = MatchSummary::new(&AggregatedResult::default(), 80.0);
        assert_eq!(summary.render(), "Detected Conditions (similarity > 80%):\n- none\n");
        assert_eq!(summary.severity(), Severity::Normal);
    }
}
