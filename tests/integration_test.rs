// Integration tests for motiondx
use motiondx::prelude::*;
use motiondx::{
    KeywordClassifier, KnowledgeSeeder, MatchSummary, PatternCatalogue, SeedOptions, SignalStats,
    SeverityClassifier, TemplateReportGenerator, DiagnosisReport,
};
use std::sync::Arc;
use tempfile::TempDir;

fn record(id: &str, channel: &str, severity: &str, embedding: RawEmbedding) -> RawKnowledgeRecord {
    RawKnowledgeRecord {
        id: RecordId::from(id),
        channel_name: channel.to_string(),
        diagnosis_text: format!("{} diagnosis", id),
        severity: severity.to_string(),
        condition_type: id.to_lowercase(),
        pattern_embedding: embedding,
        pattern_stats: serde_json::Value::Null,
    }
}

fn values(v: &[f32]) -> RawEmbedding {
    RawEmbedding::from(v.to_vec())
}

fn engine_over(records: &[RawKnowledgeRecord], dimension: usize) -> DiagnosisEngine {
    let config = EngineConfig {
        dimension,
        ..EngineConfig::default()
    };
    DiagnosisEngine::new(config, KnowledgeBase::load(dimension, records).unwrap()).unwrap()
}

/// Summary statistics of the signal, padded with a per-channel marker.
struct StatsEmbedder;

impl Embedder for StatsEmbedder {
    fn dimension(&self) -> usize {
        6
    }

    fn embed(&self, channel: Channel, samples: &[f32]) -> motiondx::Result<Vec<f32>> {
        let s = SignalStats::compute(samples)?;
        Ok(vec![
            s.mean as f32,
            s.variance.sqrt() as f32,
            s.peak as f32,
            s.zero_crossing_rate as f32,
            s.outlier_count as f32,
            1.0 + channel as usize as f32,
        ])
    }
}

#[test]
fn test_exact_match_scores_one_hundred() {
    let records = vec![
        record("E1", "AccX", "warning", values(&[1.0, 0.0])),
        record("E2", "AccX", "normal", values(&[0.0, 1.0])),
    ];
    let engine = engine_over(&records, 2);

    let diagnosis = engine
        .diagnose(&[QueryVector::new(Channel::AccX, vec![1.0, 0.0])])
        .unwrap();
    let top = diagnosis.candidates.top().unwrap();
    assert_eq!(top.knowledge_entry_id, "E1");
    assert!((top.similarity - 100.0).abs() < 1e-3);
    // E2 is orthogonal and falls under the candidate threshold
    assert_eq!(diagnosis.candidates.ranked.len(), 1);
}

#[test]
fn test_channels_never_cross() {
    let records = vec![
        record("E1", "AccX", "warning", values(&[1.0, 0.0])),
        record("G1", "GyrY", "critical", values(&[1.0, 0.0])),
    ];
    let engine = engine_over(&records, 2);
    let diagnosis = engine
        .diagnose(&[QueryVector::new(Channel::GyrY, vec![1.0, 0.0])])
        .unwrap();
    assert_eq!(diagnosis.candidates.ranked.len(), 1);
    assert_eq!(diagnosis.candidates.ranked[0].channel, Channel::GyrY);
    assert_eq!(diagnosis.candidates.severity, Severity::Critical);
}

#[test]
fn test_severity_is_max_over_breakdown() {
    let records = vec![
        record("E1", "AccX", "warning", values(&[1.0, 0.0])),
        record("G1", "GyrY", "critical", values(&[0.6, 0.8])),
    ];
    let engine = engine_over(&records, 2);
    let queries = [
        QueryVector::new(Channel::AccX, vec![1.0, 0.0]),
        QueryVector::new(Channel::GyrY, vec![1.0, 0.0]),
    ];
    let diagnosis = engine.diagnose(&queries).unwrap();

    let ids: Vec<&str> = diagnosis
        .candidates
        .ranked
        .iter()
        .map(|c| c.knowledge_entry_id.as_str())
        .collect();
    assert_eq!(ids, vec!["E1", "G1"]);
    assert!((diagnosis.candidates.ranked[1].similarity - 60.0).abs() < 1e-3);
    assert_eq!(diagnosis.candidates.breakdown.len(), 2);
    assert_eq!(diagnosis.candidates.severity, Severity::Critical);

    // only E1 clears the report threshold
    assert_eq!(diagnosis.detected.ranked.len(), 1);
    assert_eq!(diagnosis.detected.severity, Severity::Warning);
}

#[test]
fn test_malformed_records_are_skipped_on_load() {
    let records = vec![
        record("good", "AccX", "normal", RawEmbedding::Text("[0.3, 0.4]".to_string())),
        record("nan", "AccX", "normal", RawEmbedding::Text("[nan, 0.1]".to_string())),
        record("zero", "AccX", "normal", values(&[0.0, 0.0])),
        record("short", "AccX", "normal", values(&[1.0])),
        record("chan", "MagX", "normal", values(&[1.0, 0.0])),
        record("sev", "AccX", "fatal", values(&[1.0, 0.0])),
    ];
    let base = KnowledgeBase::load(2, &records).unwrap();
    let report = base.store().load_report();
    assert_eq!(report.loaded, 1);
    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(skipped, vec!["nan", "zero", "short", "chan", "sev"]);

    let entry = base.store().get("good").unwrap();
    assert!(entry.embedding().is_unit());
}

#[test]
fn test_zero_query_fails_whole_request() {
    let records = vec![record("E1", "AccX", "warning", values(&[1.0, 0.0]))];
    let engine = engine_over(&records, 2);
    let queries = [
        QueryVector::new(Channel::AccX, vec![1.0, 0.0]),
        QueryVector::new(Channel::GyrX, vec![0.0, 0.0]),
    ];
    assert!(matches!(engine.diagnose(&queries), Err(Error::ZeroNormVector { .. })));
}

#[test]
fn test_aggregation_is_order_independent() {
    let records = vec![
        record("A", "AccX", "warning", values(&[1.0, 0.1])),
        record("B", "AccY", "normal", values(&[1.0, 0.1])),
        record("C", "GyrZ", "critical", values(&[0.1, 1.0])),
    ];
    let engine = engine_over(&records, 2);
    let mut queries = vec![
        QueryVector::new(Channel::AccX, vec![1.0, 0.1]),
        QueryVector::new(Channel::AccY, vec![1.0, 0.1]),
        QueryVector::new(Channel::GyrZ, vec![1.0, 1.0]),
    ];
    let forward = engine.diagnose(&queries).unwrap();
    queries.reverse();
    let backward = engine.diagnose(&queries).unwrap();
    assert_eq!(forward, backward);

    // equal scores fall back to channel name order
    assert_eq!(forward.candidates.ranked[0].channel, Channel::AccX);
    assert_eq!(forward.candidates.ranked[1].channel, Channel::AccY);
}

#[test]
fn test_reload_from_knowledge_file() {
    let dir = TempDir::new().unwrap();
    let file = KnowledgeFile::new(dir.path().join("knowledge.json"));
    file.write(&[record("E1", "AccX", "warning", values(&[1.0, 0.0]))])
        .unwrap();

    let engine = engine_over(&file.read().unwrap(), 2);
    let before = engine.snapshot();

    file.write(&[
        record("E1", "AccX", "warning", values(&[1.0, 0.0])),
        record("Z1", "AccZ", "critical", values(&[0.0, 1.0])),
    ])
    .unwrap();
    let report = engine.reload(&file.read().unwrap()).unwrap();
    assert_eq!(report.loaded, 2);
    assert_eq!(engine.generation(), 1);

    // the old snapshot is untouched
    assert_eq!(before.store().len(), 1);
    let diagnosis = engine
        .diagnose(&[QueryVector::new(Channel::AccZ, vec![0.0, 1.0])])
        .unwrap();
    assert_eq!(diagnosis.detected.severity, Severity::Critical);
}

#[test]
fn test_seeded_knowledge_base_recognizes_its_patterns() {
    let dir = TempDir::new().unwrap();
    let file = KnowledgeFile::new(dir.path().join("seeded.json"));
    let catalogue = PatternCatalogue::builtin().unwrap();
    let options = SeedOptions::default();
    let seeder = KnowledgeSeeder::with_options(Arc::new(StatsEmbedder), options);
    assert_eq!(seeder.seed(&catalogue, &file).unwrap(), 10);

    let records = file.read().unwrap();
    let engine = engine_over(&records, 6);
    assert_eq!(engine.snapshot().store().len(), 10);

    // regenerate the tremor signal and query with it
    let tremor = catalogue
        .iter()
        .find(|p| p.condition == "parkinsonian_tremor")
        .unwrap();
    let signal = motiondx::synth::generate(&tremor.pattern_stats, options.sample_count, options.seed).unwrap();
    let embedding = StatsEmbedder.embed_checked(Channel::GyrX, &signal).unwrap();

    let diagnosis = engine
        .diagnose(&[QueryVector::new(Channel::GyrX, embedding)])
        .unwrap();
    let top = diagnosis.detected.top().unwrap();
    assert_eq!(top.condition_type, "parkinsonian_tremor");
    assert!((top.similarity - 100.0).abs() < 1e-2);
    assert_eq!(diagnosis.detected.severity, Severity::Critical);
}

#[test]
fn test_report_from_diagnosis() {
    let records = vec![record("E1", "AccX", "warning", values(&[1.0, 0.0]))];
    let engine = engine_over(&records, 2);
    let samples = [0.5f32, -0.5, 0.5, -0.5];
    let query = QueryVector::new(Channel::AccX, vec![1.0, 0.0])
        .with_source_stats(SignalStats::compute(&samples).unwrap());
    let diagnosis = engine.diagnose(std::slice::from_ref(&query)).unwrap();

    let summary = MatchSummary::new(&diagnosis.detected, engine.config().report_threshold)
        .with_channel_stats(Channel::AccX, query.source_stats.unwrap());
    let rendered = summary.render();
    assert!(rendered.contains("E1 diagnosis (Severity: warning, Confidence: 100.0%)"));
    assert!(rendered.contains("AccX:"));

    let report = DiagnosisReport::generate(&TemplateReportGenerator, &summary).unwrap();
    assert_eq!(report.severity_level, Severity::Warning);
    assert_eq!(KeywordClassifier.classify(&report.overall_diagnosis), Severity::Warning);
    assert!(!report.recommendations.is_empty());
}
