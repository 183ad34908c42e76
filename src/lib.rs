//! # motiondx
//!
//! Diagnosis retrieval for six-axis gait recordings (three accelerometer and
//! three gyroscope channels).
//!
//! Each channel's signal is embedded externally and matched, within that
//! channel only, against a knowledge base of labelled condition patterns.
//! Matches from all channels are merged into one ranking with a per-channel
//! breakdown and an overall severity.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! motiondx seed --output knowledge.json --embedder-url http://localhost:9000/embed
//! motiondx serve --knowledge knowledge.json --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use motiondx::prelude::*;
//!
//! let records = vec![RawKnowledgeRecord {
//!     id: RecordId::from("tremor"),
//!     channel_name: "GyrX".to_string(),
//!     diagnosis_text: "Tremor detected".to_string(),
//!     severity: "warning".to_string(),
//!     condition_type: "tremor_x".to_string(),
//!     pattern_embedding: RawEmbedding::Text("[0.6, 0.8]".to_string()),
//!     pattern_stats: serde_json::Value::Null,
//! }];
//!
//! let config = EngineConfig { dimension: 2, ..EngineConfig::default() };
//! let engine = DiagnosisEngine::new(config, KnowledgeBase::load(2, &records).unwrap()).unwrap();
//!
//! let diagnosis = engine
//!     .diagnose(&[QueryVector::new(Channel::GyrX, vec![0.6, 0.8])])
//!     .unwrap();
//! assert_eq!(diagnosis.detected.ranked[0].knowledge_entry_id, "tremor");
//! ```
//!
//! ## Crate Structure
//!
//! - `motiondx-core` - Knowledge store, per-channel index, matcher, aggregator, signal synthesis
//! - `motiondx-storage` - Knowledge file, pattern catalogue, seeding, remote embedder
//! - `motiondx-report` - Match summaries and report classification
//! - `motiondx-api` - REST API

// Re-export core types
pub use motiondx_core::{
    aggregate, AggregatedResult, Channel, Diagnosis, DiagnosisEngine, Embedder, EngineConfig,
    Error, KnowledgeBase, KnowledgeEntry, KnowledgeStore, LoadReport, MatchCandidate,
    PatternStats, QueryVector, RawEmbedding, RawKnowledgeRecord, RecordId, Result, Severity,
    SignalStats, SimilarityMatcher, VectorIndex,
};

// Re-export storage
pub use motiondx_storage::{
    KnowledgeFile, KnowledgeSeeder, PatternCatalogue, PatternDefinition, RemoteEmbedder,
    RemoteEmbedderConfig, SeedOptions, StorageError,
};

// Re-export report
pub use motiondx_report::{
    DiagnosisReport, KeywordClassifier, MatchSummary, RecommendationExtractor, ReportGenerator,
    SeverityClassifier, TemplateReportGenerator,
};

// Re-export API
pub use motiondx_api::{AppState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        aggregate, AggregatedResult, Channel, Diagnosis, DiagnosisEngine, Embedder, EngineConfig,
        Error, KnowledgeBase, KnowledgeFile, MatchCandidate, QueryVector, RawEmbedding,
        RawKnowledgeRecord, RecordId, Result, Severity,
    };
}

/// Seeded synthetic signal generation
pub mod synth {
    pub use motiondx_core::synth::{generate, DEFAULT_SAMPLE_COUNT, DEFAULT_SEED, PEAK_COUNT};
}
