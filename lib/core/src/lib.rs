//! # motiondx Core
//!
//! Diagnosis retrieval over short multichannel motion signals.
//!
//! This crate provides the data structures and algorithms:
//!
//! - [`KnowledgeStore`] - Validated, unit-normalized knowledge entries grouped by channel
//! - [`VectorIndex`] - One exact inner-product index per [`Channel`]
//! - [`SimilarityMatcher`] - Channel-scoped top-k with percent-similarity thresholds
//! - [`aggregate`] - Global ranking, per-channel breakdown and overall severity
//! - [`synth::generate`] - Seeded synthetic signals for seeding the knowledge base
//! - [`DiagnosisEngine`] - Serves queries from an atomically swappable snapshot
//!
//! ## Example
//!
//! ```rust
//! use motiondx_core::{Channel, DiagnosisEngine, EngineConfig, KnowledgeBase, KnowledgeEntry,
//!     KnowledgeStore, QueryVector, Severity};
//!
//! let mut store = KnowledgeStore::new(3);
//! let entry = KnowledgeEntry::new("left-limp", Channel::AccX, vec![1.0, 0.0, 0.0])
//!     .unwrap()
//!     .with_diagnosis("Limping to the left", Severity::Warning, "left_limp");
//! store.insert(entry).unwrap();
//!
//! let config = EngineConfig { dimension: 3, ..EngineConfig::default() };
//! let engine = DiagnosisEngine::new(config, KnowledgeBase::build(store).unwrap()).unwrap();
//!
//! let query = QueryVector::new(Channel::AccX, vec![0.9, 0.1, 0.0]);
//! let diagnosis = engine.diagnose(&[query]).unwrap();
//! assert_eq!(diagnosis.detected.severity, Severity::Warning);
//! ```

pub mod aggregate;
pub mod channel;
pub mod embedder;
pub mod engine;
pub mod entry;
pub mod error;
pub mod index;
pub mod matcher;
pub mod stats;
pub mod store;
pub mod synth;
pub mod vector;

/// Inner-product kernels
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
pub mod simd;

pub use aggregate::{aggregate, AggregatedResult};
pub use channel::{Channel, Severity};
pub use embedder::Embedder;
pub use engine::{Diagnosis, DiagnosisEngine, EngineConfig, KnowledgeBase};
pub use entry::{KnowledgeEntry, RawEmbedding, RawKnowledgeRecord, RecordId};
pub use error::{Error, Result};
pub use index::{ChannelIndex, Neighbor, VectorIndex};
pub use matcher::{MatchCandidate, QueryVector, SimilarityMatcher};
pub use stats::{PatternStats, SignalStats, StatRange};
pub use store::{KnowledgeStore, LoadReport, SkippedRecord};
pub use vector::Vector;
