use crate::aggregate::{aggregate, AggregatedResult};
use crate::entry::RawKnowledgeRecord;
use crate::index::VectorIndex;
use crate::matcher::{MatchCandidate, QueryVector, SimilarityMatcher};
use crate::store::{KnowledgeStore, LoadReport};
use crate::{Channel, Error, Result};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Matching parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Embedding dimension shared by knowledge and query vectors
    pub dimension: usize,
    /// Neighbors fetched per channel query
    pub top_k: usize,
    /// Percent similarity for gathering plausible candidates
    pub candidate_threshold: f32,
    /// Percent similarity for reporting a detected condition
    pub report_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimension: 256,
            top_k: 5,
            candidate_threshold: 10.0,
            report_threshold: 80.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::InvalidConfig("dimension must be positive".into()));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidTopK);
        }
        for (name, value) in [
            ("candidate_threshold", self.candidate_threshold),
            ("report_threshold", self.report_threshold),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("{} must be finite", name)));
            }
        }
        Ok(())
    }
}

/// Immutable snapshot: the entry arena and the per-channel index over it.
#[derive(Debug)]
pub struct KnowledgeBase {
    store: KnowledgeStore,
    index: VectorIndex,
}

impl KnowledgeBase {
    pub fn build(store: KnowledgeStore) -> Result<Self> {
        let index = VectorIndex::build(&store)?;
        Ok(Self { store, index })
    }

    /// Load raw records (skipping invalid ones) and build the index.
    pub fn load<'a, I>(dimension: usize, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a RawKnowledgeRecord>,
    {
        Self::build(KnowledgeStore::load(dimension, records))
    }

    pub fn empty(dimension: usize) -> Self {
        Self {
            store: KnowledgeStore::new(dimension),
            index: VectorIndex::empty(dimension),
        }
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    pub fn matcher(&self) -> SimilarityMatcher<'_> {
        SimilarityMatcher::new(&self.store, &self.index)
    }
}

/// Matches for one request at both thresholds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Candidates above the candidate threshold
    pub candidates: AggregatedResult,
    /// Candidates above the report threshold
    pub detected: AggregatedResult,
}

impl Diagnosis {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.detected.is_empty()
    }
}

/// Serves diagnosis queries from the current knowledge base and swaps in
/// rebuilt bases atomically.
///
/// Queries clone the current `Arc` and run without holding the lock, so a
/// refresh never becomes visible in the middle of a query.
pub struct DiagnosisEngine {
    config: EngineConfig,
    current: RwLock<Arc<KnowledgeBase>>,
    generation: AtomicU64,
}

impl DiagnosisEngine {
    pub fn new(config: EngineConfig, base: KnowledgeBase) -> Result<Self> {
        config.validate()?;
        check_dimension(&config, &base)?;
        info!(
            entries = base.store().len(),
            dimension = config.dimension,
            "diagnosis engine ready"
        );
        Ok(Self {
            config,
            current: RwLock::new(Arc::new(base)),
            generation: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The base queries are currently served from
    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        self.current.read().clone()
    }

    /// Number of successful publishes since construction
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the served base. In-flight queries finish on the old one.
    pub fn publish(&self, base: KnowledgeBase) -> Result<()> {
        check_dimension(&self.config, &base)?;
        let entries = base.store().len();
        *self.current.write() = Arc::new(base);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        info!(entries, generation, "published knowledge base");
        Ok(())
    }

    /// Build a new base from `records` and publish it. On error the previous
    /// base keeps serving.
    pub fn reload<'a, I>(&self, records: I) -> Result<LoadReport>
    where
        I: IntoIterator<Item = &'a RawKnowledgeRecord>,
    {
        let base = KnowledgeBase::load(self.config.dimension, records)?;
        let report = base.store().load_report().clone();
        self.publish(base)?;
        Ok(report)
    }

    /// Run every channel query in parallel at `threshold`.
    pub fn match_channels(
        &self,
        queries: &[QueryVector],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<(Channel, Vec<MatchCandidate>)>> {
        let base = self.snapshot();
        let matcher = base.matcher();
        queries
            .par_iter()
            .map(|q| {
                matcher
                    .find_matches(q, top_k, threshold)
                    .map(|found| (q.channel, found))
            })
            .collect()
    }

    pub fn diagnose(&self, queries: &[QueryVector]) -> Result<Diagnosis> {
        self.diagnose_with(queries, &self.config)
    }

    /// Like [`DiagnosisEngine::diagnose`] with per-call matching parameters.
    /// `config.dimension` must equal the engine's.
    pub fn diagnose_with(&self, queries: &[QueryVector], config: &EngineConfig) -> Result<Diagnosis> {
        config.validate()?;
        if config.dimension != self.config.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimension,
                actual: config.dimension,
            });
        }

        // one query per channel at the looser threshold, then split
        let floor = config.candidate_threshold.min(config.report_threshold);
        let per_channel = self.match_channels(queries, config.top_k, floor)?;

        let above = |threshold: f32| {
            per_channel
                .iter()
                .map(|(channel, found)| {
                    let kept = found
                        .iter()
                        .filter(|c| c.similarity >= threshold)
                        .cloned()
                        .collect::<Vec<_>>();
                    (*channel, kept)
                })
                .collect::<Vec<_>>()
        };

        let diagnosis = Diagnosis {
            candidates: aggregate(above(config.candidate_threshold)),
            detected: aggregate(above(config.report_threshold)),
        };
        debug!(
            channels = queries.len(),
            candidates = diagnosis.candidates.ranked.len(),
            detected = diagnosis.detected.ranked.len(),
            "diagnosis matched"
        );
        Ok(diagnosis)
    }
}

fn check_dimension(config: &EngineConfig, base: &KnowledgeBase) -> Result<()> {
    if base.dimension() != config.dimension {
        return Err(Error::DimensionMismatch {
            expected: config.dimension,
            actual: base.dimension(),
        });
    }
    Ok(())
}
