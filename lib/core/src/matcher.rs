use crate::index::VectorIndex;
use crate::stats::{PatternStats, SignalStats};
use crate::store::KnowledgeStore;
use crate::vector::Vector;
use crate::{Channel, Error, Result, Severity};
use serde::{Deserialize, Serialize};

/// A per-channel query embedding, as produced by the external embedder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryVector {
    pub channel: Channel,
    pub embedding: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_stats: Option<SignalStats>,
}

impl QueryVector {
    pub fn new(channel: Channel, embedding: Vec<f32>) -> Self {
        Self {
            channel,
            embedding,
            source_stats: None,
        }
    }

    #[must_use]
    pub fn with_source_stats(mut self, stats: SignalStats) -> Self {
        self.source_stats = Some(stats);
        self
    }

    /// Unit-length copy of the embedding
    pub fn normalized(&self) -> Result<Vector> {
        let vector = Vector::from_slice(&self.embedding);
        if let Some(pos) = vector.first_non_finite() {
            return Err(Error::MalformedEmbedding {
                id: format!("query {}", self.channel),
                reason: format!("component {} is not finite", pos),
            });
        }
        let normalized = vector.normalized(&format!("query {}", self.channel))?;
        Ok(normalized)
    }
}

/// A knowledge entry matched by a query, with its similarity on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub channel: Channel,
    pub knowledge_entry_id: String,
    pub diagnosis_text: String,
    pub severity: Severity,
    pub condition_type: String,
    pub similarity: f32,
    pub pattern_stats: PatternStats,
}

/// Channel-constrained similarity search over a built index.
#[derive(Clone, Copy)]
pub struct SimilarityMatcher<'a> {
    store: &'a KnowledgeStore,
    index: &'a VectorIndex,
}

impl<'a> SimilarityMatcher<'a> {
    pub fn new(store: &'a KnowledgeStore, index: &'a VectorIndex) -> Self {
        Self { store, index }
    }

    /// Candidates for `query.channel` whose similarity is at least
    /// `threshold_percent`, best first.
    ///
    /// An empty result means nothing cleared the threshold. A zero-norm query
    /// is an error, not an empty result.
    pub fn find_matches(
        &self,
        query: &QueryVector,
        k: usize,
        threshold_percent: f32,
    ) -> Result<Vec<MatchCandidate>> {
        if query.embedding.len() != self.index.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.index.dim(),
                actual: query.embedding.len(),
            });
        }
        let normalized = query.normalized()?;
        let neighbors = self.index.query(query.channel, normalized.as_slice(), k)?;

        Ok(neighbors
            .into_iter()
            .map(|n| (n.slot, n.score * 100.0))
            .filter(|&(_, similarity)| similarity >= threshold_percent)
            .filter_map(|(slot, similarity)| {
                let entry = self.store.entry(slot)?;
                Some(MatchCandidate {
                    channel: entry.channel(),
                    knowledge_entry_id: entry.id().to_string(),
                    diagnosis_text: entry.diagnosis_text().to_string(),
                    severity: entry.severity(),
                    condition_type: entry.condition_type().to_string(),
                    similarity,
                    pattern_stats: entry.pattern_stats().clone(),
                })
            })
            .collect())
    }
}
