use crate::matcher::MatchCandidate;
use crate::{Channel, Severity};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Merged view of one diagnosis request's matches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Every distinct candidate, best first
    pub ranked: Vec<MatchCandidate>,
    /// Best candidate per channel, in canonical channel order
    pub breakdown: BTreeMap<Channel, MatchCandidate>,
    /// Highest severity among the breakdown candidates
    pub severity: Severity,
}

impl AggregatedResult {
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn top(&self) -> Option<&MatchCandidate> {
        self.ranked.first()
    }
}

/// Similarity descending, then channel name, then entry id.
fn rank_order(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.channel.as_str().cmp(b.channel.as_str()))
        .then_with(|| a.knowledge_entry_id.cmp(&b.knowledge_entry_id))
}

/// Combine per-channel match lists.
///
/// Pure and order-independent: the output depends only on the multiset of
/// candidates, never on map iteration or query completion order. When the
/// same entry appears more than once only its best-scoring copy is kept.
pub fn aggregate<I>(per_channel: I) -> AggregatedResult
where
    I: IntoIterator<Item = (Channel, Vec<MatchCandidate>)>,
{
    let mut all: Vec<MatchCandidate> = per_channel
        .into_iter()
        .flat_map(|(_, candidates)| candidates)
        .collect();
    all.sort_by(rank_order);

    let mut seen = AHashSet::with_capacity(all.len());
    all.retain(|c| seen.insert((c.channel, c.knowledge_entry_id.clone())));

    let mut breakdown = BTreeMap::new();
    for candidate in &all {
        breakdown
            .entry(candidate.channel)
            .or_insert_with(|| candidate.clone());
    }

    let severity = breakdown
        .values()
        .map(|c| c.severity)
        .max()
        .unwrap_or_default();

    AggregatedResult {
        ranked: all,
        breakdown,
        severity,
    }
}
