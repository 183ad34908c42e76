use crate::entry::KnowledgeEntry;
use crate::store::KnowledgeStore;
use crate::{Channel, Error, Result};
use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A scored hit: the knowledge store slot and its inner product with the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub slot: usize,
    pub score: f32,
}

/// Heap key: higher score wins, then earlier insertion.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Ranked {
    score: OrderedFloat<f32>,
    order: usize,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Exact inner-product index over the unit embeddings of a single channel.
///
/// Vectors live in one contiguous buffer in insertion order. The index is
/// never mutated after `build`.
#[derive(Debug, Clone)]
pub struct ChannelIndex {
    dim: usize,
    slots: Vec<usize>,
    vectors: Vec<f32>,
}

impl ChannelIndex {
    /// Build from `(slot, entry)` pairs. Every embedding must have `dim`
    /// components and already be unit length.
    pub fn build<'a, I>(dim: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, &'a KnowledgeEntry)>,
    {
        let mut slots = Vec::new();
        let mut vectors = Vec::new();
        for (slot, entry) in entries {
            if entry.dim() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: entry.dim(),
                });
            }
            debug_assert!(entry.embedding().is_unit());
            slots.push(slot);
            vectors.extend_from_slice(entry.embedding().as_slice());
        }
        Ok(Self { dim, slots, vectors })
    }

    #[inline]
    fn vector(&self, i: usize) -> &[f32] {
        &self.vectors[i * self.dim..(i + 1) * self.dim]
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Up to `k` neighbors by descending inner product; equal scores keep
    /// insertion order.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(Error::InvalidTopK);
        }
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }

        // min-heap holding the best k seen so far; the root is the weakest
        let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(k.min(self.len()) + 1);
        for order in 0..self.len() {
            let score = crate::simd::dot_product_simd(vector, self.vector(order));
            let candidate = Ranked {
                score: OrderedFloat(score),
                order,
            };
            if heap.len() < k {
                heap.push(Reverse(candidate));
            } else if let Some(Reverse(weakest)) = heap.peek() {
                if candidate > *weakest {
                    heap.pop();
                    heap.push(Reverse(candidate));
                }
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(r)| Neighbor {
                slot: self.slots[r.order],
                score: r.score.into_inner(),
            })
            .collect())
    }
}

/// One [`ChannelIndex`] per channel, built from a whole knowledge store.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dim: usize,
    channels: Vec<ChannelIndex>,
}

impl VectorIndex {
    pub fn build(store: &KnowledgeStore) -> Result<Self> {
        let dim = store.dimension();
        let channels = Channel::ALL
            .iter()
            .map(|&channel| {
                let members = store
                    .slots_for_channel(channel)
                    .iter()
                    .copied()
                    .zip(store.entries_for_channel(channel));
                ChannelIndex::build(dim, members)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { dim, channels })
    }

    /// Index with no entries on any channel
    pub fn empty(dim: usize) -> Self {
        let channels = Channel::ALL
            .iter()
            .map(|_| ChannelIndex {
                dim,
                slots: Vec::new(),
                vectors: Vec::new(),
            })
            .collect();
        Self { dim, channels }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn channel(&self, channel: Channel) -> &ChannelIndex {
        &self.channels[channel.index()]
    }

    /// Top-`k` restricted to `channel`. `vector` must be unit length.
    pub fn query(&self, channel: Channel, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.channel(channel).query(vector, k)
    }

    pub fn len(&self) -> usize {
        self.channels.iter().map(ChannelIndex::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
