use crate::entry::{KnowledgeEntry, RawKnowledgeRecord};
use crate::{Channel, Error, Result};
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A record that was left out of the store and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub id: String,
    pub reason: String,
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub per_channel: BTreeMap<Channel, usize>,
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    pub fn has_warnings(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Arena of validated knowledge entries, grouped by channel.
///
/// Entries keep their insertion order both in the arena and within each
/// channel group; that order is the tie-break for equal scores.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    dimension: usize,
    entries: Vec<KnowledgeEntry>,
    by_channel: [Vec<usize>; Channel::COUNT],
    ids: AHashMap<Arc<str>, usize>,
    report: LoadReport,
}

impl KnowledgeStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
            by_channel: Default::default(),
            ids: AHashMap::new(),
            report: LoadReport::default(),
        }
    }

    /// Validate and collect raw records.
    ///
    /// Records with an unparsable, wrongly sized, non-finite or zero-norm
    /// embedding (or unknown channel/severity, bad stats, duplicate id) are
    /// skipped with a warning; the load itself never fails.
    pub fn load<'a, I>(dimension: usize, records: I) -> Self
    where
        I: IntoIterator<Item = &'a RawKnowledgeRecord>,
    {
        let mut store = Self::new(dimension);
        let mut skipped = Vec::new();

        for record in records {
            let outcome = record
                .to_entry(dimension)
                .and_then(|entry| store.insert(entry));
            if let Err(e) = outcome {
                let id = record.id.to_string();
                warn!(id = %id, error = %e, "skipping knowledge record");
                skipped.push(SkippedRecord {
                    id,
                    reason: e.to_string(),
                });
            }
        }

        let per_channel = store.channel_counts();
        for (channel, count) in &per_channel {
            info!(channel = %channel, count, "loaded knowledge entries");
        }
        store.report = LoadReport {
            loaded: store.len(),
            per_channel,
            skipped,
        };
        store
    }

    /// Add a single validated entry.
    pub fn insert(&mut self, entry: KnowledgeEntry) -> Result<()> {
        if entry.dim() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: entry.dim(),
            });
        }
        if self.ids.contains_key(entry.id()) {
            return Err(Error::DuplicateEntry(entry.id().to_string()));
        }

        let pos = self.entries.len();
        self.ids.insert(entry.shared_id(), pos);
        self.by_channel[entry.channel().index()].push(pos);
        self.entries.push(entry);
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arena slot lookup
    pub fn entry(&self, pos: usize) -> Option<&KnowledgeEntry> {
        self.entries.get(pos)
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeEntry> {
        self.ids.get(id).map(|&pos| &self.entries[pos])
    }

    /// Entries of one channel, in insertion order
    pub fn entries_for_channel(&self, channel: Channel) -> impl Iterator<Item = &KnowledgeEntry> + '_ {
        self.by_channel[channel.index()]
            .iter()
            .map(move |&pos| &self.entries[pos])
    }

    /// Arena slots of one channel, in insertion order
    pub fn slots_for_channel(&self, channel: Channel) -> &[usize] {
        &self.by_channel[channel.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeEntry> + '_ {
        self.entries.iter()
    }

    /// Non-empty channels with their entry counts
    pub fn channel_counts(&self) -> BTreeMap<Channel, usize> {
        Channel::ALL
            .iter()
            .filter_map(|&c| {
                let n = self.by_channel[c.index()].len();
                (n > 0).then_some((c, n))
            })
            .collect()
    }

    /// Report from the `load` that produced this store
    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{RawEmbedding, RecordId};

    fn record(id: &str, channel: &str, embedding: RawEmbedding) -> RawKnowledgeRecord {
        RawKnowledgeRecord {
            id: RecordId::from(id),
            channel_name: channel.to_string(),
            diagnosis_text: format!("diagnosis {}", id),
            severity: "warning".to_string(),
            condition_type: "test".to_string(),
            pattern_embedding: embedding,
            pattern_stats: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_load_groups_by_channel() {
        let records = vec![
            record("a", "AccX", vec![1.0, 0.0].into()),
            record("b", "GyrY", vec![0.0, 2.0].into()),
            record("c", "AccX", RawEmbedding::Text("[0.5,0.5]".into())),
        ];
        let store = KnowledgeStore::load(2, &records);

        assert_eq!(store.len(), 3);
        let acc: Vec<&str> = store.entries_for_channel(Channel::AccX).map(|e| e.id()).collect();
        assert_eq!(acc, vec!["a", "c"]);
        assert_eq!(store.entries_for_channel(Channel::AccY).count(), 0);
        assert_eq!(store.load_report().per_channel.get(&Channel::AccX), Some(&2));
        assert!(!store.load_report().has_warnings());
        assert!(store.iter().all(|e| e.embedding().is_unit()));
    }

    #[test]
    fn test_load_skips_bad_records_and_continues() {
        let records = vec![
            record("bad-nan", "AccX", RawEmbedding::Text("[nan, 0.1]".into())),
            record("ok", "AccX", vec![1.0, 0.0].into()),
            record("zero", "AccX", vec![0.0, 0.0].into()),
            record("short", "AccX", vec![1.0].into()),
            record("chan", "Magnet", vec![1.0, 0.0].into()),
            record("ok", "AccY", vec![1.0, 0.0].into()),
        ];
        let store = KnowledgeStore::load(2, &records);

        assert_eq!(store.len(), 1);
        assert!(store.get("ok").is_some());
        let report = store.load_report();
        assert_eq!(report.loaded, 1);
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, vec!["bad-nan", "zero", "short", "chan", "ok"]);
    }

    #[test]
    fn test_insert_rejects_dimension_and_duplicates() {
        let mut store = KnowledgeStore::new(3);
        let e = KnowledgeEntry::new("x", Channel::GyrZ, vec![1.0, 0.0, 0.0]).unwrap();
        store.insert(e.clone()).unwrap();
        assert_eq!(store.insert(e), Err(Error::DuplicateEntry("x".into())));

        let wrong = KnowledgeEntry::new("y", Channel::GyrZ, vec![1.0, 0.0]).unwrap();
        assert_eq!(
            store.insert(wrong),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        );
    }
}
