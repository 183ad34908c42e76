use crate::catalogue::PatternCatalogue;
use crate::error::Result;
use crate::file::KnowledgeFile;
use motiondx_core::synth::{self, DEFAULT_SAMPLE_COUNT, DEFAULT_SEED};
use motiondx_core::{Embedder, RawEmbedding, RawKnowledgeRecord, RecordId};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    pub sample_count: usize,
    /// Used for every pattern, so a pattern's signal does not depend on its
    /// position in the catalogue.
    pub seed: u64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            seed: DEFAULT_SEED,
        }
    }
}

/// Builds knowledge records from a pattern catalogue: synthesize a signal per
/// pattern, embed it, and attach the pattern's diagnosis.
pub struct KnowledgeSeeder<E: Embedder> {
    embedder: E,
    options: SeedOptions,
}

impl<E: Embedder> KnowledgeSeeder<E> {
    pub fn new(embedder: E) -> Self {
        Self::with_options(embedder, SeedOptions::default())
    }

    pub fn with_options(embedder: E, options: SeedOptions) -> Self {
        Self { embedder, options }
    }

    pub fn options(&self) -> SeedOptions {
        self.options
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// One record per catalogue pattern, in catalogue order.
    pub fn build_records(&self, catalogue: &PatternCatalogue) -> Result<Vec<RawKnowledgeRecord>> {
        let mut records = Vec::with_capacity(catalogue.len());
        for pattern in catalogue.iter() {
            let signal =
                synth::generate(&pattern.pattern_stats, self.options.sample_count, self.options.seed)?;
            let embedding = self.embedder.embed_checked(pattern.channel, &signal)?;

            records.push(RawKnowledgeRecord {
                id: RecordId::from(Uuid::new_v4().to_string()),
                channel_name: pattern.channel.as_str().to_string(),
                diagnosis_text: pattern.diagnosis.clone(),
                severity: pattern.severity.as_str().to_string(),
                condition_type: pattern.condition.clone(),
                pattern_embedding: RawEmbedding::from(embedding),
                pattern_stats: serde_json::to_value(&pattern.pattern_stats)?,
            });
            info!(
                channel = %pattern.channel,
                condition = %pattern.condition,
                "seeded pattern"
            );
        }
        Ok(records)
    }

    /// Build records and write them to `file`, replacing its contents.
    pub fn seed(&self, catalogue: &PatternCatalogue, file: &KnowledgeFile) -> Result<usize> {
        let records = self.build_records(catalogue)?;
        file.write(&records)?;
        info!(records = records.len(), path = %file.path().display(), "knowledge base seeded");
        Ok(records.len())
    }
}
