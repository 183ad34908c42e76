use crate::error::{Result, StorageError};
use motiondx_core::{Channel, PatternStats, Severity};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_PATTERNS: &str = include_str!("../data/patterns.json");

/// A condition to synthesize: where it shows up, what it means, and the
/// statistic ranges its synthetic signal should land in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub channel: Channel,
    pub diagnosis: String,
    pub severity: Severity,
    pub condition: String,
    #[serde(default)]
    pub pattern_stats: PatternStats,
}

/// Ordered list of pattern definitions used to seed a knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternCatalogue {
    patterns: Vec<PatternDefinition>,
}

impl PatternCatalogue {
    pub fn new(patterns: Vec<PatternDefinition>) -> Self {
        Self { patterns }
    }

    /// The ten gait conditions shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_PATTERNS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let patterns: Vec<PatternDefinition> = serde_json::from_str(json)?;
        if patterns.is_empty() {
            return Err(StorageError::InvalidCatalogue("no patterns".to_string()));
        }
        Ok(Self { patterns })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn patterns(&self) -> &[PatternDefinition] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternDefinition> + '_ {
        self.patterns.iter()
    }
}
