use crate::stats::PatternStats;
use crate::vector::Vector;
use crate::{Channel, Error, Result, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One labeled reference pattern in the knowledge base.
///
/// The embedding is unit length for every constructed entry.
#[derive(Debug, Clone)]
pub struct KnowledgeEntry {
    id: Arc<str>,
    channel: Channel,
    embedding: Vector,
    diagnosis_text: String,
    severity: Severity,
    condition_type: String,
    pattern_stats: PatternStats,
}

impl KnowledgeEntry {
    /// Create an entry with default metadata, normalizing `embedding`.
    ///
    /// Non-finite components are a `MalformedEmbedding`; a zero norm is a
    /// `ZeroNormVector`.
    pub fn new(id: impl Into<Arc<str>>, channel: Channel, embedding: Vec<f32>) -> Result<Self> {
        let id = id.into();
        let mut embedding = Vector::new(embedding);
        if let Some(pos) = embedding.first_non_finite() {
            return Err(Error::MalformedEmbedding {
                id: id.to_string(),
                reason: format!("component {} is not finite", pos),
            });
        }
        embedding.normalize(&format!("knowledge entry {}", id))?;
        Ok(Self {
            id,
            channel,
            embedding,
            diagnosis_text: String::new(),
            severity: Severity::Normal,
            condition_type: String::new(),
            pattern_stats: PatternStats::default(),
        })
    }

    #[must_use]
    pub fn with_diagnosis(
        mut self,
        diagnosis_text: impl Into<String>,
        severity: Severity,
        condition_type: impl Into<String>,
    ) -> Self {
        self.diagnosis_text = diagnosis_text.into();
        self.severity = severity;
        self.condition_type = condition_type.into();
        self
    }

    #[must_use]
    pub fn with_pattern_stats(mut self, pattern_stats: PatternStats) -> Self {
        self.pattern_stats = pattern_stats;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn shared_id(&self) -> Arc<str> {
        self.id.clone()
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn embedding(&self) -> &Vector {
        &self.embedding
    }

    pub fn dim(&self) -> usize {
        self.embedding.dim()
    }

    pub fn diagnosis_text(&self) -> &str {
        &self.diagnosis_text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn condition_type(&self) -> &str {
        &self.condition_type
    }

    pub fn pattern_stats(&self) -> &PatternStats {
        &self.pattern_stats
    }
}

/// Record identifier as the storage layer hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(u64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => write!(f, "{}", s),
            RecordId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

/// Embedding as serialized by the storage layer: a numeric array, or the
/// legacy bracketed text form `"[0.1,0.2,...]"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEmbedding {
    Values(Vec<f32>),
    Text(String),
    /// Anything else; always rejected when parsed.
    Other(serde_json::Value),
}

impl RawEmbedding {
    /// Decode into components. `id` is only used for error reporting.
    pub fn parse(&self, id: &str) -> Result<Vec<f32>> {
        let values = match self {
            RawEmbedding::Values(values) => values.clone(),
            RawEmbedding::Text(text) => parse_bracketed(id, text)?,
            RawEmbedding::Other(value) => {
                return Err(malformed(id, format!("unsupported embedding form: {}", value)));
            }
        };
        if let Some(pos) = values.iter().position(|x| !x.is_finite()) {
            return Err(malformed(id, format!("component {} is not finite", pos)));
        }
        Ok(values)
    }
}

impl From<Vec<f32>> for RawEmbedding {
    fn from(values: Vec<f32>) -> Self {
        RawEmbedding::Values(values)
    }
}

fn parse_bracketed(id: &str, text: &str) -> Result<Vec<f32>> {
    let body = text.trim().trim_matches(|c| c == '[' || c == ']');
    body.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f32>()
                .map_err(|_| malformed(id, format!("cannot parse component {:?}", part)))
        })
        .collect()
}

fn malformed(id: &str, reason: String) -> Error {
    Error::MalformedEmbedding {
        id: id.to_string(),
        reason,
    }
}

fn default_severity() -> String {
    Severity::Normal.as_str().to_string()
}

/// A knowledge record before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawKnowledgeRecord {
    pub id: RecordId,
    #[serde(alias = "channel")]
    pub channel_name: String,
    #[serde(default)]
    pub diagnosis_text: String,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub condition_type: String,
    pub pattern_embedding: RawEmbedding,
    #[serde(default)]
    pub pattern_stats: serde_json::Value,
}

impl RawKnowledgeRecord {
    /// Validate into an entry of the given embedding dimension.
    pub fn to_entry(&self, dimension: usize) -> Result<KnowledgeEntry> {
        let id = self.id.to_string();
        let channel: Channel = self.channel_name.parse()?;
        let severity: Severity = self.severity.parse()?;
        let pattern_stats = PatternStats::from_value(&self.pattern_stats)?;

        let values = self.pattern_embedding.parse(&id)?;
        if values.len() != dimension {
            return Err(malformed(
                &id,
                format!("expected {} components, got {}", dimension, values.len()),
            ));
        }

        Ok(KnowledgeEntry::new(id, channel, values)?
            .with_diagnosis(self.diagnosis_text.clone(), severity, self.condition_type.clone())
            .with_pattern_stats(pattern_stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_is_normalized() {
        let entry = KnowledgeEntry::new("e1", Channel::AccX, vec![2.0, 0.0, 0.0]).unwrap();
        assert!(entry.embedding().is_unit());
        assert_eq!(entry.embedding().as_slice(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_entry_rejects_zero_and_non_finite() {
        assert!(matches!(
            KnowledgeEntry::new("z", Channel::AccX, vec![0.0, 0.0]),
            Err(Error::ZeroNormVector { .. })
        ));
        assert!(matches!(
            KnowledgeEntry::new("n", Channel::AccX, vec![f32::INFINITY, 0.0]),
            Err(Error::MalformedEmbedding { .. })
        ));
    }

    #[test]
    fn test_entry_accepts_extreme_magnitudes() {
        let big = KnowledgeEntry::new("big", Channel::AccX, vec![3e19, 4e19]).unwrap();
        assert!(big.embedding().is_unit());
        let tiny = KnowledgeEntry::new("tiny", Channel::AccX, vec![1e-25, 0.0]).unwrap();
        assert_eq!(tiny.embedding().as_slice(), &[1.0, 0.0]);
    }

    #[test]
    fn test_parse_text_embedding() {
        let raw = RawEmbedding::Text("[0.1, 0.2,0.3]".to_string());
        assert_eq!(raw.parse("x").unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_parse_text_embedding_rejects_nan_and_garbage() {
        let nan = RawEmbedding::Text("[nan, 0.1]".to_string());
        assert!(matches!(nan.parse("x"), Err(Error::MalformedEmbedding { .. })));

        let garbage = RawEmbedding::Text("[0.1, abc]".to_string());
        assert!(matches!(garbage.parse("x"), Err(Error::MalformedEmbedding { .. })));

        let empty = RawEmbedding::Text("[]".to_string());
        assert!(empty.parse("x").is_err());
    }

    #[test]
    fn test_raw_embedding_untagged_forms() {
        let values: RawEmbedding = serde_json::from_value(json!([1.0, 2.0])).unwrap();
        assert_eq!(values, RawEmbedding::Values(vec![1.0, 2.0]));

        let text: RawEmbedding = serde_json::from_value(json!("[1.0,2.0]")).unwrap();
        assert_eq!(text.parse("x").unwrap(), vec![1.0, 2.0]);

        let other: RawEmbedding = serde_json::from_value(json!({"v": 1})).unwrap();
        assert!(other.parse("x").is_err());
    }

    #[test]
    fn test_record_to_entry() {
        let record: RawKnowledgeRecord = serde_json::from_value(json!({
            "id": 7,
            "channel_name": "GyrY",
            "diagnosis_text": "Lateral instability observed",
            "severity": "critical",
            "condition_type": "lateral_instability",
            "pattern_embedding": "[3.0,4.0]",
            "pattern_stats": {"peak": [100, 200], "outlier_count": [10, 50]}
        }))
        .unwrap();

        let entry = record.to_entry(2).unwrap();
        assert_eq!(entry.id(), "7");
        assert_eq!(entry.channel(), Channel::GyrY);
        assert_eq!(entry.severity(), Severity::Critical);
        assert_eq!(entry.condition_type(), "lateral_instability");
        assert!(entry.embedding().is_unit());
        assert!(entry.pattern_stats().peak.is_some());

        assert!(matches!(record.to_entry(3), Err(Error::MalformedEmbedding { .. })));
    }
}
