use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Malformed embedding for entry {id}: {reason}")]
    MalformedEmbedding { id: String, reason: String },

    #[error("Zero-norm vector: {context}")]
    ZeroNormVector { context: String },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("top_k must be a positive integer")]
    InvalidTopK,

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("Invalid pattern stats: {0}")]
    InvalidPatternStats(String),

    #[error("Signal has no samples")]
    EmptySignal,

    #[error("Entry already exists: {0}")]
    DuplicateEntry(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for errors caused by a caller-supplied vector rather than by the
    /// knowledge base or an upstream collaborator.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedEmbedding { .. }
                | Error::ZeroNormVector { .. }
                | Error::DimensionMismatch { .. }
                | Error::InvalidTopK
                | Error::UnknownChannel(_)
                | Error::EmptySignal
        )
    }
}
