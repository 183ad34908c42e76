//! Storage boundary for motiondx: the knowledge file, the built-in pattern
//! catalogue, knowledge base seeding and the remote embedder.

pub mod catalogue;
pub mod error;
pub mod file;
pub mod remote;
pub mod seeder;

pub use catalogue::{PatternCatalogue, PatternDefinition};
pub use error::{Result, StorageError};
pub use file::KnowledgeFile;
pub use remote::{RemoteEmbedder, RemoteEmbedderConfig};
pub use seeder::{KnowledgeSeeder, SeedOptions};
