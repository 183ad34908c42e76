use crate::error::Result;
use motiondx_core::RawKnowledgeRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// JSON file holding an array of knowledge records.
///
/// Records are kept raw so a partially invalid file still loads; validation
/// happens in [`motiondx_core::KnowledgeStore::load`].
#[derive(Debug, Clone)]
pub struct KnowledgeFile {
    path: PathBuf,
}

impl KnowledgeFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every record. A missing file is an empty knowledge base.
    pub fn read(&self) -> Result<Vec<RawKnowledgeRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "knowledge file not found, starting empty");
            return Ok(Vec::new());
        }
        let data = std::fs::read(&self.path)?;
        let records: Vec<RawKnowledgeRecord> = serde_json::from_slice(&data)?;
        info!(path = %self.path.display(), records = records.len(), "read knowledge file");
        Ok(records)
    }

    /// Replace the file contents. Readers never observe a partial file.
    pub fn write(&self, records: &[RawKnowledgeRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(records)?;
        let temp_file = self.path.with_extension("tmp");
        std::fs::write(&temp_file, &data)?;
        std::fs::rename(&temp_file, &self.path)?;

        info!(path = %self.path.display(), records = records.len(), "wrote knowledge file");
        Ok(())
    }
}
