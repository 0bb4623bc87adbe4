//! File-based rules source.
//!
//! Reads the classification rule text from a file on disk. The text is
//! passed through unchanged.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{RulesError, RulesSource};

/// Rule text stored in a single file.
#[derive(Debug, Clone)]
pub struct FileRulesSource {
    path: PathBuf,
}

impl FileRulesSource {
    /// # Example
    /// ```ignore
    /// let rules = FileRulesSource::new("classification-rules/rules_raw_from_pdf.md");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RulesSource for FileRulesSource {
    async fn load(&self) -> Result<String, RulesError> {
        fs::read_to_string(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RulesError::NotFound(self.path.display().to_string()),
            _ => RulesError::Io(e.to_string()),
        })
    }
}
