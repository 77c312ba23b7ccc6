// Archive Extractor Port - inflates fetched dump archives

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract an archive that must hold exactly one entry into `dest_dir`
    ///
    /// # Returns
    /// Path of the extracted file
    ///
    /// # Errors
    /// - AppError::Archive if the archive is unreadable or does not hold exactly one entry
    async fn extract_single(&self, archive: &Path, dest_dir: &Path) -> Result<PathBuf>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    /// Pretends to inflate to a fixed entry name
    pub struct MockExtractor {
        entry: Option<String>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl MockExtractor {
        pub fn new(entry: impl Into<String>) -> Self {
            Self {
                entry: Some(entry.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Rejects every archive as having the wrong number of entries
        pub fn new_rejecting() -> Self {
            Self {
                entry: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ArchiveExtractor for MockExtractor {
        async fn extract_single(&self, archive: &Path, dest_dir: &Path) -> Result<PathBuf> {
            self.calls.lock().unwrap().push(archive.to_path_buf());
            match &self.entry {
                Some(entry) => Ok(dest_dir.join(entry)),
                None => Err(AppError::Archive(
                    ".zip archive must contain only 1 file.".to_string(),
                )),
            }
        }
    }
}
