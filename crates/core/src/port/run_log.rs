// Run Log Port - the append-only log the recency check consumes

use crate::domain::RunLogEntry;
use crate::error::Result;
use async_trait::async_trait;

/// Destination for run outcome records
///
/// Implementations must write each entry as one complete line in a single
/// append, so a concurrent reader never sees a truncated success record.
#[async_trait]
pub trait RunLog: Send + Sync {
    async fn append(&self, entry: &RunLogEntry) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{LogLevel, DEFAULT_SUCCESS_MARKER};
    use std::sync::Mutex;

    /// Keeps entries in memory
    #[derive(Default)]
    pub struct MemoryRunLog {
        entries: Mutex<Vec<RunLogEntry>>,
    }

    impl MemoryRunLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> Vec<RunLogEntry> {
            self.entries.lock().unwrap().clone()
        }

        pub fn messages(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.message.clone())
                .collect()
        }

        pub fn has_success(&self) -> bool {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .any(|e| e.level == LogLevel::Info && e.message == DEFAULT_SUCCESS_MARKER)
        }
    }

    #[async_trait]
    impl RunLog for MemoryRunLog {
        async fn append(&self, entry: &RunLogEntry) -> Result<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }
}
