// Operator kill-switch: a sentinel file suppresses the scheduled run
use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Return the sentinel's contents (trailing whitespace trimmed) if it exists
///
/// An empty path means no sentinel is configured.
pub async fn read_sentinel(path: &Path) -> Result<Option<String>> {
    if path.as_os_str().is_empty() {
        return Ok(None);
    }

    let is_file = match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file(),
        Err(_) => false,
    };

    if !is_file {
        debug!(sentinel = %path.display(), "No sentinel present");
        return Ok(None);
    }

    let contents = tokio::fs::read_to_string(path).await?;
    Ok(Some(contents.trim_end().to_string()))
}
