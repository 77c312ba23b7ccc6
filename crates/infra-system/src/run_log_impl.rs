// Run log adapters: append-only file, or stdout when no file is configured
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use dbfailover_core::domain::{validate_date_format, RunLogEntry};
use dbfailover_core::error::Result;
use dbfailover_core::port::RunLog;

fn render_line(entry: &RunLogEntry, date_format: &str) -> Result<String> {
    let mut line = entry.render(date_format)?;
    line.push('\n');
    Ok(line)
}

/// Appends entries to a file
///
/// Each entry, newline included, goes out in one `write_all` on an
/// `O_APPEND` handle so readers see whole lines only.
pub struct FileRunLog {
    path: PathBuf,
    date_format: String,
}

impl FileRunLog {
    /// # Errors
    /// - DomainError::ValidationError if `date_format` is not valid strftime
    pub fn new(path: impl Into<PathBuf>, date_format: impl Into<String>) -> Result<Self> {
        let date_format = date_format.into();
        validate_date_format(&date_format)?;
        Ok(Self {
            path: path.into(),
            date_format,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RunLog for FileRunLog {
    async fn append(&self, entry: &RunLogEntry) -> Result<()> {
        let line = render_line(entry, &self.date_format)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Writes entries to standard output
pub struct StdoutRunLog {
    date_format: String,
}

impl StdoutRunLog {
    pub fn new(date_format: impl Into<String>) -> Result<Self> {
        let date_format = date_format.into();
        validate_date_format(&date_format)?;
        Ok(Self { date_format })
    }
}

#[async_trait]
impl RunLog for StdoutRunLog {
    async fn append(&self, entry: &RunLogEntry) -> Result<()> {
        let line = render_line(entry, &self.date_format)?;

        let mut stdout = tokio::io::stdout();
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}
