// Zip extraction for compressed dumps
// reason: zip crate; reading is blocking so it runs on the blocking pool
use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

use dbfailover_core::error::{AppError, Result};
use dbfailover_core::port::ArchiveExtractor;

const SINGLE_ENTRY_ERROR: &str = ".zip archive must contain only 1 file.";

/// Extracts archives holding exactly one dump file
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn extract_single_blocking(archive: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| {
        AppError::Archive(format!("Failed to read {}: {}", archive.display(), e))
    })?;

    if zip.len() != 1 {
        return Err(AppError::Archive(SINGLE_ENTRY_ERROR.to_string()));
    }

    let mut entry = zip
        .by_index(0)
        .map_err(|e| AppError::Archive(format!("Failed to read entry: {}", e)))?;

    if entry.is_dir() {
        return Err(AppError::Archive(SINGLE_ENTRY_ERROR.to_string()));
    }

    // Refuse names that would escape the work dir
    let name = entry
        .enclosed_name()
        .ok_or_else(|| AppError::Archive(format!("Unsafe entry name: {}", entry.name())))?;
    let target = dest_dir.join(name);

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut out = File::create(&target)?;
    let bytes = std::io::copy(&mut entry, &mut out)?;
    debug!(entry = %target.display(), bytes, "extracted");

    Ok(target)
}

#[async_trait]
impl ArchiveExtractor for ZipExtractor {
    async fn extract_single(&self, archive: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let archive = archive.to_path_buf();
        let dest_dir = dest_dir.to_path_buf();

        tokio::task::spawn_blocking(move || extract_single_blocking(&archive, &dest_dir))
            .await
            .map_err(|e| AppError::Internal(format!("extraction task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_extracts_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("gocdb.zip");
        write_zip(&archive, &[("gocdb.sql", "CREATE TABLE t (id INT);")]);

        let extracted = ZipExtractor::new()
            .extract_single(&archive, dir.path())
            .await
            .unwrap();

        assert_eq!(extracted, dir.path().join("gocdb.sql"));
        assert_eq!(
            std::fs::read_to_string(extracted).unwrap(),
            "CREATE TABLE t (id INT);"
        );
    }

    #[tokio::test]
    async fn test_rejects_multiple_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("two.zip");
        write_zip(&archive, &[("a.sql", "a"), ("b.sql", "b")]);

        let err = ZipExtractor::new()
            .extract_single(&archive, dir.path())
            .await
            .unwrap_err();

        assert!(err.to_string().contains(SINGLE_ENTRY_ERROR));
        assert!(!dir.path().join("a.sql").exists());
    }

    #[tokio::test]
    async fn test_rejects_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("empty.zip");
        write_zip(&archive, &[]);

        let err = ZipExtractor::new()
            .extract_single(&archive, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Archive(_)));
    }

    #[tokio::test]
    async fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("plain.zip");
        std::fs::write(&archive, "not a zip").unwrap();

        let err = ZipExtractor::new()
            .extract_single(&archive, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Archive(_)));
    }
}
