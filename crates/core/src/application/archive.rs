// Dump/import artifact retention
use crate::application::constants::{ARCHIVE_EXTENSION, PREVIOUS_GENERATION_SUFFIX};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Move a file, falling back to copy + remove when rename is not possible
/// (e.g. across filesystems)
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    debug!("moving {} to {}", from.display(), to.display());

    if let Err(e) = tokio::fs::rename(from, to).await {
        debug!(error = %e, "rename failed, copying instead");
        tokio::fs::copy(from, to).await?;
        tokio::fs::remove_file(from).await?;
    }
    Ok(())
}

/// `<dump_file>_old`
pub fn previous_generation(dump_file: &Path) -> PathBuf {
    let mut name = dump_file.as_os_str().to_owned();
    name.push(PREVIOUS_GENERATION_SUFFIX);
    PathBuf::from(name)
}

/// Install a fresh dump, keeping exactly one previous generation
///
/// 1. remove `<dump>_old`
/// 2. `<dump>` -> `<dump>_old` (if there is a current dump)
/// 3. `<result>` -> `<dump>`
pub async fn rotate_generation(result_file: &Path, dump_file: &Path) -> Result<()> {
    debug!("archiving dump ...");

    let previous = previous_generation(dump_file);

    if tokio::fs::try_exists(&previous).await? {
        tokio::fs::remove_file(&previous).await?;
    }

    if tokio::fs::try_exists(dump_file).await? {
        move_file(dump_file, &previous).await?;
    }

    move_file(result_file, dump_file).await?;

    debug!("archive completed");
    Ok(())
}

/// Archive an imported file as `<archive_dir>/<now formatted>.dmp`, pruning
/// every other `.dmp` in the directory first
///
/// # Returns
/// Path of the archived file
pub async fn archive_import(
    import_path: &Path,
    archive_dir: &Path,
    name_format: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    debug!("archiving dump file ...");

    let is_dir = tokio::fs::metadata(archive_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(AppError::NotFound(format!(
            "Archive directory {} does not exist.",
            archive_dir.display()
        )));
    }

    for old in previous_imports(archive_dir)? {
        debug!("removing {}", old.display());
        tokio::fs::remove_file(&old).await?;
    }

    let mut name = String::new();
    write!(name, "{}.{}", now.format(name_format), ARCHIVE_EXTENSION)
        .map_err(|_| AppError::Config(format!("Invalid archive name format: {}", name_format)))?;
    let archive_path = archive_dir.join(name);

    move_file(import_path, &archive_path).await?;

    debug!("archive completed");
    Ok(archive_path)
}

fn previous_imports(archive_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&archive_dir.to_string_lossy()),
        ARCHIVE_EXTENSION
    );

    let paths = glob::glob(&pattern)
        .map_err(|e| AppError::Internal(format!("bad archive pattern {}: {}", pattern, e)))?;

    Ok(paths.filter_map(|p| p.ok()).filter(|p| p.is_file()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_previous_generation_name() {
        assert_eq!(
            previous_generation(Path::new("/var/dumps/gocdb.sql")),
            PathBuf::from("/var/dumps/gocdb.sql_old")
        );
    }

    #[tokio::test]
    async fn test_rotate_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let result = dir.path().join("result.sql");
        let dump = dir.path().join("dump.sql");
        std::fs::write(&result, "new").unwrap();

        rotate_generation(&result, &dump).await.unwrap();

        assert_eq!(std::fs::read_to_string(&dump).unwrap(), "new");
        assert!(!result.exists());
        assert!(!previous_generation(&dump).exists());
    }

    #[tokio::test]
    async fn test_rotate_keeps_one_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        let result = dir.path().join("result.sql");
        let dump = dir.path().join("dump.sql");
        let old = previous_generation(&dump);

        std::fs::write(&old, "oldest").unwrap();
        std::fs::write(&dump, "previous").unwrap();
        std::fs::write(&result, "newest").unwrap();

        rotate_generation(&result, &dump).await.unwrap();

        assert_eq!(std::fs::read_to_string(&dump).unwrap(), "newest");
        assert_eq!(std::fs::read_to_string(&old).unwrap(), "previous");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_rotate_missing_result_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = rotate_generation(&dir.path().join("missing"), &dir.path().join("dump")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_archive_import_prunes_and_names() {
        let archive = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();

        std::fs::write(archive.path().join("20220101_000000.dmp"), "old").unwrap();
        std::fs::write(archive.path().join("notes.txt"), "keep").unwrap();
        let imported = work.path().join("gocdb.sql");
        std::fs::write(&imported, "imported").unwrap();

        let now = Utc.with_ymd_and_hms(2023, 1, 1, 11, 41, 1).unwrap();
        let archived = archive_import(&imported, archive.path(), "%Y%m%d_%H%M%S", now)
            .await
            .unwrap();

        assert_eq!(archived, archive.path().join("20230101_114101.dmp"));
        assert_eq!(std::fs::read_to_string(&archived).unwrap(), "imported");
        assert!(!imported.exists());
        assert!(!archive.path().join("20220101_000000.dmp").exists());
        assert!(archive.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_archive_import_requires_directory() {
        let work = tempfile::tempdir().unwrap();
        let imported = work.path().join("gocdb.sql");
        std::fs::write(&imported, "imported").unwrap();

        let err = archive_import(
            &imported,
            &work.path().join("missing"),
            "%Y",
            Utc::now(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("does not exist"));
        assert!(imported.exists(), "nothing moved on failure");
    }
}
