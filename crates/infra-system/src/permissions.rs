// File-mode guards for the credentials file and fetched dumps
use std::path::Path;
use tracing::debug;

use dbfailover_core::error::{AppError, Result};

/// Permission bits granted to "other"
const OTHER_BITS: u32 = 0o007;

/// The options file holds database credentials; it must exist and must not
/// be accessible to "other"
pub fn check_options_file_permissions(path: &Path) -> Result<()> {
    let mode = file_mode(path).map_err(|e| {
        AppError::Config(format!("{} does not exist or is unreadable: {}", path.display(), e))
    })?;

    if mode & OTHER_BITS != 0 {
        return Err(AppError::Config(format!(
            "{} is accessible to other users (mode {:o}); run chmod o-rwx on it",
            path.display(),
            mode & 0o777
        )));
    }

    debug!(path = %path.display(), mode = %format!("{:o}", mode & 0o777), "options file ok");
    Ok(())
}

#[cfg(unix)]
fn file_mode(path: &Path) -> std::result::Result<u32, String> {
    nix::sys::stat::stat(path)
        .map(|st| st.st_mode as u32)
        .map_err(|e| e.to_string())
}

#[cfg(not(unix))]
fn file_mode(path: &Path) -> std::result::Result<u32, String> {
    std::fs::metadata(path).map(|_| 0).map_err(|e| e.to_string())
}

/// Make every file created from here on private to the owner (umask 077)
pub fn restrict_umask() {
    #[cfg(unix)]
    {
        use nix::sys::stat::{umask, Mode};

        let previous = umask(Mode::from_bits_truncate(0o077));
        debug!(previous = %format!("{:o}", previous.bits()), "umask set to 077");
    }
}
