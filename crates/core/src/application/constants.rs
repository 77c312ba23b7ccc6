// Application constants (No magic values)
use std::time::Duration;

/// Default grace period for the recency check (7 hours)
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(7 * 3600);

/// Import attempts when the configuration does not say otherwise
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Backoff base delay (100ms); first retry waits base * (2^1 - 1)
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Backoff growth factor per attempt
pub const DEFAULT_RETRY_MULTIPLIER: u32 = 2;

/// Backoff ceiling (20s)
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(20);

/// Suffix of the single retained previous dump generation
pub const PREVIOUS_GENERATION_SUFFIX: &str = "_old";

/// Extension of archived imports; every match is pruned before archiving
pub const ARCHIVE_EXTENSION: &str = "dmp";

/// Extension that marks a fetched file as a zip archive
pub const ZIP_EXTENSION: &str = "zip";

// External binaries
pub const DEFAULT_DUMP_BINARY: &str = "/usr/bin/mysqldump";
pub const DEFAULT_IMPORT_BINARY: &str = "/usr/bin/mysql";
pub const DEFAULT_SCP_BINARY: &str = "/usr/bin/scp";
pub const DEFAULT_COPY_BINARY: &str = "/usr/bin/cp";
