// INI configuration for the dump and import binaries
//
// Keys are accepted as operators write them (camelCase) and lowercased, since
// the ini source may normalise key case.
use ::config::{Config, File, FileFormat};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use dbfailover_core::application::constants::{
    DEFAULT_COPY_BINARY, DEFAULT_DUMP_BINARY, DEFAULT_IMPORT_BINARY, DEFAULT_RETRY_COUNT,
    DEFAULT_SCP_BINARY,
};
use dbfailover_core::application::{DumpJob, ImportBinaries, ImportJob, RemoteSource, RetryPolicy};
use dbfailover_core::domain::DEFAULT_DATE_FORMAT;
use dbfailover_core::error::{AppError, Result};

pub const DEFAULT_DUMP_CONFIG: &str = "./fetchMariaDBdmpFile/failover_fetch.ini";
pub const DEFAULT_IMPORT_CONFIG: &str = "./importMariaDBdmpFile/config.ini";

const DEFAULT_LOG_LEVEL: &str = "info";

/// `[logs]` section shared by both binaries
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LogsConfig {
    /// Run log destination; empty means stdout
    #[serde(default)]
    pub file: String,
    /// Diagnostics layout: json, pretty or compact
    #[serde(default)]
    pub format: String,
    #[serde(rename = "dateFormat", alias = "dateformat", default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            file: String::new(),
            format: String::new(),
            date_format: default_date_format(),
            level: default_log_level(),
        }
    }
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl LogsConfig {
    pub fn run_log_path(&self) -> Option<PathBuf> {
        if self.file.is_empty() {
            None
        } else {
            Some(expand(&self.file))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    #[serde(rename = "result-file")]
    pub result_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DumpLocalSection {
    #[serde(rename = "noFetch", alias = "nofetch")]
    pub no_fetch: String,
    #[serde(rename = "dumpFile", alias = "dumpfile")]
    pub dump_file: String,
    #[serde(rename = "databaseName", alias = "databasename")]
    pub database_name: String,
    #[serde(rename = "dumpBinary", alias = "dumpbinary", default)]
    pub dump_binary: Option<String>,
}

/// `failover-dump` configuration; the file doubles as the client options file
#[derive(Debug, Clone, Deserialize)]
pub struct DumpConfig {
    #[serde(alias = "client-mariadb")]
    pub client: ClientSection,
    pub local: DumpLocalSection,
    #[serde(default)]
    pub logs: LogsConfig,
}

impl DumpConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_ini(path)
    }

    pub fn to_job(&self, config_path: &Path) -> DumpJob {
        DumpJob::new(
            config_path,
            &self.local.database_name,
            expand(&self.client.result_file),
            expand(&self.local.dump_file),
            expand(&self.local.no_fetch),
        )
        .with_binary(
            self.local
                .dump_binary
                .clone()
                .unwrap_or_else(|| DEFAULT_DUMP_BINARY.to_string()),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSection {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportLocalSection {
    #[serde(rename = "workDir", alias = "workdir")]
    pub work_dir: String,
    #[serde(rename = "archiveDir", alias = "archivedir")]
    pub archive_dir: String,
    #[serde(rename = "mysqlOptions", alias = "mysqloptions", default)]
    pub mysql_options: Option<String>,
    pub format: String,
    #[serde(rename = "noImport", alias = "noimport")]
    pub no_import: String,
    #[serde(rename = "retryCount", alias = "retrycount", default = "default_retry_count")]
    pub retry_count: i64,
    #[serde(rename = "mysqlBinary", alias = "mysqlbinary", default)]
    pub mysql_binary: Option<String>,
    #[serde(rename = "scpBinary", alias = "scpbinary", default)]
    pub scp_binary: Option<String>,
    #[serde(rename = "copyBinary", alias = "copybinary", default)]
    pub copy_binary: Option<String>,
}

fn default_retry_count() -> i64 {
    i64::from(DEFAULT_RETRY_COUNT)
}

/// `failover-import` configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub remote: RemoteSection,
    pub local: ImportLocalSection,
    #[serde(default)]
    pub logs: LogsConfig,
}

impl ImportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_ini(path)
    }

    /// Client options file; the config file itself unless `mysqlOptions` is set
    pub fn options_file(&self, config_path: &Path) -> PathBuf {
        match &self.local.mysql_options {
            Some(p) if !p.is_empty() => expand(p),
            _ => config_path.to_path_buf(),
        }
    }

    /// Attempts including the first; at least one
    pub fn retry_attempts(&self) -> u32 {
        u32::try_from(self.local.retry_count.max(1)).unwrap_or(u32::MAX)
    }

    pub fn to_job(&self, config_path: &Path) -> ImportJob {
        let or_default = |value: &Option<String>, default: &str| match value {
            Some(v) if !v.is_empty() => v.clone(),
            _ => default.to_string(),
        };

        ImportJob {
            source: RemoteSource {
                host: self.remote.host.clone(),
                user: self.remote.user.clone(),
                path: self.remote.path.clone(),
            },
            work_dir: expand(&self.local.work_dir),
            archive_dir: expand(&self.local.archive_dir),
            options_file: self.options_file(config_path),
            archive_format: self.local.format.clone(),
            sentinel: expand(&self.local.no_import),
            retry: RetryPolicy::new(self.retry_attempts()),
            binaries: ImportBinaries {
                mysql: or_default(&self.local.mysql_binary, DEFAULT_IMPORT_BINARY),
                scp: or_default(&self.local.scp_binary, DEFAULT_SCP_BINARY),
                copy: or_default(&self.local.copy_binary, DEFAULT_COPY_BINARY),
            },
        }
    }
}

fn load_ini<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(AppError::Config(format!(
            "Configuration file {} does not exist",
            path.display()
        )));
    }

    debug!(path = %path.display(), "Loading configuration");

    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

    Config::builder()
        .add_source(File::from_str(&with_bare_keys_valued(&text), FileFormat::Ini))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
}

/// Give value-less option lines (`quick`, `single-transaction`) an empty value
///
/// The dump config is also read by the client as an options file, where bare
/// flags are legal; the ini parser rejects them.
fn with_bare_keys_valued(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim();
            let is_bare_key = !trimmed.is_empty()
                && !trimmed.starts_with(['[', ';', '#'])
                && !trimmed.contains(['=', ':']);
            if is_bare_key {
                format!("{}=", trimmed)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Expand a leading `~` in a configured path
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
