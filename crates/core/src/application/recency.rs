// Recency check: has the failover process succeeded within the grace period?
use crate::application::panic_guard::{execute_guarded, PanicGuardResult};
use crate::domain::{find_last_success, CheckStatus, DomainError, Timestamp};
use crate::port::TimeProvider;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a check did not come back OK
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("An error occurred trying to open/read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("The failover process has never succeeded (no line containing '{marker}')")]
    NeverSucceeded { marker: String },

    #[error("An error occurred: {line}")]
    MalformedTimestamp { line: String },

    #[error("The last success at {last_success} is older than the cutoff {cutoff}")]
    Stale {
        last_success: Timestamp,
        cutoff: DateTime<Utc>,
    },

    #[error("An unexpected error occurred: {0}")]
    Internal(String),
}

impl CheckError {
    /// CRITICAL when the monitored process is unhealthy, UNKNOWN when the
    /// checker could not decide
    pub fn status(&self) -> CheckStatus {
        match self {
            CheckError::Unreadable { .. }
            | CheckError::NeverSucceeded { .. }
            | CheckError::MalformedTimestamp { .. }
            | CheckError::Stale { .. } => CheckStatus::Critical,
            CheckError::Internal(_) => CheckStatus::Unknown,
        }
    }
}

/// Outcome of one check, with the explanation shown to operators
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<Timestamp>,
    pub messages: Vec<String>,
}

impl CheckReport {
    fn ok(last_success: Timestamp) -> Self {
        Self {
            status: CheckStatus::Ok,
            last_success: Some(last_success),
            messages: vec![last_success_message(&last_success)],
        }
    }

    fn from_error(err: CheckError) -> Self {
        let status = err.status();
        let message = err.to_string();
        match err {
            CheckError::Stale { last_success, .. } => Self {
                status,
                last_success: Some(last_success),
                messages: vec![last_success_message(&last_success), message],
            },
            _ => Self {
                status,
                last_success: None,
                messages: vec![message],
            },
        }
    }
}

fn last_success_message(last_success: &Timestamp) -> String {
    format!("The failover process last succeeded at {}", last_success)
}

/// Recency checker
///
/// Stateless between runs: each check is a function of the log contents,
/// the current time and the fixed grace period.
pub struct RecencyChecker {
    grace_period: Duration,
    grace_delta: chrono::Duration,
    success_marker: String,
    time_provider: Arc<dyn TimeProvider>,
}

impl RecencyChecker {
    /// Create a new recency checker
    ///
    /// # Arguments
    /// * `grace_period` - Maximum age of the last success before reporting CRITICAL
    /// * `success_marker` - Non-empty substring identifying success lines
    /// * `time_provider` - Source of "now"
    ///
    /// # Errors
    /// `DomainError::ValidationError` for an empty marker or an unrepresentable grace period
    pub fn new(
        grace_period: Duration,
        success_marker: impl Into<String>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self, DomainError> {
        let success_marker = success_marker.into();
        if success_marker.is_empty() {
            return Err(DomainError::ValidationError(
                "success marker must not be empty".to_string(),
            ));
        }

        let grace_delta = chrono::Duration::from_std(grace_period).map_err(|e| {
            DomainError::ValidationError(format!("grace period out of range: {}", e))
        })?;

        Ok(Self {
            grace_period,
            grace_delta,
            success_marker,
            time_provider,
        })
    }

    /// Check the log at `log_path`; never fails, every outcome is a status
    pub async fn check(&self, log_path: &Path) -> CheckReport {
        debug!(path = %log_path.display(), "Reading run log");

        // Lines carry verbatim client output; only the marker and timestamp need to be ASCII
        match tokio::fs::read(log_path).await {
            Ok(bytes) => self.evaluate(&String::from_utf8_lossy(&bytes)),
            Err(source) => {
                let report = CheckReport::from_error(CheckError::Unreadable {
                    path: log_path.to_path_buf(),
                    source,
                });
                warn!(status = %report.status, "Run log unreadable");
                report
            }
        }
    }

    /// Evaluate already-read log contents
    pub fn evaluate(&self, contents: &str) -> CheckReport {
        let guarded = execute_guarded(AssertUnwindSafe(|| self.last_success_within_grace(contents)));

        let report = match guarded {
            PanicGuardResult::Success(Ok(last_success)) => CheckReport::ok(last_success),
            PanicGuardResult::Success(Err(e)) => CheckReport::from_error(e),
            PanicGuardResult::Panicked(msg) => CheckReport::from_error(CheckError::Internal(msg)),
        };

        info!(
            status = %report.status,
            last_success = ?report.last_success,
            "Recency check completed"
        );

        report
    }

    fn last_success_within_grace(&self, contents: &str) -> Result<Timestamp, CheckError> {
        let success = find_last_success(contents, &self.success_marker).ok_or_else(|| {
            CheckError::NeverSucceeded {
                marker: self.success_marker.clone(),
            }
        })?;

        let last_success = success
            .timestamp()
            .map_err(|_| CheckError::MalformedTimestamp {
                line: success.line.to_string(),
            })?;

        let now = self.time_provider.now();
        let cutoff = now.checked_sub_signed(self.grace_delta).ok_or_else(|| {
            CheckError::Internal(format!(
                "cannot subtract grace period {:?} from {}",
                self.grace_period, now
            ))
        })?;

        debug!(
            line = success.index,
            last_success = %last_success,
            cutoff = %cutoff,
            "Comparing last success against cutoff"
        );

        // The boundary itself is stale: OK requires now - last_success < grace
        if last_success.with_timezone(&Utc) <= cutoff {
            return Err(CheckError::Stale {
                last_success,
                cutoff,
            });
        }

        Ok(last_success)
    }
}
