// Subprocess command runner
// reason: tokio::process so the import retry loop stays on the async runtime
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{info, warn};

use dbfailover_core::port::command_runner::{
    CommandOutput, CommandRunner, CommandSpec, ExecutionError,
};
use dbfailover_core::port::TimeProvider;

/// Environment passed through to the dump/fetch/import binaries
pub const DEFAULT_ENV_ALLOWLIST: &[&str] = &[
    "PATH",
    "HOME",
    "USER",
    "LOGNAME",
    "LANG",
    "TZ",
    "SSH_AUTH_SOCK",
];

/// Runs external binaries as child processes
///
/// The child inherits only allowlisted environment variables. Its stdout and
/// stderr are captured and joined into a single output string.
pub struct SubprocessRunner {
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Vec<String>,
}

impl SubprocessRunner {
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self::with_env_allowlist(
            time_provider,
            DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_env_allowlist(time_provider: Arc<dyn TimeProvider>, env_allowlist: Vec<String>) -> Self {
        Self {
            time_provider,
            env_allowlist,
        }
    }

    fn allowed_env(&self) -> Vec<(String, String)> {
        std::env::vars()
            .filter(|(k, _)| self.env_allowlist.contains(k))
            .collect()
    }

    async fn spawn_and_wait(&self, spec: &CommandSpec) -> Result<std::process::Output, ExecutionError> {
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .env_clear()
            .envs(self.allowed_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed {
                command: spec.display(),
                reason: e.to_string(),
            })?;

        child
            .wait_with_output()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))
    }
}

/// stdout then stderr, trimmed
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = stdout.trim_end();
    let stderr = stderr.trim_end();

    match (stdout.is_empty(), stderr.is_empty()) {
        (_, true) => stdout.to_string(),
        (true, false) => stderr.to_string(),
        (false, false) => format!("{}\n{}", stdout, stderr),
    }
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
        let start = self.time_provider.now();

        info!(command = %spec.program, args = ?spec.args, "Starting subprocess");

        let output = self.spawn_and_wait(spec).await?;
        let duration_ms = (self.time_provider.now() - start).num_milliseconds();
        let exit_code = output.status.code();
        let text = combined_output(&output);

        if !output.status.success() {
            warn!(
                command = %spec.program,
                exit_code = ?exit_code,
                duration_ms = %duration_ms,
                "Subprocess failed"
            );
            return Err(ExecutionError::Failed {
                command: spec.display(),
                exit_code,
                output: text,
            });
        }

        info!(
            command = %spec.program,
            duration_ms = %duration_ms,
            "Subprocess completed"
        );

        Ok(CommandOutput {
            exit_code,
            duration_ms,
            output: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbfailover_core::port::time_provider::SystemTimeProvider;

    fn runner() -> SubprocessRunner {
        SubprocessRunner::new(Arc::new(SystemTimeProvider))
    }

    #[tokio::test]
    async fn test_run_success_captures_stdout() {
        let spec = CommandSpec::new("sh").arg("-c").arg("echo hello");

        let out = runner().run(&spec).await.unwrap();

        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.output, "hello");
    }

    #[tokio::test]
    async fn test_run_failure_carries_combined_output() {
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("echo partial; echo 'ERROR 1045: Access denied' >&2; exit 3");

        let err = runner().run(&spec).await.unwrap_err();

        match err {
            ExecutionError::Failed {
                exit_code, output, ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(output, "partial\nERROR 1045: Access denied");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let spec = CommandSpec::new("/nonexistent/bin/mysqldump");

        let err = runner().run(&spec).await.unwrap_err();

        assert!(matches!(err, ExecutionError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_env_is_filtered() {
        std::env::set_var("DBFAILOVER_TEST_SECRET", "hunter2");
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("echo \"${DBFAILOVER_TEST_SECRET:-unset}\"");

        let out = runner().run(&spec).await.unwrap();

        assert_eq!(out.output, "unset");
    }

    #[test]
    fn test_combined_output_skips_empty_streams() {
        use std::os::unix::process::ExitStatusExt;

        let output = std::process::Output {
            status: std::process::ExitStatus::from_raw(0),
            stdout: Vec::new(),
            stderr: b"only stderr\n".to_vec(),
        };
        assert_eq!(combined_output(&output), "only stderr");
    }
}
