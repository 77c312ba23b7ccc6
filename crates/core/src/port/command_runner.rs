// Command Runner Port
// Abstraction for running external binaries (dump, fetch, import)

use async_trait::async_trait;
use thiserror::Error;

/// External command: program plus argument list, never run through a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Space-joined command line for log messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a successful command run
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
    /// stdout followed by stderr
    pub output: String,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed for {command}: {reason}")]
    SpawnFailed { command: String, reason: String },

    /// Non-zero exit; displays the command's own output verbatim
    #[error("{output}")]
    Failed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns the external process
/// - MockCommandRunner: scripted outcomes for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    /// - ExecutionError::Failed if it exits non-zero (carries captured output)
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0
        Success,
        /// Exit 1 with the given output
        Fail(String),
    }

    /// Mock Command Runner for testing
    ///
    /// Consumes scripted behaviors in order, then repeats the fallback.
    pub struct MockCommandRunner {
        script: Mutex<VecDeque<MockBehavior>>,
        fallback: MockBehavior,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl MockCommandRunner {
        pub fn new(fallback: MockBehavior) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn with_script(self, behaviors: Vec<MockBehavior>) -> Self {
            self.script.lock().unwrap().extend(behaviors);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
            self.calls.lock().unwrap().push(spec.clone());

            let behavior = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());

            match behavior {
                MockBehavior::Success => Ok(CommandOutput {
                    exit_code: Some(0),
                    duration_ms: 1,
                    output: "mock output".to_string(),
                }),
                MockBehavior::Fail(output) => Err(ExecutionError::Failed {
                    command: spec.display(),
                    exit_code: Some(1),
                    output,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_program_and_args() {
        let spec = CommandSpec::new("/usr/bin/mysql")
            .arg("--defaults-extra-file=/etc/opts.cnf")
            .arg("-e SOURCE /tmp/db.dmp");
        assert_eq!(
            spec.display(),
            "/usr/bin/mysql --defaults-extra-file=/etc/opts.cnf -e SOURCE /tmp/db.dmp"
        );
    }

    #[test]
    fn test_failed_displays_output_verbatim() {
        let err = ExecutionError::Failed {
            command: "mysql".to_string(),
            exit_code: Some(1),
            output: "ERROR 2002 (HY000): Can't connect".to_string(),
        };
        assert_eq!(err.to_string(), "ERROR 2002 (HY000): Can't connect");
    }
}
