use async_trait::async_trait;
use std::time::Duration;

use super::error::ProcessError;

/// A single subprocess invocation: an executable, its arguments, and an
/// optional deadline.
#[derive(Debug, Clone)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl ProcessCommand {
    /// Split a command template on whitespace into executable and arguments.
    ///
    /// No shell is involved and no quoting is interpreted, so an argument
    /// containing spaces cannot be expressed. Returns `None` for a template
    /// with no tokens.
    pub fn from_template(template: &str) -> Option<Self> {
        let mut tokens = template.split_whitespace();
        let program = tokens.next()?.to_string();
        Some(Self {
            program,
            args: tokens.map(str::to_string).collect(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of one subprocess run.
///
/// Stdout stays as raw bytes: it is concatenated verbatim into the response
/// body. Stderr only feeds operator diagnostics, so lossy text is fine.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Timeout,
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            Self::parse_signal_status(status)
        }
    }

    #[cfg(unix)]
    fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        match status.signal() {
            Some(signal) => ExitStatus::Signal(signal),
            None => ExitStatus::Error(1),
        }
    }

    #[cfg(not(unix))]
    fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
        ExitStatus::Error(1)
    }

    fn map_spawn_error(error: std::io::Error, command: &ProcessCommand) -> ProcessError {
        if error.kind() == std::io::ErrorKind::NotFound {
            ProcessError::CommandNotFound(command.program.clone())
        } else {
            ProcessError::SpawnFailed {
                command: command.display(),
                source: error,
            }
        }
    }

    fn log_result(result: &ProcessOutput, command: &ProcessCommand) {
        match &result.status {
            ExitStatus::Success => {
                tracing::debug!(
                    "subprocess completed in {:?}: {}",
                    result.duration,
                    command.display()
                );
            }
            ExitStatus::Error(code) => {
                tracing::warn!(
                    "subprocess exited with code {} in {:?}: {}",
                    code,
                    result.duration,
                    command.display()
                );
                if !result.stderr.is_empty() {
                    tracing::debug!("stderr: {}", result.stderr.trim_end());
                }
            }
            ExitStatus::Signal(signal) => {
                tracing::warn!(
                    "subprocess terminated by signal {}: {}",
                    signal,
                    command.display()
                );
            }
            ExitStatus::Timeout => {
                tracing::warn!(
                    "subprocess timed out after {:?}: {}",
                    result.duration,
                    command.display()
                );
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let start = std::time::Instant::now();
        tracing::debug!("executing subprocess: {}", command.display());

        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            // Deadline expiry drops the wait future; the child must not
            // outlive it in the process table.
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| Self::map_spawn_error(e, &command))?;

        let result = match command.timeout {
            Some(deadline) => {
                match tokio::time::timeout(deadline, child.wait_with_output()).await {
                    Ok(output) => output.map(Some),
                    Err(_elapsed) => Ok(None),
                }
            }
            None => child.wait_with_output().await.map(Some),
        };

        let duration = start.elapsed();
        let output = match result {
            Ok(Some(output)) => ProcessOutput {
                status: Self::parse_exit_status(output.status),
                stdout: output.stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                duration,
            },
            // Deadline expired; the child was killed and its output discarded.
            Ok(None) => ProcessOutput {
                status: ExitStatus::Timeout,
                stdout: Vec::new(),
                stderr: String::new(),
                duration,
            },
            Err(e) => {
                return Err(ProcessError::Io {
                    command: command.display(),
                    source: e,
                })
            }
        };

        Self::log_result(&output, &command);
        Ok(output)
    }
}
