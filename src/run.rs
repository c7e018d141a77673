//! The orchestrator: cache lookup, validation, sequential execution,
//! aggregation.

use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{CommandEntry, ConfigCache, Runbook};
use crate::error::{Result, ValidationError};
use crate::response::{CommandFailure, CommandResult, RunOutcome};
use crate::subprocess::{ExitStatus, ProcessCommand, SubprocessManager};
use crate::validate::{validate_and_substitute, Parameters};

/// Fallback timeout in seconds when neither the command nor the runbook
/// declares one.
pub const DEFAULT_COMMAND_TIMEOUT: u64 = 10;

/// Runs runbooks end to end.
///
/// Owns the config cache and the subprocess layer; both are injectable so
/// tests can script subprocess behavior or shorten the cache TTL.
pub struct RunbookExecutor {
    cache: ConfigCache,
    subprocess: SubprocessManager,
}

impl RunbookExecutor {
    pub fn new() -> Self {
        Self::with_parts(ConfigCache::new(), SubprocessManager::production())
    }

    pub fn with_parts(cache: ConfigCache, subprocess: SubprocessManager) -> Self {
        Self { cache, subprocess }
    }

    /// Load the runbook at `path` (through the cache), run it, and return
    /// the aggregate output as text.
    pub async fn execute(&self, path: &Path, parameters: &Parameters) -> Result<String> {
        let runbook = self.cache.get(path).await?;
        let outcome = self.run_runbook(&runbook, parameters).await?;
        Ok(outcome.to_text())
    }

    /// Like [`execute`](Self::execute), but writes the raw aggregate bytes to
    /// `sink`. A validation failure writes the machine-readable JSON error
    /// body to the sink and still returns the error; the caller decides
    /// whether that aborts anything beyond this request. Load failures write
    /// nothing.
    pub async fn render<W: Write>(
        &self,
        path: &Path,
        parameters: &Parameters,
        sink: &mut W,
    ) -> Result<()> {
        let runbook = self.cache.get(path).await?;
        match self.run_runbook(&runbook, parameters).await {
            Ok(outcome) => {
                sink.write_all(&outcome.to_bytes())
                    .map_err(crate::error::RunbookError::Output)?;
                Ok(())
            }
            Err(err) => {
                sink.write_all(err.to_body().to_json_string().as_bytes())
                    .map_err(crate::error::RunbookError::Output)?;
                Err(err.into())
            }
        }
    }

    /// Run an already-loaded runbook: validate and substitute every command
    /// up front, then execute the commands strictly in declaration order.
    ///
    /// Later commands may rely on side effects of earlier ones, so nothing
    /// here is ever parallelized. Per-command failures degrade their own
    /// slot and execution continues; only validation aborts.
    pub async fn run_runbook(
        &self,
        runbook: &Runbook,
        parameters: &Parameters,
    ) -> std::result::Result<RunOutcome, ValidationError> {
        let validated = validate_and_substitute(runbook, parameters)?;

        let runner = self.subprocess.runner();
        let mut outcome = RunOutcome::default();
        for entry in &validated.commands {
            let timeout = effective_timeout(entry, &validated);

            let Some(command) = ProcessCommand::from_template(&entry.command) else {
                warn!("skipping command with empty template");
                outcome.push(CommandResult {
                    name: String::new(),
                    stdout: Vec::new(),
                    error: Some(CommandFailure::Spawn("empty command template".into())),
                });
                continue;
            };

            let name = command.program.clone();
            info!("running '{}' with {}s timeout", entry.command, timeout);

            let result = runner
                .run(command.with_timeout(Duration::from_secs(timeout)))
                .await;
            outcome.push(match result {
                Ok(output) => {
                    let error = match output.status {
                        ExitStatus::Success => None,
                        ExitStatus::Error(code) => Some(CommandFailure::ExitCode(code)),
                        ExitStatus::Timeout => Some(CommandFailure::Timeout(timeout)),
                        ExitStatus::Signal(signal) => Some(CommandFailure::Signal(signal)),
                    };
                    if let Some(failure) = &error {
                        warn!("command '{}' {}", name, failure);
                    }
                    CommandResult {
                        name,
                        stdout: output.stdout,
                        error,
                    }
                }
                Err(err) => {
                    warn!("command '{}' {}", name, err);
                    CommandResult {
                        name,
                        stdout: Vec::new(),
                        error: Some(CommandFailure::Spawn(err.to_string())),
                    }
                }
            });
        }

        Ok(outcome)
    }
}

impl Default for RunbookExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Command timeout if non-zero, else the runbook default if non-zero, else
/// the built-in fallback.
fn effective_timeout(entry: &CommandEntry, runbook: &Runbook) -> u64 {
    if entry.timeout != 0 {
        entry.timeout
    } else if runbook.default_timeout != 0 {
        runbook.default_timeout
    } else {
        DEFAULT_COMMAND_TIMEOUT
    }
}
