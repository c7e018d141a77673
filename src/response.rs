//! Aggregation and rendering of per-command results.

use std::collections::HashMap;
use thiserror::Error;

/// Why a command's slot carries no (or partial) output.
///
/// None of these abort the request; they degrade the one slot and are logged
/// for operators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandFailure {
    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("exited with code {0}")]
    ExitCode(i32),

    #[error("terminated by signal {0}")]
    Signal(i32),

    #[error("could not be started: {0}")]
    Spawn(String),
}

/// The captured result of one command, ephemeral per request.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The executable token of the substituted template.
    pub name: String,
    pub stdout: Vec<u8>,
    pub error: Option<CommandFailure>,
}

/// All command results of one request, in execution order.
///
/// The ordered list is authoritative; the token-keyed mapping exists for
/// wire compatibility and can collide.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    results: Vec<CommandResult>,
}

impl RunOutcome {
    pub fn push(&mut self, result: CommandResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[CommandResult] {
        &self.results
    }

    /// Raw concatenation of captured stdouts in execution order, no
    /// separators. Failed slots contribute whatever was captured, possibly
    /// nothing.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.results.iter().map(|r| r.stdout.len()).sum());
        for result in &self.results {
            bytes.extend_from_slice(&result.stdout);
        }
        bytes
    }

    /// The aggregate as text. Invalid UTF-8 is replaced, not rejected.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).into_owned()
    }

    /// Output keyed by executable token.
    ///
    /// Two commands invoking the same executable collide here, last one
    /// wins; use [`RunOutcome::results`] when order or identity matters.
    pub fn structured(&self) -> HashMap<String, String> {
        self.results
            .iter()
            .map(|result| {
                (
                    result.name.clone(),
                    String::from_utf8_lossy(&result.stdout).into_owned(),
                )
            })
            .collect()
    }
}
