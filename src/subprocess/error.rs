use thiserror::Error;

/// Failures that prevent a subprocess from producing an exit status at all.
///
/// Non-zero exits, signals, and deadline expiry are not errors at this layer;
/// they are reported through [`super::runner::ExitStatus`] so captured output
/// survives. These variants cover the cases where there is no process to
/// report on.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error while running '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}
