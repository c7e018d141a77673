//! # Runbook
//!
//! Run declaratively configured shell commands with validated parameters.
//!
//! A runbook file — YAML or JSON, not code — declares which external
//! programs run for a request: each command is a template with `{{name}}`
//! placeholders, a set of required parameters with validation regexes, and a
//! timeout. The library validates caller-supplied parameters, substitutes
//! them into the templates, executes the commands sequentially as
//! deadline-bound subprocesses, and aggregates their output. It is meant to
//! sit behind an HTTP handler or be embedded directly; the transport is the
//! caller's business.
//!
//! ```no_run
//! use runbook::{Parameters, RunbookExecutor};
//! # async fn demo() -> runbook::Result<()> {
//! let executor = RunbookExecutor::new();
//! let mut parameters = Parameters::new();
//! parameters.insert("msg".into(), vec!["hello".into()]);
//! let text = executor.execute("diag.yaml".as_ref(), &parameters).await?;
//! print!("{text}");
//! # Ok(()) }
//! ```
//!
//! ## Modules
//!
//! - `config` - Runbook data model, parsing, and the TTL config cache
//! - `validate` - Required-parameter validation and template substitution
//! - `subprocess` - Deadline-bound subprocess execution with a mockable runner
//! - `run` - The orchestrator walking the command list in declared order
//! - `response` - Result aggregation and text/structured renderings
//! - `error` - Error taxonomy and the machine-readable error body

pub mod config;
pub mod error;
pub mod response;
pub mod run;
pub mod subprocess;
pub mod validate;

pub use config::{CommandEntry, ConfigCache, RequiredRule, Runbook};
pub use error::{ErrorBody, Result, RunbookError, ValidationError};
pub use response::{CommandFailure, CommandResult, RunOutcome};
pub use run::RunbookExecutor;
pub use validate::{validate_and_substitute, Parameters};
