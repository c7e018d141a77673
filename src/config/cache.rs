//! Read-through runbook cache with lazy TTL expiry.
//!
//! Entries are keyed by source path and swapped whole on reload; the value
//! and its load instant are always read together under the lock, so a caller
//! never observes a runbook paired with another load's timestamp. There is
//! no background refresh and no explicit invalidation: a read that finds an
//! expired or absent entry reloads synchronously.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::config::Runbook;
use crate::error::{Result, RunbookError};

/// How long a cached runbook stays servable.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct Entry {
    runbook: Arc<Runbook>,
    loaded_at: Instant,
}

pub struct ConfigCache {
    ttl: Duration,
    entries: RwLock<HashMap<PathBuf, Entry>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the runbook for `path`, reloading it if the cached copy is absent
    /// or older than the TTL. Read or parse failures propagate to the caller;
    /// nothing partial is cached.
    pub async fn get(&self, path: &Path) -> Result<Arc<Runbook>> {
        if let Some(runbook) = self.fresh(path) {
            return Ok(runbook);
        }

        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RunbookError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let runbook = Arc::new(Runbook::parse(path, &source)?);
        tracing::debug!(
            "loaded runbook '{}' ({} commands) from {}",
            runbook.name,
            runbook.commands.len(),
            path.display()
        );

        let mut entries = self.entries.write().unwrap();
        entries.insert(
            path.to_path_buf(),
            Entry {
                runbook: Arc::clone(&runbook),
                loaded_at: Instant::now(),
            },
        );
        Ok(runbook)
    }

    fn fresh(&self, path: &Path) -> Option<Arc<Runbook>> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(path)?;
        if entry.loaded_at.elapsed() < self.ttl {
            Some(Arc::clone(&entry.runbook))
        } else {
            None
        }
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new()
    }
}
