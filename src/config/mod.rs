//! Runbook configuration: the declarative description of what commands run.
//!
//! A runbook is loaded from YAML (or JSON, dispatched by file extension) and
//! is immutable once parsed; a reload produces a fresh value rather than
//! mutating a served one. Runbooks can also be built programmatically and
//! handed straight to the executor without touching the filesystem.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;

pub mod cache;

pub use cache::ConfigCache;

/// A parsed runbook: ordered commands plus file-level defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Runbook {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// File-level timeout in seconds applied to commands that declare none.
    /// Zero means no file-level default; the built-in fallback applies.
    #[serde(default)]
    pub default_timeout: u64,

    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

impl Runbook {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Append a command; declaration order is execution order.
    pub fn push(&mut self, entry: CommandEntry) {
        self.commands.push(entry);
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse `source` in the format implied by `path`'s extension:
    /// `.json` is JSON, everything else is YAML.
    pub fn parse(path: &Path, source: &str) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(source),
            _ => Self::from_yaml(source),
        }
    }
}

/// One executable entry in a runbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Command template, e.g. `"ls {{path}}"`. The first whitespace-delimited
    /// token is the executable; the rest are positional arguments. `{{name}}`
    /// placeholders are replaced during validation.
    pub command: String,

    #[serde(default)]
    pub required: Vec<RequiredRule>,

    /// Per-command timeout in seconds; zero inherits the runbook default.
    #[serde(default)]
    pub timeout: u64,
}

impl CommandEntry {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            command: template.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_required(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.required.push(RequiredRule {
            name: name.into(),
            pattern: pattern.into(),
        });
        self
    }
}

/// A required parameter and the regex its supplied values must match.
///
/// Wire form is a single-entry mapping, `- name: regex`. A mapping with more
/// than one entry is rejected at parse time: rule order inside it would be
/// undefined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredRule {
    pub name: String,
    pub pattern: String,
}

impl Serialize for RequiredRule {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.pattern)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for RequiredRule {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RequiredRuleVisitor)
    }
}

struct RequiredRuleVisitor;

impl<'de> Visitor<'de> for RequiredRuleVisitor {
    type Value = RequiredRule;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a single-entry mapping of parameter name to regex")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let (name, pattern): (String, String) = access
            .next_entry()?
            .ok_or_else(|| de::Error::custom("required rule mapping is empty"))?;

        if access.next_entry::<String, String>()?.is_some() {
            return Err(de::Error::custom(
                "required rule mapping must have exactly one entry",
            ));
        }

        Ok(RequiredRule { name, pattern })
    }
}
