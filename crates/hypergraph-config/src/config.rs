//! Configuration structures
//!
//! Every section has a `Default` so a partial TOML file (or none at all)
//! produces a complete configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HypergraphConfig {
    /// Graph database settings
    pub storage: StorageConfig,
    /// Markdown ingestion settings
    pub ingest: IngestConfig,
    /// AI backend selection
    pub ai: AiConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Snapshot export settings
    pub export: ExportConfig,
}

impl HypergraphConfig {
    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.db_path is empty".to_string()));
        }
        if self.ingest.profile_name.trim().is_empty() {
            return Err(ConfigError::Invalid("ingest.profile_name is empty".to_string()));
        }
        if self.export.output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("export.output is empty".to_string()));
        }
        Ok(())
    }
}

/// Graph database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding the hypergraph
    pub db_path: PathBuf,
    /// Relax durability for large loads and rebuild the text index afterwards
    pub bulk_ingest: bool,
    /// Busy timeout for writer and reader connections
    pub busy_timeout_ms: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("hypergraph.db"),
            bulk_ingest: false,
            busy_timeout_ms: 5000,
        }
    }
}

/// How document node ids are derived when front matter has no `id`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Use the file name without extension
    #[default]
    Filename,
    /// Use a prefix of the BLAKE3 hash of the file contents
    ContentHash,
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Filename => write!(f, "filename"),
            IdStrategy::ContentHash => write!(f, "content_hash"),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "filename" => Ok(IdStrategy::Filename),
            "content_hash" | "hash" => Ok(IdStrategy::ContentHash),
            other => Err(ConfigError::Invalid(format!("unknown id strategy: {}", other))),
        }
    }
}

/// Markdown ingestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Base folder holding one sub-folder per profile
    pub markdown_root: PathBuf,
    /// Profile folder ingested by `init` and `update`
    pub profile_name: String,
    /// Fallback id derivation for documents without an explicit id
    pub id_strategy: IdStrategy,
    /// Graph schema YAML; `None` uses `SCHEMA_PATH` or the default locations
    pub schema_path: Option<PathBuf>,
}

impl IngestConfig {
    /// Directory scanned for markdown: `markdown_root/profile_name`
    pub fn profile_root(&self) -> PathBuf {
        self.markdown_root.join(&self.profile_name)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            markdown_root: PathBuf::from("knowledge"),
            profile_name: "profile".to_string(),
            id_strategy: IdStrategy::Filename,
            schema_path: None,
        }
    }
}

/// AI backend selection
///
/// The provider name is kept as text; the pipeline maps it to a backend and
/// treats unknown names as "none".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// `none`, `openai`, `gemini` or `ollama`
    pub provider: String,
    /// Model name passed to the backend, empty when unset
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            model: String::new(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG` and CLI flags
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Snapshot export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Destination of `export` when no `--output` is given
    pub output: PathBuf,
}

impl ExportConfig {
    /// Default runtime snapshot location
    pub fn default_output() -> &'static Path {
        Path::new("app/db/data.db")
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: Self::default_output().to_path_buf(),
        }
    }
}
