//! Effective CLI configuration: config file and environment, then flags

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hypergraph_config::{ConfigLoader, HypergraphConfig};
use hypergraph_sqlite::{SqliteConfig, SqliteGraphStore, WriteMode};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub settings: HypergraphConfig,
}

impl CliConfig {
    /// Load configuration and apply command-line overrides
    pub fn load(config_file: Option<PathBuf>, db_path: Option<PathBuf>, bulk: bool) -> Result<Self> {
        let mut loader = ConfigLoader::new();
        if let Some(path) = config_file {
            loader = loader.with_file(path);
        }
        let mut settings = loader.load().context("Failed to load configuration")?;

        if let Some(db_path) = db_path {
            settings.storage.db_path = db_path;
        }
        if bulk {
            settings.storage.bulk_ingest = true;
        }

        Ok(Self { settings })
    }

    pub fn db_path(&self) -> &Path {
        &self.settings.storage.db_path
    }

    pub fn write_mode(&self) -> WriteMode {
        if self.settings.storage.bulk_ingest {
            WriteMode::BulkIngest
        } else {
            WriteMode::Standard
        }
    }

    pub fn profile_root(&self) -> PathBuf {
        self.settings.ingest.profile_root()
    }

    pub fn sqlite_config(&self) -> SqliteConfig {
        let mut config = SqliteConfig::new(self.db_path()).with_write_mode(self.write_mode());
        config.busy_timeout_ms = self.settings.storage.busy_timeout_ms;
        config
    }

    /// Open (or create) the graph database
    pub fn open_store(&self) -> Result<SqliteGraphStore> {
        debug!(db_path = %self.db_path().display(), write_mode = ?self.write_mode(), "Opening graph store");
        SqliteGraphStore::open(self.sqlite_config())
            .with_context(|| format!("Failed to open graph database {}", self.db_path().display()))
    }
}
