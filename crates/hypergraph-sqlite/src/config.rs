//! SQLite backend configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Path marker for a throwaway store, backed by a scratch file removed with the pool
pub const MEMORY_PATH: &str = ":memory:";

/// Durability profile for writer sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Full sync, text index maintained on every node mutation
    #[default]
    Standard,
    /// WAL + reduced sync + in-memory temp store; the text index is detached
    /// for the session and must be rebuilt with `finalize_full_text_index`
    BulkIngest,
}

impl WriteMode {
    pub fn is_bulk(self) -> bool {
        matches!(self, WriteMode::BulkIngest)
    }
}

/// Configuration for opening a SQLite-backed graph store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file path, or `:memory:`
    pub path: PathBuf,

    /// Enable write-ahead logging (readers never block on the writer)
    pub wal_mode: bool,

    pub busy_timeout_ms: u32,

    /// `PRAGMA cache_size` (negative values are KiB)
    pub cache_size: i32,

    /// `PRAGMA mmap_size` in bytes, 0 disables
    pub mmap_size: u64,

    pub write_mode: WriteMode,
}

impl SqliteConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn memory() -> Self {
        Self::new(MEMORY_PATH)
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn bulk_ingest(self) -> Self {
        self.with_write_mode(WriteMode::BulkIngest)
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hypergraph.db"),
            wal_mode: true,
            busy_timeout_ms: 5000,
            cache_size: -16000,
            mmap_size: 0,
            write_mode: WriteMode::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config() {
        let config = SqliteConfig::memory();
        assert!(config.is_memory());
        assert_eq!(config.write_mode, WriteMode::Standard);
    }

    #[test]
    fn test_bulk_builder() {
        let config = SqliteConfig::new("/tmp/graph.db").bulk_ingest();
        assert!(config.write_mode.is_bulk());
        assert!(!config.is_memory());
        assert!(config.wal_mode);
    }
}
