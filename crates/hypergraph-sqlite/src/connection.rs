//! SQLite connection management
//!
//! One writer connection lives behind a mutex, so writer sessions are
//! serialized. Readers open their own short-lived read-only connection per
//! query and never touch the mutex; in WAL mode they read the last committed
//! snapshot while a writer session is open.
//!
//! `:memory:` stores live in a private scratch directory that is removed with
//! the last pool handle, so they get the same WAL reader semantics as file
//! stores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use crate::schema;
use crate::text_index;
use crate::writer::WriteSession;

/// Thread-safe handle to a graph database
#[derive(Clone)]
pub struct SqlitePool {
    writer: Arc<Mutex<Connection>>,
    config: SqliteConfig,
    /// Database file shared by the writer and every reader connection
    db_path: PathBuf,
    /// Backing directory of a `:memory:` store; declared after `writer` so the
    /// connection closes before the directory is removed
    scratch: Option<Arc<TempDir>>,
}

impl SqlitePool {
    /// Open (or create) the database and apply the schema
    pub fn new(config: SqliteConfig) -> SqliteResult<Self> {
        info!(path = ?config.path, write_mode = ?config.write_mode, "Opening SQLite graph store");

        let (db_path, scratch) = if config.is_memory() {
            let dir = tempfile::Builder::new()
                .prefix("hypergraph-mem-")
                .tempdir()
                .map_err(|e| SqliteError::Connection(format!("Failed to create scratch store: {}", e)))?;
            (dir.path().join("graph.db"), Some(Arc::new(dir)))
        } else {
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SqliteError::Connection(format!("Failed to create directory: {}", e))
                })?;
            }
            (config.path.clone(), None)
        };

        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            SqliteError::Connection(format!("Failed to open {}: {}", db_path.display(), e))
        })?;

        let pool = Self {
            writer: Arc::new(Mutex::new(conn)),
            config,
            db_path,
            scratch,
        };

        pool.initialize()?;

        Ok(pool)
    }

    /// Create an in-memory pool for testing
    pub fn memory() -> SqliteResult<Self> {
        Self::new(SqliteConfig::memory())
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Execute a closure with the writer connection outside of any session
    ///
    /// Blocks while a writer session is open.
    pub fn with_connection<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = self.writer.lock();
        f(&conn)
    }

    /// Open a writer session (`BEGIN IMMEDIATE`)
    ///
    /// The returned guard holds the writer lock until it is committed, rolled
    /// back, or dropped; dropping an unfinished session rolls it back.
    pub fn begin_write(&self) -> SqliteResult<WriteSession<'_>> {
        WriteSession::begin(self.writer.lock(), self.config.write_mode)
    }

    /// Run `f` inside a writer session: commit on `Ok`, roll back on `Err`
    pub fn write<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&WriteSession<'_>) -> SqliteResult<T>,
    {
        let session = self.begin_write()?;
        match f(&session) {
            Ok(value) => {
                session.commit()?;
                Ok(value)
            }
            Err(err) => {
                session.rollback()?;
                Err(err)
            }
        }
    }

    /// Open a dedicated read-only connection
    pub fn reader(&self) -> SqliteResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(std::time::Duration::from_millis(u64::from(
            self.config.busy_timeout_ms,
        )))?;
        Ok(conn)
    }

    /// Write a consistent copy of the database to `dest` (`VACUUM INTO`)
    ///
    /// The snapshot is staged next to `dest` and renamed into place, so an
    /// existing file at `dest` is only replaced once the copy is complete.
    /// Exporting onto the live database file is rejected.
    pub fn export_snapshot(&self, dest: &Path) -> SqliteResult<()> {
        let target = self.export_target(dest)?;
        let parent = target.parent().unwrap_or_else(|| Path::new("."));

        let staged = tempfile::Builder::new()
            .prefix(".hypergraph-export-")
            .suffix(".db")
            .tempfile_in(parent)
            .map_err(|e| SqliteError::Connection(format!("Failed to stage snapshot: {}", e)))?
            .into_temp_path();

        self.with_connection(|conn| {
            conn.execute("VACUUM INTO ?1", [staged.to_string_lossy().into_owned()])?;
            Ok(())
        })?;

        staged.persist(&target).map_err(|e| {
            SqliteError::Connection(format!("Failed to move snapshot to {}: {}", target.display(), e))
        })?;
        info!(dest = %target.display(), "Exported database snapshot");
        Ok(())
    }

    /// Absolute export destination, never the live database file
    fn export_target(&self, dest: &Path) -> SqliteResult<PathBuf> {
        let file_name = dest.file_name().ok_or_else(|| {
            SqliteError::InvalidOperation(format!("Export destination {} has no file name", dest.display()))
        })?;
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)
            .map_err(|e| SqliteError::Connection(format!("Failed to create directory: {}", e)))?;

        let target = parent
            .canonicalize()
            .map_err(|e| SqliteError::Connection(format!("Failed to resolve {}: {}", parent.display(), e)))?
            .join(file_name);

        let source = self
            .db_path
            .canonicalize()
            .map_err(|e| SqliteError::Connection(format!("Failed to resolve {}: {}", self.db_path.display(), e)))?;
        if target == source {
            return Err(SqliteError::InvalidOperation(format!(
                "Export destination {} is the source database",
                dest.display()
            )));
        }
        Ok(target)
    }

    /// Initialize the database (configure pragmas and apply schema)
    fn initialize(&self) -> SqliteResult<()> {
        self.with_connection(|conn| {
            self.configure_pragmas(conn)?;

            schema::ensure_schema(conn)?;
            schema::ensure_indexes(conn)?;

            // Bulk stores get their index from finalize_full_text_index
            if !self.config.write_mode.is_bulk() {
                text_index::install(conn)?;
            }

            info!("SQLite graph store initialized");
            Ok(())
        })
    }

    /// Configure PRAGMA settings for the writer connection
    fn configure_pragmas(&self, conn: &Connection) -> SqliteResult<()> {
        debug!(write_mode = ?self.config.write_mode, "Configuring SQLite pragmas");

        // Referential integrity is part of the data model, never optional
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if self.config.wal_mode || self.config.write_mode.is_bulk() || self.scratch.is_some() {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }

        if self.config.write_mode.is_bulk() {
            conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
            conn.execute_batch("PRAGMA temp_store = MEMORY;")?;
        } else {
            conn.execute_batch("PRAGMA synchronous = FULL;")?;
        }

        if self.scratch.is_some() {
            // Scratch stores are discarded with the pool
            conn.execute_batch("PRAGMA synchronous = OFF;")?;
        }

        conn.busy_timeout(std::time::Duration::from_millis(u64::from(
            self.config.busy_timeout_ms,
        )))?;

        conn.execute_batch(&format!("PRAGMA cache_size = {};", self.config.cache_size))?;

        if self.config.mmap_size > 0 {
            conn.execute_batch(&format!("PRAGMA mmap_size = {};", self.config.mmap_size))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteMode;

    #[test]
    fn test_memory_pool() {
        let pool = SqlitePool::memory().expect("Failed to create memory pool");

        pool.with_connection(|conn| {
            let result: i64 = conn.query_row("SELECT 1 + 1", [], |row| row.get(0))?;
            assert_eq!(result, 2);
            Ok(())
        })
        .expect("Query failed");
    }

    #[test]
    fn test_file_pool_uses_wal() {
        let dir = TempDir::new().unwrap();
        let pool = SqlitePool::new(SqliteConfig::new(dir.path().join("graph.db")))
            .expect("Failed to create pool");

        pool.with_connection(|conn| {
            let mode: String = conn.query_row("PRAGMA journal_mode;", [], |row| row.get(0))?;
            assert_eq!(mode.to_lowercase(), "wal");
            let fk: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
            assert_eq!(fk, 1);
            Ok(())
        })
        .expect("Query failed");
    }

    #[test]
    fn test_bulk_pool_relaxes_sync() {
        let dir = TempDir::new().unwrap();
        let config =
            SqliteConfig::new(dir.path().join("bulk.db")).with_write_mode(WriteMode::BulkIngest);
        let pool = SqlitePool::new(config).unwrap();

        pool.with_connection(|conn| {
            // NORMAL = 1, MEMORY temp store = 2
            let sync: i64 = conn.query_row("PRAGMA synchronous;", [], |row| row.get(0))?;
            assert_eq!(sync, 1);
            let temp: i64 = conn.query_row("PRAGMA temp_store;", [], |row| row.get(0))?;
            assert_eq!(temp, 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("graph.db");

        SqlitePool::new(SqliteConfig::new(&db_path)).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_memory_reader_sees_writer_data() {
        let pool = SqlitePool::memory().unwrap();
        pool.with_connection(|conn| {
            conn.execute("INSERT INTO nodes (id, type, data) VALUES ('n1', 'Doc', '{}')", [])?;
            Ok(())
        })
        .unwrap();

        let reader = pool.reader().unwrap();
        let count: i64 = reader
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_reader_is_read_only() {
        let dir = TempDir::new().unwrap();
        let pool = SqlitePool::new(SqliteConfig::new(dir.path().join("ro.db"))).unwrap();

        let reader = pool.reader().unwrap();
        let result = reader.execute("INSERT INTO nodes (id, type) VALUES ('x', 'Doc')", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_snapshot_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let pool = SqlitePool::new(SqliteConfig::new(dir.path().join("src.db"))).unwrap();
        pool.with_connection(|conn| {
            conn.execute("INSERT INTO nodes (id, type, data) VALUES ('n1', 'Doc', '{}')", [])?;
            Ok(())
        })
        .unwrap();

        let dest = dir.path().join("out").join("data.db");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, b"stale").unwrap();

        pool.export_snapshot(&dest).unwrap();

        let copy = Connection::open(&dest).unwrap();
        let count: i64 = copy
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_export_rejects_alias_of_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src.db");
        let pool = SqlitePool::new(SqliteConfig::new(&source)).unwrap();
        pool.with_connection(|conn| {
            conn.execute("INSERT INTO nodes (id, type, data) VALUES ('n1', 'Doc', '{}')", [])?;
            Ok(())
        })
        .unwrap();

        let alias = dir.path().join("out").join("..").join("src.db");
        let err = pool.export_snapshot(&alias).unwrap_err();
        assert!(matches!(err, SqliteError::InvalidOperation(_)), "{err}");

        let reader = pool.reader().unwrap();
        let count: i64 = reader
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_export_leaves_no_staging_files() {
        let dir = TempDir::new().unwrap();
        let pool = SqlitePool::memory().unwrap();
        let dest = dir.path().join("data.db");

        pool.export_snapshot(&dest).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["data.db".to_string()]);
    }

    #[test]
    fn test_memory_scratch_is_removed_on_drop() {
        let pool = SqlitePool::memory().unwrap();
        let path = pool.db_path.clone();
        assert!(path.exists());

        drop(pool);
        assert!(!path.exists());
    }
}
