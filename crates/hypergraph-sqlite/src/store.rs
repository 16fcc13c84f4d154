//! Async `GraphStore` implementation for SQLite

use async_trait::async_trait;
use hypergraph_core::{
    Edge, GraphStats, GraphStore, Hyperedge, Node, QueryOptions, QueryResult, StorageError,
    StorageResult,
};
use tracing::info;

use crate::config::SqliteConfig;
use crate::connection::SqlitePool;
use crate::error::SqliteResult;
use crate::writer::WriteSession;
use crate::{query, records, text_index};

/// SQLite-backed hypergraph store
///
/// Cheap to clone; all clones share the same writer connection.
#[derive(Clone)]
pub struct SqliteGraphStore {
    pool: SqlitePool,
}

impl SqliteGraphStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the store described by `config`
    pub fn open(config: SqliteConfig) -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::new(config)?))
    }

    /// Create an in-memory store for testing
    pub fn memory() -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::memory()?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a writer session on the calling thread
    pub fn begin_write(&self) -> SqliteResult<WriteSession<'_>> {
        self.pool.begin_write()
    }

    /// Scoped writer session: commit on `Ok`, roll back on `Err`
    pub fn write<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&WriteSession<'_>) -> SqliteResult<T>,
    {
        self.pool.write(f)
    }

    /// Run a blocking closure against the pool on the blocking thread pool
    async fn blocking<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&SqlitePool) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || f(&pool))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .map_err(Into::into)
    }
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    async fn upsert_nodes(&self, nodes: Vec<Node>) -> StorageResult<()> {
        self.blocking(move |pool| pool.write(|session| session.upsert_nodes(&nodes)))
            .await
    }

    async fn upsert_edges(&self, edges: Vec<Edge>) -> StorageResult<()> {
        self.blocking(move |pool| pool.write(|session| session.upsert_edges(&edges)))
            .await
    }

    async fn upsert_hyperedges(&self, hyperedges: Vec<Hyperedge>) -> StorageResult<()> {
        self.blocking(move |pool| pool.write(|session| session.upsert_hyperedges(&hyperedges)))
            .await
    }

    async fn finalize_full_text_index(&self) -> StorageResult<()> {
        let rows = self
            .blocking(|pool| pool.write(|session| session.rebuild_text_index()))
            .await?;
        info!(rows, "Full-text index finalized");
        Ok(())
    }

    async fn query(&self, options: QueryOptions) -> StorageResult<QueryResult> {
        self.blocking(move |pool| {
            let conn = pool.reader()?;
            query::run_query(&conn, &options)
        })
        .await
    }

    async fn stats(&self) -> StorageResult<GraphStats> {
        self.blocking(|pool| {
            let conn = pool.reader()?;
            records::graph_stats(&conn)
        })
        .await
    }
}

impl SqliteGraphStore {
    /// Indexed content for one node, `None` when absent or the index is detached
    pub async fn indexed_content(&self, node_id: &str) -> StorageResult<Option<String>> {
        let node_id = node_id.to_string();
        self.blocking(move |pool| {
            let conn = pool.reader()?;
            if !text_index::is_available(&conn)? {
                return Ok(None);
            }
            text_index::content_of(&conn, &node_id)
        })
        .await
    }

    /// Write a consistent copy of the database to `dest`
    pub async fn export_snapshot(&self, dest: std::path::PathBuf) -> StorageResult<()> {
        self.blocking(move |pool| pool.export_snapshot(&dest)).await
    }
}
