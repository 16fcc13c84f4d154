//! Async storage trait

use async_trait::async_trait;

use crate::graph::{Edge, GraphStats, Hyperedge, Node};
use crate::query::{QueryOptions, QueryResult};
use crate::storage::StorageResult;

/// Persistent hypergraph with bounded retrieval
///
/// Every batched write runs in its own writer session: either the whole batch
/// is committed or none of it is.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert or replace nodes (type and data are replaced, not merged)
    async fn upsert_nodes(&self, nodes: Vec<Node>) -> StorageResult<()>;

    /// Insert or replace edges
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ReferentialIntegrity` if any endpoint is not a
    /// stored node; no edge of the batch is written in that case.
    async fn upsert_edges(&self, edges: Vec<Edge>) -> StorageResult<()>;

    /// Insert or replace hyperedges, merging their participant lists
    async fn upsert_hyperedges(&self, hyperedges: Vec<Hyperedge>) -> StorageResult<()>;

    /// Rebuild the text index from the current node table
    async fn finalize_full_text_index(&self) -> StorageResult<()>;

    /// Seed search plus optional neighbor expansion
    async fn query(&self, options: QueryOptions) -> StorageResult<QueryResult>;

    async fn stats(&self) -> StorageResult<GraphStats>;
}
