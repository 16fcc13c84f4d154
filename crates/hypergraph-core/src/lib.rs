//! # Hypergraph Core
//!
//! Backend-agnostic types and traits for the typed hypergraph store.
//!
//! The graph is made of three kinds of records:
//!
//! - [`Node`] - atomic typed entity with an opaque JSON [`Record`]
//! - [`Edge`] - binary typed relation between two nodes
//! - [`Hyperedge`] - n-ary relation whose members are role/ordinal tagged [`Participant`]s
//!
//! Storage backends implement [`GraphStore`]; callers (CLI, transports) only
//! depend on this crate plus whichever backend they inject.
//!
//! ```rust,ignore
//! use hypergraph_core::{GraphStore, Node, QueryOptions};
//!
//! async fn example(store: &dyn GraphStore) -> hypergraph_core::StorageResult<()> {
//!     store.upsert_nodes(vec![Node::new("n1", "Person").with_field("name", "Alice")]).await?;
//!     let result = store.query(QueryOptions::new("Alice").expand(10)).await?;
//!     assert_eq!(result.nodes[0].id, "n1");
//!     Ok(())
//! }
//! ```

pub mod graph;
pub mod query;
pub mod storage;

pub use graph::{Edge, GraphStats, Hyperedge, Node, Participant, Record};
pub use query::{NeighborRanking, QueryOptions, QueryResult, DEFAULT_QUERY_LIMIT};
pub use storage::{GraphStore, StorageError, StorageResult};
