//! SQLite storage backend for the hypergraph
//!
//! ## Features
//!
//! - **Idempotent upserts**: nodes, edges and hyperedges keyed by id
//! - **Referential integrity**: edges and participants must point at stored nodes
//! - **FTS5 Full-Text Search**: node content kept in sync by triggers, with a
//!   full rebuild for bulk loads
//! - **Bounded queries**: seed search plus degree-ranked neighbor expansion
//! - **WAL Mode**: readers query the last committed snapshot while a writer works
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hypergraph_core::{GraphStore, Node, QueryOptions};
//! use hypergraph_sqlite::{SqliteConfig, SqliteGraphStore};
//!
//! let store = SqliteGraphStore::open(SqliteConfig::new("./hypergraph.db"))?;
//! store.upsert_nodes(vec![Node::new("n1", "Person").with_field("name", "Alice")]).await?;
//!
//! let result = store.query(QueryOptions::new("Alice").expand(10)).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod query;
pub mod records;
pub mod schema;
pub mod store;
pub mod text_index;
pub mod writer;

// Re-exports
pub use config::{SqliteConfig, WriteMode};
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use query::run_query;
pub use store::SqliteGraphStore;
pub use writer::WriteSession;
