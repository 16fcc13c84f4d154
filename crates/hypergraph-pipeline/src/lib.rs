//! Markdown ingestion into the hypergraph
//!
//! The ingestion driver turns a directory of markdown documents into typed
//! nodes and hands them to a [`hypergraph_core::GraphStore`]:
//!
//! 1. **Discover**: walk the profile directory for `*.md` files
//! 2. **Parse**: split YAML front matter from the body
//! 3. **Map**: derive a stable node id and type from the front matter
//! 4. **Check**: compare node types with the loaded graph schema
//! 5. **Store**: upsert every node in one writer session
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hypergraph_pipeline::{ai, Ingestor, IngestorConfig};
//!
//! let ingestor = Ingestor::new(
//!     Arc::new(store),
//!     ai::build_backend("none", ""),
//!     IngestorConfig::default(),
//! );
//! let report = ingestor.ingest_directory(&profile_root).await?;
//! ```

pub mod ai;
pub mod error;
pub mod ingest;
pub mod markdown;
pub mod schema;

pub use ai::{AiBackend, AiError, AiProvider};
pub use error::{PipelineError, PipelineResult};
pub use hypergraph_config::IdStrategy;
pub use ingest::{document_node, IngestReport, Ingestor, IngestorConfig};
pub use markdown::{discover_markdown, MarkdownDocument};
pub use schema::{load_schema, EntitySchema, GraphSchema};
