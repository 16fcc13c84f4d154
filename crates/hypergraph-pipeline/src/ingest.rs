//! Directory ingestion orchestrator

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use hypergraph_config::IdStrategy;
use hypergraph_core::{GraphStore, Node};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ai::AiBackend;
use crate::error::PipelineResult;
use crate::markdown::{discover_markdown, MarkdownDocument};
use crate::schema::GraphSchema;

/// Node type used when front matter has none
pub const DEFAULT_NODE_TYPE: &str = "Document";

/// Hex characters kept from the content hash
const CONTENT_HASH_LEN: usize = 16;

/// Configuration for ingestion behavior
#[derive(Debug, Clone, Default)]
pub struct IngestorConfig {
    /// Fallback id derivation for documents without an explicit `id`
    pub id_strategy: IdStrategy,
    /// Rebuild the text index once all nodes are written
    pub bulk: bool,
    /// Declared node labels; undeclared types are reported, not rejected
    pub schema: GraphSchema,
}

/// Outcome of one directory ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Markdown files read
    pub documents: usize,
    /// Distinct node ids written
    pub nodes: usize,
    /// Node types missing from the schema, sorted
    pub unknown_types: Vec<String>,
}

/// Map a parsed document to its node
///
/// The id is the front matter `id` (string or number), else the content hash
/// when that strategy is selected, else the file stem. The type is the front
/// matter `type` or [`DEFAULT_NODE_TYPE`]. The front matter becomes `data`.
pub fn document_node(doc: &MarkdownDocument, strategy: IdStrategy) -> Node {
    let id = explicit_id(doc).unwrap_or_else(|| match strategy {
        IdStrategy::ContentHash => content_hash(&doc.text),
        IdStrategy::Filename => doc.stem().unwrap_or_default().to_string(),
    });
    let node_type = doc.meta_str("type").unwrap_or(DEFAULT_NODE_TYPE);

    Node::new(id, node_type).with_data(doc.metadata.clone())
}

fn explicit_id(doc: &MarkdownDocument) -> Option<String> {
    match doc.metadata.get("id")? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn content_hash(text: &str) -> String {
    let hex = blake3::hash(text.as_bytes()).to_hex();
    hex.as_str()[..CONTENT_HASH_LEN].to_string()
}

/// Markdown-to-graph ingestion driver
///
/// ```text
/// Ingestor
///   ├─> discover_markdown   (walk profile directory)
///   ├─> MarkdownDocument    (front matter split)
///   ├─> document_node       (id + type derivation)
///   └─> GraphStore          (one writer session, optional index rebuild)
/// ```
pub struct Ingestor {
    store: Arc<dyn GraphStore>,
    ai: Arc<dyn AiBackend>,
    config: IngestorConfig,
}

impl Ingestor {
    pub fn new(store: Arc<dyn GraphStore>, ai: Arc<dyn AiBackend>, config: IngestorConfig) -> Self {
        Self { store, ai, config }
    }

    pub fn config(&self) -> &IngestorConfig {
        &self.config
    }

    /// Parse every markdown file under `root` and upsert one node per file
    ///
    /// All nodes are written in a single batch, so a storage failure leaves the
    /// graph untouched. In bulk mode the text index is rebuilt afterwards.
    pub async fn ingest_directory(&self, root: &Path) -> PipelineResult<IngestReport> {
        info!(
            root = %root.display(),
            id_strategy = %self.config.id_strategy,
            bulk = self.config.bulk,
            ai_provider = %self.ai.provider(),
            "Ingesting markdown"
        );

        let files = discover_markdown(root);
        let mut nodes = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();
        let mut unknown = BTreeSet::new();

        for path in &files {
            let doc = MarkdownDocument::load(path).await?;
            let node = document_node(&doc, self.config.id_strategy);

            if node.id.is_empty() {
                warn!(path = %path.display(), "Skipping document without a usable id");
                continue;
            }
            if !self.config.schema.declares(&node.node_type) {
                warn!(path = %path.display(), node_type = %node.node_type, "Node type not in schema");
                unknown.insert(node.node_type.clone());
            }
            if !seen.insert(node.id.clone()) {
                warn!(path = %path.display(), id = %node.id, "Duplicate node id, later document wins");
            }

            debug!(path = %path.display(), id = %node.id, node_type = %node.node_type, "Document mapped");
            nodes.push(node);
        }

        let report = IngestReport {
            documents: files.len(),
            nodes: seen.len(),
            unknown_types: unknown.into_iter().collect(),
        };

        if !nodes.is_empty() {
            self.store.upsert_nodes(nodes).await?;
        }
        if self.config.bulk {
            self.store.finalize_full_text_index().await?;
        }

        info!(
            documents = report.documents,
            nodes = report.nodes,
            unknown_types = ?report.unknown_types,
            "Ingestion finished"
        );
        Ok(report)
    }
}
