//! Graph schema loading
//!
//! Resolution order:
//! 1. explicit path
//! 2. `SCHEMA_PATH` environment variable
//! 3. `config/graph_schema.yaml`
//! 4. built-in default schema
//!
//! A missing file falls through to the default; a file that exists but does
//! not parse is an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, PipelineResult};

pub const SCHEMA_PATH_ENV: &str = "SCHEMA_PATH";

/// One node label the graph expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    #[serde(default = "unknown_label")]
    pub label: String,
    #[serde(default)]
    pub pk: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

fn unknown_label() -> String {
    "Unknown".to_string()
}

impl EntitySchema {
    fn new(label: &str, pk: &[&str], examples: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            pk: pk.iter().map(|s| s.to_string()).collect(),
            examples: examples.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SchemaMeta {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    meta: Option<SchemaMeta>,
    #[serde(default)]
    entities: Option<Vec<EntitySchema>>,
}

/// Node labels declared for a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSchema {
    pub name: String,
    pub version: String,
    pub description: String,
    pub entities: Vec<EntitySchema>,
}

impl Default for GraphSchema {
    fn default() -> Self {
        Self {
            name: "default_graph".to_string(),
            version: "1.0".to_string(),
            description: "Generic schema for nodes derived from markdown documents.".to_string(),
            entities: vec![
                EntitySchema::new("Document", &["id"], &["generic_markdown_doc"]),
                EntitySchema::new("Person", &["name"], &["Example Person"]),
                EntitySchema::new("Organization", &["name"], &["Example Org"]),
                EntitySchema::new("Skill", &["name"], &["Python", "Cloud"]),
            ],
        }
    }
}

impl GraphSchema {
    /// Parse schema YAML (`meta` + `entities`), filling absent fields
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        let file: SchemaFile = if text.trim().is_empty() {
            SchemaFile::default()
        } else {
            serde_yaml::from_str(text)?
        };
        let meta = file.meta.unwrap_or_default();

        Ok(Self {
            name: meta.name.unwrap_or_else(|| "graph".to_string()),
            version: meta.version.unwrap_or_else(|| "1.0".to_string()),
            description: meta.description.unwrap_or_default(),
            entities: file.entities.unwrap_or_default(),
        })
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn declares(&self, label: &str) -> bool {
        self.entities.iter().any(|e| e.label == label)
    }
}

/// Resolve and load the graph schema
pub fn load_schema(explicit: Option<&Path>) -> PipelineResult<GraphSchema> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => std::env::var(SCHEMA_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new("config").join("graph_schema.yaml")),
    };

    if !path.is_file() {
        let schema = GraphSchema::default();
        info!(
            schema_path = %path.display(),
            entities = ?schema.labels(),
            "Schema file missing, using default schema"
        );
        return Ok(schema);
    }

    let text = std::fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;
    let schema = GraphSchema::from_yaml(&text).map_err(|e| PipelineError::Schema {
        path: path.clone(),
        message: e.to_string(),
    })?;

    info!(
        schema_path = %path.display(),
        name = %schema.name,
        version = %schema.version,
        entities = ?schema.labels(),
        "Schema loaded"
    );
    Ok(schema)
}
