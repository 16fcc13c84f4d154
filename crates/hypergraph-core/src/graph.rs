//! Graph record types
//!
//! Every record carries an opaque `data` document. It is a string-keyed map of
//! JSON values and is persisted as JSON text, never as a dynamic object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque structured record attached to nodes, edges, hyperedges and participants
pub type Record = Map<String, Value>;

// ============================================================================
// Node
// ============================================================================

/// Atomic typed entity in the graph
///
/// Re-upserting a node replaces both `type` and `data`; fields are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default)]
    pub data: Record,
}

impl Node {
    /// Create a node with an empty data record
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            data: Record::new(),
        }
    }

    /// Replace the data record
    pub fn with_data(mut self, data: Record) -> Self {
        self.data = data;
        self
    }

    /// Set a single data field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Read a string field from the data record
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

// ============================================================================
// Edge
// ============================================================================

/// Binary typed relation between two existing nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,

    #[serde(rename = "type")]
    pub edge_type: String,

    pub source: String,
    pub target: String,

    #[serde(default)]
    pub data: Record,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        edge_type: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            edge_type: edge_type.into(),
            source: source.into(),
            target: target.into(),
            data: Record::new(),
        }
    }

    pub fn with_data(mut self, data: Record) -> Self {
        self.data = data;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Whether `node_id` is either endpoint of this edge
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

// ============================================================================
// Hyperedge
// ============================================================================

/// Membership of a node in a hyperedge
///
/// `(hyperedge, entity_id, role, ordinal)` is unique, so one node may appear
/// several times under different roles or ordinals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub entity_id: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub ordinal: i64,

    #[serde(default)]
    pub data: Record,
}

impl Participant {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            role: String::new(),
            ordinal: 0,
            data: Record::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_ordinal(mut self, ordinal: i64) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn with_data(mut self, data: Record) -> Self {
        self.data = data;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// N-ary typed relation among nodes
///
/// Upserting a hyperedge merges its participant list into the stored one:
/// rows with a matching key get their `data` replaced, other stored rows are
/// kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperedge {
    pub id: String,

    #[serde(rename = "type")]
    pub hyperedge_type: String,

    #[serde(default)]
    pub data: Record,

    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Hyperedge {
    pub fn new(id: impl Into<String>, hyperedge_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hyperedge_type: hyperedge_type.into(),
            data: Record::new(),
            participants: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: Record) -> Self {
        self.data = data;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    pub fn with_participants(mut self, participants: impl IntoIterator<Item = Participant>) -> Self {
        self.participants.extend(participants);
        self
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Row counts across the persisted tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: u64,
    pub edges: u64,
    pub hyperedges: u64,
    pub participants: u64,
    /// `None` when the text index is not installed
    pub text_index_rows: Option<u64>,
}
