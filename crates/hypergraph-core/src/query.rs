//! Query contract shared by every backend

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Node};

/// Seed limit used when the caller passes none (or zero)
pub const DEFAULT_QUERY_LIMIT: usize = 10;

/// How expansion edges are chosen when more candidates exist than the budget allows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborRanking {
    /// Prefer edges whose endpoints have the highest total degree
    #[default]
    Degree,
    /// Keep the first edges in id order
    None,
}

impl fmt::Display for NeighborRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborRanking::Degree => write!(f, "degree"),
            NeighborRanking::None => write!(f, "none"),
        }
    }
}

impl FromStr for NeighborRanking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "degree" => Ok(NeighborRanking::Degree),
            "none" => Ok(NeighborRanking::None),
            other => Err(format!("unknown neighbor ranking: {}", other)),
        }
    }
}

/// Options for a bounded retrieval query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Search term; empty (after trimming) means "no filter"
    pub term: String,

    /// Maximum seed nodes; `None` or `Some(0)` means [`DEFAULT_QUERY_LIMIT`]
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub expand_neighbors: bool,

    /// Maximum expansion edges; zero disables expansion
    #[serde(default)]
    pub neighbor_budget: usize,

    #[serde(default)]
    pub neighbor_ranking: NeighborRanking,
}

impl QueryOptions {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Enable neighbor expansion with the given edge budget
    pub fn expand(mut self, neighbor_budget: usize) -> Self {
        self.expand_neighbors = true;
        self.neighbor_budget = neighbor_budget;
        self
    }

    pub fn with_ranking(mut self, ranking: NeighborRanking) -> Self {
        self.neighbor_ranking = ranking;
        self
    }

    /// Seed limit after applying the default
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_QUERY_LIMIT,
        }
    }

    /// Whether expansion should run for a seed set of `seed_count` nodes
    pub fn wants_expansion(&self, seed_count: usize) -> bool {
        self.expand_neighbors && self.neighbor_budget > 0 && seed_count > 0
    }
}

/// Bounded query response: seed nodes plus backfilled neighbors, and the kept edges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn edge_ids(&self) -> Vec<&str> {
        self.edges.iter().map(|e| e.id.as_str()).collect()
    }
}
