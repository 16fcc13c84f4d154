//! Query engine: seed search plus bounded neighbor expansion
//!
//! 1. Seed search over the text index, falling back to a literal substring
//!    match on `data`/`type` when the index is unavailable.
//! 2. Optional expansion: every edge touching a seed, truncated to the
//!    neighbor budget by id (`none`) or by endpoint degree (`degree`).
//! 3. Backfill of kept-edge endpoints that are not seeds.
//!
//! Everything here is read-only and runs on a caller-provided connection.

use std::collections::{HashMap, HashSet};

use hypergraph_core::{Edge, NeighborRanking, Node, QueryOptions, QueryResult};
use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::error::{SqliteError, SqliteResult};
use crate::records::{row_to_edge, row_to_node, EDGE_COLUMNS, NODE_COLUMNS};
use crate::text_index;

/// Run a query against `conn`
pub fn run_query(conn: &Connection, options: &QueryOptions) -> SqliteResult<QueryResult> {
    let limit = options.effective_limit();
    let mut nodes = seed_nodes(conn, options.term.trim(), limit)?;

    if !options.wants_expansion(nodes.len()) {
        debug!(seeds = nodes.len(), "Query finished without expansion");
        return Ok(QueryResult {
            nodes,
            edges: Vec::new(),
        });
    }

    let seed_ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
    let candidates = candidate_edges(conn, &seed_ids)?;
    let candidate_count = candidates.len();

    let edges = match options.neighbor_ranking {
        NeighborRanking::None => {
            let mut edges = candidates;
            edges.truncate(options.neighbor_budget);
            edges
        }
        NeighborRanking::Degree => rank_by_degree(conn, candidates, options.neighbor_budget)?,
    };

    let neighbors = backfill_neighbors(conn, &seed_ids, &edges)?;
    debug!(
        seeds = seed_ids.len(),
        candidates = candidate_count,
        kept = edges.len(),
        neighbors = neighbors.len(),
        ranking = %options.neighbor_ranking,
        "Query expanded"
    );
    nodes.extend(neighbors);

    Ok(QueryResult { nodes, edges })
}

// ============================================================================
// Seed search
// ============================================================================

fn seed_nodes(conn: &Connection, term: &str, limit: usize) -> SqliteResult<Vec<Node>> {
    if term.is_empty() {
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {NODE_COLUMNS} FROM nodes ORDER BY id LIMIT ?1"))?;
        let nodes = stmt
            .query_map(params![limit as i64], row_to_node)?
            .collect::<Result<_, _>>()?;
        return Ok(nodes);
    }

    match text_index::search(conn, term, limit) {
        Ok(ids) => fetch_in_order(conn, &ids),
        Err(SqliteError::IndexUnavailable(reason)) => {
            warn!(%reason, term, "Text index unavailable, using substring match");
            substring_match(conn, term, limit)
        }
        Err(e) => Err(e),
    }
}

/// Load nodes by id, keeping the order of `ids`
fn fetch_in_order(conn: &Connection, ids: &[String]) -> SqliteResult<Vec<Node>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1"))?;
    let mut nodes = Vec::with_capacity(ids.len());
    for id in ids {
        let mut rows = stmt.query_map([id], row_to_node)?;
        if let Some(node) = rows.next() {
            nodes.push(node?);
        }
    }
    Ok(nodes)
}

/// Escape `term` for use as a literal inside `LIKE ... ESCAPE '\'`
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn substring_match(conn: &Connection, term: &str, limit: usize) -> SqliteResult<Vec<Node>> {
    let pattern = format!("%{}%", escape_like(term));
    let mut stmt = conn.prepare_cached(&format!(
        r#"
        SELECT {NODE_COLUMNS} FROM nodes
        WHERE coalesce(data, '') LIKE ?1 ESCAPE '\' OR type LIKE ?1 ESCAPE '\'
        ORDER BY id
        LIMIT ?2
        "#
    ))?;
    let nodes = stmt
        .query_map(params![pattern, limit as i64], row_to_node)?
        .collect::<Result<_, _>>()?;
    Ok(nodes)
}

// ============================================================================
// Expansion
// ============================================================================

/// Every edge with a seed as source or target, ordered by id
///
/// Ids are bound as one JSON array so the seed count is not limited by the
/// number of SQL variables.
fn candidate_edges(conn: &Connection, seed_ids: &[String]) -> SqliteResult<Vec<Edge>> {
    let ids = serde_json::to_string(seed_ids)?;
    let mut stmt = conn.prepare_cached(&format!(
        r#"
        SELECT {EDGE_COLUMNS} FROM edges
        WHERE source IN (SELECT value FROM json_each(?1))
           OR target IN (SELECT value FROM json_each(?1))
        ORDER BY id
        "#
    ))?;
    let edges = stmt
        .query_map([ids], row_to_edge)?
        .collect::<Result<_, _>>()?;
    Ok(edges)
}

/// Total incident-edge count of a node over the whole edge table
fn degree(conn: &Connection, node_id: &str) -> SqliteResult<u64> {
    let count: i64 = conn
        .prepare_cached(
            "SELECT (SELECT COUNT(*) FROM edges WHERE source = ?1) + (SELECT COUNT(*) FROM edges WHERE target = ?1)",
        )?
        .query_row([node_id], |row| row.get(0))?;
    Ok(count as u64)
}

/// Keep the `budget` edges with the highest endpoint degree sum, ties by id
fn rank_by_degree(conn: &Connection, candidates: Vec<Edge>, budget: usize) -> SqliteResult<Vec<Edge>> {
    let mut degrees: HashMap<String, u64> = HashMap::new();
    for edge in &candidates {
        for endpoint in [&edge.source, &edge.target] {
            if !degrees.contains_key(endpoint) {
                let d = degree(conn, endpoint)?;
                degrees.insert(endpoint.clone(), d);
            }
        }
    }

    let score = |edge: &Edge| -> u64 {
        degrees.get(&edge.source).copied().unwrap_or(0)
            + degrees.get(&edge.target).copied().unwrap_or(0)
    };

    let mut ranked = candidates;
    ranked.sort_by(|a, b| score(b).cmp(&score(a)).then_with(|| a.id.cmp(&b.id)));
    ranked.truncate(budget);
    Ok(ranked)
}

/// Endpoints of `edges` outside the seed set, in id order
fn backfill_neighbors(conn: &Connection, seed_ids: &[String], edges: &[Edge]) -> SqliteResult<Vec<Node>> {
    let seeds: HashSet<&str> = seed_ids.iter().map(String::as_str).collect();
    let mut missing: Vec<String> = edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .filter(|id| !seeds.contains(id))
        .map(str::to_string)
        .collect();
    missing.sort();
    missing.dedup();

    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let ids = serde_json::to_string(&missing)?;
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {NODE_COLUMNS} FROM nodes WHERE id IN (SELECT value FROM json_each(?1)) ORDER BY id"
    ))?;
    let nodes = stmt
        .query_map([ids], row_to_node)?
        .collect::<Result<_, _>>()?;
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SqlitePool;

    fn graph(pool: &SqlitePool) {
        pool.write(|s| {
            s.upsert_nodes(&[
                Node::new("n1", "Person").with_field("name", "Alice"),
                Node::new("n2", "Person").with_field("name", "Bob"),
                Node::new("n3", "Skill").with_field("name", "Rust_100%"),
                Node::new("n4", "Document"),
                Node::new("n5", "Document"),
            ])?;
            s.upsert_edges(&[
                Edge::new("e1", "knows", "n1", "n2"),
                Edge::new("e2", "has_skill", "n1", "n3"),
                Edge::new("e3", "wrote", "n2", "n4"),
                Edge::new("e4", "mentions", "n5", "n2"),
            ])
        })
        .unwrap();
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_empty_term_lists_nodes_by_id() {
        let pool = SqlitePool::memory().unwrap();
        graph(&pool);
        let conn = pool.reader().unwrap();

        let result = run_query(&conn, &QueryOptions::new("  ").with_limit(3)).unwrap();
        assert_eq!(result.node_ids(), vec!["n1", "n2", "n3"]);
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_degree_prefers_hub_edges() {
        let pool = SqlitePool::memory().unwrap();
        graph(&pool);
        let conn = pool.reader().unwrap();

        let opts = QueryOptions::new("Alice").expand(1);
        let result = run_query(&conn, &opts).unwrap();
        assert_eq!(result.edge_ids(), vec!["e1"]);
        assert_eq!(result.node_ids(), vec!["n1", "n2"]);
    }

    #[test]
    fn test_none_ranking_keeps_id_order() {
        let pool = SqlitePool::memory().unwrap();
        graph(&pool);
        let conn = pool.reader().unwrap();

        let opts = QueryOptions::new("Bob")
            .expand(2)
            .with_ranking(NeighborRanking::None);
        let result = run_query(&conn, &opts).unwrap();
        assert_eq!(result.edge_ids(), vec!["e1", "e3"]);
        assert_eq!(result.node_ids(), vec!["n2", "n1", "n4"]);
    }

    #[test]
    fn test_fallback_matches_literal_wildcards() {
        let pool = SqlitePool::memory().unwrap();
        graph(&pool);
        let conn = pool.reader().unwrap();

        assert_eq!(substring_match(&conn, "100%", 10).unwrap().len(), 1);
        assert!(substring_match(&conn, "10_%", 10).unwrap().is_empty());
        assert_eq!(substring_match(&conn, "Docu", 10).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_term_falls_back() {
        let pool = SqlitePool::memory().unwrap();
        graph(&pool);
        let conn = pool.reader().unwrap();

        let result = run_query(&conn, &QueryOptions::new("\"Alice")).unwrap();
        assert_eq!(result.node_ids(), vec!["n1"]);
    }

    #[test]
    fn test_expansion_beyond_sql_variable_limit() {
        const SPOKES: usize = 33_000;

        let pool = SqlitePool::memory().unwrap();
        pool.write(|s| {
            let mut nodes = vec![Node::new("hub", "Person").with_field("name", "Hubert")];
            nodes.extend((0..SPOKES).map(|i| Node::new(format!("s{i:05}"), "Document")));
            s.upsert_nodes(&nodes)?;

            let edges: Vec<Edge> = (0..SPOKES)
                .map(|i| Edge::new(format!("e{i:05}"), "links", "hub", format!("s{i:05}")))
                .collect();
            s.upsert_edges(&edges)
        })
        .unwrap();
        let conn = pool.reader().unwrap();

        // More seeds than SQL variables
        let all = QueryOptions::new("")
            .with_limit(40_000)
            .expand(5)
            .with_ranking(NeighborRanking::None);
        let result = run_query(&conn, &all).unwrap();
        assert_eq!(result.nodes.len(), SPOKES + 1);
        assert_eq!(result.edge_ids(), vec!["e00000", "e00001", "e00002", "e00003", "e00004"]);

        // More backfilled neighbors than SQL variables
        let hub = QueryOptions::new("Hubert")
            .expand(40_000)
            .with_ranking(NeighborRanking::None);
        let result = run_query(&conn, &hub).unwrap();
        assert_eq!(result.edges.len(), SPOKES);
        assert_eq!(result.nodes.len(), SPOKES + 1);
        assert_eq!(result.nodes[0].id, "hub");
        assert_eq!(result.nodes[1].id, "s00000");
    }
}
