//! Row decoding and point reads shared by the writer and the query engine

use hypergraph_core::{Edge, GraphStats, Hyperedge, Node, Participant, Record};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::SqliteResult;
use crate::text_index;

pub(crate) const NODE_COLUMNS: &str = "id, type, data";
pub(crate) const EDGE_COLUMNS: &str = "id, type, source, target, data";

/// Serialize a record for storage
pub(crate) fn encode_record(record: &Record) -> SqliteResult<String> {
    Ok(serde_json::to_string(record)?)
}

/// Decode the JSON `data` column at `idx`; NULL or empty reads as an empty record
fn decode_record(row: &Row<'_>, idx: usize) -> rusqlite::Result<Record> {
    let raw: Option<String> = row.get(idx)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Record::new()),
        Some(text) => serde_json::from_str(text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

pub(crate) fn row_to_node(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: row.get(0)?,
        node_type: row.get(1)?,
        data: decode_record(row, 2)?,
    })
}

pub(crate) fn row_to_edge(row: &Row<'_>) -> rusqlite::Result<Edge> {
    Ok(Edge {
        id: row.get(0)?,
        edge_type: row.get(1)?,
        source: row.get(2)?,
        target: row.get(3)?,
        data: decode_record(row, 4)?,
    })
}

fn row_to_participant(row: &Row<'_>) -> rusqlite::Result<Participant> {
    Ok(Participant {
        entity_id: row.get(0)?,
        role: row.get(1)?,
        ordinal: row.get(2)?,
        data: decode_record(row, 3)?,
    })
}

pub fn get_node(conn: &Connection, id: &str) -> SqliteResult<Option<Node>> {
    let node = conn
        .prepare_cached(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1"))?
        .query_row([id], row_to_node)
        .optional()?;
    Ok(node)
}

pub fn get_edge(conn: &Connection, id: &str) -> SqliteResult<Option<Edge>> {
    let edge = conn
        .prepare_cached(&format!("SELECT {EDGE_COLUMNS} FROM edges WHERE id = ?1"))?
        .query_row([id], row_to_edge)
        .optional()?;
    Ok(edge)
}

/// Load a hyperedge with its participants ordered by `(ordinal, role, entity_id)`
pub fn get_hyperedge(conn: &Connection, id: &str) -> SqliteResult<Option<Hyperedge>> {
    let head = conn
        .prepare_cached("SELECT id, type, data FROM hyperedges WHERE id = ?1")?
        .query_row([id], |row| {
            Ok(Hyperedge {
                id: row.get(0)?,
                hyperedge_type: row.get(1)?,
                data: decode_record(row, 2)?,
                participants: Vec::new(),
            })
        })
        .optional()?;

    let Some(mut hyperedge) = head else {
        return Ok(None);
    };

    let mut stmt = conn.prepare_cached(
        r#"
        SELECT entity_id, role, ordinal, data
        FROM hyperedge_participants
        WHERE hyperedge_id = ?1
        ORDER BY ordinal, role, entity_id
        "#,
    )?;
    hyperedge.participants = stmt
        .query_map(params![id], row_to_participant)?
        .collect::<Result<_, _>>()?;

    Ok(Some(hyperedge))
}

pub fn node_exists(conn: &Connection, id: &str) -> SqliteResult<bool> {
    let exists: bool = conn
        .prepare_cached("SELECT EXISTS(SELECT 1 FROM nodes WHERE id = ?1)")?
        .query_row([id], |row| row.get(0))?;
    Ok(exists)
}

pub fn graph_stats(conn: &Connection) -> SqliteResult<GraphStats> {
    let count = |table: &str| -> SqliteResult<u64> {
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n as u64)
    };

    Ok(GraphStats {
        nodes: count("nodes")?,
        edges: count("edges")?,
        hyperedges: count("hyperedges")?,
        participants: count("hyperedge_participants")?,
        text_index_rows: text_index::row_count(conn)?,
    })
}
