//! Full-text index over node content
//!
//! `nodes_fts` is an FTS5 table keyed by the `nodes` rowid. Its content for a
//! node is the indexed JSON fields of `data` followed by the node type, joined
//! by single spaces. Incremental maintenance is done by triggers on `nodes`, so
//! no write path can skip it; the full rebuild uses the same SQL expression,
//! so both modes produce identical rows.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{SqliteError, SqliteResult};

/// JSON paths extracted from `nodes.data`, in content order
pub const INDEXED_FIELDS: &[&str] = &["$.name", "$.about"];

const FTS_TABLE: &str = "nodes_fts";
const TRIGGERS: &[&str] = &["nodes_fts_ai", "nodes_fts_au", "nodes_fts_ad"];

/// Content expression over a row of `nodes`; `row` is `""`, `"NEW."` or `"OLD."`
fn content_expr(row: &str) -> String {
    let mut parts: Vec<String> = INDEXED_FIELDS
        .iter()
        .map(|path| format!("coalesce(json_extract({row}data, '{path}'), '')"))
        .collect();
    parts.push(format!("{row}type"));
    parts.join(" || ' ' || ")
}

fn create_table_sql() -> String {
    format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS {FTS_TABLE} USING fts5(id UNINDEXED, content, tokenize = 'porter');"
    )
}

fn create_triggers_sql() -> String {
    let new_content = content_expr("NEW.");
    format!(
        r#"
CREATE TRIGGER IF NOT EXISTS nodes_fts_ai AFTER INSERT ON nodes BEGIN
    INSERT INTO {FTS_TABLE} (rowid, id, content) VALUES (NEW.rowid, NEW.id, {new_content});
END;
CREATE TRIGGER IF NOT EXISTS nodes_fts_au AFTER UPDATE ON nodes BEGIN
    DELETE FROM {FTS_TABLE} WHERE rowid = OLD.rowid;
    INSERT INTO {FTS_TABLE} (rowid, id, content) VALUES (NEW.rowid, NEW.id, {new_content});
END;
CREATE TRIGGER IF NOT EXISTS nodes_fts_ad AFTER DELETE ON nodes BEGIN
    DELETE FROM {FTS_TABLE} WHERE rowid = OLD.rowid;
END;
"#
    )
}

/// Whether the text index table exists
pub fn is_available(conn: &Connection) -> SqliteResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [FTS_TABLE],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Install incremental maintenance
///
/// When the index table is missing it is created and backfilled first, so the
/// index always reflects the full node table once the triggers are active.
pub fn install(conn: &Connection) -> SqliteResult<()> {
    if is_available(conn)? {
        conn.execute_batch(&create_triggers_sql())?;
        return Ok(());
    }

    debug!("Text index missing, creating and backfilling");
    rebuild(conn)?;
    Ok(())
}

/// Drop the index and its triggers (bulk ingest)
pub fn detach(conn: &Connection) -> SqliteResult<()> {
    for trigger in TRIGGERS {
        conn.execute_batch(&format!("DROP TRIGGER IF EXISTS {trigger};"))?;
    }
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {FTS_TABLE};"))?;
    debug!("Text index detached");
    Ok(())
}

/// Clear the index, regenerate every row from `nodes`, and reinstall triggers
///
/// Returns the number of indexed rows.
pub fn rebuild(conn: &Connection) -> SqliteResult<usize> {
    conn.execute_batch(&create_table_sql())?;
    conn.execute(&format!("DELETE FROM {FTS_TABLE}"), [])?;
    let rows = conn.execute(
        &format!(
            "INSERT INTO {FTS_TABLE} (rowid, id, content) SELECT rowid, id, {} FROM nodes",
            content_expr("")
        ),
        [],
    )?;
    conn.execute_batch(&create_triggers_sql())?;

    info!(rows, "Text index rebuilt");
    Ok(rows)
}

/// Indexed content for one node id, if present
pub fn content_of(conn: &Connection, node_id: &str) -> SqliteResult<Option<String>> {
    let content = conn
        .query_row(
            &format!("SELECT content FROM {FTS_TABLE} WHERE id = ?1"),
            params![node_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(content)
}

/// All `(id, content)` rows ordered by id
pub fn entries(conn: &Connection) -> SqliteResult<Vec<(String, String)>> {
    let mut stmt = conn.prepare(&format!("SELECT id, content FROM {FTS_TABLE} ORDER BY id"))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<_, _>>()?;
    Ok(rows)
}

pub fn row_count(conn: &Connection) -> SqliteResult<Option<u64>> {
    if !is_available(conn)? {
        return Ok(None);
    }
    let count: i64 =
        conn.query_row(&format!("SELECT COUNT(*) FROM {FTS_TABLE}"), [], |row| row.get(0))?;
    Ok(Some(count as u64))
}

/// Ids of nodes matching `term`, best match first
///
/// Any failure (missing table, malformed match expression) is reported as
/// [`SqliteError::IndexUnavailable`] so callers can fall back.
pub fn search(conn: &Connection, term: &str, limit: usize) -> SqliteResult<Vec<String>> {
    if !is_available(conn)? {
        return Err(SqliteError::IndexUnavailable(format!("{FTS_TABLE} does not exist")));
    }

    let run = || -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT id FROM {FTS_TABLE} WHERE {FTS_TABLE} MATCH ?1 ORDER BY rank, id LIMIT ?2"
        ))?;
        let ids = stmt
            .query_map(params![term, limit as i64], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        Ok(ids)
    };

    run().map_err(|e| SqliteError::IndexUnavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        schema::ensure_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_content_expression_covers_fields_and_type() {
        let expr = content_expr("NEW.");
        assert!(expr.contains("json_extract(NEW.data, '$.name')"));
        assert!(expr.contains("json_extract(NEW.data, '$.about')"));
        assert!(expr.ends_with("NEW.type"));
    }

    #[test]
    fn test_install_backfills_existing_nodes() {
        let conn = setup();
        conn.execute(
            "INSERT INTO nodes (id, type, data) VALUES ('n1', 'Person', '{\"name\":\"Alice\",\"about\":\"engineer\"}')",
            [],
        )
        .unwrap();

        install(&conn).unwrap();

        assert_eq!(
            content_of(&conn, "n1").unwrap().as_deref(),
            Some("Alice engineer Person")
        );
    }

    #[test]
    fn test_triggers_follow_insert_update_delete() {
        let conn = setup();
        install(&conn).unwrap();

        conn.execute(
            "INSERT INTO nodes (id, type, data) VALUES ('n1', 'Person', '{\"name\":\"Alice\"}')",
            [],
        )
        .unwrap();
        assert_eq!(content_of(&conn, "n1").unwrap().as_deref(), Some("Alice  Person"));

        conn.execute(
            "UPDATE nodes SET type = 'Author', data = '{\"name\":\"Alicia\"}' WHERE id = 'n1'",
            [],
        )
        .unwrap();
        assert_eq!(content_of(&conn, "n1").unwrap().as_deref(), Some("Alicia  Author"));
        assert_eq!(row_count(&conn).unwrap(), Some(1));

        conn.execute("DELETE FROM nodes WHERE id = 'n1'", []).unwrap();
        assert_eq!(content_of(&conn, "n1").unwrap(), None);
        assert_eq!(row_count(&conn).unwrap(), Some(0));
    }

    #[test]
    fn test_detach_makes_index_unavailable() {
        let conn = setup();
        install(&conn).unwrap();
        detach(&conn).unwrap();

        assert!(!is_available(&conn).unwrap());
        assert_eq!(row_count(&conn).unwrap(), None);
        assert!(matches!(
            search(&conn, "anything", 5),
            Err(SqliteError::IndexUnavailable(_))
        ));

        // Node writes still work without the index
        conn.execute("INSERT INTO nodes (id, type) VALUES ('n1', 'Doc')", [])
            .unwrap();
    }

    #[test]
    fn test_search_uses_stemming() {
        let conn = setup();
        install(&conn).unwrap();
        conn.execute(
            "INSERT INTO nodes (id, type, data) VALUES ('n1', 'Skill', '{\"name\":\"Running\"}')",
            [],
        )
        .unwrap();

        assert_eq!(search(&conn, "runs", 10).unwrap(), vec!["n1".to_string()]);
    }

    #[test]
    fn test_malformed_match_is_index_unavailable() {
        let conn = setup();
        install(&conn).unwrap();

        assert!(matches!(
            search(&conn, "\"unbalanced", 10),
            Err(SqliteError::IndexUnavailable(_))
        ));
    }

    #[test]
    fn test_rebuild_matches_incremental() {
        let conn = setup();
        install(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO nodes (id, type, data) VALUES ('a', 'Person', '{"name":"Ann"}');
            INSERT INTO nodes (id, type, data) VALUES ('b', 'Org', '{"about":"widgets"}');
            UPDATE nodes SET data = '{"name":"Anna","about":"chemist"}' WHERE id = 'a';
            INSERT INTO nodes (id, type, data) VALUES ('c', 'Doc', NULL);
            DELETE FROM nodes WHERE id = 'b';
            "#,
        )
        .unwrap();
        let incremental = entries(&conn).unwrap();

        assert_eq!(rebuild(&conn).unwrap(), 2);
        assert_eq!(entries(&conn).unwrap(), incremental);
    }
}
