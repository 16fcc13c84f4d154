//! Schema management and migrations
//!
//! `ensure_schema` and `ensure_indexes` are safe to call on every start: all
//! DDL is `IF NOT EXISTS` and the migration version is recorded once. A
//! pre-existing table with an incompatible shape is reported as
//! [`SqliteError::Schema`] and the store refuses to open.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{SqliteError, SqliteResult};

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 1;

/// Columns every base table must expose
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("nodes", &["id", "type", "data"]),
    ("edges", &["id", "type", "source", "target", "data"]),
    ("hyperedges", &["id", "type", "data"]),
    (
        "hyperedge_participants",
        &["hyperedge_id", "entity_id", "role", "ordinal", "data"],
    ),
];

/// Create the base tables if absent and apply pending migrations
pub fn ensure_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| SqliteError::Schema(format!("Failed to create migrations table: {}", e)))?;

    let current_version = get_current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version < SCHEMA_VERSION {
        info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Applying schema migrations"
        );
        apply_migration_v1(conn)?;
    }

    verify_tables(conn)
}

/// Create secondary indexes (idempotent)
pub fn ensure_indexes(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(INDEXES)
        .map_err(|e| SqliteError::Schema(format!("Failed to create indexes: {}", e)))?;
    debug!("Secondary indexes ensured");
    Ok(())
}

/// Get current schema version
fn get_current_version(conn: &Connection) -> SqliteResult<i32> {
    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .map_err(|e| SqliteError::Schema(format!("Failed to read schema version: {}", e)))?;

    Ok(version.unwrap_or(0))
}

/// Record that a migration was applied
fn record_migration(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: nodes, edges, hyperedges and participants
fn apply_migration_v1(conn: &Connection) -> SqliteResult<()> {
    debug!("Applying migration v1: hypergraph tables");

    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| SqliteError::Schema(format!("Failed to apply v1 schema: {}", e)))?;

    record_migration(conn, 1)?;
    info!("Migration v1 applied successfully");
    Ok(())
}

/// Check that every base table has the expected columns
fn verify_tables(conn: &Connection) -> SqliteResult<()> {
    for (table, columns) in REQUIRED_COLUMNS {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let present: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if present.is_empty() {
            return Err(SqliteError::Schema(format!("Table {} is missing", table)));
        }

        let missing: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|col| !present.iter().any(|p| p == col))
            .collect();

        if !missing.is_empty() {
            return Err(SqliteError::Schema(format!(
                "Table {} is incompatible, missing columns: {}",
                table,
                missing.join(", ")
            )));
        }
    }

    Ok(())
}

/// Initial schema SQL
const SCHEMA_V1: &str = r#"
-- ============================================================================
-- TABLE: nodes
-- ============================================================================

CREATE TABLE IF NOT EXISTS nodes (
    id   TEXT PRIMARY KEY NOT NULL,
    type TEXT NOT NULL,
    data TEXT  -- JSON object
);

-- ============================================================================
-- TABLE: edges
-- ============================================================================
-- Binary typed relations; removed together with either endpoint

CREATE TABLE IF NOT EXISTS edges (
    id     TEXT PRIMARY KEY NOT NULL,
    type   TEXT NOT NULL,
    source TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    target TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    data   TEXT
);

-- ============================================================================
-- TABLE: hyperedges
-- ============================================================================

CREATE TABLE IF NOT EXISTS hyperedges (
    id   TEXT PRIMARY KEY NOT NULL,
    type TEXT NOT NULL,
    data TEXT
);

-- ============================================================================
-- TABLE: hyperedge_participants
-- ============================================================================
-- One row per (hyperedge, node, role, ordinal) membership

CREATE TABLE IF NOT EXISTS hyperedge_participants (
    hyperedge_id TEXT NOT NULL REFERENCES hyperedges(id) ON DELETE CASCADE,
    entity_id    TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    role         TEXT NOT NULL DEFAULT '',
    ordinal      INTEGER NOT NULL DEFAULT 0,
    data         TEXT,
    PRIMARY KEY (hyperedge_id, entity_id, role, ordinal)
);
"#;

const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_nodes_type ON nodes(type);
CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target);
CREATE INDEX IF NOT EXISTS idx_participants_hyperedge ON hyperedge_participants(hyperedge_id);
CREATE INDEX IF NOT EXISTS idx_participants_entity ON hyperedge_participants(entity_id);
"#;
