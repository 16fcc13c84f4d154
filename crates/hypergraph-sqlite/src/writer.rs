//! Graph writer sessions
//!
//! A [`WriteSession`] owns the writer connection for the duration of one
//! `BEGIN IMMEDIATE` transaction. All upserts go through it; it ends with
//! [`WriteSession::commit`] or [`WriteSession::rollback`], and dropping an
//! unfinished session rolls back, so no exit path leaves a transaction open.
//!
//! Merge policy:
//! - nodes and edges: full replace of every non-key column
//! - hyperedges: full replace of `type`/`data`; participants are upserted one
//!   by one on `(hyperedge_id, entity_id, role, ordinal)` and stored
//!   participants absent from the new list are kept

use hypergraph_core::{Edge, Hyperedge, Node};
use parking_lot::MutexGuard;
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::config::WriteMode;
use crate::error::{SqliteError, SqliteResult};
use crate::records::{self, encode_record};
use crate::text_index;

const UPSERT_NODE: &str = r#"
    INSERT INTO nodes (id, type, data)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(id) DO UPDATE SET
        type = excluded.type,
        data = excluded.data
"#;

const UPSERT_EDGE: &str = r#"
    INSERT INTO edges (id, type, source, target, data)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(id) DO UPDATE SET
        type   = excluded.type,
        source = excluded.source,
        target = excluded.target,
        data   = excluded.data
"#;

const UPSERT_HYPEREDGE: &str = r#"
    INSERT INTO hyperedges (id, type, data)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(id) DO UPDATE SET
        type = excluded.type,
        data = excluded.data
"#;

const UPSERT_PARTICIPANT: &str = r#"
    INSERT INTO hyperedge_participants (hyperedge_id, entity_id, role, ordinal, data)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(hyperedge_id, entity_id, role, ordinal) DO UPDATE SET
        data = excluded.data
"#;

/// Exclusive, transactional write access to the graph
pub struct WriteSession<'a> {
    conn: MutexGuard<'a, Connection>,
    mode: WriteMode,
    finished: bool,
}

impl<'a> WriteSession<'a> {
    pub(crate) fn begin(conn: MutexGuard<'a, Connection>, mode: WriteMode) -> SqliteResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE;")?;

        // From here on Drop guarantees a rollback if setup fails
        let session = Self {
            conn,
            mode,
            finished: false,
        };

        match mode {
            WriteMode::Standard => text_index::install(&session.conn)?,
            WriteMode::BulkIngest => text_index::detach(&session.conn)?,
        }

        info!(mode = ?mode, "Writer session opened");
        Ok(session)
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// The session connection, checked to still be inside its transaction
    fn conn(&self, operation: &str) -> SqliteResult<&Connection> {
        if self.finished || self.conn.is_autocommit() {
            return Err(SqliteError::NotInSession(operation.to_string()));
        }
        Ok(&*self.conn)
    }

    /// Commit every write of this session
    pub fn commit(mut self) -> SqliteResult<()> {
        self.finished = true;
        if let Err(e) = self.conn.execute_batch("COMMIT;") {
            if !self.conn.is_autocommit() {
                let _ = self.conn.execute_batch("ROLLBACK;");
            }
            warn!(error = %e, "Writer session commit failed, rolled back");
            return Err(e.into());
        }
        info!("Writer session committed");
        Ok(())
    }

    /// Discard every write of this session
    pub fn rollback(mut self) -> SqliteResult<()> {
        self.finished = true;
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK;")?;
        }
        warn!("Writer session rolled back");
        Ok(())
    }

    /// Close the session, committing when `commit` is true
    pub fn close(self, commit: bool) -> SqliteResult<()> {
        if commit {
            self.commit()
        } else {
            self.rollback()
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    pub fn upsert_node(&self, node: &Node) -> SqliteResult<()> {
        self.upsert_nodes(std::slice::from_ref(node))
    }

    pub fn upsert_nodes(&self, nodes: &[Node]) -> SqliteResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        let conn = self.conn("upsert_nodes")?;
        let mut stmt = conn.prepare_cached(UPSERT_NODE)?;

        for node in nodes {
            debug!(id = %node.id, node_type = %node.node_type, "upsert_node");
            stmt.execute(params![node.id, node.node_type, encode_record(&node.data)?])
                .map_err(|e| SqliteError::from_write(e, "node", &node.id))?;
        }
        Ok(())
    }

    /// Delete a node; its edges, participations and index entry go with it
    pub fn delete_node(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn("delete_node")?;
        let removed = conn
            .prepare_cached("DELETE FROM nodes WHERE id = ?1")?
            .execute([id])?;
        debug!(id, removed, "delete_node");
        Ok(removed > 0)
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    pub fn upsert_edge(&self, edge: &Edge) -> SqliteResult<()> {
        self.upsert_edges(std::slice::from_ref(edge))
    }

    /// Upsert edges; both endpoints of each must already be stored nodes
    pub fn upsert_edges(&self, edges: &[Edge]) -> SqliteResult<()> {
        if edges.is_empty() {
            return Ok(());
        }
        let conn = self.conn("upsert_edges")?;
        let mut stmt = conn.prepare_cached(UPSERT_EDGE)?;

        for edge in edges {
            debug!(
                id = %edge.id,
                edge_type = %edge.edge_type,
                source = %edge.source,
                target = %edge.target,
                "upsert_edge"
            );
            stmt.execute(params![
                edge.id,
                edge.edge_type,
                edge.source,
                edge.target,
                encode_record(&edge.data)?,
            ])
            .map_err(|e| self.integrity_error(e, "edge", &edge.id, &[&edge.source, &edge.target]))?;
        }
        Ok(())
    }

    pub fn delete_edge(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn("delete_edge")?;
        let removed = conn
            .prepare_cached("DELETE FROM edges WHERE id = ?1")?
            .execute([id])?;
        Ok(removed > 0)
    }

    // ------------------------------------------------------------------
    // Hyperedges
    // ------------------------------------------------------------------

    pub fn upsert_hyperedge(&self, hyperedge: &Hyperedge) -> SqliteResult<()> {
        self.upsert_hyperedges(std::slice::from_ref(hyperedge))
    }

    pub fn upsert_hyperedges(&self, hyperedges: &[Hyperedge]) -> SqliteResult<()> {
        if hyperedges.is_empty() {
            return Ok(());
        }
        let conn = self.conn("upsert_hyperedges")?;
        let mut head = conn.prepare_cached(UPSERT_HYPEREDGE)?;
        let mut member = conn.prepare_cached(UPSERT_PARTICIPANT)?;

        for hyperedge in hyperedges {
            debug!(
                id = %hyperedge.id,
                hyperedge_type = %hyperedge.hyperedge_type,
                participants = hyperedge.participants.len(),
                "upsert_hyperedge"
            );
            head.execute(params![
                hyperedge.id,
                hyperedge.hyperedge_type,
                encode_record(&hyperedge.data)?,
            ])
            .map_err(|e| SqliteError::from_write(e, "hyperedge", &hyperedge.id))?;

            for participant in &hyperedge.participants {
                member
                    .execute(params![
                        hyperedge.id,
                        participant.entity_id,
                        participant.role,
                        participant.ordinal,
                        encode_record(&participant.data)?,
                    ])
                    .map_err(|e| {
                        self.integrity_error(
                            e,
                            "hyperedge participant",
                            &hyperedge.id,
                            &[&participant.entity_id],
                        )
                    })?;
            }
        }
        Ok(())
    }

    /// Delete a hyperedge and all of its participant rows
    pub fn delete_hyperedge(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn("delete_hyperedge")?;
        let removed = conn
            .prepare_cached("DELETE FROM hyperedges WHERE id = ?1")?
            .execute([id])?;
        Ok(removed > 0)
    }

    // ------------------------------------------------------------------
    // Reads inside the transaction
    // ------------------------------------------------------------------

    /// Read a node as seen by this session (including uncommitted writes)
    pub fn get_node(&self, id: &str) -> SqliteResult<Option<Node>> {
        records::get_node(self.conn("get_node")?, id)
    }

    /// Regenerate the text index from the node table and reinstall its triggers
    pub fn rebuild_text_index(&self) -> SqliteResult<usize> {
        text_index::rebuild(self.conn("rebuild_text_index")?)
    }

    /// Name the missing node ids behind a foreign key failure
    fn integrity_error(
        &self,
        err: rusqlite::Error,
        entity: &'static str,
        id: &str,
        referenced: &[&str],
    ) -> SqliteError {
        if !SqliteError::is_foreign_key_failure(&err) {
            return SqliteError::from_write(err, entity, id);
        }

        let missing: Vec<&str> = referenced
            .iter()
            .copied()
            .filter(|node_id| !matches!(records::node_exists(&self.conn, node_id), Ok(true)))
            .collect();

        SqliteError::ReferentialIntegrity {
            entity,
            id: id.to_string(),
            detail: if missing.is_empty() {
                err.to_string()
            } else {
                format!("missing node(s): {}", missing.join(", "))
            },
        }
    }
}

impl Drop for WriteSession<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if !self.conn.is_autocommit() {
            match self.conn.execute_batch("ROLLBACK;") {
                Ok(()) => warn!("Writer session dropped without commit, rolled back"),
                Err(e) => warn!(error = %e, "Rollback of dropped writer session failed"),
            }
        }
    }
}
