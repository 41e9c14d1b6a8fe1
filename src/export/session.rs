//! Export session - connection ownership and transaction state machine
//!
//! One [`ExportSession`] owns the single database connection and its prepared
//! statement set for the lifetime of one export run. No other writer may
//! interleave; every lookup-or-create pair is atomic because this is the only
//! writer.

use rusqlite::{CachedStatement, Connection};
use std::path::Path;
use tracing::debug;

use super::schema;
use crate::{Error, Result};

/// Lifecycle of an export run.
///
/// `Failed` is terminal and reachable from any state; a failed session never
/// commits, so the output file holds no committed data from this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    SchemaReady,
    StatementsReady,
    InTransaction,
    Traversing,
    ViewsReady,
    Committed,
    Failed,
}

/// Owns the connection, the prepared statement set and the run state.
pub struct ExportSession {
    conn: Connection,
    state: SessionState,
}

impl ExportSession {
    /// Open a database file (creates if it doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        tune_pragmas(&conn)?;
        conn.set_prepared_statement_cache_capacity(64);
        Ok(Self { conn, state: SessionState::Uninitialized })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Access the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Fetch a prepared statement from the session's cache
    pub(crate) fn stmt(&self, sql: &str) -> Result<CachedStatement<'_>> {
        Ok(self.conn.prepare_cached(sql)?)
    }

    /// Create all tables and indexes. One-shot; must succeed before traversal.
    pub fn create_schema(&mut self) -> Result<()> {
        self.expect(SessionState::Uninitialized, "create_schema")?;
        for stmt in schema::all_table_statements() {
            if let Err(e) = self.conn.execute(stmt, []) {
                self.state = SessionState::Failed;
                return Err(Error::Export(format!("schema creation failed: {}", e)));
            }
        }
        self.state = SessionState::SchemaReady;
        Ok(())
    }

    /// Prepare the whole fixed statement set. One-shot; a statement that
    /// fails to prepare aborts the run before any row is written.
    pub fn prepare_statements(&mut self) -> Result<()> {
        self.expect(SessionState::SchemaReady, "prepare_statements")?;
        for sql in super::statement_set() {
            if let Err(e) = self.conn.prepare_cached(sql) {
                self.state = SessionState::Failed;
                return Err(Error::Export(format!("statement preparation failed: {}", e)));
            }
        }
        debug!("prepared {} statements", super::statement_set().len());
        self.state = SessionState::StatementsReady;
        Ok(())
    }

    /// Begin the single export transaction
    pub fn begin(&mut self) -> Result<()> {
        self.expect(SessionState::StatementsReady, "begin")?;
        self.conn.execute("BEGIN TRANSACTION", [])?;
        self.state = SessionState::InTransaction;
        Ok(())
    }

    /// Enter the traversal phase
    pub fn begin_traversal(&mut self) -> Result<()> {
        self.expect(SessionState::InTransaction, "begin_traversal")?;
        self.state = SessionState::Traversing;
        Ok(())
    }

    /// Build the derived views after data load
    pub fn create_views(&mut self) -> Result<()> {
        self.expect(SessionState::Traversing, "create_views")?;
        for stmt in schema::all_view_statements() {
            if let Err(e) = self.conn.execute(stmt, []) {
                self.fail();
                return Err(Error::Export(format!("view creation failed: {}", e)));
            }
        }
        self.state = SessionState::ViewsReady;
        Ok(())
    }

    /// Commit the export transaction
    pub fn commit(&mut self) -> Result<()> {
        self.expect(SessionState::ViewsReady, "commit")?;
        self.conn.execute("COMMIT", [])?;
        self.state = SessionState::Committed;
        Ok(())
    }

    /// Abort the run. Rolls back anything the transaction wrote.
    pub fn fail(&mut self) {
        if matches!(
            self.state,
            SessionState::InTransaction | SessionState::Traversing | SessionState::ViewsReady
        ) {
            let _ = self.conn.execute("ROLLBACK", []);
        }
        self.state = SessionState::Failed;
    }

    /// Consume the session, returning the connection for read-side use
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn expect(&mut self, wanted: SessionState, op: &str) -> Result<()> {
        if self.state != wanted {
            let found = self.state;
            self.state = SessionState::Failed;
            return Err(Error::Export(format!(
                "{} called in state {:?}, expected {:?}",
                op, found, wanted
            )));
        }
        Ok(())
    }
}

/// Per-row durability syncing is off for the whole run; a crash mid-export
/// leaves no usable database, and the export re-runs from the source model.
fn tune_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "synchronous", "OFF")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    let _mode: String = conn.query_row("PRAGMA journal_mode = MEMORY", [], |row| row.get(0))?;
    Ok(())
}
