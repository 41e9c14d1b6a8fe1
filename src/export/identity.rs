//! Identity registry - stable ids for symbolic reference keys and file paths
//!
//! Lookup-or-create: the first resolution of a key creates its id, every
//! later resolution returns the same id. Ids are never reused or reassigned
//! for the lifetime of the export. A key may receive an id long before (or
//! without ever) receiving an attribute row; such identity-only records are
//! expected, e.g. for external cross-reference targets.

use rusqlite::OptionalExtension;
use tracing::{debug, warn};

use super::session::ExportSession;
use crate::Result;

pub(crate) const REFID_SELECT: &str = "SELECT rowid FROM refid WHERE refid = ?1";
pub(crate) const REFID_INSERT: &str = "INSERT INTO refid (refid) VALUES (?1)";
pub(crate) const FILE_SELECT: &str = "SELECT rowid FROM file WHERE name = ?1";
pub(crate) const FILE_INSERT: &str = "INSERT INTO file (name) VALUES (?1)";

pub(crate) const STATEMENTS: &[&str] = &[REFID_SELECT, REFID_INSERT, FILE_SELECT, FILE_INSERT];

/// A stable integer identity for one natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(i64);

impl RefId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one identity resolution.
///
/// Downstream emitters must check [`Resolution::id`] before using the value
/// as a foreign key; `Absent` and `Failed` never reach a relation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The key already had an id
    Existing(RefId),
    /// A new id was created for the key
    Created(RefId),
    /// The key was empty; nothing was looked up or created
    Absent,
    /// The persistence engine failed; already logged, resolution continues
    Failed,
}

impl Resolution {
    /// The resolved id, if resolution produced one
    pub fn id(&self) -> Option<RefId> {
        match self {
            Resolution::Existing(id) | Resolution::Created(id) => Some(*id),
            Resolution::Absent | Resolution::Failed => None,
        }
    }

    pub fn created(&self) -> bool {
        matches!(self, Resolution::Created(_))
    }
}

/// Resolve a symbolic reference key to its stable id, creating it on first
/// sight. Engine failures are logged and reported as [`Resolution::Failed`];
/// the export continues best-effort.
pub fn resolve_refid(session: &ExportSession, key: &str) -> Resolution {
    if key.is_empty() {
        return Resolution::Absent;
    }
    match lookup_or_create(session, REFID_SELECT, REFID_INSERT, key) {
        Ok(resolution) => {
            if let Resolution::Created(id) = resolution {
                debug!(key, id = %id, "created identity");
            }
            resolution
        }
        Err(e) => {
            warn!(key, error = %e, "identity resolution failed");
            Resolution::Failed
        }
    }
}

/// Resolve a file path to its pooled id, deduplicated by exact path string
pub fn resolve_file(session: &ExportSession, path: &str) -> Resolution {
    if path.is_empty() {
        return Resolution::Absent;
    }
    match lookup_or_create(session, FILE_SELECT, FILE_INSERT, path) {
        Ok(resolution) => resolution,
        Err(e) => {
            warn!(path, error = %e, "file resolution failed");
            Resolution::Failed
        }
    }
}

/// SELECT then INSERT. Atomic with respect to other resolutions because the
/// session is the only writer.
fn lookup_or_create(
    session: &ExportSession,
    select: &str,
    insert: &str,
    key: &str,
) -> Result<Resolution> {
    let existing: Option<i64> = session
        .stmt(select)?
        .query_row([key], |row| row.get(0))
        .optional()?;
    if let Some(id) = existing {
        return Ok(Resolution::Existing(RefId(id)));
    }

    session.stmt(insert)?.execute([key])?;
    let id = session.connection().last_insert_rowid();
    Ok(Resolution::Created(RefId(id)))
}
