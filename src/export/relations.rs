//! Relation graph builder - the six edge tables and the parameter pool
//!
//! Every emit is an insert guarded by the table's uniqueness constraint;
//! a duplicate attempt is silently absorbed, never an error. Callers must
//! hand in already-resolved endpoint ids, so every stored edge has identity
//! records behind both ends.

use rusqlite::OptionalExtension;
use tracing::warn;

use super::identity::RefId;
use super::session::ExportSession;
use crate::kinds::{Protection, Virtuality, XrefContext};
use crate::model::Parameter;
use crate::Result;

pub(crate) const INCLUDES_INSERT: &str =
    "INSERT INTO includes (local, src_id, dst_id) VALUES (?1, ?2, ?3)";

pub(crate) const CONTAINS_INSERT: &str =
    "INSERT INTO contains (inner_id, outer_id) VALUES (?1, ?2)";

pub(crate) const INHERITS_INSERT: &str = "INSERT INTO inherits \
     (base_id, derived_id, base_name, derived_name, prot, virt) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub(crate) const INHERITS_SELECT: &str =
    "SELECT prot, virt FROM inherits WHERE base_id = ?1 AND derived_id = ?2";

pub(crate) const REIMPLEMENTS_INSERT: &str =
    "INSERT INTO reimplements (member_id, reimplemented_id) VALUES (?1, ?2)";

pub(crate) const XREFS_INSERT: &str =
    "INSERT INTO xrefs (src_id, dst_id, context) VALUES (?1, ?2, ?3)";

pub(crate) const MEMBER_SCOPE_INSERT: &str = "INSERT INTO member_scope \
     (scope_id, member_id, prot, virt, ambiguity_scope) \
     VALUES (?1, ?2, ?3, ?4, ?5)";

// Dedup key matches the unique index: (type, defname). IS makes the compare
// NULL-safe.
pub(crate) const PARAM_SELECT: &str =
    "SELECT rowid FROM param WHERE type IS ?1 AND defname IS ?2";

pub(crate) const PARAM_INSERT: &str = "INSERT INTO param \
     (attributes, type, declname, defname, array, defval, briefdescription) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

pub(crate) const MEMBER_PARAM_INSERT: &str =
    "INSERT INTO member_param (member_id, param_id) VALUES (?1, ?2)";

pub(crate) const STATEMENTS: &[&str] = &[
    INCLUDES_INSERT,
    CONTAINS_INSERT,
    INHERITS_INSERT,
    INHERITS_SELECT,
    REIMPLEMENTS_INSERT,
    XREFS_INSERT,
    MEMBER_SCOPE_INSERT,
    PARAM_SELECT,
    PARAM_INSERT,
    MEMBER_PARAM_INSERT,
];

/// Emit one inclusion edge between two file ids
pub fn emit_include(session: &ExportSession, local: bool, src: RefId, dst: RefId) -> Result<()> {
    session
        .stmt(INCLUDES_INSERT)?
        .execute(rusqlite::params![local as i64, src.as_i64(), dst.as_i64()])?;
    Ok(())
}

/// Emit one containment edge: inner is nested in outer
pub fn emit_contains(session: &ExportSession, inner: RefId, outer: RefId) -> Result<()> {
    session
        .stmt(CONTAINS_INSERT)?
        .execute(rusqlite::params![inner.as_i64(), outer.as_i64()])?;
    Ok(())
}

/// One direct inheritance edge, ready for emission.
#[derive(Debug, Clone)]
pub struct InheritEdge<'a> {
    pub base: RefId,
    pub derived: RefId,
    pub base_name: &'a str,
    pub derived_name: &'a str,
    pub protection: Protection,
    pub virtuality: Virtuality,
}

/// Emit one inheritance edge.
///
/// Both the base's subclass list and the derived's base list emit the same
/// logical edge; the first one wins. A later attempt carrying different
/// protection or virtuality is still absorbed, but logged as a data-quality
/// diagnostic since the two traversal directions should agree.
pub fn emit_inherits(session: &ExportSession, edge: &InheritEdge<'_>) -> Result<()> {
    let changed = session.stmt(INHERITS_INSERT)?.execute(rusqlite::params![
        edge.base.as_i64(),
        edge.derived.as_i64(),
        edge.base_name,
        edge.derived_name,
        edge.protection.code(),
        edge.virtuality.code(),
    ])?;
    if changed == 0 {
        let existing: Option<(i64, i64)> = session
            .stmt(INHERITS_SELECT)?
            .query_row([edge.base.as_i64(), edge.derived.as_i64()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;
        if let Some((prot, virt)) = existing {
            if prot != edge.protection.code() || virt != edge.virtuality.code() {
                warn!(
                    base = %edge.base_name,
                    derived = %edge.derived_name,
                    stored_prot = prot,
                    stored_virt = virt,
                    new_prot = edge.protection.code(),
                    new_virt = edge.virtuality.code(),
                    "inheritance edge disagrees between traversal directions"
                );
            }
        }
    }
    Ok(())
}

/// Emit one reimplementation edge: member overrides reimplemented
pub fn emit_reimplements(
    session: &ExportSession,
    member: RefId,
    reimplemented: RefId,
) -> Result<()> {
    session
        .stmt(REIMPLEMENTS_INSERT)?
        .execute(rusqlite::params![member.as_i64(), reimplemented.as_i64()])?;
    Ok(())
}

/// Emit one cross-reference edge in the given context
pub fn emit_xref(
    session: &ExportSession,
    src: RefId,
    dst: RefId,
    context: XrefContext,
) -> Result<()> {
    session
        .stmt(XREFS_INSERT)?
        .execute(rusqlite::params![src.as_i64(), dst.as_i64(), context.as_str()])?;
    Ok(())
}

/// Emit one membership edge: member is documented in scope
pub fn emit_member_scope(
    session: &ExportSession,
    scope: RefId,
    member: RefId,
    protection: Protection,
    virtuality: Virtuality,
    ambiguity_scope: Option<&str>,
) -> Result<()> {
    session.stmt(MEMBER_SCOPE_INSERT)?.execute(rusqlite::params![
        scope.as_i64(),
        member.as_i64(),
        protection.code(),
        virtuality.code(),
        ambiguity_scope,
    ])?;
    Ok(())
}

/// Look up a pooled parameter, creating it on first sight.
///
/// The pool is shared across overloads and template instantiations; two
/// parameters with identical column values collapse to one row.
pub fn resolve_param(session: &ExportSession, p: &Parameter) -> Result<i64> {
    let existing: Option<i64> = session
        .stmt(PARAM_SELECT)?
        .query_row(rusqlite::params![p.type_text, p.defname], |row| row.get(0))
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    session.stmt(PARAM_INSERT)?.execute(rusqlite::params![
        p.attributes, p.type_text, p.declname, p.defname, p.array, p.defval, p.brief
    ])?;
    Ok(session.connection().last_insert_rowid())
}

/// Link a pooled parameter to its owning member
pub fn link_param(session: &ExportSession, member: RefId, param_id: i64) -> Result<()> {
    session
        .stmt(MEMBER_PARAM_INSERT)?
        .execute(rusqlite::params![member.as_i64(), param_id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::identity::resolve_refid;

    fn session() -> ExportSession {
        let mut s = ExportSession::open_in_memory().unwrap();
        s.create_schema().unwrap();
        s
    }

    fn count(s: &ExportSession, table: &str) -> i64 {
        s.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_duplicate_edges_store_once() {
        let s = session();
        let a = resolve_refid(&s, "a").id().unwrap();
        let b = resolve_refid(&s, "b").id().unwrap();

        emit_contains(&s, a, b).unwrap();
        emit_contains(&s, a, b).unwrap();
        assert_eq!(count(&s, "contains"), 1);

        emit_include(&s, true, a, b).unwrap();
        emit_include(&s, true, a, b).unwrap();
        // a different local flag is a different fact
        emit_include(&s, false, a, b).unwrap();
        assert_eq!(count(&s, "includes"), 2);

        emit_reimplements(&s, a, b).unwrap();
        emit_reimplements(&s, a, b).unwrap();
        assert_eq!(count(&s, "reimplements"), 1);
    }

    #[test]
    fn test_xref_contexts_are_separate_facts() {
        let s = session();
        let a = resolve_refid(&s, "a").id().unwrap();
        let b = resolve_refid(&s, "b").id().unwrap();

        emit_xref(&s, a, b, XrefContext::Inline).unwrap();
        emit_xref(&s, a, b, XrefContext::Inline).unwrap();
        emit_xref(&s, a, b, XrefContext::Initializer).unwrap();
        assert_eq!(count(&s, "xrefs"), 2);
    }

    #[test]
    fn test_inherits_emitted_from_both_directions_once() {
        let s = session();
        let base = resolve_refid(&s, "classBase").id().unwrap();
        let derived = resolve_refid(&s, "classDerived").id().unwrap();

        let edge = InheritEdge {
            base,
            derived,
            base_name: "Base",
            derived_name: "Derived",
            protection: Protection::Public,
            virtuality: Virtuality::NonVirtual,
        };
        emit_inherits(&s, &edge).unwrap();
        emit_inherits(&s, &edge).unwrap();
        assert_eq!(count(&s, "inherits"), 1);
    }

    #[test]
    fn test_inherits_disagreement_keeps_first_edge() {
        let s = session();
        let base = resolve_refid(&s, "classBase").id().unwrap();
        let derived = resolve_refid(&s, "classDerived").id().unwrap();

        emit_inherits(
            &s,
            &InheritEdge {
                base,
                derived,
                base_name: "Base",
                derived_name: "Derived",
                protection: Protection::Public,
                virtuality: Virtuality::NonVirtual,
            },
        )
        .unwrap();
        emit_inherits(
            &s,
            &InheritEdge {
                base,
                derived,
                base_name: "Base",
                derived_name: "Derived",
                protection: Protection::Private,
                virtuality: Virtuality::Virtual,
            },
        )
        .unwrap();

        assert_eq!(count(&s, "inherits"), 1);
        let (prot, virt): (i64, i64) = s
            .connection()
            .query_row("SELECT prot, virt FROM inherits", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((prot, virt), (0, 0));
    }

    #[test]
    fn test_membership_unique_per_scope_pair() {
        let s = session();
        let scope = resolve_refid(&s, "classDemo").id().unwrap();
        let md = resolve_refid(&s, "classDemo_1a01").id().unwrap();

        emit_member_scope(&s, scope, md, Protection::Public, Virtuality::NonVirtual, None).unwrap();
        emit_member_scope(&s, scope, md, Protection::Public, Virtuality::NonVirtual, Some("Demo"))
            .unwrap();
        assert_eq!(count(&s, "member_scope"), 1);
    }

    #[test]
    fn test_param_pool_dedups() {
        let s = session();
        let m1 = resolve_refid(&s, "f1").id().unwrap();
        let m2 = resolve_refid(&s, "f2").id().unwrap();

        let p = Parameter {
            type_text: Some("int".into()),
            declname: Some("count".into()),
            ..Default::default()
        };
        let id1 = resolve_param(&s, &p).unwrap();
        let id2 = resolve_param(&s, &p).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(count(&s, "param"), 1);

        link_param(&s, m1, id1).unwrap();
        link_param(&s, m2, id2).unwrap();
        link_param(&s, m2, id2).unwrap();
        assert_eq!(count(&s, "member_param"), 2);

        let q = Parameter { type_text: Some("long".into()), ..p.clone() };
        let id3 = resolve_param(&s, &q).unwrap();
        assert_ne!(id1, id3);

        // the pool key is (type, defname); a differing declname still shares
        let r = Parameter { declname: Some("n".into()), ..p };
        assert_eq!(resolve_param(&s, &r).unwrap(), id1);
    }
}
