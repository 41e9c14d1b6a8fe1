//! Merge resolver - declaration/definition collapse for member rows
//!
//! The source model can yield two independent observations of one symbol:
//! its prototype and its body. Both resolve to the same id and must collapse
//! into one row. The member row carries a tri-state completeness marker:
//! the first observation records which half it was, a later observation of
//! the other half merges in its location columns and concatenates the prose,
//! and the marker becomes terminal. Terminal rows never re-merge.

use tracing::warn;

use super::identity::{self, RefId};
use super::session::ExportSession;
use crate::model::Member;
use crate::{Error, Result};

/// Which half of a member one observation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Declaration,
    Definition,
}

impl Half {
    /// Marker code stored in the completeness column
    pub fn code(&self) -> i64 {
        match self {
            Half::Declaration => 1,
            Half::Definition => 2,
        }
    }
}

/// Marker code for a row with both halves recorded
pub const COMPLETE_CODE: i64 = 3;

/// Merge state of a member id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    /// No row yet
    Fresh,
    /// One half recorded
    Seen(Half),
    /// Both halves recorded; terminal
    Complete,
}

/// What a merge attempt did to the attribute row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    Unchanged,
}

pub(crate) const MEMBER_STATE_SELECT: &str =
    "SELECT completeness FROM member WHERE rowid = ?1";

// The concatenated prose always reads declaration first, whichever half was
// written first.
pub(crate) const MEMBER_UPDATE_DECL: &str = "\
UPDATE member SET \
  file_id = ?2, line = ?3, column = ?4, \
  briefdescription    = 'Declaration: ' || ?5 || char(10) || 'Definition: ' || coalesce(briefdescription, ''), \
  detaileddescription = 'Declaration: ' || ?6 || char(10) || 'Definition: ' || coalesce(detaileddescription, ''), \
  inbodydescription   = 'Declaration: ' || ?7 || char(10) || 'Definition: ' || coalesce(inbodydescription, ''), \
  completeness = 3 \
WHERE rowid = ?1";

pub(crate) const MEMBER_UPDATE_DEF: &str = "\
UPDATE member SET \
  bodyfile_id = ?2, bodystart = ?3, bodyend = ?4, \
  briefdescription    = 'Declaration: ' || coalesce(briefdescription, '') || char(10) || 'Definition: ' || ?5, \
  detaileddescription = 'Declaration: ' || coalesce(detaileddescription, '') || char(10) || 'Definition: ' || ?6, \
  inbodydescription   = 'Declaration: ' || coalesce(inbodydescription, '') || char(10) || 'Definition: ' || ?7, \
  completeness = 3 \
WHERE rowid = ?1";

pub(crate) const STATEMENTS: &[&str] =
    &[MEMBER_STATE_SELECT, MEMBER_UPDATE_DECL, MEMBER_UPDATE_DEF];

/// The half one observation of a member actually carries: definition when a
/// body location was found, declaration otherwise.
pub fn observation_half(md: &Member) -> Half {
    if md.body.is_some() { Half::Definition } else { Half::Declaration }
}

/// Read the merge state of a member id.
pub fn member_state(session: &ExportSession, id: RefId) -> Result<MemberState> {
    use rusqlite::OptionalExtension;
    let marker: Option<i64> = session
        .stmt(MEMBER_STATE_SELECT)?
        .query_row([id.as_i64()], |row| row.get(0))
        .optional()?;
    Ok(match marker {
        None => MemberState::Fresh,
        Some(1) => MemberState::Seen(Half::Declaration),
        Some(2) => MemberState::Seen(Half::Definition),
        Some(3) => MemberState::Complete,
        Some(other) => {
            warn!(id = %id, marker = other, "unknown completeness marker, treating as complete");
            MemberState::Complete
        }
    })
}

/// Rendered prose of the new observation, fed into the merge-update.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MergeTexts<'a> {
    pub brief: &'a str,
    pub detailed: &'a str,
    pub inbody: &'a str,
}

/// Merge a re-observed member into its existing row.
///
/// The row must already exist. A terminal row, or a repeat of the half
/// already recorded, leaves the row untouched; a complementary half merges
/// in its location columns and transitions the marker to terminal.
pub(crate) fn merge_member(
    session: &ExportSession,
    id: RefId,
    md: &Member,
    texts: MergeTexts<'_>,
) -> Result<MergeOutcome> {
    let new_half = observation_half(md);
    match member_state(session, id)? {
        MemberState::Fresh => Err(Error::Export(format!(
            "merge attempted for member id {} without a row",
            id
        ))),
        MemberState::Complete => Ok(MergeOutcome::Unchanged),
        MemberState::Seen(half) if half == new_half => Ok(MergeOutcome::Unchanged),
        MemberState::Seen(Half::Declaration) => {
            // definition encountered second
            let body = md.body.as_ref().ok_or_else(|| {
                Error::Export(format!("definition half of member id {} has no body", id))
            })?;
            let Some(bodyfile) = identity::resolve_file(session, &body.file).id() else {
                warn!(id = %id, file = %body.file, "skipping merge, body file unresolved");
                return Ok(MergeOutcome::Unchanged);
            };
            session.stmt(MEMBER_UPDATE_DEF)?.execute(rusqlite::params![
                id.as_i64(),
                bodyfile.as_i64(),
                body.start,
                body.end,
                texts.brief,
                texts.detailed,
                texts.inbody,
            ])?;
            Ok(MergeOutcome::Merged)
        }
        MemberState::Seen(Half::Definition) => {
            // declaration encountered second
            let loc = md.location.as_ref().ok_or_else(|| {
                Error::Export(format!("declaration half of member id {} has no location", id))
            })?;
            let Some(file) = identity::resolve_file(session, &loc.file).id() else {
                warn!(id = %id, file = %loc.file, "skipping merge, declaration file unresolved");
                return Ok(MergeOutcome::Unchanged);
            };
            session.stmt(MEMBER_UPDATE_DECL)?.execute(rusqlite::params![
                id.as_i64(),
                file.as_i64(),
                loc.line,
                loc.column,
                texts.brief,
                texts.detailed,
                texts.inbody,
            ])?;
            Ok(MergeOutcome::Merged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::MemberKind;
    use crate::model::{BodyLocation, Location};

    fn session() -> ExportSession {
        let mut s = ExportSession::open_in_memory().unwrap();
        s.create_schema().unwrap();
        s
    }

    fn sample_member(name: &str) -> Member {
        Member {
            key: format!("file_1a{}", name),
            name: name.into(),
            kind: MemberKind::Function,
            protection: Default::default(),
            is_static: false,
            traits: Default::default(),
            type_text: None,
            definition: None,
            args_string: None,
            scope: None,
            initializer: None,
            location: None,
            body: None,
            brief: None,
            detailed: None,
            inbody: None,
            parameters: vec![],
            template_parameters: vec![],
            references: vec![],
            referenced_by: vec![],
            reimplements: vec![],
            reimplemented_by: vec![],
            enum_values: vec![],
            ambiguity_scope: None,
            is_hidden: false,
            is_external: false,
        }
    }

    fn insert_half_row(s: &ExportSession, id: i64, half: Half, brief: &str) {
        s.connection()
            .execute(
                "INSERT INTO member (rowid, name, kind, briefdescription, completeness) \
                 VALUES (?1, 'f', 1, ?2, ?3)",
                rusqlite::params![id, brief, half.code()],
            )
            .unwrap();
    }

    #[test]
    fn test_observation_half() {
        let mut md = sample_member("f");
        assert_eq!(observation_half(&md), Half::Declaration);
        md.body = Some(BodyLocation { file: "a.cpp".into(), start: 20, end: 25 });
        assert_eq!(observation_half(&md), Half::Definition);
    }

    #[test]
    fn test_fresh_state_for_missing_row() {
        let s = session();
        let id = identity::resolve_refid(&s, "file_1af").id().unwrap();
        assert_eq!(member_state(&s, id).unwrap(), MemberState::Fresh);
    }

    #[test]
    fn test_definition_merges_into_declaration_row() {
        let s = session();
        let id = identity::resolve_refid(&s, "file_1af").id().unwrap();
        insert_half_row(&s, id.as_i64(), Half::Declaration, "decl brief");

        let mut md = sample_member("f");
        md.body = Some(BodyLocation { file: "a.cpp".into(), start: 20, end: 25 });
        let outcome = merge_member(
            &s,
            id,
            &md,
            MergeTexts { brief: "def brief", detailed: "", inbody: "" },
        )
        .unwrap();
        assert_eq!(outcome, MergeOutcome::Merged);

        let (brief, start, end, completeness): (String, i64, i64, i64) = s
            .connection()
            .query_row(
                "SELECT briefdescription, bodystart, bodyend, completeness FROM member WHERE rowid = ?1",
                [id.as_i64()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(brief, "Declaration: decl brief\nDefinition: def brief");
        assert_eq!((start, end), (20, 25));
        assert_eq!(completeness, COMPLETE_CODE);
    }

    #[test]
    fn test_declaration_merges_into_definition_row() {
        let s = session();
        let id = identity::resolve_refid(&s, "file_1ag").id().unwrap();
        insert_half_row(&s, id.as_i64(), Half::Definition, "def brief");

        let mut md = sample_member("g");
        md.location = Some(Location { file: "a.h".into(), line: 10, column: 3 });
        let outcome = merge_member(
            &s,
            id,
            &md,
            MergeTexts { brief: "decl brief", detailed: "", inbody: "" },
        )
        .unwrap();
        assert_eq!(outcome, MergeOutcome::Merged);

        let (brief, line, column): (String, i64, i64) = s
            .connection()
            .query_row(
                "SELECT briefdescription, line, column FROM member WHERE rowid = ?1",
                [id.as_i64()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        // declaration prose leads regardless of insertion order
        assert_eq!(brief, "Declaration: decl brief\nDefinition: def brief");
        assert_eq!((line, column), (10, 3));
        assert_eq!(member_state(&s, id).unwrap(), MemberState::Complete);
    }

    #[test]
    fn test_same_half_is_noop() {
        let s = session();
        let id = identity::resolve_refid(&s, "file_1ah").id().unwrap();
        insert_half_row(&s, id.as_i64(), Half::Declaration, "original");

        let md = sample_member("h");
        let outcome =
            merge_member(&s, id, &md, MergeTexts { brief: "again", detailed: "", inbody: "" })
                .unwrap();
        assert_eq!(outcome, MergeOutcome::Unchanged);

        let brief: String = s
            .connection()
            .query_row("SELECT briefdescription FROM member WHERE rowid = ?1", [id.as_i64()], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(brief, "original");
    }

    #[test]
    fn test_complete_row_never_remerges() {
        let s = session();
        let id = identity::resolve_refid(&s, "file_1ai").id().unwrap();
        s.connection()
            .execute(
                "INSERT INTO member (rowid, name, kind, briefdescription, completeness) \
                 VALUES (?1, 'i', 1, 'done', 3)",
                [id.as_i64()],
            )
            .unwrap();

        let mut md = sample_member("i");
        md.body = Some(BodyLocation { file: "a.cpp".into(), start: 1, end: 2 });
        let outcome =
            merge_member(&s, id, &md, MergeTexts { brief: "late", detailed: "", inbody: "" })
                .unwrap();
        assert_eq!(outcome, MergeOutcome::Unchanged);
    }
}
