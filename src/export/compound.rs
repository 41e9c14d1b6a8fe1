//! Compound emitters - class, namespace, file, group, page, directory
//!
//! All categories share one attribute table and one emission skeleton:
//! resolve the identity, no-op if the row already exists (the same compound
//! is legitimately reached from several containment paths), resolve the
//! defining file, write the row, then emit child containment and the
//! category's relations. Only the field projection varies by category.

use tracing::debug;

use super::identity::{self, RefId};
use super::relations::{self, InheritEdge};
use super::{best_effort, member, EmitContext};
use crate::kinds::CompoundKind;
use crate::model::Compound;
use crate::Result;

pub(crate) const COMPOUND_EXISTS: &str =
    "SELECT EXISTS (SELECT 1 FROM compound WHERE rowid = ?1)";

pub(crate) const COMPOUND_INSERT: &str = "INSERT INTO compound \
     (rowid, name, title, kind, prot, file_id, line, column, briefdescription, detaileddescription) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

pub(crate) const STATEMENTS: &[&str] = &[COMPOUND_EXISTS, COMPOUND_INSERT];

/// Key reserved for the synthesized index page
const RESERVED_INDEX_KEY: &str = "index";
/// Key a colliding page is remapped to
const INDEX_PAGE_KEY: &str = "indexpage";

/// Natural key of a compound. Pages colliding with the reserved index key
/// are remapped so they cannot capture the index page's identity.
pub(crate) fn compound_key(cd: &Compound) -> &str {
    if matches!(cd.kind, CompoundKind::Page | CompoundKind::Example)
        && cd.key == RESERVED_INDEX_KEY
    {
        return INDEX_PAGE_KEY;
    }
    &cd.key
}

/// Whether an attribute row already exists for this id
pub(crate) fn compound_exists(ctx: &EmitContext<'_>, id: RefId) -> Result<bool> {
    let exists: i64 = ctx
        .session
        .stmt(COMPOUND_EXISTS)?
        .query_row([id.as_i64()], |row| row.get(0))?;
    Ok(exists != 0)
}

/// Emit one compound and everything hanging off it.
///
/// External references, hidden compounds, anonymous scopes and generated
/// template instances never receive an identity or any row.
pub(crate) fn emit_compound(ctx: &EmitContext<'_>, cd: &Compound) -> Result<()> {
    if cd.is_external || cd.is_hidden || cd.is_anonymous() || cd.is_template_instance {
        return Ok(());
    }

    let key = compound_key(cd);
    let Some(id) = identity::resolve_refid(ctx.session, key).id() else {
        return Ok(());
    };
    if compound_exists(ctx, id)? {
        debug!(key, "compound already emitted");
        return Ok(());
    }

    // referenced file id first, then the attribute row
    let file_id = cd
        .location
        .as_ref()
        .and_then(|loc| identity::resolve_file(ctx.session, &loc.file).id());

    let brief = ctx.render_opt(key, &cd.brief);
    let detailed = ctx.render_opt(key, &cd.detailed);
    ctx.session.stmt(COMPOUND_INSERT)?.execute(rusqlite::params![
        id.as_i64(),
        cd.name,
        cd.title,
        cd.kind.as_str(),
        cd.protection.map(|p| p.code()),
        file_id.map(|f| f.as_i64()),
        cd.location.as_ref().map(|loc| loc.line),
        cd.location.as_ref().map(|loc| loc.column),
        brief.as_ref().map(|r| r.text.as_str()),
        detailed.as_ref().map(|r| r.text.as_str()),
    ])?;

    // children: containment edges for every nested compound
    for inner in &cd.inner {
        if inner.is_hidden || inner.name.contains('@') {
            continue;
        }
        if let Some(inner_id) = identity::resolve_refid(ctx.session, &inner.key).id() {
            best_effort(
                "containment edge",
                &inner.key,
                relations::emit_contains(ctx.session, inner_id, id),
            );
        }
    }

    if cd.kind.is_class_like() {
        emit_class_relations(ctx, cd, id, file_id)?;
    }
    if cd.kind == CompoundKind::File {
        emit_file_relations(ctx, cd);
    }

    // members last: their xref/membership edges need the scope id to exist
    for md in &cd.members {
        best_effort("member", &md.key, member::emit_member(ctx, cd, id, md));
    }
    Ok(())
}

/// Inheritance (both directions), declaring header, template parameters
fn emit_class_relations(
    ctx: &EmitContext<'_>,
    cd: &Compound,
    id: RefId,
    file_id: Option<RefId>,
) -> Result<()> {
    for base in &cd.bases {
        if let Some(base_id) = identity::resolve_refid(ctx.session, &base.key).id() {
            best_effort(
                "inheritance edge",
                &base.key,
                relations::emit_inherits(
                    ctx.session,
                    &InheritEdge {
                        base: base_id,
                        derived: id,
                        base_name: &base.display_name(),
                        derived_name: &cd.name,
                        protection: base.protection,
                        virtuality: base.virtuality,
                    },
                ),
            );
        }
    }
    for derived in &cd.derived {
        if let Some(derived_id) = identity::resolve_refid(ctx.session, &derived.key).id() {
            best_effort(
                "inheritance edge",
                &derived.key,
                relations::emit_inherits(
                    ctx.session,
                    &InheritEdge {
                        base: id,
                        derived: derived_id,
                        base_name: &cd.name,
                        derived_name: &derived.display_name(),
                        protection: derived.protection,
                        virtuality: derived.virtuality,
                    },
                ),
            );
        }
    }

    // the declaring header shows up as an inclusion edge from the class's
    // own definition file
    if let (Some(info), Some(src)) = (&cd.include_info, file_id) {
        if let Some(dst) = identity::resolve_file(ctx.session, &info.name).id() {
            best_effort(
                "include edge",
                &info.name,
                relations::emit_include(ctx.session, info.local, src, dst),
            );
        }
    }

    // template parameters go into the shared pool
    for tp in &cd.template_parameters {
        best_effort(
            "template parameter",
            &cd.key,
            relations::resolve_param(ctx.session, tp).map(|_| ()),
        );
    }
    Ok(())
}

/// Include edges from both the include and included-by lists
fn emit_file_relations(ctx: &EmitContext<'_>, cd: &Compound) {
    let own_path = cd
        .location
        .as_ref()
        .map(|loc| loc.file.as_str())
        .unwrap_or(cd.name.as_str());
    let own_id = identity::resolve_file(ctx.session, own_path).id();

    for inc in &cd.includes {
        let dst = identity::resolve_file(ctx.session, &inc.name).id();
        if let (Some(src), Some(dst)) = (own_id, dst) {
            best_effort(
                "include edge",
                &inc.name,
                relations::emit_include(ctx.session, inc.local, src, dst),
            );
        }
    }
    for inc in &cd.included_by {
        let src = identity::resolve_file(ctx.session, &inc.name).id();
        if let (Some(src), Some(dst)) = (src, own_id) {
            best_effort(
                "include edge",
                &inc.name,
                relations::emit_include(ctx.session, inc.local, src, dst),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::session::ExportSession;
    use crate::kinds::Protection;
    use crate::model::{InheritanceRef, InnerRef, Location};
    use crate::render::PlainRenderer;

    fn session() -> ExportSession {
        let mut s = ExportSession::open_in_memory().unwrap();
        s.create_schema().unwrap();
        s
    }

    fn sample_class(key: &str, name: &str) -> Compound {
        Compound {
            key: key.into(),
            name: name.into(),
            kind: CompoundKind::Class,
            title: None,
            protection: Some(Protection::Public),
            location: Some(Location { file: "src/demo.h".into(), line: 12, column: 1 }),
            brief: Some("A demo class".into()),
            detailed: None,
            members: vec![],
            inner: vec![],
            bases: vec![],
            derived: vec![],
            includes: vec![],
            included_by: vec![],
            include_info: None,
            template_parameters: vec![],
            is_external: false,
            is_hidden: false,
            is_template_instance: false,
        }
    }

    fn count(s: &ExportSession, table: &str) -> i64 {
        s.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_compound_row_and_file_created() {
        let s = session();
        let renderer = PlainRenderer;
        let ctx = EmitContext { session: &s, renderer: &renderer };

        emit_compound(&ctx, &sample_class("classDemo", "Demo")).unwrap();
        assert_eq!(count(&s, "compound"), 1);
        assert_eq!(count(&s, "file"), 1);

        let (name, kind, brief): (String, String, String) = s
            .connection()
            .query_row(
                "SELECT name, kind, briefdescription FROM compound",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(name, "Demo");
        assert_eq!(kind, "class");
        assert_eq!(brief, "A demo class");
    }

    #[test]
    fn test_revisit_is_noop() {
        let s = session();
        let renderer = PlainRenderer;
        let ctx = EmitContext { session: &s, renderer: &renderer };

        let cd = sample_class("classDemo", "Demo");
        emit_compound(&ctx, &cd).unwrap();
        emit_compound(&ctx, &cd).unwrap();
        assert_eq!(count(&s, "compound"), 1);
    }

    #[test]
    fn test_skipped_compounds_get_no_identity() {
        let s = session();
        let renderer = PlainRenderer;
        let ctx = EmitContext { session: &s, renderer: &renderer };

        let mut external = sample_class("classExt", "Ext");
        external.is_external = true;
        let mut hidden = sample_class("classHidden", "Hidden");
        hidden.is_hidden = true;
        let mut anon = sample_class("classAnon", "ns::@2");
        anon.name = "ns::@2".into();
        let mut inst = sample_class("classVec_int", "Vec< int >");
        inst.is_template_instance = true;

        for cd in [&external, &hidden, &anon, &inst] {
            emit_compound(&ctx, cd).unwrap();
        }
        assert_eq!(count(&s, "refid"), 0);
        assert_eq!(count(&s, "compound"), 0);
    }

    #[test]
    fn test_containment_from_two_paths_single_edge_set() {
        let s = session();
        let renderer = PlainRenderer;
        let ctx = EmitContext { session: &s, renderer: &renderer };

        // the same class is nested under two namespaces
        let inner = InnerRef { key: "classDemo".into(), name: "Demo".into(), is_hidden: false };
        let mut ns_a = sample_class("namespaceA", "A");
        ns_a.kind = CompoundKind::Namespace;
        ns_a.inner = vec![inner.clone()];
        let mut ns_b = sample_class("namespaceB", "B");
        ns_b.kind = CompoundKind::Namespace;
        ns_b.inner = vec![inner];

        emit_compound(&ctx, &ns_a).unwrap();
        emit_compound(&ctx, &ns_b).unwrap();
        emit_compound(&ctx, &sample_class("classDemo", "Demo")).unwrap();

        // one identity for the class, two containment edges, one row
        assert_eq!(count(&s, "contains"), 2);
        assert_eq!(count(&s, "compound"), 3);
        let class_ids: i64 = s
            .connection()
            .query_row("SELECT COUNT(*) FROM refid WHERE refid = 'classDemo'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(class_ids, 1);
    }

    #[test]
    fn test_inheritance_from_both_sides_dedups() {
        let s = session();
        let renderer = PlainRenderer;
        let ctx = EmitContext { session: &s, renderer: &renderer };

        let mut base = sample_class("classBase", "Base");
        base.derived = vec![InheritanceRef {
            key: "classDerived".into(),
            name: "Derived".into(),
            protection: Protection::Public,
            virtuality: Default::default(),
            template_spec: None,
        }];
        let mut derived = sample_class("classDerived", "Derived");
        derived.bases = vec![InheritanceRef {
            key: "classBase".into(),
            name: "Base".into(),
            protection: Protection::Public,
            virtuality: Default::default(),
            template_spec: None,
        }];

        emit_compound(&ctx, &base).unwrap();
        emit_compound(&ctx, &derived).unwrap();
        assert_eq!(count(&s, "inherits"), 1);

        let (base_name, derived_name): (String, String) = s
            .connection()
            .query_row("SELECT base_name, derived_name FROM inherits", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(base_name, "Base");
        assert_eq!(derived_name, "Derived");
    }

    #[test]
    fn test_file_include_edges() {
        let s = session();
        let renderer = PlainRenderer;
        let ctx = EmitContext { session: &s, renderer: &renderer };

        let mut fd = sample_class("demo_8cpp", "src/demo.cpp");
        fd.kind = CompoundKind::File;
        fd.location = Some(Location { file: "src/demo.cpp".into(), line: 1, column: 1 });
        fd.includes = vec![
            crate::model::IncludeRef { name: "src/demo.h".into(), local: true },
            crate::model::IncludeRef { name: "vector".into(), local: false },
        ];
        fd.included_by = vec![];

        emit_compound(&ctx, &fd).unwrap();
        assert_eq!(count(&s, "includes"), 2);
        assert_eq!(count(&s, "file"), 3);
    }

    #[test]
    fn test_page_key_remap() {
        let s = session();
        let renderer = PlainRenderer;
        let ctx = EmitContext { session: &s, renderer: &renderer };

        let mut page = sample_class("index", "index");
        page.kind = CompoundKind::Page;
        page.title = Some("Landing".into());
        page.location = None;
        emit_compound(&ctx, &page).unwrap();

        let refid: String =
            s.connection().query_row("SELECT refid FROM refid", [], |r| r.get(0)).unwrap();
        assert_eq!(refid, "indexpage");
    }
}
