//! Member emitter - functions, variables, typedefs, enums, properties, ...
//!
//! The most stateful emitter: a member id may be observed more than once
//! (prototype and body arrive as separate observations), so the first
//! observation inserts the row and every later one goes through the merge
//! resolver. Cross-reference, reimplementation and membership edges are
//! emitted on every observation; parameters only with the initial insert.

use super::identity::{self, RefId};
use super::merge::{self, MergeTexts};
use super::relations;
use super::{best_effort, EmitContext};
use crate::kinds::{MemberKind, XrefContext};
use crate::model::{Compound, Member, MemberTraits, Parameter};
use crate::Result;

pub(crate) const MEMBER_INSERT: &str = "INSERT INTO member (\
 rowid, name, kind, prot, static, const, explicit, inline, final, sealed,\
 new, optional, required, volatile, virt, mutable, initonly, attribute,\
 property, readonly, bound, constrained, transient, maybevoid, maybedefault,\
 maybeambiguous, readable, writable, gettable, privategettable,\
 protectedgettable, settable, privatesettable, protectedsettable, accessor,\
 addable, removable, raisable, definition, type, argsstring, scope,\
 initializer, bitfield, read, write, bodystart, bodyend, bodyfile_id,\
 file_id, line, column, briefdescription, detaileddescription,\
 inbodydescription, completeness\
) VALUES (\
 :rowid, :name, :kind, :prot, :static, :const, :explicit, :inline, :final,\
 :sealed, :new, :optional, :required, :volatile, :virt, :mutable, :initonly,\
 :attribute, :property, :readonly, :bound, :constrained, :transient,\
 :maybevoid, :maybedefault, :maybeambiguous, :readable, :writable,\
 :gettable, :privategettable, :protectedgettable, :settable,\
 :privatesettable, :protectedsettable, :accessor, :addable, :removable,\
 :raisable, :definition, :type, :argsstring, :scope, :initializer,\
 :bitfield, :read, :write, :bodystart, :bodyend, :bodyfile_id, :file_id,\
 :line, :column, :briefdescription, :detaileddescription,\
 :inbodydescription, :completeness)";

pub(crate) const STATEMENTS: &[&str] = &[MEMBER_INSERT];

/// Emit one member observed in the given scope.
pub(crate) fn emit_member(
    ctx: &EmitContext<'_>,
    scope: &Compound,
    scope_id: RefId,
    md: &Member,
) -> Result<()> {
    emit_member_inner(ctx, scope, scope_id, md, false)
}

fn emit_member_inner(
    ctx: &EmitContext<'_>,
    scope: &Compound,
    scope_id: RefId,
    md: &Member,
    as_enum_value: bool,
) -> Result<()> {
    // enum values are written as part of their enum
    if md.kind == MemberKind::EnumValue && !as_enum_value {
        return Ok(());
    }
    if md.is_hidden || md.is_external || md.is_anonymous() {
        return Ok(());
    }
    let Some(id) = identity::resolve_refid(ctx.session, &md.key).id() else {
        return Ok(());
    };

    let brief = ctx.render_opt(&md.key, &md.brief);
    let detailed = ctx.render_opt(&md.key, &md.detailed);
    let inbody = ctx.render_opt(&md.key, &md.inbody);
    let initializer = ctx.render_opt(&md.key, &md.initializer);

    match merge::member_state(ctx.session, id)? {
        merge::MemberState::Fresh => {
            insert_member_row(
                ctx,
                id,
                md,
                brief.as_ref().map(|r| r.text.as_str()),
                detailed.as_ref().map(|r| r.text.as_str()),
                inbody.as_ref().map(|r| r.text.as_str()),
                initializer.as_ref().map(|r| r.text.as_str()),
            )?;
            emit_parameters(ctx, id, md);
        }
        _ => {
            merge::merge_member(
                ctx.session,
                id,
                md,
                MergeTexts {
                    brief: brief.as_ref().map(|r| r.text.as_str()).unwrap_or(""),
                    detailed: detailed.as_ref().map(|r| r.text.as_str()).unwrap_or(""),
                    inbody: inbody.as_ref().map(|r| r.text.as_str()).unwrap_or(""),
                },
            )?;
        }
    }

    // links found inside the initializer expression
    if let Some(rendered) = &initializer {
        for target in &rendered.targets {
            if let Some(dst) = identity::resolve_refid(ctx.session, target).id() {
                best_effort(
                    "initializer xref",
                    target,
                    relations::emit_xref(ctx.session, id, dst, XrefContext::Initializer),
                );
            }
        }
    }

    // a member can be referenced from many call sites regardless of merge
    // state, so these run on every observation
    for target in &md.references {
        if let Some(dst) = identity::resolve_refid(ctx.session, target).id() {
            best_effort(
                "xref",
                target,
                relations::emit_xref(ctx.session, id, dst, XrefContext::Inline),
            );
        }
    }
    for source in &md.referenced_by {
        if let Some(src) = identity::resolve_refid(ctx.session, source).id() {
            best_effort(
                "xref",
                source,
                relations::emit_xref(ctx.session, src, id, XrefContext::Inline),
            );
        }
    }

    for target in &md.reimplements {
        if let Some(dst) = identity::resolve_refid(ctx.session, target).id() {
            best_effort(
                "reimplements edge",
                target,
                relations::emit_reimplements(ctx.session, id, dst),
            );
        }
    }
    for source in &md.reimplemented_by {
        if let Some(src) = identity::resolve_refid(ctx.session, source).id() {
            best_effort(
                "reimplements edge",
                source,
                relations::emit_reimplements(ctx.session, src, id),
            );
        }
    }

    best_effort(
        "membership edge",
        &md.key,
        relations::emit_member_scope(
            ctx.session,
            scope_id,
            id,
            md.protection,
            md.virtuality(),
            md.ambiguity_scope.as_deref(),
        ),
    );

    if md.kind == MemberKind::Enum {
        for value in &md.enum_values {
            best_effort(
                "enum value",
                &value.key,
                emit_member_inner(ctx, scope, scope_id, value, true),
            );
        }
    }
    Ok(())
}

/// Flat column values projected from the kind-specific trait variants.
#[derive(Default)]
struct TraitColumns {
    const_: bool,
    explicit_: bool,
    inline_: bool,
    final_: bool,
    sealed_: bool,
    new_: bool,
    optional: bool,
    required: bool,
    volatile_: bool,
    virt: i64,
    mutable_: bool,
    initonly: bool,
    attribute: bool,
    property: bool,
    readonly: bool,
    bound: bool,
    constrained: bool,
    transient: bool,
    maybevoid: bool,
    maybedefault: bool,
    maybeambiguous: bool,
    readable: bool,
    writable: bool,
    gettable: bool,
    privategettable: bool,
    protectedgettable: bool,
    settable: bool,
    privatesettable: bool,
    protectedsettable: bool,
    accessor: i64,
    addable: bool,
    removable: bool,
    raisable: bool,
    bitfield: Option<String>,
    read: Option<String>,
    write: Option<String>,
}

fn project_traits(md: &Member) -> TraitColumns {
    let mut cols = TraitColumns::default();
    match &md.traits {
        MemberTraits::Plain => {}
        MemberTraits::Function(f) => {
            cols.const_ = f.is_const;
            cols.volatile_ = f.is_volatile;
            cols.explicit_ = f.is_explicit;
            cols.inline_ = f.is_inline;
            cols.final_ = f.is_final;
            cols.sealed_ = f.is_sealed;
            cols.new_ = f.is_new;
            cols.optional = f.is_optional;
            cols.required = f.is_required;
            cols.virt = f.virtuality.code();
        }
        MemberTraits::Variable(v) => {
            cols.mutable_ = v.is_mutable;
            cols.initonly = v.is_initonly;
            cols.attribute = v.is_attribute;
            cols.property = v.is_property;
            cols.readonly = v.is_readonly;
            cols.bound = v.is_bound;
            cols.removable = v.is_removable;
            cols.constrained = v.is_constrained;
            cols.transient = v.is_transient;
            cols.maybevoid = v.maybe_void;
            cols.maybedefault = v.maybe_default;
            cols.maybeambiguous = v.maybe_ambiguous;
            cols.bitfield = v.bitfield.as_deref().map(strip_bitfield);
        }
        MemberTraits::Property(p) => {
            cols.readable = p.is_readable;
            cols.writable = p.is_writable;
            cols.gettable = p.is_gettable;
            cols.privategettable = p.is_private_gettable;
            cols.protectedgettable = p.is_protected_gettable;
            cols.settable = p.is_settable;
            cols.privatesettable = p.is_private_settable;
            cols.protectedsettable = p.is_protected_settable;
            cols.accessor = p.accessor.code();
            cols.read = p.read.clone();
            cols.write = p.write.clone();
        }
        MemberTraits::Event(e) => {
            cols.addable = e.is_addable;
            cols.removable = e.is_removable;
            cols.raisable = e.is_raisable;
        }
    }
    cols
}

/// Bitfield widths arrive as `: 3`; the stored form drops the colon
fn strip_bitfield(raw: &str) -> String {
    raw.trim_start().strip_prefix(':').unwrap_or(raw).trim().to_string()
}

/// Leading storage qualifiers are not part of the stored type text
fn strip_qualifiers(type_text: &str) -> &str {
    let mut t = type_text;
    loop {
        if let Some(rest) = t.strip_prefix("static ") {
            t = rest;
        } else if let Some(rest) = t.strip_prefix("virtual ") {
            t = rest;
        } else if let Some(rest) = t.strip_prefix("volatile ") {
            t = rest;
        } else if t == "virtual" {
            return "";
        } else {
            return t;
        }
    }
}

fn insert_member_row(
    ctx: &EmitContext<'_>,
    id: RefId,
    md: &Member,
    brief: Option<&str>,
    detailed: Option<&str>,
    inbody: Option<&str>,
    initializer: Option<&str>,
) -> Result<()> {
    let cols = project_traits(md);

    // define and enum rows carry no type projection
    let with_type = !matches!(md.kind, MemberKind::Define | MemberKind::Enum);
    let type_text = if with_type {
        md.type_text.as_deref().map(|t| {
            ctx.renderer.render(&md.key, strip_qualifiers(t)).text
        })
    } else {
        None
    };
    let definition = if with_type { md.definition.as_deref() } else { None };
    let args_string = if with_type { md.args_string.as_deref() } else { None };

    let file_id = md
        .location
        .as_ref()
        .and_then(|loc| identity::resolve_file(ctx.session, &loc.file).id());
    let bodyfile_id = md
        .body
        .as_ref()
        .and_then(|b| identity::resolve_file(ctx.session, &b.file).id());

    ctx.session.stmt(MEMBER_INSERT)?.execute(rusqlite::named_params! {
        ":rowid": id.as_i64(),
        ":name": md.name,
        ":kind": md.kind.code(),
        ":prot": md.protection.code(),
        ":static": md.is_static,
        ":const": cols.const_,
        ":explicit": cols.explicit_,
        ":inline": cols.inline_,
        ":final": cols.final_,
        ":sealed": cols.sealed_,
        ":new": cols.new_,
        ":optional": cols.optional,
        ":required": cols.required,
        ":volatile": cols.volatile_,
        ":virt": cols.virt,
        ":mutable": cols.mutable_,
        ":initonly": cols.initonly,
        ":attribute": cols.attribute,
        ":property": cols.property,
        ":readonly": cols.readonly,
        ":bound": cols.bound,
        ":constrained": cols.constrained,
        ":transient": cols.transient,
        ":maybevoid": cols.maybevoid,
        ":maybedefault": cols.maybedefault,
        ":maybeambiguous": cols.maybeambiguous,
        ":readable": cols.readable,
        ":writable": cols.writable,
        ":gettable": cols.gettable,
        ":privategettable": cols.privategettable,
        ":protectedgettable": cols.protectedgettable,
        ":settable": cols.settable,
        ":privatesettable": cols.privatesettable,
        ":protectedsettable": cols.protectedsettable,
        ":accessor": cols.accessor,
        ":addable": cols.addable,
        ":removable": cols.removable,
        ":raisable": cols.raisable,
        ":definition": definition,
        ":type": type_text,
        ":argsstring": args_string,
        ":scope": md.scope,
        ":initializer": initializer,
        ":bitfield": cols.bitfield,
        ":read": cols.read,
        ":write": cols.write,
        ":bodystart": md.body.as_ref().map(|b| b.start),
        ":bodyend": md.body.as_ref().map(|b| b.end),
        ":bodyfile_id": bodyfile_id.map(|f| f.as_i64()),
        ":file_id": file_id.map(|f| f.as_i64()),
        ":line": md.location.as_ref().map(|loc| loc.line),
        ":column": md.location.as_ref().map(|loc| loc.column),
        ":briefdescription": brief,
        ":detaileddescription": detailed,
        ":inbodydescription": inbody,
        ":completeness": merge::observation_half(md).code(),
    })?;
    Ok(())
}

/// Parameter pool rows, junction links, argument-context xrefs and template
/// parameters. Runs once, with the initial insert.
fn emit_parameters(ctx: &EmitContext<'_>, id: RefId, md: &Member) {
    if md.kind.is_function_like() {
        for p in &md.parameters {
            let mut pooled = p.clone();
            if pooled.defname == pooled.declname {
                pooled.defname = None;
            }
            if let Some(t) = &p.type_text {
                let rendered = ctx.renderer.render(&md.key, t);
                for target in &rendered.targets {
                    if let Some(dst) = identity::resolve_refid(ctx.session, target).id() {
                        best_effort(
                            "argument xref",
                            target,
                            relations::emit_xref(ctx.session, id, dst, XrefContext::Argument),
                        );
                    }
                }
                pooled.type_text = Some(rendered.text);
            }
            best_effort("parameter", &md.key, pool_and_link(ctx, id, &pooled));
        }
    } else if md.kind == MemberKind::Define && !md.parameters.is_empty() {
        // `FOO(a, b)` keeps its argument names; `FOO` has no parameter rows
        for p in &md.parameters {
            let name = p
                .defname
                .as_deref()
                .or(p.declname.as_deref())
                .or(p.type_text.as_deref());
            let pooled = Parameter { defname: name.map(String::from), ..Default::default() };
            best_effort("define parameter", &md.key, pool_and_link(ctx, id, &pooled));
        }
    }

    if !matches!(md.kind, MemberKind::Define | MemberKind::Enum | MemberKind::Typedef) {
        for tp in &md.template_parameters {
            best_effort(
                "template parameter",
                &md.key,
                relations::resolve_param(ctx.session, tp).map(|_| ()),
            );
        }
    }
}

fn pool_and_link(ctx: &EmitContext<'_>, id: RefId, p: &Parameter) -> Result<()> {
    let param_id = relations::resolve_param(ctx.session, p)?;
    relations::link_param(ctx.session, id, param_id)
}
