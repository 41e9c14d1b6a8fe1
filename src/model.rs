//! Documentation model - the read-only input object graph
//!
//! A [`DocModel`] is produced elsewhere (a parser front end, or JSON on
//! disk) and consumed by the exporter without mutation. Compounds reference
//! each other by symbolic reference key; those keys are the natural keys of
//! the identity registry, so references to entities outside the model are
//! legal and resolve to identity-only records.

use crate::kinds::{Accessor, CompoundKind, MemberKind, Protection, Virtuality};
use serde::{Deserialize, Serialize};

/// A complete documentation model for one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocModel {
    /// Project display name, stored in the meta row
    #[serde(default)]
    pub project: String,
    /// All documented compounds, in no particular order
    #[serde(default)]
    pub compounds: Vec<Compound>,
    /// The synthesized main page, if the project has one
    #[serde(default)]
    pub main_page: Option<Compound>,
}

impl DocModel {
    /// Iterate compounds of the given kinds, preserving model order
    pub fn compounds_of<'a>(
        &'a self,
        filter: impl Fn(CompoundKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Compound> {
        self.compounds.iter().filter(move |c| filter(c.kind))
    }

    /// Look up a compound by its symbolic reference key
    pub fn compound_by_key(&self, key: &str) -> Option<&Compound> {
        self.compounds.iter().find(|c| c.key == key)
    }
}

/// Source location of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path, normalized relative to the project root
    pub file: String,
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// Source extent of a definition body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyLocation {
    /// File path, normalized relative to the project root
    pub file: String,
    pub start: u32,
    pub end: u32,
}

/// Reference to a nested compound (class in namespace, file in group, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InnerRef {
    /// Symbolic reference key of the inner compound
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub is_hidden: bool,
}

/// One direct base/derived link of a class-like compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceRef {
    /// Symbolic reference key of the related class
    pub key: String,
    /// Display name of the related class
    pub name: String,
    #[serde(default)]
    pub protection: Protection,
    #[serde(default)]
    pub virtuality: Virtuality,
    /// Template specialization text, when this edge targets a specialization
    #[serde(default)]
    pub template_spec: Option<String>,
}

impl InheritanceRef {
    /// Display name with the template specialization applied
    pub fn display_name(&self) -> String {
        match &self.template_spec {
            Some(spec) => format!("{}{}", self.name, spec),
            None => self.name.clone(),
        }
    }
}

/// One include relation endpoint of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludeRef {
    /// Path of the other file
    pub name: String,
    /// Quoted include (true) vs angle-bracket include (false)
    #[serde(default)]
    pub local: bool,
}

/// A documented container: class, namespace, file, group, page or directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compound {
    /// Symbolic reference key, stable across runs
    pub key: String,
    pub name: String,
    pub kind: CompoundKind,
    /// Page title, where the category has one
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub protection: Option<Protection>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub detailed: Option<String>,
    /// Members documented in this scope
    #[serde(default)]
    pub members: Vec<Member>,
    /// Nested compounds, any category
    #[serde(default)]
    pub inner: Vec<InnerRef>,
    /// Direct base classes (class-like only)
    #[serde(default)]
    pub bases: Vec<InheritanceRef>,
    /// Direct subclasses (class-like only)
    #[serde(default)]
    pub derived: Vec<InheritanceRef>,
    /// Files included by this file
    #[serde(default)]
    pub includes: Vec<IncludeRef>,
    /// Files that include this file
    #[serde(default)]
    pub included_by: Vec<IncludeRef>,
    /// Declaring header of a class-like compound
    #[serde(default)]
    pub include_info: Option<IncludeRef>,
    /// Template parameters of a class-like compound
    #[serde(default)]
    pub template_parameters: Vec<Parameter>,
    /// External reference: documented elsewhere, never exported
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub is_hidden: bool,
    /// Generated template instance, not a distinct documented entity
    #[serde(default)]
    pub is_template_instance: bool,
}

impl Compound {
    /// Anonymous or compiler-generated compounds carry a `@` marker
    pub fn is_anonymous(&self) -> bool {
        self.name.contains('@')
    }
}

/// A documented leaf symbol owned by a compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Symbolic reference key including the in-page anchor
    pub key: String,
    pub name: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub protection: Protection,
    #[serde(default)]
    pub is_static: bool,
    /// Kind-specific trait flags
    #[serde(default)]
    pub traits: MemberTraits,
    /// Type text with qualifiers still attached
    #[serde(default)]
    pub type_text: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub args_string: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub initializer: Option<String>,
    /// Declaration location; absent when only the definition was observed
    #[serde(default)]
    pub location: Option<Location>,
    /// Definition body extent; absent when only the declaration was observed
    #[serde(default)]
    pub body: Option<BodyLocation>,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub detailed: Option<String>,
    #[serde(default)]
    pub inbody: Option<String>,
    /// Argument list; declaration and definition names already zipped
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Template parameter list, for templated members
    #[serde(default)]
    pub template_parameters: Vec<Parameter>,
    /// Symbols this member's body references (outgoing)
    #[serde(default)]
    pub references: Vec<String>,
    /// Symbols whose bodies reference this member (incoming)
    #[serde(default)]
    pub referenced_by: Vec<String>,
    /// Members this member overrides
    #[serde(default)]
    pub reimplements: Vec<String>,
    /// Members overriding this member
    #[serde(default)]
    pub reimplemented_by: Vec<String>,
    /// Values of an enumeration, folded into the enum's own emission
    #[serde(default)]
    pub enum_values: Vec<Member>,
    /// Scope recorded when membership provenance is ambiguous
    #[serde(default)]
    pub ambiguity_scope: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub is_external: bool,
}

impl Member {
    /// Anonymous members carry a `@` marker
    pub fn is_anonymous(&self) -> bool {
        self.name.contains('@')
    }

    /// Virtuality, for kinds that carry one
    pub fn virtuality(&self) -> Virtuality {
        match &self.traits {
            MemberTraits::Function(f) => f.virtuality,
            _ => Virtuality::NonVirtual,
        }
    }
}

/// Kind-specific trait flags of a member.
///
/// Only the variant matching the member kind carries data; the flat database
/// shape is produced at the persistence boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberTraits {
    /// Kinds without specific flags: define, typedef, enum, enum value
    #[default]
    Plain,
    Function(FunctionTraits),
    Variable(VariableTraits),
    Property(PropertyTraits),
    Event(EventTraits),
}

/// Trait flags of function-like members (function, signal, slot, friend, dcop).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionTraits {
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_volatile: bool,
    #[serde(default)]
    pub is_explicit: bool,
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub virtuality: Virtuality,
}

/// Trait flags of variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableTraits {
    #[serde(default)]
    pub is_mutable: bool,
    #[serde(default)]
    pub is_initonly: bool,
    #[serde(default)]
    pub is_attribute: bool,
    #[serde(default)]
    pub is_property: bool,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default)]
    pub is_bound: bool,
    #[serde(default)]
    pub is_removable: bool,
    #[serde(default)]
    pub is_constrained: bool,
    #[serde(default)]
    pub is_transient: bool,
    #[serde(default)]
    pub maybe_void: bool,
    #[serde(default)]
    pub maybe_default: bool,
    #[serde(default)]
    pub maybe_ambiguous: bool,
    /// Bitfield width text, leading `:` not yet stripped
    #[serde(default)]
    pub bitfield: Option<String>,
}

/// Trait flags of properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyTraits {
    #[serde(default)]
    pub is_readable: bool,
    #[serde(default)]
    pub is_writable: bool,
    #[serde(default)]
    pub is_gettable: bool,
    #[serde(default)]
    pub is_private_gettable: bool,
    #[serde(default)]
    pub is_protected_gettable: bool,
    #[serde(default)]
    pub is_settable: bool,
    #[serde(default)]
    pub is_private_settable: bool,
    #[serde(default)]
    pub is_protected_settable: bool,
    #[serde(default)]
    pub accessor: Accessor,
    /// Read accessor name
    #[serde(default)]
    pub read: Option<String>,
    /// Write accessor name
    #[serde(default)]
    pub write: Option<String>,
}

/// Trait flags of events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventTraits {
    #[serde(default)]
    pub is_addable: bool,
    #[serde(default)]
    pub is_removable: bool,
    #[serde(default)]
    pub is_raisable: bool,
}

/// One parameter of a member or template, as pooled in the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(default, rename = "type")]
    pub type_text: Option<String>,
    /// Name in the declaration's argument list
    #[serde(default)]
    pub declname: Option<String>,
    /// Name in the definition's argument list, when it differs
    #[serde(default)]
    pub defname: Option<String>,
    /// Array suffix text
    #[serde(default)]
    pub array: Option<String>,
    /// Default value expression
    #[serde(default)]
    pub defval: Option<String>,
    #[serde(default)]
    pub brief: Option<String>,
}
