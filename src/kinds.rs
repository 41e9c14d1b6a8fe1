//! Entity kind and attribute enumerations
//!
//! Compounds are documented containers, members are documented leaf symbols.
//! Each enum knows its string form (used in the database and the JSON model)
//! and, where the schema stores an integer, its wire code.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kinds of compound entities.
///
/// All compound categories share one attribute table; the kind column is the
/// only discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundKind {
    Class,
    Struct,
    Union,
    Interface,
    Namespace,
    File,
    Group,
    Page,
    Dir,
    Example,
}

impl CompoundKind {
    /// Get the string representation of the compound kind
    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundKind::Class => "class",
            CompoundKind::Struct => "struct",
            CompoundKind::Union => "union",
            CompoundKind::Interface => "interface",
            CompoundKind::Namespace => "namespace",
            CompoundKind::File => "file",
            CompoundKind::Group => "group",
            CompoundKind::Page => "page",
            CompoundKind::Dir => "dir",
            CompoundKind::Example => "example",
        }
    }

    /// Get all compound kinds
    pub fn all() -> &'static [CompoundKind] {
        &[
            CompoundKind::Class,
            CompoundKind::Struct,
            CompoundKind::Union,
            CompoundKind::Interface,
            CompoundKind::Namespace,
            CompoundKind::File,
            CompoundKind::Group,
            CompoundKind::Page,
            CompoundKind::Dir,
            CompoundKind::Example,
        ]
    }

    /// Class-like kinds share the class traversal (inheritance, include info)
    pub fn is_class_like(&self) -> bool {
        matches!(
            self,
            CompoundKind::Class | CompoundKind::Struct | CompoundKind::Union | CompoundKind::Interface
        )
    }
}

impl FromStr for CompoundKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "class" => Ok(CompoundKind::Class),
            "struct" => Ok(CompoundKind::Struct),
            "union" => Ok(CompoundKind::Union),
            "interface" => Ok(CompoundKind::Interface),
            "namespace" => Ok(CompoundKind::Namespace),
            "file" => Ok(CompoundKind::File),
            "group" | "module" => Ok(CompoundKind::Group),
            "page" => Ok(CompoundKind::Page),
            "dir" | "directory" => Ok(CompoundKind::Dir),
            "example" => Ok(CompoundKind::Example),
            _ => Err(Error::InvalidKey(format!("Unknown compound kind: {}", s))),
        }
    }
}

impl std::fmt::Display for CompoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kinds of member entities.
///
/// The wire code is what the member table stores in its kind column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Define,
    Function,
    Variable,
    Typedef,
    Enum,
    EnumValue,
    Signal,
    Slot,
    Friend,
    Dcop,
    Property,
    Event,
}

impl MemberKind {
    /// Integer code stored in the member table
    pub fn code(&self) -> i64 {
        match self {
            MemberKind::Define => 0,
            MemberKind::Function => 1,
            MemberKind::Variable => 2,
            MemberKind::Typedef => 3,
            MemberKind::Enum => 4,
            MemberKind::EnumValue => 5,
            MemberKind::Signal => 6,
            MemberKind::Slot => 7,
            MemberKind::Friend => 8,
            MemberKind::Dcop => 9,
            MemberKind::Property => 10,
            MemberKind::Event => 11,
        }
    }

    /// Get the string representation of the member kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Define => "define",
            MemberKind::Function => "function",
            MemberKind::Variable => "variable",
            MemberKind::Typedef => "typedef",
            MemberKind::Enum => "enum",
            MemberKind::EnumValue => "enumvalue",
            MemberKind::Signal => "signal",
            MemberKind::Slot => "slot",
            MemberKind::Friend => "friend",
            MemberKind::Dcop => "dcop",
            MemberKind::Property => "property",
            MemberKind::Event => "event",
        }
    }

    /// Get all member kinds
    pub fn all() -> &'static [MemberKind] {
        &[
            MemberKind::Define,
            MemberKind::Function,
            MemberKind::Variable,
            MemberKind::Typedef,
            MemberKind::Enum,
            MemberKind::EnumValue,
            MemberKind::Signal,
            MemberKind::Slot,
            MemberKind::Friend,
            MemberKind::Dcop,
            MemberKind::Property,
            MemberKind::Event,
        ]
    }

    /// Function-like kinds carry callable trait flags and an argument list
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            MemberKind::Function
                | MemberKind::Signal
                | MemberKind::Slot
                | MemberKind::Friend
                | MemberKind::Dcop
        )
    }
}

impl FromStr for MemberKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "define" | "macro" => Ok(MemberKind::Define),
            "function" | "method" => Ok(MemberKind::Function),
            "variable" | "field" => Ok(MemberKind::Variable),
            "typedef" => Ok(MemberKind::Typedef),
            "enum" | "enumeration" => Ok(MemberKind::Enum),
            "enumvalue" => Ok(MemberKind::EnumValue),
            "signal" => Ok(MemberKind::Signal),
            "slot" => Ok(MemberKind::Slot),
            "friend" => Ok(MemberKind::Friend),
            "dcop" => Ok(MemberKind::Dcop),
            "property" => Ok(MemberKind::Property),
            "event" => Ok(MemberKind::Event),
            _ => Err(Error::InvalidKey(format!("Unknown member kind: {}", s))),
        }
    }
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Access protection of an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protection {
    #[default]
    Public,
    Protected,
    Private,
    Package,
}

impl Protection {
    /// Integer code stored in the database
    pub fn code(&self) -> i64 {
        match self {
            Protection::Public => 0,
            Protection::Protected => 1,
            Protection::Private => 2,
            Protection::Package => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protection::Public => "public",
            Protection::Protected => "protected",
            Protection::Private => "private",
            Protection::Package => "package",
        }
    }
}

/// Virtuality of a member or inheritance edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Virtuality {
    #[default]
    NonVirtual,
    Virtual,
    PureVirtual,
}

impl Virtuality {
    /// Integer code stored in the database
    pub fn code(&self) -> i64 {
        match self {
            Virtuality::NonVirtual => 0,
            Virtuality::Virtual => 1,
            Virtuality::PureVirtual => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Virtuality::NonVirtual => "non-virtual",
            Virtuality::Virtual => "virtual",
            Virtuality::PureVirtual => "pure-virtual",
        }
    }
}

/// Property accessor semantics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessor {
    #[default]
    None,
    Assign,
    Copy,
    Retain,
    Strong,
    Weak,
}

impl Accessor {
    /// Integer code stored in the database
    pub fn code(&self) -> i64 {
        match self {
            Accessor::None => 0,
            Accessor::Assign => 1,
            Accessor::Copy => 2,
            Accessor::Retain => 3,
            Accessor::Strong => 4,
            Accessor::Weak => 5,
        }
    }
}

/// Context a cross-reference edge was observed in.
///
/// The same two symbols may be linked from more than one context; each
/// context is a separate stored fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XrefContext {
    /// Reference inside a member body
    Inline,
    /// Reference from a parameter type
    Argument,
    /// Reference from an initializer expression
    Initializer,
}

impl XrefContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            XrefContext::Inline => "inline",
            XrefContext::Argument => "argument",
            XrefContext::Initializer => "initializer",
        }
    }

    pub fn all() -> &'static [XrefContext] {
        &[XrefContext::Inline, XrefContext::Argument, XrefContext::Initializer]
    }
}

impl std::fmt::Display for XrefContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_kind_roundtrip() {
        for kind in CompoundKind::all() {
            let s = kind.as_str();
            let parsed: CompoundKind = s.parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_member_kind_roundtrip() {
        for kind in MemberKind::all() {
            let s = kind.as_str();
            let parsed: MemberKind = s.parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_member_kind_codes_are_stable() {
        assert_eq!(MemberKind::Define.code(), 0);
        assert_eq!(MemberKind::Function.code(), 1);
        assert_eq!(MemberKind::EnumValue.code(), 5);
        assert_eq!(MemberKind::Event.code(), 11);
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!(MemberKind::from_str("macro").unwrap(), MemberKind::Define);
        assert_eq!(MemberKind::from_str("method").unwrap(), MemberKind::Function);
        assert_eq!(CompoundKind::from_str("directory").unwrap(), CompoundKind::Dir);
    }

    #[test]
    fn test_function_like() {
        assert!(MemberKind::Function.is_function_like());
        assert!(MemberKind::Slot.is_function_like());
        assert!(!MemberKind::Variable.is_function_like());
        assert!(!MemberKind::Enum.is_function_like());
    }

    #[test]
    fn test_protection_codes() {
        assert_eq!(Protection::Public.code(), 0);
        assert_eq!(Protection::Package.code(), 3);
        assert_eq!(Protection::default(), Protection::Public);
    }

    #[test]
    fn test_virtuality_codes() {
        assert_eq!(Virtuality::NonVirtual.code(), 0);
        assert_eq!(Virtuality::PureVirtual.code(), 2);
    }
}
