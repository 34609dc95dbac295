mod id_counter;

pub use id_counter::{ArenaId, IdCounter};

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub u32);

impl EntityId {
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Arena slot for this id
    pub(crate) fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}

impl MemberId {
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}

impl ArenaId for EntityId {
    fn from_raw(raw: NonZeroU32) -> Self {
        Self(raw.get())
    }
}

impl ArenaId for MemberId {
    fn from_raw(raw: NonZeroU32) -> Self {
        Self(raw.get())
    }
}

/// Where a declaration was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: CompactString,
    pub line: u32,
    pub column: u16,
}

impl Location {
    pub fn new(file: &str, line: u32, column: u16) -> Self {
        Self {
            file: compact_string(file),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Visibility of a declaration or of an inheritance edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protection {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl Protection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protection::Public => "public",
            Protection::Protected => "protected",
            Protection::Package => "package",
            Protection::Private => "private",
        }
    }

    /// Effective protection of a member reached through a base edge with `edge` protection.
    ///
    /// A protected base caps public members to protected; a private base caps everything.
    pub fn capped_by(self, edge: Protection) -> Protection {
        match edge {
            Protection::Protected if self == Protection::Public => Protection::Protected,
            Protection::Private => Protection::Private,
            _ => self,
        }
    }
}

impl FromStr for Protection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" | "" => Ok(Protection::Public),
            "protected" => Ok(Protection::Protected),
            "package" | "internal" => Ok(Protection::Package),
            "private" => Ok(Protection::Private),
            _ => Err(ModelError::UnknownProtection {
                value: s.to_string(),
            }),
        }
    }
}

/// Virtualness of a member or an inheritance edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specifier {
    #[default]
    Normal,
    Virtual,
    Pure,
}

impl Specifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specifier::Normal => "normal",
            Specifier::Virtual => "virtual",
            Specifier::Pure => "pure",
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Specifier::Normal)
    }
}

impl FromStr for Specifier {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "" => Ok(Specifier::Normal),
            "virtual" => Ok(Specifier::Virtual),
            "pure" | "pure-virtual" | "pure_virtual" => Ok(Specifier::Pure),
            _ => Err(ModelError::UnknownSpecifier {
                value: s.to_string(),
            }),
        }
    }
}

/// Kind of compound entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompoundType {
    Class,
    Struct,
    Union,
    Interface,
    Protocol,
    Category,
    Exception,
    Service,
    Singleton,
    Namespace,
    Module,
    Library,
    ConstantGroup,
}

impl CompoundType {
    /// Namespace-like compounds become `Namespace` entities, everything else a `Class`.
    pub fn is_namespace_like(&self) -> bool {
        matches!(
            self,
            CompoundType::Namespace
                | CompoundType::Module
                | CompoundType::Library
                | CompoundType::ConstantGroup
        )
    }
}

impl FromStr for CompoundType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "class" => Ok(CompoundType::Class),
            "struct" => Ok(CompoundType::Struct),
            "union" => Ok(CompoundType::Union),
            "interface" => Ok(CompoundType::Interface),
            "protocol" => Ok(CompoundType::Protocol),
            "category" => Ok(CompoundType::Category),
            "exception" => Ok(CompoundType::Exception),
            "service" => Ok(CompoundType::Service),
            "singleton" => Ok(CompoundType::Singleton),
            "namespace" => Ok(CompoundType::Namespace),
            "module" => Ok(CompoundType::Module),
            "library" => Ok(CompoundType::Library),
            "constant-group" | "constants" | "constant_group" => Ok(CompoundType::ConstantGroup),
            _ => Err(ModelError::UnknownCompoundType {
                kind: s.to_string(),
            }),
        }
    }
}

/// Source language dialect of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SrcLang {
    #[default]
    Unknown,
    Cpp,
    Java,
    CSharp,
    ObjC,
    Idl,
    Python,
    Php,
    D,
    Js,
    Fortran,
}

impl SrcLang {
    /// Guess the language from a file name, the way front ends tag their output.
    pub fn from_file_name(file: &str) -> Self {
        let ext = file
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "h" | "hh" | "hpp" | "hxx" | "h++" | "c" | "cc" | "cpp" | "cxx" | "c++" | "ipp"
            | "inl" => SrcLang::Cpp,
            "java" => SrcLang::Java,
            "cs" => SrcLang::CSharp,
            "m" | "mm" => SrcLang::ObjC,
            "idl" | "ddl" | "odl" => SrcLang::Idl,
            "py" | "pyw" => SrcLang::Python,
            "php" | "php4" | "php5" | "inc" | "phtml" => SrcLang::Php,
            "d" => SrcLang::D,
            "js" => SrcLang::Js,
            "f" | "for" | "f90" | "f95" | "f03" | "f08" => SrcLang::Fortran,
            _ => SrcLang::Unknown,
        }
    }

    /// Scope separator used when rendering qualified names in this language.
    ///
    /// `class_scope` distinguishes PHP class scope (`::`) from PHP namespaces (`\`).
    pub fn scope_separator(&self, class_scope: bool) -> &'static str {
        match self {
            SrcLang::Java | SrcLang::CSharp | SrcLang::Python | SrcLang::Js => ".",
            SrcLang::Php if !class_scope => "\\",
            _ => "::",
        }
    }

    /// Whether a file name denotes an implementation (rather than header) file.
    pub fn is_source_file(file: &str) -> bool {
        let ext = file
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        matches!(
            ext.as_str(),
            "c" | "cc" | "cxx" | "cpp" | "c++" | "m" | "mm"
        )
    }
}

impl FromStr for SrcLang {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cpp" | "c++" => Ok(SrcLang::Cpp),
            "java" => Ok(SrcLang::Java),
            "csharp" | "c#" | "cs" => Ok(SrcLang::CSharp),
            "objc" | "objective-c" => Ok(SrcLang::ObjC),
            "idl" => Ok(SrcLang::Idl),
            "python" => Ok(SrcLang::Python),
            "php" => Ok(SrcLang::Php),
            "d" => Ok(SrcLang::D),
            "js" | "javascript" => Ok(SrcLang::Js),
            "fortran" => Ok(SrcLang::Fortran),
            _ => Ok(SrcLang::Unknown),
        }
    }
}

/// Kind of a member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Define,
    Function,
    Variable,
    Typedef,
    Enumeration,
    EnumValue,
    Interface,
    Service,
    Signal,
    Slot,
    Dcop,
    Property,
    Event,
}

impl MemberKind {
    /// Name used for the `kind` attribute in tag files.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Define => "define",
            MemberKind::Function => "function",
            MemberKind::Variable => "variable",
            MemberKind::Typedef => "typedef",
            MemberKind::Enumeration => "enumeration",
            MemberKind::EnumValue => "enumvalue",
            MemberKind::Interface => "interface",
            MemberKind::Service => "service",
            MemberKind::Signal => "signal",
            MemberKind::Slot => "slot",
            MemberKind::Dcop => "dcop",
            MemberKind::Property => "property",
            MemberKind::Event => "event",
        }
    }

    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            MemberKind::Function | MemberKind::Signal | MemberKind::Slot | MemberKind::Dcop
        )
    }
}

impl FromStr for MemberKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "define" | "macro" => Ok(MemberKind::Define),
            "function" | "method" => Ok(MemberKind::Function),
            "variable" | "field" | "attribute" => Ok(MemberKind::Variable),
            "typedef" | "alias" => Ok(MemberKind::Typedef),
            "enumeration" | "enum" => Ok(MemberKind::Enumeration),
            "enumvalue" | "enum-value" | "enum_value" => Ok(MemberKind::EnumValue),
            "interface" => Ok(MemberKind::Interface),
            "service" => Ok(MemberKind::Service),
            "signal" => Ok(MemberKind::Signal),
            "slot" => Ok(MemberKind::Slot),
            "dcop" => Ok(MemberKind::Dcop),
            "property" => Ok(MemberKind::Property),
            "event" => Ok(MemberKind::Event),
            _ => Err(ModelError::UnknownMemberKind {
                kind: s.to_string(),
            }),
        }
    }
}

pub type CompactString = Box<str>;

pub fn compact_string(s: &str) -> CompactString {
    s.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_creation() {
        assert!(EntityId::new(0).is_none());

        let id = EntityId::new(42).unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.index(), 41);
    }

    #[test]
    fn test_member_id_creation() {
        assert!(MemberId::new(0).is_none());
        assert_eq!(MemberId::new(7).unwrap().index(), 6);
    }

    #[test]
    fn test_protection_capping() {
        use Protection::*;

        assert_eq!(Public.capped_by(Public), Public);
        assert_eq!(Public.capped_by(Protected), Protected);
        assert_eq!(Protected.capped_by(Protected), Protected);
        assert_eq!(Public.capped_by(Private), Private);
        assert_eq!(Protected.capped_by(Private), Private);
        assert_eq!(Package.capped_by(Protected), Package);
    }

    #[test]
    fn test_member_kind_parsing() {
        assert_eq!("method".parse::<MemberKind>().unwrap(), MemberKind::Function);
        assert_eq!("enum-value".parse::<MemberKind>().unwrap(), MemberKind::EnumValue);
        assert!(matches!(
            "gizmo".parse::<MemberKind>(),
            Err(ModelError::UnknownMemberKind { .. })
        ));
    }

    #[test]
    fn test_compound_type_namespace_like() {
        assert!(CompoundType::Namespace.is_namespace_like());
        assert!(CompoundType::ConstantGroup.is_namespace_like());
        assert!(!CompoundType::Struct.is_namespace_like());
        assert_eq!(
            "constant-group".parse::<CompoundType>().unwrap(),
            CompoundType::ConstantGroup
        );
    }

    #[test]
    fn test_language_from_file_name() {
        assert_eq!(SrcLang::from_file_name("include/vec.hpp"), SrcLang::Cpp);
        assert_eq!(SrcLang::from_file_name("Foo.java"), SrcLang::Java);
        assert_eq!(SrcLang::from_file_name("README"), SrcLang::Unknown);
        assert!(SrcLang::is_source_file("impl.cpp"));
        assert!(!SrcLang::is_source_file("impl.h"));
    }

    #[test]
    fn test_scope_separator() {
        assert_eq!(SrcLang::Cpp.scope_separator(true), "::");
        assert_eq!(SrcLang::Java.scope_separator(true), ".");
        assert_eq!(SrcLang::Php.scope_separator(false), "\\");
        assert_eq!(SrcLang::Php.scope_separator(true), "::");
    }
}
