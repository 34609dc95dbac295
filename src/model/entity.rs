//! Compound entities: classes and namespaces sharing one base record.

use super::argument::Argument;
use super::member_list::{AllMembers, MemberTable};
use crate::relations::BaseEdge;
use crate::types::{
    CompactString, CompoundType, EntityId, Location, MemberId, Protection, SrcLang,
};
use bitflags::bitflags;
use serde::Serialize;
use std::collections::BTreeMap;

bitflags! {
    /// Flags common to classes and namespaces.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntityFlags: u16 {
        const HIDDEN = 1 << 0;
        /// Synthesised by the model rather than declared in source
        const ARTIFICIAL = 1 << 1;
        const DOCUMENTED = 1 << 2;
        const STATIC = 1 << 3;
        /// Declared in an implementation file
        const LOCAL = 1 << 4;
        /// Created only because something refers to it
        const USED_ONLY = 1 << 5;
        const ANONYMOUS = 1 << 6;
    }
}

bitflags! {
    /// Language-level traits of a class.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassTraits: u16 {
        const FINAL = 1 << 0;
        const SEALED = 1 << 1;
        const ABSTRACT = 1 << 2;
        const PUBLISHED = 1 << 3;
        /// Objective-C class extension (anonymous category)
        const EXTENSION = 1 << 4;
        const FORWARD_DECL = 1 << 5;
        const JAVA_ENUM = 1 << 6;
        const LOCAL = 1 << 7;
    }
}

impl ClassTraits {
    /// Parse a trait name as it appears in declaration records.
    pub fn from_trait_name(name: &str) -> Option<Self> {
        let flag = match name.trim().to_ascii_lowercase().as_str() {
            "final" => Self::FINAL,
            "sealed" => Self::SEALED,
            "abstract" => Self::ABSTRACT,
            "published" => Self::PUBLISHED,
            "extension" => Self::EXTENSION,
            "forward-declared" | "forward" => Self::FORWARD_DECL,
            "java-enum" | "enum" => Self::JAVA_ENUM,
            "local" => Self::LOCAL,
            _ => return None,
        };
        Some(flag)
    }
}

/// Target of a `using X::y` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UsingTarget {
    Entity(EntityId),
    Member(MemberId),
}

/// Class-only state.
#[derive(Debug, Clone, Default)]
pub struct ClassData {
    pub traits: ClassTraits,
    /// Base edges in declaration order
    pub bases: Vec<BaseEdge>,
    /// Derived edges sorted by derived class name
    pub derived: Vec<BaseEdge>,
    pub template_params: Vec<Argument>,
    /// Generic class this entity instantiates
    pub template_master: Option<EntityId>,
    pub template_instances: BTreeMap<String, EntityId>,
    pub variable_instances: BTreeMap<String, EntityId>,
    pub all_members: AllMembers,
    pub members_merged: bool,
    /// Plain data struct with no inheritance
    pub is_simple: bool,
    pub sub_grouping: bool,
    pub arrow_operator: Option<MemberId>,
    /// For Objective-C categories: the class being extended
    pub category_of: Option<EntityId>,
}

impl ClassData {
    pub fn is_template_instance(&self) -> bool {
        self.template_master.is_some()
    }

    pub fn is_abstract(&self) -> bool {
        self.traits.contains(ClassTraits::ABSTRACT)
    }

    pub fn is_template(&self) -> bool {
        !self.template_params.is_empty()
    }
}

/// Namespace-only state.
#[derive(Debug, Clone, Default)]
pub struct NamespaceData {
    pub is_inline: bool,
    /// `using namespace X`, keyed by qualified name
    pub using_directives: BTreeMap<CompactString, EntityId>,
    /// `using X::y`, keyed by qualified name
    pub using_declarations: BTreeMap<CompactString, UsingTarget>,
    /// Members by local name
    pub all_members: BTreeMap<CompactString, Vec<MemberId>>,
    /// Set once the using closure has been computed
    pub visited: bool,
}

#[derive(Debug, Clone)]
pub enum EntityVariant {
    Class(ClassData),
    Namespace(NamespaceData),
}

/// A documented class-like or namespace-like unit.
#[derive(Debug, Clone)]
pub struct CompoundEntity {
    pub id: EntityId,
    /// Fully qualified name, `::` separated
    pub name: CompactString,
    pub compound_type: CompoundType,
    pub location: Location,
    pub language: SrcLang,
    pub protection: Protection,
    pub flags: EntityFlags,
    pub outer_scope: Option<EntityId>,
    pub inner_classes: Vec<EntityId>,
    pub inner_namespaces: Vec<EntityId>,
    /// External tag file this entity was imported from
    pub reference: Option<String>,
    pub member_lists: MemberTable,
    pub variant: EntityVariant,
}

/// Synthetic names for unnamed scopes start with `@`.
pub fn is_anonymous_name(name: &str) -> bool {
    name.is_empty() || name.starts_with('@') || name.contains("::@")
}

impl CompoundEntity {
    pub(crate) fn new(id: EntityId, name: &str, compound_type: CompoundType, location: Location) -> Self {
        let variant = if compound_type.is_namespace_like() {
            EntityVariant::Namespace(NamespaceData::default())
        } else {
            EntityVariant::Class(ClassData::default())
        };

        let mut flags = EntityFlags::empty();
        if is_anonymous_name(name) {
            flags |= EntityFlags::ANONYMOUS;
        }
        if SrcLang::is_source_file(&location.file) && !compound_type.is_namespace_like() {
            flags |= EntityFlags::LOCAL;
        }

        Self {
            id,
            name: name.into(),
            compound_type,
            language: SrcLang::from_file_name(&location.file),
            location,
            protection: Protection::Public,
            flags,
            outer_scope: None,
            inner_classes: Vec::new(),
            inner_namespaces: Vec::new(),
            reference: None,
            member_lists: MemberTable::new(),
            variant,
        }
    }

    /// Last `::` component of the qualified name.
    pub fn local_name(&self) -> &str {
        local_name_of(&self.name)
    }

    pub fn is_class(&self) -> bool {
        matches!(self.variant, EntityVariant::Class(_))
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.variant, EntityVariant::Namespace(_))
    }

    pub fn class(&self) -> Option<&ClassData> {
        match &self.variant {
            EntityVariant::Class(data) => Some(data),
            EntityVariant::Namespace(_) => None,
        }
    }

    pub fn class_mut(&mut self) -> Option<&mut ClassData> {
        match &mut self.variant {
            EntityVariant::Class(data) => Some(data),
            EntityVariant::Namespace(_) => None,
        }
    }

    pub fn namespace(&self) -> Option<&NamespaceData> {
        match &self.variant {
            EntityVariant::Namespace(data) => Some(data),
            EntityVariant::Class(_) => None,
        }
    }

    pub fn namespace_mut(&mut self) -> Option<&mut NamespaceData> {
        match &mut self.variant {
            EntityVariant::Namespace(data) => Some(data),
            EntityVariant::Class(_) => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.flags.contains(EntityFlags::ANONYMOUS)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(EntityFlags::HIDDEN)
    }

    pub fn is_artificial(&self) -> bool {
        self.flags.contains(EntityFlags::ARTIFICIAL)
    }

    pub fn has_documentation(&self) -> bool {
        self.flags.contains(EntityFlags::DOCUMENTED)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(EntityFlags::STATIC)
    }

    pub fn is_local(&self) -> bool {
        self.flags.contains(EntityFlags::LOCAL)
            || self
                .class()
                .is_some_and(|c| c.traits.contains(ClassTraits::LOCAL))
    }

    pub fn is_used_only(&self) -> bool {
        self.flags.contains(EntityFlags::USED_ONLY)
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn is_template_instance(&self) -> bool {
        self.class().is_some_and(ClassData::is_template_instance)
    }

    pub fn template_master(&self) -> Option<EntityId> {
        self.class().and_then(|c| c.template_master)
    }

    pub fn set_flag(&mut self, flag: EntityFlags, on: bool) {
        self.flags.set(flag, on);
    }
}

/// Last `::` component of a qualified name, ignoring separators inside `<>`.
pub fn local_name_of(name: &str) -> &str {
    match scope_split(name) {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

/// Enclosing scope of a qualified name, if any.
pub fn scope_of(name: &str) -> Option<&str> {
    scope_split(name).map(|pos| &name[..pos])
}

fn scope_split(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    let mut depth = 0i32;
    let mut last = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                last = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_respects_templates() {
        assert_eq!(local_name_of("ns::Outer::Inner"), "Inner");
        assert_eq!(local_name_of("Vec<std::string>"), "Vec<std::string>");
        assert_eq!(local_name_of("a::Map<b::K, c::V>"), "Map<b::K, c::V>");
        assert_eq!(scope_of("a::Map<b::K, c::V>"), Some("a"));
        assert_eq!(scope_of("Global"), None);
    }

    #[test]
    fn test_anonymous_names() {
        assert!(is_anonymous_name(""));
        assert!(is_anonymous_name("@0"));
        assert!(is_anonymous_name("ns::@3"));
        assert!(!is_anonymous_name("ns::Point"));
    }

    #[test]
    fn test_variant_follows_compound_type() {
        let ns = CompoundEntity::new(
            EntityId(1),
            "lib",
            CompoundType::Namespace,
            Location::new("lib.h", 1, 1),
        );
        assert!(ns.is_namespace());
        assert!(ns.class().is_none());

        let cls = CompoundEntity::new(
            EntityId(2),
            "lib::Impl",
            CompoundType::Class,
            Location::new("impl.cpp", 10, 1),
        );
        assert!(cls.is_class());
        assert!(cls.is_local());
        assert_eq!(cls.local_name(), "Impl");
        assert_eq!(cls.language, SrcLang::Cpp);
    }

    #[test]
    fn test_class_traits_from_trait_name() {
        assert_eq!(ClassTraits::from_trait_name("final"), Some(ClassTraits::FINAL));
        assert_eq!(
            ClassTraits::from_trait_name("forward-declared"),
            Some(ClassTraits::FORWARD_DECL)
        );
        assert_eq!(ClassTraits::from_trait_name("mystery"), None);
    }
}
