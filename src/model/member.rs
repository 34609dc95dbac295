//! Member declarations and the per-path records the merger works with.

use super::argument::ArgumentList;
use crate::types::{
    CompactString, EntityId, Location, MemberId, MemberKind, Protection, Specifier, SrcLang,
    compact_string,
};
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Boolean properties of a member declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberFlags: u16 {
        const STATIC = 1 << 0;
        const FRIEND = 1 << 1;
        /// Documented with the class but declared elsewhere
        const RELATED = 1 << 2;
        const CONSTRUCTOR = 1 << 3;
        const DESTRUCTOR = 1 << 4;
        const FUNCTION_POINTER = 1 << 5;
        const HIDDEN = 1 << 6;
        const DOCUMENTED = 1 << 7;
        const ARTIFICIAL = 1 << 8;
        /// Copied from a local category or extension
        const IMPLEMENTATION_DETAIL = 1 << 9;
    }
}

/// One member declaration. Records are shared; only [`MemberInfo`] is per path.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub id: MemberId,
    pub name: CompactString,
    pub kind: MemberKind,
    pub protection: Protection,
    pub virtualness: Specifier,
    /// Owning class or namespace
    pub owner: Option<EntityId>,
    pub type_string: String,
    pub args_string: String,
    pub arguments: ArgumentList,
    pub flags: MemberFlags,
    pub location: Location,
    pub language: SrcLang,
    /// Generic member this one was instantiated from
    pub template_master: Option<MemberId>,
    /// Objective-C category that contributed this member
    pub category: Option<EntityId>,
    /// Counterpart of this member in the class/category pair
    pub category_relation: Option<MemberId>,
}

impl MemberRecord {
    /// A fresh record; the id is assigned when the model adopts it.
    pub fn new(name: &str, kind: MemberKind) -> Self {
        Self {
            id: MemberId(0),
            name: compact_string(name),
            kind,
            protection: Protection::Public,
            virtualness: Specifier::Normal,
            owner: None,
            type_string: String::new(),
            args_string: String::new(),
            arguments: ArgumentList::default(),
            flags: MemberFlags::empty(),
            location: Location::default(),
            language: SrcLang::Unknown,
            template_master: None,
            category: None,
            category_relation: None,
        }
    }

    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    pub fn with_virtualness(mut self, virtualness: Specifier) -> Self {
        self.virtualness = virtualness;
        self
    }

    pub fn with_type(mut self, type_string: &str) -> Self {
        self.type_string = type_string.trim().to_string();
        self
    }

    /// Set the textual argument list and parse it.
    pub fn with_args(mut self, args: &str) -> Self {
        self.args_string = args.trim().to_string();
        self.arguments = ArgumentList::parse(args);
        if self.arguments.is_pure && self.virtualness != Specifier::Pure {
            self.virtualness = Specifier::Pure;
        }
        self
    }

    pub fn with_flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.language = SrcLang::from_file_name(&location.file);
        self.location = location;
        self
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_friend(&self) -> bool {
        self.flags.contains(MemberFlags::FRIEND)
    }

    pub fn is_related(&self) -> bool {
        self.flags.contains(MemberFlags::RELATED)
    }

    pub fn is_constructor(&self) -> bool {
        self.flags.contains(MemberFlags::CONSTRUCTOR)
    }

    pub fn is_destructor(&self) -> bool {
        self.flags.contains(MemberFlags::DESTRUCTOR)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(MemberFlags::HIDDEN)
    }

    pub fn is_documented(&self) -> bool {
        self.flags.contains(MemberFlags::DOCUMENTED)
    }

    pub fn is_function_ptr(&self) -> bool {
        self.flags.contains(MemberFlags::FUNCTION_POINTER)
    }

    /// Assignment operator, constructor or destructor.
    ///
    /// These are never copied into a derived class' own lists.
    pub fn is_standard_func(&self) -> bool {
        &*self.name == "operator=" || self.is_constructor() || self.is_destructor()
    }

    /// `friend class X;` style declarations.
    pub fn is_friend_compound(&self) -> bool {
        self.is_friend()
            && matches!(
                self.type_string.as_str(),
                "friend class" | "friend struct" | "friend union"
            )
    }

    /// Flag constructors and destructors the front end did not mark.
    pub(crate) fn detect_lifecycle(&mut self, owner_local_name: &str) {
        if !self.kind.is_function_like() || owner_local_name.is_empty() {
            return;
        }
        let bare = owner_local_name
            .split_once('<')
            .map_or(owner_local_name, |(head, _)| head);
        if &*self.name == bare {
            self.flags |= MemberFlags::CONSTRUCTOR;
        } else if self.name.strip_prefix('~') == Some(bare) {
            self.flags |= MemberFlags::DESTRUCTOR;
        }
    }
}

/// A member as seen from one class, through one inheritance path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    pub member: MemberId,
    /// Effective protection after capping along the path
    pub protection: Protection,
    /// Effective virtualness along the path
    pub virtualness: Specifier,
    pub inherited: bool,
    /// Classes the member was inherited through, each followed by a separator
    pub scope_path: String,
    /// Prefix that makes an ambiguous name unique
    pub ambiguity_scope: String,
    /// Class whose declaration hides or shadows this one
    pub ambig_class: Option<EntityId>,
}

impl MemberInfo {
    /// Record for a member declared directly in the class.
    pub fn direct(member: &MemberRecord, protection: Protection) -> Self {
        Self {
            member: member.id,
            protection,
            virtualness: member.virtualness,
            inherited: false,
            scope_path: String::new(),
            ambiguity_scope: String::new(),
            ambig_class: None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.ambiguity_scope.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_parses_arguments() {
        let md = MemberRecord::new("draw", MemberKind::Function)
            .with_type("void")
            .with_args("(Canvas &c) const = 0");

        assert_eq!(md.arguments.len(), 1);
        assert!(md.arguments.is_const);
        assert_eq!(md.virtualness, Specifier::Pure);
    }

    #[test]
    fn test_detect_lifecycle() {
        let mut ctor = MemberRecord::new("Vector", MemberKind::Function);
        ctor.detect_lifecycle("Vector<T>");
        assert!(ctor.is_constructor());

        let mut dtor = MemberRecord::new("~Vector", MemberKind::Function);
        dtor.detect_lifecycle("Vector");
        assert!(dtor.is_destructor());
        assert!(dtor.is_standard_func());

        let mut field = MemberRecord::new("Vector", MemberKind::Variable);
        field.detect_lifecycle("Vector");
        assert!(!field.is_constructor());
    }

    #[test]
    fn test_friend_compound() {
        let md = MemberRecord::new("Peer", MemberKind::Function)
            .with_type("friend class")
            .with_flags(MemberFlags::FRIEND);
        assert!(md.is_friend_compound());
    }

    #[test]
    fn test_direct_member_info() {
        let md = MemberRecord::new("run", MemberKind::Function).with_virtualness(Specifier::Virtual);
        let mi = MemberInfo::direct(&md, Protection::Protected);
        assert!(!mi.inherited);
        assert!(mi.scope_path.is_empty());
        assert_eq!(mi.virtualness, Specifier::Virtual);
        assert!(!mi.is_ambiguous());
    }
}
