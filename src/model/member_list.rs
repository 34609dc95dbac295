//! Category tags and the per-entity member table.

use super::member::MemberInfo;
use crate::types::{CompactString, MemberId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Named bucket a member is filed under.
///
/// Declaration lists (the compact summary) are keyed by kind, protection and
/// staticness. Detailed lists (full documentation) collapse protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberListType {
    // Class declaration lists
    PubMethods,
    ProMethods,
    PacMethods,
    PriMethods,
    PubStaticMethods,
    ProStaticMethods,
    PacStaticMethods,
    PriStaticMethods,
    PubSignals,
    ProSignals,
    PriSignals,
    PubSlots,
    ProSlots,
    PriSlots,
    PubAttribs,
    ProAttribs,
    PacAttribs,
    PriAttribs,
    PubStaticAttribs,
    ProStaticAttribs,
    PacStaticAttribs,
    PriStaticAttribs,
    PubTypes,
    ProTypes,
    PacTypes,
    PriTypes,
    PubTypedefs,
    ProTypedefs,
    PacTypedefs,
    PriTypedefs,
    Services,
    Interfaces,
    Properties,
    Events,
    Friends,
    Related,
    DcopMethods,

    // Class detailed lists
    TypedefMembers,
    EnumMembers,
    EnumValMembers,
    FunctionMembers,
    RelatedMembers,
    VariableMembers,
    PropertyMembers,
    EventMembers,
    Constructors,
    InterfaceMembers,
    ServiceMembers,

    // Namespace declaration lists
    DecDefineMembers,
    DecTypedefMembers,
    DecEnumMembers,
    DecFuncMembers,
    DecVarMembers,

    // Namespace documentation lists
    DocDefineMembers,
    DocTypedefMembers,
    DocEnumMembers,
    DocFuncMembers,
    DocVarMembers,
}

impl MemberListType {
    /// Lists rendered in the full documentation section.
    pub fn is_detailed(&self) -> bool {
        use MemberListType::*;
        matches!(
            self,
            TypedefMembers
                | EnumMembers
                | EnumValMembers
                | FunctionMembers
                | RelatedMembers
                | VariableMembers
                | PropertyMembers
                | EventMembers
                | Constructors
                | InterfaceMembers
                | ServiceMembers
                | DocDefineMembers
                | DocTypedefMembers
                | DocEnumMembers
                | DocFuncMembers
                | DocVarMembers
        )
    }

    pub fn is_declaration(&self) -> bool {
        !self.is_detailed()
    }

    /// Short identifier used in JSON output and the CLI.
    pub fn as_str(&self) -> &'static str {
        use MemberListType::*;
        match self {
            PubMethods => "pub-methods",
            ProMethods => "pro-methods",
            PacMethods => "pac-methods",
            PriMethods => "pri-methods",
            PubStaticMethods => "pub-static-methods",
            ProStaticMethods => "pro-static-methods",
            PacStaticMethods => "pac-static-methods",
            PriStaticMethods => "pri-static-methods",
            PubSignals => "pub-signals",
            ProSignals => "pro-signals",
            PriSignals => "pri-signals",
            PubSlots => "pub-slots",
            ProSlots => "pro-slots",
            PriSlots => "pri-slots",
            PubAttribs => "pub-attribs",
            ProAttribs => "pro-attribs",
            PacAttribs => "pac-attribs",
            PriAttribs => "pri-attribs",
            PubStaticAttribs => "pub-static-attribs",
            ProStaticAttribs => "pro-static-attribs",
            PacStaticAttribs => "pac-static-attribs",
            PriStaticAttribs => "pri-static-attribs",
            PubTypes => "pub-types",
            ProTypes => "pro-types",
            PacTypes => "pac-types",
            PriTypes => "pri-types",
            PubTypedefs => "pub-typedefs",
            ProTypedefs => "pro-typedefs",
            PacTypedefs => "pac-typedefs",
            PriTypedefs => "pri-typedefs",
            Services => "services",
            Interfaces => "interfaces",
            Properties => "properties",
            Events => "events",
            Friends => "friends",
            Related => "related",
            DcopMethods => "dcop-methods",
            TypedefMembers => "typedef-members",
            EnumMembers => "enum-members",
            EnumValMembers => "enum-val-members",
            FunctionMembers => "function-members",
            RelatedMembers => "related-members",
            VariableMembers => "variable-members",
            PropertyMembers => "property-members",
            EventMembers => "event-members",
            Constructors => "constructors",
            InterfaceMembers => "interface-members",
            ServiceMembers => "service-members",
            DecDefineMembers => "dec-define-members",
            DecTypedefMembers => "dec-typedef-members",
            DecEnumMembers => "dec-enum-members",
            DecFuncMembers => "dec-func-members",
            DecVarMembers => "dec-var-members",
            DocDefineMembers => "doc-define-members",
            DocTypedefMembers => "doc-typedef-members",
            DocEnumMembers => "doc-enum-members",
            DocFuncMembers => "doc-func-members",
            DocVarMembers => "doc-var-members",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CLASS_LAYOUT
            .iter()
            .chain(CLASS_DETAILED_LISTS)
            .chain(NAMESPACE_LAYOUT)
            .chain(NAMESPACE_DETAILED_LISTS)
            .copied()
            .find(|lt| lt.as_str() == name)
    }
}

/// Order in which class declaration lists are rendered and exported.
pub const CLASS_LAYOUT: &[MemberListType] = {
    use MemberListType::*;
    &[
        PubTypes,
        PubTypedefs,
        Services,
        Interfaces,
        PubSlots,
        PubSignals,
        PubMethods,
        DcopMethods,
        PubStaticMethods,
        PubAttribs,
        PubStaticAttribs,
        ProTypes,
        ProTypedefs,
        ProSlots,
        ProSignals,
        ProMethods,
        ProStaticMethods,
        ProAttribs,
        ProStaticAttribs,
        PacTypes,
        PacTypedefs,
        PacMethods,
        PacStaticMethods,
        PacAttribs,
        PacStaticAttribs,
        Properties,
        Events,
        PriTypes,
        PriTypedefs,
        PriSlots,
        PriSignals,
        PriMethods,
        PriStaticMethods,
        PriAttribs,
        PriStaticAttribs,
        Friends,
        Related,
    ]
};

pub const CLASS_DETAILED_LISTS: &[MemberListType] = {
    use MemberListType::*;
    &[
        TypedefMembers,
        EnumMembers,
        EnumValMembers,
        Constructors,
        FunctionMembers,
        RelatedMembers,
        VariableMembers,
        PropertyMembers,
        EventMembers,
        InterfaceMembers,
        ServiceMembers,
    ]
};

/// Order in which namespace declaration lists are rendered and exported.
pub const NAMESPACE_LAYOUT: &[MemberListType] = {
    use MemberListType::*;
    &[
        DecDefineMembers,
        DecTypedefMembers,
        DecEnumMembers,
        DecFuncMembers,
        DecVarMembers,
    ]
};

pub const NAMESPACE_DETAILED_LISTS: &[MemberListType] = {
    use MemberListType::*;
    &[
        DocDefineMembers,
        DocTypedefMembers,
        DocEnumMembers,
        DocFuncMembers,
        DocVarMembers,
    ]
};

/// One category list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberList {
    pub list_type: MemberListType,
    pub members: Vec<MemberId>,
}

/// Category lists in the order they were first used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberTable {
    lists: Vec<MemberList>,
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members filed under `list_type`, empty if the list was never created.
    pub fn get(&self, list_type: MemberListType) -> &[MemberId] {
        self.lists
            .iter()
            .find(|l| l.list_type == list_type)
            .map(|l| l.members.as_slice())
            .unwrap_or(&[])
    }

    /// Append, creating the list on first use. A member is filed once per list.
    pub fn append(&mut self, list_type: MemberListType, member: MemberId) {
        let list = match self.lists.iter().position(|l| l.list_type == list_type) {
            Some(pos) => &mut self.lists[pos],
            None => {
                self.lists.push(MemberList {
                    list_type,
                    members: Vec::new(),
                });
                let last = self.lists.len() - 1;
                &mut self.lists[last]
            }
        };
        if !list.members.contains(&member) {
            list.members.push(member);
        }
    }

    pub fn contains(&self, list_type: MemberListType, member: MemberId) -> bool {
        self.get(list_type).contains(&member)
    }

    pub fn lists(&self) -> impl Iterator<Item = &MemberList> {
        self.lists.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(|l| l.members.is_empty())
    }
}

/// Every member reachable from a class, grouped by name.
pub type AllMembers = BTreeMap<CompactString, Vec<MemberInfo>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_keeps_insertion_order() {
        let mut table = MemberTable::new();
        table.append(MemberListType::ProMethods, MemberId(3));
        table.append(MemberListType::PubMethods, MemberId(1));
        table.append(MemberListType::ProMethods, MemberId(2));
        table.append(MemberListType::ProMethods, MemberId(3));

        let order: Vec<_> = table.lists().map(|l| l.list_type).collect();
        assert_eq!(
            order,
            vec![MemberListType::ProMethods, MemberListType::PubMethods]
        );
        assert_eq!(
            table.get(MemberListType::ProMethods),
            &[MemberId(3), MemberId(2)]
        );
        assert!(table.get(MemberListType::Friends).is_empty());
    }

    #[test]
    fn test_layouts_cover_every_type_once() {
        let mut seen = std::collections::HashSet::new();
        for lt in CLASS_LAYOUT
            .iter()
            .chain(CLASS_DETAILED_LISTS)
            .chain(NAMESPACE_LAYOUT)
            .chain(NAMESPACE_DETAILED_LISTS)
        {
            assert!(seen.insert(*lt), "{lt:?} listed twice");
            assert_eq!(MemberListType::from_name(lt.as_str()), Some(*lt));
        }
        assert_eq!(seen.len(), 58);
    }

    #[test]
    fn test_detailed_flag() {
        assert!(MemberListType::Constructors.is_detailed());
        assert!(MemberListType::DocFuncMembers.is_detailed());
        assert!(MemberListType::PubMethods.is_declaration());
        assert!(MemberListType::DecFuncMembers.is_declaration());
    }
}
