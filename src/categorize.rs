//! Member categorization.
//!
//! [`categorize`] is a pure decision table from member kind, protection and a
//! few options to the pair of lists a class member is filed under: one
//! declaration list and one detailed documentation list. The model methods
//! below apply that placement and maintain the side effects (abstract flag,
//! smart-pointer arrow operator, simple-struct flag, all-members table).

use crate::config::ModelOptions;
use crate::error::ModelResult;
use crate::model::{
    CompoundEntity, DocumentationModel, MemberInfo, MemberListType, MemberRecord,
};
use crate::types::{EntityId, MemberId, MemberKind, Protection, Specifier};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Where a class member goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub declaration: MemberListType,
    /// `None` when the member is not documented at this protection level
    pub documentation: Option<MemberListType>,
    /// Whether the member is compatible with a simple (plain data) struct
    pub keeps_simple: bool,
}

/// Members that cannot be filed in a class.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CategorizeError {
    #[error("a {kind:?} cannot be a member of a class")]
    NotAClassMember { kind: MemberKind },
}

/// Whether members at `protection` are documented at all.
pub fn protection_level_visible(protection: Protection, options: &ModelOptions) -> bool {
    match protection {
        Protection::Public | Protection::Protected => true,
        Protection::Private => options.extract_private,
        Protection::Package => options.extract_package,
    }
}

fn by_protection(
    protection: Protection,
    public: MemberListType,
    protected: MemberListType,
    package: MemberListType,
    private: MemberListType,
) -> MemberListType {
    match protection {
        Protection::Public => public,
        Protection::Protected => protected,
        Protection::Package => package,
        Protection::Private => private,
    }
}

/// Decide the lists for a class member seen at `protection`.
pub fn categorize(
    member: &MemberRecord,
    protection: Protection,
    options: &ModelOptions,
) -> Result<Placement, CategorizeError> {
    use MemberListType as L;

    let visible = protection_level_visible(protection, options);

    if (member.is_related() && visible) || member.is_friend() {
        let declaration = if member.is_related() && visible {
            L::Related
        } else {
            L::Friends
        };
        return Ok(Placement {
            declaration,
            documentation: Some(L::RelatedMembers),
            keeps_simple: false,
        });
    }

    let placement = |declaration, documentation: Option<MemberListType>, keeps_simple| Placement {
        declaration,
        documentation,
        keeps_simple,
    };
    let when_visible = |lt| visible.then_some(lt);

    let placed = match member.kind {
        MemberKind::Service => placement(L::Services, Some(L::ServiceMembers), false),
        MemberKind::Interface => placement(L::Interfaces, Some(L::InterfaceMembers), false),
        MemberKind::Dcop => placement(L::DcopMethods, Some(L::FunctionMembers), false),
        MemberKind::Property => placement(L::Properties, Some(L::PropertyMembers), false),
        MemberKind::Event => placement(L::Events, Some(L::EventMembers), false),
        // Package signals and slots do not exist; they are filed as protected
        MemberKind::Signal => placement(
            by_protection(protection, L::PubSignals, L::ProSignals, L::ProSignals, L::PriSignals),
            when_visible(L::FunctionMembers),
            false,
        ),
        MemberKind::Slot => placement(
            by_protection(protection, L::PubSlots, L::ProSlots, L::ProSlots, L::PriSlots),
            when_visible(L::FunctionMembers),
            false,
        ),
        MemberKind::Define => {
            return Err(CategorizeError::NotAClassMember { kind: member.kind });
        }
        MemberKind::Variable if member.is_static() => placement(
            by_protection(
                protection,
                L::PubStaticAttribs,
                L::ProStaticAttribs,
                L::PacStaticAttribs,
                L::PriStaticAttribs,
            ),
            when_visible(L::VariableMembers),
            false,
        ),
        MemberKind::Variable => placement(
            by_protection(protection, L::PubAttribs, L::ProAttribs, L::PacAttribs, L::PriAttribs),
            when_visible(L::VariableMembers),
            protection == Protection::Public && !member.is_function_ptr(),
        ),
        kind if member.is_static() => placement(
            by_protection(
                protection,
                L::PubStaticMethods,
                L::ProStaticMethods,
                L::PacStaticMethods,
                L::PriStaticMethods,
            ),
            when_visible(detailed_for(kind, member)),
            false,
        ),
        MemberKind::Typedef => placement(
            by_protection(protection, L::PubTypedefs, L::ProTypedefs, L::PacTypedefs, L::PriTypedefs),
            when_visible(L::TypedefMembers),
            protection == Protection::Public && !member.type_string.contains(")("),
        ),
        MemberKind::Enumeration | MemberKind::EnumValue => placement(
            by_protection(protection, L::PubTypes, L::ProTypes, L::PacTypes, L::PriTypes),
            when_visible(detailed_for(member.kind, member)),
            false,
        ),
        MemberKind::Function => {
            let documentation = if member.is_constructor() || member.is_destructor() {
                Some(L::Constructors)
            } else {
                when_visible(L::FunctionMembers)
            };
            placement(
                by_protection(protection, L::PubMethods, L::ProMethods, L::PacMethods, L::PriMethods),
                documentation,
                false,
            )
        }
    };

    Ok(placed)
}

fn detailed_for(kind: MemberKind, member: &MemberRecord) -> MemberListType {
    use MemberListType as L;
    match kind {
        MemberKind::Typedef => L::TypedefMembers,
        MemberKind::Enumeration => L::EnumMembers,
        MemberKind::EnumValue => L::EnumValMembers,
        MemberKind::Variable => L::VariableMembers,
        _ if member.is_constructor() || member.is_destructor() => L::Constructors,
        _ => L::FunctionMembers,
    }
}

/// Lists a namespace member is filed under, `None` for class-only kinds.
///
/// Enum values are only recorded in the namespace's member dictionary.
pub fn namespace_placement(
    kind: MemberKind,
) -> Option<Option<(MemberListType, MemberListType)>> {
    use MemberListType as L;
    match kind {
        MemberKind::Variable => Some(Some((L::DecVarMembers, L::DocVarMembers))),
        MemberKind::Function => Some(Some((L::DecFuncMembers, L::DocFuncMembers))),
        MemberKind::Typedef => Some(Some((L::DecTypedefMembers, L::DocTypedefMembers))),
        MemberKind::Enumeration => Some(Some((L::DecEnumMembers, L::DocEnumMembers))),
        MemberKind::Define => Some(Some((L::DecDefineMembers, L::DocDefineMembers))),
        MemberKind::EnumValue => Some(None),
        _ => None,
    }
}

impl DocumentationModel {
    /// File a member of `owner` under its own protection.
    ///
    /// Classes get declaration and documentation lists plus the all-members
    /// table; namespaces get their declaration/documentation pair.
    pub fn insert_member(&mut self, owner: EntityId, member: MemberId) -> ModelResult<()> {
        let protection = self.require_member(member)?.protection;
        let entity = self.require_entity(owner)?;

        if entity.is_class() {
            self.internal_insert_member(owner, member, protection, true);
        } else {
            self.insert_namespace_member(owner, member);
        }
        Ok(())
    }

    /// Class-side insertion at an explicit protection.
    ///
    /// `add_to_all_list` is false when the member reaches the class through
    /// inheritance or a category and the all-members table is maintained by
    /// the caller.
    pub(crate) fn internal_insert_member(
        &mut self,
        class: EntityId,
        member: MemberId,
        protection: Protection,
        add_to_all_list: bool,
    ) {
        let Some(md) = self.member(member) else {
            return;
        };
        if md.is_hidden() {
            return;
        }

        let placement = categorize(md, protection, self.options());
        let is_pure = md.virtualness == Specifier::Pure;
        let is_arrow = &*md.name == "operator->";
        let skip_all_list =
            self.options().hide_friend_compounds && md.is_friend_compound();
        let info = MemberInfo::direct(md, protection);
        let name = md.name.clone();
        let class_name = self.name(class).to_string();

        let Some(entity) = self.entity_mut(class) else {
            return;
        };

        match placement {
            Ok(placement) => {
                entity.member_lists.append(placement.declaration, member);
                if let Some(documentation) = placement.documentation {
                    entity.member_lists.append(documentation, member);
                }
                if !placement.keeps_simple {
                    if let Some(data) = entity.class_mut() {
                        data.is_simple = false;
                    }
                }
            }
            Err(err) => {
                warn!("Skipping '{name}' in '{class_name}': {err}");
            }
        }

        let Some(data) = entity.class_mut() else {
            return;
        };
        if is_pure {
            data.traits |= crate::model::ClassTraits::ABSTRACT;
        }
        if is_arrow {
            data.arrow_operator = Some(member);
        }
        if add_to_all_list && !skip_all_list {
            data.all_members.entry(name).or_default().push(info);
        }
    }

    /// Namespace-side insertion; inline namespaces also publish into their
    /// enclosing namespace.
    pub(crate) fn insert_namespace_member(&mut self, namespace: EntityId, member: MemberId) {
        let Some(md) = self.member(member) else {
            return;
        };
        if md.is_hidden() {
            return;
        }
        let kind = md.kind;
        let name = md.name.clone();

        let mut target = Some(namespace);
        let mut visited = Vec::new();

        while let Some(ns) = target.take() {
            if visited.contains(&ns) {
                break;
            }
            visited.push(ns);

            let Some(entity) = self.entity_mut(ns) else {
                break;
            };
            let ns_name = entity.name.clone();
            let outer = entity.outer_scope;
            let Some(data) = entity.namespace_mut() else {
                break;
            };
            let is_inline = data.is_inline;
            data.all_members.entry(name.clone()).or_default().push(member);

            match namespace_placement(kind) {
                Some(Some((declaration, documentation))) => {
                    entity.member_lists.append(declaration, member);
                    entity.member_lists.append(documentation, member);
                }
                Some(None) => {}
                None => {
                    error!("Member '{name}' of kind {kind:?} inserted in namespace scope '{ns_name}'");
                }
            }

            if is_inline {
                target = outer.filter(|o| self.entity(*o).is_some_and(CompoundEntity::is_namespace));
                if let Some(o) = target {
                    debug!("Inline namespace '{ns_name}' publishes '{name}' into '{}'", self.name(o));
                }
            }
        }
    }

    /// True once a pure virtual member has been filed.
    pub fn is_abstract(&self, class: EntityId) -> ModelResult<bool> {
        Ok(self.require_class(class)?.is_abstract())
    }

    /// The `operator->` member, for smart-pointer style classes.
    pub fn arrow_operator(&self, class: EntityId) -> Option<MemberId> {
        self.class(class).and_then(|c| c.arrow_operator)
    }

    /// Members filed in `list_type` of `entity`.
    pub fn member_list(&self, entity: EntityId, list_type: MemberListType) -> &[MemberId] {
        self.entity(entity)
            .map(|e| e.member_lists.get(list_type))
            .unwrap_or(&[])
    }
}
