//! The documentation model: an arena of entities and members addressed by id.
//!
//! Every phase of the pipeline threads one [`DocumentationModel`] through;
//! there is no global registry. Entities and members live until the model
//! is dropped, and all cross references (bases, derived classes, template
//! masters, owners) are stored as ids.

pub mod argument;
pub mod entity;
pub mod member;
pub mod member_list;

pub use argument::{Argument, ArgumentList, normalize_whitespace};
pub use entity::{
    ClassData, ClassTraits, CompoundEntity, EntityFlags, EntityVariant, NamespaceData,
    UsingTarget, is_anonymous_name, local_name_of, scope_of,
};
pub use member::{MemberFlags, MemberInfo, MemberRecord};
pub use member_list::{
    AllMembers, CLASS_DETAILED_LISTS, CLASS_LAYOUT, MemberList, MemberListType, MemberTable,
    NAMESPACE_DETAILED_LISTS, NAMESPACE_LAYOUT,
};

use crate::config::{ConfigFacade, ModelOptions};
use crate::error::{ModelError, ModelResult};
use crate::template::{TemplateMatcher, TextualTemplateMatcher};
use crate::types::{
    CompactString, CompoundType, EntityId, IdCounter, Location, MemberId, compact_string,
};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Owner of every entity and member of one documentation run.
pub struct DocumentationModel {
    entities: Vec<CompoundEntity>,
    members: Vec<MemberRecord>,
    entity_ids: IdCounter<EntityId>,
    member_ids: IdCounter<MemberId>,
    by_name: HashMap<CompactString, EntityId>,
    /// Global member-name dictionary
    member_names: BTreeMap<CompactString, Vec<MemberId>>,
    options: ModelOptions,
    matcher: Box<dyn TemplateMatcher>,
}

impl std::fmt::Debug for DocumentationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentationModel")
            .field("entities", &self.entities.len())
            .field("members", &self.members.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Default for DocumentationModel {
    fn default() -> Self {
        Self::new(ModelOptions::default())
    }
}

impl DocumentationModel {
    pub fn new(options: ModelOptions) -> Self {
        Self {
            entities: Vec::new(),
            members: Vec::new(),
            entity_ids: IdCounter::new(),
            member_ids: IdCounter::new(),
            by_name: HashMap::new(),
            member_names: BTreeMap::new(),
            options,
            matcher: Box::new(TextualTemplateMatcher),
        }
    }

    /// Snapshot every toggle from `config` and build an empty model.
    pub fn from_config(config: &dyn ConfigFacade) -> Self {
        Self::new(ModelOptions::from_facade(config))
    }

    /// Replace the template instantiation strategy.
    pub fn with_matcher(mut self, matcher: Box<dyn TemplateMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn matcher(&self) -> &dyn TemplateMatcher {
        self.matcher.as_ref()
    }

    /// Create-or-return the entity registered under `qualified_name`.
    ///
    /// A second registration of the same name returns the first entity
    /// unchanged, whatever `kind` and `location` it passes.
    pub fn register_entity(
        &mut self,
        qualified_name: &str,
        kind: CompoundType,
        location: Location,
    ) -> EntityId {
        if let Some(&id) = self.by_name.get(qualified_name) {
            debug!("'{qualified_name}' already registered, reusing {id:?}");
            return id;
        }

        let id = self.alloc_entity(qualified_name, kind, location);
        self.by_name.insert(compact_string(qualified_name), id);
        id
    }

    /// Add an entity to the arena without indexing it by name.
    pub(crate) fn alloc_entity(
        &mut self,
        qualified_name: &str,
        kind: CompoundType,
        location: Location,
    ) -> EntityId {
        let id = self.entity_ids.next_id();
        let mut entity = CompoundEntity::new(id, qualified_name, kind, location);

        if let Some(class) = entity.class_mut() {
            class.is_simple = self.options.inline_simple_struct;
            class.sub_grouping = self.options.allow_sub_grouping;
        }

        debug!("registered {kind:?} '{qualified_name}' as {id:?}");
        self.entities.push(entity);
        id
    }

    /// Exact qualified-name lookup.
    pub fn find_entity(&self, qualified_name: &str) -> Option<EntityId> {
        self.by_name.get(qualified_name).copied()
    }

    pub fn entity(&self, id: EntityId) -> Option<&CompoundEntity> {
        self.entities.get(id.index())
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut CompoundEntity> {
        self.entities.get_mut(id.index())
    }

    pub fn require_entity(&self, id: EntityId) -> ModelResult<&CompoundEntity> {
        self.entity(id).ok_or(ModelError::UnknownEntity { id })
    }

    pub fn class(&self, id: EntityId) -> Option<&ClassData> {
        self.entity(id).and_then(CompoundEntity::class)
    }

    pub(crate) fn class_mut(&mut self, id: EntityId) -> Option<&mut ClassData> {
        self.entity_mut(id).and_then(CompoundEntity::class_mut)
    }

    pub fn namespace(&self, id: EntityId) -> Option<&NamespaceData> {
        self.entity(id).and_then(CompoundEntity::namespace)
    }

    pub(crate) fn namespace_mut(&mut self, id: EntityId) -> Option<&mut NamespaceData> {
        self.entity_mut(id).and_then(CompoundEntity::namespace_mut)
    }

    /// Class data, or an error naming what the id actually is.
    pub fn require_class(&self, id: EntityId) -> ModelResult<&ClassData> {
        let entity = self.require_entity(id)?;
        entity.class().ok_or_else(|| ModelError::NotAClass {
            name: entity.name.to_string(),
        })
    }

    pub fn require_namespace(&self, id: EntityId) -> ModelResult<&NamespaceData> {
        let entity = self.require_entity(id)?;
        entity.namespace().ok_or_else(|| ModelError::NotANamespace {
            name: entity.name.to_string(),
        })
    }

    /// Qualified name, empty for unknown ids.
    pub fn name(&self, id: EntityId) -> &str {
        self.entity(id).map(|e| &*e.name).unwrap_or("")
    }

    pub fn entities(&self) -> impl Iterator<Item = &CompoundEntity> {
        self.entities.iter()
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(|e| e.id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Adopt a member record, assigning its id and owner.
    ///
    /// This only stores the record; filing it into category lists is done by
    /// [`DocumentationModel::insert_member`].
    pub fn add_member(&mut self, owner: Option<EntityId>, mut record: MemberRecord) -> MemberId {
        let id = self.member_ids.next_id();
        record.id = id;
        record.owner = owner;

        if let Some(owner) = owner.and_then(|o| self.entity(o)) {
            if record.language == crate::types::SrcLang::Unknown {
                record.language = owner.language;
            }
            if owner.is_class() {
                record.detect_lifecycle(owner.local_name());
            }
        }

        self.member_names
            .entry(record.name.clone())
            .or_default()
            .push(id);
        self.members.push(record);
        id
    }

    pub fn member(&self, id: MemberId) -> Option<&MemberRecord> {
        self.members.get(id.index())
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut MemberRecord> {
        self.members.get_mut(id.index())
    }

    pub fn require_member(&self, id: MemberId) -> ModelResult<&MemberRecord> {
        self.member(id).ok_or(ModelError::UnknownMember { id })
    }

    pub fn members(&self) -> impl Iterator<Item = &MemberRecord> {
        self.members.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Every member with this name, across all scopes.
    pub fn members_named(&self, name: &str) -> &[MemberId] {
        self.member_names
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Link `inner` into `outer`'s inner class or namespace list.
    pub fn set_outer_scope(&mut self, inner: EntityId, outer: EntityId) {
        if inner == outer {
            return;
        }
        let Some(inner_is_class) = self.entity(inner).map(CompoundEntity::is_class) else {
            return;
        };
        if self.entity(outer).is_none() {
            return;
        }

        if let Some(entity) = self.entity_mut(inner) {
            entity.outer_scope = Some(outer);
        }
        if let Some(outer) = self.entity_mut(outer) {
            let list = if inner_is_class {
                &mut outer.inner_classes
            } else {
                &mut outer.inner_namespaces
            };
            if !list.contains(&inner) {
                list.push(inner);
            }
        }
    }

    /// Scope separator for rendering names of this entity.
    pub fn separator(&self, id: EntityId) -> &'static str {
        self.entity(id)
            .map(|e| e.language.scope_separator(e.is_class()))
            .unwrap_or("::")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemberKind, SrcLang};

    #[test]
    fn test_register_returns_existing_entity() {
        let mut model = DocumentationModel::default();
        let a = model.register_entity("geo::Shape", CompoundType::Class, Location::new("shape.h", 3, 1));
        let b = model.register_entity("geo::Shape", CompoundType::Struct, Location::new("other.h", 9, 1));

        assert_eq!(a, b);
        assert_eq!(model.entity_count(), 1);
        let shape = model.entity(a).unwrap();
        assert_eq!(shape.compound_type, CompoundType::Class);
        assert_eq!(&*shape.location.file, "shape.h");
    }

    #[test]
    fn test_ids_are_stable_arena_slots() {
        let mut model = DocumentationModel::default();
        let ids: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|n| model.register_entity(n, CompoundType::Class, Location::default()))
            .collect();

        for (id, name) in ids.iter().zip(["A", "B", "C"]) {
            assert_eq!(model.name(*id), name);
            assert_eq!(model.find_entity(name), Some(*id));
        }
        assert_eq!(ids[0].value(), 1);
    }

    #[test]
    fn test_variant_errors() {
        let mut model = DocumentationModel::default();
        let ns = model.register_entity("util", CompoundType::Namespace, Location::default());

        assert!(model.require_namespace(ns).is_ok());
        assert_eq!(
            model.require_class(ns).unwrap_err(),
            ModelError::NotAClass {
                name: "util".to_string()
            }
        );
        assert!(matches!(
            model.require_entity(EntityId(99)),
            Err(ModelError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_add_member_registers_global_name() {
        let mut model = DocumentationModel::default();
        let cls = model.register_entity("Widget", CompoundType::Class, Location::new("widget.hpp", 1, 1));
        let ctor = model.add_member(Some(cls), MemberRecord::new("Widget", MemberKind::Function));
        let paint = model.add_member(Some(cls), MemberRecord::new("paint", MemberKind::Function));

        assert_eq!(model.members_named("paint"), &[paint]);
        let ctor = model.member(ctor).unwrap();
        assert!(ctor.is_constructor());
        assert_eq!(ctor.owner, Some(cls));
        assert_eq!(ctor.language, SrcLang::Cpp);
    }

    #[test]
    fn test_outer_scope_links_inner_lists() {
        let mut model = DocumentationModel::default();
        let ns = model.register_entity("app", CompoundType::Namespace, Location::default());
        let inner_ns = model.register_entity("app::detail", CompoundType::Namespace, Location::default());
        let cls = model.register_entity("app::Config", CompoundType::Class, Location::default());

        model.set_outer_scope(inner_ns, ns);
        model.set_outer_scope(cls, ns);
        model.set_outer_scope(cls, ns);

        let app = model.entity(ns).unwrap();
        assert_eq!(app.inner_namespaces, vec![inner_ns]);
        assert_eq!(app.inner_classes, vec![cls]);
        assert_eq!(model.entity(cls).unwrap().outer_scope, Some(ns));
    }
}
