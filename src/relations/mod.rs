//! Inheritance edges between classes.
//!
//! One logical relation is stored twice: as a base edge on the derived class
//! (declaration order) and as a derived edge on the base class (sorted by
//! name for deterministic hierarchies).

mod traversal;

pub use traversal::Direction;

use crate::error::{ModelError, ModelResult};
use crate::model::DocumentationModel;
use crate::types::{EntityId, Protection, Specifier};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// One end of an inheritance relation.
///
/// On a base list `class` is the base; on a derived list it is the derived class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseEdge {
    pub class: EntityId,
    /// Name as written at the use site, when it differs from the class name
    pub used_name: Option<String>,
    pub protection: Protection,
    pub virtualness: Specifier,
    /// Template arguments written at the use site, e.g. `<int>`
    pub template_spec: String,
}

impl BaseEdge {
    pub fn new(class: EntityId, protection: Protection, virtualness: Specifier) -> Self {
        Self {
            class,
            used_name: None,
            protection,
            virtualness,
            template_spec: String::new(),
        }
    }

    pub fn with_template_spec(mut self, spec: &str) -> Self {
        self.template_spec = spec.to_string();
        self
    }

    pub fn with_used_name(mut self, name: &str) -> Self {
        self.used_name = Some(name.to_string());
        self
    }
}

impl DocumentationModel {
    /// Record that `child` derives from `parent`.
    ///
    /// Appends to the child's base list and files the child in the parent's
    /// sorted derived list, unless the child is private and private entities
    /// are not extracted.
    pub fn insert_base(
        &mut self,
        child: EntityId,
        parent: EntityId,
        protection: Protection,
        virtualness: Specifier,
        template_spec: &str,
    ) -> ModelResult<()> {
        self.insert_base_edge(
            child,
            BaseEdge::new(parent, protection, virtualness).with_template_spec(template_spec),
        )
    }

    /// Like [`DocumentationModel::insert_base`] with a fully built edge.
    pub fn insert_base_edge(&mut self, child: EntityId, edge: BaseEdge) -> ModelResult<()> {
        self.require_class(child)?;
        self.require_class(edge.class)?;

        let parent = edge.class;
        if parent == child {
            warn!("'{}' cannot derive from itself; base ignored", self.name(child));
            return Ok(());
        }
        let derived = BaseEdge {
            class: child,
            used_name: None,
            ..edge.clone()
        };

        debug!(
            "'{}' derives from '{}' ({:?}, {:?})",
            self.name(child),
            self.name(parent),
            edge.protection,
            edge.virtualness
        );

        if let Some(class) = self.class_mut(child) {
            class.bases.push(edge);
            class.is_simple = false;
        }
        self.insert_sub_class(parent, derived)
    }

    /// File `edge.class` in `parent`'s derived list, keeping it sorted.
    pub(crate) fn insert_sub_class(&mut self, parent: EntityId, edge: BaseEdge) -> ModelResult<()> {
        let child_private = self
            .require_entity(edge.class)?
            .protection
            == Protection::Private;
        if child_private && !self.options().extract_private {
            return Ok(());
        }

        let key = sort_key(self.name(edge.class));
        let names: Vec<(String, EntityId)> = self
            .require_class(parent)?
            .derived
            .iter()
            .map(|e| (sort_key(self.name(e.class)), e.class))
            .collect();
        let pos = names
            .iter()
            .position(|(name, id)| compare_keys((name, *id), (&key, edge.class)) == Ordering::Greater)
            .unwrap_or(names.len());

        let class = self
            .class_mut(parent)
            .ok_or_else(|| ModelError::UnknownEntity { id: parent })?;
        class.derived.insert(pos, edge);
        class.is_simple = false;
        Ok(())
    }

    /// Base edges of a class in declaration order; empty for namespaces.
    pub fn base_classes(&self, entity: EntityId) -> &[BaseEdge] {
        self.class(entity).map(|c| c.bases.as_slice()).unwrap_or(&[])
    }

    /// Derived edges of a class sorted by name; empty for namespaces.
    pub fn sub_classes(&self, entity: EntityId) -> &[BaseEdge] {
        self.class(entity).map(|c| c.derived.as_slice()).unwrap_or(&[])
    }

    /// Point derived edges on `base` that name `from` at `to` instead.
    pub(crate) fn retarget_derived(&mut self, base: EntityId, from: EntityId, to: EntityId) {
        if let Some(class) = self.class_mut(base) {
            for edge in class.derived.iter_mut().filter(|e| e.class == from) {
                edge.class = to;
            }
        }
    }
}

fn sort_key(name: &str) -> String {
    name.to_lowercase()
}

fn compare_keys(a: (&String, EntityId), b: (&String, EntityId)) -> Ordering {
    a.0.cmp(b.0).then(a.1.cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelOptions;
    use crate::types::{CompoundType, Location};

    fn class(model: &mut DocumentationModel, name: &str) -> EntityId {
        model.register_entity(name, CompoundType::Class, Location::default())
    }

    #[test]
    fn test_base_order_and_sorted_derived() {
        let mut model = DocumentationModel::default();
        let base = class(&mut model, "Base");
        let zeta = class(&mut model, "Zeta");
        let alpha = class(&mut model, "alpha");
        let mid = class(&mut model, "Mid");
        let other = class(&mut model, "Other");

        model.insert_base(zeta, base, Protection::Public, Specifier::Normal, "").unwrap();
        model.insert_base(alpha, base, Protection::Public, Specifier::Normal, "").unwrap();
        model.insert_base(mid, base, Protection::Protected, Specifier::Virtual, "").unwrap();
        model.insert_base(mid, other, Protection::Public, Specifier::Normal, "").unwrap();

        let derived: Vec<_> = model.sub_classes(base).iter().map(|e| e.class).collect();
        assert_eq!(derived, vec![alpha, mid, zeta]);

        let bases: Vec<_> = model.base_classes(mid).iter().map(|e| e.class).collect();
        assert_eq!(bases, vec![base, other]);
        assert_eq!(model.base_classes(mid)[0].protection, Protection::Protected);
        assert_eq!(model.sub_classes(base)[1].virtualness, Specifier::Virtual);
    }

    #[test]
    fn test_private_derived_filtered_unless_extracted() {
        let mut model = DocumentationModel::default();
        let base = class(&mut model, "Base");
        let hidden = class(&mut model, "Hidden");
        model.entity_mut(hidden).unwrap().protection = Protection::Private;

        model.insert_base(hidden, base, Protection::Public, Specifier::Normal, "").unwrap();
        assert!(model.sub_classes(base).is_empty());
        assert_eq!(model.base_classes(hidden).len(), 1);

        let mut model = DocumentationModel::new(ModelOptions {
            extract_private: true,
            ..ModelOptions::default()
        });
        let base = class(&mut model, "Base");
        let hidden = class(&mut model, "Hidden");
        model.entity_mut(hidden).unwrap().protection = Protection::Private;
        model.insert_base(hidden, base, Protection::Public, Specifier::Normal, "").unwrap();
        assert_eq!(model.sub_classes(base).len(), 1);
    }

    #[test]
    fn test_insert_base_rejects_namespaces() {
        let mut model = DocumentationModel::default();
        let ns = model.register_entity("ns", CompoundType::Namespace, Location::default());
        let cls = class(&mut model, "C");
        assert!(matches!(
            model.insert_base(cls, ns, Protection::Public, Specifier::Normal, ""),
            Err(ModelError::NotAClass { .. })
        ));
    }

    #[test]
    fn test_self_base_is_ignored() {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        model.insert_base(a, a, Protection::Public, Specifier::Normal, "").unwrap();
        assert!(model.base_classes(a).is_empty());
        assert!(model.sub_classes(a).is_empty());
    }

    #[test]
    fn test_edges_clear_simple_flag() {
        let mut model = DocumentationModel::new(ModelOptions {
            inline_simple_struct: true,
            ..ModelOptions::default()
        });
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        assert!(model.class(a).unwrap().is_simple);

        model.insert_base(b, a, Protection::Public, Specifier::Normal, "").unwrap();
        assert!(!model.class(a).unwrap().is_simple);
        assert!(!model.class(b).unwrap().is_simple);
    }
}
