//! Name lookup for base classes and using targets.
//!
//! Names written in a declaration are relative to where the declaration
//! appears. Candidates are tried from the innermost enclosing scope
//! outwards, then in the global scope, then in every namespace made visible
//! by a using-directive of one of the enclosing namespaces.

use crate::model::{CompoundEntity, DocumentationModel};
use crate::types::EntityId;

/// Resolves relative names against the scopes of one model.
pub struct ScopeResolver<'a> {
    model: &'a DocumentationModel,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(model: &'a DocumentationModel) -> Self {
        Self { model }
    }

    /// `scope` and its enclosing scopes, innermost first.
    pub fn scope_chain(&self, scope: Option<EntityId>) -> Vec<EntityId> {
        let mut chain = Vec::new();
        let mut current = scope;
        while let Some(id) = current {
            if chain.contains(&id) {
                break;
            }
            chain.push(id);
            current = self.model.entity(id).and_then(|e| e.outer_scope);
        }
        chain
    }

    /// Find the entity `name` refers to when written inside `scope`.
    ///
    /// Only entities accepted by `accept` are considered.
    pub fn resolve(
        &self,
        scope: Option<EntityId>,
        name: &str,
        accept: impl Fn(&CompoundEntity) -> bool,
    ) -> Option<EntityId> {
        let name = name.trim();
        let lookup = |qualified: &str| {
            self.model
                .find_entity(qualified)
                .filter(|&id| self.model.entity(id).is_some_and(&accept))
        };

        if let Some(global) = name.strip_prefix("::") {
            return lookup(global);
        }

        let chain = self.scope_chain(scope);
        for &s in &chain {
            if let Some(id) = lookup(&format!("{}::{name}", self.model.name(s))) {
                return Some(id);
            }
        }
        if let Some(id) = lookup(name) {
            return Some(id);
        }

        for &s in &chain {
            for used in self.model.used_namespaces(s) {
                if let Some(id) = lookup(&format!("{}::{name}", self.model.name(used))) {
                    return Some(id);
                }
            }
        }
        None
    }
}

/// Split `Base<int, T>` into `("Base", "<int, T>")`.
pub fn split_template_spec(name: &str) -> (&str, &str) {
    let name = name.trim();
    match name.find('<') {
        Some(pos) if name.ends_with('>') => (name[..pos].trim_end(), &name[pos..]),
        _ => (name, ""),
    }
}

/// Whether `spec` mentions any of the given identifiers.
pub fn mentions_any(spec: &str, names: &[&str]) -> bool {
    spec.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| !word.is_empty() && names.contains(&word))
}
