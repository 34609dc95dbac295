//! `using namespace` / `using X::y` relations and their transitive closure.

use crate::error::ModelResult;
use crate::model::{DocumentationModel, UsingTarget};
use crate::types::{CompactString, EntityId, compact_string};
use tracing::{debug, warn};

impl DocumentationModel {
    /// Record `using namespace target` inside `namespace`.
    ///
    /// Keyed by the target's qualified name; a repeated key or a namespace
    /// using itself is ignored.
    pub fn add_using_directive(&mut self, namespace: EntityId, target: EntityId) -> ModelResult<()> {
        self.require_namespace(namespace)?;
        self.require_namespace(target)?;
        if namespace == target {
            return Ok(());
        }
        let key = compact_string(self.name(target));
        if let Some(data) = self.namespace_mut(namespace) {
            data.using_directives.entry(key).or_insert(target);
        }
        Ok(())
    }

    /// Record `using qualified_name` inside `namespace`.
    pub fn add_using_declaration(
        &mut self,
        namespace: EntityId,
        qualified_name: &str,
        target: UsingTarget,
    ) -> ModelResult<()> {
        self.require_namespace(namespace)?;
        if let Some(data) = self.namespace_mut(namespace) {
            data.using_declarations
                .entry(compact_string(qualified_name))
                .or_insert(target);
        }
        Ok(())
    }

    /// Fold everything reachable through using-directives into `namespace`.
    ///
    /// Used namespaces are resolved first; each namespace is resolved at
    /// most once, which also ends mutual `using namespace` cycles.
    pub fn combine_using_relations(&mut self, namespace: EntityId) -> ModelResult<()> {
        if self.require_namespace(namespace)?.visited {
            return Ok(());
        }

        let mut order = Vec::new();
        self.mark_visited(namespace);
        let mut stack = vec![(namespace, self.direct_directives(namespace), 0usize)];

        while let Some((node, next, cursor)) = stack.last_mut() {
            let node = *node;
            let Some(&child) = next.get(*cursor) else {
                order.push(node);
                stack.pop();
                continue;
            };
            *cursor += 1;

            if self.namespace(child).is_some_and(|ns| !ns.visited) {
                self.mark_visited(child);
                let next = self.direct_directives(child);
                stack.push((child, next, 0));
            }
        }

        for node in order {
            self.absorb_used(node);
        }
        Ok(())
    }

    /// Resolve the using closure of every namespace.
    pub fn combine_all_using_relations(&mut self) {
        let namespaces: Vec<EntityId> = self
            .entities()
            .filter(|e| e.is_namespace())
            .map(|e| e.id)
            .collect();
        for ns in namespaces {
            if let Err(e) = self.combine_using_relations(ns) {
                warn!("Using relations of '{}' not combined: {e}", self.name(ns));
            }
        }
    }

    fn mark_visited(&mut self, namespace: EntityId) {
        if let Some(data) = self.namespace_mut(namespace) {
            data.visited = true;
        }
    }

    fn direct_directives(&self, namespace: EntityId) -> Vec<EntityId> {
        self.namespace(namespace)
            .map(|ns| ns.using_directives.values().copied().collect())
            .unwrap_or_default()
    }

    /// Union the resolved relations of each directly used namespace into `namespace`.
    fn absorb_used(&mut self, namespace: EntityId) {
        let mut directives: Vec<(CompactString, EntityId)> = Vec::new();
        let mut declarations: Vec<(CompactString, UsingTarget)> = Vec::new();

        for used in self.direct_directives(namespace) {
            let Some(data) = self.namespace(used) else {
                continue;
            };
            directives.extend(
                data.using_directives
                    .iter()
                    .filter(|(_, id)| **id != namespace)
                    .map(|(k, v)| (k.clone(), *v)),
            );
            declarations.extend(data.using_declarations.iter().map(|(k, v)| (k.clone(), *v)));
        }

        let name = self.name(namespace).to_string();
        let Some(data) = self.namespace_mut(namespace) else {
            return;
        };
        for (key, id) in directives {
            data.using_directives.entry(key).or_insert(id);
        }
        for (key, target) in declarations {
            data.using_declarations.entry(key).or_insert(target);
        }
        debug!(
            "'{name}' uses {} namespaces and {} declarations after closure",
            data.using_directives.len(),
            data.using_declarations.len()
        );
    }

    /// Namespaces used by `namespace`, resolved or not depending on whether
    /// the closure has been computed.
    pub fn used_namespaces(&self, namespace: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.namespace(namespace)
            .into_iter()
            .flat_map(|ns| ns.using_directives.values().copied())
    }

    /// `using X::y` targets visible in `namespace`, by qualified name.
    pub fn used_declarations(&self, namespace: EntityId) -> impl Iterator<Item = (&str, UsingTarget)> {
        self.namespace(namespace)
            .into_iter()
            .flat_map(|ns| ns.using_declarations.iter().map(|(k, v)| (&**k, *v)))
    }
}
