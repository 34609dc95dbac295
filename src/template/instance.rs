//! Template instance entities and their copied members.

use crate::error::ModelResult;
use crate::model::{
    Argument, ArgumentList, DocumentationModel, EntityFlags, MemberRecord, normalize_whitespace,
};
use crate::relations::BaseEdge;
use crate::types::{CompoundType, EntityId, Location, MemberId};
use tracing::{debug, error};

/// Bound on nested instantiation when inheritance depth is unbounded.
const INSTANTIATION_LIMIT: usize = 256;

impl DocumentationModel {
    /// Declare the formal template parameters of a class (`class T`, `int N = 3`).
    pub fn set_template_params<S: AsRef<str>>(&mut self, class: EntityId, params: &[S]) -> ModelResult<()> {
        self.require_class(class)?;
        let params: Vec<Argument> = params
            .iter()
            .map(|p| Argument::parse_template_param(p.as_ref()))
            .collect();
        if let Some(data) = self.class_mut(class) {
            data.template_params = params;
        }
        Ok(())
    }

    /// Instance of `generic` for the argument spec `spec`, created on first use.
    ///
    /// The boolean is true when this call created the instance. A new
    /// instance copies the generic's members with formals substituted and
    /// inherits its bases, turning `Base<T>` style bases into instances of
    /// the base template.
    ///
    /// Passing an instance as `generic` instantiates its master instead, so
    /// every instance points straight at a generic definition.
    pub fn get_or_create_instance(&mut self, generic: EntityId, spec: &str) -> ModelResult<(EntityId, bool)> {
        self.instance_at_depth(generic, spec, 0)
    }

    /// `entity` itself, or its master when it is an instance.
    fn generic_of(&self, entity: EntityId) -> ModelResult<EntityId> {
        let master = self.require_class(entity)?.template_master;
        if let Some(master) = master {
            debug!(
                "'{}' is an instance; instantiating '{}' instead",
                self.name(entity),
                self.name(master)
            );
        }
        Ok(master.unwrap_or(entity))
    }

    fn instance_at_depth(
        &mut self,
        generic: EntityId,
        spec: &str,
        depth: usize,
    ) -> ModelResult<(EntityId, bool)> {
        let generic = self.generic_of(generic)?;
        let key = self.matcher().instance_key(spec);
        if let Some(&id) = self.require_class(generic)?.template_instances.get(&key) {
            return Ok((id, false));
        }

        let master = self.require_entity(generic)?;
        let name = normalize_whitespace(&format!("{}{}", master.local_name(), key));
        let location = master.location.clone();
        let compound_type = master.compound_type;
        let language = master.language;
        let outer_scope = master.outer_scope;
        let hidden = master.is_hidden();
        let artificial = master.is_artificial();

        debug!("New template instance '{name}' of '{}'", master.name);
        let id = self.alloc_entity(&name, compound_type, location);
        if let Some(entity) = self.entity_mut(id) {
            entity.language = language;
            entity.outer_scope = outer_scope;
            entity.set_flag(EntityFlags::HIDDEN, hidden);
            entity.set_flag(EntityFlags::ARTIFICIAL, artificial);
        }
        if let Some(data) = self.class_mut(id) {
            data.template_master = Some(generic);
        }
        if let Some(data) = self.class_mut(generic) {
            data.template_instances.insert(key.clone(), id);
        }

        self.add_members_to_template_instance(id, generic, &key);
        self.instantiate_bases(id, generic, &key, depth)?;
        Ok((id, true))
    }

    /// Give `instance` the bases of `generic` with the actuals in `spec` substituted.
    fn instantiate_bases(
        &mut self,
        instance: EntityId,
        generic: EntityId,
        spec: &str,
        depth: usize,
    ) -> ModelResult<()> {
        let limit = match self.options().max_inheritance_depth {
            0 => INSTANTIATION_LIMIT,
            n => n,
        };
        if depth >= limit {
            error!(
                "Nested template instantiation too deep at '{}'; bases not instantiated",
                self.name(instance)
            );
            return Ok(());
        }

        let data = self.require_class(generic)?;
        let formals = data.template_params.clone();
        let bases = data.bases.clone();
        let actuals = ArgumentList::parse_template_spec(spec);

        for edge in bases {
            let base_spec = self.matcher().substitute(&edge.template_spec, &formals, &actuals);
            let is_template = self.class(edge.class).is_some_and(|c| c.is_template());

            let edge = if !base_spec.is_empty() && is_template {
                let (base, _) = self.instance_at_depth(edge.class, &base_spec, depth + 1)?;
                BaseEdge {
                    class: base,
                    template_spec: base_spec,
                    ..edge
                }
            } else {
                BaseEdge {
                    template_spec: base_spec,
                    ..edge
                }
            };
            self.insert_base_edge(instance, edge)?;
        }
        Ok(())
    }

    /// Copy the generic's declared members into `instance`.
    ///
    /// Each copy has its type, arguments and (for conversion operators) name
    /// rewritten, points back at its original through `template_master`, is
    /// categorised and lands in the global member-name dictionary.
    pub(crate) fn add_members_to_template_instance(
        &mut self,
        instance: EntityId,
        generic: EntityId,
        spec: &str,
    ) {
        let Some(data) = self.class(generic) else {
            return;
        };
        let formals = data.template_params.clone();
        let sources: Vec<MemberId> = data
            .all_members
            .values()
            .flatten()
            .filter(|mi| !mi.inherited)
            .map(|mi| mi.member)
            .collect();
        let actuals = ArgumentList::parse_template_spec(spec);

        for source in sources {
            let Some(copy) = self.instantiate_member(source, &formals, &actuals) else {
                continue;
            };
            let protection = copy.protection;
            let id = self.add_member(Some(instance), copy);
            self.internal_insert_member(instance, id, protection, true);
        }
    }

    fn instantiate_member(
        &self,
        source: MemberId,
        formals: &[Argument],
        actuals: &ArgumentList,
    ) -> Option<MemberRecord> {
        let md = self.member(source)?;
        let matcher = self.matcher();

        let mut copy = md.clone();
        copy.type_string = matcher.substitute(&md.type_string, formals, actuals);
        copy.args_string = matcher.substitute(&md.args_string, formals, actuals);
        for arg in &mut copy.arguments.arguments {
            arg.type_name = matcher.substitute(&arg.type_name, formals, actuals);
        }
        if md.name.starts_with("operator ") {
            copy.name = matcher.substitute(&md.name, formals, actuals).into();
        }
        copy.template_master = Some(source);
        copy.category = None;
        copy.category_relation = None;
        Some(copy)
    }

    /// Instance created for a variable of type `generic<spec>`.
    ///
    /// Kept in a separate cache from [`DocumentationModel::get_or_create_instance`];
    /// such instances are never listed among the generic's template instances.
    pub fn get_variable_instance(&mut self, generic: EntityId, spec: &str) -> ModelResult<EntityId> {
        let generic = self.generic_of(generic)?;
        let key = self.matcher().instance_key(spec);
        if let Some(&id) = self.require_class(generic)?.variable_instances.get(&key) {
            return Ok(id);
        }

        let name = normalize_whitespace(&format!("{}{}", self.name(generic), key));
        let language = self.require_entity(generic)?.language;
        let id = self.alloc_entity(&name, CompoundType::Class, Location::new("<code>", 1, 1));
        if let Some(entity) = self.entity_mut(id) {
            entity.language = language;
        }
        self.add_members_to_template_instance(id, generic, &key);
        if let Some(data) = self.class_mut(id) {
            data.template_master = Some(generic);
        }
        if let Some(data) = self.class_mut(generic) {
            data.variable_instances.insert(key, id);
        }
        Ok(id)
    }

    /// Instances of a generic class keyed by their argument spec.
    pub fn template_instances(&self, generic: EntityId) -> impl Iterator<Item = (&str, EntityId)> {
        self.class(generic)
            .into_iter()
            .flat_map(|c| c.template_instances.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Generic class an instance was created from.
    pub fn template_master(&self, entity: EntityId) -> Option<EntityId> {
        self.class(entity).and_then(|c| c.template_master)
    }
}
