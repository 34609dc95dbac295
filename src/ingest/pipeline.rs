//! Turns a [`RawDocument`] into a finished [`DocumentationModel`].
//!
//! Phases run in dependency order: entities exist before anything refers to
//! them, members are categorised before bases are linked, every base edge
//! exists before the merge, and using relations are closed last.

use super::records::{RawBase, RawDocument, RawEntity, RawMember};
use super::resolve::{ScopeResolver, mentions_any, split_template_spec};
use crate::config::{ConfigFacade, ModelOptions};
use crate::merge::MergeStats;
use crate::model::{
    ClassTraits, DocumentationModel, EntityFlags, MemberFlags, MemberRecord, UsingTarget,
    local_name_of, scope_of,
};
use crate::relations::BaseEdge;
use crate::types::{
    CompoundType, EntityId, Location, MemberKind, Protection, Specifier, SrcLang,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub entities: usize,
    pub artificial_scopes: usize,
    pub members: usize,
    pub skipped_members: usize,
    pub skipped_entities: usize,
    pub base_edges: usize,
    pub unresolved_bases: usize,
    pub template_instances: usize,
    pub categories_merged: usize,
    pub unresolved_usings: usize,
    pub merge: MergeStats,
}

/// A base whose template spec names concrete arguments, instantiated once
/// every plain edge is in place.
struct PendingInstance {
    child: EntityId,
    generic: EntityId,
    spec: String,
    edge: BaseEdge,
    from_template: bool,
}

/// Builds a model from declaration records.
pub struct Pipeline {
    model: DocumentationModel,
    summary: BuildSummary,
}

impl Pipeline {
    pub fn new(options: ModelOptions) -> Self {
        Self::with_model(DocumentationModel::new(options))
    }

    pub fn from_config(config: &dyn ConfigFacade) -> Self {
        Self::new(ModelOptions::from_facade(config))
    }

    /// Run on a caller-prepared model (for example one with a custom matcher).
    pub fn with_model(model: DocumentationModel) -> Self {
        Self {
            model,
            summary: BuildSummary::default(),
        }
    }

    /// Run every phase and hand back the finished model.
    pub fn run(mut self, doc: &RawDocument) -> (DocumentationModel, BuildSummary) {
        let declared = self.register_entities(doc);
        self.create_enclosing_scopes();
        self.link_outer_scopes();
        self.insert_members(&declared);
        self.resolve_bases(&declared);
        self.merge_categories(&declared);
        self.resolve_usings(&declared);

        self.summary.merge = self.model.merge_all();
        self.model.combine_all_using_relations();

        self.summary.entities = self.model.entity_count();
        self.summary.members = self.model.member_count();
        self.summary.template_instances = self
            .model
            .entities()
            .filter(|e| e.is_template_instance())
            .count();

        info!(
            "Built model: {} entities, {} members, {} base edges ({} unresolved)",
            self.summary.entities,
            self.summary.members,
            self.summary.base_edges,
            self.summary.unresolved_bases
        );
        (self.model, self.summary)
    }

    /// Phase 1: one entity per record; the first declaration of a name wins.
    fn register_entities<'d>(&mut self, doc: &'d RawDocument) -> Vec<(EntityId, &'d RawEntity)> {
        let mut declared = Vec::with_capacity(doc.entities.len());

        for raw in &doc.entities {
            let kind: CompoundType = match raw.kind.parse() {
                Ok(kind) => kind,
                Err(e) => {
                    warn!("Skipping entity '{}': {e}", raw.name);
                    self.summary.skipped_entities += 1;
                    continue;
                }
            };
            let protection = match parse_or_default(raw.protection.as_deref(), &raw.name) {
                Some(p) => p,
                None => {
                    self.summary.skipped_entities += 1;
                    continue;
                }
            };

            let location = Location::new(&raw.file, raw.line, raw.column);
            if self.model.find_entity(&raw.name).is_some() {
                debug!("Duplicate declaration of '{}' ignored", raw.name);
            }
            let id = self.model.register_entity(&raw.name, kind, location);

            if let Some(entity) = self.model.entity_mut(id) {
                if let Some(lang) = raw.language.as_deref() {
                    // Unknown names decode to SrcLang::Unknown rather than failing
                    entity.language = lang.parse().unwrap_or(SrcLang::Unknown);
                }
                entity.protection = protection;
                if raw.documented {
                    entity.set_flag(EntityFlags::DOCUMENTED, true);
                }
                if raw.hidden {
                    entity.set_flag(EntityFlags::HIDDEN, true);
                }
                if raw.is_static {
                    entity.set_flag(EntityFlags::STATIC, true);
                }
                if let Some(ns) = entity.namespace_mut() {
                    ns.is_inline |= raw.inline;
                }
            }

            let mut traits = ClassTraits::empty();
            for name in &raw.traits {
                match ClassTraits::from_trait_name(name) {
                    Some(t) => traits |= t,
                    None => warn!("Unknown trait '{name}' on '{}'", raw.name),
                }
            }
            if kind == CompoundType::Category && category_parts(&raw.name).is_some_and(|(_, c)| c.is_empty()) {
                traits |= ClassTraits::EXTENSION;
            }
            if let Some(class) = self.model.class_mut(id) {
                class.traits |= traits;
            }
            if !raw.template_params.is_empty() {
                if let Err(e) = self.model.set_template_params(id, &raw.template_params) {
                    warn!("Template parameters of '{}' ignored: {e}", raw.name);
                }
            }

            declared.push((id, raw));
        }
        declared
    }

    /// Phase 1b: enclosing scopes nobody declared become artificial namespaces.
    fn create_enclosing_scopes(&mut self) {
        let names: Vec<String> = self.model.entities().map(|e| e.name.to_string()).collect();

        for name in names {
            let mut scope = scope_of(&name);
            while let Some(s) = scope {
                if self.model.find_entity(s).is_some() {
                    break;
                }
                debug!("Creating artificial namespace '{s}' for '{name}'");
                let id = self.model.register_entity(s, CompoundType::Namespace, Location::default());
                if let Some(entity) = self.model.entity_mut(id) {
                    entity.set_flag(EntityFlags::ARTIFICIAL, true);
                }
                self.summary.artificial_scopes += 1;
                scope = scope_of(s);
            }
        }
    }

    /// Phase 2
    fn link_outer_scopes(&mut self) {
        let pairs: Vec<(EntityId, EntityId)> = self
            .model
            .entities()
            .filter(|e| !e.is_template_instance())
            .filter_map(|e| {
                let outer = self.model.find_entity(scope_of(&e.name)?)?;
                Some((e.id, outer))
            })
            .collect();

        for (inner, outer) in pairs {
            self.model.set_outer_scope(inner, outer);
        }
    }

    /// Phase 3: adopt and categorise every member.
    fn insert_members(&mut self, declared: &[(EntityId, &RawEntity)]) {
        for &(owner, raw) in declared {
            for member in &raw.members {
                let Some(record) = member_record(member, raw) else {
                    self.summary.skipped_members += 1;
                    continue;
                };
                let id = self.model.add_member(Some(owner), record);
                if let Err(e) = self.model.insert_member(owner, id) {
                    warn!("Member '{}' of '{}' not filed: {e}", member.name, raw.name);
                }
            }
        }
    }

    /// Phase 4: link base classes, instantiating concrete template bases.
    fn resolve_bases(&mut self, declared: &[(EntityId, &RawEntity)]) {
        let mut pending = Vec::new();

        for &(child, raw) in declared {
            if raw.bases.is_empty() || self.model.class(child).is_none() {
                continue;
            }
            let scope = self.model.entity(child).and_then(|e| e.outer_scope);
            let formals: Vec<String> = self
                .model
                .class(child)
                .map(|c| c.template_params.iter().map(|a| a.name.clone()).collect())
                .unwrap_or_default();
            let formals: Vec<&str> = formals.iter().map(String::as_str).collect();

            for base in &raw.bases {
                let Some((protection, virtualness)) = edge_attributes(base, raw) else {
                    continue;
                };
                let (base_name, spec) = split_template_spec(base.name());
                let parent = self.lookup_or_stub(scope, base_name, raw);

                let mut edge = BaseEdge::new(parent, protection, virtualness).with_template_spec(spec);
                if base_name != self.model.name(parent) {
                    edge = edge.with_used_name(base.name());
                }

                let generic = self.model.class(parent).is_some_and(|c| c.is_template());
                if !spec.is_empty() && generic && !mentions_any(spec, &formals) {
                    pending.push(PendingInstance {
                        child,
                        generic: parent,
                        spec: spec.to_string(),
                        edge,
                        from_template: !formals.is_empty(),
                    });
                    continue;
                }
                self.add_edge(child, edge);
            }
        }

        // Template classes first so their own edges exist before anything
        // instantiates them
        pending.sort_by_key(|p| !p.from_template);
        for p in pending {
            match self.model.get_or_create_instance(p.generic, &p.spec) {
                Ok((instance, _)) => {
                    let edge = BaseEdge {
                        class: instance,
                        ..p.edge
                    };
                    self.add_edge(p.child, edge);
                }
                Err(e) => warn!("Cannot instantiate '{}{}': {e}", self.model.name(p.generic), p.spec),
            }
        }
    }

    fn add_edge(&mut self, child: EntityId, edge: BaseEdge) {
        if edge.class == child {
            warn!("'{}' names itself as a base", self.model.name(child));
            return;
        }
        match self.model.insert_base_edge(child, edge) {
            Ok(()) => self.summary.base_edges += 1,
            Err(e) => warn!("Base of '{}' not linked: {e}", self.model.name(child)),
        }
    }

    /// Resolve a base name, creating a used-only placeholder class when it
    /// names nothing known.
    fn lookup_or_stub(&mut self, scope: Option<EntityId>, name: &str, raw: &RawEntity) -> EntityId {
        let found = ScopeResolver::new(&self.model).resolve(scope, name, |e| e.is_class());
        if let Some(id) = found {
            return id;
        }

        warn!("Base class '{name}' of '{}' not found; using a placeholder", raw.name);
        self.summary.unresolved_bases += 1;
        let name = name.trim_start_matches("::");
        let id = match self.model.find_entity(name) {
            // A namespace already owns this name; keep the placeholder out of the registry
            Some(_) => self.model.alloc_entity(name, CompoundType::Class, Location::default()),
            None => self.model.register_entity(name, CompoundType::Class, Location::default()),
        };
        if let Some(entity) = self.model.entity_mut(id) {
            entity.set_flag(EntityFlags::ARTIFICIAL, true);
            entity.set_flag(EntityFlags::USED_ONLY, true);
        }
        id
    }

    /// Phase 5: fold Objective-C categories into the classes they extend.
    fn merge_categories(&mut self, declared: &[(EntityId, &RawEntity)]) {
        for &(category, raw) in declared {
            let is_category = self
                .model
                .entity(category)
                .is_some_and(|e| e.compound_type == CompoundType::Category);
            if !is_category {
                continue;
            }
            let Some((class_name, _)) = category_parts(&raw.name) else {
                warn!("Category '{}' does not name its class", raw.name);
                continue;
            };

            let scope = self.model.entity(category).and_then(|e| e.outer_scope);
            let class_name = local_name_of(class_name);
            let Some(class) = ScopeResolver::new(&self.model)
                .resolve(scope, class_name, |e| e.is_class() && e.compound_type != CompoundType::Category)
            else {
                warn!("Class '{class_name}' extended by '{}' not found", raw.name);
                continue;
            };

            match self.model.merge_category(class, category) {
                Ok(()) => self.summary.categories_merged += 1,
                Err(e) => warn!("Category '{}' not merged: {e}", raw.name),
            }
        }
    }

    /// Phase 6: using-directives and using-declarations of namespaces.
    fn resolve_usings(&mut self, declared: &[(EntityId, &RawEntity)]) {
        for &(ns, raw) in declared {
            if self.model.namespace(ns).is_none() {
                continue;
            }
            let scope = self.model.entity(ns).and_then(|e| e.outer_scope);

            for target in &raw.using_namespaces {
                let found = ScopeResolver::new(&self.model)
                    .resolve(Some(ns), target, |e| e.is_namespace())
                    .or_else(|| {
                        ScopeResolver::new(&self.model).resolve(scope, target, |e| e.is_namespace())
                    });
                match found {
                    Some(used) => {
                        if let Err(e) = self.model.add_using_directive(ns, used) {
                            warn!("using namespace {target} in '{}': {e}", raw.name);
                        }
                    }
                    None => {
                        warn!("Namespace '{target}' used by '{}' not found", raw.name);
                        self.summary.unresolved_usings += 1;
                    }
                }
            }

            for qualified in &raw.using_declarations {
                match self.using_target(ns, qualified) {
                    Some((name, target)) => {
                        if let Err(e) = self.model.add_using_declaration(ns, &name, target) {
                            warn!("using {qualified} in '{}': {e}", raw.name);
                        }
                    }
                    None => {
                        warn!("'{qualified}' named by a using-declaration in '{}' not found", raw.name);
                        self.summary.unresolved_usings += 1;
                    }
                }
            }
        }
    }

    /// What `using qualified;` inside `ns` refers to, with its qualified name.
    fn using_target(&self, ns: EntityId, qualified: &str) -> Option<(String, UsingTarget)> {
        let resolver = ScopeResolver::new(&self.model);
        if let Some(id) = resolver.resolve(Some(ns), qualified, |_| true) {
            return Some((self.model.name(id).to_string(), UsingTarget::Entity(id)));
        }

        let owner_name = scope_of(qualified)?;
        let member_name = local_name_of(qualified);
        let owner = resolver.resolve(Some(ns), owner_name, |_| true)?;
        let member = self
            .model
            .members_named(member_name)
            .iter()
            .copied()
            .find(|&m| self.model.member(m).is_some_and(|md| md.owner == Some(owner)))?;
        Some((
            format!("{}::{member_name}", self.model.name(owner)),
            UsingTarget::Member(member),
        ))
    }
}

/// Decode an optional protection string, logging when it is not recognised.
fn parse_or_default(value: Option<&str>, context: &str) -> Option<Protection> {
    match value.map(str::parse::<Protection>) {
        None => Some(Protection::Public),
        Some(Ok(p)) => Some(p),
        Some(Err(e)) => {
            warn!("Skipping '{context}': {e}");
            None
        }
    }
}

fn edge_attributes(base: &RawBase, raw: &RawEntity) -> Option<(Protection, Specifier)> {
    let protection = parse_or_default(base.protection(), base.name())?;
    let virtualness = match base.virtualness().map(str::parse::<Specifier>) {
        None => Specifier::Normal,
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            warn!("Skipping base '{}' of '{}': {e}", base.name(), raw.name);
            return None;
        }
    };
    Some((protection, virtualness))
}

/// Build a member record, or log why the raw member is unusable.
fn member_record(raw: &RawMember, owner: &RawEntity) -> Option<MemberRecord> {
    let kind: MemberKind = match raw.kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            warn!("Skipping member '{}' of '{}': {e}", raw.name, owner.name);
            return None;
        }
    };
    let protection = parse_or_default(raw.protection.as_deref(), &raw.name)?;
    let virtualness = match raw.virtualness.as_deref().map(str::parse::<Specifier>) {
        None => Specifier::Normal,
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            warn!("Skipping member '{}' of '{}': {e}", raw.name, owner.name);
            return None;
        }
    };

    let mut flags = MemberFlags::empty();
    flags.set(MemberFlags::STATIC, raw.is_static);
    flags.set(MemberFlags::FRIEND, raw.friend);
    flags.set(MemberFlags::RELATED, raw.related);
    flags.set(MemberFlags::CONSTRUCTOR, raw.constructor);
    flags.set(MemberFlags::DESTRUCTOR, raw.destructor);
    flags.set(MemberFlags::DOCUMENTED, raw.documented);
    flags.set(MemberFlags::HIDDEN, raw.hidden);
    flags.set(
        MemberFlags::FUNCTION_POINTER,
        kind == MemberKind::Variable && raw.type_string.contains("(*"),
    );

    let file = raw.file.as_deref().unwrap_or(&owner.file);
    let line = if raw.line > 0 { raw.line } else { owner.line };
    let mut record = MemberRecord::new(&raw.name, kind)
        .with_location(Location::new(file, line, 1))
        .with_protection(protection)
        .with_virtualness(virtualness)
        .with_type(&raw.type_string)
        .with_args(&raw.args)
        .with_flags(flags);
    if let Some(lang) = owner.language.as_deref() {
        record.language = lang.parse().unwrap_or(SrcLang::Unknown);
    }
    Some(record)
}

/// `Foo(Bar)` is category `Bar` of class `Foo`; `Foo()` is an extension.
fn category_parts(name: &str) -> Option<(&str, &str)> {
    let (class, rest) = name.split_once('(')?;
    let category = rest.strip_suffix(')')?;
    Some((class.trim(), category.trim()))
}
