//! Propagation of base class members into derived classes.
//!
//! Every class ends up with an all-members table: for each member name, one
//! [`MemberInfo`] per distinct way the name is reachable. Bases are merged
//! before the classes deriving from them, and each class is merged at most
//! once, so repeated calls are no-ops.

use crate::error::ModelResult;
use crate::model::{
    AllMembers, ClassTraits, DocumentationModel, EntityFlags, MemberFlags, MemberInfo,
};
use crate::relations::BaseEdge;
use crate::types::{CompoundType, EntityId, MemberId, Protection, Specifier};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Summary of a [`DocumentationModel::merge_all`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub classes_merged: usize,
    pub inherited_entries: usize,
    pub ambiguous_entries: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    OnPath,
    Done,
}

/// Pending insertion of an inherited member into the derived class' own lists.
type Inline = (MemberId, Protection);

impl DocumentationModel {
    /// Merge every class, bases first.
    pub fn merge_all(&mut self) -> MergeStats {
        let classes: Vec<EntityId> = self
            .entities()
            .filter(|e| e.is_class())
            .map(|e| e.id)
            .collect();

        let mut stats = MergeStats::default();
        for id in classes {
            if self.class(id).is_some_and(|c| c.members_merged) {
                continue;
            }
            let order = self.merge_order(id);
            stats.classes_merged += order.len();
            for node in order {
                self.merge_one(node);
            }
        }

        for class in self.entities().filter_map(|e| e.class()) {
            for mi in class.all_members.values().flatten() {
                stats.inherited_entries += usize::from(mi.inherited);
                stats.ambiguous_entries += usize::from(mi.is_ambiguous());
            }
        }
        debug!("Merged {} classes", stats.classes_merged);
        stats
    }

    /// Build the all-members table of `class` and, first, of its bases.
    pub fn merge_members(&mut self, class: EntityId) -> ModelResult<()> {
        self.require_class(class)?;
        for node in self.merge_order(class) {
            self.merge_one(node);
        }
        Ok(())
    }

    /// Unmerged classes reachable upwards from `start`, bases before derived.
    fn merge_order(&self, start: EntityId) -> Vec<EntityId> {
        let unmerged = |id: EntityId| self.class(id).is_some_and(|c| !c.members_merged);
        if !unmerged(start) {
            return Vec::new();
        }

        let mut order = Vec::new();
        let mut visits: HashMap<EntityId, Visit> = HashMap::from([(start, Visit::OnPath)]);
        let mut stack: Vec<(EntityId, usize)> = vec![(start, 0)];

        while let Some((node, cursor)) = stack.last_mut() {
            let node = *node;
            let Some(edge) = self.base_classes(node).get(*cursor) else {
                visits.insert(node, Visit::Done);
                order.push(node);
                stack.pop();
                continue;
            };
            *cursor += 1;
            let base = edge.class;

            match visits.get(&base) {
                Some(Visit::OnPath) => {
                    warn!(
                        "Inheritance cycle: '{}' is its own base through '{}'",
                        self.name(base),
                        self.name(node)
                    );
                    continue;
                }
                Some(Visit::Done) => continue,
                None => {}
            }
            if !unmerged(base) {
                continue;
            }

            let limit = self.options().max_inheritance_depth;
            if limit > 0 && stack.len() > limit {
                error!(
                    "Maximum inheritance depth reached while merging members of '{}'",
                    self.name(start)
                );
                continue;
            }

            visits.insert(base, Visit::OnPath);
            stack.push((base, 0));
        }

        order
    }

    /// Merge the direct bases of `class` into it; bases are not recursed into.
    fn merge_one(&mut self, class: EntityId) {
        let Some(data) = self.class_mut(class) else {
            return;
        };
        if data.members_merged {
            return;
        }
        data.members_merged = true;
        let mut table = std::mem::take(&mut data.all_members);
        let bases = data.bases.clone();

        let sep = self.separator(class);
        let mut inlined = Vec::new();
        for edge in &bases {
            if edge.class == class {
                warn!("'{}' lists itself as a base class", self.name(class));
                continue;
            }
            self.merge_base_into(&mut table, edge, sep, &mut inlined);
        }

        if let Some(data) = self.class_mut(class) {
            data.all_members = table;
        }
        for (member, protection) in inlined {
            self.internal_insert_member(class, member, protection, false);
        }
    }

    fn merge_base_into(
        &self,
        table: &mut AllMembers,
        edge: &BaseEdge,
        sep: &str,
        inlined: &mut Vec<Inline>,
    ) {
        let Some(base) = self.class(edge.class) else {
            return;
        };
        let base_name = self.name(edge.class);
        let options = self.options();

        for (name, src_infos) in &base.all_members {
            if let Some(dst_infos) = table.get_mut(name) {
                for src in src_infos {
                    self.merge_existing(dst_infos, src, edge, base_name, sep, inlined);
                }
                continue;
            }

            let mut fresh = Vec::with_capacity(src_infos.len());
            for src in src_infos {
                let Some(md) = self.member(src.member) else {
                    continue;
                };
                if md.is_friend() {
                    continue;
                }
                let protection = src.protection.capped_by(edge.protection);
                if protection == Protection::Private && !options.extract_private {
                    continue;
                }
                if options.inline_inherited_member && !md.is_standard_func() {
                    inlined.push((src.member, protection));
                }
                fresh.push(MemberInfo {
                    member: src.member,
                    protection,
                    virtualness: effective_virtualness(src.virtualness, edge.virtualness),
                    inherited: true,
                    scope_path: format!("{base_name}{sep}{}", src.scope_path),
                    ambiguity_scope: src.ambiguity_scope.clone(),
                    ambig_class: src.ambig_class,
                });
            }
            if !fresh.is_empty() {
                table.insert(name.clone(), fresh);
            }
        }
    }

    /// Fold one incoming path into a name the derived class already has.
    fn merge_existing(
        &self,
        dst_infos: &mut Vec<MemberInfo>,
        src: &MemberInfo,
        edge: &BaseEdge,
        base_name: &str,
        sep: &str,
        inlined: &mut Vec<Inline>,
    ) {
        let Some(src_md) = self.member(src.member) else {
            return;
        };
        let src_owner = src_md.owner;

        let mut found = false;
        let mut ambiguous = false;
        let mut hidden = false;

        for dst in dst_infos.iter_mut() {
            if found {
                break;
            }
            let Some(dst_md) = self.member(dst.member) else {
                continue;
            };

            if src.member != dst.member {
                let related = src_owner == dst_md.owner
                    || matches!(
                        (dst_md.owner, src_owner),
                        (Some(d), Some(s)) if self.is_base_class(d, s, true)
                    );
                if related {
                    found = src_md.arguments.matches(&dst_md.arguments);
                    hidden |= !found;
                } else {
                    prepend_first_scope(dst, sep);
                    ambiguous = true;
                }
            } else {
                let owner_is_interface = dst_md
                    .owner
                    .and_then(|o| self.entity(o))
                    .is_some_and(|e| e.compound_type == CompoundType::Interface);
                let same_path = format!("{base_name}{sep}{}", src.scope_path) == dst.scope_path;

                if (!src.virtualness.is_normal() && !dst.virtualness.is_normal())
                    || same_path
                    || owner_is_interface
                {
                    found = true;
                } else {
                    prepend_first_scope(dst, sep);
                    ambiguous = true;
                }
            }
        }

        if found || src_md.protection == Protection::Private || src_md.is_friend() {
            return;
        }

        let protection = src_md.protection.capped_by(edge.protection);
        if self.options().inline_inherited_member && !src_md.is_standard_func() {
            inlined.push((src.member, protection));
        }

        let mut info = MemberInfo {
            member: src.member,
            protection,
            virtualness: effective_virtualness(src.virtualness, edge.virtualness),
            inherited: true,
            scope_path: format!("{base_name}{sep}{}", src.scope_path),
            ambiguity_scope: String::new(),
            ambig_class: None,
        };

        if ambiguous {
            let scope = format!("{base_name}{sep}");
            if !src.ambiguity_scope.starts_with(&scope) {
                info.ambiguity_scope = format!("{scope}{}", src.ambiguity_scope);
            }
            debug!("'{}' is ambiguous through '{}'", src_md.name, base_name);
        }
        if hidden {
            let class = src.ambig_class.unwrap_or(edge.class);
            info.ambig_class = Some(class);
            info.ambiguity_scope = format!("{}{sep}", self.name(class));
        }

        dst_infos.push(info);
    }

    /// Fold an Objective-C category (or class extension) into `class`.
    ///
    /// Local categories are ignored unless local methods are extracted.
    pub fn merge_category(&mut self, class: EntityId, category: EntityId) -> ModelResult<()> {
        self.require_class(class)?;
        let cat_data = self.require_class(category)?;
        let cat_entity = self.require_entity(category)?;

        let make_private = cat_entity.is_local();
        if make_private && !self.options().extract_local_methods {
            debug!("Skipping local category '{}'", cat_entity.name);
            return Ok(());
        }
        let is_extension = cat_data.traits.contains(ClassTraits::EXTENSION);
        let cat_bases = cat_data.bases.clone();
        let cat_members = cat_data.all_members.clone();

        if let Some(data) = self.class_mut(category) {
            data.category_of = Some(class);
        }

        if is_extension {
            if let Some(entity) = self.entity_mut(category) {
                entity.set_flag(EntityFlags::ARTIFICIAL, true);
            }
            for edge in cat_bases {
                let base = edge.class;
                if let Some(data) = self.class_mut(class) {
                    data.bases.push(edge);
                    data.is_simple = false;
                }
                self.retarget_derived(base, category, class);
            }
        }

        let mut table = match self.class_mut(class) {
            Some(data) => std::mem::take(&mut data.all_members),
            None => return Ok(()),
        };
        let mut inserted = Vec::new();

        for (name, src_infos) in cat_members {
            if let Some(dst_infos) = table.get(&name) {
                if let (Some(dst), Some(src)) = (dst_infos.first(), src_infos.first()) {
                    let (dst, src) = (dst.member, src.member);
                    if let Some(md) = self.member_mut(dst) {
                        md.category = Some(category);
                        md.category_relation = Some(src);
                    }
                    if let Some(md) = self.member_mut(src) {
                        md.category_relation = Some(dst);
                    }
                }
                continue;
            }

            let mut fresh = Vec::with_capacity(src_infos.len());
            for src in src_infos {
                let Some(mut copy) = self.member(src.member).cloned() else {
                    continue;
                };
                copy.category = Some(category);
                copy.category_relation = Some(src.member);
                if make_private || is_extension {
                    copy.flags |= MemberFlags::IMPLEMENTATION_DETAIL;
                }
                let id = self.add_member(Some(class), copy);
                if let Some(md) = self.member_mut(src.member) {
                    md.category_relation = Some(id);
                }
                inserted.push((id, src.protection));
                fresh.push(MemberInfo { member: id, ..src });
            }
            table.insert(name, fresh);
        }

        if let Some(data) = self.class_mut(class) {
            data.all_members = table;
        }
        for (member, protection) in inserted {
            self.internal_insert_member(class, member, protection, false);
        }
        Ok(())
    }

    /// Class an Objective-C category extends.
    pub fn category_of(&self, category: EntityId) -> Option<EntityId> {
        self.class(category).and_then(|c| c.category_of)
    }
}

fn effective_virtualness(member: Specifier, edge: Specifier) -> Specifier {
    if member.is_normal() && !edge.is_normal() {
        edge
    } else {
        member
    }
}

/// Prefix `info`'s ambiguity scope with the first class on its path.
fn prepend_first_scope(info: &mut MemberInfo, sep: &str) {
    let scope = match info.scope_path.find(sep) {
        Some(pos) => &info.scope_path[..pos + sep.len()],
        None => "",
    };
    if !info.ambiguity_scope.starts_with(scope) {
        info.ambiguity_scope.insert_str(0, scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelOptions;
    use crate::model::{MemberListType, MemberRecord};
    use crate::types::{Location, MemberKind};

    fn class(model: &mut DocumentationModel, name: &str) -> EntityId {
        model.register_entity(name, CompoundType::Class, Location::new("shapes.h", 1, 1))
    }

    fn method(model: &mut DocumentationModel, owner: EntityId, name: &str, args: &str) -> MemberId {
        let id = model.add_member(
            Some(owner),
            MemberRecord::new(name, MemberKind::Function).with_args(args),
        );
        model.insert_member(owner, id).unwrap();
        id
    }

    fn derive(model: &mut DocumentationModel, child: EntityId, parent: EntityId, prot: Protection, virt: Specifier) {
        model.insert_base(child, parent, prot, virt, "").unwrap();
    }

    fn diamond(virt: Specifier) -> (DocumentationModel, EntityId, MemberId) {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        let c = class(&mut model, "C");
        let d = class(&mut model, "D");
        let m = method(&mut model, a, "m", "()");
        derive(&mut model, b, a, Protection::Public, virt);
        derive(&mut model, c, a, Protection::Public, virt);
        derive(&mut model, d, b, Protection::Public, Specifier::Normal);
        derive(&mut model, d, c, Protection::Public, Specifier::Normal);
        model.merge_members(d).unwrap();
        (model, d, m)
    }

    #[test]
    fn test_virtual_diamond_has_single_entry() {
        let (model, d, m) = diamond(Specifier::Virtual);
        let infos = &model.class(d).unwrap().all_members["m"];
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].member, m);
        assert!(!infos[0].is_ambiguous());
        assert_eq!(infos[0].virtualness, Specifier::Virtual);
    }

    #[test]
    fn test_non_virtual_diamond_is_ambiguous() {
        let (model, d, _) = diamond(Specifier::Normal);
        let infos = &model.class(d).unwrap().all_members["m"];
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].scope_path, "B::A::");
        assert_eq!(infos[0].ambiguity_scope, "B::");
        assert_eq!(infos[1].scope_path, "C::A::");
        assert_eq!(infos[1].ambiguity_scope, "C::");
    }

    #[test]
    fn test_protection_capping() {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        let c = class(&mut model, "C");
        let x = model.add_member(Some(a), MemberRecord::new("x", MemberKind::Variable));
        model.insert_member(a, x).unwrap();
        derive(&mut model, b, a, Protection::Protected, Specifier::Normal);
        derive(&mut model, c, a, Protection::Private, Specifier::Normal);
        model.merge_all();

        let b_x = &model.class(b).unwrap().all_members["x"][0];
        assert_eq!(b_x.protection, Protection::Protected);
        assert!(b_x.inherited);
        // Privately inherited members are dropped unless private members are extracted
        assert!(!model.class(c).unwrap().all_members.contains_key("x"));
    }

    #[test]
    fn test_override_replaces_and_overload_hides() {
        let mut model = DocumentationModel::default();
        let base = class(&mut model, "Base");
        let derived = class(&mut model, "Derived");
        method(&mut model, base, "draw", "(int)");
        method(&mut model, base, "size", "()");
        let own_draw = method(&mut model, derived, "draw", "(double)");
        let own_size = method(&mut model, derived, "size", "()");
        derive(&mut model, derived, base, Protection::Public, Specifier::Normal);
        model.merge_members(derived).unwrap();

        let table = &model.class(derived).unwrap().all_members;
        assert_eq!(table["size"].len(), 1);
        assert_eq!(table["size"][0].member, own_size);

        let draw = &table["draw"];
        assert_eq!(draw.len(), 2);
        assert_eq!(draw[0].member, own_draw);
        assert_eq!(draw[1].ambig_class, Some(base));
        assert_eq!(draw[1].ambiguity_scope, "Base::");
    }

    #[test]
    fn test_friends_are_not_inherited() {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        let f = model.add_member(
            Some(a),
            MemberRecord::new("operator<<", MemberKind::Function).with_flags(MemberFlags::FRIEND),
        );
        model.insert_member(a, f).unwrap();
        derive(&mut model, b, a, Protection::Public, Specifier::Normal);
        model.merge_all();
        assert!(model.class(b).unwrap().all_members.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let (mut model, d, _) = diamond(Specifier::Normal);
        let before = model.class(d).unwrap().all_members.clone();
        model.merge_members(d).unwrap();
        model.merge_all();
        assert_eq!(model.class(d).unwrap().all_members, before);
    }

    #[test]
    fn test_inline_inherited_members_skip_standard_functions() {
        let mut model = DocumentationModel::new(ModelOptions {
            inline_inherited_member: true,
            ..ModelOptions::default()
        });
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        let ctor = method(&mut model, a, "A", "()");
        let run = method(&mut model, a, "run", "()");
        derive(&mut model, b, a, Protection::Protected, Specifier::Normal);
        model.merge_all();

        assert_eq!(model.member_list(b, MemberListType::ProMethods), &[run]);
        assert!(!model.member_list(b, MemberListType::ProMethods).contains(&ctor));
    }

    #[test]
    fn test_cyclic_bases_terminate() {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        method(&mut model, a, "fa", "()");
        method(&mut model, b, "fb", "()");
        derive(&mut model, a, b, Protection::Public, Specifier::Normal);
        derive(&mut model, b, a, Protection::Public, Specifier::Normal);

        model.merge_members(a).unwrap();
        assert!(model.class(a).unwrap().all_members.contains_key("fb"));
        assert!(model.class(b).unwrap().all_members.contains_key("fa"));
    }

    #[test]
    fn test_category_merge_copies_new_members() {
        let mut model = DocumentationModel::default();
        let cls = model.register_entity("NSString", CompoundType::Class, Location::new("NSString.h", 1, 1));
        let cat = model.register_entity("NSString(Utils)", CompoundType::Category, Location::new("Utils.h", 1, 1));
        let length = method(&mut model, cls, "length", "()");
        let cat_length = method(&mut model, cat, "length", "()");
        let trim = method(&mut model, cat, "trim", "()");

        model.merge_category(cls, cat).unwrap();

        assert_eq!(model.category_of(cat), Some(cls));
        assert_eq!(model.member(length).unwrap().category_relation, Some(cat_length));
        let copy = model.class(cls).unwrap().all_members["trim"][0].member;
        assert_ne!(copy, trim);
        assert_eq!(model.member(copy).unwrap().owner, Some(cls));
        assert_eq!(model.member(trim).unwrap().category_relation, Some(copy));
        assert_eq!(model.members_named("trim").len(), 2);
        assert!(model.member_list(cls, MemberListType::PubMethods).contains(&copy));
    }

    #[test]
    fn test_local_category_skipped_without_local_methods() {
        let mut model = DocumentationModel::default();
        let cls = model.register_entity("View", CompoundType::Class, Location::new("View.h", 1, 1));
        let cat = model.register_entity("View(Private)", CompoundType::Category, Location::new("View.m", 1, 1));
        method(&mut model, cat, "layout", "()");

        model.merge_category(cls, cat).unwrap();
        assert_eq!(model.category_of(cat), None);
        assert!(model.class(cls).unwrap().all_members.is_empty());
    }
}
