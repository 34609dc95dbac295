//! Read-only queries over a finished model.
//!
//! These are what renderers and the tag file writer use: lookup by name with
//! inheritance distance, linkability and visibility rules, display names and
//! output file names.

use crate::categorize::protection_level_visible;
use crate::model::{AllMembers, CompoundEntity, DocumentationModel, MemberInfo, is_anonymous_name};
use crate::types::{CompoundType, EntityId, MemberId, Protection, SrcLang};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use tracing::error;

/// Members inherited from one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritedGroup {
    pub from: EntityId,
    pub members: Vec<MemberId>,
}

impl DocumentationModel {
    /// The merged table of every member name reachable in `entity`.
    pub fn all_members(&self, entity: EntityId) -> Option<&AllMembers> {
        self.class(entity).map(|c| &c.all_members)
    }

    /// Whether members at `protection` are documented under the current options.
    pub fn protection_level_visible(&self, protection: Protection) -> bool {
        protection_level_visible(protection, self.options())
    }

    /// The member called `name` declared closest to `entity`.
    ///
    /// Only members whose owner is linkable qualify; on equal distance the
    /// first one in the table wins.
    pub fn get_member_by_name(&self, entity: EntityId, name: &str) -> Option<MemberId> {
        let infos = self.all_members(entity)?.get(name)?;
        let mut best: Option<(usize, MemberId)> = None;

        for mi in infos {
            let Some(owner) = self.member(mi.member).and_then(|md| md.owner) else {
                continue;
            };
            let Some(distance) = self.min_class_distance(entity, owner) else {
                continue;
            };
            if best.is_none_or(|(d, _)| distance < d) && self.is_linkable(owner) {
                best = Some((distance, mi.member));
            }
        }

        best.map(|(_, member)| member)
    }

    /// True iff the member's owner is a (transitive) base class of `entity`.
    pub fn is_accessible_member(&self, entity: EntityId, member: MemberId) -> bool {
        self.member(member)
            .and_then(|md| md.owner)
            .is_some_and(|owner| self.is_base_class(entity, owner, true))
    }

    /// Entity that answers for `entity` in linkability checks.
    fn linkability_subject(&self, entity: EntityId) -> Option<&CompoundEntity> {
        let e = self.entity(entity)?;
        match e.template_master() {
            Some(master) => self.entity(master),
            None => Some(e),
        }
    }

    /// A page for this entity is generated by this run.
    pub fn is_linkable_in_project(&self, entity: EntityId) -> bool {
        let Some(e) = self.linkability_subject(entity) else {
            return false;
        };
        let opts = self.options();

        !e.name.is_empty()
            && !e.is_artificial()
            && !e.is_hidden()
            && !e.is_anonymous()
            && self.protection_level_visible(e.protection)
            && (!e.is_local() || opts.extract_local_classes)
            && (e.has_documentation() || !opts.hide_undoc_classes)
            && (!e.is_static() || opts.extract_static)
            && !e.is_reference()
    }

    /// Some page for this entity exists, here or in an imported tag file.
    pub fn is_linkable(&self, entity: EntityId) -> bool {
        match self.entity(entity).and_then(CompoundEntity::template_master) {
            Some(master) => self.is_linkable(master),
            None => {
                self.entity(entity).is_some_and(CompoundEntity::is_reference)
                    || self.is_linkable_in_project(entity)
            }
        }
    }

    /// Whether the class shows up in hierarchies and diagrams.
    pub fn is_visible_in_hierarchy(&self, entity: EntityId) -> bool {
        let Some(e) = self.entity(entity) else {
            return false;
        };
        let opts = self.options();

        let reachable = (opts.all_externals && !e.is_artificial())
            || self.has_non_reference_super_class(entity);
        if !reachable || e.is_anonymous() || !self.protection_level_visible(e.protection) {
            return false;
        }

        let master_documented = e
            .template_master()
            .and_then(|m| self.entity(m))
            .is_some_and(CompoundEntity::has_documentation);
        let documented = e.has_documentation()
            || !opts.hide_undoc_classes
            || master_documented
            || e.is_reference();

        documented && (!e.is_static() || opts.extract_static)
    }

    /// True if this class, a class derived from it, or a template instance of
    /// one of those is a non-reference class documented by this run.
    pub fn has_non_reference_super_class(&self, entity: EntityId) -> bool {
        let limit = self.options().max_inheritance_depth;
        let qualifies = |id: EntityId| {
            self.entity(id).is_some_and(|e| !e.is_reference() && !e.is_hidden())
                && self.is_linkable_in_project(id)
        };

        let mut seen = HashSet::from([entity]);
        let mut stack = vec![(entity, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            if qualifies(node) {
                return true;
            }
            for edge in self.sub_classes(node) {
                if limit > 0 && depth + 1 > limit {
                    error!(
                        "Possible recursive class relation while inside '{}' and looking for '{}'",
                        self.name(node),
                        self.name(edge.class)
                    );
                    return false;
                }
                let instances = self.template_instances(edge.class).map(|(_, id)| id);
                for next in std::iter::once(edge.class).chain(instances) {
                    if seen.insert(next) {
                        stack.push((next, depth + 1));
                    }
                }
            }
        }
        false
    }

    /// A member gets its own documentation anchor in this run.
    pub fn is_member_linkable(&self, member: MemberId) -> bool {
        let Some(md) = self.member(member) else {
            return false;
        };
        let owner_linkable = md.owner.is_some_and(|o| self.is_linkable(o));

        owner_linkable
            && !md.is_hidden()
            && self.protection_level_visible(md.protection)
            && (md.is_documented() || !self.options().hide_undoc_members)
    }

    /// Name as shown to readers.
    ///
    /// With `include_scope` the qualified name plus template parameters,
    /// otherwise the local name. Anonymous scopes are dropped and `::` is
    /// written with the language's own separator.
    pub fn display_name(&self, entity: EntityId, include_scope: bool) -> String {
        let Some(e) = self.entity(entity) else {
            return String::new();
        };

        let mut name = if include_scope {
            let mut qualified = e.name.to_string();
            if let Some(class) = e.class().filter(|c| c.is_template()) {
                let params: Vec<&str> = class
                    .template_params
                    .iter()
                    .map(|p| p.name.as_str())
                    .filter(|n| !n.is_empty())
                    .collect();
                qualified.push('<');
                qualified.push_str(&params.join(", "));
                qualified.push('>');
            }
            qualified
        } else {
            e.local_name().to_string()
        };

        if e.is_anonymous() {
            name = remove_anonymous_scopes(&name);
        }

        let sep = e.language.scope_separator(false);
        if sep != "::" {
            name = name.replace("::", sep);
        }

        if e.compound_type == CompoundType::Protocol {
            if let Some(stripped) = name.strip_suffix("-p") {
                name = format!("<{stripped}>");
            }
        }
        name
    }

    /// Kind word used in titles and tag files.
    pub fn compound_type_string(&self, entity: EntityId) -> &'static str {
        let Some(e) = self.entity(entity) else {
            return "unknown";
        };
        compound_type_string(e)
    }

    /// Output file name without extension.
    pub fn output_file_base(&self, entity: EntityId) -> String {
        let Some(e) = self.entity(entity) else {
            return String::new();
        };
        if let Some(master) = e.template_master() {
            return self.output_file_base(master);
        }
        let raw = format!("{}{}", compound_type_string(e), e.name);
        escape_file_name(&raw, self.options().case_sensitive_fname)
    }

    /// Stable anchor for a member within its page.
    pub fn member_anchor(&self, member: MemberId) -> String {
        let Some(md) = self.member(member) else {
            return String::new();
        };
        let owner = md.owner.map(|o| self.name(o)).unwrap_or("");

        let mut hasher = Sha256::new();
        hasher.update(owner.as_bytes());
        hasher.update(b"::");
        hasher.update(md.name.as_bytes());
        hasher.update(md.args_string.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!("a{}", &digest[..32])
    }

    /// Number of all-members entries reached through inheritance.
    pub fn count_inherited_members(&self, entity: EntityId) -> usize {
        self.all_members(entity)
            .map(|table| table.values().flatten().filter(|mi| mi.inherited).count())
            .unwrap_or(0)
    }

    /// Inherited members grouped by declaring class, nearest class first.
    pub fn inherited_members_by_base(&self, entity: EntityId) -> Vec<InheritedGroup> {
        let Some(table) = self.all_members(entity) else {
            return Vec::new();
        };

        let mut groups: HashMap<EntityId, Vec<MemberId>> = HashMap::new();
        for mi in table.values().flatten().filter(|mi| mi.inherited) {
            if let Some(owner) = self.member(mi.member).and_then(|md| md.owner) {
                let members = groups.entry(owner).or_default();
                if !members.contains(&mi.member) {
                    members.push(mi.member);
                }
            }
        }

        let mut groups: Vec<InheritedGroup> = groups
            .into_iter()
            .map(|(from, members)| InheritedGroup { from, members })
            .collect();
        groups.sort_by(|a, b| {
            let da = self.min_class_distance(entity, a.from).unwrap_or(usize::MAX);
            let db = self.min_class_distance(entity, b.from).unwrap_or(usize::MAX);
            da.cmp(&db)
                .then_with(|| self.name(a.from).cmp(self.name(b.from)))
        });
        groups
    }

    /// All-members entries of `entity` that are ambiguous.
    pub fn ambiguous_members(&self, entity: EntityId) -> Vec<(&str, &MemberInfo)> {
        self.all_members(entity)
            .into_iter()
            .flat_map(|table| {
                table
                    .iter()
                    .flat_map(|(name, infos)| infos.iter().map(move |mi| (&**name, mi)))
            })
            .filter(|(_, mi)| mi.is_ambiguous())
            .collect()
    }
}

fn compound_type_string(e: &CompoundEntity) -> &'static str {
    use CompoundType as C;

    if e.language == SrcLang::Fortran {
        return match e.compound_type {
            C::Class => "module",
            C::Struct => "type",
            C::Union => "union",
            C::Interface => "interface",
            C::Protocol => "protocol",
            C::Category => "category",
            C::Exception => "exception",
            C::Namespace | C::Module => "module",
            _ => "unknown",
        };
    }

    let java_enum = e
        .class()
        .is_some_and(|c| c.traits.contains(crate::model::ClassTraits::JAVA_ENUM));
    match e.compound_type {
        C::Class if java_enum => "enum",
        C::Class => "class",
        C::Struct => "struct",
        C::Union => "union",
        C::Interface if e.language == SrcLang::ObjC => "class",
        C::Interface => "interface",
        C::Protocol => "protocol",
        C::Category => "category",
        C::Exception => "exception",
        C::Service => "service",
        C::Singleton => "singleton",
        C::Namespace => "namespace",
        C::Module => "module",
        C::Library => "library",
        C::ConstantGroup => "constants",
    }
}

/// Drop `@N` components from a qualified name.
fn remove_anonymous_scopes(name: &str) -> String {
    name.split("::")
        .filter(|part| !is_anonymous_name(part))
        .collect::<Vec<_>>()
        .join("::")
}

/// File-system safe spelling of an entity name.
///
/// Upper-case letters are lowered with a single `_` marker in front of the
/// first one, unless file names are case sensitive.
pub fn escape_file_name(name: &str, case_sensitive: bool) -> String {
    let mut out = String::with_capacity(name.len() + 8);
    let mut first_upper = true;

    for c in name.chars() {
        let escaped = match c {
            '_' => "__",
            '-' => "-",
            ':' => "_1",
            '/' => "_2",
            '<' => "_3",
            '>' => "_4",
            '*' => "_5",
            '&' => "_6",
            '|' => "_7",
            '.' => "_8",
            '!' => "_9",
            ',' => "_00",
            ' ' => "_01",
            '{' => "_02",
            '}' => "_03",
            '?' => "_04",
            '^' => "_05",
            '%' => "_06",
            '(' => "_07",
            ')' => "_08",
            '+' => "_09",
            '=' => "_0a",
            '$' => "_0b",
            '\\' => "_0c",
            '@' => "_0d",
            ']' => "_0e",
            '[' => "_0f",
            '#' => "_0g",
            c if !c.is_ascii() => {
                out.push_str(&format!("_x{:02x}", c as u32));
                continue;
            }
            c if c.is_ascii_uppercase() && !case_sensitive => {
                if first_upper {
                    out.push('_');
                    first_upper = false;
                }
                out.push(c.to_ascii_lowercase());
                continue;
            }
            c => {
                out.push(c);
                continue;
            }
        };
        out.push_str(escaped);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelOptions;
    use crate::model::{EntityFlags, MemberRecord};
    use crate::types::{Location, MemberKind, Specifier};

    fn class(model: &mut DocumentationModel, name: &str) -> EntityId {
        model.register_entity(name, CompoundType::Class, Location::new("lib.h", 1, 1))
    }

    fn method(model: &mut DocumentationModel, owner: EntityId, name: &str) -> MemberId {
        let id = model.add_member(
            Some(owner),
            MemberRecord::new(name, MemberKind::Function).with_args("(int)"),
        );
        model.insert_member(owner, id).unwrap();
        id
    }

    #[test]
    fn test_member_lookup_prefers_closest_owner() {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        let c = class(&mut model, "C");
        model.insert_base(b, a, Protection::Public, Specifier::Normal, "").unwrap();
        model.insert_base(c, b, Protection::Public, Specifier::Normal, "").unwrap();
        let a_f = method(&mut model, a, "f");
        let b_f = model.add_member(
            Some(b),
            MemberRecord::new("f", MemberKind::Function).with_args("(double)"),
        );
        model.insert_member(b, b_f).unwrap();
        model.merge_all();

        assert_eq!(model.all_members(c).unwrap()["f"].len(), 2);
        assert_eq!(model.get_member_by_name(c, "f"), Some(b_f));
        assert_eq!(model.get_member_by_name(a, "f"), Some(a_f));
        assert_eq!(model.get_member_by_name(c, "missing"), None);

        assert!(model.is_accessible_member(c, a_f));
        assert!(!model.is_accessible_member(a, b_f));
    }

    #[test]
    fn test_lookup_skips_unlinkable_owners() {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        model.insert_base(b, a, Protection::Public, Specifier::Normal, "").unwrap();
        let a_f = method(&mut model, a, "f");
        let b_f = model.add_member(
            Some(b),
            MemberRecord::new("f", MemberKind::Function).with_args("(char)"),
        );
        model.insert_member(b, b_f).unwrap();
        model.entity_mut(b).unwrap().set_flag(EntityFlags::HIDDEN, true);
        model.merge_all();

        assert_eq!(model.get_member_by_name(b, "f"), Some(a_f));
    }

    #[test]
    fn test_linkability_rules() {
        let mut model = DocumentationModel::new(ModelOptions {
            hide_undoc_classes: true,
            ..ModelOptions::default()
        });
        let documented = class(&mut model, "Doc");
        model
            .entity_mut(documented)
            .unwrap()
            .set_flag(EntityFlags::DOCUMENTED, true);
        let undocumented = class(&mut model, "Bare");
        let external = class(&mut model, "Ext");
        model.entity_mut(external).unwrap().reference = Some("std.tag".to_string());
        let private = class(&mut model, "Hidden");
        model.entity_mut(private).unwrap().protection = Protection::Private;

        assert!(model.is_linkable_in_project(documented));
        assert!(!model.is_linkable_in_project(undocumented));
        assert!(!model.is_linkable_in_project(external));
        assert!(model.is_linkable(external));
        assert!(!model.is_linkable(private));
    }

    #[test]
    fn test_instances_defer_to_master() {
        let mut model = DocumentationModel::default();
        let list = class(&mut model, "List");
        model.set_template_params(list, &["class T"]).unwrap();
        let (inst, _) = model.get_or_create_instance(list, "<int>").unwrap();

        assert!(model.is_linkable(inst));
        model.entity_mut(list).unwrap().set_flag(EntityFlags::HIDDEN, true);
        assert!(!model.is_linkable(inst));
        assert_eq!(model.output_file_base(inst), model.output_file_base(list));
    }

    #[test]
    fn test_hierarchy_visibility_follows_derived_classes() {
        let mut model = DocumentationModel::default();
        let external = class(&mut model, "QObject");
        model.entity_mut(external).unwrap().reference = Some("qt.tag".to_string());
        assert!(!model.is_visible_in_hierarchy(external));

        let local = class(&mut model, "Widget");
        model
            .insert_base(local, external, Protection::Public, Specifier::Normal, "")
            .unwrap();
        assert!(model.has_non_reference_super_class(external));
        assert!(model.is_visible_in_hierarchy(external));
    }

    #[test]
    fn test_display_names() {
        let mut model = DocumentationModel::default();
        let map = class(&mut model, "util::Map");
        model.set_template_params(map, &["class K", "class V"]).unwrap();
        assert_eq!(model.display_name(map, true), "util::Map<K, V>");
        assert_eq!(model.display_name(map, false), "Map");

        let java = model.register_entity("org::demo::App", CompoundType::Class, Location::new("App.java", 1, 1));
        assert_eq!(model.display_name(java, true), "org.demo.App");

        let anon = class(&mut model, "outer::@1::Inner");
        assert_eq!(model.display_name(anon, true), "outer::Inner");

        let proto = model.register_entity("Drawing-p", CompoundType::Protocol, Location::new("d.h", 1, 1));
        assert_eq!(model.display_name(proto, true), "<Drawing>");
    }

    #[test]
    fn test_compound_type_strings() {
        let mut model = DocumentationModel::default();
        let st = model.register_entity("P", CompoundType::Struct, Location::new("p.h", 1, 1));
        let ns = model.register_entity("N", CompoundType::Namespace, Location::new("n.h", 1, 1));
        let ftn = model.register_entity("M", CompoundType::Class, Location::new("m.f90", 1, 1));
        let objc = model.register_entity("V", CompoundType::Interface, Location::new("V.mm", 1, 1));

        assert_eq!(model.compound_type_string(st), "struct");
        assert_eq!(model.compound_type_string(ns), "namespace");
        assert_eq!(model.compound_type_string(ftn), "module");
        assert_eq!(model.compound_type_string(objc), "class");
    }

    #[test]
    fn test_file_name_escaping() {
        assert_eq!(escape_file_name("classstd::vector<T>", false), "classstd_1_1vector_3_t_4");
        assert_eq!(escape_file_name("classMy_Type", false), "class_my__type");
        assert_eq!(escape_file_name("classMy_Type", true), "classMy__Type");
        assert_eq!(escape_file_name("structPair<A, B>", false), "struct_pair_3a_00_01b_4");
    }

    #[test]
    fn test_member_anchor_is_stable() {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        let f = method(&mut model, a, "f");
        let anchor = model.member_anchor(f);
        assert_eq!(anchor.len(), 33);
        assert!(anchor.starts_with('a'));
        assert_eq!(anchor, model.member_anchor(f));

        let g = method(&mut model, a, "g");
        assert_ne!(anchor, model.member_anchor(g));
    }

    #[test]
    fn test_inherited_member_groups() {
        let mut model = DocumentationModel::default();
        let a = class(&mut model, "A");
        let b = class(&mut model, "B");
        let c = class(&mut model, "C");
        model.insert_base(b, a, Protection::Public, Specifier::Normal, "").unwrap();
        model.insert_base(c, b, Protection::Public, Specifier::Normal, "").unwrap();
        let fa = method(&mut model, a, "fa");
        let fb = method(&mut model, b, "fb");
        method(&mut model, c, "fc");
        model.merge_all();

        assert_eq!(model.count_inherited_members(c), 2);
        let groups = model.inherited_members_by_base(c);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], InheritedGroup { from: b, members: vec![fb] });
        assert_eq!(groups[1], InheritedGroup { from: a, members: vec![fa] });
    }
}
