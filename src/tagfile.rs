//! Tag file export.
//!
//! A tag file lets another documentation run link into this one. It lists
//! every linkable namespace and class with its members, anchors and file
//! names. Entities and members are emitted in a fixed order so the same
//! model always renders the same bytes.

use crate::error::{DocError, DocResult};
use crate::model::{CLASS_LAYOUT, DocumentationModel, MemberListType, NAMESPACE_LAYOUT};
use crate::types::{EntityId, MemberId, Protection, Specifier, SrcLang};
use std::fmt::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Renders the tag file of one model.
pub struct TagFileWriter<'a> {
    model: &'a DocumentationModel,
}

impl<'a> TagFileWriter<'a> {
    pub fn new(model: &'a DocumentationModel) -> Self {
        Self { model }
    }

    /// The whole tag file as a string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Err(e) = self.write(&mut out) {
            warn!("Tag file rendering stopped early: {e}");
        }
        out
    }

    /// Render into `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> DocResult<()> {
        std::fs::write(path, self.render()).map_err(|source| DocError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write<W: Write>(&self, out: &mut W) -> fmt::Result {
        let model = self.model;

        let mut namespaces: Vec<EntityId> = model
            .entities()
            .filter(|e| e.is_namespace())
            .map(|e| e.id)
            .filter(|&id| model.is_linkable_in_project(id))
            .collect();
        namespaces.sort_by(|a, b| model.name(*a).cmp(model.name(*b)));

        let mut classes: Vec<EntityId> = model
            .entities()
            .filter(|e| e.is_class() && !e.is_template_instance())
            .map(|e| e.id)
            .filter(|&id| model.is_linkable_in_project(id))
            .collect();
        classes.sort_by(|a, b| model.name(*a).cmp(model.name(*b)));

        debug!(
            "Writing tag file for {} namespaces and {} classes",
            namespaces.len(),
            classes.len()
        );

        writeln!(out, "<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>")?;
        writeln!(out, "<tagfile>")?;
        for ns in namespaces {
            self.write_namespace(out, ns)?;
        }
        for class in classes {
            self.write_class(out, class)?;
        }
        writeln!(out, "</tagfile>")
    }

    fn write_namespace<W: Write>(&self, out: &mut W, ns: EntityId) -> fmt::Result {
        let model = self.model;
        let Some(entity) = model.entity(ns) else {
            return Ok(());
        };

        writeln!(out, "  <compound kind=\"{}\">", model.compound_type_string(ns))?;
        writeln!(out, "    <name>{}</name>", xml_escape(&entity.name))?;
        self.write_filename(out, ns)?;

        for &inner in &entity.inner_namespaces {
            if model.is_linkable_in_project(inner) {
                writeln!(out, "    <namespace>{}</namespace>", xml_escape(model.name(inner)))?;
            }
        }
        for &inner in &entity.inner_classes {
            if model.is_linkable_in_project(inner) {
                self.write_nested_class(out, inner)?;
            }
        }
        for &list_type in NAMESPACE_LAYOUT {
            self.write_member_list(out, ns, list_type)?;
        }

        writeln!(out, "  </compound>")
    }

    fn write_class<W: Write>(&self, out: &mut W, class: EntityId) -> fmt::Result {
        let model = self.model;
        let (Some(entity), Some(data)) = (model.entity(class), model.class(class)) else {
            return Ok(());
        };

        let kind = match model.compound_type_string(class) {
            "type" if entity.language == SrcLang::Fortran => "struct",
            kind => kind,
        };
        write!(out, "  <compound kind=\"{kind}\"")?;
        if entity.language == SrcLang::ObjC {
            write!(out, " objc=\"yes\"")?;
        }
        writeln!(out, ">")?;
        writeln!(out, "    <name>{}</name>", xml_escape(&entity.name))?;
        self.write_filename(out, class)?;

        for param in &data.template_params {
            write!(out, "    <templarg>{}", xml_escape(&param.type_name))?;
            if !param.name.is_empty() {
                write!(out, " {}", xml_escape(&param.name))?;
            }
            writeln!(out, "</templarg>")?;
        }

        for edge in &data.bases {
            if !model.is_linkable(edge.class) {
                continue;
            }
            write!(out, "    <base")?;
            match edge.protection {
                Protection::Protected => write!(out, " protection=\"protected\"")?,
                Protection::Private => write!(out, " protection=\"private\"")?,
                Protection::Public | Protection::Package => {}
            }
            if edge.virtualness == Specifier::Virtual {
                write!(out, " virtualness=\"virtual\"")?;
            }
            writeln!(out, ">{}</base>", xml_escape(model.name(edge.class)))?;
        }

        for &inner in &entity.inner_classes {
            let visible = model
                .entity(inner)
                .is_some_and(|e| !e.is_template_instance() && model.protection_level_visible(e.protection));
            if visible && model.is_linkable_in_project(inner) {
                self.write_nested_class(out, inner)?;
            }
        }

        for &list_type in CLASS_LAYOUT {
            self.write_member_list(out, class, list_type)?;
        }

        writeln!(out, "  </compound>")
    }

    fn write_filename<W: Write>(&self, out: &mut W, entity: EntityId) -> fmt::Result {
        writeln!(
            out,
            "    <filename>{}{}</filename>",
            xml_escape(&self.model.output_file_base(entity)),
            xml_escape(&self.model.options().html_file_extension)
        )
    }

    fn write_nested_class<W: Write>(&self, out: &mut W, class: EntityId) -> fmt::Result {
        writeln!(
            out,
            "    <class kind=\"{}\">{}</class>",
            self.model.compound_type_string(class),
            xml_escape(self.model.name(class))
        )
    }

    fn write_member_list<W: Write>(
        &self,
        out: &mut W,
        entity: EntityId,
        list_type: MemberListType,
    ) -> fmt::Result {
        for &member in self.model.member_list(entity, list_type) {
            self.write_member(out, member)?;
        }
        Ok(())
    }

    fn write_member<W: Write>(&self, out: &mut W, member: MemberId) -> fmt::Result {
        let model = self.model;
        let Some(md) = model.member(member) else {
            return Ok(());
        };
        if !model.is_member_linkable(member) {
            return Ok(());
        }

        write!(out, "    <member kind=\"")?;
        if md.is_friend() {
            write!(out, "friend")?;
        }
        write!(out, "{}\"", md.kind.as_str())?;
        if md.protection != Protection::Public {
            write!(out, " protection=\"{}\"", md.protection.as_str())?;
        }
        if !md.virtualness.is_normal() {
            write!(out, " virtualness=\"{}\"", md.virtualness.as_str())?;
        }
        if md.is_static() {
            write!(out, " static=\"yes\"")?;
        }
        writeln!(out, ">")?;

        if !md.type_string.starts_with('@') {
            writeln!(out, "      <type>{}</type>", xml_escape(&md.type_string))?;
        }
        writeln!(out, "      <name>{}</name>", xml_escape(&md.name))?;
        let file_base = md.owner.map(|o| model.output_file_base(o)).unwrap_or_default();
        writeln!(
            out,
            "      <anchorfile>{}{}</anchorfile>",
            xml_escape(&file_base),
            xml_escape(&model.options().html_file_extension)
        )?;
        writeln!(out, "      <anchor>{}</anchor>", model.member_anchor(member))?;
        writeln!(out, "      <arglist>{}</arglist>", xml_escape(&md.args_string))?;
        writeln!(out, "    </member>")
    }
}

/// Escape text for XML element content and attribute values.
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
