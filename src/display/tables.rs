//! Table formatting utilities for structured output.

use crate::ingest::BuildSummary;
use crate::model::DocumentationModel;
use crate::types::EntityId;
use comfy_table::{
    Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { table: new_table() }
    }

    /// Set the table headers.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        self.table.set_header(header_cells(&headers));
        self
    }

    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    pub fn build(self) -> String {
        self.table.to_string()
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn header_cells(headers: &[&str]) -> Vec<Cell> {
    headers
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
        .collect()
}

/// Counters of one pipeline run.
pub fn create_summary_table(summary: &BuildSummary) -> String {
    let mut table = new_table();
    table.set_header(header_cells(&["Metric", "Value"]));

    let rows = [
        ("Entities", summary.entities),
        ("Artificial scopes", summary.artificial_scopes),
        ("Members", summary.members),
        ("Base edges", summary.base_edges),
        ("Template instances", summary.template_instances),
        ("Categories merged", summary.categories_merged),
        ("Classes merged", summary.merge.classes_merged),
        ("Inherited entries", summary.merge.inherited_entries),
    ];
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value.to_string()]);
    }

    // Problems are highlighted only when present
    let problems = [
        ("Ambiguous entries", summary.merge.ambiguous_entries),
        ("Unresolved bases", summary.unresolved_bases),
        ("Unresolved usings", summary.unresolved_usings),
        ("Skipped entities", summary.skipped_entities),
        ("Skipped members", summary.skipped_members),
    ];
    for (label, value) in problems {
        let cell = Cell::new(value);
        let cell = if value > 0 { cell.fg(Color::Yellow) } else { cell };
        table.add_row(vec![Cell::new(label), cell]);
    }

    table.to_string()
}

/// The merged all-members table of one class.
pub fn create_members_table(model: &DocumentationModel, entity: EntityId) -> String {
    let mut table = new_table();
    table.set_header(header_cells(&[
        "Member",
        "Kind",
        "Protection",
        "Virtualness",
        "Declared in",
        "Ambiguity",
    ]));

    let Some(all) = model.all_members(entity) else {
        return table.to_string();
    };

    for (name, infos) in all {
        for info in infos {
            let Some(md) = model.member(info.member) else {
                continue;
            };
            let owner = md.owner.map(|o| model.name(o)).unwrap_or("");
            let declared = if info.inherited {
                Cell::new(owner).fg(Color::DarkGrey)
            } else {
                Cell::new(owner)
            };
            let ambiguity = if info.is_ambiguous() {
                Cell::new(format!("{}{name}", info.ambiguity_scope)).fg(Color::Yellow)
            } else {
                Cell::new("")
            };

            table.add_row(vec![
                Cell::new(format!("{name}{}", md.args_string)),
                Cell::new(md.kind.as_str()),
                Cell::new(info.protection.as_str()),
                Cell::new(info.virtualness.as_str()),
                declared,
                ambiguity,
            ]);
        }
    }

    table.to_string()
}

/// Direct bases and derived classes of one class.
pub fn create_hierarchy_table(model: &DocumentationModel, entity: EntityId) -> String {
    let mut table = new_table();
    table.set_header(header_cells(&[
        "Relation",
        "Class",
        "Protection",
        "Virtualness",
        "Template",
    ]));

    let edges = model
        .base_classes(entity)
        .iter()
        .map(|e| ("base", e))
        .chain(model.sub_classes(entity).iter().map(|e| ("derived", e)));

    for (relation, edge) in edges {
        let name = model.name(edge.class);
        let class = if model.is_linkable(edge.class) {
            Cell::new(name).add_attribute(Attribute::Bold)
        } else {
            Cell::new(name).fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(relation),
            class,
            Cell::new(edge.protection.as_str()),
            Cell::new(edge.virtualness.as_str()),
            Cell::new(&edge.template_spec),
        ]);
    }

    table.to_string()
}
