#![allow(dead_code)]

use docgraph::model::MemberRecord;
use docgraph::{
    CompoundType, DocumentationModel, EntityId, Location, MemberId, MemberKind, Protection,
    Specifier,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

pub fn class(model: &mut DocumentationModel, name: &str) -> EntityId {
    model.register_entity(name, CompoundType::Class, Location::new("test.h", 1, 1))
}

pub fn namespace(model: &mut DocumentationModel, name: &str) -> EntityId {
    model.register_entity(name, CompoundType::Namespace, Location::new("test.h", 1, 1))
}

pub fn derive(model: &mut DocumentationModel, child: EntityId, parent: EntityId) {
    model
        .insert_base(child, parent, Protection::Public, Specifier::Normal, "")
        .expect("Failed to insert base");
}

/// Declare and categorise a public method.
pub fn method(model: &mut DocumentationModel, owner: EntityId, name: &str, args: &str) -> MemberId {
    let id = model.add_member(
        Some(owner),
        MemberRecord::new(name, MemberKind::Function)
            .with_type("void")
            .with_args(args),
    );
    model.insert_member(owner, id).expect("Failed to insert member");
    id
}

pub mod sample_records {
    /// A small C++-like project exercising scopes, templates and usings.
    pub const SHAPES: &str = r#"{
  "entities": [
    { "name": "geo", "kind": "namespace", "file": "geo.h", "line": 1, "documented": true },
    { "name": "geo::Shape", "kind": "class", "file": "geo.h", "line": 3, "documented": true,
      "members": [
        { "name": "area", "kind": "function", "type": "double", "args": "() const", "virtualness": "pure" },
        { "name": "name", "kind": "function", "type": "std::string", "args": "() const", "virtualness": "virtual" },
        { "name": "id_", "kind": "variable", "type": "int", "protection": "protected" }
      ] },
    { "name": "geo::Circle", "kind": "class", "file": "geo.h", "line": 20, "documented": true,
      "bases": ["Shape"],
      "members": [
        { "name": "Circle", "kind": "function", "args": "(double r)" },
        { "name": "area", "kind": "function", "type": "double", "args": "() const", "virtualness": "virtual" },
        { "name": "radius", "kind": "variable", "type": "double", "protection": "private" }
      ] },
    { "name": "geo::Store", "kind": "class", "file": "geo.h", "line": 40, "template_params": ["class T"],
      "members": [
        { "name": "get", "kind": "function", "type": "const T &", "args": "(int index) const" }
      ] },
    { "name": "geo::Canvas", "kind": "class", "file": "geo.h", "line": 50,
      "bases": [ { "name": "Store<Circle>", "protection": "protected" }, "Printable" ] },
    { "name": "app", "kind": "namespace", "file": "main.cpp", "using_namespaces": ["geo"],
      "using_declarations": ["geo::Circle"] }
  ]
}"#;
}
