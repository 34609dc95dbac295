//! End-to-end runs: records file in, finished model and tag file out.

mod common;

use common::{TestProject, sample_records};
use docgraph::{
    DocError, MemberListType, ModelOptions, Pipeline, Protection, RawDocument, Specifier,
    TagFileWriter,
};

fn build_shapes(options: ModelOptions) -> (docgraph::DocumentationModel, docgraph::BuildSummary) {
    let project = TestProject::new();
    let path = project.add_file("records/shapes.json", sample_records::SHAPES);
    let doc = RawDocument::from_path(&path).unwrap();
    Pipeline::new(options).run(&doc)
}

// ============================================================================
// Summary
// ============================================================================

#[test]
fn test_summary_counts_for_shapes() {
    println!("\n=== TEST: Pipeline summary ===");
    let (_, summary) = build_shapes(ModelOptions::default());

    // Six declared entities, one placeholder base, one template instance
    assert_eq!(summary.entities, 8);
    assert_eq!(summary.artificial_scopes, 0);
    assert_eq!(summary.unresolved_bases, 1);
    assert_eq!(summary.template_instances, 1);
    assert_eq!(summary.base_edges, 3);
    assert_eq!(summary.skipped_entities, 0);
    assert_eq!(summary.skipped_members, 0);
    assert_eq!(summary.unresolved_usings, 0);
    println!("=== TEST PASSED ===");
}

// ============================================================================
// Inheritance
// ============================================================================

#[test]
fn test_override_and_inherited_members() {
    let (model, _) = build_shapes(ModelOptions::default());
    let shape = model.find_entity("geo::Shape").unwrap();
    let circle = model.find_entity("geo::Circle").unwrap();

    let table = model.all_members(circle).unwrap();

    // Circle::area replaces Shape::area
    let area = &table["area"];
    assert_eq!(area.len(), 1);
    assert_eq!(model.member(area[0].member).unwrap().owner, Some(circle));

    let name = &table["name"];
    assert_eq!(name.len(), 1);
    assert!(name[0].inherited);
    assert_eq!(model.member(name[0].member).unwrap().owner, Some(shape));

    let id = &table["id_"];
    assert_eq!(id[0].protection, Protection::Protected);

    assert!(model.is_base_class(circle, shape, false));
    assert_eq!(model.min_class_distance(circle, shape), Some(1));
}

#[test]
fn test_pure_virtual_makes_class_abstract() {
    let (model, _) = build_shapes(ModelOptions::default());
    let shape = model.find_entity("geo::Shape").unwrap();

    let pure: Vec<_> = model
        .member_list(shape, MemberListType::PubMethods)
        .iter()
        .filter_map(|&m| model.member(m))
        .filter(|md| md.virtualness == Specifier::Pure)
        .map(|md| md.name.to_string())
        .collect();
    assert_eq!(pure, vec!["area".to_string()]);
    assert!(model.class(shape).unwrap().is_abstract());
}

#[test]
fn test_template_base_instance_members_are_substituted() {
    let (model, _) = build_shapes(ModelOptions::default());
    let store = model.find_entity("geo::Store").unwrap();
    let canvas = model.find_entity("geo::Canvas").unwrap();

    let instances: Vec<_> = model.template_instances(store).collect();
    assert_eq!(instances.len(), 1);
    let instance = instances[0].1;
    assert_eq!(model.template_master(instance), Some(store));

    // Canvas derives from the instance, not from the generic
    let bases: Vec<_> = model.base_classes(canvas).iter().map(|e| e.class).collect();
    assert!(bases.contains(&instance));
    assert!(!bases.contains(&store));

    let get = &model.all_members(canvas).unwrap()["get"][0];
    assert!(get.inherited);
    // Protected inheritance caps the public member
    assert_eq!(get.protection, Protection::Protected);
    let md = model.member(get.member).unwrap();
    assert_eq!(md.type_string, "const Circle &");
    assert_eq!(md.owner, Some(instance));
}

#[test]
fn test_unresolved_base_becomes_placeholder() {
    let (model, _) = build_shapes(ModelOptions::default());
    let printable = model.find_entity("Printable").unwrap();
    let entity = model.entity(printable).unwrap();

    assert!(entity.is_artificial());
    assert!(entity.is_used_only());
    assert!(!model.is_linkable(printable));
}

// ============================================================================
// Namespaces
// ============================================================================

#[test]
fn test_using_relations_resolved() {
    let (model, _) = build_shapes(ModelOptions::default());
    let app = model.find_entity("app").unwrap();
    let geo = model.find_entity("geo").unwrap();
    let circle = model.find_entity("geo::Circle").unwrap();

    assert_eq!(model.used_namespaces(app).collect::<Vec<_>>(), vec![geo]);
    let decls: Vec<_> = model.used_declarations(app).map(|(name, _)| name.to_string()).collect();
    assert_eq!(decls, vec!["geo::Circle".to_string()]);

    let inner = &model.entity(geo).unwrap().inner_classes;
    assert!(inner.contains(&circle));
}

// ============================================================================
// Lookup and tag file
// ============================================================================

#[test]
fn test_member_lookup_through_inheritance() {
    let (model, _) = build_shapes(ModelOptions::default());
    let shape = model.find_entity("geo::Shape").unwrap();
    let circle = model.find_entity("geo::Circle").unwrap();

    let name = model.get_member_by_name(circle, "name").unwrap();
    assert_eq!(model.member(name).unwrap().owner, Some(shape));
    assert!(model.get_member_by_name(circle, "missing").is_none());

    let area = model.get_member_by_name(circle, "area").unwrap();
    assert_eq!(model.member(area).unwrap().owner, Some(circle));
    assert_eq!(model.member_anchor(area).len(), 33);
    assert_ne!(model.member_anchor(area), model.member_anchor(name));
}

#[test]
fn test_tag_file_round_trip_through_disk() {
    println!("\n=== TEST: Tag file written to disk ===");
    let (model, _) = build_shapes(ModelOptions::default());
    let project = TestProject::new();
    let path = project.path().join("shapes.tag");

    TagFileWriter::new(&model).write_to(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, TagFileWriter::new(&model).render());

    assert!(written.starts_with("<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>"));
    assert!(written.contains("<name>geo::Circle</name>"));
    assert!(written.contains("<filename>classgeo_1_1_circle.html</filename>"));
    assert!(written.contains("<templarg>class T</templarg>"));
    // Placeholders and instances have no pages
    assert!(!written.contains("<name>Printable</name>"));
    assert!(!written.contains("Store&lt;Circle&gt;</name>"));

    // Namespaces come before classes
    let app = written.find("<name>app</name>").unwrap();
    let canvas = written.find("<name>geo::Canvas</name>").unwrap();
    assert!(app < canvas);
    println!("=== TEST PASSED ===");
}

#[test]
fn test_tag_file_is_identical_across_runs() {
    let (first, _) = build_shapes(ModelOptions::default());
    let (second, _) = build_shapes(ModelOptions::default());
    assert_eq!(
        TagFileWriter::new(&first).render(),
        TagFileWriter::new(&second).render()
    );
}

// ============================================================================
// Options and errors
// ============================================================================

#[test]
fn test_private_members_documented_only_when_extracted() {
    let (model, _) = build_shapes(ModelOptions::default());
    let circle = model.find_entity("geo::Circle").unwrap();
    let radius = model.members_named("radius")[0];
    assert!(model.member_list(circle, MemberListType::PriAttribs).contains(&radius));
    assert!(!model.member_list(circle, MemberListType::VariableMembers).contains(&radius));
    assert!(!model.is_member_linkable(radius));

    let (model, _) = build_shapes(ModelOptions {
        extract_private: true,
        ..ModelOptions::default()
    });
    let circle = model.find_entity("geo::Circle").unwrap();
    let radius = model.members_named("radius")[0];
    assert!(model.member_list(circle, MemberListType::VariableMembers).contains(&radius));
    assert!(model.is_member_linkable(radius));
}

#[test]
fn test_missing_records_file_reports_path() {
    let project = TestProject::new();
    let err = RawDocument::from_path(&project.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, DocError::FileRead { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_malformed_records_are_a_decode_error() {
    let project = TestProject::new();
    let path = project.add_file("bad.json", "{ \"entities\": [ { \"name\": 3 } ] }");
    let err = RawDocument::from_path(&path).unwrap_err();
    assert!(matches!(err, DocError::Decode { .. }));
}
