//! Performance benchmarks for member merging and tag file rendering
//!
//! Deep chains stress the post-order traversal, wide fans stress the
//! all-members table growth.

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use docgraph::{
    CompoundType, DocumentationModel, EntityId, Location, MemberKind, MemberRecord, Protection,
    Specifier, TagFileWriter,
};
use std::hint::black_box;

fn add_methods(model: &mut DocumentationModel, owner: EntityId, prefix: &str, count: usize) {
    for i in 0..count {
        let record = MemberRecord::new(&format!("{prefix}_{i}"), MemberKind::Function)
            .with_type("void")
            .with_args("(int value)");
        let id = model.add_member(Some(owner), record);
        model.insert_member(owner, id).unwrap();
    }
}

/// `C0 <- C1 <- ... <- Cn`, each class declaring a few methods.
fn deep_chain(depth: usize) -> DocumentationModel {
    let mut model = DocumentationModel::default();
    let mut previous: Option<EntityId> = None;
    for level in 0..depth {
        let id = model.register_entity(
            &format!("Level{level}"),
            CompoundType::Class,
            Location::new("deep.h", level as u32 + 1, 1),
        );
        add_methods(&mut model, id, &format!("level{level}"), 4);
        if let Some(base) = previous {
            model
                .insert_base(id, base, Protection::Public, Specifier::Normal, "")
                .unwrap();
        }
        previous = Some(id);
    }
    model
}

/// One base with many direct subclasses and a join class deriving from all.
fn wide_fan(width: usize) -> DocumentationModel {
    let mut model = DocumentationModel::default();
    let root = model.register_entity("Root", CompoundType::Class, Location::new("wide.h", 1, 1));
    add_methods(&mut model, root, "root", 16);
    let join = model.register_entity("Join", CompoundType::Class, Location::new("wide.h", 2, 1));

    for i in 0..width {
        let id = model.register_entity(
            &format!("Branch{i}"),
            CompoundType::Class,
            Location::new("wide.h", i as u32 + 3, 1),
        );
        add_methods(&mut model, id, &format!("branch{i}"), 2);
        model
            .insert_base(id, root, Protection::Public, Specifier::Virtual, "")
            .unwrap();
        model
            .insert_base(join, id, Protection::Public, Specifier::Normal, "")
            .unwrap();
    }
    model
}

fn bench_merge(c: &mut Criterion) {
    c.bench_function("merge_deep_chain_64", |b| {
        b.iter_batched(
            || deep_chain(64),
            |mut model| black_box(model.merge_all()),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("merge_wide_fan_128", |b| {
        b.iter_batched(
            || wide_fan(128),
            |mut model| black_box(model.merge_all()),
            BatchSize::SmallInput,
        );
    });
}

fn bench_tag_file(c: &mut Criterion) {
    c.bench_function("render_tag_file_deep_chain_64", |b| {
        let mut model = deep_chain(64);
        model.merge_all();
        b.iter(|| {
            let tag = TagFileWriter::new(black_box(&model)).render();
            black_box(tag);
        });
    });
}

criterion_group!(benches, bench_merge, bench_tag_file);
criterion_main!(benches);
