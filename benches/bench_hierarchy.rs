use criterion::{criterion_group, criterion_main, Criterion};
use glam::{Quat, Vec3};
use scenegraph_ecs::{EntityId, EntityManager};
use std::hint::black_box;

fn chain(manager: &mut EntityManager, depth: usize) -> EntityId {
    let mut parent = None;
    let mut last = manager.root();
    for i in 0..depth {
        let id = manager.create_entity(Some(&format!("level{i}")));
        manager.init_entity(id, parent).unwrap();
        manager.set_position(id, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        parent = Some(id);
        last = id;
    }
    last
}

fn bench_hierarchy_creation(c: &mut Criterion) {
    c.bench_function("hierarchy_root_100_children", |b| {
        b.iter(|| {
            let mut manager = EntityManager::new();
            for _ in 0..100 {
                let id = manager.create_entity(None);
                manager.init_entity(id, None).unwrap();
            }
            black_box(manager)
        })
    });
}

fn bench_hierarchy_deep_tree(c: &mut Criterion) {
    c.bench_function("hierarchy_deep_20_levels", |b| {
        b.iter(|| {
            let mut manager = EntityManager::new();
            black_box(chain(&mut manager, 20))
        })
    });
}

fn bench_world_transform(c: &mut Criterion) {
    c.bench_function("world_transform_depth_20", |b| {
        let mut manager = EntityManager::new();
        let leaf = chain(&mut manager, 20);
        manager
            .set_rotation(leaf, Quat::from_rotation_z(0.5))
            .unwrap();
        b.iter(|| black_box(manager.world_transform(black_box(leaf))))
    });
}

fn bench_find_child_recursive(c: &mut Criterion) {
    c.bench_function("find_child_recursive_depth_20", |b| {
        let mut manager = EntityManager::new();
        chain(&mut manager, 20);
        let root = manager.root();
        b.iter(|| black_box(manager.find_child(root, black_box("level19"), true)))
    });
}

fn bench_destroy_subtree(c: &mut Criterion) {
    c.bench_function("destroy_subtree_100_children", |b| {
        b.iter(|| {
            let mut manager = EntityManager::new();
            let branch = manager.create_entity(Some("branch"));
            manager.init_entity(branch, None).unwrap();
            for _ in 0..100 {
                let id = manager.create_entity(None);
                manager.init_entity(id, Some(branch)).unwrap();
            }
            black_box(manager.destroy_entity(branch))
        })
    });
}

criterion_group!(
    benches,
    bench_hierarchy_creation,
    bench_hierarchy_deep_tree,
    bench_world_transform,
    bench_find_child_recursive,
    bench_destroy_subtree
);
criterion_main!(benches);
