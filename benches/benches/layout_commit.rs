// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use prism_bounds::Aabb;
use prism_layout::{Arrangement, GridLayout, LinearLayout, LocalNode, NodeId, ScrollView, Tree};

fn row() -> LocalNode {
    LocalNode::intrinsic(Aabb::new(DVec3::ZERO, DVec3::new(0.4, 0.05, 0.0)))
}

/// A prism holding a scroll view over a list of `rows` rows.
fn scrolling_list(rows: usize) -> (Tree, NodeId, Vec<NodeId>) {
    let mut tree = Tree::new();
    let prism = tree.insert(None, LocalNode::prism(DVec3::new(1.0, 1.0, 0.5)));
    let scroll = tree.insert(
        Some(prism),
        LocalNode::container(Arrangement::Scroll(ScrollView::from(DVec3::new(
            0.5, 0.5, 0.1,
        )))),
    );
    let list = tree.insert(
        Some(scroll),
        LocalNode::container(Arrangement::Linear(LinearLayout::default())),
    );
    let ids = (0..rows).map(|_| tree.insert(Some(list), row())).collect();
    let _ = tree.commit();
    (tree, scroll, ids)
}

fn bench_full_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_commit");
    for &n in &[64usize, 256, 1024] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("list_n{n}"), |b| {
            b.iter_batched(
                || {
                    let mut tree = Tree::new();
                    let list = tree.insert(
                        None,
                        LocalNode::container(Arrangement::Linear(LinearLayout::default())),
                    );
                    for _ in 0..n {
                        let _ = tree.insert(Some(list), row());
                    }
                    tree
                },
                |mut tree| black_box(tree.commit()),
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("grid_n{n}"), |b| {
            b.iter_batched(
                || {
                    let mut tree = Tree::new();
                    let grid = tree.insert(
                        None,
                        LocalNode::container(Arrangement::Grid(GridLayout {
                            columns: 8,
                            ..GridLayout::default()
                        })),
                    );
                    for _ in 0..n {
                        let _ = tree.insert(Some(grid), row());
                    }
                    tree
                },
                |mut tree| black_box(tree.commit()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll");
    for &n in &[256usize, 1024] {
        let (mut tree, scroll, _) = scrolling_list(n);
        let mut value = 0.0;
        group.bench_function(format!("scroll_step_n{n}"), |b| {
            b.iter(|| {
                value = (value + 0.01) % 1.0;
                let view = ScrollView {
                    value,
                    ..ScrollView::from(DVec3::new(0.5, 0.5, 0.1))
                };
                tree.set_arrangement(scroll, Arrangement::Scroll(view));
                black_box(tree.commit());
            });
        });
    }
    group.finish();
}

fn bench_single_edit(c: &mut Criterion) {
    let (mut tree, _, ids) = scrolling_list(1024);
    let target = ids[ids.len() / 2];
    let mut flip = false;
    c.bench_function("single_row_resize_n1024", |b| {
        b.iter(|| {
            flip = !flip;
            let s = if flip { 1.0 } else { 0.5 };
            tree.set_scale(target, DVec3::new(s, s, 1.0));
            black_box(tree.commit());
        });
    });
}

criterion_group!(benches, bench_full_commit, bench_scroll, bench_single_edit);
criterion_main!(benches);
