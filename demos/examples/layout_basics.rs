// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Alignment, content bounds, and managed layouts inside a prism.
//!
//! Run:
//! - `cargo run -p prism_demos --example layout_basics`
//! - `RUST_LOG=prism_layout=trace cargo run -p prism_demos --example layout_basics`

use glam::DVec3;
use prism_bounds::{Aabb, Ray};
use prism_layout::{
    Alignment, Arrangement, Extent, GridLayout, LinearLayout, LocalNode, NodeId, Orientation,
    QueryFilter, Tree,
};

fn label(w: f64, h: f64) -> LocalNode {
    LocalNode::intrinsic(Aabb::new(DVec3::ZERO, DVec3::new(w, h, 0.0)))
}

fn print_node(tree: &Tree, name: &str, id: NodeId) {
    let (Some(b), Some(p)) = (tree.bounds(id), tree.position(id)) else {
        return;
    };
    println!(
        "{name:>8}: pos=({:+.3}, {:+.3}, {:+.3}) x[{:+.3}, {:+.3}] y[{:+.3}, {:+.3}] s={:.3}",
        p.x,
        p.y,
        p.z,
        b.min.x,
        b.max.x,
        b.min.y,
        b.max.y,
        tree.scale(id).map_or(1.0, |s| s.x),
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut tree = Tree::new();
    let prism = tree.insert(None, LocalNode::prism(DVec3::new(1.0, 1.0, 0.4)));

    // A title anchored by its top-left corner.
    let title = tree.insert(
        Some(prism),
        label(0.3, 0.06)
            .at(DVec3::new(-0.45, 0.45, 0.0))
            .aligned(Alignment::TOP_LEFT),
    );

    // A horizontal toolbar 0.5 m wide: the wide button gets shrunk to fit.
    let toolbar = tree.insert(
        Some(prism),
        LocalNode::container(Arrangement::Linear(LinearLayout {
            orientation: Orientation::Horizontal,
            width: Extent::Fixed(0.5),
            ..LinearLayout::default()
        }))
        .at(DVec3::new(0.0, 0.3, 0.0)),
    );
    let buttons: Vec<_> = [0.1, 0.1, 0.4]
        .into_iter()
        .map(|w| tree.insert(Some(toolbar), label(w, 0.05)))
        .collect();

    // A 3-column grid of tiles.
    let grid = tree.insert(
        Some(prism),
        LocalNode::container(Arrangement::Grid(GridLayout {
            columns: 3,
            ..GridLayout::default()
        }))
        .at(DVec3::new(0.0, -0.1, 0.0)),
    );
    let tiles: Vec<_> = (0..7)
        .map(|i| tree.insert(Some(grid), label(0.1 + 0.02 * f64::from(i % 3), 0.1)))
        .collect();

    let damage = tree.commit();
    println!("first commit: {} nodes changed", damage.changed.len());

    print_node(&tree, "title", title);
    print_node(&tree, "toolbar", toolbar);
    for (i, b) in buttons.iter().enumerate() {
        print_node(&tree, &format!("button{i}"), *b);
    }
    print_node(&tree, "grid", grid);
    for (i, t) in tiles.iter().enumerate() {
        print_node(&tree, &format!("tile{i}"), *t);
    }

    // Changing the alignment moves the content, not the anchor.
    tree.set_alignment(title, Alignment::CENTER_CENTER);
    let damage = tree.commit();
    println!(
        "realigned title: changed={:?} dirty={:?}",
        damage.changed,
        damage.union_box()
    );
    print_node(&tree, "title", title);

    // Pick from the viewer's side.
    let filter = QueryFilter {
        visible_only: true,
        pickable_only: true,
    };
    let center = tree.world_bounds(tiles[4]).map_or(DVec3::ZERO, |b| b.center());
    let ray = Ray::new(center + DVec3::new(0.0, 0.0, 2.0), DVec3::NEG_Z);
    if let Some(hit) = tree.hit_test_ray(ray, filter) {
        println!(
            "ray hit {:?} at {:.3} m via {:?}",
            hit.node, hit.distance, hit.path
        );
    }
}
