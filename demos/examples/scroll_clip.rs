// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scroll view over a long list: which rows are rendered, and how much of the edge rows shows.
//!
//! Run:
//! - `cargo run -p prism_demos --example scroll_clip`

use glam::DVec3;
use prism_bounds::Aabb;
use prism_layout::{
    Alignment, Arrangement, ItemLayout, LinearLayout, LocalNode, QueryFilter, ScrollView, Tree,
};

const ROW_H: f64 = 0.08;
const VIEW: f64 = 0.3;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut tree = Tree::new();
    let prism = tree.insert(None, LocalNode::prism(DVec3::splat(1.0)));
    let view = ScrollView::from(DVec3::new(0.5, VIEW, 0.1));
    let scroll = tree.insert(
        Some(prism),
        LocalNode::container(Arrangement::Scroll(view.clone())),
    );
    let list = tree.insert(
        Some(scroll),
        LocalNode::container(Arrangement::Linear(LinearLayout {
            items: ItemLayout {
                alignment: Alignment::TOP_LEFT,
                ..ItemLayout::default()
            },
            ..LinearLayout::default()
        })),
    );
    let rows: Vec<_> = (0..20)
        .map(|_| {
            tree.insert(
                Some(list),
                LocalNode::intrinsic(Aabb::new(DVec3::ZERO, DVec3::new(0.5, ROW_H, 0.0))),
            )
        })
        .collect();
    let _ = tree.commit();

    let filter = QueryFilter {
        visible_only: true,
        pickable_only: false,
    };
    for value in [0.0, 0.1, 0.5, 1.0] {
        tree.set_arrangement(
            scroll,
            Arrangement::Scroll(ScrollView {
                value,
                ..view.clone()
            }),
        );
        let damage = tree.commit();
        let rendered: Vec<_> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| tree.is_rendered(**r))
            .map(|(i, _)| i)
            .collect();
        println!(
            "value={value:.1}: rows {rendered:?} rendered, {} nodes changed",
            damage.changed.len()
        );
        for &i in [rendered.first(), rendered.last()].into_iter().flatten() {
            if let Some(mc) = tree.material_clip(rows[i]) {
                println!(
                    "    row {i:>2} material clip: x[{:+.2}, {:+.2}] y[{:.2}, {:.2}]",
                    mc.x0, mc.x1, mc.y0, mc.y1
                );
            }
        }

        // The spatial index only holds what is left after clipping.
        let everything = Aabb::from_center_size(DVec3::ZERO, DVec3::splat(10.0));
        let indexed = tree.intersect_box(everything, filter).count();
        println!("    {indexed} nodes in the spatial index");
    }
}
