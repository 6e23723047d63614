// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driving a tree from JSON property maps, with an asynchronous model load and a polling tick.
//!
//! Run:
//! - `RUST_LOG=prism_layout=debug cargo run -p prism_demos --example json_properties`

use glam::DVec3;
use prism_bounds::Aabb;
use prism_layout::{Arrangement, LayoutConfig, LinearLayout, LocalNode, PageLayout, Tree};
use serde_json::{Map, Value, json};

fn props(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = LayoutConfig::from_toml_str("layout_interval = 0.1\nline_thickness = 0.004\n")
        .unwrap_or_default();
    let mut tree = Tree::with_config(config);

    let prism = tree.insert(None, LocalNode::prism(DVec3::splat(1.0)));
    let column = tree.insert(
        Some(prism),
        LocalNode::container(Arrangement::Linear(LinearLayout::default())),
    );
    let applied = tree.apply_properties(
        column,
        &props(json!({
            "width": 0.6,
            "defaultItemPadding": [0.01, 0.02, 0.01, 0.02],
            "defaultItemAlignment": "center-left",
            "itemAlignment": [{ "index": 1, "alignment": "center-right" }],
            "localPosition": [0.0, 0.2, 0.0],
            // Not a layout property; logged at debug level and ignored.
            "textSize": 0.05,
        })),
    );
    println!("column: {applied} properties applied");

    let model = tree.insert(Some(column), LocalNode::default());
    let ticket = tree.begin_load(model);
    let line = tree.insert(Some(column), LocalNode::default());
    tree.apply_properties(
        line,
        &props(json!({ "points": [[0.0, 0.0, 0.0], [0.8, 0.1, 0.0], [0.9, -0.1, 0.0]] })),
    );

    // Poll at 30 Hz; layout runs every `layout_interval` seconds while something changed.
    for frame in 0..12 {
        if frame == 5
            && let Some(ticket) = ticket
        {
            let mesh = Aabb::from_center_size(DVec3::ZERO, DVec3::new(0.3, 0.2, 0.1));
            if let Err(err) = tree.complete_load(ticket, mesh) {
                println!("load discarded: {err}");
            }
        }
        if let Some(damage) = tree.tick(1.0 / 30.0) {
            println!(
                "frame {frame:>2}: layout ran, {} nodes changed",
                damage.changed.len()
            );
        }
    }

    println!("model bounds: {:?}", tree.bounds(model));
    println!("column size: {:?}", tree.aligned_bounds(column).map(|b| b.size()));
    for (i, s) in tree.line_segments(line).iter().enumerate() {
        println!(
            "segment {i}: {:?} -> {:?} ({} m thick)",
            s.start, s.end, s.thickness
        );
    }

    // Pages: only the selected child is shown.
    let book = tree.insert(
        Some(prism),
        LocalNode::container(Arrangement::Page(PageLayout::default())),
    );
    let pages: Vec<_> = [0.2, 0.4, 0.3]
        .into_iter()
        .map(|w| {
            tree.insert(
                Some(book),
                LocalNode::intrinsic(Aabb::new(DVec3::ZERO, DVec3::new(w, 0.1, 0.0))),
            )
        })
        .collect();
    for page in 0..3 {
        tree.apply_properties(book, &props(json!({ "visiblePage": page })));
        let _ = tree.commit();
        let shown: Vec<_> = pages.iter().map(|p| tree.is_visible(*p)).collect();
        println!(
            "page {page}: visible {shown:?}, book width {:?}",
            tree.content_bounds(book).map(|b| b.width())
        );
    }

    // A malformed update keeps the previous value.
    let applied = tree.apply_properties(column, &props(json!({ "width": "wide" })));
    println!("malformed width: {applied} properties applied");
}
