// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row and column stacking.

use kurbo::Insets;
use prism_bounds::Aabb;

use super::{
    Extent, Item, ItemLayout, LinearLayout, Orientation, Placed, Placement, depth_range,
    hanging_box, place_at, shrink_factor,
};

pub(crate) fn place(layout: &LinearLayout, items: &[Item]) -> Placement {
    stack(
        layout.orientation,
        layout.width,
        layout.height,
        &layout.items,
        items,
    )
}

/// Stack `items` along `orientation` in a `width x height` box.
pub(super) fn stack(
    orientation: Orientation,
    width: Extent,
    height: Extent,
    cfg: &ItemLayout,
    items: &[Item],
) -> Placement {
    let pads: Vec<Insets> = items.iter().map(|it| cfg.padding(&it.index)).collect();
    let user: Vec<Aabb> = items.iter().map(|it| it.extent(1.0)).collect();

    // A fixed size along the stacking axis is shared in proportion to each item's size.
    let (main_sum, main_pad_sum) = match orientation {
        Orientation::Vertical => (
            user.iter().map(Aabb::height).sum::<f64>(),
            pads.iter().map(|p| p.y_value()).sum::<f64>(),
        ),
        Orientation::Horizontal => (
            user.iter().map(Aabb::width).sum::<f64>(),
            pads.iter().map(|p| p.x_value()).sum::<f64>(),
        ),
    };
    // Largest size an item may take along the stacking axis.
    let main_limit = |size: f64, main: Extent| match main {
        Extent::Wrap => f64::INFINITY,
        Extent::Fixed(_) if main_sum <= 0.0 => f64::INFINITY,
        Extent::Fixed(v) => size * (v - main_pad_sum) / main_sum,
    };

    let mut factors = Vec::with_capacity(items.len());
    for (u, pad) in user.iter().zip(&pads) {
        let (max_w, max_h) = match orientation {
            Orientation::Vertical => (
                width.limit() - pad.x_value(),
                main_limit(u.height(), height),
            ),
            Orientation::Horizontal => (
                main_limit(u.width(), width),
                height.limit() - pad.y_value(),
            ),
        };
        factors.push(shrink_factor(u, max_w, max_h));
    }
    let extents: Vec<Aabb> = items
        .iter()
        .zip(&factors)
        .map(|(it, f)| it.extent(*f))
        .collect();

    let padded = |i: usize| {
        (
            extents[i].width() + pads[i].x_value(),
            extents[i].height() + pads[i].y_value(),
        )
    };
    let (content_w, content_h) = match orientation {
        Orientation::Vertical => (0..items.len()).fold((0.0_f64, 0.0), |(w, h), i| {
            let (pw, ph) = padded(i);
            (w.max(pw), h + ph)
        }),
        Orientation::Horizontal => (0..items.len()).fold((0.0, 0.0_f64), |(w, h), i| {
            let (pw, ph) = padded(i);
            (w + pw, h.max(ph))
        }),
    };
    let limit_w = width.resolve(content_w);
    let limit_h = height.resolve(content_h);

    let mut placed = Vec::with_capacity(items.len());
    let mut cursor = 0.0;
    for (i, it) in items.iter().enumerate() {
        let a = cfg.alignment(&it.index).fraction();
        let pad = pads[i];
        let (pw, ph) = padded(i);
        let (left, top) = match orientation {
            Orientation::Vertical => {
                let left = pad.x0 + a.x * (limit_w - pw);
                let top = -(cursor + pad.y0 + (1.0 - a.y) * (limit_h - content_h));
                cursor += ph;
                (left, top)
            }
            Orientation::Horizontal => {
                let left = cursor + pad.x0 + a.x * (limit_w - content_w);
                let top = -(pad.y0 + (1.0 - a.y) * (limit_h - ph));
                cursor += pw;
                (left, top)
            }
        };
        placed.push(Placed {
            index: it.index,
            xy: place_at(&extents[i], left, top),
            factor: factors[i],
        });
    }

    Placement {
        placed,
        overflow: Vec::new(),
        bounds: hanging_box(limit_w, limit_h, depth_range(&extents)),
    }
}
