// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single child in a centered frame.

use glam::DVec3;
use prism_bounds::Aabb;

use super::{Item, Placed, Placement, RectLayout, place_at, shrink_factor};

pub(crate) fn place(layout: &RectLayout, items: &[Item]) -> Placement {
    let Some((first, rest)) = items.split_first() else {
        let w = layout.width.resolve(0.0);
        let h = layout.height.resolve(0.0);
        return Placement {
            bounds: Aabb::from_center_size(DVec3::ZERO, DVec3::new(w, h, 0.0)),
            ..Placement::default()
        };
    };

    let pad = layout.items.padding(&first.index);
    let user = first.extent(1.0);
    let factor = shrink_factor(
        &user,
        layout.width.limit() - pad.x_value(),
        layout.height.limit() - pad.y_value(),
    );
    let ext = first.extent(factor);
    let (pw, ph) = (ext.width() + pad.x_value(), ext.height() + pad.y_value());
    let w = layout.width.resolve(pw);
    let h = layout.height.resolve(ph);

    let a = layout.items.alignment(&first.index).fraction();
    let left = -0.5 * w + pad.x0 + a.x * (w - pw);
    let top = 0.5 * h - pad.y0 - (1.0 - a.y) * (h - ph);

    Placement {
        placed: vec![Placed {
            index: first.index,
            xy: place_at(&ext, left, top),
            factor,
        }],
        overflow: rest.iter().map(|it| it.index).collect(),
        bounds: Aabb::new(
            DVec3::new(-0.5 * w, -0.5 * h, ext.min.z),
            DVec3::new(0.5 * w, 0.5 * h, ext.max.z),
        ),
    }
}
