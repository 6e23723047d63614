// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip box propagation.
//!
//! A clip box lives in the content space of the node it belongs to. Going down one level, the
//! parent's box is mapped through the inverse of the child's transform (a conservative AABB when
//! the child is rotated) and then narrowed by the child's own clip. A node is clipped out when
//! its clip box does not overlap its content bounds at all. Touching boxes still overlap.

use glam::{DAffine3, DVec3};
use kurbo::Rect;
use prism_bounds::Aabb;

use crate::types::LineSegment;

/// Clip box of a child, in the child's content space.
///
/// `to_parent` maps the child's content space into the parent's content space. `own` is the
/// child's own clip, already in its content space. `None` means unclipped.
pub fn propagate(parent: Option<Aabb>, to_parent: DAffine3, own: Option<Aabb>) -> Option<Aabb> {
    let inherited = parent.map(|clip| {
        if clip.is_empty() || to_parent.matrix3.determinant().abs() <= f64::EPSILON {
            Aabb::EMPTY
        } else {
            clip.transformed(to_parent.inverse())
        }
    });
    match (inherited, own) {
        (Some(a), Some(b)) => Some(a.intersect(&b)),
        (a, b) => a.or(b),
    }
}

/// Whether content with `bounds` is entirely outside `clip`.
pub fn is_clipped_out(clip: Option<&Aabb>, bounds: &Aabb) -> bool {
    clip.is_some_and(|c| c.intersect(bounds).is_empty())
}

/// Part of `bounds` inside `clip`.
pub fn visible_part(clip: Option<&Aabb>, bounds: &Aabb) -> Option<Aabb> {
    match clip {
        Some(c) => bounds.intersection(c),
        None => Some(*bounds),
    }
}

/// Normalized clip window for a quad covering `bounds`, as used by clipping materials.
///
/// The origin is the bottom-center of `bounds`: x spans `[-0.5, 0.5]` and y spans `[0, 1]`.
/// Flat axes are left unclipped. A clip that misses `bounds` yields a zero-area rect.
pub fn material_clip(bounds: &Aabb, clip: &Aabb) -> Rect {
    let (w, h) = (bounds.width(), bounds.height());
    let cx = bounds.center().x;
    let (x0, x1) = if w > 0.0 {
        (
            ((clip.min.x - cx) / w).clamp(-0.5, 0.5),
            ((clip.max.x - cx) / w).clamp(-0.5, 0.5),
        )
    } else {
        (-0.5, 0.5)
    };
    let (y0, y1) = if h > 0.0 {
        (
            ((clip.min.y - bounds.min.y) / h).clamp(0.0, 1.0),
            ((clip.max.y - bounds.min.y) / h).clamp(0.0, 1.0),
        )
    } else {
        (0.0, 1.0)
    };
    Rect::new(x0, y0, x1.max(x0), y1.max(y0))
}

/// Consecutive segments through `points`, each cut to `clip`. Segments fully outside are dropped.
pub fn clip_polyline(points: &[DVec3], clip: Option<&Aabb>, thickness: f64) -> Vec<LineSegment> {
    points
        .windows(2)
        .filter_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            let (start, end) = match clip {
                Some(c) => c.clip_segment(a, b)?,
                None => (a, b),
            };
            Some(LineSegment {
                start,
                end,
                thickness,
            })
        })
        .collect()
}
