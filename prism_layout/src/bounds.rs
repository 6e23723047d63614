// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content bounds helpers.

use glam::{DAffine3, DQuat, DVec3};
use prism_bounds::Aabb;

/// Union of `boxes`, or a zero-size box at the origin when there are none.
///
/// Adding a box never shrinks the result.
pub fn union_or_zero<I: IntoIterator<Item = Aabb>>(boxes: I) -> Aabb {
    let mut it = boxes.into_iter();
    match it.next() {
        Some(first) => it.fold(first, |acc, b| acc.union(&b)),
        None => Aabb::ZERO,
    }
}

/// Bounds of a line strip, a zero-size box at the origin when it has no points.
pub fn polyline_bounds(points: &[DVec3]) -> Aabb {
    Aabb::from_points(points.iter().copied()).unwrap_or(Aabb::ZERO)
}

/// Transform from a node's aligned space into its parent's content space.
pub fn node_transform(position: DVec3, rotation: DQuat, scale: DVec3) -> DAffine3 {
    DAffine3::from_scale_rotation_translation(scale, rotation, position)
}
