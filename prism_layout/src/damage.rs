// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage reported by [`Tree::commit`](crate::Tree::commit).

use prism_bounds::Aabb;

use crate::types::NodeId;

/// A batched set of changes derived from [`Tree::commit`](crate::Tree::commit).
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// World-space boxes that should be redrawn: old and new bounds of every node that moved,
    /// resized, appeared, or was clipped out.
    pub dirty_boxes: Vec<Aabb>,
    /// Nodes whose world bounds, clip, or visibility changed, in tree order.
    pub changed: Vec<NodeId>,
}

impl Damage {
    /// True if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.dirty_boxes.is_empty() && self.changed.is_empty()
    }

    /// Returns the union of all dirty boxes.
    pub fn union_box(&self) -> Option<Aabb> {
        let mut it = self.dirty_boxes.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, b| acc.union(&b)))
    }
}
