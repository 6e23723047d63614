// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll views: a clipped viewport over one content child.
//!
//! The content's top-left corner starts at the view's top-left corner. Scrolling moves the
//! content by `value * max(0, content - view)` along the scroll direction: up for vertical
//! views, left for horizontal ones. At `value = 1` the content's far edge meets the view's far
//! edge. Content smaller than the view does not move. A fixed [`ScrollView::offset`] is added on
//! top of the scrolled position.

use glam::DVec3;
use prism_bounds::Aabb;

use crate::layout::{Item, Orientation, Placed, Placement, place_at};

/// Scroll view settings.
///
/// The default is a vertical view over a 1 m cube centered on the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollView {
    /// Visible region in the scroll view's content space. Also its clip box and its bounds.
    pub bounds: Aabb,
    /// Direction the content travels in.
    pub direction: Orientation,
    /// Scroll position in `[0, 1]`.
    pub value: f64,
    /// Extra translation of the content child.
    pub offset: DVec3,
}

impl Default for ScrollView {
    fn default() -> Self {
        Self::new(
            Aabb::from_center_size(DVec3::ZERO, DVec3::ONE),
            Orientation::Vertical,
        )
    }
}

impl ScrollView {
    /// A scroll view over `bounds` scrolling in `direction`.
    pub fn new(bounds: Aabb, direction: Orientation) -> Self {
        Self {
            bounds,
            direction,
            value: 0.0,
            offset: DVec3::ZERO,
        }
    }

    /// How far the content can travel, given its extent.
    pub fn travel_range(&self, content: &Aabb) -> f64 {
        let overflow = match self.direction {
            Orientation::Vertical => content.height() - self.bounds.height(),
            Orientation::Horizontal => content.width() - self.bounds.width(),
        };
        overflow.max(0.0)
    }

    pub(crate) fn place(&self, items: &[Item]) -> Placement {
        let Some((first, rest)) = items.split_first() else {
            return Placement {
                bounds: self.bounds,
                ..Placement::default()
            };
        };
        let ext = first.extent(1.0);
        let travel = self.value.clamp(0.0, 1.0) * self.travel_range(&ext);
        let mut left = self.bounds.min.x + self.offset.x;
        let mut top = self.bounds.max.y + self.offset.y;
        match self.direction {
            Orientation::Vertical => top += travel,
            Orientation::Horizontal => left -= travel,
        }
        Placement {
            placed: vec![Placed {
                index: first.index,
                xy: place_at(&ext, left, top),
                factor: 1.0,
            }],
            overflow: rest.iter().map(|it| it.index).collect(),
            bounds: self.bounds,
        }
    }
}

/// View box of `size` centered on the origin.
impl From<DVec3> for ScrollView {
    fn from(size: DVec3) -> Self {
        Self::new(Aabb::from_center_size(DVec3::ZERO, size), Orientation::Vertical)
    }
}
