// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout managers: containers that own the x/y placement of their children.
//!
//! Every manager works from each child's *extent*: the child's aligned content bounds after its
//! scale and rotation but before its translation. Extents do not depend on where the child was
//! placed last time, so placing the same children twice produces bit-identical positions.
//!
//! Managed containers measure as a `width x height` box hanging down and to the right of their
//! origin, `(0, -height)..(width, 0)`, except [`RectLayout`] which is centered on its origin.
//! Either size may be fixed or wrap the content. When a size is fixed, children that do not fit
//! are shrunk uniformly in x and y; they are never grown past the scale the user gave them.
//!
//! Containers built with [`LocalNode::container`](crate::LocalNode::container) are anchored by
//! their top-left corner, and items sit in the top-left corner of their slot unless told
//! otherwise. Pages are the exception: they center their content.

use std::collections::BTreeMap;

use glam::{DAffine3, DQuat, DVec3};
use kurbo::{Insets, Vec2};
use prism_bounds::Aabb;

use crate::alignment::Alignment;
use crate::scroll::ScrollView;

mod grid;
mod linear;
mod page;
mod rect;

/// How a node places its children.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Arrangement {
    /// Children keep their own positions.
    #[default]
    Free,
    /// Children stacked in a row or a column.
    Linear(LinearLayout),
    /// Children in a grid of cells.
    Grid(GridLayout),
    /// A single child in a centered frame.
    Rect(RectLayout),
    /// One child shown at a time.
    Page(PageLayout),
    /// A clipped viewport over a single content child.
    Scroll(ScrollView),
}

impl Arrangement {
    /// Whether this arrangement owns the x/y position of its children.
    pub fn is_managed(&self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Whether children hidden by their own [`NodeFlags::VISIBLE`](crate::NodeFlags::VISIBLE)
    /// flag are left out of placement instead of keeping their slot.
    pub fn skips_invisible(&self) -> bool {
        match self {
            Self::Linear(l) => l.skip_invisible,
            Self::Grid(g) => g.skip_invisible,
            Self::Free | Self::Rect(_) | Self::Page(_) | Self::Scroll(_) => false,
        }
    }

    /// Alignment given to a node holding this arrangement when none is set.
    pub fn default_alignment(&self) -> Alignment {
        match self {
            Self::Linear(_) | Self::Grid(_) | Self::Rect(_) | Self::Page(_) => Alignment::TOP_LEFT,
            Self::Free | Self::Scroll(_) => Alignment::CENTER_CENTER,
        }
    }

    /// Mutable `(width, height)` for arrangements with a configurable size.
    pub fn size_mut(&mut self) -> Option<(&mut Extent, &mut Extent)> {
        match self {
            Self::Linear(l) => Some((&mut l.width, &mut l.height)),
            Self::Grid(g) => Some((&mut g.width, &mut g.height)),
            Self::Rect(r) => Some((&mut r.width, &mut r.height)),
            Self::Page(p) => Some((&mut p.width, &mut p.height)),
            Self::Free | Self::Scroll(_) => None,
        }
    }

    /// Place `items`, or `None` for [`Arrangement::Free`].
    pub(crate) fn place(&self, items: &[Item]) -> Option<Placement> {
        match self {
            Self::Free => None,
            Self::Linear(l) => Some(linear::place(l, items)),
            Self::Grid(g) => Some(grid::place(g, items)),
            Self::Rect(r) => Some(rect::place(r, items)),
            Self::Page(p) => Some(page::place(p, items)),
            Self::Scroll(s) => Some(s.place(items)),
        }
    }
}

/// Stacking direction of a linear layout, or travel direction of a scroll view.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

/// One dimension of a managed container.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Extent {
    /// Size to the content, padding included.
    #[default]
    Wrap,
    /// Fixed size in meters.
    Fixed(f64),
}

impl Extent {
    /// Map the wire convention where `0` means wrap-content.
    pub fn from_meters(v: f64) -> Self {
        if v == 0.0 { Self::Wrap } else { Self::Fixed(v) }
    }

    /// Upper bound available to content; unbounded when wrapping.
    pub fn limit(self) -> f64 {
        match self {
            Self::Wrap => f64::INFINITY,
            Self::Fixed(v) => v,
        }
    }

    /// Final size given the content's size.
    pub fn resolve(self, content: f64) -> f64 {
        match self {
            Self::Wrap => content,
            Self::Fixed(v) => v,
        }
    }

    /// True for [`Extent::Fixed`].
    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

/// Per-item padding and alignment, with overrides for specific items.
///
/// Lists and pages key overrides by child index, counting children left out of placement.
/// Grids key them by `(column, row)` cell.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemLayout<K = usize> {
    /// Padding around every item.
    pub padding: Insets,
    /// Where an item sits within its slot.
    pub alignment: Alignment,
    /// Padding for specific items.
    pub padding_overrides: BTreeMap<K, Insets>,
    /// Alignment for specific items.
    pub alignment_overrides: BTreeMap<K, Alignment>,
}

/// No padding, items in the top-left corner of their slot.
impl<K> Default for ItemLayout<K> {
    fn default() -> Self {
        Self::aligned(Alignment::TOP_LEFT)
    }
}

impl<K> ItemLayout<K> {
    /// No padding or overrides, every item at `alignment`.
    pub fn aligned(alignment: Alignment) -> Self {
        Self {
            padding: Insets::ZERO,
            alignment,
            padding_overrides: BTreeMap::new(),
            alignment_overrides: BTreeMap::new(),
        }
    }
}

impl<K: Ord> ItemLayout<K> {
    /// Padding of the item at `key`.
    pub fn padding(&self, key: &K) -> Insets {
        self.padding_overrides
            .get(key)
            .copied()
            .unwrap_or(self.padding)
    }

    /// Alignment of the item at `key`.
    pub fn alignment(&self, key: &K) -> Alignment {
        self.alignment_overrides
            .get(key)
            .copied()
            .unwrap_or(self.alignment)
    }
}

/// Children stacked along one axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearLayout {
    /// Stacking direction.
    pub orientation: Orientation,
    /// Container width.
    pub width: Extent,
    /// Container height.
    pub height: Extent,
    /// Padding and alignment of items.
    pub items: ItemLayout,
    /// Leave invisible children out instead of reserving their space.
    pub skip_invisible: bool,
}

/// Children in a grid.
///
/// With only `rows` set the grid fills column by column; otherwise it fills row by row using
/// `columns` (a single row when neither is set). Column widths are the widest padded item in the
/// column and row heights the tallest padded item in the row. A fixed width or height rescales
/// the columns or rows proportionally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridLayout {
    /// Number of columns, `0` for automatic.
    pub columns: usize,
    /// Number of rows, `0` for automatic.
    pub rows: usize,
    /// Container width.
    pub width: Extent,
    /// Container height.
    pub height: Extent,
    /// Padding and alignment of items, overrides keyed by `(column, row)`.
    pub items: ItemLayout<(usize, usize)>,
    /// Leave invisible children out instead of reserving their cell.
    pub skip_invisible: bool,
}

/// A single child in a frame centered on the container's origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RectLayout {
    /// Frame width.
    pub width: Extent,
    /// Frame height.
    pub height: Extent,
    /// Padding and alignment of the child.
    pub items: ItemLayout,
}

/// Shows the child at `visible_page` and hides the others.
///
/// The container is a vertical list holding just that page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageLayout {
    /// Index of the child to show. Nothing is shown when it is out of range.
    pub visible_page: usize,
    /// Container width.
    pub width: Extent,
    /// Container height.
    pub height: Extent,
    /// Padding and alignment of pages, overrides keyed by child index.
    pub items: ItemLayout,
}

/// First page, wrapped, centered in its slot.
impl Default for PageLayout {
    fn default() -> Self {
        Self {
            visible_page: 0,
            width: Extent::Wrap,
            height: Extent::Wrap,
            items: ItemLayout::aligned(Alignment::CENTER_CENTER),
        }
    }
}

/// A child as seen by a layout manager.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Item {
    /// Index among the container's children.
    pub(crate) index: usize,
    /// Aligned content bounds of the child.
    pub(crate) aligned: Aabb,
    pub(crate) rotation: DQuat,
    /// User scale, before any shrinking.
    pub(crate) scale: DVec3,
}

impl Item {
    /// Extent of the child with x and y scale multiplied by `factor`.
    pub(crate) fn extent(&self, factor: f64) -> Aabb {
        let scale = self.scale * DVec3::new(factor, factor, 1.0);
        self.aligned
            .transformed(DAffine3::from_scale_rotation_translation(
                scale,
                self.rotation,
                DVec3::ZERO,
            ))
    }
}

/// Where a layout put one child.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Placed {
    pub(crate) index: usize,
    /// Child position in x and y.
    pub(crate) xy: Vec2,
    /// Uniform x/y shrink applied on top of the user scale.
    pub(crate) factor: f64,
}

/// Result of running a layout manager.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Placement {
    pub(crate) placed: Vec<Placed>,
    /// Indices of children the manager has no room for. They are hidden.
    pub(crate) overflow: Vec<usize>,
    /// Content bounds of the container.
    pub(crate) bounds: Aabb,
}

/// Position that puts the left edge of `ext` at `left` and its top edge at `top`.
pub(crate) fn place_at(ext: &Aabb, left: f64, top: f64) -> Vec2 {
    Vec2::new(left - ext.min.x, top - ext.max.y)
}

/// Uniform shrink needed for `ext` to fit `max_w x max_h`, never above `1`.
///
/// Axes with no extent put no constraint on the factor.
pub(crate) fn shrink_factor(ext: &Aabb, max_w: f64, max_h: f64) -> f64 {
    let fit = |size: f64, max: f64| {
        if size > 0.0 {
            max / size
        } else {
            f64::INFINITY
        }
    };
    let k = fit(ext.width(), max_w).min(fit(ext.height(), max_h));
    if k.is_finite() { k.clamp(0.0, 1.0) } else { 1.0 }
}

/// Depth range covered by `extents`, `(0, 0)` when there are none.
pub(crate) fn depth_range<'a>(extents: impl IntoIterator<Item = &'a Aabb>) -> (f64, f64) {
    extents
        .into_iter()
        .fold(None, |acc: Option<(f64, f64)>, e| {
            Some(acc.map_or((e.min.z, e.max.z), |(lo, hi)| {
                (lo.min(e.min.z), hi.max(e.max.z))
            }))
        })
        .unwrap_or((0.0, 0.0))
}

/// Box hanging down and right from the origin.
pub(crate) fn hanging_box(width: f64, height: f64, depth: (f64, f64)) -> Aabb {
    Aabb::new(
        DVec3::new(0.0, -height, depth.0),
        DVec3::new(width, 0.0, depth.1),
    )
}
