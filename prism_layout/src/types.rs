// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the node tree: identifiers, flags, content, and local node data.

use glam::{DQuat, DVec3};
use prism_bounds::Aabb;

use crate::alignment::Alignment;
use crate::layout::Arrangement;

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// A `NodeId` is *newer* than another when it has a higher generation, or the same generation and
/// a higher slot. This order only breaks ties in [hit testing](crate::Tree::hit_test_ray).
///
/// Stale ids passed to setters are ignored; getters return `None` for them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn is_newer_than(self, other: Self) -> bool {
        (self.1 > other.1) || (self.1 == other.1 && self.0 > other.0)
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible. Clearing it hides the whole subtree and removes the node from its
        /// parent's bounds.
        const VISIBLE  = 0b0000_0001;
        /// Node is pickable (participates in hit testing).
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Where a node's content bounds come from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Content {
    /// Derived from the children, as decided by the node's [`Arrangement`].
    #[default]
    Children,
    /// Measured content such as text metrics, an image quad, or mesh bounds.
    Intrinsic(Aabb),
    /// An asynchronous load is in flight. Measures as a zero-size box at the origin.
    Pending,
    /// Line strip through the points. Alignment does not apply; segments are clipped.
    Polyline(Vec<DVec3>),
}

/// A clipped line segment of a [`Content::Polyline`] node, in the node's content space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineSegment {
    /// Start point.
    pub start: DVec3,
    /// End point.
    pub end: DVec3,
    /// Rendered thickness in meters.
    pub thickness: f64,
}

/// User-facing data for a node.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Position in the parent's content space. Layout-managed children only keep `z`.
    pub position: DVec3,
    /// Rotation relative to the parent.
    pub rotation: DQuat,
    /// Scale relative to the parent. Layouts may shrink x and y uniformly to fit.
    pub scale: DVec3,
    /// Pivot of the content bounds that sits at `position`.
    pub alignment: Alignment,
    /// Content bounds source.
    pub content: Content,
    /// How children are placed.
    pub arrangement: Arrangement,
    /// Optional clip box in this node's content space, applied to the node and its subtree.
    pub local_clip: Option<Aabb>,
    /// Visibility and picking flags.
    pub flags: NodeFlags,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
            alignment: Alignment::default(),
            content: Content::Children,
            arrangement: Arrangement::Free,
            local_clip: None,
            flags: NodeFlags::default(),
        }
    }
}

impl LocalNode {
    /// A leaf with measured content.
    pub fn intrinsic(bounds: Aabb) -> Self {
        Self {
            content: Content::Intrinsic(bounds),
            ..Self::default()
        }
    }

    /// A prism: a volume of `size` meters centered on its origin that clips everything inside.
    pub fn prism(size: DVec3) -> Self {
        let volume = Aabb::from_center_size(DVec3::ZERO, size);
        Self {
            content: Content::Intrinsic(volume),
            local_clip: Some(volume),
            ..Self::default()
        }
    }

    /// A container whose children are placed by `arrangement`, anchored at the arrangement's
    /// [default alignment](Arrangement::default_alignment).
    pub fn container(arrangement: Arrangement) -> Self {
        Self {
            alignment: arrangement.default_alignment(),
            arrangement,
            ..Self::default()
        }
    }

    /// Builder-style position setter.
    #[must_use]
    pub fn at(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Builder-style alignment setter.
    #[must_use]
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}
