// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prism Layout: node layout and 3D clipping for spatial UIs, in meters.
//!
//! Every node in a spatial scene (buttons, text, images, lists, grids, scroll views, lines, and
//! the prisms that hold them) needs the same three things so that nested containers size and
//! position their children correctly:
//!
//! - **Bounds.** A node's content bounds come from its content (measured text, an image quad, a
//!   loaded mesh) or from the union of its visible children. An empty container is a zero-size box
//!   at the origin.
//! - **Alignment.** A named anchor such as `"top-left"` picks the point of the bounds that sits at
//!   the node's position. It is re-applied whenever the bounds change size.
//! - **Clipping.** Prisms and scroll views clip their subtree. Clip boxes are pushed down the tree
//!   into each node's own space; nodes entirely outside are hidden.
//!
//! On top of that, containers may own the placement of their children: see [`Arrangement`] for
//! linear, grid, rect, page, and scroll layouts.
//!
//! ## Model
//!
//! - [`Tree`] owns the nodes. Edits mark nodes dirty; [`Tree::commit`] (or the polling
//!   [`Tree::tick`]) measures, aligns, lays out, propagates clips, and refreshes the spatial index,
//!   then returns [`Damage`].
//! - [`LocalNode`] is what callers control: position, rotation, scale, [`Alignment`],
//!   [`Content`], [`Arrangement`], an optional clip, and [`NodeFlags`].
//! - [`Tree::apply_properties`] applies a JSON property map to a node.
//! - [`Tree::begin_load`] and [`Tree::complete_load`] cover content that arrives asynchronously.
//!
//! Layout is deterministic: committing twice with unchanged inputs yields bit-identical
//! positions. Nothing here fails fatally. Stale [`NodeId`]s are ignored by setters, bad
//! properties keep their previous value, and the reason is logged with `tracing`.
//!
//! ## Spaces
//!
//! A node's *content space* is where its content bounds and its children live. The alignment
//! translates content space so the anchor lands on the node's origin, and the node's scale,
//! rotation, and position then map that into the parent's content space:
//!
//! `to_parent = translate(position) * rotate(rotation) * scale(scale) * translate(content_offset)`
//!
//! Clip boxes are kept in content space too. A clip inherited from a parent is mapped through the
//! inverse of `to_parent`, which grows it conservatively under rotation.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use prism_bounds::{Aabb, Ray};
//! use prism_layout::{Arrangement, LinearLayout, LocalNode, NodeFlags, QueryFilter, Tree};
//!
//! let mut tree = Tree::new();
//!
//! // A 1 m cube that clips everything inside it. Only its content should be pickable.
//! let prism = tree.insert(None, LocalNode::prism(DVec3::splat(1.0)));
//! tree.set_flags(prism, NodeFlags::VISIBLE);
//!
//! // A vertical list of two buttons.
//! let list = tree.insert(
//!     Some(prism),
//!     LocalNode::container(Arrangement::Linear(LinearLayout::default())),
//! );
//! let button = |w, h| LocalNode::intrinsic(Aabb::new(DVec3::ZERO, DVec3::new(w, h, 0.0)));
//! let ok = tree.insert(Some(list), button(0.2, 0.1));
//! let _cancel = tree.insert(Some(list), button(0.4, 0.1));
//! let _ = tree.commit();
//!
//! // The list wraps its children and hangs from its top-left corner.
//! let b = tree.aligned_bounds(list).unwrap();
//! assert_eq!(b.size(), DVec3::new(0.4, 0.2, 0.0));
//! assert_eq!((b.min.x, b.max.y), (0.0, 0.0));
//!
//! // The first button is on top. Ties in ray distance go to the newer node, so the button
//! // wins over the list that contains it.
//! let filter = QueryFilter { visible_only: true, pickable_only: true };
//! let ray = Ray::new(DVec3::new(0.1, -0.05, 1.0), DVec3::NEG_Z);
//! let hit = tree.hit_test_ray(ray, filter).unwrap();
//! assert_eq!(hit.node, ok);
//! assert_eq!(hit.path, vec![prism, list, ok]);
//! ```

pub mod bounds;
pub mod clip;
pub mod layout;

mod alignment;
mod config;
mod damage;
mod error;
mod load;
mod props;
mod scroll;
mod tree;
mod types;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use config::LayoutConfig;
pub use damage::Damage;
pub use error::{ConfigError, LoadError, ParseAlignmentError, PropertyError};
pub use layout::{
    Arrangement, Extent, GridLayout, ItemLayout, LinearLayout, Orientation, PageLayout,
    RectLayout,
};
pub use load::LoadTicket;
pub use scroll::ScrollView;
pub use tree::{Hit, QueryFilter, RayHit, Tree};
pub use types::{Content, LineSegment, LocalNode, NodeFlags, NodeId};
