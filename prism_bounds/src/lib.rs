// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prism Bounds: 3D axis-aligned bounding boxes and a spatial index over them.
//!
//! This crate is the geometric floor of Prism Layout.
//!
//! - [`Aabb`] is a box in meters with union, intersection, emptiness, and transform helpers.
//! - [`Ray`] plus [`Aabb::ray_intersection`] and [`Aabb::clip_segment`] cover picking and
//!   polyline clipping.
//! - [`Index`] stores boxes with user payloads. Updates are batched with [`Index::commit`],
//!   which returns coarse [`Damage`] (added/removed/moved boxes).
//!
//! An empty box is one that is inverted on some axis (`min > max`). A zero-size box is a point
//! and is *not* empty. This is the rule clipping relies on: disjoint boxes intersect to an empty
//! box, touching boxes intersect to a flat one.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use prism_bounds::{Aabb, Index, Ray};
//!
//! let mut idx: Index<u32> = Index::new();
//! let k1 = idx.insert(Aabb::new(DVec3::ZERO, DVec3::splat(1.0)), 1);
//! let _k2 = idx.insert(Aabb::new(DVec3::splat(0.5), DVec3::splat(2.0)), 2);
//! let _damage0 = idx.commit();
//!
//! // Move the first box away and commit.
//! idx.update(k1, Aabb::new(DVec3::new(5.0, 0.0, 0.0), DVec3::new(6.0, 1.0, 1.0)));
//! let damage = idx.commit();
//! assert_eq!(damage.moved.len(), 1);
//!
//! // Only the second box still covers this point.
//! let hits: Vec<_> = idx.query_point(DVec3::splat(0.75)).collect();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].1, 2);
//!
//! // Cast a ray along -z through both boxes' x/y footprint.
//! let ray = Ray::new(DVec3::new(5.5, 0.5, 10.0), DVec3::NEG_Z);
//! let hit = idx.query_ray(ray).next().map(|(_, p, t)| (p, t));
//! assert_eq!(hit, Some((1, 9.0)));
//! ```
//!
//! ## Choosing a backend
//!
//! - [`FlatVec`] (default): linear scans. Good for the small sets a single panel produces.
//! - [`Bvh`]: binary hierarchy with SAH-like splits. Use [`Index::with_bvh`] when a scene holds
//!   many pickable nodes and queries dominate.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs. Comparisons with tolerance take the epsilon explicitly; see
//! [`DEFAULT_EPSILON`].

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod damage;
pub mod index;
pub mod ray;
pub mod types;

pub use backend::Backend;
pub use backends::bvh::Bvh;
pub use backends::flatvec::FlatVec;
pub use damage::Damage;
pub use index::{Index, IndexGeneric, Key};
pub use ray::Ray;
pub use types::{Aabb, DEFAULT_EPSILON};
