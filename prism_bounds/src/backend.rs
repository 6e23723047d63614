// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use alloc::boxed::Box;

use crate::ray::Ray;
use crate::types::Aabb;
use glam::DVec3;

/// Spatial backend abstraction used by `IndexGeneric`.
pub trait Backend {
    /// Insert a new slot into the spatial structure.
    fn insert(&mut self, slot: usize, aabb: Aabb);

    /// Update an existing slot's AABB.
    fn update(&mut self, slot: usize, aabb: Aabb);

    /// Remove a slot from the spatial structure.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Query slots whose AABB contains the point.
    fn query_point<'a>(&'a self, p: DVec3) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Query slots whose AABB intersects the box.
    fn query_box<'a>(&'a self, aabb: Aabb) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Query slots whose AABB is hit by the ray, with the entry distance along the ray.
    fn query_ray<'a>(&'a self, ray: Ray) -> Box<dyn Iterator<Item = (usize, f64)> + 'a>;
}
