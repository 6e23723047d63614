// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use glam::{DAffine3, DVec3};

/// Default tolerance used by [`Aabb::approx_eq`] callers that have no better value.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Axis-aligned bounding box in 3D, in meters.
///
/// `min` is the left-bottom-far corner and `max` the right-top-near corner (y up).
///
/// A box with `min == max` is a valid zero-size box (a point). A box is *empty* only when it is
/// inverted on at least one axis, which is what [`Aabb::intersect`] yields for disjoint boxes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Aabb {
    /// Zero-size box at the origin.
    pub const ZERO: Self = Self {
        min: DVec3::ZERO,
        max: DVec3::ZERO,
    };

    /// Box that contains nothing: `min` is `+inf` and `max` is `-inf` on every axis.
    ///
    /// It is the identity for [`Aabb::union`] and absorbing for [`Aabb::intersect`].
    pub const EMPTY: Self = Self {
        min: DVec3::INFINITY,
        max: DVec3::NEG_INFINITY,
    };

    /// Create a new AABB from min/max corners.
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at `center` with full extents `size`.
    pub fn from_center_size(center: DVec3, size: DVec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing all `points`, or `None` if there are none.
    pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        Some(it.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    /// Full extents of the box. Negative on inverted axes.
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Extent along x.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along y.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Extent along z.
    pub fn depth(&self) -> f64 {
        self.max.z - self.min.z
    }

    /// Center point.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns a new box translated by `offset`.
    #[must_use]
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Returns a new box with both corners scaled component-wise by `scale`.
    ///
    /// Negative scale factors swap the affected corners so the result stays well formed.
    #[must_use]
    pub fn scaled(&self, scale: DVec3) -> Self {
        let a = self.min * scale;
        let b = self.max * scale;
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Component-wise intersection. Inverted (see [`Aabb::is_empty`]) when the boxes are disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Intersection, or `None` when the boxes do not overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let i = self.intersect(other);
        (!i.is_empty()).then_some(i)
    }

    /// True if `min > max` on any axis. Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Whether the point lies inside or on the boundary.
    pub fn contains_point(&self, p: DVec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Compares corners with an absolute tolerance of `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.min.abs_diff_eq(other.min, epsilon) && self.max.abs_diff_eq(other.max, epsilon)
    }

    /// Conservative AABB of the box after transforming all 8 corners by `tf`.
    #[must_use]
    pub fn transformed(&self, tf: DAffine3) -> Self {
        let corners = self.corners().map(|c| tf.transform_point3(c));
        // Eight corners are always present.
        Self::from_points(corners).unwrap_or(Self::ZERO)
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(b.x, b.y, b.z),
        ]
    }

    /// Surface area. Zero for empty boxes. Used as the SAH metric.
    pub fn surface_area(&self) -> f64 {
        let s = self.size().max(DVec3::ZERO);
        2.0 * (s.x * s.y + s.y * s.z + s.z * s.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;

    fn v(x: f64, y: f64, z: f64) -> DVec3 {
        DVec3::new(x, y, z)
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = Aabb::new(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0));
        let b = Aabb::new(v(2.0, 0.0, 0.0), v(3.0, 1.0, 1.0));
        assert!(a.intersect(&b).is_empty());
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn touching_boxes_intersect_in_a_face() {
        let a = Aabb::new(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0));
        let b = Aabb::new(v(1.0, 0.0, 0.0), v(2.0, 1.0, 1.0));
        let i = a.intersection(&b).expect("shared face");
        assert_eq!(i.width(), 0.0);
    }

    #[test]
    fn zero_box_is_not_empty() {
        assert!(!Aabb::ZERO.is_empty());
        assert_eq!(Aabb::default(), Aabb::ZERO);
    }

    #[test]
    fn empty_is_union_identity_and_absorbs_intersection() {
        let a = Aabb::new(v(-1.0, 0.0, 0.0), v(0.0, 1.0, 2.0));
        assert!(Aabb::EMPTY.is_empty());
        assert_eq!(Aabb::EMPTY.union(&a), a);
        assert!(Aabb::EMPTY.intersect(&a).is_empty());
    }

    #[test]
    fn union_and_translate() {
        let a = Aabb::new(v(-1.0, 0.0, 0.0), v(0.0, 1.0, 0.0));
        let b = a.translated(v(2.0, 0.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, v(-1.0, 0.0, 0.0));
        assert_eq!(u.max, v(2.0, 1.0, 0.5));
        assert!(u.contains(&a) && u.contains(&b));
    }

    #[test]
    fn negative_scale_keeps_box_well_formed() {
        let a = Aabb::new(v(1.0, 2.0, 0.0), v(3.0, 4.0, 0.0));
        let s = a.scaled(v(-1.0, 0.5, 1.0));
        assert_eq!(s.min, v(-3.0, 1.0, 0.0));
        assert_eq!(s.max, v(-1.0, 2.0, 0.0));
    }

    #[test]
    fn approx_eq_tolerates_small_noise() {
        let a = Aabb::new(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0));
        let b = a.translated(v(1e-7, -1e-7, 0.0));
        assert!(a.approx_eq(&b, DEFAULT_EPSILON));
        assert!(!a.approx_eq(&a.translated(v(1e-3, 0.0, 0.0)), DEFAULT_EPSILON));
    }

    #[test]
    fn rotated_box_expands() {
        let a = Aabb::from_center_size(DVec3::ZERO, v(1.0, 1.0, 0.0));
        let tf = DAffine3::from_quat(DQuat::from_rotation_z(core::f64::consts::FRAC_PI_4));
        let r = a.transformed(tf);
        let half_diag = core::f64::consts::SQRT_2 * 0.5;
        assert!((r.max.x - half_diag).abs() < 1e-9);
        assert!((r.min.y + half_diag).abs() < 1e-9);
    }

    #[test]
    fn from_points_empty_is_none() {
        assert_eq!(Aabb::from_points(core::iter::empty()), None);
        let b = Aabb::from_points([v(1.0, -1.0, 0.0), v(-1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(b.min, v(-1.0, -1.0, 0.0));
        assert_eq!(b.max, v(1.0, 2.0, 3.0));
    }
}
