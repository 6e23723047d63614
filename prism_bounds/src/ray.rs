// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rays, ray-box intersection, and line segment clipping against boxes.

use glam::DVec3;

use crate::types::Aabb;

/// A half-line `origin + t * dir` for `t >= 0`. `dir` need not be normalized.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: DVec3,
    /// Direction.
    pub dir: DVec3,
}

impl Ray {
    /// Create a new ray.
    pub const fn new(origin: DVec3, dir: DVec3) -> Self {
        Self { origin, dir }
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir * t
    }
}

impl Aabb {
    /// Slab test. Returns the smallest `t >= 0` at which the ray is inside the box.
    ///
    /// A ray starting inside the box hits at `t = 0`.
    pub fn ray_intersection(&self, ray: &Ray) -> Option<f64> {
        let (t0, _) = self.slab_range(ray.origin, ray.dir, 0.0, f64::INFINITY)?;
        Some(t0)
    }

    /// Clip the segment `a..b` to this box (Liang-Barsky).
    ///
    /// Returns the part of the segment inside the box, or `None` if the segment misses it.
    /// A segment fully inside is returned unchanged.
    pub fn clip_segment(&self, a: DVec3, b: DVec3) -> Option<(DVec3, DVec3)> {
        if self.is_empty() {
            return None;
        }
        let d = b - a;
        let (t0, t1) = self.slab_range(a, d, 0.0, 1.0)?;
        Some((a + d * t0, a + d * t1))
    }

    /// Restrict `[t_min, t_max]` to the parameters where `origin + t * dir` is inside the box.
    fn slab_range(
        &self,
        origin: DVec3,
        dir: DVec3,
        mut t_min: f64,
        mut t_max: f64,
    ) -> Option<(f64, f64)> {
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t_near = (lo - o) * inv;
            let mut t_far = (hi - o) * inv;
            if t_near > t_far {
                core::mem::swap(&mut t_near, &mut t_far);
            }
            t_min = t_min.max(t_near);
            t_max = t_max.min(t_far);
            if t_min > t_max {
                return None;
            }
        }
        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0))
    }

    #[test]
    fn ray_hits_front_face() {
        let r = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(unit().ray_intersection(&r), Some(4.0));
    }

    #[test]
    fn ray_pointing_away_misses() {
        let r = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(0.0, 0.0, 1.0));
        assert_eq!(unit().ray_intersection(&r), None);
    }

    #[test]
    fn ray_from_inside_hits_at_zero() {
        let r = Ray::new(DVec3::ZERO, DVec3::X);
        assert_eq!(unit().ray_intersection(&r), Some(0.0));
    }

    #[test]
    fn axis_parallel_ray_outside_slab_misses() {
        let r = Ray::new(DVec3::new(0.0, 2.0, 5.0), DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(unit().ray_intersection(&r), None);
    }

    #[test]
    fn segment_crossing_box_is_trimmed_on_both_ends() {
        let (a, b) = unit()
            .clip_segment(DVec3::new(-3.0, 0.0, 0.0), DVec3::new(3.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(a, DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(b, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn segment_inside_is_unchanged() {
        let a = DVec3::new(-0.5, 0.25, 0.0);
        let b = DVec3::new(0.5, -0.25, 0.0);
        assert_eq!(unit().clip_segment(a, b), Some((a, b)));
    }

    #[test]
    fn segment_outside_is_dropped() {
        let seg = unit().clip_segment(DVec3::new(2.0, 2.0, 0.0), DVec3::new(3.0, 5.0, 0.0));
        assert_eq!(seg, None);
    }

    #[test]
    fn segment_against_empty_box_is_dropped() {
        let empty = Aabb::new(DVec3::ONE, DVec3::ZERO);
        assert_eq!(empty.clip_segment(DVec3::ZERO, DVec3::ONE), None);
    }
}
