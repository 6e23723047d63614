// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Prism Bounds: insert, update, commit damage, and pick with a ray.

use glam::DVec3;
use prism_bounds::{Aabb, Index, Ray};

fn main() {
    let mut idx: Index<u32> = Index::new();
    let k1 = idx.insert(Aabb::new(DVec3::ZERO, DVec3::new(0.1, 0.1, 0.01)), 1);
    let _k2 = idx.insert(
        Aabb::new(DVec3::new(0.05, 0.05, -0.2), DVec3::new(0.15, 0.15, -0.19)),
        2,
    );
    let _ = idx.commit();

    // Move box 1
    idx.update(k1, Aabb::new(DVec3::new(0.3, 0.0, 0.0), DVec3::new(0.4, 0.1, 0.01)));
    let dmg = idx.commit();
    println!(
        "damage: added={:?}, removed={:?}, moved={:?}",
        dmg.added, dmg.removed, dmg.moved
    );

    // Pick along -z
    let ray = Ray::new(DVec3::new(0.1, 0.1, 1.0), DVec3::NEG_Z);
    let hits: Vec<_> = idx.query_ray(ray).collect();
    println!("ray hits: {:?}", hits);
}
