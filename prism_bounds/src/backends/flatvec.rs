// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for a prism's worth of nodes.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use glam::DVec3;

use crate::backend::Backend;
use crate::ray::Ray;
use crate::types::Aabb;

/// Flat vector backend with linear scans.
#[derive(Default)]
pub struct FlatVec {
    entries: Vec<Option<Aabb>>,
}

impl Debug for FlatVec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl FlatVec {
    fn live(&self) -> impl Iterator<Item = (usize, &Aabb)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|a| (i, a)))
    }
}

impl Backend for FlatVec {
    fn insert(&mut self, slot: usize, aabb: Aabb) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(aabb);
    }
    fn update(&mut self, slot: usize, aabb: Aabb) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = Some(aabb);
        }
    }
    fn remove(&mut self, slot: usize) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = None;
        }
    }
    fn clear(&mut self) {
        self.entries.clear();
    }
    fn query_point<'a>(&'a self, p: DVec3) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.live()
                .filter(move |(_, a)| a.contains_point(p))
                .map(|(i, _)| i),
        )
    }
    fn query_box<'a>(&'a self, aabb: Aabb) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.live()
                .filter(move |(_, a)| !a.intersect(&aabb).is_empty())
                .map(|(i, _)| i),
        )
    }
    fn query_ray<'a>(&'a self, ray: Ray) -> Box<dyn Iterator<Item = (usize, f64)> + 'a> {
        Box::new(
            self.live()
                .filter_map(move |(i, a)| a.ray_intersection(&ray).map(|t| (i, t))),
        )
    }
}
