// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use glam::DVec3;

use crate::backend::Backend;
use crate::backends::bvh::Bvh;
use crate::backends::flatvec::FlatVec;
use crate::damage::Damage;
use crate::ray::Ray;
use crate::types::Aabb;

/// Generational handle for entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Added,
    Updated,
    Removed,
}

#[derive(Clone, Debug)]
struct Entry<P> {
    generation: u32,
    aabb: Aabb,
    payload: P,
    mark: Option<Mark>,
    prev_aabb: Option<Aabb>, // for moved damage
}

/// A generic AABB index parameterized by a spatial backend.
#[derive(Debug)]
pub struct IndexGeneric<P: Copy + Debug, B: Backend> {
    entries: Vec<Option<Entry<P>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    backend: B,
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend,
{
    /// Create an empty index over an explicit backend instance.
    pub fn with_backend(backend: B) -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            backend,
        }
    }

    /// Reserve space for at least `n` entries.
    pub fn reserve(&mut self, n: usize) {
        self.entries.reserve(n);
        self.generations.reserve(n);
    }

    /// Number of live entries, including ones pending removal.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// True if the index has no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb, payload: P) -> Key {
        let entry = |generation| Entry {
            generation,
            aabb,
            payload,
            mark: Some(Mark::Added),
            prev_aabb: None,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some(entry(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.entries.push(Some(entry(generation)));
            self.generations.push(generation);
            (self.entries.len() - 1, generation)
        };
        Key::new(idx, generation)
    }

    /// Update an existing AABB.
    pub fn update(&mut self, key: Key, aabb: Aabb) {
        if let Some(e) = self.entry_mut(key) {
            if e.mark.is_none() {
                e.prev_aabb = Some(e.aabb);
            }
            e.aabb = aabb;
            e.mark = Some(match e.mark {
                Some(Mark::Added) => Mark::Added,
                _ => Mark::Updated,
            });
        }
    }

    /// Remove an existing AABB.
    pub fn remove(&mut self, key: Key) {
        if let Some(e) = self.entry_mut(key) {
            if matches!(e.mark, Some(Mark::Added)) {
                self.entries[key.idx()] = None;
                self.free_list.push(key.idx());
            } else {
                e.mark = Some(Mark::Removed);
            }
        }
    }

    /// Clear the index (without reporting damage).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generations.clear();
        self.free_list.clear();
        self.backend.clear();
    }

    /// Apply pending changes and compute batched damage. Also synchronizes backend state.
    pub fn commit(&mut self) -> Damage {
        let mut dmg = Damage::default();
        for i in 0..self.entries.len() {
            let Some(entry) = self.entries[i].as_mut() else {
                continue;
            };
            match entry.mark.take() {
                Some(Mark::Added) => {
                    self.backend.insert(i, entry.aabb);
                    dmg.added.push(entry.aabb);
                }
                Some(Mark::Removed) => {
                    self.backend.remove(i);
                    dmg.removed.push(entry.aabb);
                    self.entries[i] = None;
                    self.free_list.push(i);
                }
                Some(Mark::Updated) => {
                    self.backend.update(i, entry.aabb);
                    if let Some(prev) = entry.prev_aabb.take()
                        && prev != entry.aabb
                    {
                        dmg.moved.push((prev, entry.aabb));
                    }
                }
                None => {}
            }
        }
        dmg
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&self, p: DVec3) -> impl Iterator<Item = (Key, P)> + '_ {
        let slots = self.backend.query_point(p);
        self.resolve(slots)
    }

    /// Query for entries whose AABB intersects the given box.
    pub fn query_box(&self, aabb: Aabb) -> impl Iterator<Item = (Key, P)> + '_ {
        let slots = self.backend.query_box(aabb);
        self.resolve(slots)
    }

    /// Query for entries hit by the ray, nearest first.
    ///
    /// Each item carries the ray parameter at which the ray enters the entry's AABB.
    /// Equal distances keep slot order.
    pub fn query_ray(&self, ray: Ray) -> impl Iterator<Item = (Key, P, f64)> + '_ {
        let mut out = Vec::new();
        for (i, t) in self.backend.query_ray(ray) {
            if let Some(Some(e)) = self.entries.get(i) {
                out.push((Key::new(i, e.generation), e.payload, t));
            }
        }
        out.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.0.cmp(&b.0.0)));
        out.into_iter()
    }

    fn resolve<'a>(
        &'a self,
        slots: impl Iterator<Item = usize> + 'a,
    ) -> impl Iterator<Item = (Key, P)> + 'a {
        let mut out = Vec::new();
        for i in slots {
            if let Some(Some(e)) = self.entries.get(i) {
                out.push((Key::new(i, e.generation), e.payload));
            }
        }
        out.into_iter()
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry<P>> {
        let e = self.entries.get_mut(key.idx())?.as_mut()?;
        if e.generation != key.1 {
            return None;
        }
        Some(e)
    }
}

/// Default index using a flat vector backend.
pub type Index<P> = IndexGeneric<P, FlatVec>;

impl<P: Copy + Debug> Default for Index<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + Debug> Index<P> {
    /// Create a BVH-backed index using SAH-like splits.
    pub fn with_bvh() -> IndexGeneric<P, Bvh> {
        IndexGeneric::with_backend(Bvh::default())
    }
}
