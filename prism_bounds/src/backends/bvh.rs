// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary bounding volume hierarchy backend.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use glam::DVec3;

use crate::backend::Backend;
use crate::ray::Ray;
use crate::types::Aabb;

/// A simple BVH backend using SAH-like splits.
pub struct Bvh {
    max_leaf: usize,
    root: Option<NodeIdx>,
    arena: Vec<Node>,
    slots: Vec<Option<Aabb>>,
}

enum Kind {
    Leaf(Vec<(usize, Aabb)>),
    Internal { left: NodeIdx, right: NodeIdx },
}

struct Node {
    bbox: Aabb,
    kind: Kind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

impl Default for Bvh {
    fn default() -> Self {
        Self {
            max_leaf: 8,
            root: None,
            arena: Vec::new(),
            slots: Vec::new(),
        }
    }
}

type BvhItem = (usize, Aabb);
type BvhItems = Vec<BvhItem>;

impl Bvh {
    fn ensure_slot(&mut self, slot: usize, bbox: Aabb) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(bbox);
    }

    fn bbox_items(items: &[BvhItem]) -> Aabb {
        let mut it = items.iter();
        match it.next() {
            Some((_, first)) => it.fold(*first, |acc, (_, bb)| acc.union(bb)),
            None => Aabb::ZERO,
        }
    }

    /// SAH-like split: sort along each axis, precompute prefix/suffix AABBs, and
    /// choose `k` that minimizes `area(LB_k) * k + area(RB_k) * (n - k)`.
    fn split_sah(mut items: BvhItems, max_leaf: usize) -> (BvhItems, BvhItems) {
        let n = items.len();
        let min_children = (max_leaf / 2).max(1).min(n / 2);
        // (cost, axis, k)
        let mut best: Option<(f64, usize, usize)> = None;
        for axis in 0..3 {
            items.sort_by(|a, b| a.1.center()[axis].total_cmp(&b.1.center()[axis]));

            // Precompute prefix/suffix bboxes for O(1) split evaluation
            let mut prefix: Vec<Aabb> = Vec::with_capacity(n);
            let mut acc: Option<Aabb> = None;
            for (_, bb) in &items {
                let next = acc.map_or(*bb, |a| a.union(bb));
                prefix.push(next);
                acc = Some(next);
            }
            let mut suffix: Vec<Aabb> = Vec::with_capacity(n);
            acc = None;
            for (_, bb) in items.iter().rev() {
                let next = acc.map_or(*bb, |a| a.union(bb));
                suffix.push(next);
                acc = Some(next);
            }
            suffix.reverse();

            for k in min_children..=(n - min_children) {
                if k == 0 || k == n {
                    continue;
                }
                let cost = prefix[k - 1].surface_area() * k as f64
                    + suffix[k].surface_area() * (n - k) as f64;
                if best.is_none_or(|(bc, _, _)| cost < bc) {
                    best = Some((cost, axis, k));
                }
            }
        }
        let (axis, k) = best.map_or((0, n / 2), |(_, axis, k)| (axis, k));
        items.sort_by(|a, b| a.1.center()[axis].total_cmp(&b.1.center()[axis]));
        let right = items.split_off(k);
        (items, right)
    }

    fn insert_node(
        arena: &mut Vec<Node>,
        node_idx: usize,
        slot: usize,
        bbox: Aabb,
        max_leaf: usize,
    ) {
        let kind = core::mem::replace(&mut arena[node_idx].kind, Kind::Leaf(Vec::new()));
        match kind {
            Kind::Leaf(mut items) => {
                let was_empty = items.is_empty();
                items.push((slot, bbox));
                let mut node_bbox = if was_empty {
                    bbox
                } else {
                    arena[node_idx].bbox.union(&bbox)
                };
                let new_kind = if items.len() > max_leaf {
                    let (l, r) = Self::split_sah(items, max_leaf);
                    let l_idx = arena.len();
                    arena.push(Node {
                        bbox: Self::bbox_items(&l),
                        kind: Kind::Leaf(l),
                    });
                    let r_idx = arena.len();
                    arena.push(Node {
                        bbox: Self::bbox_items(&r),
                        kind: Kind::Leaf(r),
                    });
                    node_bbox = arena[l_idx].bbox.union(&arena[r_idx].bbox);
                    Kind::Internal {
                        left: NodeIdx::new(l_idx),
                        right: NodeIdx::new(r_idx),
                    }
                } else {
                    Kind::Leaf(items)
                };
                arena[node_idx].kind = new_kind;
                arena[node_idx].bbox = node_bbox;
            }
            Kind::Internal { left, right } => {
                let lb = arena[left.get()].bbox;
                let rb = arena[right.get()].bbox;
                let cost_l = lb.union(&bbox).surface_area() - lb.surface_area();
                let cost_r = rb.union(&bbox).surface_area() - rb.surface_area();
                if cost_l <= cost_r {
                    Self::insert_node(arena, left.get(), slot, bbox, max_leaf);
                } else {
                    Self::insert_node(arena, right.get(), slot, bbox, max_leaf);
                }
                let node_bbox = arena[node_idx].bbox.union(&bbox);
                arena[node_idx].kind = Kind::Internal { left, right };
                arena[node_idx].bbox = node_bbox;
            }
        }
    }

    fn is_empty_leaf(node: &Node) -> bool {
        matches!(node.kind, Kind::Leaf(ref v) if v.is_empty())
    }

    fn remove_node(arena: &mut Vec<Node>, node_idx: usize, slot: usize, old: &Aabb) -> bool {
        if arena[node_idx].bbox.intersect(old).is_empty() {
            return false;
        }
        let kind = core::mem::replace(&mut arena[node_idx].kind, Kind::Leaf(Vec::new()));
        let (new_kind, new_bbox, removed) = match kind {
            Kind::Leaf(mut items) => {
                let before = items.len();
                items.retain(|(s, _)| *s != slot);
                let removed = items.len() != before;
                let bbox = Self::bbox_items(&items);
                (Kind::Leaf(items), bbox, removed)
            }
            Kind::Internal { left, right } => {
                let removed = Self::remove_node(arena, left.get(), slot, old)
                    | Self::remove_node(arena, right.get(), slot, old);
                let is_left_empty = Self::is_empty_leaf(&arena[left.get()]);
                let is_right_empty = Self::is_empty_leaf(&arena[right.get()]);
                if removed && is_left_empty && !is_right_empty {
                    let kind =
                        core::mem::replace(&mut arena[right.get()].kind, Kind::Leaf(Vec::new()));
                    (kind, arena[right.get()].bbox, true)
                } else if removed && is_right_empty && !is_left_empty {
                    let kind =
                        core::mem::replace(&mut arena[left.get()].kind, Kind::Leaf(Vec::new()));
                    (kind, arena[left.get()].bbox, true)
                } else {
                    let bbox = arena[left.get()].bbox.union(&arena[right.get()].bbox);
                    (Kind::Internal { left, right }, bbox, removed)
                }
            }
        };
        arena[node_idx].kind = new_kind;
        arena[node_idx].bbox = new_bbox;
        removed
    }

    /// Depth-first walk over leaves whose node boxes pass `visit_node`.
    fn walk(
        &self,
        mut visit_node: impl FnMut(&Aabb) -> bool,
        mut visit_item: impl FnMut(usize, &Aabb),
    ) {
        let Some(root_idx) = self.root else {
            return;
        };
        let mut stack = vec![root_idx];
        while let Some(i) = stack.pop() {
            let n = &self.arena[i.get()];
            if !visit_node(&n.bbox) {
                continue;
            }
            match &n.kind {
                Kind::Leaf(items) => {
                    for (s, b) in items {
                        visit_item(*s, b);
                    }
                }
                Kind::Internal { left, right } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
    }
}

impl Backend for Bvh {
    fn insert(&mut self, slot: usize, aabb: Aabb) {
        self.ensure_slot(slot, aabb);
        match self.root {
            None => {
                let idx = self.arena.len();
                self.arena.push(Node {
                    bbox: aabb,
                    kind: Kind::Leaf(vec![(slot, aabb)]),
                });
                self.root = Some(NodeIdx::new(idx));
            }
            Some(root_idx) => {
                Self::insert_node(&mut self.arena, root_idx.get(), slot, aabb, self.max_leaf);
            }
        }
    }

    fn update(&mut self, slot: usize, aabb: Aabb) {
        if let Some(old) = self.slots.get(slot).and_then(|x| *x)
            && let Some(root_idx) = self.root
        {
            let _ = Self::remove_node(&mut self.arena, root_idx.get(), slot, &old);
        }
        self.insert(slot, aabb);
    }

    fn remove(&mut self, slot: usize) {
        if let Some(old) = self.slots.get(slot).and_then(|x| *x)
            && let Some(root_idx) = self.root
        {
            let _ = Self::remove_node(&mut self.arena, root_idx.get(), slot, &old);
            if let Some(s) = self.slots.get_mut(slot) {
                *s = None;
            }
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
        self.slots.clear();
    }

    fn query_point<'a>(&'a self, p: DVec3) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut out = Vec::new();
        self.walk(
            |bb| bb.contains_point(p),
            |s, bb| {
                if bb.contains_point(p) {
                    out.push(s);
                }
            },
        );
        Box::new(out.into_iter())
    }

    fn query_box<'a>(&'a self, aabb: Aabb) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut out = Vec::new();
        self.walk(
            |bb| !bb.intersect(&aabb).is_empty(),
            |s, bb| {
                if !bb.intersect(&aabb).is_empty() {
                    out.push(s);
                }
            },
        );
        Box::new(out.into_iter())
    }

    fn query_ray<'a>(&'a self, ray: Ray) -> Box<dyn Iterator<Item = (usize, f64)> + 'a> {
        let mut out = Vec::new();
        self.walk(
            |bb| bb.ray_intersection(&ray).is_some(),
            |s, bb| {
                if let Some(t) = bb.ray_intersection(&ray) {
                    out.push((s, t));
                }
            },
        );
        Box::new(out.into_iter())
    }
}

impl Debug for Bvh {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|e| e.is_some()).count();
        let has_root = self.root.is_some();
        f.debug_struct("Bvh")
            .field("max_leaf", &self.max_leaf)
            .field("arena_nodes", &self.arena.len())
            .field("total_slots", &total)
            .field("alive", &alive)
            .field("has_root", &has_root)
            .finish_non_exhaustive()
    }
}
