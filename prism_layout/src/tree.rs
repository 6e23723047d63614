// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, measurement, world pass, queries.

use glam::{DAffine3, DQuat, DVec3};
use kurbo::{Rect, Vec2};
use prism_bounds::{Aabb, Index as AabbIndex, Key as AabbKey, Ray};
use tracing::{debug, trace, warn};

use crate::alignment::Alignment;
use crate::bounds::{node_transform, polyline_bounds, union_or_zero};
use crate::clip;
use crate::config::LayoutConfig;
use crate::damage::Damage;
use crate::layout::{Arrangement, Item};
use crate::types::{Content, LineSegment, LocalNode, NodeFlags, NodeId};

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level node tree.
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    epoch: u64,
    index: AabbIndex<NodeId>,
    config: LayoutConfig,
    /// Some node changed since the last commit.
    pending: bool,
    /// Seconds accumulated by [`Tree::tick`] since the last commit.
    since_commit: f64,
    pub(crate) last_load: u64,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("epoch", &self.epoch)
            .field("pending", &self.pending)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Result of [`Tree::hit_test_point`].
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched node.
    pub node: NodeId,
    /// Path from root to node (inclusive).
    pub path: Vec<NodeId>,
}

/// Result of [`Tree::hit_test_ray`].
#[derive(Clone, Debug)]
pub struct RayHit {
    /// The matched node.
    pub node: NodeId,
    /// Path from root to node (inclusive).
    pub path: Vec<NodeId>,
    /// Ray parameter at which the ray enters the node's clipped world bounds.
    pub distance: f64,
}

/// Filters applied during hit testing and box intersection.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, only consider nodes that are effectively visible (see [`Tree::is_visible`]).
    pub visible_only: bool,
    /// If true, only consider nodes marked [`NodeFlags::PICKABLE`].
    pub pickable_only: bool,
}

/// Placement a managed container gave one of its children.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Slot {
    xy: Vec2,
    z_offset: f64,
    factor: f64,
}

#[derive(Clone, Debug, Default)]
struct Measured {
    content_bounds: Aabb,
    content_offset: DVec3,
    aligned_bounds: Aabb,
    /// Aligned bounds after the local transform, in the parent's content space.
    bounds: Aabb,
    slot: Option<Slot>,
    /// Hidden by the parent, which has no room for it.
    suppressed: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct WorldNode {
    /// Content space to world.
    transform: DAffine3,
    /// World AABB of the visible part of the content, `None` when clipped out.
    bounds: Option<Aabb>,
    /// Clip box in content space.
    clip: Option<Aabb>,
    clipped: bool,
    visible: bool,
}

impl Default for WorldNode {
    fn default() -> Self {
        Self {
            transform: DAffine3::IDENTITY,
            bounds: None,
            clip: None,
            clipped: false,
            visible: true,
        }
    }
}

impl WorldNode {
    /// Whether the difference is worth reporting as damage.
    fn differs(&self, other: &Self, eps: f64) -> bool {
        let boxes = |a: &Option<Aabb>, b: &Option<Aabb>| match (a, b) {
            (Some(a), Some(b)) => !a.approx_eq(b, eps),
            (None, None) => false,
            _ => true,
        };
        self.clipped != other.clipped
            || self.visible != other.visible
            || boxes(&self.bounds, &other.bounds)
            || boxes(&self.clip, &other.clip)
            || !self.transform.abs_diff_eq(other.transform, eps)
    }
}

#[derive(Clone, Copy, Debug)]
struct Dirty {
    measure: bool,
    world: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub(crate) local: LocalNode,
    measured: Measured,
    world: WorldNode,
    dirty: Dirty,
    index_key: Option<AabbKey>,
    /// Serial of the load in flight, if any.
    pub(crate) load: Option<u64>,
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            measured: Measured::default(),
            world: WorldNode::default(),
            dirty: Dirty {
                measure: true,
                world: true,
            },
            index_key: None,
            load: None,
        }
    }

    fn position(&self) -> DVec3 {
        let p = self.local.position;
        match self.measured.slot {
            Some(s) => DVec3::new(s.xy.x, s.xy.y, p.z + s.z_offset),
            None => p,
        }
    }

    fn scale(&self) -> DVec3 {
        let s = self.local.scale;
        match self.measured.slot {
            Some(slot) => s * DVec3::new(slot.factor, slot.factor, 1.0),
            None => s,
        }
    }

    fn local_transform(&self) -> DAffine3 {
        node_transform(self.position(), self.local.rotation, self.scale())
    }

    /// Content space to parent content space.
    fn to_parent(&self) -> DAffine3 {
        self.local_transform() * DAffine3::from_translation(self.measured.content_offset)
    }

    /// Own clip box: the local clip narrowed by a scroll view's viewport.
    fn own_clip(&self) -> Option<Aabb> {
        match &self.local.arrangement {
            Arrangement::Scroll(s) => Some(
                self.local
                    .local_clip
                    .map_or(s.bounds, |c| c.intersect(&s.bounds)),
            ),
            _ => self.local.local_clip,
        }
    }

    fn compute_world(
        &self,
        parent_tf: DAffine3,
        parent_clip: Option<Aabb>,
        parent_visible: bool,
    ) -> WorldNode {
        let to_parent = self.to_parent();
        let transform = parent_tf * to_parent;
        let clip = clip::propagate(parent_clip, to_parent, self.own_clip());
        let content = self.measured.content_bounds;
        let clipped = clip::is_clipped_out(clip.as_ref(), &content);
        let visible = parent_visible
            && self.local.flags.contains(NodeFlags::VISIBLE)
            && !self.measured.suppressed;
        let bounds = if clipped {
            None
        } else {
            clip::visible_part(clip.as_ref(), &content).map(|b| b.transformed(transform))
        };
        WorldNode {
            transform,
            bounds,
            clip,
            clipped,
            visible,
        }
    }
}

impl Tree {
    /// Create a new empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Create a new empty tree.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
            index: AabbIndex::default(),
            config,
            pending: false,
            since_commit: 0.0,
            last_load: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Number of completed commits.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Insert a new node as the last child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` inserts a root.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        match parent {
            Some(p) if self.is_alive(p) => self.link_parent(id, p),
            Some(p) => debug!(parent = ?p, "stale parent, inserting {id:?} as a root"),
            None => {}
        }
        self.mark_dirty(id);
        id
    }

    /// Remove a node and its subtree. Loads in flight for removed nodes are discarded.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
            self.mark_dirty(parent);
        }
        self.remove_subtree(id);
        self.pending = true;
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.remove_subtree(child);
        }
        if let Some(key) = self.node(id).index_key {
            self.index.remove(key);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` under `new_parent` (or make it a root).
    ///
    /// Moving a node under itself or one of its descendants is ignored.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(p) = new_parent
            && (!self.is_alive(p) || self.is_ancestor_or_self(id, p))
        {
            warn!(node = ?id, parent = ?p, "ignoring reparent onto a stale id or a descendant");
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
            self.mark_dirty(parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.node_mut(id).measured.slot = None;
        self.node_mut(id).measured.suppressed = false;
        self.mark_dirty(id);
    }

    /// Set the user position. Containers with an [`Arrangement`] other than `Free` keep
    /// control of x and y; only z takes effect for their children.
    pub fn set_position(&mut self, id: NodeId, position: DVec3) {
        self.edit(id, |l| l.position = position);
    }

    /// Set the rotation.
    pub fn set_rotation(&mut self, id: NodeId, rotation: DQuat) {
        self.edit(id, |l| l.rotation = rotation);
    }

    /// Set the user scale.
    pub fn set_scale(&mut self, id: NodeId, scale: DVec3) {
        self.edit(id, |l| l.scale = scale);
    }

    /// Set the alignment.
    pub fn set_alignment(&mut self, id: NodeId, alignment: Alignment) {
        self.edit(id, |l| l.alignment = alignment);
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.edit(id, |l| l.flags = flags);
    }

    /// Set or clear [`NodeFlags::VISIBLE`].
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.edit(id, |l| l.flags.set(NodeFlags::VISIBLE, visible));
    }

    /// Replace the content source. Supersedes any load in flight.
    pub fn set_content(&mut self, id: NodeId, content: Content) {
        if let Some(n) = self.node_opt_mut(id) {
            n.load = None;
        }
        self.edit(id, |l| l.content = content);
    }

    /// Update the local clip.
    pub fn set_local_clip(&mut self, id: NodeId, clip: Option<Aabb>) {
        self.edit(id, |l| l.local_clip = clip);
    }

    /// Replace the arrangement.
    pub fn set_arrangement(&mut self, id: NodeId, arrangement: Arrangement) {
        self.edit(id, |l| l.arrangement = arrangement);
    }

    /// Apply `f` to the local data of `id` and schedule a relayout. Returns false for stale ids.
    pub(crate) fn edit(&mut self, id: NodeId, f: impl FnOnce(&mut LocalNode)) -> bool {
        let Some(n) = self.node_opt_mut(id) else {
            return false;
        };
        f(&mut n.local);
        self.mark_dirty(id);
        true
    }

    /// Whether a commit has work to do.
    pub fn needs_commit(&self) -> bool {
        self.pending
    }

    /// Advance the polling clock by `delta` seconds.
    ///
    /// Commits once at least [`LayoutConfig::layout_interval`] has passed since the last commit
    /// and something changed.
    pub fn tick(&mut self, delta: f64) -> Option<Damage> {
        self.since_commit += delta;
        if self.pending && self.since_commit >= self.config.layout_interval {
            Some(self.commit())
        } else {
            None
        }
    }

    /// Measure dirty nodes, update world data and the spatial index, and return damage.
    pub fn commit(&mut self) -> Damage {
        let mut damage = Damage::default();
        let roots = self.roots();
        for &root in &roots {
            self.measure(root);
        }
        for &root in &roots {
            self.update_world_recursive(root, DAffine3::IDENTITY, None, true, false, &mut damage);
        }

        // The world pass already filtered moves by epsilon. Removed nodes are not visited there.
        let idx_damage = self.index.commit();
        damage.dirty_boxes.extend(idx_damage.removed);

        self.epoch += 1;
        self.pending = false;
        self.since_commit = 0.0;
        trace!(
            epoch = self.epoch,
            changed = damage.changed.len(),
            "layout committed"
        );
        damage
    }

    /// Hit test a world-space ray. Returns the nearest node.
    ///
    /// Containers are hit where their bounds are. If several nodes are entered at the same
    /// distance, the newer [`NodeId`] wins.
    pub fn hit_test_ray(&self, ray: Ray, filter: QueryFilter) -> Option<RayHit> {
        let mut best: Option<(NodeId, f64)> = None;
        for (_, id, t) in self.index.query_ray(ray) {
            if !self.passes(id, filter) {
                continue;
            }
            match best {
                Some((best_id, best_t))
                    if t > best_t || (t == best_t && !id.is_newer_than(best_id)) => {}
                _ => best = Some((id, t)),
            }
        }
        best.map(|(node, distance)| RayHit {
            node,
            path: self.path_to_root(node),
            distance,
        })
    }

    /// Hit test a world-space point. Returns the most deeply nested node containing it.
    ///
    /// Among nodes at the same depth the newer [`NodeId`] wins.
    pub fn hit_test_point(&self, pt: DVec3, filter: QueryFilter) -> Option<Hit> {
        let mut best: Option<(NodeId, usize)> = None;
        for (_, id) in self.index.query_point(pt) {
            if !self.passes(id, filter) {
                continue;
            }
            let depth = self.depth(id);
            match best {
                Some((best_id, d)) if depth < d || (depth == d && !id.is_newer_than(best_id)) => {}
                _ => best = Some((id, depth)),
            }
        }
        best.map(|(node, _)| Hit {
            node,
            path: self.path_to_root(node),
        })
    }

    /// Iterate nodes whose clipped world bounds intersect a world-space box.
    pub fn intersect_box(
        &self,
        aabb: Aabb,
        filter: QueryFilter,
    ) -> impl Iterator<Item = NodeId> + '_ {
        let ids: Vec<NodeId> = self.index.query_box(aabb).map(|(_, id)| id).collect();
        ids.into_iter().filter(move |id| self.passes(*id, filter))
    }

    // --- accessors ---

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// User-facing data of a node.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.get(id).map(|n| &n.local)
    }

    /// Parent of a node, `None` for roots and stale ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node in insertion order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| &n.children)
    }

    /// Content bounds before alignment, in the node's content space.
    pub fn content_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.get(id).map(|n| n.measured.content_bounds)
    }

    /// Translation applied by the alignment: `-(min + pivot_offset)` in x and y.
    pub fn content_offset(&self, id: NodeId) -> Option<DVec3> {
        self.get(id).map(|n| n.measured.content_offset)
    }

    /// Content bounds after alignment, relative to the node's origin.
    pub fn aligned_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.get(id).map(|n| n.measured.aligned_bounds)
    }

    /// Bounds in the parent's content space.
    pub fn bounds(&self, id: NodeId) -> Option<Aabb> {
        self.get(id).map(|n| n.measured.bounds)
    }

    /// Rendered position: the user position, or the layout's position for managed children.
    pub fn position(&self, id: NodeId) -> Option<DVec3> {
        self.get(id).map(Node::position)
    }

    /// Rendered scale: the user scale times any shrink applied by the parent layout.
    pub fn scale(&self, id: NodeId) -> Option<DVec3> {
        self.get(id).map(Node::scale)
    }

    /// Content space to world transform.
    pub fn world_transform(&self, id: NodeId) -> Option<DAffine3> {
        self.get(id).map(|n| n.world.transform)
    }

    /// World AABB of the unclipped part of the node. `None` when clipped out or stale.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.get(id).and_then(|n| n.world.bounds)
    }

    /// Clip box in the node's content space, `None` when nothing clips it.
    pub fn clip_box(&self, id: NodeId) -> Option<Aabb> {
        self.get(id).and_then(|n| n.world.clip)
    }

    /// Whether the node's content lies entirely outside its clip box.
    pub fn is_clipped(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.world.clipped)
    }

    /// Effective visibility: the node and all its ancestors are visible, and no container
    /// hides it for lack of room.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.world.visible)
    }

    /// Visible and not clipped out.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| n.world.visible && !n.world.clipped)
    }

    /// Normalized clip window of the node's content for clipping materials.
    ///
    /// `None` when the node is unclipped. See [`clip::material_clip`].
    pub fn material_clip(&self, id: NodeId) -> Option<Rect> {
        let n = self.get(id)?;
        let c = n.world.clip?;
        Some(clip::material_clip(&n.measured.content_bounds, &c))
    }

    /// Clipped segments of a [`Content::Polyline`] node, in its content space.
    pub fn line_segments(&self, id: NodeId) -> Vec<LineSegment> {
        match self.get(id) {
            Some(Node {
                local:
                    LocalNode {
                        content: Content::Polyline(points),
                        ..
                    },
                world,
                ..
            }) => clip::clip_polyline(points, world.clip.as_ref(), self.config.line_thickness),
            _ => Vec::new(),
        }
    }

    // --- internals ---

    fn get(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    pub(crate) fn load_serial(&self, id: NodeId) -> Option<u64> {
        self.get(id).and_then(|n| n.load)
    }

    pub(crate) fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Schedule `id` and its ancestors for measurement.
    pub(crate) fn mark_dirty(&mut self, id: NodeId) {
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(n) = self.node_opt_mut(c) else {
                break;
            };
            n.dirty.measure = true;
            n.dirty.world = true;
            cur = n.parent;
        }
        self.pending = true;
    }

    fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() => {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    fn passes(&self, id: NodeId, filter: QueryFilter) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        if filter.visible_only && !node.world.visible {
            return false;
        }
        if filter.pickable_only && !node.local.flags.contains(NodeFlags::PICKABLE) {
            return false;
        }
        true
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.get(id).and_then(|n| n.parent) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn depth(&self, mut id: NodeId) -> usize {
        let mut d = 0;
        while let Some(p) = self.get(id).and_then(|n| n.parent) {
            d += 1;
            id = p;
        }
        d
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn path_to_root(&self, mut id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        loop {
            out.push(id);
            let parent = self.node(id).parent;
            match parent {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    /// Bottom-up measurement of dirty nodes: children first, then placement by the
    /// arrangement, then content bounds and alignment.
    fn measure(&mut self, id: NodeId) {
        let (children, arrangement) = {
            let n = self.node(id);
            if !n.dirty.measure {
                return;
            }
            (n.children.clone(), n.local.arrangement.clone())
        };
        for &c in &children {
            self.measure(c);
        }

        let skip_invisible = arrangement.skips_invisible();
        let items: Vec<Item> = children
            .iter()
            .enumerate()
            .filter_map(|(index, &c)| {
                let n = self.node(c);
                if skip_invisible && !n.local.flags.contains(NodeFlags::VISIBLE) {
                    return None;
                }
                Some(Item {
                    index,
                    aligned: n.measured.aligned_bounds,
                    rotation: n.local.rotation,
                    scale: n.local.scale,
                })
            })
            .collect();
        let placement = arrangement.place(&items);

        let mut slots: Vec<Option<Slot>> = vec![None; children.len()];
        let mut suppressed = vec![false; children.len()];
        if let Some(p) = &placement {
            let z_offset = match &arrangement {
                Arrangement::Scroll(s) => self.config.scroll_content_z_offset + s.offset.z,
                _ => 0.0,
            };
            for pl in &p.placed {
                slots[pl.index] = Some(Slot {
                    xy: pl.xy,
                    z_offset,
                    factor: pl.factor,
                });
            }
            for &i in &p.overflow {
                suppressed[i] = true;
            }
            if matches!(arrangement, Arrangement::Rect(_)) && !p.overflow.is_empty() {
                warn!(
                    node = ?id,
                    extra = p.overflow.len(),
                    "rect layout holds a single child, hiding the rest"
                );
            }
        }
        for (i, &c) in children.iter().enumerate() {
            let n = self.node_mut(c);
            n.measured.slot = slots[i];
            n.measured.suppressed = suppressed[i];
            n.measured.bounds = n.measured.aligned_bounds.transformed(n.local_transform());
            n.dirty.world = true;
        }

        let content_bounds = match (&self.node(id).local.content, &placement) {
            (Content::Children, Some(p)) => p.bounds,
            (Content::Children, None) => union_or_zero(children.iter().filter_map(|&c| {
                let n = self.node(c);
                (n.local.flags.contains(NodeFlags::VISIBLE) && !n.measured.suppressed)
                    .then_some(n.measured.bounds)
            })),
            (Content::Intrinsic(b), _) => *b,
            (Content::Pending, _) => Aabb::ZERO,
            (Content::Polyline(points), _) => polyline_bounds(points),
        };

        let n = self.node_mut(id);
        let content_offset = match (&n.local.content, &n.local.arrangement) {
            (Content::Polyline(_), _) => DVec3::ZERO,
            (_, Arrangement::Scroll(_)) => {
                Alignment::CENTER_CENTER.content_offset(&content_bounds)
            }
            _ => n.local.alignment.content_offset(&content_bounds),
        };
        n.measured.content_bounds = content_bounds;
        n.measured.content_offset = content_offset;
        n.measured.aligned_bounds = content_bounds.translated(content_offset);
        if n.parent.is_none() {
            n.measured.slot = None;
            n.measured.suppressed = false;
            n.measured.bounds = n.measured.aligned_bounds.transformed(n.local_transform());
        }
        n.dirty.measure = false;
        n.dirty.world = true;
    }

    fn update_world_recursive(
        &mut self,
        id: NodeId,
        parent_tf: DAffine3,
        parent_clip: Option<Aabb>,
        parent_visible: bool,
        force: bool,
        damage: &mut Damage,
    ) {
        enum IndexOp {
            Keep,
            Update(AabbKey, Aabb),
            Insert(Aabb),
            Remove(AabbKey),
        }
        let eps = self.config.epsilon;
        let (child_ids, world, force_children, index_op) = {
            let node = self.node_mut(id);
            let child_ids = node.children.clone();
            if !(force || node.dirty.world) {
                (child_ids, node.world.clone(), false, IndexOp::Keep)
            } else {
                let new = node.compute_world(parent_tf, parent_clip, parent_visible);
                let old = core::mem::replace(&mut node.world, new.clone());
                node.dirty.world = false;
                if old.differs(&new, eps) {
                    damage.changed.push(id);
                    damage.dirty_boxes.extend(old.bounds);
                    damage.dirty_boxes.extend(new.bounds);
                }
                let op = match (node.index_key, new.bounds) {
                    (Some(key), Some(b)) if old.bounds != Some(b) => IndexOp::Update(key, b),
                    (Some(_), Some(_)) => IndexOp::Keep,
                    (None, Some(b)) => IndexOp::Insert(b),
                    (Some(key), None) => IndexOp::Remove(key),
                    (None, None) => IndexOp::Keep,
                };
                let force_children = old != new;
                (child_ids, new, force_children, op)
            }
        };

        match index_op {
            IndexOp::Keep => {}
            IndexOp::Update(key, aabb) => self.index.update(key, aabb),
            IndexOp::Insert(aabb) => {
                let key = self.index.insert(aabb, id);
                self.node_mut(id).index_key = Some(key);
            }
            IndexOp::Remove(key) => {
                self.index.remove(key);
                self.node_mut(id).index_key = None;
            }
        }

        for child in child_ids {
            self.update_world_recursive(
                child,
                world.transform,
                world.clip,
                world.visible,
                force_children,
                damage,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Extent, GridLayout, ItemLayout, LinearLayout, Orientation, PageLayout};
    use crate::scroll::ScrollView;

    fn sized(w: f64, h: f64) -> LocalNode {
        LocalNode::intrinsic(Aabb::new(DVec3::ZERO, DVec3::new(w, h, 0.0)))
    }

    fn near(a: DVec3, b: DVec3) -> bool {
        a.abs_diff_eq(b, 1e-9)
    }

    #[test]
    fn alignment_places_pivot_on_position() {
        let mut tree = Tree::new();
        let n = tree.insert(
            None,
            sized(2.0, 1.0)
                .at(DVec3::new(5.0, 5.0, 0.0))
                .aligned(Alignment::TOP_LEFT),
        );
        let _ = tree.commit();
        let b = tree.bounds(n).unwrap();
        assert_eq!(b.min, DVec3::new(5.0, 4.0, 0.0));
        assert_eq!(b.max, DVec3::new(7.0, 5.0, 0.0));
    }

    #[test]
    fn empty_container_is_zero_box() {
        let mut tree = Tree::new();
        let n = tree.insert(None, LocalNode::default());
        let _ = tree.commit();
        assert_eq!(tree.content_bounds(n), Some(Aabb::ZERO));
    }

    #[test]
    fn container_unions_visible_children() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default().aligned(Alignment::BOTTOM_LEFT));
        let _a = tree.insert(Some(root), sized(1.0, 1.0).at(DVec3::new(0.5, 0.5, 0.0)));
        let b = tree.insert(Some(root), sized(1.0, 1.0).at(DVec3::new(3.5, 0.5, 0.0)));
        let _ = tree.commit();
        assert_eq!(tree.content_bounds(root).unwrap().width(), 4.0);

        tree.set_visible(b, false);
        let _ = tree.commit();
        assert_eq!(tree.content_bounds(root).unwrap().width(), 1.0);
        assert!(!tree.is_visible(b));
    }

    #[test]
    fn relayout_is_bit_identical() {
        let mut tree = Tree::new();
        let list = tree.insert(
            None,
            LocalNode::container(Arrangement::Linear(LinearLayout {
                width: Extent::Fixed(0.3),
                ..LinearLayout::default()
            })),
        );
        let kids: Vec<_> = (0..4)
            .map(|i| tree.insert(Some(list), sized(0.1 * f64::from(i + 1), 0.05)))
            .collect();
        let _ = tree.commit();
        let before: Vec<_> = kids.iter().map(|k| tree.position(*k).unwrap()).collect();

        // Force a full re-measure with unchanged inputs.
        for k in &kids {
            tree.set_scale(*k, DVec3::ONE);
        }
        let _ = tree.commit();
        let after: Vec<_> = kids.iter().map(|k| tree.position(*k).unwrap()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn layout_owns_xy_but_not_z() {
        let mut tree = Tree::new();
        let list = tree.insert(
            None,
            LocalNode::container(Arrangement::Linear(LinearLayout::default())),
        );
        let k = tree.insert(Some(list), sized(1.0, 1.0));
        let _ = tree.commit();
        let p0 = tree.position(k).unwrap();
        tree.set_position(k, DVec3::new(9.0, 9.0, 0.25));
        let _ = tree.commit();
        let p1 = tree.position(k).unwrap();
        assert_eq!((p1.x, p1.y), (p0.x, p0.y));
        assert_eq!(p1.z, 0.25);
    }

    #[test]
    fn prism_clips_children_outside_its_volume() {
        let mut tree = Tree::new();
        let prism = tree.insert(None, LocalNode::prism(DVec3::splat(1.0)));
        let inside = tree.insert(Some(prism), sized(0.1, 0.1));
        let outside = tree.insert(Some(prism), sized(0.1, 0.1).at(DVec3::new(3.0, 0.0, 0.0)));
        let _ = tree.commit();
        assert!(!tree.is_clipped(inside));
        assert!(tree.is_clipped(outside));
        assert!(tree.is_visible(outside));
        assert!(!tree.is_rendered(outside));
        assert_eq!(tree.world_bounds(outside), None);

        tree.set_position(outside, DVec3::ZERO);
        let _ = tree.commit();
        assert!(tree.is_rendered(outside));
    }

    #[test]
    fn hidden_parent_hides_subtree() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let mid = tree.insert(Some(root), LocalNode::default());
        let leaf = tree.insert(Some(mid), sized(1.0, 1.0));
        let _ = tree.commit();
        assert!(tree.is_visible(leaf));
        tree.set_visible(mid, false);
        let _ = tree.commit();
        assert!(!tree.is_visible(leaf));
        assert!(!tree.is_clipped(leaf));
    }

    #[test]
    fn scroll_view_moves_and_clips_content() {
        let mut tree = Tree::new();
        let view = ScrollView::from(DVec3::new(1.0, 1.0, 1.0));
        let scroll = tree.insert(None, LocalNode::container(Arrangement::Scroll(view.clone())));
        let list = tree.insert(
            Some(scroll),
            LocalNode::container(Arrangement::Linear(LinearLayout {
                orientation: Orientation::Vertical,
                items: ItemLayout {
                    alignment: Alignment::TOP_LEFT,
                    ..ItemLayout::default()
                },
                ..LinearLayout::default()
            })),
        );
        let rows: Vec<_> = (0..4)
            .map(|_| tree.insert(Some(list), sized(1.0, 1.0)))
            .collect();
        let extra = tree.insert(Some(scroll), sized(0.1, 0.1));
        let _ = tree.commit();

        assert!(tree.is_rendered(rows[0]));
        assert!(tree.is_clipped(rows[2]));
        assert!(!tree.is_visible(extra));

        tree.set_arrangement(
            scroll,
            Arrangement::Scroll(ScrollView { value: 1.0, ..view }),
        );
        let _ = tree.commit();
        assert!(tree.is_clipped(rows[0]));
        assert!(tree.is_rendered(rows[3]));
        let wb = tree.world_bounds(rows[3]).unwrap();
        assert!(near(wb.min, DVec3::new(-0.5, -0.5, 0.0)));
    }

    #[test]
    fn partially_clipped_world_bounds_are_trimmed() {
        let mut tree = Tree::new();
        let prism = tree.insert(None, LocalNode::prism(DVec3::splat(1.0)));
        let wide = tree.insert(Some(prism), sized(4.0, 0.2));
        let _ = tree.commit();
        let wb = tree.world_bounds(wide).unwrap();
        assert_eq!((wb.min.x, wb.max.x), (-0.5, 0.5));
        let mc = tree.material_clip(wide).unwrap();
        assert_eq!((mc.x0, mc.x1), (-0.125, 0.125));
    }

    #[test]
    fn damage_reports_moves() {
        let mut tree = Tree::new();
        let n = tree.insert(None, sized(1.0, 1.0));
        let first = tree.commit();
        assert_eq!(first.changed, vec![n]);
        let idle = tree.commit();
        assert!(idle.is_empty());
        tree.set_position(n, DVec3::new(2.0, 0.0, 0.0));
        let dmg = tree.commit();
        assert_eq!(dmg.changed, vec![n]);
        let u = dmg.union_box().unwrap();
        assert_eq!((u.min.x, u.max.x), (-0.5, 2.5));
    }

    #[test]
    fn tiny_moves_below_epsilon_are_not_damage() {
        let mut tree = Tree::new();
        let n = tree.insert(None, sized(1.0, 1.0));
        let _ = tree.commit();
        tree.set_position(n, DVec3::new(1e-9, 0.0, 0.0));
        let dmg = tree.commit();
        assert!(dmg.changed.is_empty());
        assert!(dmg.dirty_boxes.is_empty());
        assert!(dmg.is_empty());
    }

    #[test]
    fn removal_reports_the_old_box() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let leaf = tree.insert(Some(root), sized(1.0, 1.0).at(DVec3::new(4.0, 0.0, 0.0)));
        let _ = tree.commit();
        let old = tree.world_bounds(leaf).unwrap();
        tree.remove(leaf);
        let dmg = tree.commit();
        assert!(dmg.dirty_boxes.contains(&old));
    }

    #[test]
    fn default_scroll_view_is_a_unit_cube() {
        let mut tree = Tree::new();
        let scroll = tree.insert(
            None,
            LocalNode::container(Arrangement::Scroll(ScrollView::default())),
        );
        let child = tree.insert(Some(scroll), sized(0.5, 0.5));
        let _ = tree.commit();
        assert_eq!(tree.content_bounds(scroll).unwrap().size(), DVec3::ONE);
        assert!(tree.is_rendered(child));
        let wb = tree.world_bounds(child).unwrap();
        assert!(near(wb.size(), DVec3::new(0.5, 0.5, 0.0)));
        assert!(near(wb.min, DVec3::new(-0.5, 0.0, 0.0)));
    }

    #[test]
    fn default_grid_is_a_top_left_row() {
        let mut tree = Tree::new();
        let grid = tree.insert(
            None,
            LocalNode::container(Arrangement::Grid(GridLayout::default())),
        );
        for _ in 0..3 {
            let _ = tree.insert(Some(grid), sized(1.0, 1.0));
        }
        let _ = tree.commit();
        let b = tree.aligned_bounds(grid).unwrap();
        assert_eq!(b.size(), DVec3::new(3.0, 1.0, 0.0));
        assert_eq!((b.min.x, b.max.y), (0.0, 0.0));
    }

    #[test]
    fn pages_show_one_child_at_a_time() {
        let mut tree = Tree::new();
        let book = tree.insert(
            None,
            LocalNode::container(Arrangement::Page(PageLayout::default())),
        );
        let pages: Vec<_> = [1.0, 2.0, 0.5]
            .into_iter()
            .map(|w| tree.insert(Some(book), sized(w, 0.5)))
            .collect();
        let _ = tree.commit();
        assert!(tree.is_visible(pages[0]));
        assert!(!tree.is_visible(pages[1]));
        assert!(!tree.is_visible(pages[2]));
        assert_eq!(tree.content_bounds(book).unwrap().width(), 1.0);

        tree.set_arrangement(
            book,
            Arrangement::Page(PageLayout {
                visible_page: 1,
                ..PageLayout::default()
            }),
        );
        let _ = tree.commit();
        assert!(!tree.is_visible(pages[0]));
        assert!(tree.is_visible(pages[1]));
        assert_eq!(tree.content_bounds(book).unwrap().width(), 2.0);
    }

    #[test]
    fn tick_commits_on_interval_only_when_dirty() {
        let mut tree = Tree::new();
        let n = tree.insert(None, sized(1.0, 1.0));
        assert!(tree.tick(0.01).is_none());
        assert!(tree.tick(0.05).is_some());
        assert!(!tree.needs_commit());
        assert!(tree.tick(1.0).is_none());
        tree.set_position(n, DVec3::ONE);
        assert!(tree.tick(0.06).is_some());
    }

    #[test]
    fn ray_picks_nearest_and_skips_unpickable() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let far = tree.insert(Some(root), sized(1.0, 1.0).at(DVec3::new(0.0, 0.0, -2.0)));
        let near_node = tree.insert(Some(root), sized(1.0, 1.0).at(DVec3::new(0.0, 0.0, -1.0)));
        tree.set_flags(root, NodeFlags::VISIBLE);
        let _ = tree.commit();
        let filter = QueryFilter {
            visible_only: true,
            pickable_only: true,
        };
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z);
        let hit = tree.hit_test_ray(ray, filter).unwrap();
        assert_eq!(hit.node, near_node);
        assert_eq!(hit.distance, 6.0);
        assert_eq!(hit.path, vec![root, near_node]);

        tree.set_flags(near_node, NodeFlags::VISIBLE);
        let _ = tree.commit();
        assert_eq!(tree.hit_test_ray(ray, filter).unwrap().node, far);
    }

    #[test]
    fn point_hit_prefers_deepest() {
        let mut tree = Tree::new();
        let root = tree.insert(None, sized(2.0, 2.0));
        // Root content spans 0..2, so its center is (1, 1) in content space.
        let child = tree.insert(Some(root), sized(0.5, 0.5).at(DVec3::new(1.0, 1.0, 0.0)));
        let _ = tree.commit();
        let hit = tree
            .hit_test_point(DVec3::ZERO, QueryFilter::default())
            .unwrap();
        assert_eq!(hit.node, child);
        assert_eq!(hit.path, vec![root, child]);
    }

    #[test]
    fn intersect_box_excludes_clipped_and_hidden() {
        let mut tree = Tree::new();
        let prism = tree.insert(None, LocalNode::prism(DVec3::splat(1.0)));
        let a = tree.insert(Some(prism), sized(0.1, 0.1));
        let b = tree.insert(Some(prism), sized(0.1, 0.1).at(DVec3::new(5.0, 0.0, 0.0)));
        let c = tree.insert(Some(prism), sized(0.1, 0.1));
        tree.set_visible(c, false);
        let _ = tree.commit();
        let filter = QueryFilter {
            visible_only: true,
            pickable_only: false,
        };
        let everything = Aabb::from_center_size(DVec3::ZERO, DVec3::splat(100.0));
        let hits: Vec<_> = tree.intersect_box(everything, filter).collect();
        assert!(hits.contains(&a));
        assert!(!hits.contains(&b));
        assert!(!hits.contains(&c));
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree = Tree::new();
        let root = tree.insert(None, sized(1.0, 1.0));
        let a = tree.insert(Some(root), sized(1.0, 1.0));
        let a_child = tree.insert(Some(a), sized(1.0, 1.0));
        assert!(tree.is_alive(a));

        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(a_child), "removal takes the subtree");
        assert!(tree.children(root).is_empty());

        let b = tree.insert(Some(root), sized(1.0, 1.0));
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
        // Stale ids are ignored by setters and getters.
        tree.set_position(a, DVec3::ONE);
        assert_eq!(tree.bounds(a), None);
    }

    #[test]
    fn reparent_moves_subtree_and_rejects_cycles() {
        let mut tree = Tree::new();
        let a = tree.insert(None, LocalNode::default());
        let b = tree.insert(None, LocalNode::default());
        let leaf = tree.insert(Some(a), sized(1.0, 1.0));
        tree.reparent(leaf, Some(b));
        assert_eq!(tree.parent(leaf), Some(b));
        assert!(tree.children(a).is_empty());

        tree.reparent(b, Some(leaf));
        assert_eq!(tree.parent(b), None);
        let _ = tree.commit();
        assert_eq!(tree.content_bounds(b).unwrap().width(), 1.0);
        assert_eq!(tree.content_bounds(a), Some(Aabb::ZERO));
    }

    #[test]
    fn polyline_segments_follow_clip() {
        let mut tree = Tree::new();
        let prism = tree.insert(None, LocalNode::prism(DVec3::splat(1.0)));
        let line = tree.insert(
            Some(prism),
            LocalNode {
                content: Content::Polyline(vec![
                    DVec3::new(-2.0, 0.0, 0.0),
                    DVec3::new(2.0, 0.0, 0.0),
                ]),
                alignment: Alignment::TOP_LEFT,
                ..LocalNode::default()
            },
        );
        let _ = tree.commit();
        assert_eq!(tree.content_offset(line), Some(DVec3::ZERO));
        let segs = tree.line_segments(line);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].start.x, -0.5);
        assert_eq!(segs[0].end.x, 0.5);
        assert_eq!(segs[0].thickness, tree.config().line_thickness);
    }
}
