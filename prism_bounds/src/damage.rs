// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched damage structures returned by [`Index::commit`](crate::Index::commit).

use alloc::vec::Vec;

use crate::types::Aabb;

/// Batched damage summary returned by [`Index::commit`](crate::Index::commit).
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Newly added AABBs since last commit.
    pub added: Vec<Aabb>,
    /// Removed AABBs since last commit.
    pub removed: Vec<Aabb>,
    /// Moved AABBs since last commit: (old, new).
    pub moved: Vec<(Aabb, Aabb)>,
}

impl Damage {
    /// True if no damage entries recorded.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    /// Union of all AABBs affected. Returns `None` if empty.
    pub fn union(&self) -> Option<Aabb> {
        let mut it = self
            .added
            .iter()
            .copied()
            .chain(self.removed.iter().copied())
            .chain(self.moved.iter().flat_map(|(a, b)| [*a, *b]));
        let first = it.next()?;
        Some(it.fold(first, |acc, b| acc.union(&b)))
    }
}
