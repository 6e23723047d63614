// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous content loads.
//!
//! A node whose content comes from a slow source (a mesh, an image) measures as a zero-size box
//! while the load is in flight. The loader holds a [`LoadTicket`] and hands it back together with
//! the measured bounds. Only the most recent ticket of a live node is accepted. Starting another
//! load, replacing the content, cancelling, or removing the node all make older tickets stale.

use prism_bounds::Aabb;
use tracing::debug;

use crate::error::LoadError;
use crate::tree::Tree;
use crate::types::{Content, NodeId};

/// Proof of a load in flight, returned by [`Tree::begin_load`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    node: NodeId,
    serial: u64,
}

impl LoadTicket {
    /// The node the content is for.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Tree {
    /// Start loading content for `id`. Its content becomes [`Content::Pending`] until the load
    /// completes.
    ///
    /// Returns `None` for stale ids.
    pub fn begin_load(&mut self, id: NodeId) -> Option<LoadTicket> {
        if !self.edit(id, |l| l.content = Content::Pending) {
            return None;
        }
        self.last_load += 1;
        let serial = self.last_load;
        self.node_opt_mut(id)?.load = Some(serial);
        Some(LoadTicket { node: id, serial })
    }

    /// Deliver the measured bounds of a finished load. The node relayouts on the next commit.
    ///
    /// Results for removed nodes and superseded tickets are discarded.
    pub fn complete_load(&mut self, ticket: LoadTicket, bounds: Aabb) -> Result<(), LoadError> {
        let Some(node) = self.node_opt_mut(ticket.node) else {
            debug!(node = ?ticket.node, "discarding load result for a removed node");
            return Err(LoadError::NodeRemoved(ticket.node));
        };
        if node.load != Some(ticket.serial) {
            debug!(node = ?ticket.node, "discarding superseded load result");
            return Err(LoadError::Superseded(ticket.node));
        }
        node.load = None;
        self.edit(ticket.node, |l| l.content = Content::Intrinsic(bounds));
        Ok(())
    }

    /// Abandon the load in flight for `id`, if any. The content stays pending.
    pub fn cancel_load(&mut self, id: NodeId) -> bool {
        self.node_opt_mut(id)
            .is_some_and(|n| n.load.take().is_some())
    }

    /// Whether `id` has a load in flight.
    pub fn is_loading(&self, id: NodeId) -> bool {
        self.load_serial(id).is_some()
    }
}
