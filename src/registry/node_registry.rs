// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The node registry.

use std::collections::HashMap;

use parking_lot::{RwLock, RwLockReadGuard};

use super::{CommandClassId, NodeId, NodeMetadata, NodeRecord, ValueSnapshot};

/// Result of storing a value snapshot.
///
/// `previous` is the snapshot that was cached for the same
/// (class, instance, index) triple immediately before the update, if any.
/// `ready` reports whether the node had completed enumeration at the time
/// of the update; change notifications are only fanned out for ready nodes,
/// while the cache itself is updated unconditionally.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    /// The snapshot replaced by this update, if one was cached.
    pub previous: Option<ValueSnapshot>,
    /// Whether the node was marked ready when the value was stored.
    pub ready: bool,
}

/// In-memory table of discovered nodes and their cached values.
///
/// The registry is shared between the driver adapter (which mutates it) and
/// any collaborator that wants to inspect the mesh. Driver notifications
/// are serialized through a single consumer, so the lock exists only to
/// keep reads safe on multi-threaded hosts; it is never held across a
/// subscriber callback.
///
/// Node records are never individually removed: devices rarely leave a
/// deployed mesh, and the end of a driver session invalidates the whole
/// registry at once.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: RwLock<HashMap<NodeId, NodeRecord>>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh record for a newly discovered node.
    ///
    /// The record starts with an empty class map and `ready = false`. If
    /// the id is already present the record is silently replaced; the
    /// driver is trusted not to reuse ids without a prior detach.
    pub fn add_node(&self, id: NodeId) {
        tracing::debug!(node = %id, "node added to registry");
        self.nodes.write().insert(id, NodeRecord::default());
    }

    /// Stores a value snapshot, lazily allocating intermediate maps.
    ///
    /// The cache is updated unconditionally; the returned [`StoredValue`]
    /// carries whatever was cached before plus the node's readiness so the
    /// caller can decide what to fan out. A value event for a node the
    /// registry has never seen lazily creates its record.
    pub fn record_value(
        &self,
        id: NodeId,
        class: CommandClassId,
        instance: u8,
        index: u8,
        snapshot: ValueSnapshot,
    ) -> StoredValue {
        let mut nodes = self.nodes.write();
        let node = nodes.entry(id).or_default();
        let previous = node
            .classes
            .entry(class)
            .or_default()
            .entry(instance)
            .or_default()
            .insert(index, snapshot);
        StoredValue {
            previous,
            ready: node.ready,
        }
    }

    /// Deletes a cached value.
    ///
    /// Returns the removed snapshot, or `None` when the node, class,
    /// instance, or index is not cached. The miss is a silent no-op by
    /// design: the driver may legitimately emit removals for entries this
    /// cache never saw.
    pub fn remove_value(
        &self,
        id: NodeId,
        class: CommandClassId,
        instance: u8,
        index: u8,
    ) -> Option<ValueSnapshot> {
        let mut nodes = self.nodes.write();
        let node = nodes.get_mut(&id)?;
        let removed = node
            .classes
            .get_mut(&class)?
            .get_mut(&instance)?
            .remove(&index);
        if removed.is_some() {
            tracing::debug!(node = %id, class = %class, instance, index, "value removed");
        }
        removed
    }

    /// Copies full metadata onto a node and marks it ready.
    ///
    /// Returns the command classes currently cached on the node that
    /// require active polling, so the caller can enable polling for each.
    /// Polling is only useful once a device is fully enumerated, which is
    /// why activation is coupled to metadata completion.
    pub fn mark_ready(&self, id: NodeId, metadata: NodeMetadata) -> Vec<CommandClassId> {
        let mut nodes = self.nodes.write();
        let node = nodes.entry(id).or_default();
        node.metadata = metadata;
        node.ready = true;
        node.pollable_classes()
    }

    /// Returns a clone of a node record.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeRecord> {
        self.nodes.read().get(&id).cloned()
    }

    /// Returns a clone of the cached snapshot for a value.
    #[must_use]
    pub fn value(
        &self,
        id: NodeId,
        class: CommandClassId,
        instance: u8,
        index: u8,
    ) -> Option<ValueSnapshot> {
        self.nodes
            .read()
            .get(&id)
            .and_then(|node| node.value(class, instance, index).cloned())
    }

    /// Returns `true` if the node exists and has completed enumeration.
    #[must_use]
    pub fn is_ready(&self, id: NodeId) -> bool {
        self.nodes.read().get(&id).is_some_and(|node| node.ready)
    }

    /// Returns the ids of all discovered nodes.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of discovered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Returns `true` if no nodes have been discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Grants shared read access to the whole node table.
    ///
    /// Intended for diagnostics collaborators that want to walk the mesh
    /// without cloning it. Do not hold the guard across a dispatch.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<NodeId, NodeRecord>> {
        self.nodes.read()
    }
}
