// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized driver event types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::{CommandClassId, NodeId, NodeMetadata, ValueSnapshot};

/// The closed set of driver lifecycle event kinds.
///
/// Each kind corresponds to one raw driver notification. Subscriptions are
/// keyed by kind; [`DriverEvent`] carries the kind-specific payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The driver connected and reported the home network id.
    #[serde(rename = "driver ready")]
    DriverReady,
    /// The driver failed to initialize (fatal).
    #[serde(rename = "driver failed")]
    DriverFailed,
    /// A node was discovered on the mesh.
    #[serde(rename = "node added")]
    NodeAdded,
    /// A node finished enumeration and delivered full metadata.
    #[serde(rename = "node ready")]
    NodeReady,
    /// A value was cached for the first time.
    #[serde(rename = "value added")]
    ValueAdded,
    /// A cached value changed.
    #[serde(rename = "value changed")]
    ValueChanged,
    /// A cached value was deleted.
    #[serde(rename = "value deleted")]
    ValueDeleted,
    /// The driver reported a node notification code.
    #[serde(rename = "notification")]
    Notification,
    /// The initial network scan completed.
    #[serde(rename = "scan complete")]
    ScanComplete,
}

impl EventKind {
    /// All event kinds, in driver-notification order.
    pub const ALL: [Self; 9] = [
        Self::DriverReady,
        Self::DriverFailed,
        Self::NodeAdded,
        Self::NodeReady,
        Self::ValueAdded,
        Self::ValueChanged,
        Self::ValueDeleted,
        Self::Notification,
        Self::ScanComplete,
    ];

    /// Returns the conventional spaced name (`"value changed"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriverReady => "driver ready",
            Self::DriverFailed => "driver failed",
            Self::NodeAdded => "node added",
            Self::NodeReady => "node ready",
            Self::ValueAdded => "value added",
            Self::ValueChanged => "value changed",
            Self::ValueDeleted => "value deleted",
            Self::Notification => "notification",
            Self::ScanComplete => "scan complete",
        }
    }

    /// Returns a hyphenated form suitable for topic segments
    /// (`"value-changed"`).
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Self::DriverReady => "driver-ready",
            Self::DriverFailed => "driver-failed",
            Self::NodeAdded => "node-added",
            Self::NodeReady => "node-ready",
            Self::ValueAdded => "value-added",
            Self::ValueChanged => "value-changed",
            Self::ValueDeleted => "value-deleted",
            Self::Notification => "notification",
            Self::ScanComplete => "scan-complete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized driver lifecycle event.
///
/// One payload variant per [`EventKind`]. Field names serialize to the
/// conventional wire names (`nodeid`, `cmdclass`, `cmdidx`, `currState`,
/// ...) so forwarded payloads match what downstream consumers expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DriverEvent {
    /// Driver connected; mesh scan is starting.
    DriverReady {
        /// The home network id reported by the driver.
        #[serde(rename = "homeid")]
        home_id: u32,
        /// The home id in hex notation (`0x1a2b3c4d`).
        #[serde(rename = "homeHex")]
        home_hex: String,
    },

    /// Driver initialization failed. Fatal: no transceiver was found.
    DriverFailed {},

    /// A node was discovered.
    NodeAdded {
        /// The discovered node.
        #[serde(rename = "nodeid")]
        node_id: NodeId,
    },

    /// A node completed enumeration.
    NodeReady {
        /// The ready node.
        #[serde(rename = "nodeid")]
        node_id: NodeId,
        /// Full metadata delivered by the driver.
        #[serde(rename = "nodeinfo")]
        metadata: NodeMetadata,
    },

    /// A value was cached for the first time.
    ValueAdded {
        /// The node the value belongs to.
        #[serde(rename = "nodeid")]
        node_id: NodeId,
        /// The value's command class.
        #[serde(rename = "cmdclass")]
        class: CommandClassId,
        /// Sub-endpoint instance (≥ 1).
        instance: u8,
        /// Value index within the instance.
        #[serde(rename = "cmdidx")]
        index: u8,
        /// The current value.
        #[serde(rename = "currState")]
        current: serde_json::Value,
        /// Display label.
        label: String,
        /// Unit string.
        units: String,
        /// Raw structured value payload.
        #[serde(rename = "value")]
        raw: serde_json::Value,
    },

    /// A cached value changed on a ready node.
    ValueChanged {
        /// The node the value belongs to.
        #[serde(rename = "nodeid")]
        node_id: NodeId,
        /// The value's command class.
        #[serde(rename = "cmdclass")]
        class: CommandClassId,
        /// Sub-endpoint instance (≥ 1).
        instance: u8,
        /// Value index within the instance.
        #[serde(rename = "cmdidx")]
        index: u8,
        /// The value cached immediately before this update.
        #[serde(rename = "oldState")]
        previous: Option<serde_json::Value>,
        /// The new value.
        #[serde(rename = "currState")]
        current: serde_json::Value,
        /// Display label.
        label: String,
        /// Unit string.
        units: String,
        /// Raw structured value payload.
        #[serde(rename = "value")]
        raw: serde_json::Value,
    },

    /// A cached value was deleted.
    ValueDeleted {
        /// The node the value belonged to.
        #[serde(rename = "nodeid")]
        node_id: NodeId,
        /// The value's command class.
        #[serde(rename = "cmdclass")]
        class: CommandClassId,
        /// Value index within the instance.
        #[serde(rename = "cmdidx")]
        index: u8,
        /// Sub-endpoint instance.
        instance: u8,
    },

    /// A node notification, translated to human-readable text.
    Notification {
        /// The node the notification concerns.
        #[serde(rename = "nodeid")]
        node_id: NodeId,
        /// Human-readable notification text.
        #[serde(rename = "notification")]
        text: String,
    },

    /// The initial network scan completed.
    ScanComplete {},
}

impl DriverEvent {
    /// Returns the kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DriverReady { .. } => EventKind::DriverReady,
            Self::DriverFailed {} => EventKind::DriverFailed,
            Self::NodeAdded { .. } => EventKind::NodeAdded,
            Self::NodeReady { .. } => EventKind::NodeReady,
            Self::ValueAdded { .. } => EventKind::ValueAdded,
            Self::ValueChanged { .. } => EventKind::ValueChanged,
            Self::ValueDeleted { .. } => EventKind::ValueDeleted,
            Self::Notification { .. } => EventKind::Notification,
            Self::ScanComplete {} => EventKind::ScanComplete,
        }
    }

    /// Returns the node id carried by this event, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::NodeAdded { node_id }
            | Self::NodeReady { node_id, .. }
            | Self::ValueAdded { node_id, .. }
            | Self::ValueChanged { node_id, .. }
            | Self::ValueDeleted { node_id, .. }
            | Self::Notification { node_id, .. } => Some(*node_id),
            Self::DriverReady { .. } | Self::DriverFailed {} | Self::ScanComplete {} => None,
        }
    }

    /// Creates a `value added` event from a stored snapshot.
    #[must_use]
    pub fn value_added(
        node_id: NodeId,
        class: CommandClassId,
        instance: u8,
        index: u8,
        snapshot: &ValueSnapshot,
    ) -> Self {
        Self::ValueAdded {
            node_id,
            class,
            instance,
            index,
            current: snapshot.current.clone(),
            label: snapshot.label.clone(),
            units: snapshot.units.clone(),
            raw: snapshot.raw.clone(),
        }
    }

    /// Creates a `value changed` event from a stored snapshot and the
    /// previously cached value.
    #[must_use]
    pub fn value_changed(
        node_id: NodeId,
        class: CommandClassId,
        instance: u8,
        index: u8,
        previous: Option<serde_json::Value>,
        snapshot: &ValueSnapshot,
    ) -> Self {
        Self::ValueChanged {
            node_id,
            class,
            instance,
            index,
            previous,
            current: snapshot.current.clone(),
            label: snapshot.label.clone(),
            units: snapshot.units.clone(),
            raw: snapshot.raw.clone(),
        }
    }
}
