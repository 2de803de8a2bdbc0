// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The mesh driver boundary.

use tokio::sync::mpsc;

use crate::error::DriverError;
use crate::registry::{CommandClassId, NodeId, NodeMetadata, ValueSnapshot};

/// Receiving half of a driver's event channel.
pub type DriverEventRx = mpsc::UnboundedReceiver<RawDriverEvent>;

/// Sending half of a driver's event channel.
pub type DriverEventTx = mpsc::UnboundedSender<RawDriverEvent>;

/// Interface of the mesh-network driver.
///
/// The driver is an external collaborator, specified only at this
/// boundary: a command sink plus an event source. Implementations deliver
/// their notifications through the [`DriverEventRx`] channel handed to
/// [`SessionPool::attach`](super::SessionPool::attach); the bridge
/// consumes that channel with a single task, so events are fully processed
/// one at a time.
///
/// All command methods are fire-and-forget from the bridge's point of
/// view: acknowledgment surfaces later as its own inbound event (for
/// example a subsequent `value changed`).
pub trait MeshDriver: Send + Sync {
    /// Opens the driver connection. Called exactly once per session,
    /// after the bridge has started consuming the event channel.
    fn connect(&self) -> Result<(), DriverError>;

    /// Turns a basic single-instance switch on.
    fn switch_on(&self, node: NodeId) -> Result<(), DriverError>;

    /// Turns a basic single-instance switch off.
    fn switch_off(&self, node: NodeId) -> Result<(), DriverError>;

    /// Sets a dimmer level.
    fn set_level(&self, node: NodeId, level: u8) -> Result<(), DriverError>;

    /// Sets an arbitrary value on a (class, index, instance) slot.
    fn set_value(
        &self,
        node: NodeId,
        class: CommandClassId,
        index: u8,
        instance: u8,
        value: serde_json::Value,
    ) -> Result<(), DriverError>;

    /// Enables periodic polling for a (node, class) pair.
    fn enable_poll(&self, node: NodeId, class: CommandClassId) -> Result<(), DriverError>;
}

/// A raw driver notification, before normalization.
///
/// This is the closed set of nine notifications a driver can emit. The
/// adapter translates each into a registry action and a normalized
/// [`DriverEvent`](crate::event::DriverEvent) dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDriverEvent {
    /// The driver connected and reports its home network id.
    DriverReady {
        /// Home network id.
        home_id: u32,
    },
    /// The driver failed to initialize. Fatal.
    DriverFailed,
    /// A node was discovered on the mesh.
    NodeAdded {
        /// The discovered node.
        node_id: NodeId,
    },
    /// A node completed enumeration.
    NodeReady {
        /// The ready node.
        node_id: NodeId,
        /// Full metadata for the node.
        metadata: NodeMetadata,
    },
    /// A value was reported for the first time.
    ValueAdded {
        /// The node the value belongs to.
        node_id: NodeId,
        /// The value's command class.
        class: CommandClassId,
        /// Sub-endpoint instance (≥ 1).
        instance: u8,
        /// Value index within the instance.
        index: u8,
        /// The reported value.
        value: ValueSnapshot,
    },
    /// A previously reported value changed.
    ValueChanged {
        /// The node the value belongs to.
        node_id: NodeId,
        /// The value's command class.
        class: CommandClassId,
        /// Sub-endpoint instance (≥ 1).
        instance: u8,
        /// Value index within the instance.
        index: u8,
        /// The new value.
        value: ValueSnapshot,
    },
    /// A value was removed from the node.
    ValueRemoved {
        /// The node the value belonged to.
        node_id: NodeId,
        /// The value's command class.
        class: CommandClassId,
        /// Sub-endpoint instance.
        instance: u8,
        /// Value index within the instance.
        index: u8,
    },
    /// The driver reports a node notification code.
    Notification {
        /// The node the notification concerns.
        node_id: NodeId,
        /// Raw notification code.
        code: u8,
    },
    /// The initial network scan completed.
    ScanComplete,
}

/// Creates an unbounded driver event channel.
///
/// Convenience for driver implementations: keep the sender, hand the
/// receiver to [`SessionPool::attach`](super::SessionPool::attach).
#[must_use]
pub fn event_channel() -> (DriverEventTx, DriverEventRx) {
    mpsc::unbounded_channel()
}
