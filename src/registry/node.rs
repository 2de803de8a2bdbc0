// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node, command-class and value types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Driver-assigned identifier of a node on the mesh network.
///
/// Node ids are opaque positive integers, unique within one driver session
/// and never reused while the device remains attached. They are the primary
/// key into the [`NodeRegistry`](super::NodeRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a node id from its raw driver value.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of a device capability category (command class).
///
/// Command classes group the values a node exposes: a wall plug carries the
/// binary-switch class, a dimmer the multilevel-switch class, and so on.
/// The two switch classes form the fixed set of classes the bridge polls
/// once a node is fully enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandClassId(u8);

impl CommandClassId {
    /// Binary switch (on/off) command class.
    pub const SWITCH_BINARY: Self = Self(0x25);

    /// Multilevel switch (dimmer) command class.
    pub const SWITCH_MULTILEVEL: Self = Self(0x26);

    /// Creates a command class id from its raw value.
    #[must_use]
    pub fn new(id: u8) -> Self {
        Self(id)
    }

    /// Returns the raw class value.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` if this class is actively polled once its node is
    /// ready.
    #[must_use]
    pub fn is_pollable(&self) -> bool {
        matches!(*self, Self::SWITCH_BINARY | Self::SWITCH_MULTILEVEL)
    }
}

impl fmt::Display for CommandClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

impl From<u8> for CommandClassId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// The most recent snapshot of one capability reading.
///
/// A snapshot keeps the current value together with its display label, unit
/// string, and the raw structured payload the driver delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSnapshot {
    /// The current value.
    pub current: serde_json::Value,
    /// Human-readable label for the value.
    pub label: String,
    /// Unit string (may be empty).
    pub units: String,
    /// The raw structured value payload from the driver.
    pub raw: serde_json::Value,
}

impl ValueSnapshot {
    /// Creates a snapshot whose raw payload mirrors the current value.
    #[must_use]
    pub fn new(current: serde_json::Value, label: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            raw: current.clone(),
            current,
            label: label.into(),
            units: units.into(),
        }
    }

    /// Creates a snapshot with an explicit raw payload.
    #[must_use]
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }
}

/// Descriptive metadata the driver delivers once a node is fully
/// enumerated.
///
/// Field names serialize to the conventional wire names (`manufacturerid`,
/// `type`, `loc`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Manufacturer name.
    #[serde(default)]
    pub manufacturer: String,
    /// Manufacturer id.
    #[serde(default, rename = "manufacturerid")]
    pub manufacturer_id: String,
    /// Product name.
    #[serde(default)]
    pub product: String,
    /// Product type.
    #[serde(default, rename = "producttype")]
    pub product_type: String,
    /// Product id.
    #[serde(default, rename = "productid")]
    pub product_id: String,
    /// Human-readable device type.
    #[serde(default, rename = "type")]
    pub node_type: String,
    /// User-assigned name.
    #[serde(default)]
    pub name: String,
    /// User-assigned location.
    #[serde(default, rename = "loc")]
    pub location: String,
}

/// Cached values of one command class: instance → value index → snapshot.
pub type ClassValues = HashMap<u8, HashMap<u8, ValueSnapshot>>;

/// One discovered node and everything cached about it.
///
/// Created empty on `node added`, metadata populated on `node ready`,
/// values mutated on every value event. Records are never individually
/// removed; the end of a driver session implicitly invalidates the whole
/// registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Descriptive metadata (empty until the node is ready).
    #[serde(flatten)]
    pub metadata: NodeMetadata,
    /// Whether the driver has delivered full metadata for this node.
    pub ready: bool,
    /// Cached values: command class → instance → value index → snapshot.
    pub classes: HashMap<CommandClassId, ClassValues>,
}

impl NodeRecord {
    /// Returns the cached snapshot for a (class, instance, index) triple.
    #[must_use]
    pub fn value(&self, class: CommandClassId, instance: u8, index: u8) -> Option<&ValueSnapshot> {
        self.classes.get(&class)?.get(&instance)?.get(&index)
    }

    /// Returns the cached command classes that require active polling.
    #[must_use]
    pub fn pollable_classes(&self) -> Vec<CommandClassId> {
        let mut classes: Vec<CommandClassId> = self
            .classes
            .keys()
            .copied()
            .filter(CommandClassId::is_pollable)
            .collect();
        classes.sort_by_key(CommandClassId::value);
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::new(7).to_string(), "7");
    }

    #[test]
    fn command_class_display_is_hex() {
        assert_eq!(CommandClassId::SWITCH_BINARY.to_string(), "0x25");
        assert_eq!(CommandClassId::new(0x71).to_string(), "0x71");
    }

    #[test]
    fn pollable_classes() {
        assert!(CommandClassId::SWITCH_BINARY.is_pollable());
        assert!(CommandClassId::SWITCH_MULTILEVEL.is_pollable());
        assert!(!CommandClassId::new(0x71).is_pollable());
    }

    #[test]
    fn snapshot_new_mirrors_current_into_raw() {
        let snapshot = ValueSnapshot::new(json!(42), "Level", "%");
        assert_eq!(snapshot.current, json!(42));
        assert_eq!(snapshot.raw, json!(42));
        assert_eq!(snapshot.label, "Level");
        assert_eq!(snapshot.units, "%");
    }

    #[test]
    fn snapshot_with_raw_keeps_structured_payload() {
        let raw = json!({"value": true, "genre": "user"});
        let snapshot = ValueSnapshot::new(json!(true), "Switch", "").with_raw(raw.clone());
        assert_eq!(snapshot.current, json!(true));
        assert_eq!(snapshot.raw, raw);
    }

    #[test]
    fn metadata_serializes_wire_names() {
        let metadata = NodeMetadata {
            manufacturer_id: "0x0086".to_string(),
            node_type: "Binary Power Switch".to_string(),
            location: "hallway".to_string(),
            ..NodeMetadata::default()
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["manufacturerid"], "0x0086");
        assert_eq!(value["type"], "Binary Power Switch");
        assert_eq!(value["loc"], "hallway");
    }

    #[test]
    fn record_value_lookup() {
        let mut record = NodeRecord::default();
        record
            .classes
            .entry(CommandClassId::SWITCH_BINARY)
            .or_default()
            .entry(1)
            .or_default()
            .insert(0, ValueSnapshot::new(json!(false), "Switch", ""));

        assert!(record.value(CommandClassId::SWITCH_BINARY, 1, 0).is_some());
        assert!(record.value(CommandClassId::SWITCH_BINARY, 2, 0).is_none());
        assert!(record.value(CommandClassId::SWITCH_MULTILEVEL, 1, 0).is_none());
    }

    #[test]
    fn record_pollable_classes_sorted() {
        let mut record = NodeRecord::default();
        record
            .classes
            .insert(CommandClassId::SWITCH_MULTILEVEL, ClassValues::default());
        record
            .classes
            .insert(CommandClassId::new(0x71), ClassValues::default());
        record
            .classes
            .insert(CommandClassId::SWITCH_BINARY, ClassValues::default());

        assert_eq!(
            record.pollable_classes(),
            vec![CommandClassId::SWITCH_BINARY, CommandClassId::SWITCH_MULTILEVEL]
        );
    }
}
