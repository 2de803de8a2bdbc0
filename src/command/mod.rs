// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound command parsing.
//!
//! Outbound endpoints receive commands as (topic, payload) pairs and
//! translate them into driver calls. The topic is matched by substring on
//! one of four literal keywords; the payload is a structured object (or
//! text that parses to one):
//!
//! | Topic contains | Payload |
//! |---|---|
//! | `switchOn`  | `{"nodeid": 5}` |
//! | `switchOff` | `{"nodeid": 5}` |
//! | `setLevel`  | `{"nodeid": 5, "value": 50}` |
//! | `setValue`  | `{"nodeid": 5, "cmdclass": 37, "cmdidx": 0, "instance": 1, "value": true}` |
//!
//! `setValue` fields other than `nodeid` and `value` are optional and
//! default to the basic on/off class (37), index 0, instance 1.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use zwbridge::command::CommandRequest;
//! use zwbridge::registry::NodeId;
//!
//! let request = CommandRequest::parse("home/zwave/switchOn", &json!({"nodeid": 5})).unwrap();
//! assert_eq!(request, CommandRequest::SwitchOn { node_id: NodeId::new(5) });
//! ```

use serde::Deserialize;

use crate::error::CommandError;
use crate::registry::{CommandClassId, NodeId};

/// A parsed inbound command, ready to hand to the driver adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandRequest {
    /// Turn a basic single-instance switch on.
    SwitchOn {
        /// The target node.
        node_id: NodeId,
    },
    /// Turn a basic single-instance switch off.
    SwitchOff {
        /// The target node.
        node_id: NodeId,
    },
    /// Set a dimmer level.
    SetLevel {
        /// The target node.
        node_id: NodeId,
        /// The level to set.
        value: u8,
    },
    /// Set an arbitrary value on a (class, index, instance) slot.
    SetValue {
        /// The target node.
        node_id: NodeId,
        /// The command class to address.
        class: CommandClassId,
        /// Value index within the instance.
        index: u8,
        /// Sub-endpoint instance.
        instance: u8,
        /// The value to set.
        value: serde_json::Value,
    },
}

#[derive(Deserialize)]
struct SwitchPayload {
    nodeid: u32,
}

#[derive(Deserialize)]
struct LevelPayload {
    nodeid: u32,
    value: u8,
}

#[derive(Deserialize)]
struct SetValuePayload {
    nodeid: u32,
    #[serde(default = "default_class")]
    cmdclass: u8,
    #[serde(default)]
    cmdidx: u8,
    #[serde(default = "default_instance")]
    instance: u8,
    value: serde_json::Value,
}

// Basic on/off command class.
fn default_class() -> u8 {
    37
}

fn default_instance() -> u8 {
    1
}

impl CommandRequest {
    /// Parses a structured command payload.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::EmptyPayload`] for a null payload,
    /// [`CommandError::InvalidPayload`] when required fields are missing
    /// or mistyped, and [`CommandError::UnknownTopic`] when the topic
    /// matches none of the four keywords. All of these are non-fatal:
    /// the caller reports them and keeps processing.
    pub fn parse(topic: &str, payload: &serde_json::Value) -> Result<Self, CommandError> {
        if payload.is_null() {
            return Err(CommandError::EmptyPayload);
        }

        let invalid = |error: serde_json::Error| CommandError::InvalidPayload {
            topic: topic.to_string(),
            message: error.to_string(),
        };

        if topic.contains("switchOn") {
            let payload: SwitchPayload =
                serde_json::from_value(payload.clone()).map_err(invalid)?;
            Ok(Self::SwitchOn {
                node_id: NodeId::new(payload.nodeid),
            })
        } else if topic.contains("switchOff") {
            let payload: SwitchPayload =
                serde_json::from_value(payload.clone()).map_err(invalid)?;
            Ok(Self::SwitchOff {
                node_id: NodeId::new(payload.nodeid),
            })
        } else if topic.contains("setLevel") {
            let payload: LevelPayload =
                serde_json::from_value(payload.clone()).map_err(invalid)?;
            Ok(Self::SetLevel {
                node_id: NodeId::new(payload.nodeid),
                value: payload.value,
            })
        } else if topic.contains("setValue") {
            let payload: SetValuePayload =
                serde_json::from_value(payload.clone()).map_err(invalid)?;
            Ok(Self::SetValue {
                node_id: NodeId::new(payload.nodeid),
                class: CommandClassId::new(payload.cmdclass),
                index: payload.cmdidx,
                instance: payload.instance,
                value: payload.value,
            })
        } else {
            Err(CommandError::UnknownTopic(topic.to_string()))
        }
    }

    /// Parses a textual command payload.
    ///
    /// The text must first parse as JSON; a parse failure or a null result
    /// is a reported, non-fatal error and no driver call is issued.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Parse`] for invalid JSON, plus everything
    /// [`CommandRequest::parse`] can return.
    pub fn parse_text(topic: &str, text: &str) -> Result<Self, CommandError> {
        let payload: serde_json::Value = serde_json::from_str(text)?;
        Self::parse(topic, &payload)
    }

    /// Returns the node this command targets.
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        match self {
            Self::SwitchOn { node_id }
            | Self::SwitchOff { node_id }
            | Self::SetLevel { node_id, .. }
            | Self::SetValue { node_id, .. } => *node_id,
        }
    }
}
