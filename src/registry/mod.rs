// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory model of the mesh network.
//!
//! The registry owns the table of discovered nodes and their cached
//! per-command-class values. It is updated by the driver adapter as
//! notifications arrive and can be read by any collaborator (for example a
//! diagnostics endpoint).
//!
//! # Examples
//!
//! ```
//! use zwbridge::registry::{CommandClassId, NodeId, NodeRegistry, ValueSnapshot};
//!
//! let registry = NodeRegistry::new();
//! let node = NodeId::new(3);
//!
//! registry.add_node(node);
//! registry.record_value(
//!     node,
//!     CommandClassId::SWITCH_BINARY,
//!     1,
//!     0,
//!     ValueSnapshot::new(false.into(), "Switch", ""),
//! );
//!
//! assert_eq!(registry.len(), 1);
//! ```

mod node;
mod node_registry;

pub use node::{ClassValues, CommandClassId, NodeId, NodeMetadata, NodeRecord, ValueSnapshot};
pub use node_registry::{NodeRegistry, StoredValue};
