// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event routing for driver lifecycle notifications.
//!
//! Every driver-level event (discovery, value change, readiness, scan
//! completion, failure) is normalized into a [`DriverEvent`] and fanned out
//! by the [`EventRouter`] to all subscribers registered for that
//! [`EventKind`]. Subscribers are independently lifecycled: they register a
//! callback per event kind under their [`SubscriberId`] and are removed in
//! one call when their endpoint shuts down.
//!
//! # Examples
//!
//! ```
//! use zwbridge::event::{DriverEvent, EventKind, EventRouter, SubscriberId};
//! use zwbridge::identity::InstallationId;
//! use zwbridge::registry::NodeId;
//!
//! let router = EventRouter::new(InstallationId::with_prefix("aabbcc"));
//! let subscriber = SubscriberId::new();
//!
//! router.subscribe(subscriber, EventKind::NodeAdded, |record| {
//!     println!("{}: {:?}", record.kind, record.uuid);
//! });
//!
//! router.dispatch(DriverEvent::NodeAdded { node_id: NodeId::new(7) });
//! router.unsubscribe(subscriber);
//! ```

mod driver_event;
mod event_router;
mod subscriber_id;

pub use driver_event::{DriverEvent, EventKind};
pub use event_router::{EventCallback, EventRecord, EventRouter};
pub use subscriber_id::SubscriberId;
