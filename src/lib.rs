// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `zwbridge` - a stateful bridge between a Z-Wave mesh-network driver and
//! independent subscriber endpoints.
//!
//! The bridge maintains a live model of every node discovered on the mesh,
//! tracks their per-command-class values, and re-broadcasts each driver
//! lifecycle event (discovery, value change, readiness, scan completion,
//! failure) to any number of dynamically (un)registered subscribers.
//!
//! # Architecture
//!
//! - [`registry::NodeRegistry`] - the in-memory node/value cache, updated
//!   as notifications arrive from the driver.
//! - [`event::EventRouter`] - the subscription table and fan-out: each
//!   normalized event reaches every subscriber registered for its kind.
//! - [`driver::DriverAdapter`] - owns the single live driver connection,
//!   translates its nine raw notifications into registry actions and
//!   dispatches, and issues outbound commands.
//! - [`endpoint`] - thin inbound/outbound endpoints that forward events
//!   outward and translate command messages into driver calls.
//!
//! Driver notifications are serialized through one consumer: each event is
//! fully processed (registry mutation plus synchronous fan-out) before the
//! next is handled.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use zwbridge::driver::{DriverConfig, DriverEventRx, MeshDriver, SessionPool};
//! use zwbridge::endpoint::InboundEndpoint;
//! use zwbridge::identity::InstallationId;
//!
//! # fn open_driver(
//! #     config: &DriverConfig,
//! # ) -> Result<(Arc<dyn MeshDriver>, DriverEventRx), zwbridge::DriverError> {
//! #     unimplemented!()
//! # }
//! #[tokio::main]
//! async fn main() -> zwbridge::Result<()> {
//!     // At most one driver session is live per process; a second attach
//!     // reuses it, registry and all.
//!     let adapter = SessionPool::global().attach(
//!         "/dev/ttyUSB0",
//!         InstallationId::from_host(),
//!         DriverConfig::default(),
//!         open_driver,
//!     )?;
//!
//!     // Forward every driver event outward.
//!     let endpoint = InboundEndpoint::builder("events-in")
//!         .controller(Arc::clone(&adapter))
//!         .sink(|message| println!("{}: {:?}", message.topic, message.payload.uuid))
//!         .start();
//!
//!     // ... run until shutdown, then:
//!     endpoint.close();
//!     Ok(())
//! }
//! ```
//!
//! # MQTT Forwarding
//!
//! With the `mqtt` feature (default), [`protocol::MqttBridge`] publishes
//! every event to a broker and feeds command publishes back to the driver:
//!
//! ```no_run
//! use zwbridge::protocol::MqttBridge;
//! # fn adapter() -> std::sync::Arc<zwbridge::driver::DriverAdapter> { unimplemented!() }
//!
//! # async fn example() -> zwbridge::Result<()> {
//! let bridge = MqttBridge::connect("mqtt://192.168.1.50:1883", "zwave", adapter()).await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod identity;
pub mod protocol;
pub mod registry;

pub use command::CommandRequest;
pub use driver::{DriverAdapter, DriverConfig, MeshDriver, RawDriverEvent, SessionPool};
pub use endpoint::{
    InboundEndpoint, OutboundEndpoint, OutboundMessage, StatusColor, StatusIndicator, StatusShape,
};
pub use error::{CommandError, DriverError, Error, ProtocolError, Result};
pub use event::{DriverEvent, EventKind, EventRecord, EventRouter, SubscriberId};
pub use identity::InstallationId;
#[cfg(feature = "mqtt")]
pub use protocol::MqttBridge;
pub use registry::{
    CommandClassId, NodeId, NodeMetadata, NodeRecord, NodeRegistry, ValueSnapshot,
};
