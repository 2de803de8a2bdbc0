// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The driver adapter.
//!
//! This module owns the single live connection to the mesh-network driver.
//! The driver itself is a black box behind the [`MeshDriver`] trait: an
//! event source (nine raw notification kinds) and a command sink (four
//! outbound command kinds plus poll activation).
//!
//! [`SessionPool::attach`] opens a session: it builds the registry and
//! router, starts consuming the driver's event channel, and only then
//! issues the single `connect()` call. At most one session is live per
//! process; further attach calls reuse it.
//!
//! # Examples
//!
//! ```no_run
//! use zwbridge::driver::{DriverConfig, SessionPool};
//! use zwbridge::identity::InstallationId;
//!
//! # fn open_driver(
//! #     config: &DriverConfig,
//! # ) -> Result<
//! #     (std::sync::Arc<dyn zwbridge::driver::MeshDriver>, zwbridge::driver::DriverEventRx),
//! #     zwbridge::error::DriverError,
//! # > {
//! #     unimplemented!()
//! # }
//! # #[tokio::main]
//! # async fn main() -> zwbridge::Result<()> {
//! let adapter = SessionPool::global().attach(
//!     "/dev/ttyUSB0",
//!     InstallationId::from_host(),
//!     DriverConfig::default(),
//!     open_driver,
//! )?;
//!
//! assert!(!adapter.is_ready()); // until the driver reports `driver ready`
//! # Ok(())
//! # }
//! ```

mod adapter;
mod config;
mod mesh_driver;
mod session;

pub use adapter::{DriverAdapter, notification_text};
pub use config::DriverConfig;
pub use mesh_driver::{DriverEventRx, DriverEventTx, MeshDriver, RawDriverEvent, event_channel};
pub use session::SessionPool;
