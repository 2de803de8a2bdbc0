// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver session lifecycle.
//!
//! Opening a mesh driver is a lengthy process and the transceiver port is
//! an exclusive resource, so at most one live driver session may exist per
//! process no matter how many controller configurations are constructed.
//! The [`SessionPool`] enforces this: the first attach opens the driver,
//! every later attach reuses the live session (and therefore the same
//! registry and router).

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{DriverError, Result};
use crate::event::EventRouter;
use crate::identity::InstallationId;
use crate::registry::NodeRegistry;

use super::{DriverAdapter, DriverConfig, DriverEventRx, MeshDriver};

/// Holder of the process's at-most-one live driver session.
///
/// The session is held through a [`Weak`] reference: when every component
/// drops its `Arc<DriverAdapter>`, the session ends and a later attach
/// opens a fresh one.
///
/// # Examples
///
/// ```no_run
/// use zwbridge::driver::{DriverConfig, SessionPool};
/// use zwbridge::identity::InstallationId;
///
/// # fn open_driver(
/// #     config: &zwbridge::driver::DriverConfig,
/// # ) -> Result<
/// #     (std::sync::Arc<dyn zwbridge::driver::MeshDriver>, zwbridge::driver::DriverEventRx),
/// #     zwbridge::error::DriverError,
/// # > {
/// #     unimplemented!()
/// # }
/// # #[tokio::main]
/// # async fn main() -> zwbridge::Result<()> {
/// let pool = SessionPool::global();
///
/// let first = pool.attach(
///     "/dev/ttyUSB0",
///     InstallationId::from_host(),
///     DriverConfig::default(),
///     open_driver,
/// )?;
///
/// // A second controller configuration reuses the live session.
/// let second = pool.attach(
///     "/dev/ttyUSB0",
///     InstallationId::from_host(),
///     DriverConfig::default(),
///     open_driver,
/// )?;
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SessionPool {
    session: Mutex<Weak<DriverAdapter>>,
}

impl SessionPool {
    /// Returns the process-wide session pool.
    pub fn global() -> &'static Self {
        use std::sync::OnceLock;
        static POOL: OnceLock<SessionPool> = OnceLock::new();
        POOL.get_or_init(Self::new)
    }

    /// Creates an isolated pool.
    ///
    /// Prefer [`SessionPool::global()`]; isolated pools exist for tests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches to the live driver session, opening one if none exists.
    ///
    /// When a session is already live its adapter is returned as-is: no
    /// second connection is opened and `identity`, `config`, and `factory`
    /// are ignored. Otherwise the factory constructs the driver and its
    /// event channel; the bridge starts consuming the channel *before*
    /// issuing the single `connect()` call, so no notification is missed.
    ///
    /// Must be called from within a tokio runtime (the event pump is a
    /// spawned task).
    ///
    /// # Errors
    ///
    /// Returns any error from the driver factory or from `connect()`.
    /// Connect failures are fatal at this layer; retries belong to the
    /// driver's own `driver_attempts` handling.
    pub fn attach<F>(
        &self,
        port: &str,
        identity: InstallationId,
        config: DriverConfig,
        factory: F,
    ) -> Result<Arc<DriverAdapter>>
    where
        F: FnOnce(&DriverConfig) -> std::result::Result<(Arc<dyn MeshDriver>, DriverEventRx), DriverError>,
    {
        let mut session = self.session.lock();
        if let Some(existing) = session.upgrade() {
            tracing::debug!(
                port = %existing.port(),
                "reusing existing driver session"
            );
            return Ok(existing);
        }

        tracing::info!(port = %port, ?config, "initializing mesh driver session");
        let (driver, events) = factory(&config)?;
        let registry = Arc::new(NodeRegistry::new());
        let router = Arc::new(EventRouter::new(identity));
        let adapter = Arc::new(DriverAdapter::new(port, config, driver, registry, router));

        // Consume driver notifications before connecting.
        spawn_event_pump(Arc::downgrade(&adapter), events);
        adapter.connect()?;

        *session = Arc::downgrade(&adapter);
        Ok(adapter)
    }

    /// Returns the live session, if one exists.
    #[must_use]
    pub fn active(&self) -> Option<Arc<DriverAdapter>> {
        self.session.lock().upgrade()
    }
}

impl std::fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPool")
            .field("active", &self.active().is_some())
            .finish()
    }
}

/// Serializes driver notifications through a single consumer.
///
/// One event is fully processed (registry mutation plus synchronous
/// fan-out) before the next is taken from the channel. The pump stops when
/// the driver closes the channel, when the session is dropped, or on a
/// fatal driver failure.
fn spawn_event_pump(adapter: Weak<DriverAdapter>, mut events: DriverEventRx) {
    tokio::spawn(async move {
        tracing::debug!("driver event pump started");
        while let Some(raw) = events.recv().await {
            let Some(adapter) = adapter.upgrade() else {
                break;
            };
            if let Err(error) = adapter.handle_raw(raw) {
                tracing::error!(%error, "driver session failed, stopping event pump");
                break;
            }
        }
        tracing::debug!("driver event pump stopped");
    });
}
