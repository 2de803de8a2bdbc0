// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation between raw driver notifications and the core.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::command::CommandRequest;
use crate::error::{DriverError, Error, Result};
use crate::event::{DriverEvent, EventRouter};
use crate::registry::{CommandClassId, NodeId, NodeRegistry};

use super::{DriverConfig, MeshDriver, RawDriverEvent};

/// Translates a driver notification code into human-readable text.
///
/// Codes outside the mapped range render as `unknown notification: N`.
#[must_use]
pub fn notification_text(code: u8) -> String {
    match code {
        0 => "message complete".to_string(),
        1 => "timeout".to_string(),
        2 => "nop".to_string(),
        3 => "node awake".to_string(),
        4 => "node asleep".to_string(),
        5 => "node dead".to_string(),
        6 => "node alive".to_string(),
        other => format!("unknown notification: {other}"),
    }
}

/// Explicit per-session driver state, queryable by endpoints.
#[derive(Debug, Default)]
struct SessionState {
    home_id: Option<u32>,
    home_hex: Option<String>,
    ready: bool,
}

/// Owns the live driver connection and translates its notifications.
///
/// Each of the nine raw driver events becomes a registry action and/or a
/// dispatch through the [`EventRouter`]; the four outbound command kinds
/// become driver calls. The adapter also tracks explicit session state
/// (home network id, readiness) that endpoints query instead of reading
/// ambient globals.
///
/// Adapters are built by [`SessionPool::attach`](super::SessionPool::attach),
/// which guarantees at most one live driver connection per process.
pub struct DriverAdapter {
    port: String,
    config: DriverConfig,
    driver: Arc<dyn MeshDriver>,
    registry: Arc<NodeRegistry>,
    router: Arc<EventRouter>,
    state: RwLock<SessionState>,
}

impl DriverAdapter {
    /// Wires an adapter over an already-constructed driver.
    pub(crate) fn new(
        port: impl Into<String>,
        config: DriverConfig,
        driver: Arc<dyn MeshDriver>,
        registry: Arc<NodeRegistry>,
        router: Arc<EventRouter>,
    ) -> Self {
        Self {
            port: port.into(),
            config,
            driver,
            registry,
            router,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Issues the driver's single connect call.
    pub(crate) fn connect(&self) -> Result<()> {
        self.driver.connect()?;
        tracing::info!(port = %self.port, "mesh driver is active");
        Ok(())
    }

    /// The serial port this session was opened on.
    #[must_use]
    pub fn port(&self) -> &str {
        &self.port
    }

    /// The configuration the driver was opened with.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The shared node registry for this session.
    #[must_use]
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// The event router for this session.
    #[must_use]
    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    /// Returns `true` once the driver has reported ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.read().ready
    }

    /// The home network id, once the driver has reported ready.
    #[must_use]
    pub fn home_id(&self) -> Option<u32> {
        self.state.read().home_id
    }

    /// The home network id in hex notation, once reported.
    #[must_use]
    pub fn home_hex(&self) -> Option<String> {
        self.state.read().home_hex.clone()
    }

    // =========================================================================
    // Inbound: raw driver notifications
    // =========================================================================

    /// Processes one raw driver notification.
    ///
    /// Notifications must be handled one at a time; the session's event
    /// pump guarantees this. The registry mutation and the synchronous
    /// fan-out both complete before the method returns.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InitFailed`] for `DriverFailed`: the failure
    /// is fatal (no transceiver at the configured port) and the embedding
    /// process is expected to terminate.
    pub fn handle_raw(&self, raw: RawDriverEvent) -> Result<()> {
        match raw {
            RawDriverEvent::DriverReady { home_id } => {
                let home_hex = format!("0x{home_id:x}");
                {
                    let mut state = self.state.write();
                    state.home_id = Some(home_id);
                    state.home_hex = Some(home_hex.clone());
                }
                tracing::info!(home = %home_hex, "scanning mesh network");
                self.router.dispatch(DriverEvent::DriverReady { home_id, home_hex });
                self.state.write().ready = true;
                Ok(())
            }

            RawDriverEvent::DriverFailed => {
                tracing::error!(
                    port = %self.port,
                    "failed to start mesh driver, is a transceiver attached?"
                );
                self.router.dispatch(DriverEvent::DriverFailed {});
                Err(Error::Driver(DriverError::InitFailed {
                    port: self.port.clone(),
                }))
            }

            RawDriverEvent::NodeAdded { node_id } => {
                self.registry.add_node(node_id);
                self.router.dispatch(DriverEvent::NodeAdded { node_id });
                Ok(())
            }

            RawDriverEvent::NodeReady { node_id, metadata } => {
                let pollable = self.registry.mark_ready(node_id, metadata.clone());
                for class in pollable {
                    tracing::debug!(node = %node_id, class = %class, "enabling poll");
                    if let Err(error) = self.driver.enable_poll(node_id, class) {
                        tracing::warn!(node = %node_id, class = %class, %error, "enable poll failed");
                    }
                }
                self.router.dispatch(DriverEvent::NodeReady { node_id, metadata });
                Ok(())
            }

            RawDriverEvent::ValueAdded {
                node_id,
                class,
                instance,
                index,
                value,
            } => {
                self.registry.record_value(node_id, class, instance, index, value.clone());
                self.router.dispatch(DriverEvent::value_added(
                    node_id, class, instance, index, &value,
                ));
                Ok(())
            }

            RawDriverEvent::ValueChanged {
                node_id,
                class,
                instance,
                index,
                value,
            } => {
                // The cache is updated whether or not the node is ready;
                // subscribers only hear about changes once a baseline has
                // been established for them (node ready).
                let stored = self
                    .registry
                    .record_value(node_id, class, instance, index, value.clone());
                if stored.ready {
                    let previous = stored.previous.map(|snapshot| snapshot.current);
                    self.router.dispatch(DriverEvent::value_changed(
                        node_id, class, instance, index, previous, &value,
                    ));
                }
                Ok(())
            }

            RawDriverEvent::ValueRemoved {
                node_id,
                class,
                instance,
                index,
            } => {
                if self
                    .registry
                    .remove_value(node_id, class, instance, index)
                    .is_some()
                {
                    self.router.dispatch(DriverEvent::ValueDeleted {
                        node_id,
                        class,
                        index,
                        instance,
                    });
                }
                Ok(())
            }

            RawDriverEvent::Notification { node_id, code } => {
                let text = notification_text(code);
                tracing::debug!(node = %node_id, %text, "node notification");
                self.router.dispatch(DriverEvent::Notification { node_id, text });
                Ok(())
            }

            RawDriverEvent::ScanComplete => {
                tracing::info!("mesh network scan complete");
                self.router.dispatch(DriverEvent::ScanComplete {});
                Ok(())
            }
        }
    }

    // =========================================================================
    // Outbound: commands
    // =========================================================================

    /// Turns a basic single-instance switch on.
    pub fn switch_on(&self, node: NodeId) -> Result<()> {
        tracing::debug!(node = %node, "switch on");
        self.driver.switch_on(node).map_err(Error::from)
    }

    /// Turns a basic single-instance switch off.
    pub fn switch_off(&self, node: NodeId) -> Result<()> {
        tracing::debug!(node = %node, "switch off");
        self.driver.switch_off(node).map_err(Error::from)
    }

    /// Sets a dimmer level.
    pub fn set_level(&self, node: NodeId, level: u8) -> Result<()> {
        tracing::debug!(node = %node, level, "set level");
        self.driver.set_level(node, level).map_err(Error::from)
    }

    /// Sets an arbitrary value on a (class, index, instance) slot.
    pub fn set_value(
        &self,
        node: NodeId,
        class: CommandClassId,
        index: u8,
        instance: u8,
        value: serde_json::Value,
    ) -> Result<()> {
        tracing::debug!(node = %node, class = %class, index, instance, "set value");
        self.driver
            .set_value(node, class, index, instance, value)
            .map_err(Error::from)
    }

    /// Executes a parsed inbound command.
    pub fn execute(&self, request: &CommandRequest) -> Result<()> {
        match request.clone() {
            CommandRequest::SwitchOn { node_id } => self.switch_on(node_id),
            CommandRequest::SwitchOff { node_id } => self.switch_off(node_id),
            CommandRequest::SetLevel { node_id, value } => self.set_level(node_id, value),
            CommandRequest::SetValue {
                node_id,
                class,
                index,
                instance,
                value,
            } => self.set_value(node_id, class, index, instance, value),
        }
    }
}

impl std::fmt::Debug for DriverAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverAdapter")
            .field("port", &self.port)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}
