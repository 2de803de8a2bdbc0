// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The inbound (event-forwarding) endpoint.

use std::sync::Arc;

use serde::Serialize;

use crate::driver::DriverAdapter;
use crate::error::Error;
use crate::event::{EventKind, EventRecord, SubscriberId};

use super::{ErrorHook, StatusHook, StatusIndicator};

/// One forwarded event, as handed to an inbound endpoint's sink.
///
/// The topic is the event kind prefixed with `zwave: `; the payload is the
/// full dispatched record (event fields plus the injected global device
/// identifier).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    /// Message topic, e.g. `zwave: value changed`.
    pub topic: String,
    /// The dispatched event record.
    pub payload: EventRecord,
}

impl OutboundMessage {
    /// Wraps a dispatched record for forwarding.
    #[must_use]
    pub fn from_record(record: &EventRecord) -> Self {
        Self {
            topic: format!("zwave: {}", record.kind),
            payload: record.clone(),
        }
    }
}

/// Builder for [`InboundEndpoint`].
#[must_use]
pub struct InboundEndpointBuilder {
    name: String,
    controller: Option<Arc<DriverAdapter>>,
    sink: Option<Arc<dyn Fn(OutboundMessage) + Send + Sync>>,
    on_status: Option<StatusHook>,
    on_error: Option<ErrorHook>,
}

impl InboundEndpointBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: None,
            sink: None,
            on_status: None,
            on_error: None,
        }
    }

    /// Sets the controller (driver session) this endpoint subscribes to.
    pub fn controller(mut self, controller: Arc<DriverAdapter>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Sets the sink every forwarded message is handed to.
    pub fn sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(OutboundMessage) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Sets the status hook.
    pub fn on_status<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StatusIndicator) + Send + Sync + 'static,
    {
        self.on_status = Some(Arc::new(hook));
        self
    }

    /// Sets the error hook.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Starts the endpoint.
    ///
    /// With a controller set, the endpoint subscribes to every event kind
    /// and begins forwarding. Without one, the configuration error is
    /// reported through the error hook and the endpoint stays inert.
    pub fn start(self) -> InboundEndpoint {
        let id = SubscriberId::new();

        let Some(controller) = self.controller else {
            tracing::warn!(endpoint = %self.name, "no mesh controller configured");
            if let Some(hook) = &self.on_error {
                hook(&Error::ControllerMissing);
            }
            return InboundEndpoint {
                id,
                name: self.name,
                controller: None,
                on_status: self.on_status,
            };
        };

        let sink = self.sink;
        let status = self.on_status.clone();
        let session = Arc::clone(&controller);
        controller.router().subscribe_all(id, move |record| {
            // Reflect the connection as live once the driver reports in.
            if record.kind == EventKind::DriverReady || session.is_ready() {
                if let Some(status) = &status {
                    let home = session.home_hex().unwrap_or_default();
                    status(&StatusIndicator::connected(home));
                }
            }
            if let Some(sink) = &sink {
                sink(OutboundMessage::from_record(record));
            }
        });

        tracing::debug!(endpoint = %self.name, subscriber = %id, "inbound endpoint started");
        InboundEndpoint {
            id,
            name: self.name,
            controller: Some(controller),
            on_status: self.on_status,
        }
    }
}

/// Forwards every dispatched event outward.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use zwbridge::endpoint::InboundEndpoint;
/// # fn adapter() -> Arc<zwbridge::driver::DriverAdapter> { unimplemented!() }
///
/// let (tx, rx) = std::sync::mpsc::channel();
/// let endpoint = InboundEndpoint::builder("events-in")
///     .controller(adapter())
///     .sink(move |message| {
///         let _ = tx.send(message);
///     })
///     .start();
///
/// // ... later
/// endpoint.close();
/// ```
pub struct InboundEndpoint {
    id: SubscriberId,
    name: String,
    controller: Option<Arc<DriverAdapter>>,
    on_status: Option<StatusHook>,
}

impl InboundEndpoint {
    /// Creates a builder for an inbound endpoint.
    pub fn builder(name: impl Into<String>) -> InboundEndpointBuilder {
        InboundEndpointBuilder::new(name)
    }

    /// The endpoint's subscriber id.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// The endpoint's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the endpoint holds live subscriptions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.controller.is_some()
    }

    /// Shuts the endpoint down: removes all of its subscriptions and
    /// reports the disconnected status.
    pub fn close(&self) {
        if let Some(controller) = &self.controller {
            if let Some(status) = &self.on_status {
                status(&StatusIndicator::disconnected());
            }
            controller.router().unsubscribe(self.id);
            tracing::debug!(endpoint = %self.name, "inbound endpoint closed");
        }
    }
}

impl std::fmt::Debug for InboundEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundEndpoint")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverConfig, MeshDriver};
    use crate::error::DriverError;
    use crate::event::{DriverEvent, EventRouter};
    use crate::identity::InstallationId;
    use crate::registry::{CommandClassId, NodeId, NodeRegistry};
    use parking_lot::Mutex;

    struct NullDriver;

    impl MeshDriver for NullDriver {
        fn connect(&self) -> Result<(), DriverError> {
            Ok(())
        }
        fn switch_on(&self, _: NodeId) -> Result<(), DriverError> {
            Ok(())
        }
        fn switch_off(&self, _: NodeId) -> Result<(), DriverError> {
            Ok(())
        }
        fn set_level(&self, _: NodeId, _: u8) -> Result<(), DriverError> {
            Ok(())
        }
        fn set_value(
            &self,
            _: NodeId,
            _: CommandClassId,
            _: u8,
            _: u8,
            _: serde_json::Value,
        ) -> Result<(), DriverError> {
            Ok(())
        }
        fn enable_poll(&self, _: NodeId, _: CommandClassId) -> Result<(), DriverError> {
            Ok(())
        }
    }

    fn test_adapter() -> Arc<DriverAdapter> {
        Arc::new(DriverAdapter::new(
            "/dev/ttyUSB0",
            DriverConfig::default(),
            Arc::new(NullDriver),
            Arc::new(NodeRegistry::new()),
            Arc::new(EventRouter::new(InstallationId::with_prefix("aabbcc"))),
        ))
    }

    #[test]
    fn forwards_events_with_topic_prefix() {
        let adapter = test_adapter();
        let messages = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&messages);
        let _endpoint = InboundEndpoint::builder("in")
            .controller(Arc::clone(&adapter))
            .sink(move |message| sink.lock().push(message))
            .start();

        adapter.router().dispatch(DriverEvent::NodeAdded {
            node_id: NodeId::new(7),
        });

        let messages = messages.lock();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "zwave: node added");
        assert_eq!(messages[0].payload.uuid.as_deref(), Some("aabbcc.ZW.node7"));
    }

    #[test]
    fn missing_controller_reports_and_stays_inert() {
        let errors = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&errors);
        let endpoint = InboundEndpoint::builder("in")
            .on_error(move |error| sink.lock().push(error.to_string()))
            .start();

        assert!(!endpoint.is_active());
        assert_eq!(errors.lock().as_slice(), ["no mesh controller configured"]);

        // Closing an inert endpoint is a no-op.
        endpoint.close();
    }

    #[test]
    fn driver_ready_reports_connected_status() {
        let adapter = test_adapter();
        let statuses = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&statuses);
        let _endpoint = InboundEndpoint::builder("in")
            .controller(Arc::clone(&adapter))
            .on_status(move |status| sink.lock().push(status.clone()))
            .start();

        adapter.router().dispatch(DriverEvent::DriverReady {
            home_id: 0x1aa_22bb,
            home_hex: "0x1aa22bb".to_string(),
        });

        let statuses = statuses.lock();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].color, super::super::StatusColor::Green);
    }

    #[test]
    fn close_unsubscribes_and_reports_disconnected() {
        let adapter = test_adapter();
        let messages = Arc::new(Mutex::new(Vec::new()));
        let statuses = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&messages);
        let status_sink = Arc::clone(&statuses);
        let endpoint = InboundEndpoint::builder("in")
            .controller(Arc::clone(&adapter))
            .sink(move |message| sink.lock().push(message))
            .on_status(move |status| status_sink.lock().push(status.clone()))
            .start();

        assert_eq!(adapter.router().subscriber_count(EventKind::NodeAdded), 1);
        endpoint.close();
        assert_eq!(adapter.router().subscriber_count(EventKind::NodeAdded), 0);

        adapter.router().dispatch(DriverEvent::NodeAdded {
            node_id: NodeId::new(7),
        });
        assert!(messages.lock().is_empty());
        assert_eq!(statuses.lock().last().unwrap(), &StatusIndicator::disconnected());
    }

    #[test]
    fn two_endpoints_forward_independently() {
        let adapter = test_adapter();
        let first = Arc::new(Mutex::new(0u32));
        let second = Arc::new(Mutex::new(0u32));

        let sink = Arc::clone(&first);
        let endpoint1 = InboundEndpoint::builder("one")
            .controller(Arc::clone(&adapter))
            .sink(move |_| *sink.lock() += 1)
            .start();
        let sink = Arc::clone(&second);
        let _endpoint2 = InboundEndpoint::builder("two")
            .controller(Arc::clone(&adapter))
            .sink(move |_| *sink.lock() += 1)
            .start();

        adapter.router().dispatch(DriverEvent::ScanComplete {});
        assert_eq!(*first.lock(), 1);
        assert_eq!(*second.lock(), 1);

        endpoint1.close();
        adapter.router().dispatch(DriverEvent::ScanComplete {});
        assert_eq!(*first.lock(), 1);
        assert_eq!(*second.lock(), 2);
    }
}
