// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The outbound (command-receiving) endpoint.

use std::sync::Arc;

use crate::command::CommandRequest;
use crate::driver::DriverAdapter;
use crate::error::{Error, Result};
use crate::event::{EventKind, SubscriberId};

use super::{ErrorHook, StatusHook, StatusIndicator};

/// Builder for [`OutboundEndpoint`].
#[must_use]
pub struct OutboundEndpointBuilder {
    name: String,
    controller: Option<Arc<DriverAdapter>>,
    on_status: Option<StatusHook>,
    on_error: Option<ErrorHook>,
}

impl OutboundEndpointBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: None,
            on_status: None,
            on_error: None,
        }
    }

    /// Sets the controller (driver session) commands are issued through.
    pub fn controller(mut self, controller: Arc<DriverAdapter>) -> Self {
        self.controller = Some(controller);
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
    /// With a controller set, the initial status reflects driver readiness
    /// and the endpoint subscribes to `driver ready` to update it.
    /// Without one, the configuration error is reported through the error
    /// hook and the endpoint stays inert.
    pub fn start(self) -> OutboundEndpoint {
        let id = SubscriberId::new();

        let Some(controller) = self.controller else {
            tracing::warn!(endpoint = %self.name, "no mesh controller configured");
            if let Some(hook) = &self.on_error {
                hook(&Error::ControllerMissing);
            }
            return OutboundEndpoint {
                id,
                name: self.name,
                controller: None,
                on_status: self.on_status,
                on_error: self.on_error,
            };
        };

        if let Some(status) = &self.on_status {
            if controller.is_ready() {
                status(&StatusIndicator::idle());
            } else {
                status(&StatusIndicator::disconnected());
            }
        }

        if let Some(status) = self.on_status.clone() {
            let session = Arc::clone(&controller);
            controller
                .router()
                .subscribe(id, EventKind::DriverReady, move |_record| {
                    let home = session.home_hex().unwrap_or_default();
                    status(&StatusIndicator::connected(home));
                });
        }

        tracing::debug!(endpoint = %self.name, subscriber = %id, "outbound endpoint started");
        OutboundEndpoint {
            id,
            name: self.name,
            controller: Some(controller),
            on_status: self.on_status,
            on_error: self.on_error,
        }
    }
}

/// Translates inbound command messages into driver calls.
///
/// Malformed payloads are non-fatal: the failure is reported through the
/// error hook (and as the returned `Err`), no driver call is issued, and
/// the endpoint keeps processing subsequent commands.
///
/// # Examples
///
/// ```no_run
/// use serde_json::json;
/// use std::sync::Arc;
/// use zwbridge::endpoint::OutboundEndpoint;
/// # fn adapter() -> Arc<zwbridge::driver::DriverAdapter> { unimplemented!() }
///
/// let endpoint = OutboundEndpoint::builder("commands-out")
///     .controller(adapter())
///     .on_error(|error| eprintln!("command dropped: {error}"))
///     .start();
///
/// let _ = endpoint.handle("home/switchOn", &json!({"nodeid": 5}));
/// endpoint.close();
/// ```
pub struct OutboundEndpoint {
    id: SubscriberId,
    name: String,
    controller: Option<Arc<DriverAdapter>>,
    on_status: Option<StatusHook>,
    on_error: Option<ErrorHook>,
}

impl OutboundEndpoint {
    /// Creates a builder for an outbound endpoint.
    pub fn builder(name: impl Into<String>) -> OutboundEndpointBuilder {
        OutboundEndpointBuilder::new(name)
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

    /// Returns `true` if the endpoint is wired to a live controller.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.controller.is_some()
    }

    /// Handles one structured command message.
    ///
    /// # Errors
    ///
    /// Returns (and reports) a [`CommandError`](crate::error::CommandError)
    /// for malformed payloads or unrecognized topics, and any driver error
    /// from issuing the call.
    pub fn handle(&self, topic: &str, payload: &serde_json::Value) -> Result<()> {
        let request = CommandRequest::parse(topic, payload).map_err(Error::Command);
        self.dispatch_parsed(topic, request)
    }

    /// Handles one textual command message.
    ///
    /// The text must parse as JSON before it is matched against the
    /// command keywords.
    ///
    /// # Errors
    ///
    /// As [`OutboundEndpoint::handle`], plus a parse error for text that
    /// is not valid JSON.
    pub fn handle_text(&self, topic: &str, text: &str) -> Result<()> {
        let request = CommandRequest::parse_text(topic, text).map_err(Error::Command);
        self.dispatch_parsed(topic, request)
    }

    fn dispatch_parsed(&self, topic: &str, request: Result<CommandRequest>) -> Result<()> {
        let Some(controller) = &self.controller else {
            let error = Error::ControllerMissing;
            self.report(&error);
            return Err(error);
        };

        match request {
            Ok(request) => {
                tracing::debug!(endpoint = %self.name, topic = %topic, ?request, "issuing command");
                controller.execute(&request).inspect_err(|error| {
                    self.report(error);
                })
            }
            Err(error) => {
                self.report(&error);
                if let Some(status) = &self.on_status {
                    status(&StatusIndicator::error());
                }
                Err(error)
            }
        }
    }

    fn report(&self, error: &Error) {
        tracing::warn!(endpoint = %self.name, %error, "command dropped");
        if let Some(hook) = &self.on_error {
            hook(error);
        }
    }

    /// Shuts the endpoint down: removes its subscriptions and reports the
    /// disconnected status.
    pub fn close(&self) {
        if let Some(controller) = &self.controller {
            if let Some(status) = &self.on_status {
                status(&StatusIndicator::disconnected());
            }
            controller.router().unsubscribe(self.id);
            tracing::debug!(endpoint = %self.name, "outbound endpoint closed");
        }
    }
}

impl std::fmt::Debug for OutboundEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundEndpoint")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverConfig, MeshDriver, RawDriverEvent};
    use crate::error::{CommandError, DriverError};
    use crate::event::EventRouter;
    use crate::identity::InstallationId;
    use crate::registry::{CommandClassId, NodeId, NodeRegistry};
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingDriver {
        calls: Mutex<Vec<String>>,
    }

    impl MeshDriver for RecordingDriver {
        fn connect(&self) -> std::result::Result<(), DriverError> {
            Ok(())
        }
        fn switch_on(&self, node: NodeId) -> std::result::Result<(), DriverError> {
            self.calls.lock().push(format!("on {node}"));
            Ok(())
        }
        fn switch_off(&self, node: NodeId) -> std::result::Result<(), DriverError> {
            self.calls.lock().push(format!("off {node}"));
            Ok(())
        }
        fn set_level(&self, node: NodeId, level: u8) -> std::result::Result<(), DriverError> {
            self.calls.lock().push(format!("level {node} {level}"));
            Ok(())
        }
        fn set_value(
            &self,
            node: NodeId,
            class: CommandClassId,
            index: u8,
            instance: u8,
            value: serde_json::Value,
        ) -> std::result::Result<(), DriverError> {
            self.calls
                .lock()
                .push(format!("value {node} {class} {index} {instance} {value}"));
            Ok(())
        }
        fn enable_poll(
            &self,
            _: NodeId,
            _: CommandClassId,
        ) -> std::result::Result<(), DriverError> {
            Ok(())
        }
    }

    fn test_adapter() -> (Arc<DriverAdapter>, Arc<RecordingDriver>) {
        let driver = Arc::new(RecordingDriver::default());
        let adapter = Arc::new(DriverAdapter::new(
            "/dev/ttyUSB0",
            DriverConfig::default(),
            Arc::clone(&driver) as Arc<dyn MeshDriver>,
            Arc::new(NodeRegistry::new()),
            Arc::new(EventRouter::new(InstallationId::with_prefix("aabbcc"))),
        ));
        (adapter, driver)
    }

    #[test]
    fn structured_commands_reach_the_driver() {
        let (adapter, driver) = test_adapter();
        let endpoint = OutboundEndpoint::builder("out")
            .controller(adapter)
            .start();

        endpoint.handle("switchOn", &json!({"nodeid": 5})).unwrap();
        endpoint.handle("setLevel", &json!({"nodeid": 5, "value": 42})).unwrap();

        assert_eq!(*driver.calls.lock(), vec!["on 5", "level 5 42"]);
    }

    #[test]
    fn malformed_text_reports_and_issues_nothing() {
        let (adapter, driver) = test_adapter();
        let errors = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&errors);
        let endpoint = OutboundEndpoint::builder("out")
            .controller(adapter)
            .on_error(move |error| sink.lock().push(error.to_string()))
            .start();

        let result = endpoint.handle_text("home/setValue", "not json");
        assert!(matches!(
            result,
            Err(Error::Command(CommandError::Parse(_)))
        ));
        assert_eq!(errors.lock().len(), 1);
        assert!(driver.calls.lock().is_empty());

        // Processing continues for subsequent commands.
        endpoint
            .handle_text("home/setValue", r#"{"nodeid": 5, "value": true}"#)
            .unwrap();
        assert_eq!(driver.calls.lock().len(), 1);
    }

    #[test]
    fn malformed_command_flips_status_to_error() {
        let (adapter, _driver) = test_adapter();
        let statuses = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&statuses);
        let endpoint = OutboundEndpoint::builder("out")
            .controller(adapter)
            .on_status(move |status| sink.lock().push(status.clone()))
            .start();

        let _ = endpoint.handle("setLevel", &json!({"nodeid": 5}));
        assert_eq!(statuses.lock().last().unwrap(), &StatusIndicator::error());
    }

    #[test]
    fn unknown_topic_is_reported() {
        let (adapter, driver) = test_adapter();
        let endpoint = OutboundEndpoint::builder("out")
            .controller(adapter)
            .start();

        let result = endpoint.handle("blink", &json!({"nodeid": 5}));
        assert!(matches!(
            result,
            Err(Error::Command(CommandError::UnknownTopic(_)))
        ));
        assert!(driver.calls.lock().is_empty());
    }

    #[test]
    fn missing_controller_reports_and_stays_inert() {
        let errors = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&errors);
        let endpoint = OutboundEndpoint::builder("out")
            .on_error(move |error| sink.lock().push(error.to_string()))
            .start();

        assert!(!endpoint.is_active());
        assert_eq!(errors.lock().as_slice(), ["no mesh controller configured"]);

        let result = endpoint.handle("switchOn", &json!({"nodeid": 5}));
        assert!(matches!(result, Err(Error::ControllerMissing)));
        // One report at start, one per refused command.
        assert_eq!(errors.lock().len(), 2);
    }

    #[test]
    fn initial_status_reflects_driver_readiness() {
        let (adapter, _driver) = test_adapter();
        let statuses = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&statuses);
        let _endpoint = OutboundEndpoint::builder("out")
            .controller(Arc::clone(&adapter))
            .on_status(move |status| sink.lock().push(status.clone()))
            .start();
        assert_eq!(statuses.lock().as_slice(), [StatusIndicator::disconnected()]);

        adapter
            .handle_raw(RawDriverEvent::DriverReady { home_id: 0xcafe })
            .unwrap();
        assert_eq!(
            statuses.lock().last().unwrap(),
            &StatusIndicator::connected("0xcafe")
        );
    }

    #[test]
    fn endpoint_started_after_ready_shows_idle() {
        let (adapter, _driver) = test_adapter();
        adapter
            .handle_raw(RawDriverEvent::DriverReady { home_id: 0xcafe })
            .unwrap();

        let statuses = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&statuses);
        let _endpoint = OutboundEndpoint::builder("out")
            .controller(adapter)
            .on_status(move |status| sink.lock().push(status.clone()))
            .start();

        assert_eq!(statuses.lock().as_slice(), [StatusIndicator::idle()]);
    }

    #[test]
    fn close_removes_subscriptions() {
        let (adapter, _driver) = test_adapter();
        let endpoint = OutboundEndpoint::builder("out")
            .controller(Arc::clone(&adapter))
            .on_status(|_| {})
            .start();

        assert_eq!(adapter.router().subscriber_count(EventKind::DriverReady), 1);
        endpoint.close();
        assert_eq!(adapter.router().subscriber_count(EventKind::DriverReady), 0);
    }
}
