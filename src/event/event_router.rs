// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The subscription table and dispatch fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::identity::InstallationId;

use super::{DriverEvent, EventKind, SubscriberId};

/// Type alias for subscriber callbacks.
pub type EventCallback = Arc<dyn Fn(&EventRecord) + Send + Sync>;

/// One dispatched event, as delivered to every subscriber.
///
/// The record wraps the normalized [`DriverEvent`] with the globally-unique
/// device identifier (injected whenever the event carries a node id) and
/// the dispatch timestamp. The event payload flattens into the record on
/// serialization, so a forwarded record reads as one flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// The event kind.
    #[serde(rename = "event")]
    pub kind: EventKind,
    /// Global device identifier, present when the event carries a node id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// When the record was dispatched.
    #[serde(rename = "timestamp")]
    pub at: DateTime<Utc>,
    /// The event payload.
    #[serde(flatten)]
    pub event: DriverEvent,
}

/// Routes normalized driver events to all current subscribers.
///
/// The router owns the subscription table: event kind → subscriber id →
/// callback. It is process-wide state with the lifetime of the driver
/// session, initialized empty and only torn down at process exit.
///
/// # Dispatch semantics
///
/// - The callback set is snapshotted at the start of each dispatch; a
///   subscriber added or removed during dispatch does not affect the
///   current pass.
/// - Each current subscriber of a kind receives exactly one call per
///   dispatch; ordering across subscribers is unspecified.
/// - Dispatching a kind with zero subscribers is a no-op.
///
/// No lock is held while a callback runs, so callbacks may freely
/// subscribe or unsubscribe.
pub struct EventRouter {
    identity: InstallationId,
    subscriptions: RwLock<HashMap<EventKind, HashMap<SubscriberId, EventCallback>>>,
}

impl EventRouter {
    /// Creates an empty router that stamps identifiers with the given
    /// installation identity.
    #[must_use]
    pub fn new(identity: InstallationId) -> Self {
        Self {
            identity,
            subscriptions: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the installation identity used for identifier injection.
    #[must_use]
    pub fn identity(&self) -> &InstallationId {
        &self.identity
    }

    /// Registers a callback for one event kind.
    ///
    /// If the subscriber already holds a callback for this kind, it is
    /// silently replaced.
    pub fn subscribe<F>(&self, subscriber: SubscriberId, kind: EventKind, callback: F)
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        tracing::debug!(subscriber = %subscriber, kind = %kind, "subscribing");
        self.subscriptions
            .write()
            .entry(kind)
            .or_default()
            .insert(subscriber, Arc::new(callback));
    }

    /// Registers one callback for every event kind.
    ///
    /// The same callback instance is shared across all kinds, so an
    /// endpoint that forwards everything registers exactly once.
    pub fn subscribe_all<F>(&self, subscriber: SubscriberId, callback: F)
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        tracing::debug!(subscriber = %subscriber, "subscribing to all event kinds");
        let callback: EventCallback = Arc::new(callback);
        let mut subscriptions = self.subscriptions.write();
        for kind in EventKind::ALL {
            subscriptions
                .entry(kind)
                .or_default()
                .insert(subscriber, Arc::clone(&callback));
        }
    }

    /// Removes every subscription entry for a subscriber.
    ///
    /// Scans each kind's table; absence from some or all kinds is not an
    /// error. Returns the number of entries removed.
    pub fn unsubscribe(&self, subscriber: SubscriberId) -> usize {
        let mut subscriptions = self.subscriptions.write();
        let mut removed = 0;
        for table in subscriptions.values_mut() {
            if table.remove(&subscriber).is_some() {
                removed += 1;
            }
        }
        tracing::debug!(subscriber = %subscriber, removed, "unsubscribed");
        removed
    }

    /// Dispatches an event to every current subscriber of its kind.
    ///
    /// The global device identifier is injected into the record whenever
    /// the event carries a node id. Returns the dispatched record.
    pub fn dispatch(&self, event: DriverEvent) -> EventRecord {
        let kind = event.kind();
        let uuid = event.node_id().map(|node| self.identity.global_id(node));
        let record = EventRecord {
            kind,
            uuid,
            at: Utc::now(),
            event,
        };

        // Snapshot so (un)subscription during fan-out cannot affect this pass.
        let callbacks: Vec<EventCallback> = {
            let subscriptions = self.subscriptions.read();
            subscriptions
                .get(&kind)
                .map(|table| table.values().cloned().collect())
                .unwrap_or_default()
        };

        tracing::trace!(kind = %kind, subscribers = callbacks.len(), "dispatching");
        for callback in &callbacks {
            callback(&record);
        }
        record
    }

    /// Returns the number of subscribers registered for a kind.
    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions
            .read()
            .get(&kind)
            .map_or(0, HashMap::len)
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total: usize = self.subscriptions.read().values().map(HashMap::len).sum();
        f.debug_struct("EventRouter")
            .field("identity", &self.identity)
            .field("subscription_count", &total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeId;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn test_router() -> EventRouter {
        EventRouter::new(InstallationId::with_prefix("aabbcc"))
    }

    fn node_added(id: u32) -> DriverEvent {
        DriverEvent::NodeAdded {
            node_id: NodeId::new(id),
        }
    }

    #[test]
    fn dispatch_with_no_subscribers_is_noop() {
        let router = test_router();
        let record = router.dispatch(node_added(1));
        assert_eq!(record.kind, EventKind::NodeAdded);
    }

    #[test]
    fn dispatch_reaches_every_subscriber_of_kind() {
        let router = test_router();
        let counter1 = Arc::new(AtomicU32::new(0));
        let counter2 = Arc::new(AtomicU32::new(0));

        let c1 = counter1.clone();
        router.subscribe(SubscriberId::new(), EventKind::NodeAdded, move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        let c2 = counter2.clone();
        router.subscribe(SubscriberId::new(), EventKind::NodeAdded, move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        router.dispatch(node_added(1));
        assert_eq!(counter1.load(Ordering::SeqCst), 1);
        assert_eq!(counter2.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_does_not_cross_kinds() {
        let router = test_router();
        let counter = Arc::new(AtomicU32::new(0));

        let c = counter.clone();
        router.subscribe(SubscriberId::new(), EventKind::ScanComplete, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        router.dispatch(node_added(1));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        router.dispatch(DriverEvent::ScanComplete {});
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resubscribe_replaces_rather_than_duplicates() {
        let router = test_router();
        let subscriber = SubscriberId::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));

        let c = first.clone();
        router.subscribe(subscriber, EventKind::NodeAdded, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = second.clone();
        router.subscribe(subscriber, EventKind::NodeAdded, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        router.dispatch(node_added(1));
        // Exactly one invocation, through the replacement callback.
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(router.subscriber_count(EventKind::NodeAdded), 1);
    }

    #[test]
    fn unsubscribe_removes_across_all_kinds() {
        let router = test_router();
        let subscriber = SubscriberId::new();
        router.subscribe_all(subscriber, |_| {});

        assert_eq!(router.subscriber_count(EventKind::NodeAdded), 1);
        assert_eq!(router.subscriber_count(EventKind::ScanComplete), 1);

        let removed = router.unsubscribe(subscriber);
        assert_eq!(removed, 9);
        for kind in EventKind::ALL {
            assert_eq!(router.subscriber_count(kind), 0);
        }
    }

    #[test]
    fn unsubscribe_unknown_subscriber_is_harmless() {
        let router = test_router();
        assert_eq!(router.unsubscribe(SubscriberId::new()), 0);
    }

    #[test]
    fn subscribe_all_delivers_every_kind_once() {
        let router = test_router();
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        router.subscribe_all(SubscriberId::new(), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        router.dispatch(node_added(1));
        router.dispatch(DriverEvent::ScanComplete {});
        router.dispatch(DriverEvent::Notification {
            node_id: NodeId::new(1),
            text: "node awake".to_string(),
        });
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unsubscribe_mid_dispatch_spares_current_pass() {
        let router = Arc::new(test_router());
        let self_removing = SubscriberId::new();
        let bystander = SubscriberId::new();

        let calls = Arc::new(AtomicU32::new(0));
        let bystander_calls = Arc::new(AtomicU32::new(0));

        let router_clone = Arc::clone(&router);
        let c = calls.clone();
        router.subscribe(self_removing, EventKind::NodeAdded, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            router_clone.unsubscribe(self_removing);
        });
        let c = bystander_calls.clone();
        router.subscribe(bystander, EventKind::NodeAdded, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        // First pass: both run regardless of iteration order.
        router.dispatch(node_added(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bystander_calls.load(Ordering::SeqCst), 1);

        // Second pass: the self-removing subscriber is gone.
        router.dispatch(node_added(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bystander_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn uuid_injected_for_node_events() {
        let router = test_router();
        let record = router.dispatch(node_added(7));
        assert_eq!(record.uuid.as_deref(), Some("aabbcc.ZW.node7"));
    }

    #[test]
    fn uuid_absent_for_driver_level_events() {
        let router = test_router();
        let record = router.dispatch(DriverEvent::ScanComplete {});
        assert!(record.uuid.is_none());
    }

    #[test]
    fn record_serializes_flat() {
        let router = test_router();
        let record = router.dispatch(node_added(7));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["event"], "node added");
        assert_eq!(value["nodeid"], 7);
        assert_eq!(value["uuid"], "aabbcc.ZW.node7");
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn callback_sees_injected_uuid() {
        let router = test_router();
        let seen = Arc::new(parking_lot::Mutex::new(None::<String>));
        let s = seen.clone();
        router.subscribe(SubscriberId::new(), EventKind::NodeAdded, move |record| {
            *s.lock() = record.uuid.clone();
        });

        router.dispatch(node_added(12));
        assert_eq!(seen.lock().as_deref(), Some("aabbcc.ZW.node12"));
    }
}
