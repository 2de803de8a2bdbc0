// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Forwarding transports.
//!
//! The core endpoints are transport-agnostic: an inbound endpoint hands
//! every forwarded message to a sink closure, an outbound endpoint accepts
//! (topic, payload) pairs from anywhere. This module wires them to a
//! concrete transport. With the `mqtt` feature (default) the
//! [`MqttBridge`] publishes every dispatched event to an MQTT broker and
//! feeds command publishes back into the driver.

#[cfg(feature = "mqtt")]
mod mqtt;

#[cfg(feature = "mqtt")]
pub use mqtt::MqttBridge;
