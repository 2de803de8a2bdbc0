// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT forwarding bridge.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};

use crate::driver::DriverAdapter;
use crate::endpoint::{InboundEndpoint, OutboundEndpoint};
use crate::error::ProtocolError;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Bridges the driver session onto an MQTT broker.
///
/// Topic layout under the configured base topic:
/// - Events out: `<base>/event/<kind>` (e.g. `zwave/event/value-changed`),
///   payload is the dispatched record as JSON.
/// - Commands in: `<base>/cmnd/<keyword>` (e.g. `zwave/cmnd/switchOn`),
///   payload is the command object as JSON text.
///
/// # Examples
///
/// ```no_run
/// use zwbridge::protocol::MqttBridge;
/// # fn adapter() -> std::sync::Arc<zwbridge::driver::DriverAdapter> { unimplemented!() }
///
/// # async fn example() -> zwbridge::Result<()> {
/// let bridge = MqttBridge::connect("mqtt://192.168.1.50:1883", "zwave", adapter()).await?;
/// // ... events now flow to the broker, commands flow back
/// bridge.close().await;
/// # Ok(())
/// # }
/// ```
pub struct MqttBridge {
    client: AsyncClient,
    base_topic: String,
    inbound: InboundEndpoint,
    outbound: Arc<OutboundEndpoint>,
}

impl MqttBridge {
    /// Connects to an MQTT broker and starts forwarding.
    ///
    /// # Arguments
    ///
    /// * `broker_url` - The broker URL (e.g. `mqtt://192.168.1.50:1883`)
    /// * `base_topic` - Base segment for event and command topics
    /// * `adapter` - The live driver session to bridge
    ///
    /// # Errors
    ///
    /// Returns an error if the broker URL is invalid or the command
    /// subscription cannot be established.
    pub async fn connect(
        broker_url: impl Into<String>,
        base_topic: impl Into<String>,
        adapter: Arc<DriverAdapter>,
    ) -> Result<Self, ProtocolError> {
        let broker_url = broker_url.into();
        let base_topic = base_topic.into();

        let (host, port) = parse_broker_url(&broker_url)?;

        // Generate a unique client ID (PID + counter to avoid conflicts)
        let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let client_id = format!("zwbridge_{}_{}", std::process::id(), counter);

        let mut mqtt_options = MqttOptions::new(&client_id, host, port);
        mqtt_options.set_keep_alive(Duration::from_secs(30));
        mqtt_options.set_clean_session(true);

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);

        // Subscribe to command topics before the endpoints go live.
        let command_filter = format!("{base_topic}/cmnd/#");
        client
            .subscribe(&command_filter, QoS::AtLeastOnce)
            .await
            .map_err(ProtocolError::Mqtt)?;

        let outbound = Arc::new(
            OutboundEndpoint::builder(format!("{base_topic}/cmnd"))
                .controller(Arc::clone(&adapter))
                .start(),
        );

        let publisher = client.clone();
        let event_base = base_topic.clone();
        let inbound = InboundEndpoint::builder(format!("{base_topic}/event"))
            .controller(adapter)
            .sink(move |message| {
                let topic = format!("{event_base}/event/{}", message.payload.kind.slug());
                match serde_json::to_string(&message.payload) {
                    Ok(json) => {
                        if let Err(error) = publisher.try_publish(&topic, QoS::AtLeastOnce, false, json)
                        {
                            tracing::warn!(topic = %topic, %error, "event publish failed");
                        }
                    }
                    Err(error) => {
                        tracing::warn!(topic = %topic, %error, "event serialization failed");
                    }
                }
            })
            .start();

        // Spawn the event loop handler; it exits when the bridge is dropped.
        let commands = Arc::downgrade(&outbound);
        tokio::spawn(async move {
            handle_bridge_events(event_loop, commands).await;
        });

        // Give time for connection establishment and subscription
        // acknowledgment before events start flowing.
        tokio::time::sleep(Duration::from_millis(500)).await;

        tracing::info!(broker = %broker_url, base = %base_topic, "MQTT bridge connected");
        Ok(Self {
            client,
            base_topic,
            inbound,
            outbound,
        })
    }

    /// Returns the configured base topic.
    #[must_use]
    pub fn base_topic(&self) -> &str {
        &self.base_topic
    }

    /// Shuts the bridge down: closes both endpoints and disconnects from
    /// the broker.
    pub async fn close(&self) {
        self.inbound.close();
        self.outbound.close();
        if let Err(error) = self.client.disconnect().await {
            tracing::debug!(%error, "MQTT disconnect failed");
        }
    }
}

impl std::fmt::Debug for MqttBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBridge")
            .field("base_topic", &self.base_topic)
            .finish_non_exhaustive()
    }
}

/// Handles MQTT events in the background.
async fn handle_bridge_events(mut event_loop: EventLoop, outbound: Weak<OutboundEndpoint>) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT bridge connected");
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT bridge subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Some(outbound) = outbound.upgrade() else {
                    // Bridge dropped, exit loop
                    break;
                };
                if let Ok(payload) = String::from_utf8(publish.payload.to_vec()) {
                    tracing::debug!(
                        topic = %publish.topic,
                        payload = %payload,
                        "MQTT bridge received command"
                    );
                    // Parse failures are reported by the endpoint itself.
                    let _ = outbound.handle_text(&publish.topic, &payload);
                }
            }
            Ok(_) => {}
            Err(error) => {
                tracing::error!(%error, "MQTT bridge event loop error");
                break;
            }
        }
    }
}

/// Parses a broker URL into host and port.
fn parse_broker_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), 1883)
    };

    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_broker_url_with_scheme() {
        let (host, port) = parse_broker_url("mqtt://192.168.1.50:1883").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_broker_url_tcp_scheme() {
        let (host, port) = parse_broker_url("tcp://broker.local:8883").unwrap();
        assert_eq!(host, "broker.local");
        assert_eq!(port, 8883);
    }

    #[test]
    fn parse_broker_url_no_scheme() {
        let (host, port) = parse_broker_url("192.168.1.50:1883").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_broker_url_default_port() {
        let (host, port) = parse_broker_url("localhost").unwrap();
        assert_eq!(host, "localhost");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_broker_url_invalid_port() {
        assert!(parse_broker_url("localhost:not_a_port").is_err());
    }
}
