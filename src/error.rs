// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `zwbridge` library.
//!
//! This module provides the error hierarchy for failures across the
//! library: driver initialization and command delivery, inbound command
//! parsing, and transport-level forwarding.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur while bridging
/// a mesh-network driver to subscriber endpoints.
#[derive(Debug, Error)]
pub enum Error {
    /// Error raised by the mesh-network driver connection.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Error occurred while parsing or executing an inbound command.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Error occurred in the forwarding transport.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An endpoint was constructed without a resolvable controller.
    #[error("no mesh controller configured")]
    ControllerMissing,
}

/// Errors raised by the mesh-network driver connection.
///
/// `InitFailed` is fatal: the driver could not find a mesh transceiver at
/// the configured port. The embedding process is expected to terminate;
/// retries, if any, are the driver's own business (`driver_attempts`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The driver failed to initialize on the given port.
    #[error("failed to start mesh driver, is a transceiver attached to {port}?")]
    InitFailed {
        /// The serial port the driver was opened on.
        port: String,
    },

    /// A command was issued before the driver connection was established.
    #[error("driver is not connected")]
    NotConnected,

    /// The driver rejected an outbound command.
    #[error("driver rejected command: {0}")]
    CommandRejected(String),
}

/// Errors related to inbound command payloads.
///
/// These are non-fatal by design: a malformed command is reported through
/// the endpoint's error hook and processing continues with the next one.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A textual payload was not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload parsed to null or was absent.
    #[error("payload is empty")]
    EmptyPayload,

    /// The payload was structured but missing or mistyping required fields.
    #[error("invalid payload for {topic}: {message}")]
    InvalidPayload {
        /// The command topic the payload arrived on.
        topic: String,
        /// Description of what was wrong.
        message: String,
    },

    /// The topic matched none of the recognized command keywords.
    #[error("unrecognized command topic: {0}")]
    UnknownTopic(String),
}

/// Errors related to the forwarding transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Connection to the transport failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
