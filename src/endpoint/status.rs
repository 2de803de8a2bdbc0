// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Endpoint status reporting.

use serde::{Deserialize, Serialize};

/// Status indicator color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    /// Disconnected or failed.
    Red,
    /// Connected.
    Green,
    /// Error while processing.
    Yellow,
}

/// Status indicator shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusShape {
    /// Hollow indicator: tentative or inactive state.
    Ring,
    /// Filled indicator: established state.
    Dot,
}

/// Connection-state indicator reported through an endpoint's status hook.
///
/// Mirrors the host's status widget: a colored shape plus a short text
/// (typically the home network id in hex once the driver is ready).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusIndicator {
    /// Indicator color.
    pub color: StatusColor,
    /// Indicator shape.
    pub shape: StatusShape,
    /// Short status text.
    pub text: String,
}

impl StatusIndicator {
    /// Connected, with the given text (usually the home id in hex).
    #[must_use]
    pub fn connected(text: impl Into<String>) -> Self {
        Self {
            color: StatusColor::Green,
            shape: StatusShape::Dot,
            text: text.into(),
        }
    }

    /// Connected but idle (driver ready, nothing to show).
    #[must_use]
    pub fn idle() -> Self {
        Self {
            color: StatusColor::Green,
            shape: StatusShape::Ring,
            text: String::new(),
        }
    }

    /// Disconnected from the driver.
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            color: StatusColor::Red,
            shape: StatusShape::Ring,
            text: "disconnected".to_string(),
        }
    }

    /// An error occurred while processing.
    #[must_use]
    pub fn error() -> Self {
        Self {
            color: StatusColor::Yellow,
            shape: StatusShape::Ring,
            text: "error".to_string(),
        }
    }
}
