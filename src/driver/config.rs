// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver construction options.

use std::time::Duration;

/// Options handed to the mesh driver when a session is opened.
///
/// These map one-to-one onto the driver's own configuration: the bridge
/// does not interpret them, it only carries them. Retry behavior in
/// particular (`driver_attempts`) is the driver's business; the bridge
/// treats initialization failure as fatal.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use zwbridge::driver::DriverConfig;
///
/// let config = DriverConfig::default()
///     .with_driver_attempts(5)
///     .with_poll_interval(Duration::from_secs(30));
///
/// assert_eq!(config.driver_attempts, 5);
/// assert!(config.suppress_refresh);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Enable the driver's own log file.
    pub logging: bool,
    /// Mirror driver logging to the console.
    pub console_output: bool,
    /// Let the driver persist its network layout.
    pub save_config: bool,
    /// How many times the driver retries initialization before giving up.
    pub driver_attempts: u8,
    /// Interval between polls of pollable command classes.
    pub poll_interval: Duration,
    /// Suppress value refreshes when nothing changed.
    pub suppress_refresh: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            logging: false,
            console_output: true,
            save_config: true,
            driver_attempts: 3,
            poll_interval: Duration::from_millis(10_000),
            suppress_refresh: true,
        }
    }
}

impl DriverConfig {
    /// Sets whether the driver writes its own log file.
    #[must_use]
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Sets whether driver logging is mirrored to the console.
    #[must_use]
    pub fn with_console_output(mut self, console_output: bool) -> Self {
        self.console_output = console_output;
        self
    }

    /// Sets whether the driver persists its network layout.
    #[must_use]
    pub fn with_save_config(mut self, save_config: bool) -> Self {
        self.save_config = save_config;
        self
    }

    /// Sets the driver's initialization retry count.
    #[must_use]
    pub fn with_driver_attempts(mut self, attempts: u8) -> Self {
        self.driver_attempts = attempts;
        self
    }

    /// Sets the poll interval for pollable command classes.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets whether no-op value refreshes are suppressed.
    #[must_use]
    pub fn with_suppress_refresh(mut self, suppress: bool) -> Self {
        self.suppress_refresh = suppress;
        self
    }
}
