// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Externally-visible subscriber/publisher endpoints.
//!
//! Endpoints are the thin edge of the bridge:
//!
//! - An [`InboundEndpoint`] subscribes to all event kinds and forwards
//!   each dispatched record outward through a caller-supplied sink.
//! - An [`OutboundEndpoint`] receives (topic, payload) command messages
//!   and translates them into driver calls.
//!
//! Both report connection state through a status hook
//! ([`StatusIndicator`]) and local failures through an error hook. An
//! endpoint constructed without a resolvable controller reports the
//! problem and stays inert: no subscriptions are made and no commands are
//! issued, but nothing crashes.

mod inbound;
mod outbound;
mod status;

pub use inbound::{InboundEndpoint, InboundEndpointBuilder, OutboundMessage};
pub use outbound::{OutboundEndpoint, OutboundEndpointBuilder};
pub use status::{StatusColor, StatusIndicator, StatusShape};

use std::sync::Arc;

use crate::error::Error;

/// Hook invoked with every status transition.
pub(crate) type StatusHook = Arc<dyn Fn(&StatusIndicator) + Send + Sync>;

/// Hook invoked with every locally reported error.
pub(crate) type ErrorHook = Arc<dyn Fn(&Error) + Send + Sync>;
