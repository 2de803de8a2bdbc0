// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriber identifier type.

use std::fmt;

use uuid::Uuid;

/// Opaque identifier of one endpoint instance in the subscription table.
///
/// This is a wrapper around UUID v4 that provides a distinct type for
/// subscriber identification. A subscriber holds at most one callback per
/// event kind; re-subscribing the same id to the same kind replaces the
/// prior callback.
///
/// # Examples
///
/// ```
/// use zwbridge::event::SubscriberId;
///
/// let id = SubscriberId::new();
/// println!("Subscriber: {}", id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    /// Creates a new unique subscriber identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a subscriber identifier from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show only first 8 characters for readability
        let short = &self.0.to_string()[..8];
        write!(f, "SubscriberId({short}...)")
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SubscriberId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_unique_ids() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn from_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = SubscriberId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn debug_format_is_shortened() {
        let id = SubscriberId::new();
        let debug = format!("{id:?}");
        assert!(debug.starts_with("SubscriberId("));
        assert!(debug.ends_with("...)"));
    }

    #[test]
    fn hashable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        let id = SubscriberId::new();
        set.insert(id);
        assert!(set.contains(&id));
    }
}
