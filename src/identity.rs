// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Installation identity and global device identifiers.
//!
//! Node ids assigned by the driver are only unique within one driver
//! session. To identify a device across installations, the bridge prefixes
//! the node id with a stable per-installation string derived once at
//! startup: a hardware identifier with separator characters stripped,
//! followed by the fixed `.ZW.node` marker segment.
//!
//! # Examples
//!
//! ```
//! use zwbridge::identity::InstallationId;
//! use zwbridge::registry::NodeId;
//!
//! let identity = InstallationId::with_prefix("b8:27:eb:4a:11:02");
//! assert_eq!(identity.global_id(NodeId::new(7)), "b827eb4a1102.ZW.node7");
//! ```

use std::fmt;

use crate::registry::NodeId;

/// Fixed marker segment appended to the installation prefix.
const NODE_MARKER: &str = ".ZW.node";

/// Separator characters stripped from the raw hardware identifier.
const SEPARATORS: [char; 3] = [':', '-', '.'];

/// Stable per-installation prefix used to build global device identifiers.
///
/// The prefix is derived once at startup and must remain stable for the
/// lifetime of a device within one driver session. Cloning is cheap enough
/// to hand a copy to every component that formats identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationId {
    prefix: String,
}

impl InstallationId {
    /// Derives the installation identity from the local host name.
    ///
    /// Falls back to a fixed placeholder when the host name cannot be
    /// determined, so identifier construction never fails at dispatch time.
    #[must_use]
    pub fn from_host() -> Self {
        let raw = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .unwrap_or_else(|| "unknownhost".to_string());
        Self::with_prefix(raw)
    }

    /// Builds an installation identity from an explicit hardware identifier.
    ///
    /// Separator characters (`:`, `-`, `.`) are stripped and the marker
    /// segment is appended, so `"b8:27:eb:4a:11:02"` becomes the prefix
    /// `b827eb4a1102.ZW.node`.
    #[must_use]
    pub fn with_prefix(raw: impl Into<String>) -> Self {
        let stripped: String = raw
            .into()
            .chars()
            .filter(|c| !SEPARATORS.contains(c))
            .collect();
        Self {
            prefix: format!("{stripped}{NODE_MARKER}"),
        }
    }

    /// Returns the full prefix including the marker segment.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the globally-unique identifier for a node.
    #[must_use]
    pub fn global_id(&self, node: NodeId) -> String {
        format!("{}{}", self.prefix, node.value())
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeId;

    #[test]
    fn strips_separators_and_appends_marker() {
        let identity = InstallationId::with_prefix("b8:27:eb:4a:11:02");
        assert_eq!(identity.prefix(), "b827eb4a1102.ZW.node");
    }

    #[test]
    fn strips_hyphens_and_dots() {
        let identity = InstallationId::with_prefix("host-name.local");
        assert_eq!(identity.prefix(), "hostnamelocal.ZW.node");
    }

    #[test]
    fn global_id_appends_node_id() {
        let identity = InstallationId::with_prefix("aabbcc");
        assert_eq!(identity.global_id(NodeId::new(7)), "aabbcc.ZW.node7");
        assert_eq!(identity.global_id(NodeId::new(12)), "aabbcc.ZW.node12");
    }

    #[test]
    fn from_host_produces_nonempty_prefix() {
        let identity = InstallationId::from_host();
        assert!(identity.prefix().ends_with(".ZW.node"));
        assert!(identity.prefix().len() > ".ZW.node".len());
    }

    #[test]
    fn identity_is_stable_across_calls() {
        let a = InstallationId::with_prefix("same");
        let b = InstallationId::with_prefix("same");
        assert_eq!(a, b);
        assert_eq!(
            a.global_id(NodeId::new(3)),
            b.global_id(NodeId::new(3))
        );
    }
}
