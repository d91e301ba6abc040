//! Plugin identifiers.
//!
//! Legacy configurations store a bare plugin identifier (`crowdstrike`). The
//! new data model stores the fully-qualified module path of the plugin
//! (`netskope.plugins.Default.crowdstrike.main`). `PluginId` holds either form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace every built-in plugin module lives under.
pub const DEFAULT_PLUGIN_NAMESPACE: &str = "netskope.plugins.Default";

/// Entry module appended to a namespaced plugin path.
const ENTRY_MODULE: &str = "main";

/// Legacy, wrongly-cased CrowdStrike identifier.
pub const LEGACY_CROWDSTRIKE: &str = "CrowdStrike";

/// Corrected CrowdStrike identifier.
pub const CROWDSTRIKE: &str = "crowdstrike";

/// Bare identifier of the Netskope threat exchange connector.
pub const NETSKOPE: &str = "netskope";

/// Bare identifier of the Netskope ticket orchestrator connector.
pub const NETSKOPE_ITSM: &str = "netskope_itsm";

/// Returns `true` if a configuration name uses the reserved built-in prefix.
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with(DEFAULT_PLUGIN_NAMESPACE)
}

/// A plugin identifier, either bare or namespaced.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    /// Wrap an identifier as stored in the database.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The namespaced path of the Netskope threat exchange connector.
    #[must_use]
    pub fn netskope() -> Self {
        Self::new(NETSKOPE).namespaced()
    }

    /// The namespaced path of the Netskope ticket orchestrator connector.
    #[must_use]
    pub fn netskope_itsm() -> Self {
        Self::new(NETSKOPE_ITSM).namespaced()
    }

    /// Return the identifier as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is already a namespaced module path.
    #[must_use]
    pub fn is_namespaced(&self) -> bool {
        self.0.starts_with(DEFAULT_PLUGIN_NAMESPACE)
    }

    /// Build the namespaced module path for this identifier.
    ///
    /// The identifier is used verbatim, so callers must check
    /// [`is_namespaced`](Self::is_namespaced) first to avoid double-wrapping.
    #[must_use]
    pub fn namespaced(&self) -> Self {
        Self(format!(
            "{DEFAULT_PLUGIN_NAMESPACE}.{}.{ENTRY_MODULE}",
            self.0
        ))
    }
}

impl fmt::Debug for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginId({})", self.0)
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for PluginId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PluginId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_wraps_bare_identifier() {
        let id = PluginId::new("crowdstrike").namespaced();
        assert_eq!(id.as_str(), "netskope.plugins.Default.crowdstrike.main");
        assert!(id.is_namespaced());
    }

    #[test]
    fn connector_paths() {
        assert_eq!(
            PluginId::netskope().as_str(),
            "netskope.plugins.Default.netskope.main"
        );
        assert_eq!(
            PluginId::netskope_itsm().as_str(),
            "netskope.plugins.Default.netskope_itsm.main"
        );
    }

    #[test]
    fn reserved_names() {
        assert!(is_reserved_name("netskope.plugins.Default.netskope.main"));
        assert!(!is_reserved_name("My Netskope Tenant"));
    }

    #[test]
    fn serde_is_transparent() {
        let id = PluginId::new("crowdstrike");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"crowdstrike\"");

        let parsed: PluginId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
