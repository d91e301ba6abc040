//! Document types stored in the database.
//!
//! These types model only the fields the migration reads or writes. Unknown
//! fields are ignored on read and never touched on write, because every
//! update is a `$set` of explicit keys.

use cte_migrate_core::catalog::PERIODIC_TASK_CLASS;
use cte_migrate_core::PluginId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::collections;

/// A periodic task document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Document class tag, always `PeriodicTask` for schedules we write.
    #[serde(rename = "_cls", default = "Schedule::default_class")]
    pub class: String,
    /// Identifying name.
    pub name: String,
    /// Whether the worker should run the task.
    #[serde(default)]
    pub enabled: bool,
    /// Positional task arguments; plugin tasks carry the configuration name.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Dotted task identifier.
    pub task: String,
    /// Run interval.
    pub interval: Interval,
}

impl Schedule {
    /// Create an enabled periodic task with no arguments.
    #[must_use]
    pub fn periodic(name: impl Into<String>, task: impl Into<String>, interval: Interval) -> Self {
        Self {
            class: Self::default_class(),
            name: name.into(),
            enabled: true,
            args: Vec::new(),
            task: task.into(),
            interval,
        }
    }

    fn default_class() -> String {
        PERIODIC_TASK_CLASS.to_string()
    }

    /// Returns `true` if any argument is the given string.
    #[must_use]
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a.as_str() == Some(arg))
    }
}

/// A schedule interval, e.g. every 12 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Number of periods between runs.
    pub every: i32,
    /// Unit of `every`.
    pub period: IntervalPeriod,
}

impl Interval {
    /// Every `n` minutes.
    #[must_use]
    pub const fn minutes(every: i32) -> Self {
        Self {
            every,
            period: IntervalPeriod::Minutes,
        }
    }

    /// Every `n` hours.
    #[must_use]
    pub const fn hours(every: i32) -> Self {
        Self {
            every,
            period: IntervalPeriod::Hours,
        }
    }
}

/// Interval units understood by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalPeriod {
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    Days,
}

/// The settings singleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version marker.
    #[serde(
        rename = "databaseVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub database_version: Option<String>,
    /// Every other settings field, preserved as-is.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Settings {
    /// Look up a settings field other than the version marker.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.other.get(key)
    }
}

/// The fields the 2.0.0 upgrade sets on the settings singleton.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpgrade {
    /// New schema version marker.
    pub database_version: String,
    /// Alert retention in days.
    pub alert_cleanup: i32,
    /// Whether SSO login is enabled.
    pub sso_enable: bool,
    /// SAML configuration, empty until an administrator sets it.
    pub ssosaml: Map<String, Value>,
    /// Whether the update check task may contact the update server.
    pub enable_update_checking: bool,
    /// Enabled product modules.
    pub platforms: Platforms,
}

/// Enabled product modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platforms {
    /// Threat exchange.
    pub cte: bool,
    /// Ticket orchestrator.
    pub itsm: bool,
}

/// A user document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Login name.
    pub username: String,
    /// Bcrypt password hash.
    #[serde(default)]
    pub password: String,
    /// Granted API scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Issued API tokens.
    #[serde(default)]
    pub tokens: Vec<Value>,
    /// Whether the user must change the password on next login.
    #[serde(default)]
    pub first_login: bool,
    /// Whether the user authenticates through SSO. Absent on legacy records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso: Option<bool>,
}

/// The two configuration collections the migration walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationKind {
    /// Threat exchange plugin configurations.
    Cte,
    /// Ticket orchestrator plugin configurations.
    Itsm,
}

impl ConfigurationKind {
    /// Both kinds, in the order the migration processes them.
    pub const ALL: [Self; 2] = [Self::Cte, Self::Itsm];

    /// The collection holding configurations of this kind.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Cte => collections::CONFIGURATIONS,
            Self::Itsm => collections::ITSM_CONFIGURATIONS,
        }
    }

    /// The Netskope connector plugin whose configurations own a tenant.
    #[must_use]
    pub fn tenant_plugin(self) -> PluginId {
        match self {
            Self::Cte => PluginId::netskope(),
            Self::Itsm => PluginId::netskope_itsm(),
        }
    }

    /// Parameter path of the tenant name.
    #[must_use]
    pub const fn tenant_name_path(self) -> &'static [&'static str] {
        match self {
            Self::Cte => &["tenant_name"],
            Self::Itsm => &["auth", "tenant_name"],
        }
    }

    /// Parameter path of the tenant API token.
    #[must_use]
    pub const fn token_path(self) -> &'static [&'static str] {
        match self {
            Self::Cte => &["api_token"],
            Self::Itsm => &["auth", "token"],
        }
    }
}

impl std::fmt::Display for ConfigurationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// A plugin configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Identifying name.
    pub name: String,
    /// Plugin identifier, bare on legacy records.
    pub plugin: PluginId,
    /// Owning tenant name; absent or null on legacy records.
    #[serde(default)]
    pub tenant: Option<String>,
    /// Plugin parameters as entered by the user.
    #[serde(default)]
    pub parameters: Value,
    /// Field mappings; ticket orchestrator configurations only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Vec<Value>>,
}

impl Configuration {
    /// Create a configuration with no tenant and no mappings.
    #[must_use]
    pub fn new(name: impl Into<String>, plugin: impl Into<PluginId>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            plugin: plugin.into(),
            tenant: None,
            parameters,
            mappings: None,
        }
    }

    /// Resolve a string parameter by path, e.g. `["auth", "token"]`.
    #[must_use]
    pub fn parameter(&self, path: &[&str]) -> Option<&str> {
        path.iter()
            .try_fold(&self.parameters, |value, key| value.get(*key))?
            .as_str()
    }
}

/// A Netskope tenant document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Identifying name referenced from configurations.
    pub name: String,
    /// Netskope tenant host name.
    #[serde(rename = "tenantName")]
    pub tenant_name: String,
    /// Tenant API token.
    pub token: String,
}

/// A queue item inside a business rule.
///
/// Items are free-form documents; the migration only cares whether the
/// `mappings` key is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueItem(pub Map<String, Value>);

impl QueueItem {
    /// Field name of the mapping list.
    pub const MAPPINGS: &'static str = "mappings";

    /// Returns `true` if the item carries a `mappings` key, even a null one.
    #[must_use]
    pub fn has_mappings(&self) -> bool {
        self.0.contains_key(Self::MAPPINGS)
    }

    /// Set the mapping list.
    pub fn set_mappings(&mut self, mappings: Vec<Value>) {
        self.0
            .insert(Self::MAPPINGS.to_string(), Value::Array(mappings));
    }
}

/// A ticket orchestrator business rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    /// Identifying name.
    pub name: String,
    /// Queue items keyed by the configuration name they route to.
    #[serde(default)]
    pub queues: IndexMap<String, Vec<QueueItem>>,
}

/// A single-field index specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Indexed field.
    pub field: String,
    /// `1` for ascending, `-1` for descending.
    pub order: i32,
}

impl IndexSpec {
    /// A descending index on `field`.
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: -1,
        }
    }
}
