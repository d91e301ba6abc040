//! Migration configuration types.
//!
//! This module defines where the migration finds the database and, optionally,
//! the tenant API.

use std::time::Duration;

use cte_migrate_tenants::TenantApiConfig;
use serde::Deserialize;

/// Configuration for a migration run.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrateConfig {
    /// MongoDB connection string.
    #[serde(default = "MigrateConfig::default_mongo_uri")]
    pub mongo_uri: String,

    /// Application database name.
    #[serde(default = "MigrateConfig::default_database")]
    pub database: String,

    /// Base URL of the core API used to create tenants. When unset, tenants
    /// are inserted directly into the database.
    #[serde(default)]
    pub tenant_api_url: Option<String>,

    /// Bearer token for the tenant API.
    #[serde(default)]
    pub tenant_api_token: Option<String>,

    /// Tenant API request timeout in seconds.
    #[serde(default = "MigrateConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl MigrateConfig {
    fn default_mongo_uri() -> String {
        "mongodb://localhost:27017".to_string()
    }

    fn default_database() -> String {
        "cte".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Tenant API settings, if a tenant API is configured.
    #[must_use]
    pub fn tenant_api(&self) -> Option<TenantApiConfig> {
        let base_url = self.tenant_api_url.as_deref()?.trim();
        if base_url.is_empty() {
            return None;
        }
        Some(TenantApiConfig {
            base_url: base_url.to_string(),
            api_token: self.tenant_api_token.clone(),
            timeout_seconds: self.request_timeout_seconds,
        })
    }
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            mongo_uri: Self::default_mongo_uri(),
            database: Self::default_database(),
            tenant_api_url: None,
            tenant_api_token: None,
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}
