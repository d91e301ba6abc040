//! Netskope tenant creation for the CTE to CE database migration.
//!
//! Configurations of the Netskope connectors used to carry their tenant
//! credentials inline. The new data model moves them to a shared tenant
//! record, created through the tenant API so the token is validated and
//! stored the same way the UI would store it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  Tenant backfill │────▶│  TenantService   │
//! │  (migration)     │     │  (trait)         │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                    ┌──────────────┴──────────────┐
//!           ┌────────▼─────────┐         ┌─────────▼────────┐
//!           │ HttpTenantService│         │StoreTenantService│
//!           │ (tenant API)     │         │ (direct insert)  │
//!           └──────────────────┘         └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cte_migrate_tenants::{CreateTenantRequest, HttpTenantService, TenantApiConfig, TenantService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TenantApiConfig {
//!     base_url: "http://core:8000".to_string(),
//!     api_token: Some("secret".to_string()),
//!     timeout_seconds: 30,
//! };
//!
//! let service = HttpTenantService::new(config)?;
//! let request = CreateTenantRequest::new("acme.goskope.com", "api-token");
//! let tenant = service.create_tenant(&request).await?;
//!
//! println!("Created tenant: {}", tenant.name);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod direct;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::HttpTenantService;
pub use direct::StoreTenantService;
pub use error::{Result, TenantError};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockTenantService;

use std::fmt;

use async_trait::async_trait;
use cte_migrate_store::Tenant;
use serde::Serialize;

/// Trait for creating tenants.
///
/// This trait abstracts the tenant-creation collaborator, allowing the
/// migration to run against the tenant API, the store directly, or a mock.
#[async_trait]
pub trait TenantService: Send + Sync {
    /// Create and persist a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant could not be created.
    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant>;
}

/// Descriptor of a tenant to create.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CreateTenantRequest {
    /// Identifying name referenced from configurations.
    pub name: String,
    /// Netskope tenant host name.
    #[serde(rename = "tenantName")]
    pub tenant_name: String,
    /// Tenant API token.
    pub token: String,
}

impl CreateTenantRequest {
    /// Describe a tenant whose name is its Netskope host name.
    #[must_use]
    pub fn new(tenant_name: impl Into<String>, token: impl Into<String>) -> Self {
        let tenant_name = tenant_name.into();
        Self {
            name: tenant_name.clone(),
            tenant_name,
            token: token.into(),
        }
    }

    /// The tenant record this request creates.
    #[must_use]
    pub fn to_tenant(&self) -> Tenant {
        Tenant {
            name: self.name.clone(),
            tenant_name: self.tenant_name.clone(),
            token: self.token.clone(),
        }
    }
}

impl fmt::Debug for CreateTenantRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateTenantRequest")
            .field("name", &self.name)
            .field("tenant_name", &self.tenant_name)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Configuration for the tenant API.
#[derive(Debug, Clone)]
pub struct TenantApiConfig {
    /// Base URL of the core API (e.g., `http://core:8000`).
    pub base_url: String,
    /// Bearer token sent with every request, if the API requires one.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl TenantApiConfig {
    /// Get the tenant collection endpoint URL.
    #[must_use]
    pub fn tenants_url(&self) -> String {
        format!("{}/api/tenants", self.base_url.trim_end_matches('/'))
    }
}

impl Default for TenantApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_token: None,
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TenantApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(config.api_token.is_none());
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn tenants_url_ignores_trailing_slash() {
        let config = TenantApiConfig {
            base_url: "http://core:8000/".to_string(),
            ..TenantApiConfig::default()
        };
        assert_eq!(config.tenants_url(), "http://core:8000/api/tenants");
    }

    #[test]
    fn request_uses_tenant_name_as_name() {
        let request = CreateTenantRequest::new("acme.goskope.com", "t0k");
        assert_eq!(request.name, "acme.goskope.com");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tenantName"], "acme.goskope.com");
        assert_eq!(json["token"], "t0k");
    }

    #[test]
    fn debug_redacts_token() {
        let request = CreateTenantRequest::new("acme.goskope.com", "super-secret");
        let debug = format!("{request:?}");
        assert!(debug.contains("acme.goskope.com"));
        assert!(!debug.contains("super-secret"));
    }
}
