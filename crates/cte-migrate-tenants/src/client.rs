//! HTTP client for the tenant API.
//!
//! This module provides `HttpTenantService`, which creates tenants through
//! the core REST API so the upstream token is validated before it is stored.

use std::time::Duration;

use async_trait::async_trait;
use cte_migrate_store::Tenant;
use serde::Deserialize;

use crate::error::{Result, TenantError};
use crate::{CreateTenantRequest, TenantApiConfig, TenantService};

/// Success body returned by the tenant API. Only the stored name is read;
/// the token is never echoed back.
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    name: Option<String>,
}

/// Error body returned by the tenant API.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

impl ErrorResponse {
    /// Flatten `detail`, which is a string or a list of validation errors.
    fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// HTTP client for the tenant API.
#[derive(Debug, Clone)]
pub struct HttpTenantService {
    config: TenantApiConfig,
    client: reqwest::Client,
}

impl HttpTenantService {
    /// Create a new tenant client.
    ///
    /// # Errors
    ///
    /// Returns `TenantError::Request` if the HTTP client cannot be built.
    pub fn new(config: TenantApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| TenantError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl TenantService for HttpTenantService {
    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant> {
        let url = self.config.tenants_url();

        let mut builder = self.client.post(&url).json(request);
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TenantError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| TenantError::InvalidResponse(e.to_string()))?;

            // The tenant exists upstream from here on, so the body is only
            // consulted for the stored name and never fails the call.
            let mut tenant = request.to_tenant();
            if let Some(name) = serde_json::from_str::<CreatedResponse>(&body)
                .ok()
                .and_then(|created| created.name)
            {
                tenant.name = name;
            }

            tracing::debug!(tenant = %tenant.name, "Created tenant via tenant API");
            return Ok(tenant);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.message())
            .unwrap_or_else(|_| format!("tenant API returned status {status}"));

        tracing::error!(
            tenant = %request.name,
            status = %status,
            error = %message,
            "Failed to create tenant"
        );

        if status == reqwest::StatusCode::CONFLICT {
            Err(TenantError::AlreadyExists(request.name.clone()))
        } else {
            Err(TenantError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}
