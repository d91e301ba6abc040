//! Mock tenant service for tests.

use std::sync::Arc;

use async_trait::async_trait;
use cte_migrate_store::{Store, Tenant};
use parking_lot::Mutex;

use crate::error::{Result, TenantError};
use crate::{CreateTenantRequest, TenantService};

/// Records every request and optionally persists tenants into a store.
///
/// Persisting mirrors what the real tenant API does, so a migration run
/// against a `MemoryStore` sees the created tenants on its next lookup.
#[derive(Default)]
pub struct MockTenantService {
    store: Option<Arc<dyn Store>>,
    requests: Mutex<Vec<CreateTenantRequest>>,
    failure: Mutex<Option<(u16, String)>>,
}

impl MockTenantService {
    /// A mock that only records requests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that records requests and inserts the tenants into `store`.
    #[must_use]
    pub fn persisting(store: Arc<dyn Store>) -> Self {
        Self {
            store: Some(store),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail with `TenantError::Rejected`.
    pub fn fail_with(&self, status: u16, message: impl Into<String>) {
        *self.failure.lock() = Some((status, message.into()));
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CreateTenantRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TenantService for MockTenantService {
    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant> {
        self.requests.lock().push(request.clone());

        let failure = self.failure.lock().clone();
        if let Some((status, message)) = failure {
            return Err(TenantError::Rejected { status, message });
        }

        let tenant = request.to_tenant();
        if let Some(store) = &self.store {
            store.insert_tenant(&tenant).await?;
        }
        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_migrate_store::MemoryStore;

    #[tokio::test]
    async fn records_requests() {
        let mock = MockTenantService::new();
        mock.create_tenant(&CreateTenantRequest::new("a", "t"))
            .await
            .unwrap();
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn persisting_mock_writes_to_store() {
        let store = Arc::new(MemoryStore::new());
        let mock = MockTenantService::persisting(store.clone());
        mock.create_tenant(&CreateTenantRequest::new("a", "t"))
            .await
            .unwrap();
        assert_eq!(store.tenants().len(), 1);
    }

    #[tokio::test]
    async fn configured_failure() {
        let mock = MockTenantService::new();
        mock.fail_with(502, "bad gateway");
        let err = mock
            .create_tenant(&CreateTenantRequest::new("a", "t"))
            .await
            .unwrap_err();
        assert!(matches!(err, TenantError::Rejected { status: 502, .. }));
    }
}
