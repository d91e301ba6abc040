//! Direct store tenant creation.
//!
//! Used when no tenant API is reachable from the migration host. The tenant
//! record is written straight into `netskope_tenants`, so the upstream token
//! is not validated.

use std::sync::Arc;

use async_trait::async_trait;
use cte_migrate_store::{Store, Tenant};

use crate::error::{Result, TenantError};
use crate::{CreateTenantRequest, TenantService};

/// Tenant service that inserts tenant records directly into the store.
pub struct StoreTenantService<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> StoreTenantService<S> {
    /// Create a service writing through the given store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: Store + ?Sized + 'static> TenantService for StoreTenantService<S> {
    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant> {
        if self
            .store
            .find_tenant_by_tenant_name(&request.tenant_name)
            .await?
            .is_some()
        {
            return Err(TenantError::AlreadyExists(request.name.clone()));
        }

        let tenant = request.to_tenant();
        self.store.insert_tenant(&tenant).await?;

        tracing::warn!(
            tenant = %tenant.name,
            "Inserted tenant directly into the store; token was not validated upstream"
        );
        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_migrate_store::MemoryStore;

    #[tokio::test]
    async fn inserts_tenant_record() {
        let store = Arc::new(MemoryStore::new());
        let service = StoreTenantService::new(Arc::clone(&store));

        let tenant = service
            .create_tenant(&CreateTenantRequest::new("acme.goskope.com", "t0k"))
            .await
            .unwrap();

        assert_eq!(tenant.name, "acme.goskope.com");
        assert_eq!(store.tenants(), vec![tenant]);
    }

    #[tokio::test]
    async fn refuses_duplicate_tenant_name() {
        let store = Arc::new(MemoryStore::new());
        let service = StoreTenantService::new(Arc::clone(&store));
        let request = CreateTenantRequest::new("acme.goskope.com", "t0k");

        service.create_tenant(&request).await.unwrap();
        let result = service.create_tenant(&request).await;

        assert!(matches!(result, Err(TenantError::AlreadyExists(_))));
        assert_eq!(store.tenants().len(), 1);
    }
}
