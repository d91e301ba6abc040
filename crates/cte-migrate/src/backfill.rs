//! Tenant backfill for the Netskope connector configurations.
//!
//! Legacy Netskope configurations carry the tenant host name and API token in
//! their parameters. Each one is linked to a shared tenant record, which is
//! created through the [`TenantService`] the first time a host name is seen.

use cte_migrate_store::{Configuration, ConfigurationKind, Store};
use cte_migrate_tenants::{CreateTenantRequest, TenantService};

use crate::error::{MigrateError, Result};

/// What the tenant backfill changed for one kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    /// Tenants created through the tenant service.
    pub created: u64,
    /// Configurations linked to a tenant that already existed.
    pub reused: u64,
    /// Configurations given a tenant reference.
    pub stamped: u64,
}

impl std::ops::AddAssign for BackfillOutcome {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.reused += other.reused;
        self.stamped += other.stamped;
    }
}

/// Read a required credential from the configuration parameters.
fn required_parameter<'a>(
    configuration: &'a Configuration,
    kind: ConfigurationKind,
    path: &[&str],
) -> Result<&'a str> {
    configuration
        .parameter(path)
        .ok_or_else(|| MigrateError::MissingParameter {
            kind,
            configuration: configuration.name.clone(),
            field: path.join("."),
        })
}

/// Build the tenant descriptor for a Netskope connector configuration.
///
/// # Errors
///
/// Returns `MigrateError::MissingParameter` if the tenant name or token is
/// absent or not a string.
pub fn tenant_request(
    configuration: &Configuration,
    kind: ConfigurationKind,
) -> Result<CreateTenantRequest> {
    let tenant_name = required_parameter(configuration, kind, kind.tenant_name_path())?;
    let token = required_parameter(configuration, kind, kind.token_path())?;
    Ok(CreateTenantRequest::new(tenant_name, token))
}

/// Link every untenanted Netskope connector configuration of a kind to its
/// tenant, creating the tenant when none exists for the host name.
///
/// # Errors
///
/// Returns an error if a credential is missing, the tenant service fails, or
/// any store operation fails. Configurations processed before the failure
/// keep their tenant reference.
pub async fn backfill_tenants<S, T>(
    store: &S,
    tenants: &T,
    kind: ConfigurationKind,
) -> Result<BackfillOutcome>
where
    S: Store + ?Sized,
    T: TenantService + ?Sized,
{
    let plugin = kind.tenant_plugin();
    let mut outcome = BackfillOutcome::default();

    for configuration in store.list_configurations(kind).await? {
        if configuration.plugin != plugin {
            continue;
        }
        if let Some(tenant) = &configuration.tenant {
            tracing::debug!(
                collection = %kind,
                configuration = %configuration.name,
                tenant = %tenant,
                "Configuration already has a tenant, skipping"
            );
            continue;
        }

        let request = tenant_request(&configuration, kind)?;
        let tenant = match store.find_tenant_by_tenant_name(&request.tenant_name).await? {
            Some(existing) => {
                outcome.reused += 1;
                existing
            }
            None => {
                let created = tenants.create_tenant(&request).await?;
                tracing::info!(
                    collection = %kind,
                    configuration = %configuration.name,
                    tenant = %created.name,
                    "Created tenant"
                );
                outcome.created += 1;
                created
            }
        };

        if store
            .set_configuration_tenant(kind, &configuration.name, &tenant.name)
            .await?
        {
            outcome.stamped += 1;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cte_migrate_core::PluginId;
    use cte_migrate_store::{MemoryStore, Tenant};
    use cte_migrate_tenants::MockTenantService;
    use serde_json::json;

    fn cte_netskope(name: &str, tenant_name: &str) -> Configuration {
        Configuration::new(
            name,
            PluginId::netskope(),
            json!({"tenant_name": tenant_name, "api_token": "cte-token"}),
        )
    }

    fn itsm_netskope(name: &str, tenant_name: &str) -> Configuration {
        Configuration::new(
            name,
            PluginId::netskope_itsm(),
            json!({"auth": {"tenant_name": tenant_name, "token": "itsm-token"}}),
        )
    }

    async fn tenant_of(store: &MemoryStore, kind: ConfigurationKind, name: &str) -> Option<String> {
        store
            .get_configuration(kind, name)
            .await
            .unwrap()
            .unwrap()
            .tenant
    }

    #[test]
    fn request_reads_nested_itsm_credentials() {
        let request =
            tenant_request(&itsm_netskope("q", "acme.goskope.com"), ConfigurationKind::Itsm)
                .unwrap();
        assert_eq!(request.name, "acme.goskope.com");
        assert_eq!(request.tenant_name, "acme.goskope.com");
        assert_eq!(request.token, "itsm-token");
    }

    #[test]
    fn missing_token_names_the_parameter() {
        let config = Configuration::new(
            "broken",
            PluginId::netskope_itsm(),
            json!({"auth": {"tenant_name": "acme.goskope.com"}}),
        );
        let err = tenant_request(&config, ConfigurationKind::Itsm).unwrap_err();
        match err {
            MigrateError::MissingParameter {
                configuration,
                field,
                ..
            } => {
                assert_eq!(configuration, "broken");
                assert_eq!(field, "auth.token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn creates_tenant_once_per_host_name() {
        let store = Arc::new(MemoryStore::new());
        store.insert_configuration(ConfigurationKind::Cte, cte_netskope("a", "acme.goskope.com"));
        store.insert_configuration(ConfigurationKind::Cte, cte_netskope("b", "acme.goskope.com"));
        let service = MockTenantService::persisting(store.clone());

        let outcome = backfill_tenants(store.as_ref(), &service, ConfigurationKind::Cte)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            BackfillOutcome {
                created: 1,
                reused: 1,
                stamped: 2,
            }
        );
        assert_eq!(service.requests().len(), 1);
        assert_eq!(store.tenants().len(), 1);

        for name in ["a", "b"] {
            assert_eq!(
                tenant_of(&store, ConfigurationKind::Cte, name).await.as_deref(),
                Some("acme.goskope.com")
            );
        }
    }

    #[tokio::test]
    async fn reuses_existing_tenant_without_calling_service() {
        let store = MemoryStore::new();
        store
            .insert_tenant(&Tenant {
                name: "Acme".to_string(),
                tenant_name: "acme.goskope.com".to_string(),
                token: "existing".to_string(),
            })
            .await
            .unwrap();
        store.insert_configuration(ConfigurationKind::Itsm, itsm_netskope("q", "acme.goskope.com"));
        let service = MockTenantService::new();

        let outcome = backfill_tenants(&store, &service, ConfigurationKind::Itsm)
            .await
            .unwrap();
        assert_eq!(outcome.reused, 1);
        assert!(service.requests().is_empty());
        assert_eq!(
            tenant_of(&store, ConfigurationKind::Itsm, "q").await.as_deref(),
            Some("Acme")
        );
    }

    #[tokio::test]
    async fn skips_other_plugins_and_tenanted_configurations() {
        let store = MemoryStore::new();
        store.insert_configuration(
            ConfigurationKind::Cte,
            Configuration::new("cs", PluginId::new("crowdstrike").namespaced(), json!({})),
        );
        let mut done = cte_netskope("done", "acme.goskope.com");
        done.tenant = Some("Acme".to_string());
        store.insert_configuration(ConfigurationKind::Cte, done);
        let service = MockTenantService::new();

        let outcome = backfill_tenants(&store, &service, ConfigurationKind::Cte)
            .await
            .unwrap();
        assert_eq!(outcome, BackfillOutcome::default());
        assert!(service.requests().is_empty());
        assert!(tenant_of(&store, ConfigurationKind::Cte, "cs").await.is_none());
    }

    #[tokio::test]
    async fn service_failure_aborts_and_keeps_earlier_links() {
        let store = MemoryStore::new();
        store
            .insert_tenant(&Tenant {
                name: "first.goskope.com".to_string(),
                tenant_name: "first.goskope.com".to_string(),
                token: "t".to_string(),
            })
            .await
            .unwrap();
        store.insert_configuration(ConfigurationKind::Cte, cte_netskope("a", "first.goskope.com"));
        store.insert_configuration(ConfigurationKind::Cte, cte_netskope("b", "second.goskope.com"));
        let service = MockTenantService::new();
        service.fail_with(400, "Invalid API token");

        let err = backfill_tenants(&store, &service, ConfigurationKind::Cte)
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::Tenant(_)));
        assert_eq!(
            tenant_of(&store, ConfigurationKind::Cte, "a").await.as_deref(),
            Some("first.goskope.com")
        );
        assert!(tenant_of(&store, ConfigurationKind::Cte, "b").await.is_none());
    }
}
