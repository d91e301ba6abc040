//! Plugin identifier corrections.

use cte_migrate_core::plugin::{CROWDSTRIKE, LEGACY_CROWDSTRIKE};
use cte_migrate_core::is_reserved_name;
use cte_migrate_store::{Configuration, ConfigurationKind, Store};

use crate::error::Result;

/// Fix the case of the legacy CrowdStrike identifier on threat exchange
/// configurations.
///
/// # Errors
///
/// Returns an error if the store operation fails.
pub async fn rename_legacy_plugins<S: Store + ?Sized>(store: &S) -> Result<u64> {
    Ok(store
        .rename_plugin(ConfigurationKind::Cte, LEGACY_CROWDSTRIKE, CROWDSTRIKE)
        .await?)
}

/// Returns `true` if the configuration is built-in or already namespaced.
fn is_migrated(configuration: &Configuration) -> bool {
    is_reserved_name(&configuration.name) || configuration.plugin.is_namespaced()
}

/// Move every configuration of a kind to its namespaced plugin path and
/// clear its tenant.
///
/// # Errors
///
/// Returns an error if any store operation fails.
pub async fn reformat_plugins<S: Store + ?Sized>(store: &S, kind: ConfigurationKind) -> Result<u64> {
    let mut reformatted = 0;

    for configuration in store.list_configurations(kind).await? {
        if is_migrated(&configuration) {
            tracing::debug!(
                collection = %kind,
                configuration = %configuration.name,
                plugin = %configuration.plugin,
                "Plugin already namespaced, skipping"
            );
            continue;
        }

        let plugin = configuration.plugin.namespaced();
        if store
            .set_plugin_clear_tenant(kind, &configuration.name, plugin.as_str())
            .await?
        {
            tracing::debug!(
                collection = %kind,
                configuration = %configuration.name,
                plugin = %plugin,
                "Reformatted plugin"
            );
            reformatted += 1;
        }
    }

    Ok(reformatted)
}
