//! Orphan schedule pruning.

use cte_migrate_store::{ConfigurationKind, Store};

use crate::error::Result;

/// Delete the schedule of every configuration of a kind that already carries
/// a tenant.
///
/// At most one schedule is deleted per configuration.
///
/// # Errors
///
/// Returns an error if any store operation fails.
pub async fn prune_orphan_schedules<S: Store + ?Sized>(
    store: &S,
    kind: ConfigurationKind,
) -> Result<u64> {
    let mut pruned = 0;

    for configuration in store.list_tenanted_configurations(kind).await? {
        if store.delete_schedule_with_arg(&configuration.name).await? {
            tracing::debug!(
                collection = %kind,
                configuration = %configuration.name,
                "Deleted schedule of migrated configuration"
            );
            pruned += 1;
        }
    }

    Ok(pruned)
}
