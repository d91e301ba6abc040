//! The migration runner.
//!
//! Steps run strictly in order, each awaited to completion before the next
//! starts. The first failure stops the run; nothing is rolled back.

use std::future::Future;
use std::sync::Arc;

use cte_migrate_store::{ConfigurationKind, Store};
use cte_migrate_tenants::TenantService;

use crate::backfill::{backfill_tenants, BackfillOutcome};
use crate::error::Result;
use crate::plugins::{reformat_plugins, rename_legacy_plugins};
use crate::prune::prune_orphan_schedules;
use crate::rules::backfill_rule_mappings;
use crate::schedules::normalize_schedules;
use crate::settings::{default_user_sso, upgrade_settings};
use crate::types::{MigrationReport, Step};

/// Runs the CTE to CE migration against a store.
pub struct Migrator<S: Store + ?Sized, T: TenantService + ?Sized> {
    store: Arc<S>,
    tenants: Arc<T>,
}

impl<S: Store + ?Sized, T: TenantService + ?Sized> Migrator<S, T> {
    /// Create a migrator.
    #[must_use]
    pub fn new(store: Arc<S>, tenants: Arc<T>) -> Self {
        Self { store, tenants }
    }

    /// Run every step once.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::StepFailed` naming the first step that failed.
    /// Steps before it have already been applied.
    pub async fn run(&self) -> Result<MigrationReport> {
        let store = self.store.as_ref();
        let mut report = MigrationReport::started();

        let schedules = run_step(Step::ScheduleNormalizer, normalize_schedules(store)).await?;
        tracing::info!(
            step = %Step::ScheduleNormalizer,
            aging_task_updated = schedules.aging_task_updated,
            upserted = schedules.upserted,
            renamed = schedules.plugin_tasks_renamed,
            "Schedules normalized"
        );
        report.aging_task_updated = schedules.aging_task_updated;
        report.schedules_upserted = schedules.upserted;
        report.schedule_tasks_renamed = schedules.plugin_tasks_renamed;

        let settings = run_step(Step::SettingsUpgrade, upgrade_settings(store)).await?;
        tracing::info!(
            step = %Step::SettingsUpgrade,
            upgraded = settings.upgraded,
            "Settings upgraded"
        );
        report.previous_version = settings.previous_version;
        report.settings_upgraded = settings.upgraded;

        report.users_updated = run_step(Step::UserSsoDefault, default_user_sso(store)).await?;
        tracing::info!(
            step = %Step::UserSsoDefault,
            users = report.users_updated,
            "Users defaulted to password login"
        );

        report.plugins_renamed =
            run_step(Step::PluginRename, rename_legacy_plugins(store)).await?;
        tracing::info!(
            step = %Step::PluginRename,
            renamed = report.plugins_renamed,
            "Legacy plugin identifiers renamed"
        );

        for kind in ConfigurationKind::ALL {
            let pruned = run_step(Step::OrphanPrune, prune_orphan_schedules(store, kind)).await?;
            tracing::info!(
                step = %Step::OrphanPrune,
                collection = %kind,
                pruned,
                "Orphan schedules pruned"
            );
            report.schedules_pruned += pruned;
        }

        for kind in ConfigurationKind::ALL {
            let reformatted = run_step(Step::PluginReformat, reformat_plugins(store, kind)).await?;
            tracing::info!(
                step = %Step::PluginReformat,
                collection = %kind,
                reformatted,
                "Plugins reformatted"
            );
            report.configurations_reformatted += reformatted;
        }

        let mut backfill = BackfillOutcome::default();
        for kind in ConfigurationKind::ALL {
            let outcome = run_step(
                Step::TenantBackfill,
                backfill_tenants(store, self.tenants.as_ref(), kind),
            )
            .await?;
            tracing::info!(
                step = %Step::TenantBackfill,
                collection = %kind,
                created = outcome.created,
                reused = outcome.reused,
                stamped = outcome.stamped,
                "Tenants backfilled"
            );
            backfill += outcome;
        }
        report.tenants_created = backfill.created;
        report.tenants_reused = backfill.reused;
        report.configurations_stamped = backfill.stamped;

        let rules = run_step(Step::RuleMappingBackfill, backfill_rule_mappings(store)).await?;
        tracing::info!(
            step = %Step::RuleMappingBackfill,
            rules = rules.rules_rewritten,
            backfilled = rules.items_backfilled,
            unresolved = rules.items_unresolved,
            "Business rule mappings backfilled"
        );
        report.rules_rewritten = rules.rules_rewritten;
        report.queue_items_backfilled = rules.items_backfilled;
        report.queue_items_unresolved = rules.items_unresolved;

        report.finish();
        Ok(report)
    }
}

/// Await a step, logging and attributing its failure.
async fn run_step<F, O>(step: Step, future: F) -> Result<O>
where
    F: Future<Output = Result<O>>,
{
    tracing::debug!(step = %step, "Running step");
    future.await.map_err(|e| {
        tracing::error!(step = %step, error = %e, "Migration step failed");
        e.in_step(step)
    })
}
