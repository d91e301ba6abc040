//! Step identifiers and the migration report.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A step of the migration, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Rename and upsert the built-in schedules.
    ScheduleNormalizer,
    /// Bump the settings singleton to the target version.
    SettingsUpgrade,
    /// Default every user to password login.
    UserSsoDefault,
    /// Fix the case of legacy plugin identifiers.
    PluginRename,
    /// Delete schedules of configurations already in the new shape.
    OrphanPrune,
    /// Move plugin identifiers to their namespaced module path.
    PluginReformat,
    /// Create tenants for the Netskope connectors and reference them.
    TenantBackfill,
    /// Copy configuration mappings into business rule queue items.
    RuleMappingBackfill,
}

impl Step {
    /// Human-readable step name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScheduleNormalizer => "schedule normalizer",
            Self::SettingsUpgrade => "settings upgrade",
            Self::UserSsoDefault => "user sso default",
            Self::PluginRename => "plugin rename",
            Self::OrphanPrune => "orphan schedule prune",
            Self::PluginReformat => "plugin reformat",
            Self::TenantBackfill => "tenant backfill",
            Self::RuleMappingBackfill => "rule mapping backfill",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a migration run changed.
///
/// Counters report matched documents, the way MongoDB reports `update_many`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// `databaseVersion` found before the run.
    pub previous_version: Option<String>,
    /// Whether the indicator aging schedule existed and was retargeted.
    pub aging_task_updated: bool,
    /// Built-in schedules inserted or overwritten.
    pub schedules_upserted: u64,
    /// Plugin schedules moved to the new task identifier.
    pub schedule_tasks_renamed: u64,
    /// Whether a settings document existed to upgrade.
    pub settings_upgraded: bool,
    /// Users defaulted to password login.
    pub users_updated: u64,
    /// Configurations whose plugin identifier case was fixed.
    pub plugins_renamed: u64,
    /// Schedules deleted because their configuration was already migrated.
    pub schedules_pruned: u64,
    /// Configurations moved to a namespaced plugin identifier.
    pub configurations_reformatted: u64,
    /// Tenants created through the tenant service.
    pub tenants_created: u64,
    /// Configurations linked to a tenant that already existed.
    pub tenants_reused: u64,
    /// Configurations given a tenant reference.
    pub configurations_stamped: u64,
    /// Queue items given a mapping list.
    pub queue_items_backfilled: u64,
    /// Queue items left alone because their configuration does not exist.
    pub queue_items_unresolved: u64,
    /// Business rules rewritten.
    pub rules_rewritten: u64,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished; `None` until every step completed.
    pub finished_at: Option<DateTime<Utc>>,
}

impl MigrationReport {
    /// Start a report at the current time.
    #[must_use]
    pub fn started() -> Self {
        Self {
            started_at: Utc::now(),
            ..Self::default()
        }
    }

    /// Mark the run as complete.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of a finished run.
    #[must_use]
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_display_readably() {
        assert_eq!(Step::TenantBackfill.to_string(), "tenant backfill");
        assert_eq!(Step::RuleMappingBackfill.as_str(), "rule mapping backfill");
    }

    #[test]
    fn report_elapsed_after_finish() {
        let mut report = MigrationReport::started();
        assert!(report.elapsed().is_none());

        report.finish();
        let elapsed = report.elapsed().unwrap();
        assert!(elapsed >= chrono::Duration::zero());
    }

    #[test]
    fn report_serializes_step_names() {
        let json = serde_json::to_value(Step::RuleMappingBackfill).unwrap();
        assert_eq!(json, "rule_mapping_backfill");
    }
}
