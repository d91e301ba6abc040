//! Built-in schedule normalization.

use cte_migrate_core::catalog::{schedules, tasks};
use cte_migrate_store::{Interval, Schedule, Store};

use crate::error::Result;

/// What the schedule normalizer changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Whether the indicator aging schedule existed.
    pub aging_task_updated: bool,
    /// Schedules inserted or overwritten.
    pub upserted: u64,
    /// Plugin schedules moved to the new task identifier.
    pub plugin_tasks_renamed: u64,
}

/// Schedules the upgrade writes in full, replacing any existing definition.
#[must_use]
pub fn upgraded_schedules() -> Vec<Schedule> {
    vec![
        Schedule::periodic(schedules::UNMUTE, tasks::ITSM_UNMUTE, Interval::minutes(5)),
        Schedule::periodic(
            schedules::ALERT_CLEANUP,
            tasks::ITSM_DELETE_ALERTS,
            Interval::hours(12),
        ),
        Schedule::periodic(schedules::UPDATE, tasks::CHECK_UPDATES, Interval::hours(12)),
    ]
}

/// Retarget, upsert, and rename the built-in schedules.
///
/// The aging schedule is only updated when it exists; the upgraded schedules
/// are always written; every plugin schedule still on the legacy task path
/// is moved to the new one.
///
/// # Errors
///
/// Returns an error if any store operation fails.
pub async fn normalize_schedules<S: Store + ?Sized>(store: &S) -> Result<ScheduleOutcome> {
    let mut outcome = ScheduleOutcome {
        aging_task_updated: store
            .set_schedule_task(schedules::INDICATOR_AGING, tasks::AGE_INDICATORS)
            .await?,
        ..ScheduleOutcome::default()
    };

    if !outcome.aging_task_updated {
        tracing::debug!(
            schedule = schedules::INDICATOR_AGING,
            "Aging schedule not found, nothing to retarget"
        );
    }

    for schedule in upgraded_schedules() {
        store.upsert_schedule(&schedule).await?;
        tracing::debug!(schedule = %schedule.name, task = %schedule.task, "Upserted schedule");
        outcome.upserted += 1;
    }

    outcome.plugin_tasks_renamed = store
        .rename_schedule_tasks(tasks::LEGACY_EXECUTE_PLUGIN, tasks::EXECUTE_PLUGIN)
        .await?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_migrate_store::{IntervalPeriod, MemoryStore};
    use serde_json::json;

    fn plugin_schedule(name: &str, task: &str) -> Schedule {
        let mut schedule = Schedule::periodic(name, task, Interval::minutes(60));
        schedule.args = vec![json!(name)];
        schedule
    }

    #[tokio::test]
    async fn retargets_existing_aging_schedule() {
        let store = MemoryStore::new();
        store.insert_schedule(Schedule::periodic(
            schedules::INDICATOR_AGING,
            "cte.tasks.age_indicators",
            Interval::hours(12),
        ));

        let outcome = normalize_schedules(&store).await.unwrap();
        assert!(outcome.aging_task_updated);

        let aging = store
            .get_schedule(schedules::INDICATOR_AGING)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(aging.task, tasks::AGE_INDICATORS);
    }

    #[tokio::test]
    async fn missing_aging_schedule_is_not_created() {
        let store = MemoryStore::new();

        let outcome = normalize_schedules(&store).await.unwrap();
        assert!(!outcome.aging_task_updated);
        assert!(store
            .get_schedule(schedules::INDICATOR_AGING)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn upserts_overwrite_existing_definitions() {
        let store = MemoryStore::new();
        let mut stale = Schedule::periodic(schedules::UNMUTE, "cte.unmute", Interval::hours(1));
        stale.enabled = false;
        store.insert_schedule(stale);

        let outcome = normalize_schedules(&store).await.unwrap();
        assert_eq!(outcome.upserted, 3);

        let unmute = store.get_schedule(schedules::UNMUTE).await.unwrap().unwrap();
        assert_eq!(unmute.task, tasks::ITSM_UNMUTE);
        assert!(unmute.enabled);
        assert_eq!(unmute.interval.every, 5);
        assert_eq!(unmute.interval.period, IntervalPeriod::Minutes);

        let cleanup = store
            .get_schedule(schedules::ALERT_CLEANUP)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleanup.interval, Interval::hours(12));

        let update = store.get_schedule(schedules::UPDATE).await.unwrap().unwrap();
        assert_eq!(update.task, tasks::CHECK_UPDATES);
        assert!(update.args.is_empty());
    }

    #[tokio::test]
    async fn renames_every_legacy_plugin_task() {
        let store = MemoryStore::new();
        store.insert_schedule(plugin_schedule("alpha", tasks::LEGACY_EXECUTE_PLUGIN));
        store.insert_schedule(plugin_schedule("beta", tasks::LEGACY_EXECUTE_PLUGIN));
        store.insert_schedule(plugin_schedule("gamma", "cte.other"));

        let outcome = normalize_schedules(&store).await.unwrap();
        assert_eq!(outcome.plugin_tasks_renamed, 2);

        for name in ["alpha", "beta"] {
            let schedule = store.get_schedule(name).await.unwrap().unwrap();
            assert_eq!(schedule.task, tasks::EXECUTE_PLUGIN);
        }
        let gamma = store.get_schedule("gamma").await.unwrap().unwrap();
        assert_eq!(gamma.task, "cte.other");
    }
}
