//! Fresh-install seeding.
//!
//! Brings an empty database to the same shape a migrated one has: the
//! built-in schedules, a settings singleton, the indicator indexes, and the
//! default administrator. Every write is skipped or upserted when the
//! document already exists, so bootstrapping twice changes nothing.

use cte_migrate_core::catalog::{schedules, tasks};
use cte_migrate_core::TARGET_DATABASE_VERSION;
use cte_migrate_store::schema::collections;
use cte_migrate_store::{IndexSpec, Interval, Schedule, Settings, Store, User};
use serde_json::{json, Map};

use crate::error::Result;

/// Username of the default administrator.
pub const ADMIN_USERNAME: &str = "admin";

/// Bcrypt hash of the default administrator password.
const ADMIN_PASSWORD_HASH: &str = "$2y$12$RBcV6xWFhHucm4a1YRmQXuEZHqz9NadpMuzIB6xEIXOhg.QzngiiO";

/// What a bootstrap run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapOutcome {
    /// Schedules inserted or overwritten.
    pub schedules_upserted: u64,
    /// Whether the settings singleton was created.
    pub settings_created: bool,
    /// Whether the default administrator was created.
    pub admin_created: bool,
    /// Indexes requested on the indicators collection.
    pub indexes_ensured: u64,
}

/// Every built-in schedule of a fresh install.
#[must_use]
pub fn default_schedules() -> Vec<Schedule> {
    vec![
        Schedule::periodic(
            schedules::INDICATOR_AGING,
            tasks::AGE_INDICATORS,
            Interval::hours(12),
        ),
        Schedule::periodic(schedules::UNMUTE, tasks::ITSM_UNMUTE, Interval::minutes(5)),
        Schedule::periodic(schedules::CRE_UNMUTE, tasks::CRE_UNMUTE, Interval::minutes(5)),
        Schedule::periodic(
            schedules::CRE_AGGREGATE_SCORE,
            tasks::CRE_CALCULATE_AGGREGATE,
            Interval::hours(24),
        ),
        Schedule::periodic(
            schedules::ALERT_CLEANUP,
            tasks::ITSM_DELETE_ALERTS,
            Interval::hours(12),
        ),
        Schedule::periodic(
            schedules::LOG_CLEANUP,
            tasks::CRE_DELETE_LOGS,
            Interval::hours(12),
        ),
        Schedule::periodic(schedules::UPDATE, tasks::CHECK_UPDATES, Interval::hours(12)),
    ]
}

/// Settings of a fresh install. No platform is enabled until configured.
#[must_use]
pub fn initial_settings() -> Settings {
    let mut other = Map::new();
    other.insert(
        "proxy".to_string(),
        json!({"scheme": "http", "server": "", "username": "", "password": ""}),
    );
    other.insert("logLevel".to_string(), json!("info"));
    other.insert("alertCleanup".to_string(), json!(7));
    other.insert("platforms".to_string(), json!({"cte": false, "itsm": false}));

    Settings {
        database_version: Some(TARGET_DATABASE_VERSION.to_string()),
        other,
    }
}

/// The default administrator, forced to change the password on first login.
#[must_use]
pub fn admin_user() -> User {
    User {
        username: ADMIN_USERNAME.to_string(),
        password: ADMIN_PASSWORD_HASH.to_string(),
        scopes: ["admin", "read", "write", "me", "api"]
            .into_iter()
            .map(str::to_string)
            .collect(),
        tokens: Vec::new(),
        first_login: true,
        sso: None,
    }
}

/// Indexes backing the indicator list sort orders.
#[must_use]
pub fn indicator_indexes() -> Vec<IndexSpec> {
    ["reputation", "externalHits", "lastSeen"]
        .into_iter()
        .map(IndexSpec::descending)
        .collect()
}

/// Seed an empty database.
///
/// # Errors
///
/// Returns an error if any store operation fails.
pub async fn bootstrap<S: Store + ?Sized>(store: &S) -> Result<BootstrapOutcome> {
    let mut outcome = BootstrapOutcome::default();

    for schedule in default_schedules() {
        store.upsert_schedule(&schedule).await?;
        outcome.schedules_upserted += 1;
    }

    outcome.settings_created = store.insert_settings_if_missing(&initial_settings()).await?;
    if !outcome.settings_created {
        tracing::debug!("Settings already present, leaving them untouched");
    }

    let indexes = indicator_indexes();
    store
        .ensure_indexes(collections::INDICATORS, &indexes)
        .await?;
    outcome.indexes_ensured = indexes.len() as u64;

    outcome.admin_created = store.insert_user_if_missing(&admin_user()).await?;

    tracing::info!(
        schedules = outcome.schedules_upserted,
        settings_created = outcome.settings_created,
        admin_created = outcome.admin_created,
        "Bootstrapped database"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_migrate_store::MemoryStore;

    #[tokio::test]
    async fn seeds_empty_database() {
        let store = MemoryStore::new();

        let outcome = bootstrap(&store).await.unwrap();
        assert_eq!(outcome.schedules_upserted, 7);
        assert!(outcome.settings_created);
        assert!(outcome.admin_created);

        let aggregate = store
            .get_schedule(schedules::CRE_AGGREGATE_SCORE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(aggregate.task, tasks::CRE_CALCULATE_AGGREGATE);
        assert_eq!(aggregate.interval, Interval::hours(24));

        let settings = store.get_settings().await.unwrap().unwrap();
        assert_eq!(
            settings.database_version.as_deref(),
            Some(TARGET_DATABASE_VERSION)
        );
        assert_eq!(
            settings.field("platforms"),
            Some(&json!({"cte": false, "itsm": false}))
        );

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].first_login);
        assert!(users[0].scopes.contains(&"admin".to_string()));

        let indexes = store.indexes(collections::INDICATORS);
        assert_eq!(indexes.len(), 3);
        assert!(indexes.iter().all(|index| index.order == -1));
    }

    #[tokio::test]
    async fn keeps_existing_settings_and_admin() {
        let store = MemoryStore::new();
        let mut settings = initial_settings();
        settings.database_version = Some("1.0.0".to_string());
        store.insert_settings(settings.clone());
        let mut admin = admin_user();
        admin.password = "changed".to_string();
        store.insert_user(admin.clone());

        let outcome = bootstrap(&store).await.unwrap();
        assert!(!outcome.settings_created);
        assert!(!outcome.admin_created);

        assert_eq!(store.get_settings().await.unwrap(), Some(settings));
        assert_eq!(store.list_users().await.unwrap(), vec![admin]);
    }

    #[tokio::test]
    async fn second_bootstrap_does_not_duplicate_schedules() {
        let store = MemoryStore::new();
        bootstrap(&store).await.unwrap();
        bootstrap(&store).await.unwrap();

        assert_eq!(store.list_schedules().await.unwrap().len(), 7);
    }
}
