//! Settings singleton upgrade and user defaults.

use cte_migrate_core::TARGET_DATABASE_VERSION;
use cte_migrate_store::{Platforms, SettingsUpgrade, Store};
use serde_json::Map;

use crate::error::Result;

/// What the settings upgrade found and changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOutcome {
    /// `databaseVersion` before the upgrade.
    pub previous_version: Option<String>,
    /// Whether a settings document existed and was updated.
    pub upgraded: bool,
}

/// Fields written to the settings singleton.
#[must_use]
pub fn settings_upgrade() -> SettingsUpgrade {
    SettingsUpgrade {
        database_version: TARGET_DATABASE_VERSION.to_string(),
        alert_cleanup: 7,
        sso_enable: false,
        ssosaml: Map::new(),
        enable_update_checking: true,
        platforms: Platforms {
            cte: true,
            itsm: true,
        },
    }
}

/// Bump the settings singleton to the target version.
///
/// Runs unconditionally; a database already at the target version is
/// upgraded again with a warning.
///
/// # Errors
///
/// Returns an error if any store operation fails.
pub async fn upgrade_settings<S: Store + ?Sized>(store: &S) -> Result<SettingsOutcome> {
    let previous_version = store
        .get_settings()
        .await?
        .and_then(|settings| settings.database_version);

    match previous_version.as_deref() {
        Some(TARGET_DATABASE_VERSION) => tracing::warn!(
            version = TARGET_DATABASE_VERSION,
            "Database already at target version, re-applying migration"
        ),
        Some(version) => tracing::info!(
            from = %version,
            to = TARGET_DATABASE_VERSION,
            "Upgrading settings"
        ),
        None => tracing::info!(
            to = TARGET_DATABASE_VERSION,
            "Settings carry no version marker"
        ),
    }

    let upgraded = store.apply_settings_upgrade(&settings_upgrade()).await?;
    if !upgraded {
        tracing::warn!("No settings document found, version marker not written");
    }

    Ok(SettingsOutcome {
        previous_version,
        upgraded,
    })
}

/// Default every user to password login.
///
/// # Errors
///
/// Returns an error if the store operation fails.
pub async fn default_user_sso<S: Store + ?Sized>(store: &S) -> Result<u64> {
    Ok(store.set_sso_for_all_users(false).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_migrate_store::{MemoryStore, Settings, User};
    use serde_json::json;

    fn legacy_settings() -> Settings {
        serde_json::from_value(json!({
            "databaseVersion": "1.0.0",
            "logLevel": "debug",
            "alertCleanup": 30,
        }))
        .unwrap()
    }

    fn user(username: &str) -> User {
        User {
            username: username.to_string(),
            password: String::new(),
            scopes: vec!["read".to_string()],
            tokens: Vec::new(),
            first_login: false,
            sso: None,
        }
    }

    #[tokio::test]
    async fn upgrades_version_and_defaults() {
        let store = MemoryStore::new();
        store.insert_settings(legacy_settings());

        let outcome = upgrade_settings(&store).await.unwrap();
        assert_eq!(outcome.previous_version.as_deref(), Some("1.0.0"));
        assert!(outcome.upgraded);

        let settings = store.get_settings().await.unwrap().unwrap();
        assert_eq!(
            settings.database_version.as_deref(),
            Some(TARGET_DATABASE_VERSION)
        );
        assert_eq!(settings.field("alertCleanup"), Some(&json!(7)));
        assert_eq!(settings.field("ssoEnable"), Some(&json!(false)));
        assert_eq!(settings.field("ssosaml"), Some(&json!({})));
        assert_eq!(settings.field("enableUpdateChecking"), Some(&json!(true)));
        assert_eq!(
            settings.field("platforms"),
            Some(&json!({"cte": true, "itsm": true}))
        );
        assert_eq!(settings.field("logLevel"), Some(&json!("debug")));
    }

    #[tokio::test]
    async fn reapplies_at_target_version() {
        let store = MemoryStore::new();
        store.insert_settings(legacy_settings());

        upgrade_settings(&store).await.unwrap();
        let outcome = upgrade_settings(&store).await.unwrap();
        assert_eq!(
            outcome.previous_version.as_deref(),
            Some(TARGET_DATABASE_VERSION)
        );
        assert!(outcome.upgraded);
    }

    #[tokio::test]
    async fn missing_settings_are_not_created() {
        let store = MemoryStore::new();

        let outcome = upgrade_settings(&store).await.unwrap();
        assert_eq!(outcome, SettingsOutcome::default());
        assert!(store.get_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn every_user_defaults_to_password_login() {
        let store = MemoryStore::new();
        store.insert_user(user("admin"));
        let mut sso_user = user("sso");
        sso_user.sso = Some(true);
        store.insert_user(sso_user);

        assert_eq!(default_user_sso(&store).await.unwrap(), 2);
        let users = store.list_users().await.unwrap();
        assert!(users.iter().all(|u| u.sso == Some(false)));
    }
}
