//! MongoDB storage layer for the CTE to CE database migration.
//!
//! This crate provides typed access to the collections the migration reads
//! and rewrites, behind the [`Store`] trait.
//!
//! # Architecture
//!
//! The migration touches the following collections:
//!
//! - `schedules`: periodic task definitions, keyed by `name`
//! - `settings`: the settings singleton
//! - `configurations`: threat exchange plugin configurations, keyed by `name`
//! - `itsm_configurations`: ticket orchestrator plugin configurations, keyed by `name`
//! - `netskope_tenants`: Netskope tenants, looked up by `tenantName`
//! - `users`: application users
//! - `itsm_business_rules`: ticket orchestrator business rules, keyed by `name`
//!
//! Every write is a `$set` of explicit fields, so fields this crate does not
//! model are preserved.
//!
//! # Example
//!
//! ```no_run
//! use cte_migrate_store::{ConfigurationKind, MongoStore, Store};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MongoStore::connect("mongodb://localhost:27017", "cte").await?;
//!
//! for config in store.list_configurations(ConfigurationKind::Cte).await? {
//!     println!("{} uses {}", config.name, config.plugin);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod filters;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod mongo;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use types::{
    BusinessRule, Configuration, ConfigurationKind, IndexSpec, Interval, IntervalPeriod,
    Platforms, QueueItem, Schedule, Settings, SettingsUpgrade, Tenant, User,
};

use async_trait::async_trait;
use indexmap::IndexMap;

/// The storage trait defining all database operations the migration needs.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., MongoDB, in-memory for testing). Operations that mirror a MongoDB
/// `update_one` return whether a document matched; `update_many` style
/// operations return the number of documents matched.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Schedule Operations
    // =========================================================================

    /// Get a schedule by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_schedule(&self, name: &str) -> Result<Option<Schedule>>;

    /// List all schedules.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_schedules(&self) -> Result<Vec<Schedule>>;

    /// Set the task of the schedule with the given name. Never inserts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn set_schedule_task(&self, name: &str, task: &str) -> Result<bool>;

    /// Insert the schedule, or overwrite every modelled field of the schedule
    /// with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn upsert_schedule(&self, schedule: &Schedule) -> Result<()>;

    /// Rename the task of every schedule currently running `from`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn rename_schedule_tasks(&self, from: &str, to: &str) -> Result<u64>;

    /// Delete the first schedule whose `args` contain `arg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn delete_schedule_with_arg(&self, arg: &str) -> Result<bool>;

    // =========================================================================
    // Settings Operations
    // =========================================================================

    /// Get the settings singleton.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_settings(&self) -> Result<Option<Settings>>;

    /// Apply the upgrade fields to the settings singleton. Never inserts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn apply_settings_upgrade(&self, upgrade: &SettingsUpgrade) -> Result<bool>;

    /// Insert the settings singleton if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn insert_settings_if_missing(&self, settings: &Settings) -> Result<bool>;

    // =========================================================================
    // User Operations
    // =========================================================================

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Set the `sso` flag on every user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn set_sso_for_all_users(&self, sso: bool) -> Result<u64>;

    /// Insert the user if no user with the same username exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn insert_user_if_missing(&self, user: &User) -> Result<bool>;

    // =========================================================================
    // Configuration Operations
    // =========================================================================

    /// List all configurations of a kind, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_configurations(&self, kind: ConfigurationKind) -> Result<Vec<Configuration>>;

    /// List configurations of a kind whose `tenant` is present and not null.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_tenanted_configurations(
        &self,
        kind: ConfigurationKind,
    ) -> Result<Vec<Configuration>>;

    /// Get a configuration by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_configuration(
        &self,
        kind: ConfigurationKind,
        name: &str,
    ) -> Result<Option<Configuration>>;

    /// Rename the plugin of every configuration of a kind currently using `from`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn rename_plugin(&self, kind: ConfigurationKind, from: &str, to: &str) -> Result<u64>;

    /// Set the plugin of the named configuration and clear its tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn set_plugin_clear_tenant(
        &self,
        kind: ConfigurationKind,
        name: &str,
        plugin: &str,
    ) -> Result<bool>;

    /// Set the tenant of the named configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn set_configuration_tenant(
        &self,
        kind: ConfigurationKind,
        name: &str,
        tenant: &str,
    ) -> Result<bool>;

    // =========================================================================
    // Tenant Operations
    // =========================================================================

    /// Find a tenant by its Netskope host name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_tenant_by_tenant_name(&self, tenant_name: &str) -> Result<Option<Tenant>>;

    /// Insert a tenant record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn insert_tenant(&self, tenant: &Tenant) -> Result<()>;

    // =========================================================================
    // Business Rule Operations
    // =========================================================================

    /// List all business rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_business_rules(&self) -> Result<Vec<BusinessRule>>;

    /// Replace the `queues` field of the named business rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn set_business_rule_queues(
        &self,
        name: &str,
        queues: &IndexMap<String, Vec<QueueItem>>,
    ) -> Result<bool>;

    // =========================================================================
    // Index Operations
    // =========================================================================

    /// Create single-field indexes on a collection. Existing indexes are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn ensure_indexes(&self, collection: &str, indexes: &[IndexSpec]) -> Result<()>;
}
