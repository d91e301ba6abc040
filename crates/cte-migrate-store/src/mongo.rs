//! MongoDB storage implementation.
//!
//! This module provides the `MongoStore` implementation of the `Store` trait.

use async_trait::async_trait;
use futures::TryStreamExt;
use indexmap::IndexMap;
use mongodb::bson::{self, doc, Document};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::filters;
use crate::schema::collections;
use crate::types::{
    BusinessRule, Configuration, ConfigurationKind, IndexSpec, QueueItem, Schedule, Settings,
    SettingsUpgrade, Tenant, User,
};
use crate::Store;

/// MongoDB-backed storage implementation.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

fn database_error(e: mongodb::error::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

impl MongoStore {
    /// Connect to MongoDB and select the application database.
    ///
    /// The driver connects lazily, so a ping is issued to surface an
    /// unreachable server before the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the server
    /// does not answer the ping.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await.map_err(database_error)?;
        let db = client.database(database);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(database_error)?;

        tracing::debug!(database = %database, "Connected to MongoDB");
        Ok(Self { db })
    }

    /// Wrap an already selected database.
    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// Get a collection handle.
    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    /// Serialize a value into a BSON document.
    fn serialize<T: Serialize>(value: &T) -> Result<Document> {
        bson::to_document(value).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Deserialize a value from a BSON document.
    fn deserialize<T: DeserializeOwned>(document: Document) -> Result<T> {
        bson::from_document(document).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Run a `find` and deserialize every match.
    async fn find_all<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Vec<T>> {
        let documents: Vec<Document> = self
            .collection(collection)
            .find(filter)
            .await
            .map_err(database_error)?
            .try_collect()
            .await
            .map_err(database_error)?;

        documents.into_iter().map(Self::deserialize).collect()
    }

    /// Run a `find_one` and deserialize the match.
    async fn find_first<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<T>> {
        self.collection(collection)
            .find_one(filter)
            .await
            .map_err(database_error)?
            .map(Self::deserialize)
            .transpose()
    }

    /// Run an `update_one` and report whether a document matched.
    async fn update_first(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<bool> {
        let result = self
            .collection(collection)
            .update_one(filter, update)
            .await
            .map_err(database_error)?;
        Ok(result.matched_count > 0)
    }

    /// Run an `update_many` and report how many documents matched.
    async fn update_all(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<u64> {
        let result = self
            .collection(collection)
            .update_many(filter, update)
            .await
            .map_err(database_error)?;
        Ok(result.matched_count)
    }
}

#[async_trait]
impl Store for MongoStore {
    // =========================================================================
    // Schedule Operations
    // =========================================================================

    async fn get_schedule(&self, name: &str) -> Result<Option<Schedule>> {
        self.find_first(collections::SCHEDULES, filters::by_name(name))
            .await
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        self.find_all(collections::SCHEDULES, filters::all()).await
    }

    async fn set_schedule_task(&self, name: &str, task: &str) -> Result<bool> {
        self.update_first(
            collections::SCHEDULES,
            filters::by_name(name),
            filters::set(doc! { "task": task }),
        )
        .await
    }

    async fn upsert_schedule(&self, schedule: &Schedule) -> Result<()> {
        let fields = Self::serialize(schedule)?;
        self.collection(collections::SCHEDULES)
            .update_one(filters::by_name(&schedule.name), filters::set(fields))
            .upsert(true)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    async fn rename_schedule_tasks(&self, from: &str, to: &str) -> Result<u64> {
        self.update_all(
            collections::SCHEDULES,
            filters::task_equals(from),
            filters::set(doc! { "task": to }),
        )
        .await
    }

    async fn delete_schedule_with_arg(&self, arg: &str) -> Result<bool> {
        let result = self
            .collection(collections::SCHEDULES)
            .delete_one(filters::args_contain(arg))
            .await
            .map_err(database_error)?;
        Ok(result.deleted_count > 0)
    }

    // =========================================================================
    // Settings Operations
    // =========================================================================

    async fn get_settings(&self) -> Result<Option<Settings>> {
        self.find_first(collections::SETTINGS, filters::all()).await
    }

    async fn apply_settings_upgrade(&self, upgrade: &SettingsUpgrade) -> Result<bool> {
        let fields = Self::serialize(upgrade)?;
        self.update_first(collections::SETTINGS, filters::all(), filters::set(fields))
            .await
    }

    async fn insert_settings_if_missing(&self, settings: &Settings) -> Result<bool> {
        if self.get_settings().await?.is_some() {
            return Ok(false);
        }
        let document = Self::serialize(settings)?;
        self.collection(collections::SETTINGS)
            .insert_one(document)
            .await
            .map_err(database_error)?;
        Ok(true)
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    async fn list_users(&self) -> Result<Vec<User>> {
        self.find_all(collections::USERS, filters::all()).await
    }

    async fn set_sso_for_all_users(&self, sso: bool) -> Result<u64> {
        self.update_all(
            collections::USERS,
            filters::all(),
            filters::set(doc! { "sso": sso }),
        )
        .await
    }

    async fn insert_user_if_missing(&self, user: &User) -> Result<bool> {
        let existing: Option<User> = self
            .find_first(collections::USERS, filters::username_equals(&user.username))
            .await?;
        if existing.is_some() {
            return Ok(false);
        }
        let document = Self::serialize(user)?;
        self.collection(collections::USERS)
            .insert_one(document)
            .await
            .map_err(database_error)?;
        Ok(true)
    }

    // =========================================================================
    // Configuration Operations
    // =========================================================================

    async fn list_configurations(&self, kind: ConfigurationKind) -> Result<Vec<Configuration>> {
        self.find_all(kind.collection(), filters::all()).await
    }

    async fn list_tenanted_configurations(
        &self,
        kind: ConfigurationKind,
    ) -> Result<Vec<Configuration>> {
        self.find_all(kind.collection(), filters::tenant_present())
            .await
    }

    async fn get_configuration(
        &self,
        kind: ConfigurationKind,
        name: &str,
    ) -> Result<Option<Configuration>> {
        self.find_first(kind.collection(), filters::by_name(name))
            .await
    }

    async fn rename_plugin(&self, kind: ConfigurationKind, from: &str, to: &str) -> Result<u64> {
        self.update_all(
            kind.collection(),
            filters::plugin_equals(from),
            filters::set(doc! { "plugin": to }),
        )
        .await
    }

    async fn set_plugin_clear_tenant(
        &self,
        kind: ConfigurationKind,
        name: &str,
        plugin: &str,
    ) -> Result<bool> {
        self.update_first(
            kind.collection(),
            filters::by_name(name),
            filters::set_plugin_clear_tenant(plugin),
        )
        .await
    }

    async fn set_configuration_tenant(
        &self,
        kind: ConfigurationKind,
        name: &str,
        tenant: &str,
    ) -> Result<bool> {
        self.update_first(
            kind.collection(),
            filters::by_name(name),
            filters::set(doc! { "tenant": tenant }),
        )
        .await
    }

    // =========================================================================
    // Tenant Operations
    // =========================================================================

    async fn find_tenant_by_tenant_name(&self, tenant_name: &str) -> Result<Option<Tenant>> {
        self.find_first(
            collections::NETSKOPE_TENANTS,
            filters::tenant_name_equals(tenant_name),
        )
        .await
    }

    async fn insert_tenant(&self, tenant: &Tenant) -> Result<()> {
        let document = Self::serialize(tenant)?;
        self.collection(collections::NETSKOPE_TENANTS)
            .insert_one(document)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    // =========================================================================
    // Business Rule Operations
    // =========================================================================

    async fn list_business_rules(&self) -> Result<Vec<BusinessRule>> {
        self.find_all(collections::ITSM_BUSINESS_RULES, filters::all())
            .await
    }

    async fn set_business_rule_queues(
        &self,
        name: &str,
        queues: &IndexMap<String, Vec<QueueItem>>,
    ) -> Result<bool> {
        let queues = Self::serialize(queues)?;
        self.update_first(
            collections::ITSM_BUSINESS_RULES,
            filters::by_name(name),
            filters::set(doc! { "queues": queues }),
        )
        .await
    }

    // =========================================================================
    // Index Operations
    // =========================================================================

    async fn ensure_indexes(&self, collection: &str, indexes: &[IndexSpec]) -> Result<()> {
        if indexes.is_empty() {
            return Ok(());
        }

        let models = indexes.iter().map(|index| {
            let mut keys = Document::new();
            keys.insert(index.field.clone(), index.order);
            IndexModel::builder().keys(keys).build()
        });

        self.collection(collection)
            .create_indexes(models)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}
