//! In-memory storage implementation for tests.
//!
//! `MemoryStore` mirrors the MongoDB semantics the migration relies on:
//! `update_one` touches the first match in insertion order, `update_many`
//! touches every match, and upserts insert when nothing matches.

use std::collections::HashMap;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::types::{
    BusinessRule, Configuration, ConfigurationKind, IndexSpec, QueueItem, Schedule, Settings,
    SettingsUpgrade, Tenant, User,
};
use crate::Store;

#[derive(Debug, Default)]
struct Collections {
    schedules: Vec<Schedule>,
    settings: Option<Settings>,
    users: Vec<User>,
    configurations: HashMap<ConfigurationKind, Vec<Configuration>>,
    tenants: Vec<Tenant>,
    business_rules: Vec<BusinessRule>,
    indexes: Vec<(String, IndexSpec)>,
}

impl Collections {
    fn configurations(&self, kind: ConfigurationKind) -> &[Configuration] {
        self.configurations
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn configuration_mut(
        &mut self,
        kind: ConfigurationKind,
        name: &str,
    ) -> Option<&mut Configuration> {
        self.configurations
            .get_mut(&kind)?
            .iter_mut()
            .find(|c| c.name == name)
    }
}

/// In-memory `Store` used by unit and integration tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a schedule without upsert semantics.
    pub fn insert_schedule(&self, schedule: Schedule) {
        self.inner.lock().schedules.push(schedule);
    }

    /// Seed the settings singleton, replacing any existing one.
    pub fn insert_settings(&self, settings: Settings) {
        self.inner.lock().settings = Some(settings);
    }

    /// Seed a user.
    pub fn insert_user(&self, user: User) {
        self.inner.lock().users.push(user);
    }

    /// Seed a configuration.
    pub fn insert_configuration(&self, kind: ConfigurationKind, configuration: Configuration) {
        self.inner
            .lock()
            .configurations
            .entry(kind)
            .or_default()
            .push(configuration);
    }

    /// Seed a business rule.
    pub fn insert_business_rule(&self, rule: BusinessRule) {
        self.inner.lock().business_rules.push(rule);
    }

    /// Snapshot of every tenant.
    #[must_use]
    pub fn tenants(&self) -> Vec<Tenant> {
        self.inner.lock().tenants.clone()
    }

    /// Snapshot of the indexes created on a collection.
    #[must_use]
    pub fn indexes(&self, collection: &str) -> Vec<IndexSpec> {
        self.inner
            .lock()
            .indexes
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, index)| index.clone())
            .collect()
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_schedule(&self, name: &str) -> Result<Option<Schedule>> {
        Ok(self
            .inner
            .lock()
            .schedules
            .iter()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        Ok(self.inner.lock().schedules.clone())
    }

    async fn set_schedule_task(&self, name: &str, task: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        match inner.schedules.iter_mut().find(|s| s.name == name) {
            Some(schedule) => {
                schedule.task = task.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn upsert_schedule(&self, schedule: &Schedule) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.schedules.iter_mut().find(|s| s.name == schedule.name) {
            Some(existing) => *existing = schedule.clone(),
            None => inner.schedules.push(schedule.clone()),
        }
        Ok(())
    }

    async fn rename_schedule_tasks(&self, from: &str, to: &str) -> Result<u64> {
        let mut count = 0;
        for schedule in self
            .inner
            .lock()
            .schedules
            .iter_mut()
            .filter(|s| s.task == from)
        {
            schedule.task = to.to_string();
            count += 1;
        }
        Ok(count)
    }

    async fn delete_schedule_with_arg(&self, arg: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        match inner.schedules.iter().position(|s| s.has_arg(arg)) {
            Some(index) => {
                inner.schedules.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_settings(&self) -> Result<Option<Settings>> {
        Ok(self.inner.lock().settings.clone())
    }

    async fn apply_settings_upgrade(&self, upgrade: &SettingsUpgrade) -> Result<bool> {
        let mut inner = self.inner.lock();
        let Some(settings) = inner.settings.as_mut() else {
            return Ok(false);
        };

        let mut merged = to_value(&*settings)?;
        if let (Some(target), Value::Object(fields)) = (merged.as_object_mut(), to_value(upgrade)?)
        {
            target.extend(fields);
        }
        *settings = from_value(merged)?;
        Ok(true)
    }

    async fn insert_settings_if_missing(&self, settings: &Settings) -> Result<bool> {
        let mut inner = self.inner.lock();
        if inner.settings.is_some() {
            return Ok(false);
        }
        inner.settings = Some(settings.clone());
        Ok(true)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.inner.lock().users.clone())
    }

    async fn set_sso_for_all_users(&self, sso: bool) -> Result<u64> {
        let mut inner = self.inner.lock();
        for user in &mut inner.users {
            user.sso = Some(sso);
        }
        Ok(inner.users.len() as u64)
    }

    async fn insert_user_if_missing(&self, user: &User) -> Result<bool> {
        let mut inner = self.inner.lock();
        if inner.users.iter().any(|u| u.username == user.username) {
            return Ok(false);
        }
        inner.users.push(user.clone());
        Ok(true)
    }

    async fn list_configurations(&self, kind: ConfigurationKind) -> Result<Vec<Configuration>> {
        Ok(self.inner.lock().configurations(kind).to_vec())
    }

    async fn list_tenanted_configurations(
        &self,
        kind: ConfigurationKind,
    ) -> Result<Vec<Configuration>> {
        Ok(self
            .inner
            .lock()
            .configurations(kind)
            .iter()
            .filter(|c| c.tenant.is_some())
            .cloned()
            .collect())
    }

    async fn get_configuration(
        &self,
        kind: ConfigurationKind,
        name: &str,
    ) -> Result<Option<Configuration>> {
        Ok(self
            .inner
            .lock()
            .configurations(kind)
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn rename_plugin(&self, kind: ConfigurationKind, from: &str, to: &str) -> Result<u64> {
        let mut inner = self.inner.lock();
        let mut count = 0;
        if let Some(configurations) = inner.configurations.get_mut(&kind) {
            for configuration in configurations.iter_mut().filter(|c| c.plugin == from) {
                configuration.plugin = to.into();
                count += 1;
            }
        }
        Ok(count)
    }

    async fn set_plugin_clear_tenant(
        &self,
        kind: ConfigurationKind,
        name: &str,
        plugin: &str,
    ) -> Result<bool> {
        let mut inner = self.inner.lock();
        match inner.configuration_mut(kind, name) {
            Some(configuration) => {
                configuration.plugin = plugin.into();
                configuration.tenant = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_configuration_tenant(
        &self,
        kind: ConfigurationKind,
        name: &str,
        tenant: &str,
    ) -> Result<bool> {
        let mut inner = self.inner.lock();
        match inner.configuration_mut(kind, name) {
            Some(configuration) => {
                configuration.tenant = Some(tenant.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_tenant_by_tenant_name(&self, tenant_name: &str) -> Result<Option<Tenant>> {
        Ok(self
            .inner
            .lock()
            .tenants
            .iter()
            .find(|t| t.tenant_name == tenant_name)
            .cloned())
    }

    async fn insert_tenant(&self, tenant: &Tenant) -> Result<()> {
        self.inner.lock().tenants.push(tenant.clone());
        Ok(())
    }

    async fn list_business_rules(&self) -> Result<Vec<BusinessRule>> {
        Ok(self.inner.lock().business_rules.clone())
    }

    async fn set_business_rule_queues(
        &self,
        name: &str,
        queues: &IndexMap<String, Vec<QueueItem>>,
    ) -> Result<bool> {
        let mut inner = self.inner.lock();
        match inner.business_rules.iter_mut().find(|r| r.name == name) {
            Some(rule) => {
                rule.queues = queues.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ensure_indexes(&self, collection: &str, indexes: &[IndexSpec]) -> Result<()> {
        let mut inner = self.inner.lock();
        for index in indexes {
            let exists = inner
                .indexes
                .iter()
                .any(|(c, existing)| c == collection && existing == index);
            if !exists {
                inner.indexes.push((collection.to_string(), index.clone()));
            }
        }
        Ok(())
    }
}
