//! Filter and update document builders for MongoDB.
//!
//! Every query the migration issues is built here so the exact operator
//! semantics (`$set`, `$in`, `$ne`) live in one place.

use mongodb::bson::{doc, Bson, Document};

/// Match a document by its identifying `name`.
#[must_use]
pub fn by_name(name: &str) -> Document {
    doc! { "name": name }
}

/// Match every document in a collection.
#[must_use]
pub fn all() -> Document {
    Document::new()
}

/// Match schedules running the given task.
#[must_use]
pub fn task_equals(task: &str) -> Document {
    doc! { "task": task }
}

/// Match schedules whose `args` array contains `arg`.
#[must_use]
pub fn args_contain(arg: &str) -> Document {
    doc! { "args": { "$in": [arg] } }
}

/// Match configurations whose `tenant` is present and not null.
#[must_use]
pub fn tenant_present() -> Document {
    doc! { "tenant": { "$ne": Bson::Null } }
}

/// Match configurations using the given plugin identifier.
#[must_use]
pub fn plugin_equals(plugin: &str) -> Document {
    doc! { "plugin": plugin }
}

/// Match a tenant by its Netskope host name.
#[must_use]
pub fn tenant_name_equals(tenant_name: &str) -> Document {
    doc! { "tenantName": tenant_name }
}

/// Match a user by login name.
#[must_use]
pub fn username_equals(username: &str) -> Document {
    doc! { "username": username }
}

/// Wrap fields in a `$set` update.
#[must_use]
pub fn set(fields: Document) -> Document {
    doc! { "$set": fields }
}

/// `$set` update for the namespaced plugin path with a cleared tenant.
#[must_use]
pub fn set_plugin_clear_tenant(plugin: &str) -> Document {
    set(doc! { "plugin": plugin, "tenant": Bson::Null })
}
