//! Core types and constants for the CTE to CE database migration.
//!
//! This crate provides the vocabulary shared by the store, the tenant client,
//! and the migration steps:
//!
//! - **Plugin identifiers**: bare legacy identifiers and namespaced module paths
//! - **Catalog**: schedule names, task identifiers, and the target database version
//!
//! # Example
//!
//! ```
//! use cte_migrate_core::PluginId;
//!
//! let legacy = PluginId::new("crowdstrike");
//! assert!(!legacy.is_namespaced());
//!
//! let migrated = legacy.namespaced();
//! assert_eq!(migrated.as_str(), "netskope.plugins.Default.crowdstrike.main");
//! assert!(migrated.is_namespaced());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod plugin;

pub use catalog::TARGET_DATABASE_VERSION;
pub use plugin::{is_reserved_name, PluginId, DEFAULT_PLUGIN_NAMESPACE};
