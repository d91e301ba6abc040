//! One-shot migration of a CTE 1.0.0/2.0.x database to the CE data model.
//!
//! This crate holds the migration steps and the [`Migrator`] that runs them
//! in order against a [`Store`](cte_migrate_store::Store), creating tenants
//! through a [`TenantService`](cte_migrate_tenants::TenantService).
//!
//! # Steps
//!
//! 1. Normalize the built-in schedules
//! 2. Upgrade the settings singleton to `2.0.0`
//! 3. Default every user to password login
//! 4. Fix legacy plugin identifier case
//! 5. Prune schedules of configurations already in the new shape
//! 6. Move plugin identifiers to their namespaced module path
//! 7. Link Netskope connector configurations to tenants
//! 8. Copy configuration mappings into business rule queue items
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use cte_migrate::Migrator;
//! use cte_migrate_store::MongoStore;
//! use cte_migrate_tenants::StoreTenantService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MongoStore::connect("mongodb://localhost:27017", "cte").await?);
//! let tenants = Arc::new(StoreTenantService::new(store.clone()));
//!
//! let report = Migrator::new(store, tenants).run().await?;
//! println!("created {} tenants", report.tenants_created);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backfill;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod migrator;
pub mod plugins;
pub mod prune;
pub mod rules;
pub mod schedules;
pub mod settings;
pub mod types;

pub use bootstrap::{bootstrap, BootstrapOutcome};
pub use config::MigrateConfig;
pub use error::{MigrateError, Result};
pub use migrator::Migrator;
pub use types::{MigrationReport, Step};
