//! Error types for the migration.
//!
//! Every error is fatal: the migration stops at the first failure and leaves
//! the database partially migrated.

use cte_migrate_store::ConfigurationKind;
use thiserror::Error;

use crate::types::Step;

/// A result type using `MigrateError`.
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A Netskope connector configuration lacks a credential parameter.
    #[error("configuration {configuration:?} in {kind} is missing parameter {field}")]
    MissingParameter {
        /// The collection the configuration lives in.
        kind: ConfigurationKind,
        /// The configuration name.
        configuration: String,
        /// Dotted parameter path, e.g. `auth.token`.
        field: String,
    },

    /// A migration step failed.
    #[error("{step} failed: {source}")]
    StepFailed {
        /// The step that failed.
        step: Step,
        /// The underlying failure.
        #[source]
        source: Box<MigrateError>,
    },

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] cte_migrate_store::StoreError),

    /// Tenant creation error.
    #[error("tenant error: {0}")]
    Tenant(#[from] cte_migrate_tenants::TenantError),
}

impl MigrateError {
    /// Attribute this error to a step.
    #[must_use]
    pub fn in_step(self, step: Step) -> Self {
        Self::StepFailed {
            step,
            source: Box::new(self),
        }
    }

    /// The step this error was attributed to, if any.
    #[must_use]
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}
