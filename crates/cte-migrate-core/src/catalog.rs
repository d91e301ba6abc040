//! Schedule names, task identifiers, and version markers.
//!
//! Schedule names are the identifying key of periodic task documents, so they
//! must match the stored values byte for byte.

/// Database version written to the settings singleton on completion.
pub const TARGET_DATABASE_VERSION: &str = "2.0.0";

/// Document class tag carried by every periodic task.
pub const PERIODIC_TASK_CLASS: &str = "PeriodicTask";

/// Names of the built-in periodic tasks.
pub mod schedules {
    /// Ages threat indicators.
    pub const INDICATOR_AGING: &str = "INTERNAL INDICATOR AGING TASK";

    /// Unmutes ticket orchestrator alerts.
    pub const UNMUTE: &str = "INTERNAL UNMUTE TASK";

    /// Unmutes risk exchange records.
    pub const CRE_UNMUTE: &str = "CRE INTERNAL UNMUTE TASK";

    /// Recomputes the aggregate risk score.
    pub const CRE_AGGREGATE_SCORE: &str = "CRE AVERAGE NORMALIZED SCORE TASH";

    /// Purges old alerts.
    pub const ALERT_CLEANUP: &str = "INTERNAL ALERT CLEANUP TASK";

    /// Purges old logs.
    pub const LOG_CLEANUP: &str = "INTERNAL LOG CLEANUP TASK";

    /// Checks for product updates.
    pub const UPDATE: &str = "INTERNAL UPDATE TASK";
}

/// Dotted task identifiers understood by the worker.
pub mod tasks {
    /// Indicator aging.
    pub const AGE_INDICATORS: &str = "cte.age_indicators";

    /// Alert unmuting.
    pub const ITSM_UNMUTE: &str = "itsm.unmute";

    /// Alert cleanup.
    pub const ITSM_DELETE_ALERTS: &str = "itsm.delete_alerts";

    /// Risk exchange unmuting.
    pub const CRE_UNMUTE: &str = "cre.unmute";

    /// Aggregate risk score.
    pub const CRE_CALCULATE_AGGREGATE: &str = "cre.calculate_aggregate";

    /// Log cleanup.
    pub const CRE_DELETE_LOGS: &str = "cre.delete_logs";

    /// Update check.
    pub const CHECK_UPDATES: &str = "common.check_updates";

    /// Plugin execution, pre-2.0 module path.
    pub const LEGACY_EXECUTE_PLUGIN: &str = "cte.tasks.plugin_lifecycle_task.execute_plugin";

    /// Plugin execution.
    pub const EXECUTE_PLUGIN: &str = "cte.execute_plugin";
}
