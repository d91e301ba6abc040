//! Collection names.
//!
//! This module defines the MongoDB collections the migration reads and writes.

/// Collection names in the application database.
pub mod collections {
    /// Periodic task definitions, keyed by `name`.
    pub const SCHEDULES: &str = "schedules";

    /// The settings singleton.
    pub const SETTINGS: &str = "settings";

    /// Threat exchange plugin configurations, keyed by `name`.
    pub const CONFIGURATIONS: &str = "configurations";

    /// Ticket orchestrator plugin configurations, keyed by `name`.
    pub const ITSM_CONFIGURATIONS: &str = "itsm_configurations";

    /// Netskope tenants, keyed by `name` and looked up by `tenantName`.
    pub const NETSKOPE_TENANTS: &str = "netskope_tenants";

    /// Application users, keyed by `username`.
    pub const USERS: &str = "users";

    /// Ticket orchestrator business rules, keyed by `name`.
    pub const ITSM_BUSINESS_RULES: &str = "itsm_business_rules";

    /// Threat indicators.
    pub const INDICATORS: &str = "indicators";
}
