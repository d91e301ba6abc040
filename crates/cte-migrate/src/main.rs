//! CTE to CE database migration.
//!
//! This is the entry point for the `cte-migrate` binary. Run it once, with
//! exclusive access to the database, after upgrading the containers.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cte_migrate::{bootstrap, MigrateConfig, Migrator};
use cte_migrate_core::TARGET_DATABASE_VERSION;
use cte_migrate_store::MongoStore;
use cte_migrate_tenants::{HttpTenantService, StoreTenantService, TenantService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Migrate a CTE 1.0.0/2.0.x database to the CE data model.
#[derive(Parser, Debug)]
#[command(name = "cte-migrate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MongoDB connection string.
    #[arg(
        long,
        env = "MONGO_CONNECTION_STRING",
        default_value = "mongodb://localhost:27017"
    )]
    mongo_uri: String,

    /// Application database name.
    #[arg(long, env = "MONGO_DATABASE", default_value = "cte")]
    database: String,

    /// Core API base URL used to create tenants. Tenants are inserted
    /// directly into the database when unset.
    #[arg(long, env = "TENANT_API_URL")]
    tenant_api_url: Option<String>,

    /// Bearer token for the tenant API.
    #[arg(long, env = "TENANT_API_TOKEN", hide_env_values = true)]
    tenant_api_token: Option<String>,

    /// Tenant API request timeout in seconds.
    #[arg(long, default_value = "30")]
    request_timeout_seconds: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Migrate an existing database (default).
    Migrate,
    /// Seed an empty database for a fresh install.
    Bootstrap,
}

impl Args {
    fn config(&self) -> MigrateConfig {
        MigrateConfig {
            mongo_uri: self.mongo_uri.clone(),
            database: self.database.clone(),
            tenant_api_url: self.tenant_api_url.clone(),
            tenant_api_token: self.tenant_api_token.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }
}

fn tenant_service(
    config: &MigrateConfig,
    store: &Arc<MongoStore>,
) -> anyhow::Result<Arc<dyn TenantService>> {
    if let Some(api) = config.tenant_api() {
        tracing::info!(tenant_api = %api.base_url, "Creating tenants through the tenant API");
        let service = HttpTenantService::new(api).context("failed to build tenant API client")?;
        Ok(Arc::new(service))
    } else {
        tracing::warn!(
            "TENANT_API_URL not set, tenants will be inserted directly into the database"
        );
        Ok(Arc::new(StoreTenantService::new(Arc::clone(store))))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cte_migrate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.config();
    let store = Arc::new(
        MongoStore::connect(&config.mongo_uri, &config.database)
            .await
            .with_context(|| format!("failed to connect to database {}", config.database))?,
    );
    tracing::info!(database = %config.database, "Connected to MongoDB");

    match args.command.unwrap_or(Command::Migrate) {
        Command::Migrate => {
            let tenants = tenant_service(&config, &store)?;
            let report = Migrator::new(store, tenants)
                .run()
                .await
                .context("migration aborted, database is partially migrated")?;

            tracing::info!(
                previous_version = ?report.previous_version,
                schedules_upserted = report.schedules_upserted,
                schedule_tasks_renamed = report.schedule_tasks_renamed,
                users_updated = report.users_updated,
                plugins_renamed = report.plugins_renamed,
                schedules_pruned = report.schedules_pruned,
                configurations_reformatted = report.configurations_reformatted,
                tenants_created = report.tenants_created,
                tenants_reused = report.tenants_reused,
                configurations_stamped = report.configurations_stamped,
                queue_items_backfilled = report.queue_items_backfilled,
                rules_rewritten = report.rules_rewritten,
                elapsed_ms = report.elapsed().map(|d| d.num_milliseconds()),
                "Migration complete"
            );
            println!("Successfully migrated database to version {TARGET_DATABASE_VERSION}");
        }
        Command::Bootstrap => {
            bootstrap(store.as_ref())
                .await
                .context("bootstrap aborted")?;
            println!("Successfully bootstrapped database at version {TARGET_DATABASE_VERSION}");
        }
    }

    Ok(())
}
