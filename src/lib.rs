//! Teams API
//!
//! Team creation service with:
//! - Top-level teams and child teams nested under an organization
//! - Slug reservation while billing activation is pending
//! - Background CRM sync of new team owners
//! - PostgreSQL or in-memory team storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use api::state::{AppState, TeamServiceTrait};
use domain::crm::{CrmNotifier, CrmSync};
use domain::team::TeamRepository;
use infrastructure::crm::{CrmSyncDispatcher, HttpCrmConfig, HttpCrmSync, NoopCrmSync};
use infrastructure::team::{InMemoryTeamRepository, PostgresTeamRepository, TeamCreationHandler};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let notifier = create_crm_notifier(config)?;
    let billing_enabled = config.teams.billing_enabled;

    info!(billing_enabled, "Team billing activation");

    let team_service: Arc<dyn TeamServiceTrait> = match config.database.url.as_deref() {
        Some(database_url) => {
            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            team_handler(PostgresTeamRepository::new(pool), notifier, billing_enabled)
        }
        None => {
            info!("No database configured, using in-memory team storage");
            team_handler(InMemoryTeamRepository::new(), notifier, billing_enabled)
        }
    };

    Ok(AppState::new(team_service))
}

fn team_handler<R: TeamRepository + 'static>(
    repository: R,
    notifier: Arc<dyn CrmNotifier>,
    billing_enabled: bool,
) -> Arc<dyn TeamServiceTrait> {
    Arc::new(TeamCreationHandler::new(
        Arc::new(repository),
        notifier,
        billing_enabled,
    ))
}

/// Start the CRM worker. Must be called inside a tokio runtime.
fn create_crm_notifier(config: &AppConfig) -> anyhow::Result<Arc<dyn CrmNotifier>> {
    let sync: Arc<dyn CrmSync> = match (config.crm.enabled, config.crm.base_url.as_deref()) {
        (true, Some(base_url)) => {
            info!(base_url, "CRM sync enabled");
            Arc::new(HttpCrmSync::new(HttpCrmConfig {
                base_url: base_url.to_string(),
                api_key: config.crm.api_key.clone(),
                timeout: Duration::from_secs(config.crm.timeout_secs),
            })?)
        }
        _ => {
            info!("CRM sync disabled");
            Arc::new(NoopCrmSync)
        }
    };

    // The worker runs detached until the last dispatcher handle is dropped
    let (dispatcher, _worker) = CrmSyncDispatcher::spawn(sync, config.crm.queue_capacity);

    Ok(Arc::new(dispatcher))
}
