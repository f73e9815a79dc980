//! vaultorg server: wires configuration, storage and the activation
//! workflow together.

mod config;

use std::process::ExitCode;

use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vaultorg_auth::{ActivationError, ActivationService, InviteTokenFactory, StaticFeatureService};
use vaultorg_db::repository::{
    SurrealCollectionRepository, SurrealMembershipRepository, SurrealOrganizationRepository,
    SurrealPolicyRepository,
};
use vaultorg_db::{DbError, DbManager};

use crate::config::{ConfigError, DEFAULT_LOG_FILTER, ServerConfig};

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Activation(#[from] ActivationError),

    #[error("failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .json()
        .init();
}

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let db = DbManager::connect(&config.database)
        .await
        .map_err(DbError::from)?;
    vaultorg_db::run_migrations(db.client()).await?;

    let tokens = InviteTokenFactory::new(&config.activation)?;
    let features = StaticFeatureService::new(config.activation.enabled_features.iter().cloned());

    // No request transport is mounted in this binary: it only wires the
    // activation service to its store and holds it until shutdown.
    let client = db.client().clone();
    let activation = ActivationService::new(
        SurrealOrganizationRepository::new(client.clone()),
        SurrealMembershipRepository::new(client.clone()),
        SurrealCollectionRepository::new(client.clone()),
        SurrealPolicyRepository::new(client),
        features,
        tokens,
    );

    info!(
        features = ?config.activation.enabled_features,
        "vaultorg server ready"
    );

    tokio::signal::ctrl_c().await.map_err(ServerError::Signal)?;
    info!("Shutdown signal received");
    drop(activation);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::from_env();
    init_tracing(match &config {
        Ok(c) => c.log_filter(),
        Err(_) => DEFAULT_LOG_FILTER,
    });

    info!("Starting vaultorg server...");

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => {
            info!("vaultorg server stopped.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "vaultorg server failed");
            ExitCode::FAILURE
        }
    }
}
