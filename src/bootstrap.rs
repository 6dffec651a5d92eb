//! Process wiring: logging, storage backend and the workflow service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{seed_stations, CatalogSummary, MalfunctionReportService, RegisterLoader};
use crate::config::{AppConfig, StorageBackend};
use crate::domain::RepositoryProvider;
use crate::infrastructure::{
    connect_and_migrate, InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};
use crate::notifications::SharedEventBus;
use crate::shared::errors::{AppError, InfraError};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is a no-op.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Open the configured backend, migrate it and seed the station catalog.
pub async fn build_repositories(
    config: &AppConfig,
) -> Result<Arc<dyn RepositoryProvider>, AppError> {
    let repos: Arc<dyn RepositoryProvider> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Arc::new(InMemoryRepositoryProvider::new())
        }
        StorageBackend::Sqlite => {
            let db_config = config.storage.database_config();
            let db = connect_and_migrate(&db_config)
                .await
                .map_err(InfraError::from)?;
            Arc::new(SeaOrmRepositoryProvider::new(db))
        }
    };

    if config.catalog.seed_on_startup {
        seed_catalog_if_empty(config, repos.as_ref()).await?;
    }

    Ok(repos)
}

async fn seed_catalog_if_empty(
    config: &AppConfig,
    repos: &dyn RepositoryProvider,
) -> Result<(), AppError> {
    let Some(path) = &config.catalog.path else {
        return Ok(());
    };

    let existing = repos.stations().count().await?;
    if existing > 0 {
        info!(stations = existing, "Station catalog already present, skipping seed");
        return Ok(());
    }

    let stations = RegisterLoader::new(&config.catalog.region).load_file(path)?;
    let summary = CatalogSummary::from_stations(&stations);
    seed_stations(repos.stations(), stations).await?;

    info!(
        region = %config.catalog.region,
        stations = summary.total_stations,
        postal_codes = summary.unique_postal_codes,
        coverage = summary.coverage_percentage,
        "Station catalog imported"
    );
    Ok(())
}

/// Repositories plus the workflow service configured from `config`.
pub async fn build_service(
    config: &AppConfig,
    event_bus: Option<SharedEventBus>,
) -> Result<MalfunctionReportService, AppError> {
    let repos = build_repositories(config).await?;
    let mut service =
        MalfunctionReportService::new(repos).with_policy(config.workflow_policy());
    if let Some(bus) = event_bus {
        service = service.with_event_bus(bus);
    }
    Ok(service)
}
