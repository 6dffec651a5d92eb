//! # EV Support
//!
//! Malfunction reporting for public EV charging stations: users file reports,
//! the workflow validates them against the station registry and opens a
//! ticket, operators resolve tickets and bring stations back into service.
//!
//! ## Architecture
//!
//! - **domain**: entities, value objects and repository traits
//! - **application**: the malfunction workflow service and catalog import
//! - **infrastructure**: in-memory and SQLite (SeaORM) storage
//! - **notifications**: in-process event bus and audit trail for workflow events
//! - **config** / **bootstrap**: TOML configuration and process wiring

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notifications;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError, StorageBackend};

pub use application::{
    MalfunctionReportService, NetworkOverview, ProcessingResult, RegisterLoader, WorkflowPolicy,
};

// Re-export database types for easy access
pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};

// Re-export notifications
pub use notifications::{create_event_bus, AuditTrail, Event, EventBus, SharedEventBus};

pub use shared::errors::{AppError, DomainError, InfraError};
