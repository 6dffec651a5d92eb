pub mod catalog;
pub mod services;

// Re-export key types for convenience
pub use catalog::{seed_stations, CatalogSummary, RegisterLoader};
pub use services::{
    KeyedLocks, MalfunctionReportService, NetworkOverview, ProcessingResult, WorkflowPolicy,
};
