//! In-memory repository implementations

mod memory;

pub use memory::{InMemoryReportRepository, InMemoryRepositoryProvider, InMemoryStationRepository};
