pub mod report;
pub mod repositories;
pub mod station;
pub mod value_objects;

// Re-export commonly used types
pub use report::{
    MalfunctionReport, MalfunctionReportRepository, MalfunctionType, ReportStatus,
    ERR_STATION_DEFECTIVE, ERR_STATION_MISSING,
};
pub use repositories::{DomainResult, RepositoryProvider};
pub use station::{ChargingStation, ChargingStationRepository, StationStatus};
pub use value_objects::{PostalCode, ReportDescription, ReportId, StationId, TicketId};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
