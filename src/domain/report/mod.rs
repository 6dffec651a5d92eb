//! Malfunction Report aggregate

pub mod model;
pub mod repository;

pub use model::{
    MalfunctionReport, MalfunctionType, ReportStatus, ERR_STATION_DEFECTIVE, ERR_STATION_MISSING,
};
pub use repository::MalfunctionReportRepository;
