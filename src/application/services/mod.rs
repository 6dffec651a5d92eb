//! Application services

mod locks;
mod malfunction;

pub use locks::KeyedLocks;
pub use malfunction::{MalfunctionReportService, NetworkOverview, ProcessingResult, WorkflowPolicy};
