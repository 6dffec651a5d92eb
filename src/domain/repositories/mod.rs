//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to the per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use async_trait::async_trait;

use super::report::{MalfunctionReport, MalfunctionReportRepository};
use super::station::{ChargingStation, ChargingStationRepository};
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let station = repos.stations().find_by_id(&station_id).await?;
///     let reports = repos.reports().find_by_station(&station_id).await?;
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    fn stations(&self) -> &dyn ChargingStationRepository;
    fn reports(&self) -> &dyn MalfunctionReportRepository;

    /// Persist a report and its station as one unit: both rows or neither.
    ///
    /// The default writes them one after the other, which is only correct
    /// for stores whose saves cannot fail. Transactional backends override it.
    async fn save_report_with_station(
        &self,
        report: MalfunctionReport,
        station: ChargingStation,
    ) -> DomainResult<()> {
        self.reports().save(report).await?;
        self.stations().save(station).await
    }
}
