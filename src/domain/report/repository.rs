//! Malfunction report repository interface

use async_trait::async_trait;

use super::model::MalfunctionReport;
use crate::domain::value_objects::{ReportId, StationId, TicketId};
use crate::domain::DomainResult;

#[async_trait]
pub trait MalfunctionReportRepository: Send + Sync {
    /// Insert or replace, keyed by report id.
    async fn save(&self, report: MalfunctionReport) -> DomainResult<()>;
    async fn find_by_id(&self, id: &ReportId) -> DomainResult<Option<MalfunctionReport>>;
    async fn find_by_station(&self, station_id: &StationId) -> DomainResult<Vec<MalfunctionReport>>;
    /// Indexed lookup; implementations must not scan every report.
    async fn find_by_ticket(&self, ticket_id: &TicketId) -> DomainResult<Option<MalfunctionReport>>;
    async fn find_all(&self) -> DomainResult<Vec<MalfunctionReport>>;
}
