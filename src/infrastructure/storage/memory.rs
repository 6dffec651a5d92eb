//! In-memory storage implementation

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    ChargingStation, ChargingStationRepository, DomainResult, MalfunctionReport,
    MalfunctionReportRepository, RepositoryProvider, ReportId, StationId, TicketId,
};

/// In-memory station store for development and testing
#[derive(Default)]
pub struct InMemoryStationRepository {
    stations: DashMap<StationId, ChargingStation>,
}

impl InMemoryStationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChargingStationRepository for InMemoryStationRepository {
    async fn save(&self, station: ChargingStation) -> DomainResult<()> {
        self.stations.insert(station.station_id().clone(), station);
        Ok(())
    }

    async fn find_by_id(&self, id: &StationId) -> DomainResult<Option<ChargingStation>> {
        Ok(self.stations.get(id).map(|s| s.clone()))
    }

    async fn find_by_postal_code(&self, postal_code: &str) -> DomainResult<Vec<ChargingStation>> {
        Ok(self
            .stations
            .iter()
            .filter(|s| s.postal_code() == postal_code)
            .map(|s| s.clone())
            .collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<ChargingStation>> {
        Ok(self.stations.iter().map(|s| s.value().clone()).collect())
    }

    async fn exists(&self, id: &StationId) -> DomainResult<bool> {
        Ok(self.stations.contains_key(id))
    }

    async fn count(&self) -> DomainResult<usize> {
        Ok(self.stations.len())
    }
}

/// In-memory report store with a secondary ticket index
#[derive(Default)]
pub struct InMemoryReportRepository {
    reports: DashMap<ReportId, MalfunctionReport>,
    by_ticket: DashMap<TicketId, ReportId>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MalfunctionReportRepository for InMemoryReportRepository {
    async fn save(&self, report: MalfunctionReport) -> DomainResult<()> {
        let report_id = report.report_id();

        // A ticket never moves between reports, but a replaced report may drop it.
        if let Some(previous) = self.reports.get(&report_id).and_then(|r| r.ticket_id()) {
            if report.ticket_id() != Some(previous) {
                self.by_ticket.remove(&previous);
            }
        }
        if let Some(ticket_id) = report.ticket_id() {
            self.by_ticket.insert(ticket_id, report_id);
        }

        self.reports.insert(report_id, report);
        Ok(())
    }

    async fn find_by_id(&self, id: &ReportId) -> DomainResult<Option<MalfunctionReport>> {
        Ok(self.reports.get(id).map(|r| r.clone()))
    }

    async fn find_by_station(&self, station_id: &StationId) -> DomainResult<Vec<MalfunctionReport>> {
        Ok(self
            .reports
            .iter()
            .filter(|r| r.station_id() == station_id)
            .map(|r| r.clone())
            .collect())
    }

    async fn find_by_ticket(&self, ticket_id: &TicketId) -> DomainResult<Option<MalfunctionReport>> {
        let Some(report_id) = self.by_ticket.get(ticket_id).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.reports.get(&report_id).map(|r| r.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<MalfunctionReport>> {
        Ok(self.reports.iter().map(|r| r.value().clone()).collect())
    }
}

/// In-memory `RepositoryProvider`
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    stations: InMemoryStationRepository,
    reports: InMemoryReportRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn stations(&self) -> &dyn ChargingStationRepository {
        &self.stations
    }

    fn reports(&self) -> &dyn MalfunctionReportRepository {
        &self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MalfunctionType, ReportDescription};

    fn station(id: &str, postal_code: &str) -> ChargingStation {
        ChargingStation::new(StationId::new(id).unwrap(), format!("Station {id}"), postal_code)
    }

    fn report(station_id: &str, text: &str) -> MalfunctionReport {
        MalfunctionReport::new(
            ReportId::new(),
            StationId::new(station_id).unwrap(),
            MalfunctionType::NotCharging,
            ReportDescription::new(text).unwrap(),
            None,
        )
    }

    #[tokio::test]
    async fn save_and_find_station() {
        let repo = InMemoryStationRepository::new();
        let s = station("STATION-001", "10178");
        repo.save(s.clone()).await.unwrap();

        let found = repo.find_by_id(s.station_id()).await.unwrap().unwrap();
        assert_eq!(found.station_id(), s.station_id());
        assert_eq!(found.name(), s.name());
        assert!(repo.exists(s.station_id()).await.unwrap());
    }

    #[tokio::test]
    async fn missing_station_is_absent_not_error() {
        let repo = InMemoryStationRepository::new();
        let id = StationId::new("NONEXISTENT").unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert!(!repo.exists(&id).await.unwrap());
    }

    #[tokio::test]
    async fn save_is_upsert() {
        let repo = InMemoryStationRepository::new();
        let mut s = station("STATION-001", "10178");
        repo.save(s.clone()).await.unwrap();
        s.mark_as_defective().unwrap();
        repo.save(s.clone()).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let found = repo.find_by_id(s.station_id()).await.unwrap().unwrap();
        assert!(!found.is_operational());
    }

    #[tokio::test]
    async fn find_by_postal_code() {
        let repo = InMemoryStationRepository::new();
        repo.save(station("STATION-001", "10178")).await.unwrap();
        repo.save(station("STATION-002", "10178")).await.unwrap();
        repo.save(station("STATION-003", "10785")).await.unwrap();

        let found = repo.find_by_postal_code("10178").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| s.postal_code() == "10178"));
        assert_eq!(repo.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn find_reports_by_station() {
        let repo = InMemoryReportRepository::new();
        repo.save(report("STATION-001", "First report")).await.unwrap();
        repo.save(report("STATION-001", "Second report")).await.unwrap();
        repo.save(report("STATION-002", "Other station")).await.unwrap();

        let station_id = StationId::new("STATION-001").unwrap();
        assert_eq!(repo.find_by_station(&station_id).await.unwrap().len(), 2);
        assert_eq!(repo.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn ticket_index_follows_saves() {
        let repo = InMemoryReportRepository::new();
        let mut r = report("STATION-001", "Display is completely black");
        repo.save(r.clone()).await.unwrap();

        let ticket = TicketId::new();
        assert!(repo.find_by_ticket(&ticket).await.unwrap().is_none());

        r.validate(true, true);
        r.create_ticket(ticket).unwrap();
        repo.save(r.clone()).await.unwrap();

        let found = repo.find_by_ticket(&ticket).await.unwrap().unwrap();
        assert_eq!(found.report_id(), r.report_id());
    }
}
