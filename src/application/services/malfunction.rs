//! Malfunction report workflow
//!
//! Submit, process (validate + ticket) and resolve reports against the
//! station registry. Business rejections come back as a failed
//! [`ProcessingResult`]; storage and input errors as `Err(DomainError)`.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::locks::KeyedLocks;
use crate::domain::{
    ChargingStation, DomainResult, MalfunctionReport, MalfunctionType, PostalCode,
    ReportDescription, ReportId, RepositoryProvider, StationId, StationStatus, TicketId,
};
use crate::notifications::{
    Event, MalfunctionResolvedEvent, ReportRejectedEvent, ReportSubmittedEvent, SharedEventBus,
    StationStatusChangedEvent, TicketCreatedEvent,
};
use crate::shared::errors::DomainError;

/// Behaviour switches for the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Refuse to process a report that already carries a ticket.
    ///
    /// When off, the report goes through validation again and ends up
    /// `Invalid` against its own (now defective) station, keeping the ticket.
    pub reject_reprocessing: bool,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            reject_reprocessing: true,
        }
    }
}

/// Outcome of processing one report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub ticket_id: Option<TicketId>,
    pub errors: Vec<String>,
}

impl ProcessingResult {
    pub fn ticket_created(ticket_id: TicketId) -> Self {
        Self {
            success: true,
            ticket_id: Some(ticket_id),
            errors: Vec::new(),
        }
    }

    pub fn rejected(errors: Vec<String>) -> Self {
        Self {
            success: false,
            ticket_id: None,
            errors,
        }
    }
}

/// Network-wide statistics for the operator view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkOverview {
    pub total_stations: usize,
    pub defective_stations: usize,
    pub open_reports: usize,
    pub health_percentage: f64,
}

/// Service for the malfunction report workflow
pub struct MalfunctionReportService {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: Option<SharedEventBus>,
    policy: WorkflowPolicy,
    report_locks: KeyedLocks<ReportId>,
    station_locks: KeyedLocks<StationId>,
}

impl MalfunctionReportService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            event_bus: None,
            policy: WorkflowPolicy::default(),
            report_locks: KeyedLocks::new(),
            station_locks: KeyedLocks::new(),
        }
    }

    pub fn with_event_bus(mut self, event_bus: SharedEventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_policy(mut self, policy: WorkflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> WorkflowPolicy {
        self.policy
    }

    pub fn repositories(&self) -> &Arc<dyn RepositoryProvider> {
        &self.repos
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    // ── Workflow ────────────────────────────────────────────────

    /// File a new report. The station is not looked up here; an unknown
    /// station is caught when the report is processed.
    pub async fn submit_malfunction_report(
        &self,
        station_id: &str,
        malfunction_type: MalfunctionType,
        description: &str,
        reported_by: Option<&str>,
    ) -> DomainResult<ReportId> {
        let station_id = StationId::new(station_id)?;
        let description = ReportDescription::new(description)?;
        let reported_by = reported_by
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let report_id = ReportId::new();
        let report = MalfunctionReport::new(
            report_id,
            station_id.clone(),
            malfunction_type,
            description,
            reported_by,
        );
        self.repos.reports().save(report).await?;

        info!(
            report_id = %report_id,
            station_id = %station_id,
            malfunction_type = malfunction_type.as_str(),
            "Malfunction report submitted"
        );
        metrics::counter!("malfunction_reports_submitted_total", "type" => malfunction_type.as_str())
            .increment(1);
        self.publish(Event::ReportSubmitted(ReportSubmittedEvent {
            report_id,
            station_id,
            malfunction_type,
            timestamp: Utc::now(),
        }));

        Ok(report_id)
    }

    /// Validate a report against its station and open a ticket.
    pub async fn process_malfunction_report(
        &self,
        report_id: ReportId,
    ) -> DomainResult<ProcessingResult> {
        let _report_guard = self.report_locks.lock(&report_id).await;

        let Some(mut report) = self.repos.reports().find_by_id(&report_id).await? else {
            warn!(report_id = %report_id, "Processing skipped, report not found");
            return Ok(ProcessingResult::rejected(vec![format!(
                "report {} not found",
                report_id
            )]));
        };

        if self.policy.reject_reprocessing {
            if let Some(ticket_id) = report.ticket_id() {
                warn!(
                    report_id = %report_id,
                    ticket_id = %ticket_id,
                    status = %report.status(),
                    "Re-processing refused"
                );
                return Ok(ProcessingResult::rejected(vec![format!(
                    "report {} already has ticket {}",
                    report_id, ticket_id
                )]));
            }
        }

        let station_id = report.station_id().clone();
        let _station_guard = self.station_locks.lock(&station_id).await;

        let station = self.repos.stations().find_by_id(&station_id).await?;
        let (exists, operational) = match &station {
            Some(s) => (true, s.is_operational()),
            None => (false, false),
        };

        if !report.validate(exists, operational) {
            let errors = report.validation_errors().to_vec();
            self.repos.reports().save(report).await?;

            info!(
                report_id = %report_id,
                station_id = %station_id,
                errors = ?errors,
                "Malfunction report rejected"
            );
            metrics::counter!("malfunction_reports_rejected_total").increment(1);
            self.publish(Event::ReportRejected(ReportRejectedEvent {
                report_id,
                station_id,
                reasons: errors.clone(),
                timestamp: Utc::now(),
            }));

            return Ok(ProcessingResult::rejected(errors));
        }

        let mut station = station.ok_or_else(|| station_not_found(&station_id))?;
        let old_status = station.status();

        let ticket_id = TicketId::new();
        report.create_ticket(ticket_id)?;
        station.mark_as_defective()?;

        self.repos.save_report_with_station(report, station).await?;

        info!(
            report_id = %report_id,
            ticket_id = %ticket_id,
            station_id = %station_id,
            "Ticket created, station marked defective"
        );
        metrics::counter!("malfunction_tickets_created_total").increment(1);
        self.publish(Event::TicketCreated(TicketCreatedEvent {
            report_id,
            ticket_id,
            station_id: station_id.clone(),
            timestamp: Utc::now(),
        }));
        self.publish(Event::StationStatusChanged(StationStatusChangedEvent {
            station_id,
            old_status,
            new_status: StationStatus::Defective,
            timestamp: Utc::now(),
        }));

        Ok(ProcessingResult::ticket_created(ticket_id))
    }

    /// Close a ticket and put the station back into service.
    ///
    /// `operator_notes` are logged and published, never stored.
    pub async fn resolve_malfunction(
        &self,
        ticket_id: TicketId,
        operator_notes: Option<&str>,
    ) -> DomainResult<()> {
        let report_id = self
            .repos
            .reports()
            .find_by_ticket(&ticket_id)
            .await?
            .map(|r| r.report_id())
            .ok_or_else(|| ticket_not_found(ticket_id))?;

        let _report_guard = self.report_locks.lock(&report_id).await;

        // Re-read under the guard; the ticket must still belong to this report.
        let mut report = self
            .repos
            .reports()
            .find_by_id(&report_id)
            .await?
            .filter(|r| r.ticket_id() == Some(ticket_id))
            .ok_or_else(|| ticket_not_found(ticket_id))?;

        let station_id = report.station_id().clone();
        let _station_guard = self.station_locks.lock(&station_id).await;

        let mut station = self
            .repos
            .stations()
            .find_by_id(&station_id)
            .await?
            .ok_or_else(|| station_not_found(&station_id))?;
        let old_status = station.status();

        report.resolve()?;
        station.mark_as_available()?;

        self.repos.save_report_with_station(report, station).await?;

        let operator_notes = operator_notes
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        info!(
            report_id = %report_id,
            ticket_id = %ticket_id,
            station_id = %station_id,
            operator_notes = operator_notes.as_deref().unwrap_or(""),
            "Malfunction resolved, station available"
        );
        metrics::counter!("malfunction_tickets_resolved_total").increment(1);
        self.publish(Event::MalfunctionResolved(MalfunctionResolvedEvent {
            report_id,
            ticket_id,
            station_id: station_id.clone(),
            operator_notes,
            timestamp: Utc::now(),
        }));
        self.publish(Event::StationStatusChanged(StationStatusChangedEvent {
            station_id,
            old_status,
            new_status: StationStatus::Available,
            timestamp: Utc::now(),
        }));

        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get_report(&self, report_id: ReportId) -> DomainResult<Option<MalfunctionReport>> {
        self.repos.reports().find_by_id(&report_id).await
    }

    pub async fn get_reports_for_station(
        &self,
        station_id: &str,
    ) -> DomainResult<Vec<MalfunctionReport>> {
        let station_id = StationId::new(station_id)?;
        self.repos.reports().find_by_station(&station_id).await
    }

    pub async fn get_all_reports(&self) -> DomainResult<Vec<MalfunctionReport>> {
        self.repos.reports().find_all().await
    }

    /// Every report not yet resolved.
    pub async fn get_open_reports(&self) -> DomainResult<Vec<MalfunctionReport>> {
        let reports = self.repos.reports().find_all().await?;
        Ok(reports.into_iter().filter(|r| r.is_open()).collect())
    }

    pub async fn list_stations(
        &self,
        postal_code: Option<&PostalCode>,
    ) -> DomainResult<Vec<ChargingStation>> {
        let mut stations = match postal_code {
            Some(code) => self.repos.stations().find_by_postal_code(code.as_str()).await?,
            None => self.repos.stations().find_all().await?,
        };
        stations.sort_by(|a, b| a.station_id().as_str().cmp(b.station_id().as_str()));
        Ok(stations)
    }

    pub async fn network_overview(&self) -> DomainResult<NetworkOverview> {
        let stations = self.repos.stations().find_all().await?;
        let open_reports = self.get_open_reports().await?.len();

        let total_stations = stations.len();
        let defective_stations = stations
            .iter()
            .filter(|s| s.status() == StationStatus::Defective)
            .count();

        let health_percentage = if total_stations == 0 {
            100.0
        } else {
            ((1.0 - open_reports as f64 / total_stations as f64) * 100.0).max(0.0)
        };

        Ok(NetworkOverview {
            total_stations,
            defective_stations,
            open_reports,
            health_percentage,
        })
    }
}

fn ticket_not_found(ticket_id: TicketId) -> DomainError {
    DomainError::NotFound {
        entity: "MalfunctionReport",
        field: "ticket_id",
        value: ticket_id.to_string(),
    }
}

fn station_not_found(station_id: &StationId) -> DomainError {
    DomainError::NotFound {
        entity: "ChargingStation",
        field: "station_id",
        value: station_id.to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReportStatus, ERR_STATION_DEFECTIVE, ERR_STATION_MISSING};
    use crate::infrastructure::InMemoryRepositoryProvider;
    use crate::notifications::create_event_bus;

    const DESCRIPTION: &str = "Vehicle not charging properly";

    async fn service_with_station() -> MalfunctionReportService {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let station = ChargingStation::new(
            StationId::new("STATION-001").unwrap(),
            "Test Station",
            "10115",
        );
        repos.stations().save(station).await.unwrap();
        MalfunctionReportService::new(repos)
    }

    async fn station_status(service: &MalfunctionReportService, id: &str) -> StationStatus {
        service
            .repositories()
            .stations()
            .find_by_id(&StationId::new(id).unwrap())
            .await
            .unwrap()
            .unwrap()
            .status()
    }

    async fn load_report(service: &MalfunctionReportService, id: ReportId) -> MalfunctionReport {
        service.get_report(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn submit_persists_submitted_report() {
        let service = service_with_station().await;
        let id = service
            .submit_malfunction_report(
                "STATION-001",
                MalfunctionType::NotCharging,
                DESCRIPTION,
                Some("  user@example.com "),
            )
            .await
            .unwrap();

        let report = load_report(&service, id).await;
        assert_eq!(report.status(), ReportStatus::Submitted);
        assert_eq!(report.reported_by(), Some("user@example.com"));
        assert_eq!(report.description().as_str(), DESCRIPTION);
    }

    #[tokio::test]
    async fn submit_rejects_short_description_without_persisting() {
        let service = service_with_station().await;
        let err = service
            .submit_malfunction_report("STATION-001", MalfunctionType::Other, "Bad", None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(service.get_all_reports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_rejects_blank_station_id() {
        let service = service_with_station().await;
        let err = service
            .submit_malfunction_report("  ", MalfunctionType::Other, DESCRIPTION, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn submit_does_not_check_station_existence() {
        let service = service_with_station().await;
        let id = service
            .submit_malfunction_report("NONEXISTENT", MalfunctionType::Other, DESCRIPTION, None)
            .await
            .unwrap();
        assert_eq!(load_report(&service, id).await.status(), ReportStatus::Submitted);
    }

    #[tokio::test]
    async fn process_creates_ticket_and_marks_station_defective() {
        let service = service_with_station().await;
        let id = service
            .submit_malfunction_report(
                "STATION-001",
                MalfunctionType::NotCharging,
                DESCRIPTION,
                None,
            )
            .await
            .unwrap();

        let result = service.process_malfunction_report(id).await.unwrap();
        assert!(result.success);
        assert!(result.errors.is_empty());
        let ticket = result.ticket_id.expect("ticket id");

        let report = load_report(&service, id).await;
        assert_eq!(report.status(), ReportStatus::TicketCreated);
        assert_eq!(report.ticket_id(), Some(ticket));
        assert_eq!(station_status(&service, "STATION-001").await, StationStatus::Defective);
    }

    #[tokio::test]
    async fn process_unknown_station_collects_both_errors() {
        let service = service_with_station().await;
        let id = service
            .submit_malfunction_report("NONEXISTENT", MalfunctionType::Other, DESCRIPTION, None)
            .await
            .unwrap();

        let result = service.process_malfunction_report(id).await.unwrap();
        assert!(!result.success);
        assert!(result.ticket_id.is_none());
        assert_eq!(
            result.errors,
            vec![ERR_STATION_MISSING.to_string(), ERR_STATION_DEFECTIVE.to_string()]
        );

        let report = load_report(&service, id).await;
        assert_eq!(report.status(), ReportStatus::Invalid);
        assert_eq!(report.validation_errors(), result.errors.as_slice());
    }

    #[tokio::test]
    async fn process_missing_report_is_business_failure() {
        let service = service_with_station().await;
        let id = ReportId::new();
        let result = service.process_malfunction_report(id).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.errors, vec![format!("report {} not found", id)]);
    }

    #[tokio::test]
    async fn second_report_for_defective_station_is_rejected() {
        let service = service_with_station().await;
        let first = service
            .submit_malfunction_report("STATION-001", MalfunctionType::NotCharging, DESCRIPTION, None)
            .await
            .unwrap();
        let second = service
            .submit_malfunction_report("STATION-001", MalfunctionType::PhysicalDamage, DESCRIPTION, None)
            .await
            .unwrap();

        assert!(service.process_malfunction_report(first).await.unwrap().success);
        let result = service.process_malfunction_report(second).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.errors, vec![ERR_STATION_DEFECTIVE.to_string()]);
    }

    #[tokio::test]
    async fn reprocessing_is_refused_by_default() {
        let service = service_with_station().await;
        let id = service
            .submit_malfunction_report("STATION-001", MalfunctionType::NotCharging, DESCRIPTION, None)
            .await
            .unwrap();
        let ticket = service
            .process_malfunction_report(id)
            .await
            .unwrap()
            .ticket_id
            .unwrap();
        let before = load_report(&service, id).await;

        let again = service.process_malfunction_report(id).await.unwrap();
        assert!(!again.success);
        assert_eq!(again.errors, vec![format!("report {} already has ticket {}", id, ticket)]);

        let after = load_report(&service, id).await;
        assert_eq!(after, before);
        assert_eq!(after.status(), ReportStatus::TicketCreated);
    }

    #[tokio::test]
    async fn legacy_reprocessing_flips_report_to_invalid_keeping_ticket() {
        let service = service_with_station().await.with_policy(WorkflowPolicy {
            reject_reprocessing: false,
        });
        let id = service
            .submit_malfunction_report("STATION-001", MalfunctionType::NotCharging, DESCRIPTION, None)
            .await
            .unwrap();
        let ticket = service
            .process_malfunction_report(id)
            .await
            .unwrap()
            .ticket_id
            .unwrap();

        let again = service.process_malfunction_report(id).await.unwrap();
        assert!(!again.success);
        assert_eq!(again.errors, vec![ERR_STATION_DEFECTIVE.to_string()]);

        let report = load_report(&service, id).await;
        assert_eq!(report.status(), ReportStatus::Invalid);
        assert_eq!(report.ticket_id(), Some(ticket));
    }

    #[tokio::test]
    async fn resolve_restores_station_and_closes_report() {
        let service = service_with_station().await;
        let id = service
            .submit_malfunction_report("STATION-001", MalfunctionType::ConnectorIssue, DESCRIPTION, None)
            .await
            .unwrap();
        let ticket = service
            .process_malfunction_report(id)
            .await
            .unwrap()
            .ticket_id
            .unwrap();

        service
            .resolve_malfunction(ticket, Some("Replaced connector"))
            .await
            .unwrap();

        let report = load_report(&service, id).await;
        assert_eq!(report.status(), ReportStatus::Resolved);
        assert_eq!(report.ticket_id(), Some(ticket));
        assert_eq!(station_status(&service, "STATION-001").await, StationStatus::Available);
        assert!(service.get_open_reports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_unknown_ticket_is_not_found_and_mutates_nothing() {
        let service = service_with_station().await;
        let id = service
            .submit_malfunction_report("STATION-001", MalfunctionType::NotCharging, DESCRIPTION, None)
            .await
            .unwrap();
        service.process_malfunction_report(id).await.unwrap();
        let before = load_report(&service, id).await;

        let err = service
            .resolve_malfunction(TicketId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound { entity: "MalfunctionReport", field: "ticket_id", .. }
        ));

        assert_eq!(load_report(&service, id).await, before);
        assert_eq!(station_status(&service, "STATION-001").await, StationStatus::Defective);
    }

    #[tokio::test]
    async fn resolve_with_vanished_station_is_not_found() {
        let service = service_with_station().await;
        let ticket = TicketId::new();
        let mut report = MalfunctionReport::new(
            ReportId::new(),
            StationId::new("GONE").unwrap(),
            MalfunctionType::PhysicalDamage,
            ReportDescription::new(DESCRIPTION).unwrap(),
            None,
        );
        report.validate(true, true);
        report.create_ticket(ticket).unwrap();
        let report_id = report.report_id();
        service.repositories().reports().save(report).await.unwrap();

        let err = service.resolve_malfunction(ticket, None).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound { entity: "ChargingStation", ref value, .. } if value == "GONE"
        ));
        assert_eq!(
            load_report(&service, report_id).await.status(),
            ReportStatus::TicketCreated
        );
    }

    #[tokio::test]
    async fn lock_entries_are_released_after_each_call() {
        let service = service_with_station().await;
        for _ in 0..50 {
            let id = service
                .submit_malfunction_report("STATION-001", MalfunctionType::Other, DESCRIPTION, None)
                .await
                .unwrap();
            if let Some(ticket) = service.process_malfunction_report(id).await.unwrap().ticket_id {
                service.resolve_malfunction(ticket, None).await.unwrap();
            }
        }
        service.process_malfunction_report(ReportId::new()).await.unwrap();

        assert!(service.report_locks.is_empty());
        assert!(service.station_locks.is_empty());
    }

    #[tokio::test]
    async fn resolving_twice_fails_without_changes() {
        let service = service_with_station().await;
        let id = service
            .submit_malfunction_report("STATION-001", MalfunctionType::NotCharging, DESCRIPTION, None)
            .await
            .unwrap();
        let ticket = service
            .process_malfunction_report(id)
            .await
            .unwrap()
            .ticket_id
            .unwrap();
        service.resolve_malfunction(ticket, None).await.unwrap();

        let err = service.resolve_malfunction(ticket, None).await.unwrap_err();
        assert!(matches!(err, DomainError::NotDefective(_)));
        assert_eq!(load_report(&service, id).await.status(), ReportStatus::Resolved);
    }

    #[tokio::test]
    async fn workflow_publishes_events() {
        let bus = create_event_bus();
        let mut subscriber = bus.subscribe();
        let service = service_with_station().await.with_event_bus(bus);

        let id = service
            .submit_malfunction_report("STATION-001", MalfunctionType::NotCharging, DESCRIPTION, None)
            .await
            .unwrap();
        let ticket = service
            .process_malfunction_report(id)
            .await
            .unwrap()
            .ticket_id
            .unwrap();
        service
            .resolve_malfunction(ticket, Some("Reset the controller"))
            .await
            .unwrap();

        let mut types = Vec::new();
        let mut notes = None;
        for msg in subscriber.drain() {
            if let Event::MalfunctionResolved(e) = &msg.event {
                notes = e.operator_notes.clone();
            }
            types.push(msg.event.event_type());
        }

        assert_eq!(
            types,
            vec![
                "report_submitted",
                "ticket_created",
                "station_status_changed",
                "malfunction_resolved",
                "station_status_changed",
            ]
        );
        assert_eq!(notes.as_deref(), Some("Reset the controller"));
    }

    #[tokio::test]
    async fn queries_filter_by_station_and_status() {
        let service = service_with_station().await;
        let a = service
            .submit_malfunction_report("STATION-001", MalfunctionType::NotCharging, DESCRIPTION, None)
            .await
            .unwrap();
        service
            .submit_malfunction_report("STATION-002", MalfunctionType::Other, DESCRIPTION, None)
            .await
            .unwrap();
        let ticket = service
            .process_malfunction_report(a)
            .await
            .unwrap()
            .ticket_id
            .unwrap();
        service.resolve_malfunction(ticket, None).await.unwrap();

        assert_eq!(service.get_all_reports().await.unwrap().len(), 2);
        let for_station = service.get_reports_for_station("STATION-001").await.unwrap();
        assert_eq!(for_station.len(), 1);
        assert_eq!(for_station[0].report_id(), a);

        let open = service.get_open_reports().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].station_id().as_str(), "STATION-002");

        assert!(service.get_reports_for_station("").await.is_err());
    }

    #[tokio::test]
    async fn network_overview_counts() {
        let empty = MalfunctionReportService::new(Arc::new(InMemoryRepositoryProvider::new()));
        let overview = empty.network_overview().await.unwrap();
        assert_eq!(overview.total_stations, 0);
        assert_eq!(overview.health_percentage, 100.0);

        let service = service_with_station().await;
        service
            .repositories()
            .stations()
            .save(ChargingStation::new(
                StationId::new("STATION-002").unwrap(),
                "Second",
                "10117",
            ))
            .await
            .unwrap();
        let id = service
            .submit_malfunction_report("STATION-001", MalfunctionType::NotCharging, DESCRIPTION, None)
            .await
            .unwrap();
        service.process_malfunction_report(id).await.unwrap();

        let overview = service.network_overview().await.unwrap();
        assert_eq!(overview.total_stations, 2);
        assert_eq!(overview.defective_stations, 1);
        assert_eq!(overview.open_reports, 1);
        assert_eq!(overview.health_percentage, 50.0);
    }

    #[tokio::test]
    async fn list_stations_by_postal_code() {
        let service = service_with_station().await;
        let code = PostalCode::new("10115").unwrap();
        assert_eq!(service.list_stations(Some(&code)).await.unwrap().len(), 1);
        let other = PostalCode::new("12345").unwrap();
        assert!(service.list_stations(Some(&other)).await.unwrap().is_empty());
        assert_eq!(service.list_stations(None).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_processing_opens_one_ticket_per_station() {
        let service = Arc::new(service_with_station().await);

        let mut ids = Vec::new();
        for _ in 0..8 {
            ids.push(
                service
                    .submit_malfunction_report(
                        "STATION-001",
                        MalfunctionType::NotCharging,
                        DESCRIPTION,
                        None,
                    )
                    .await
                    .unwrap(),
            );
        }
        // Process the first report twice as well.
        ids.push(ids[0]);

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let service = service.clone();
                tokio::spawn(async move { service.process_malfunction_report(id).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().success {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        let ticketed = service
            .get_all_reports()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.status() == ReportStatus::TicketCreated)
            .count();
        assert_eq!(ticketed, 1);
    }
}
