//! Workflow events
//!
//! Published by the malfunction workflow for operator front ends and audit logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MalfunctionType, ReportId, StationId, StationStatus, TicketId};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A user filed a report
    ReportSubmitted(ReportSubmittedEvent),
    /// Processing rejected a report on business rules
    ReportRejected(ReportRejectedEvent),
    /// A report passed validation and a ticket was opened
    TicketCreated(TicketCreatedEvent),
    /// An operator closed out a ticket
    MalfunctionResolved(MalfunctionResolvedEvent),
    /// Station moved between statuses
    StationStatusChanged(StationStatusChangedEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ReportSubmitted(_) => "report_submitted",
            Event::ReportRejected(_) => "report_rejected",
            Event::TicketCreated(_) => "ticket_created",
            Event::MalfunctionResolved(_) => "malfunction_resolved",
            Event::StationStatusChanged(_) => "station_status_changed",
        }
    }

    /// Get the station the event concerns
    pub fn station_id(&self) -> &StationId {
        match self {
            Event::ReportSubmitted(e) => &e.station_id,
            Event::ReportRejected(e) => &e.station_id,
            Event::TicketCreated(e) => &e.station_id,
            Event::MalfunctionResolved(e) => &e.station_id,
            Event::StationStatusChanged(e) => &e.station_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmittedEvent {
    pub report_id: ReportId,
    pub station_id: StationId,
    pub malfunction_type: MalfunctionType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRejectedEvent {
    pub report_id: ReportId,
    pub station_id: StationId,
    pub reasons: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCreatedEvent {
    pub report_id: ReportId,
    pub ticket_id: TicketId,
    pub station_id: StationId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalfunctionResolvedEvent {
    pub report_id: ReportId,
    pub ticket_id: TicketId,
    pub station_id: StationId,
    /// Free text from the operator, only kept on the event
    pub operator_notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationStatusChangedEvent {
    pub station_id: StationId,
    pub old_status: StationStatus,
    pub new_status: StationStatus,
    pub timestamp: DateTime<Utc>,
}

/// Event with metadata for transmission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    /// Unique message ID
    pub id: String,
    /// Event payload
    #[serde(flatten)]
    pub event: Event,
    /// Server timestamp
    pub server_time: DateTime<Utc>,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event,
            server_time: Utc::now(),
        }
    }
}
