//! Audit trail for workflow events
//!
//! Every event is logged under the `audit` target. With a file configured,
//! each event is also appended to it as one JSON line.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use super::event_bus::EventSubscriber;
use super::events::{Event, EventMessage};
use crate::shared::errors::InfraError;

#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    file: Option<PathBuf>,
}

impl AuditTrail {
    /// Log-only trail.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
        }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn record(&self, message: &EventMessage) -> Result<(), InfraError> {
        log_event(message);

        if let Some(path) = &self.file {
            let mut line = serde_json::to_string(message)?;
            line.push('\n');
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?
                .write_all(line.as_bytes())?;
        }
        Ok(())
    }

    /// Record everything queued on `subscriber`; returns the number recorded.
    pub fn record_pending(&self, subscriber: &mut EventSubscriber) -> Result<usize, InfraError> {
        let messages = subscriber.drain();
        for message in &messages {
            self.record(message)?;
        }
        Ok(messages.len())
    }
}

fn log_event(message: &EventMessage) {
    match &message.event {
        Event::MalfunctionResolved(e) => info!(
            target: "audit",
            event_id = %message.id,
            report_id = %e.report_id,
            ticket_id = %e.ticket_id,
            station_id = %e.station_id,
            operator_notes = e.operator_notes.as_deref().unwrap_or(""),
            "malfunction_resolved"
        ),
        Event::StationStatusChanged(e) => info!(
            target: "audit",
            event_id = %message.id,
            station_id = %e.station_id,
            old_status = e.old_status.as_str(),
            new_status = e.new_status.as_str(),
            "station_status_changed"
        ),
        Event::TicketCreated(e) => info!(
            target: "audit",
            event_id = %message.id,
            report_id = %e.report_id,
            ticket_id = %e.ticket_id,
            station_id = %e.station_id,
            "ticket_created"
        ),
        Event::ReportRejected(e) => info!(
            target: "audit",
            event_id = %message.id,
            report_id = %e.report_id,
            station_id = %e.station_id,
            reasons = ?e.reasons,
            "report_rejected"
        ),
        Event::ReportSubmitted(e) => info!(
            target: "audit",
            event_id = %message.id,
            report_id = %e.report_id,
            station_id = %e.station_id,
            malfunction_type = e.malfunction_type.as_str(),
            "report_submitted"
        ),
    }
}
