//! Malfunction report domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ReportDescription, ReportId, StationId, TicketId};
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

pub const ERR_STATION_MISSING: &str = "station does not exist";
pub const ERR_STATION_DEFECTIVE: &str = "station already marked as defective";

/// Kind of problem a user can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalfunctionType {
    NotCharging,
    PaymentFailure,
    PaymentNotReflected,
    PhysicalDamage,
    DisplayMalfunction,
    ConnectorIssue,
    Other,
}

impl MalfunctionType {
    pub const ALL: [MalfunctionType; 7] = [
        Self::NotCharging,
        Self::PaymentFailure,
        Self::PaymentNotReflected,
        Self::PhysicalDamage,
        Self::DisplayMalfunction,
        Self::ConnectorIssue,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotCharging => "not_charging",
            Self::PaymentFailure => "payment_failure",
            Self::PaymentNotReflected => "payment_not_reflected",
            Self::PhysicalDamage => "physical_damage",
            Self::DisplayMalfunction => "display_malfunction",
            Self::ConnectorIssue => "connector_issue",
            Self::Other => "other",
        }
    }

    /// Human readable label, e.g. "Payment Not Reflected".
    pub fn label(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for MalfunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for MalfunctionType {
    type Err = DomainError;

    /// Accepts `payment_failure`, `payment-failure` or any casing of either.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| DomainError::Validation(format!("Unknown malfunction type: {}", s)))
    }
}

/// Lifecycle states of a malfunction report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Submitted,
    Validated,
    Invalid,
    TicketCreated,
    Resolved,
    /// Reserved, no workflow step reaches it yet
    Closed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Validated => "validated",
            Self::Invalid => "invalid",
            Self::TicketCreated => "ticket_created",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(Self::Submitted),
            "validated" => Some(Self::Validated),
            "invalid" => Some(Self::Invalid),
            "ticket_created" => Some(Self::TicketCreated),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Malfunction Report entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalfunctionReport {
    pub(crate) report_id: ReportId,
    pub(crate) station_id: StationId,
    pub(crate) malfunction_type: MalfunctionType,
    pub(crate) description: ReportDescription,
    pub(crate) reported_by: Option<String>,
    pub(crate) status: ReportStatus,
    pub(crate) ticket_id: Option<TicketId>,
    pub(crate) validation_errors: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl MalfunctionReport {
    pub fn new(
        report_id: ReportId,
        station_id: StationId,
        malfunction_type: MalfunctionType,
        description: ReportDescription,
        reported_by: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            report_id,
            station_id,
            malfunction_type,
            description,
            reported_by,
            status: ReportStatus::Submitted,
            ticket_id: None,
            validation_errors: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn report_id(&self) -> ReportId {
        self.report_id
    }

    pub fn station_id(&self) -> &StationId {
        &self.station_id
    }

    pub fn malfunction_type(&self) -> MalfunctionType {
        self.malfunction_type
    }

    pub fn description(&self) -> &ReportDescription {
        &self.description
    }

    pub fn reported_by(&self) -> Option<&str> {
        self.reported_by.as_deref()
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn ticket_id(&self) -> Option<TicketId> {
        self.ticket_id
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Still waiting for an operator (anything not resolved).
    pub fn is_open(&self) -> bool {
        self.status != ReportStatus::Resolved
    }

    /// Check the report against the live station state.
    ///
    /// Prior errors are discarded. Both rules are evaluated independently, so
    /// a missing station yields two errors.
    pub fn validate(&mut self, station_exists: bool, station_is_operational: bool) -> bool {
        self.validation_errors.clear();

        if !station_exists {
            self.validation_errors.push(ERR_STATION_MISSING.to_string());
        }
        if !station_is_operational {
            self.validation_errors.push(ERR_STATION_DEFECTIVE.to_string());
        }

        self.updated_at = Utc::now();

        if !self.validation_errors.is_empty() {
            self.status = ReportStatus::Invalid;
            return false;
        }

        self.status = ReportStatus::Validated;
        true
    }

    pub fn create_ticket(&mut self, ticket_id: TicketId) -> DomainResult<()> {
        if self.status != ReportStatus::Validated {
            return Err(DomainError::InvalidReportState {
                report_id: self.report_id.to_string(),
                status: self.status.to_string(),
            });
        }

        self.ticket_id = Some(ticket_id);
        self.status = ReportStatus::TicketCreated;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// The ticket id is kept after resolution.
    pub fn resolve(&mut self) -> DomainResult<()> {
        if self.ticket_id.is_none() {
            return Err(DomainError::NoTicket(self.report_id.to_string()));
        }

        self.status = ReportStatus::Resolved;
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
