//! Charging station domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::StationId;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Operational status of a charging station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    /// Free to use
    #[default]
    Available,
    /// Currently charging a vehicle
    InUse,
    /// Reported broken, waiting for an operator
    Defective,
    /// Taken out of service by the operator
    Maintenance,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InUse => "in_use",
            Self::Defective => "defective",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "in_use" => Some(Self::InUse),
            "defective" => Some(Self::Defective),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Available | Self::InUse)
    }
}

impl std::fmt::Display for StationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Charging Station entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStation {
    pub(crate) station_id: StationId,
    pub(crate) name: String,
    pub(crate) postal_code: String,
    pub(crate) address: Option<String>,
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
    pub(crate) status: StationStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl ChargingStation {
    /// New stations always start out `Available`.
    pub fn new(
        station_id: StationId,
        name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            station_id,
            name: name.into(),
            postal_code: postal_code.into(),
            address: None,
            latitude: None,
            longitude: None,
            status: StationStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn station_id(&self) -> &StationId {
        &self.station_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn status(&self) -> StationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Available or in use.
    pub fn is_operational(&self) -> bool {
        self.status.is_operational()
    }

    /// Take the station out of service after a validated malfunction report.
    pub fn mark_as_defective(&mut self) -> DomainResult<()> {
        if self.status == StationStatus::Defective {
            return Err(DomainError::AlreadyDefective(self.station_id.to_string()));
        }

        self.status = StationStatus::Defective;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Restore a repaired station. Only defective stations can be restored.
    pub fn mark_as_available(&mut self) -> DomainResult<()> {
        if self.status != StationStatus::Defective {
            return Err(DomainError::NotDefective(self.station_id.to_string()));
        }

        self.status = StationStatus::Available;
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
