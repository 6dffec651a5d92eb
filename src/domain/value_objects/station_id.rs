//! Charging station identifier

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Maximum length of a station identifier, in characters.
pub const STATION_ID_MAX_LEN: usize = 50;

/// Validated charging station identifier.
///
/// The raw value is kept as given: it must contain at least one
/// non-whitespace character and be at most 50 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(DomainError::validation("Station ID cannot be empty"));
        }
        if value.chars().count() > STATION_ID_MAX_LEN {
            return Err(DomainError::validation(format!(
                "Station ID too long (max {} characters)",
                STATION_ID_MAX_LEN
            )));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl AsRef<str> for StationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
