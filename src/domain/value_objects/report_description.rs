//! Free-text malfunction description

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

pub const DESCRIPTION_MIN_LEN: usize = 10;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Trimmed report description, 10 to 500 characters inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportDescription(String);

impl ReportDescription {
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = value.as_ref().trim();
        let len = trimmed.chars().count();

        if len == 0 {
            return Err(DomainError::validation("Description cannot be empty"));
        }
        if len < DESCRIPTION_MIN_LEN {
            return Err(DomainError::validation(format!(
                "Description too short (minimum {} characters)",
                DESCRIPTION_MIN_LEN
            )));
        }
        if len > DESCRIPTION_MAX_LEN {
            return Err(DomainError::validation(format!(
                "Description too long (maximum {} characters)",
                DESCRIPTION_MAX_LEN
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ReportDescription {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReportDescription> for String {
    fn from(d: ReportDescription) -> Self {
        d.0
    }
}
