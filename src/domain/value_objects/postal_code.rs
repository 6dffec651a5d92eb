//! German postal code

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Five ASCII digits.
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let value = value.as_ref().trim();

        if value.chars().count() != 5 {
            return Err(DomainError::validation(format!(
                "Postal code must be 5 digits, got {}",
                value.chars().count()
            )));
        }
        if !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "Postal code must contain only digits: {}",
                value
            )));
        }

        Ok(Self(value.to_string()))
    }

    /// Berlin postal codes all start with `1`.
    pub fn berlin(value: impl AsRef<str>) -> DomainResult<Self> {
        let code = Self::new(value)?;
        if !code.is_berlin() {
            return Err(DomainError::validation(format!(
                "Not a valid Berlin postal code: {}",
                code
            )));
        }
        Ok(code)
    }

    pub fn is_berlin(&self) -> bool {
        self.0.starts_with('1')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PostalCode> for String {
    fn from(p: PostalCode) -> Self {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert_eq!(PostalCode::new("10178").unwrap().as_str(), "10178");
        assert!(PostalCode::berlin("14199").is_ok());
        assert!(PostalCode::new("80331").is_ok());
    }

    #[test]
    fn wrong_length() {
        let err = PostalCode::new("1017").unwrap_err();
        assert!(err.to_string().contains("got 4"));
        assert!(PostalCode::new("101788").is_err());
    }

    #[test]
    fn non_digits() {
        let err = PostalCode::new("10a78").unwrap_err();
        assert!(err.to_string().contains("only digits"));
    }

    #[test]
    fn berlin_requires_leading_one() {
        let err = PostalCode::berlin("80331").unwrap_err();
        assert!(err.to_string().contains("Berlin"));
        assert!(!PostalCode::new("80331").unwrap().is_berlin());
    }
}
