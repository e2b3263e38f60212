//! Timezone value object

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// A validated IANA timezone name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timezone(String);

impl Timezone {
    /// Create a timezone, checking the name against the IANA database
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` for unknown names.
    pub fn new(tz: impl Into<String>) -> Result<Self, DomainError> {
        let name = tz.into();
        Tz::from_str(&name).map_err(|_| DomainError::InvalidTimezone(name.clone()))?;
        Ok(Self(name))
    }

    /// Get the timezone string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to a `chrono_tz` zone
    #[must_use]
    pub fn tz(&self) -> Tz {
        Tz::from_str(&self.0).unwrap_or(Tz::UTC)
    }

    /// Madagascar (EAT, UTC+3, no DST)
    #[must_use]
    pub fn antananarivo() -> Self {
        Self("Indian/Antananarivo".to_string())
    }

    /// UTC timezone
    #[must_use]
    pub fn utc() -> Self {
        Self("UTC".to_string())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::antananarivo()
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Timezone {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Timezone> for String {
    fn from(tz: Timezone) -> Self {
        tz.0
    }
}
