//! Backend identifier value objects

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a passenger or driver account, as assigned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a backend identifier
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a bus, as assigned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(i64);

impl BusId {
    /// Wrap a backend identifier
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BusId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
