//! Signed-in account entity

use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// The account currently using the app, as returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Backend identifier, also used as the driver identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
}

impl SessionUser {
    /// Create a session user
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Greeting line shown on the driver panel
    #[must_use]
    pub fn greeting(&self) -> String {
        format!("Bonjour, {}", self.name)
    }
}
