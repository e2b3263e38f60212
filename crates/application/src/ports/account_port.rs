//! Account port
//!
//! Passenger login and registration.

use async_trait::async_trait;
use domain::{EmailAddress, GeoLocation, SessionUser};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// A validated registration request
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// Full name
    pub name: String,
    /// Login email
    pub email: EmailAddress,
    /// Plain password, sent as-is to the backend
    pub password: String,
    /// Where the account was created
    pub location: GeoLocation,
}

/// Port for account operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountPort: Send + Sync {
    /// Check credentials; `ApplicationError::NotFound` for unknown users
    ///
    /// `email` is passed through as typed by the user.
    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApplicationError>;

    /// Create a passenger account
    async fn register(&self, account: &NewAccount) -> Result<(), ApplicationError>;
}
