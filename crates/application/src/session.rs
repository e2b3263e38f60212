//! Session context carrying the signed-in identity
//!
//! The context is created once per process and handed to every service that
//! needs to know who is using the app. Login fills it, logout clears it.
//! Clones share the same slot.
//!
//! # Examples
//!
//! ```
//! use application::SessionContext;
//! use domain::{SessionUser, UserId};
//!
//! let session = SessionContext::new();
//! assert!(session.current().is_none());
//!
//! session.sign_in(SessionUser::new(UserId::new(4), "Rasoa", "rasoa@betax.mg"));
//! assert_eq!(session.require().unwrap().id, UserId::new(4));
//!
//! session.sign_out();
//! assert!(session.require().is_err());
//! ```

use std::sync::Arc;

use domain::SessionUser;
use parking_lot::RwLock;
use tracing::info;

use crate::error::ApplicationError;

/// Shared handle to the current session user
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Arc<RwLock<Option<SessionUser>>>,
}

impl SessionContext {
    /// Create an empty (signed-out) context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the user returned by a successful login
    pub fn sign_in(&self, user: SessionUser) {
        info!(user_id = %user.id, "Session started");
        *self.user.write() = Some(user);
    }

    /// Forget the current user
    pub fn sign_out(&self) {
        if let Some(user) = self.user.write().take() {
            info!(user_id = %user.id, "Session ended");
        }
    }

    /// The current user, if any
    #[must_use]
    pub fn current(&self) -> Option<SessionUser> {
        self.user.read().clone()
    }

    /// The current user, or `NotAuthorized` when signed out
    pub fn require(&self) -> Result<SessionUser, ApplicationError> {
        self.current()
            .ok_or_else(|| ApplicationError::NotAuthorized("no user is signed in".to_string()))
    }

    /// Whether someone is signed in
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use domain::UserId;

    use super::*;

    #[test]
    fn clones_share_the_same_session() {
        let session = SessionContext::new();
        let other = session.clone();
        session.sign_in(SessionUser::new(UserId::new(1), "Rakoto", "rakoto@betax.mg"));
        assert!(other.is_signed_in());
        other.sign_out();
        assert!(!session.is_signed_in());
    }

    #[test]
    fn require_fails_when_signed_out() {
        let err = SessionContext::new().require().unwrap_err();
        assert!(matches!(err, ApplicationError::NotAuthorized(_)));
    }

    #[test]
    fn sign_out_when_empty_is_a_no_op() {
        let session = SessionContext::new();
        session.sign_out();
        assert!(session.current().is_none());
    }
}
