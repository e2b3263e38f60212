//! Passenger login, sign-up and logout

use std::sync::Arc;

use domain::{EmailAddress, GeoLocation, SessionUser};
use tracing::{info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{AccountPort, NewAccount};
use crate::session::SessionContext;

/// Minimum password length accepted at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Raw sign-up form input
#[derive(Clone, Default)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpForm")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SignUpForm {
    /// Check the form and build the account request
    ///
    /// Checks run in order and the first failure is reported: every field
    /// filled, passwords equal, password long enough, email well formed.
    /// Accounts created without a known position are registered at (0, 0).
    pub fn validate(&self, location: Option<GeoLocation>) -> Result<NewAccount, ApplicationError> {
        let fields = [
            &self.full_name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(invalid("Veuillez remplir tous les champs"));
        }
        if self.password != self.confirm_password {
            return Err(invalid("Les mots de passe ne correspondent pas"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(invalid(
                "Le mot de passe doit contenir au moins 6 caractères",
            ));
        }
        let email = EmailAddress::new(&self.email)
            .map_err(|_| invalid("Veuillez entrer une adresse email valide"))?;

        Ok(NewAccount {
            name: self.full_name.trim().to_string(),
            email,
            password: self.password.clone(),
            location: location.unwrap_or_else(|| GeoLocation::new_unchecked(0.0, 0.0)),
        })
    }
}

fn invalid(message: &str) -> ApplicationError {
    ApplicationError::InvalidInput(message.to_string())
}

/// Account use cases, bound to the shared session
pub struct AccountService {
    accounts: Arc<dyn AccountPort>,
    session: SessionContext,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("signed_in", &self.session.is_signed_in())
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountPort>, session: SessionContext) -> Self {
        Self { accounts, session }
    }

    /// Check credentials and start a session
    ///
    /// The email is sent exactly as typed; only blank fields are rejected
    /// locally.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for blank fields, `NotFound` for unknown credentials,
    /// `ExternalService` when the backend is unreachable.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApplicationError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(invalid("Veuillez remplir tous les champs"));
        }

        let user = match self.accounts.login(email, password).await {
            Ok(user) => user,
            Err(ApplicationError::NotFound(_)) => {
                warn!("Login rejected");
                return Err(ApplicationError::NotFound(
                    "Utilisateur non trouvé".to_string(),
                ));
            },
            Err(e) => return Err(e),
        };

        self.session.sign_in(user.clone());
        Ok(user)
    }

    /// Validate the form and create the account
    ///
    /// The new user is not signed in; they log in afterwards.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_up(
        &self,
        form: &SignUpForm,
        location: Option<GeoLocation>,
    ) -> Result<(), ApplicationError> {
        let account = form.validate(location)?;
        self.accounts.register(&account).await?;
        info!("Account created");
        Ok(())
    }

    /// End the session
    pub fn logout(&self) {
        self.session.sign_out();
    }

    /// The shared session
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use domain::UserId;

    use super::*;
    use crate::ports::MockAccountPort;

    fn form() -> SignUpForm {
        SignUpForm {
            full_name: "Rasoa Be".to_string(),
            email: "rasoa@betax.mg".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    fn message(err: &ApplicationError) -> String {
        match err {
            ApplicationError::InvalidInput(m) => m.clone(),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn valid_form_builds_account() {
        let account = form().validate(None).unwrap();
        assert_eq!(account.name, "Rasoa Be");
        assert_eq!(account.email.as_str(), "rasoa@betax.mg");
        assert_eq!(account.location, GeoLocation::new_unchecked(0.0, 0.0));
    }

    #[test]
    fn missing_field_is_reported_first() {
        let f = SignUpForm {
            full_name: " ".to_string(),
            confirm_password: "other".to_string(),
            ..form()
        };
        assert_eq!(message(&f.validate(None).unwrap_err()), "Veuillez remplir tous les champs");
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let f = SignUpForm {
            confirm_password: "secret2".to_string(),
            ..form()
        };
        assert_eq!(
            message(&f.validate(None).unwrap_err()),
            "Les mots de passe ne correspondent pas"
        );
    }

    #[test]
    fn short_password_is_rejected() {
        let f = SignUpForm {
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            ..form()
        };
        assert!(message(&f.validate(None).unwrap_err()).contains("6 caractères"));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let f = SignUpForm {
            email: "rasoa@betax".to_string(),
            ..form()
        };
        assert_eq!(
            message(&f.validate(None).unwrap_err()),
            "Veuillez entrer une adresse email valide"
        );
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", form());
        assert!(!debug.contains("secret1"));
    }

    #[tokio::test]
    async fn login_starts_session() {
        let mut accounts = MockAccountPort::new();
        accounts
            .expect_login()
            .withf(|email, password| email == "rasoa@betax.mg" && password == "secret1")
            .times(1)
            .returning(|email, _| Ok(SessionUser::new(UserId::new(9), "Rasoa", email)));

        let service = AccountService::new(Arc::new(accounts), SessionContext::new());
        let user = service.login("rasoa@betax.mg", "secret1").await.unwrap();

        assert_eq!(user.id, UserId::new(9));
        assert_eq!(service.session().current(), Some(user));

        service.logout();
        assert!(!service.session().is_signed_in());
    }

    #[tokio::test]
    async fn login_sends_email_as_typed() {
        let mut accounts = MockAccountPort::new();
        accounts
            .expect_login()
            .withf(|email, _| email == "Rasoa@Betax.MG")
            .times(1)
            .returning(|email, _| Ok(SessionUser::new(UserId::new(9), "Rasoa", email)));

        let service = AccountService::new(Arc::new(accounts), SessionContext::new());
        let user = service.login("Rasoa@Betax.MG", "secret1").await.unwrap();
        assert_eq!(user.email, "Rasoa@Betax.MG");
    }

    #[tokio::test]
    async fn login_leaves_email_format_to_backend() {
        let mut accounts = MockAccountPort::new();
        accounts
            .expect_login()
            .withf(|email, _| email == "rasoa@betax")
            .times(1)
            .returning(|_, _| Err(ApplicationError::NotFound("voyageur".into())));

        let service = AccountService::new(Arc::new(accounts), SessionContext::new());
        let err = service.login("rasoa@betax", "secret1").await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let mut accounts = MockAccountPort::new();
        accounts
            .expect_login()
            .returning(|_, _| Err(ApplicationError::NotFound("voyageur".into())));

        let service = AccountService::new(Arc::new(accounts), SessionContext::new());
        let err = service.login("ghost@betax.mg", "secret1").await.unwrap_err();

        assert_eq!(err.to_string(), "Not found: Utilisateur non trouvé");
        assert!(!service.session().is_signed_in());
    }

    #[tokio::test]
    async fn blank_login_never_reaches_backend() {
        let mut accounts = MockAccountPort::new();
        accounts.expect_login().times(0);

        let service = AccountService::new(Arc::new(accounts), SessionContext::new());
        assert!(service.login("", "secret1").await.is_err());
        assert!(service.login("rasoa@betax.mg", "").await.is_err());
    }

    #[tokio::test]
    async fn sign_up_registers_validated_account() {
        let mut accounts = MockAccountPort::new();
        accounts
            .expect_register()
            .withf(|a| a.name == "Rasoa Be" && a.password == "secret1")
            .times(1)
            .returning(|_| Ok(()));

        let service = AccountService::new(Arc::new(accounts), SessionContext::new());
        service.sign_up(&form(), None).await.unwrap();
        assert!(!service.session().is_signed_in());
    }

    #[tokio::test]
    async fn invalid_sign_up_never_reaches_backend() {
        let mut accounts = MockAccountPort::new();
        accounts.expect_register().times(0);

        let service = AccountService::new(Arc::new(accounts), SessionContext::new());
        let bad = SignUpForm {
            confirm_password: "nope".to_string(),
            ..form()
        };
        assert!(service.sign_up(&bad, None).await.is_err());
    }
}
