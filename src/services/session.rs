use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Method;

use crate::{
    api::{ApiClient, RequestBody},
    error::{AppError, AppResult},
    models::{AccountUpdate, RegisterRequest, TokenResponse, UserProfile},
    services::RatingStore,
    storage::{Credential, CredentialStore},
};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const CURRENT_PASSWORD_REQUIRED: &str = "Current password is required to make changes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Owns login, registration and logout, and the credential they produce.
///
/// Clones share the same phase, credential store and rating store.
#[derive(Clone)]
pub struct SessionController {
    api: ApiClient,
    credentials: Arc<dyn CredentialStore>,
    ratings: RatingStore,
    phase: Arc<RwLock<SessionPhase>>,
}

impl SessionController {
    /// Restores an authenticated session when a credential survived from an earlier run
    pub fn new(api: ApiClient, ratings: RatingStore) -> Self {
        let credentials = Arc::clone(api.credentials());
        let phase = if credentials.get().is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };

        tracing::debug!(phase = ?phase, "Session restored");

        Self {
            api,
            credentials,
            ratings,
            phase: Arc::new(RwLock::new(phase)),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated && self.credentials.get().is_some()
    }

    fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Exchanges username and password for a credential.
    ///
    /// A second login while one is in flight is rejected rather than raced.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<()> {
        {
            let mut phase = self.phase.write().unwrap_or_else(PoisonError::into_inner);
            if *phase == SessionPhase::Authenticating {
                return Err(AppError::InFlight("login".to_string()));
            }
            *phase = SessionPhase::Authenticating;
        }

        match self.exchange_credentials(username, password).await {
            Ok(credential) => {
                if let Err(e) = self.credentials.set(credential) {
                    self.set_phase(SessionPhase::Anonymous);
                    return Err(e);
                }
                // A previous user's per-title state must not leak into this session
                self.ratings.clear();
                self.set_phase(SessionPhase::Authenticated);
                tracing::info!(username = %username, "Logged in");
                Ok(())
            }
            Err(e) => {
                // Anonymous means no credential and no cached ratings
                if let Err(clear_err) = self.logout() {
                    tracing::error!(error = %clear_err, "Failed to clear credential after failed login");
                }
                tracing::info!(username = %username, error = %e, "Login failed");
                Err(e.with_default_message(LOGIN_FAILED))
            }
        }
    }

    async fn exchange_credentials(&self, username: &str, password: &str) -> AppResult<Credential> {
        let form = vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        let token: TokenResponse = self
            .api
            .execute_json(Method::POST, "/token", Some(RequestBody::Form(form)))
            .await?;
        Credential::new(token.access_token)
    }

    /// Creates an account; the caller still has to log in afterwards
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<()> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let result = self.api.send_body(Method::POST, "/register", &request).await;

        match result {
            Ok(_) => {
                tracing::info!(username = %username, "Registered account");
                Ok(())
            }
            Err(e) => Err(e.with_default_message(REGISTRATION_FAILED)),
        }
    }

    /// Clears the credential and every cached rating and prediction; idempotent
    pub fn logout(&self) -> AppResult<()> {
        let mut phase = self.phase.write().unwrap_or_else(PoisonError::into_inner);
        self.ratings.clear();
        let cleared = self.credentials.clear();
        *phase = SessionPhase::Anonymous;
        tracing::info!("Logged out");
        cleared
    }

    /// Passes a result through, forcing logout when it carries `Unauthorized`
    pub fn check<T>(&self, result: AppResult<T>) -> AppResult<T> {
        if let Err(e) = &result {
            if e.is_unauthorized() && self.credentials.get().is_some() {
                tracing::warn!("Credential rejected by service, ending session");
                if let Err(clear_err) = self.logout() {
                    tracing::error!(error = %clear_err, "Failed to clear rejected credential");
                }
            }
        }
        result
    }

    pub async fn current_user(&self) -> AppResult<UserProfile> {
        let result = self.api.get_json("/me").await;
        self.check(result)
    }

    /// Updates username, email or password; the current password is required
    pub async fn update_account(&self, update: &AccountUpdate) -> AppResult<()> {
        if update.current_password.is_empty() {
            return Err(AppError::Validation(CURRENT_PASSWORD_REQUIRED.to_string()));
        }

        let result = self.api.send_body(Method::PUT, "/me", update).await;
        self.check(result)?;

        tracing::info!(
            username_changed = update.username.is_some(),
            email_changed = update.email.is_some(),
            password_changed = update.password.is_some(),
            "Account updated"
        );
        Ok(())
    }
}
