use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    storage::CredentialStore,
};

use super::Route;

/// Active period of one view activation.
///
/// Ending it marks every response still in flight for that view as stale.
#[derive(Debug, Clone, Default)]
pub struct ViewLifetime {
    token: CancellationToken,
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn end(&self) {
        self.token.cancel();
    }

    /// Errors with `Cancelled` once the view has been left
    pub fn ensure_active(&self) -> AppResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(AppError::Cancelled)
        }
    }

    /// Resolves when the view is left
    pub async fn ended(&self) {
        self.token.cancelled().await
    }
}

/// Outcome of a guarded navigation
#[derive(Debug, Clone)]
pub enum Admission {
    Admitted(ViewLifetime),
    Redirect(Route),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted(_))
    }
}

/// Decides once per activation whether a view may be entered
#[derive(Clone)]
pub struct RouteGuard {
    credentials: Arc<dyn CredentialStore>,
}

impl RouteGuard {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    pub fn admit(&self, route: &Route) -> Admission {
        if route.requires_session() && self.credentials.get().is_none() {
            tracing::info!(route = %route, "No credential, redirecting to login");
            return Admission::Redirect(Route::Login);
        }
        Admission::Admitted(ViewLifetime::new())
    }
}
