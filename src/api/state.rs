use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    error::AppResult,
    routes::{Navigator, RouteGuard},
    services::{RatingStore, ReferenceData, SessionController, ViewContext},
    storage::{CredentialStore, FileCredentialStore},
};

use super::ApiClient;

/// Process-wide, session-scoped state shared by every view
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub ratings: RatingStore,
    pub session: SessionController,
    pub guard: RouteGuard,
    pub reference: ReferenceData,
}

impl AppState {
    /// Wires every component around one executor and its credential store
    pub fn new(api: ApiClient) -> Self {
        let ratings = RatingStore::new(api.clone());
        let session = SessionController::new(api.clone(), ratings.clone());
        let guard = RouteGuard::new(Arc::clone(api.credentials()));
        let reference = ReferenceData::new(api.clone());

        Self {
            api,
            ratings,
            session,
            guard,
            reference,
        }
    }

    /// Builds the state with the durable credential store named in `config`
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let credentials: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::open(config.credential_path())?);
        let api = ApiClient::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
            credentials,
        )?;
        Ok(Self::new(api))
    }

    pub fn view_context(&self) -> ViewContext {
        ViewContext::new(self.api.clone(), self.ratings.clone(), self.session.clone())
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::new(self.guard.clone())
    }
}
