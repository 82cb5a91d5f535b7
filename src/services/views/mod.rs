//! Per-screen query controllers.
//!
//! Each view keeps only the title list it fetched. Ratings and predictions are
//! looked up from the shared [`RatingStore`] on every render, so a change made
//! through one view shows up in every other view without a re-fetch.
use std::future::Future;

use crate::{
    api::ApiClient,
    error::{AppError, AppResult, Notice},
    models::{AnnotatedTitle, PredictionEntry, TitleId, TitleSummary, UserRatingEntry},
    routes::ViewLifetime,
    services::{RatingStore, SessionController},
};

pub mod account;
pub mod recommendations;
pub mod search;
pub mod trending;

pub use account::AccountView;
pub use recommendations::RecommendationsView;
pub use search::SearchView;
pub use trending::TrendingView;

/// What a view hands to presentation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    pub rows: Vec<AnnotatedTitle>,
    pub notice: Option<Notice>,
}

impl ViewModel {
    /// Whether there is anything to show as a table
    pub fn has_table(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn row(&self, title_id: TitleId) -> Option<&AnnotatedTitle> {
        self.rows.iter().find(|row| row.id() == title_id)
    }
}

/// Collaborators shared by every view
#[derive(Clone)]
pub struct ViewContext {
    pub api: ApiClient,
    pub ratings: RatingStore,
    pub session: SessionController,
}

impl ViewContext {
    pub fn new(api: ApiClient, ratings: RatingStore, session: SessionController) -> Self {
        Self {
            api,
            ratings,
            session,
        }
    }

    /// Runs a view query for an active view.
    ///
    /// The user's ratings are loaded first so the result can be annotated. A
    /// result that arrives after the view was left is discarded as `Cancelled`.
    pub async fn run_query<T, F>(&self, lifetime: &ViewLifetime, query: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        lifetime.ensure_active()?;

        if let Err(e) = self.session.check(self.ratings.ensure_loaded().await) {
            if e.is_unauthorized() {
                return Err(e);
            }
            tracing::warn!(error = %e, "Could not load user ratings, rendering unrated");
        }

        self.run_unhydrated(lifetime, query).await
    }

    /// Like [`run_query`](Self::run_query) for queries that load the ratings themselves
    pub async fn run_unhydrated<T, F>(&self, lifetime: &ViewLifetime, query: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        lifetime.ensure_active()?;

        let result = self.session.check(query.await);
        if !lifetime.is_active() {
            tracing::debug!("Discarding response for a view that was left");
            return Err(AppError::Cancelled);
        }
        result
    }

    pub async fn rate(&self, title_id: TitleId, value: f64) -> AppResult<UserRatingEntry> {
        self.session
            .check(self.ratings.record_rating(title_id, value).await)
    }

    pub async fn predict(&self, title_id: TitleId) -> AppResult<Option<PredictionEntry>> {
        self.session
            .check(self.ratings.request_prediction(title_id).await)
    }

    pub async fn edit_rating(&self, title_id: TitleId, value: f64) -> AppResult<UserRatingEntry> {
        self.session
            .check(self.ratings.update_rating(title_id, value).await)
    }

    pub async fn delete_rating(&self, title_id: TitleId) -> AppResult<()> {
        self.session.check(self.ratings.delete_rating(title_id).await)
    }
}

/// Title list and notice a list view keeps between renders
#[derive(Debug, Default)]
pub(crate) struct ListState {
    titles: Vec<TitleSummary>,
    notice: Option<Notice>,
}

impl ListState {
    /// Stores a query result; failures keep the previous rows and set a notice
    pub(crate) fn apply(&mut self, result: AppResult<Vec<TitleSummary>>, failure: &str) -> AppResult<()> {
        match result {
            Ok(titles) => {
                self.titles = titles;
                self.notice = None;
                Ok(())
            }
            Err(AppError::Cancelled) => Err(AppError::Cancelled),
            Err(e) => {
                self.notice = Some(e.notice(failure));
                Err(e)
            }
        }
    }

    pub(crate) fn reset(&mut self, notice: Option<Notice>) {
        self.titles.clear();
        self.notice = notice;
    }

    pub(crate) fn render(&self, ratings: &RatingStore) -> ViewModel {
        ViewModel {
            rows: ratings.annotate(&self.titles),
            notice: self.notice.clone(),
        }
    }
}

/// A screen that fetches a title list and renders it against the rating store
#[async_trait::async_trait]
pub trait TitleListView: Send + Sync {
    fn context(&self) -> &ViewContext;

    /// Fetches the view's title list; a no-op error once `lifetime` has ended
    async fn load(&mut self, lifetime: &ViewLifetime) -> AppResult<()>;

    /// Annotated rows and the current notice
    fn render(&self) -> ViewModel;

    async fn rate(&self, title_id: TitleId, value: f64) -> AppResult<UserRatingEntry> {
        self.context().rate(title_id, value).await
    }

    async fn predict(&self, title_id: TitleId) -> AppResult<Option<PredictionEntry>> {
        self.context().predict(title_id).await
    }
}
