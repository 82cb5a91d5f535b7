use reqwest::Method;

use crate::{
    error::{AppError, AppResult, Notice},
    models::TitleSummary,
    routes::ViewLifetime,
};

use super::{ListState, TitleListView, ViewContext, ViewModel};

pub const NO_RECOMMENDATIONS: &str = "No recommendations available! Try rating a few titles.";
pub const RECOMMENDATIONS_FAILED: &str = "Failed to fetch recommendations. Please try again later.";
pub const REFRESH_FAILED: &str = "Failed to refresh recommendations.";

/// Personalized recommendations
pub struct RecommendationsView {
    ctx: ViewContext,
    state: ListState,
}

impl RecommendationsView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            state: ListState::default(),
        }
    }

    /// Retrains the recommender on the service, then reloads the list
    pub async fn refresh(&mut self, lifetime: &ViewLifetime) -> AppResult<()> {
        let retrain = self
            .ctx
            .api
            .send(Method::POST, "/retrain-recommender", None)
            .await;

        if let Err(e) = self.ctx.session.check(retrain) {
            if lifetime.is_active() {
                self.state.reset(Some(Notice::error(REFRESH_FAILED)));
            }
            return Err(e);
        }

        tracing::info!("Recommender retrained");
        self.load(lifetime).await
    }
}

#[async_trait::async_trait]
impl TitleListView for RecommendationsView {
    fn context(&self) -> &ViewContext {
        &self.ctx
    }

    async fn load(&mut self, lifetime: &ViewLifetime) -> AppResult<()> {
        let api = self.ctx.api.clone();
        let result = self
            .ctx
            .run_query(lifetime, async move {
                api.get_json::<Vec<TitleSummary>>("/recommendations").await
            })
            .await;

        match result {
            // No ratings yet: informational, and no table
            Err(AppError::NotFound(detail)) => {
                tracing::info!(detail = %detail, "No recommendations yet");
                self.state.reset(Some(Notice::info(NO_RECOMMENDATIONS)));
                Ok(())
            }
            other => self.state.apply(other, RECOMMENDATIONS_FAILED),
        }
    }

    fn render(&self) -> ViewModel {
        self.state.render(&self.ctx.ratings)
    }
}
