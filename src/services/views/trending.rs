use crate::{error::AppResult, models::TitleSummary, routes::ViewLifetime};

use super::{ListState, TitleListView, ViewContext, ViewModel};

pub const TRENDING_FAILED: &str = "Failed to load top 10 movies. Please try again later.";

/// Most-voted titles
pub struct TrendingView {
    ctx: ViewContext,
    state: ListState,
}

impl TrendingView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            state: ListState::default(),
        }
    }
}

#[async_trait::async_trait]
impl TitleListView for TrendingView {
    fn context(&self) -> &ViewContext {
        &self.ctx
    }

    async fn load(&mut self, lifetime: &ViewLifetime) -> AppResult<()> {
        let api = self.ctx.api.clone();
        let result = self
            .ctx
            .run_query(lifetime, async move {
                api.get_json::<Vec<TitleSummary>>("/top10").await
            })
            .await;

        if let Ok(titles) = &result {
            tracing::info!(results = titles.len(), "Trending titles loaded");
        }
        self.state.apply(result, TRENDING_FAILED)
    }

    fn render(&self) -> ViewModel {
        self.state.render(&self.ctx.ratings)
    }
}
