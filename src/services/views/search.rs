use reqwest::Method;

use crate::{
    api::RequestBody,
    error::{AppError, AppResult, Notice},
    models::{SearchFacet, SearchRequest, TitleSummary},
    routes::{SearchPrefill, ViewLifetime},
    services::ReferenceData,
};

use super::{ListState, TitleListView, ViewContext, ViewModel};

pub const INVALID_QUERY: &str = "Invalid input, please try again.";
pub const SEARCH_FAILED: &str = "Failed to fetch search results. Please try again later.";

/// Faceted title search
pub struct SearchView {
    ctx: ViewContext,
    reference: ReferenceData,
    request: SearchRequest,
    state: ListState,
}

impl SearchView {
    pub fn new(ctx: ViewContext) -> Self {
        let reference = ReferenceData::new(ctx.api.clone());
        Self {
            ctx,
            reference,
            request: SearchRequest::new(SearchFacet::Title, ""),
            state: ListState::default(),
        }
    }

    /// Starts from a facet link such as `/search?genres=Drama`
    pub fn with_prefill(ctx: ViewContext, prefill: &SearchPrefill) -> Self {
        let mut view = Self::new(ctx);
        view.request = prefill.request();
        view
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn set_request(&mut self, request: SearchRequest) {
        self.request = request;
    }

    /// Runs the current search; short queries fail locally without a request
    pub async fn search(&mut self, lifetime: &ViewLifetime) -> AppResult<()> {
        if !self.request.is_valid() {
            self.state.reset(Some(Notice::error(INVALID_QUERY)));
            return Err(AppError::Validation(INVALID_QUERY.to_string()));
        }

        let api = self.ctx.api.clone();
        let body = self.request.body();
        let result = self
            .ctx
            .run_query(lifetime, async move {
                api.execute_json::<Vec<TitleSummary>>(
                    Method::POST,
                    "/search",
                    Some(RequestBody::Json(body)),
                )
                .await
            })
            .await;

        if let Ok(titles) = &result {
            tracing::info!(
                facet = %self.request.facet,
                query = %self.request.query,
                results = titles.len(),
                "Search completed"
            );
        }
        self.state.apply(result, SEARCH_FAILED)
    }

    /// Suggestions for a facet; an unavailable list degrades to no suggestions
    pub async fn options(&self, facet: SearchFacet) -> Vec<String> {
        let result = self.reference.options_for(facet).await;
        self.ctx.session.check(result).unwrap_or_else(|e| {
            tracing::warn!(facet = %facet, error = %e, "Could not load search suggestions");
            Vec::new()
        })
    }
}

#[async_trait::async_trait]
impl TitleListView for SearchView {
    fn context(&self) -> &ViewContext {
        &self.ctx
    }

    async fn load(&mut self, lifetime: &ViewLifetime) -> AppResult<()> {
        self.search(lifetime).await
    }

    fn render(&self) -> ViewModel {
        self.state.render(&self.ctx.ratings)
    }
}
