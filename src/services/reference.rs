use crate::{api::ApiClient, error::AppResult, models::SearchFacet};

/// Flat lookup lists used to suggest search values
#[derive(Clone)]
pub struct ReferenceData {
    api: ApiClient,
}

impl ReferenceData {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn genres(&self) -> AppResult<Vec<String>> {
        self.api.get_json("/genres").await
    }

    pub async fn titles(&self) -> AppResult<Vec<String>> {
        self.api.get_json("/titles").await
    }

    pub async fn writers(&self) -> AppResult<Vec<String>> {
        self.api.get_json("/writers").await
    }

    pub async fn directors(&self) -> AppResult<Vec<String>> {
        self.api.get_json("/directors").await
    }

    /// Suggestion list for the given search facet
    pub async fn options_for(&self, facet: SearchFacet) -> AppResult<Vec<String>> {
        match facet {
            SearchFacet::Title => self.titles().await,
            SearchFacet::Genres => self.genres().await,
            SearchFacet::Writers => self.writers().await,
            SearchFacet::Directors => self.directors().await,
        }
    }
}
