use reqwest::Url;
use std::fmt::Display;

use crate::models::{SearchFacet, SearchRequest, SortBy, SortOrder};

pub mod guard;
pub mod navigator;

pub use guard::{Admission, RouteGuard, ViewLifetime};
pub use navigator::Navigator;

/// Facet value carried by a search link such as `/search?genres=Drama`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPrefill {
    pub facet: SearchFacet,
    pub value: String,
}

impl SearchPrefill {
    /// Search a prefilled link runs: the facet value sorted by vote count
    pub fn request(&self) -> SearchRequest {
        SearchRequest::new(self.facet, self.value.clone()).sorted(SortBy::NumVotes, SortOrder::Desc)
    }
}

/// Screens of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    TopTitles,
    Search(Option<SearchPrefill>),
    Recommendations,
    Login,
    Account,
}

impl Route {
    /// Whether entering this route needs an authenticated session
    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Home | Route::Login)
    }

    /// Link to a search for one facet value
    pub fn search_by(facet: SearchFacet, value: impl Into<String>) -> Self {
        Route::Search(Some(SearchPrefill {
            facet,
            value: value.into(),
        }))
    }

    /// Parses an in-app path; unknown paths yield `None`
    pub fn parse(path: &str) -> Option<Self> {
        let url = Url::parse("http://screenpick.local/").ok()?.join(path).ok()?;

        match url.path().trim_end_matches('/') {
            "" => Some(Route::Home),
            "/top-titles" => Some(Route::TopTitles),
            "/recommendations" => Some(Route::Recommendations),
            "/login" => Some(Route::Login),
            "/account" => Some(Route::Account),
            "/search" => {
                // Only facet links prefill; `title` is typed, never linked
                let prefill = url.query_pairs().find_map(|(key, value)| {
                    let facet = match key.as_ref() {
                        "genres" => SearchFacet::Genres,
                        "writers" => SearchFacet::Writers,
                        "directors" => SearchFacet::Directors,
                        _ => return None,
                    };
                    Some(SearchPrefill {
                        facet,
                        value: value.into_owned(),
                    })
                });
                Some(Route::Search(prefill))
            }
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::TopTitles => "/top-titles".to_string(),
            Route::Recommendations => "/recommendations".to_string(),
            Route::Login => "/login".to_string(),
            Route::Account => "/account".to_string(),
            Route::Search(None) => "/search".to_string(),
            Route::Search(Some(prefill)) => {
                let query: String = Url::parse("http://screenpick.local/search")
                    .map(|mut url| {
                        url.query_pairs_mut()
                            .append_pair(prefill.facet.as_str(), &prefill.value);
                        url.query().unwrap_or_default().to_string()
                    })
                    .unwrap_or_default();
                format!("/search?{}", query)
            }
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/top-titles"), Some(Route::TopTitles));
        assert_eq!(Route::parse("/account/"), Some(Route::Account));
        assert_eq!(Route::parse("/search"), Some(Route::Search(None)));
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_parse_search_prefill() {
        let route = Route::parse("/search?directors=Greta%20Gerwig").unwrap();
        assert_eq!(route, Route::search_by(SearchFacet::Directors, "Greta Gerwig"));

        let Route::Search(Some(prefill)) = route else {
            panic!("expected prefill");
        };
        let request = prefill.request();
        assert_eq!(request.sort_by, SortBy::NumVotes);
        assert_eq!(request.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_path_round_trips_prefill() {
        let route = Route::search_by(SearchFacet::Genres, "Sci-Fi & Fantasy");
        assert_eq!(Route::parse(&route.path()), Some(route));
    }

    #[test]
    fn test_public_routes() {
        assert!(!Route::Home.requires_session());
        assert!(!Route::Login.requires_session());
        assert!(Route::TopTitles.requires_session());
        assert!(Route::Search(None).requires_session());
        assert!(Route::Account.requires_session());
    }
}
