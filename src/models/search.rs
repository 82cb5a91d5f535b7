use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::str::FromStr;

/// Minimum trimmed length of a search query
pub const MIN_QUERY_LEN: usize = 3;

/// Which title facet a search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFacet {
    Title,
    Genres,
    Writers,
    Directors,
}

impl SearchFacet {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchFacet::Title => "title",
            SearchFacet::Genres => "genres",
            SearchFacet::Writers => "writers",
            SearchFacet::Directors => "directors",
        }
    }
}

impl Display for SearchFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchFacet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SearchFacet::Title),
            "genres" => Ok(SearchFacet::Genres),
            "writers" => Ok(SearchFacet::Writers),
            "directors" => Ok(SearchFacet::Directors),
            other => Err(format!("unknown search facet '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "averageRating")]
    AverageRating,
    #[serde(rename = "numVotes")]
    NumVotes,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::AverageRating => "averageRating",
            SortBy::NumVotes => "numVotes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Parameters of one search; sorting is passed through to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub facet: SearchFacet,
    pub query: String,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl SearchRequest {
    pub fn new(facet: SearchFacet, query: impl Into<String>) -> Self {
        Self {
            facet,
            query: query.into(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn sorted(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// Whether the query is long enough to send
    pub fn is_valid(&self) -> bool {
        self.query.trim().chars().count() >= MIN_QUERY_LEN
    }

    /// JSON body of `POST /search`: the single facet field plus sorting
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            self.facet.as_str().to_string(),
            Value::String(self.query.clone()),
        );
        body.insert("sort_by".to_string(), Value::from(self.sort_by.as_str()));
        body.insert(
            "sort_order".to_string(),
            Value::from(self.sort_order.as_str()),
        );
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_contains_one_facet() {
        let request = SearchRequest::new(SearchFacet::Writers, "Nolan")
            .sorted(SortBy::NumVotes, SortOrder::Asc);
        assert_eq!(
            request.body(),
            json!({ "writers": "Nolan", "sort_by": "numVotes", "sort_order": "asc" })
        );
    }

    #[test]
    fn test_query_length_is_measured_after_trim() {
        assert!(!SearchRequest::new(SearchFacet::Title, "  ab  ").is_valid());
        assert!(SearchRequest::new(SearchFacet::Title, "abc").is_valid());
        assert!(!SearchRequest::new(SearchFacet::Title, "").is_valid());
    }

    #[test]
    fn test_facet_from_str() {
        assert_eq!("genres".parse::<SearchFacet>(), Ok(SearchFacet::Genres));
        assert!("actors".parse::<SearchFacet>().is_err());
    }
}
