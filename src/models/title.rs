use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{PredictionEntry, UserRatingEntry};

/// Catalog identifier of a movie or TV title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleId(pub i64);

impl Display for TitleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// IMDb-style title type as sent by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TitleType {
    Movie,
    TvSeries,
    TvEpisode,
    TvMiniSeries,
    TvMovie,
    TvShort,
    TvSpecial,
    Short,
    Video,
    VideoGame,
    Other(String),
}

impl TitleType {
    /// Human-readable label for the title type
    pub fn label(&self) -> &str {
        match self {
            TitleType::Movie => "Movie",
            TitleType::TvSeries => "TV Series",
            TitleType::TvEpisode => "TV Episode",
            TitleType::TvMiniSeries => "TV Mini Series",
            TitleType::TvMovie => "TV Movie",
            TitleType::TvShort => "TV Short",
            TitleType::TvSpecial => "TV Special",
            TitleType::Short => "Short",
            TitleType::Video => "Video",
            TitleType::VideoGame => "Video Game",
            TitleType::Other(raw) => raw,
        }
    }
}

impl From<String> for TitleType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "movie" => TitleType::Movie,
            "tvSeries" => TitleType::TvSeries,
            "tvEpisode" => TitleType::TvEpisode,
            "tvMiniSeries" => TitleType::TvMiniSeries,
            "tvMovie" => TitleType::TvMovie,
            "tvShort" => TitleType::TvShort,
            "tvSpecial" => TitleType::TvSpecial,
            "short" => TitleType::Short,
            "video" => TitleType::Video,
            "videoGame" => TitleType::VideoGame,
            _ => TitleType::Other(raw),
        }
    }
}

impl From<TitleType> for String {
    fn from(title_type: TitleType) -> Self {
        match title_type {
            TitleType::Movie => "movie".to_string(),
            TitleType::TvSeries => "tvSeries".to_string(),
            TitleType::TvEpisode => "tvEpisode".to_string(),
            TitleType::TvMiniSeries => "tvMiniSeries".to_string(),
            TitleType::TvMovie => "tvMovie".to_string(),
            TitleType::TvShort => "tvShort".to_string(),
            TitleType::TvSpecial => "tvSpecial".to_string(),
            TitleType::Short => "short".to_string(),
            TitleType::Video => "video".to_string(),
            TitleType::VideoGame => "videoGame".to_string(),
            TitleType::Other(raw) => raw,
        }
    }
}

/// Read-only projection of a catalog title returned by every list endpoint.
///
/// Per-user fields the service includes (`userRating`, `predictedRating`)
/// are not deserialized; per-title user state comes only from the rating store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleSummary {
    pub id: TitleId,
    pub title: String,
    pub title_type: TitleType,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub total_episodes: Option<i32>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub runtime_minutes: Option<i32>,
    #[serde(default)]
    pub num_votes: u64,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub writers: Option<String>,
    #[serde(default)]
    pub directors: Option<String>,
}

fn split_names(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

impl TitleSummary {
    pub fn genre_list(&self) -> Vec<String> {
        split_names(self.genres.as_deref())
    }

    pub fn writer_list(&self) -> Vec<String> {
        split_names(self.writers.as_deref())
    }

    pub fn director_list(&self) -> Vec<String> {
        split_names(self.directors.as_deref())
    }
}

/// A title decorated with the current user state from the rating store
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTitle {
    pub title: TitleSummary,
    pub rating: Option<UserRatingEntry>,
    pub prediction: Option<PredictionEntry>,
}

impl AnnotatedTitle {
    pub fn id(&self) -> TitleId {
        self.title.id
    }

    /// Whether the "Rate" affordance is offered for this row
    pub fn can_rate(&self) -> bool {
        self.rating.is_none()
    }

    /// Whether the "Predict" affordance is offered for this row
    pub fn can_predict(&self) -> bool {
        self.rating.is_none() && self.prediction.is_none()
    }
}
