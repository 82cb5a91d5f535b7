use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{TitleId, TitleSummary, TitleType};

/// Remote-assigned identifier of a rating record, used for update and delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingRecordId(pub i64);

impl Display for RatingRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowest and highest rating the client accepts
pub const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// The current user's own rating for one title
#[derive(Debug, Clone, PartialEq)]
pub struct UserRatingEntry {
    pub title_id: TitleId,
    pub rating_record_id: RatingRecordId,
    pub value: f64,
}

/// Session-cached predicted rating for a title the user has not rated
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionEntry {
    pub title_id: TitleId,
    pub predicted_value: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Row returned by `GET /my-ratings`
#[derive(Debug, Clone, Deserialize)]
pub struct RatingRow {
    pub rating_id: RatingRecordId,
    pub movie_id: TitleId,
    pub rating: f64,
    pub title: String,
    #[serde(rename = "titleType")]
    pub title_type: TitleType,
    #[serde(rename = "startYear", default)]
    pub start_year: Option<i32>,
    #[serde(rename = "endYear", default)]
    pub end_year: Option<i32>,
    #[serde(rename = "totalEpisodes", default)]
    pub total_episodes: Option<i32>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(rename = "runtimeMinutes", default)]
    pub runtime_minutes: Option<i32>,
    #[serde(rename = "numVotes", default)]
    pub num_votes: u64,
    #[serde(rename = "averageRating", default)]
    pub average_rating: f64,
    #[serde(default)]
    pub writers: Option<String>,
    #[serde(default)]
    pub directors: Option<String>,
}

impl RatingRow {
    pub fn entry(&self) -> UserRatingEntry {
        UserRatingEntry {
            title_id: self.movie_id,
            rating_record_id: self.rating_id,
            value: self.rating,
        }
    }

    pub fn summary(&self) -> TitleSummary {
        TitleSummary {
            id: self.movie_id,
            title: self.title.clone(),
            title_type: self.title_type.clone(),
            start_year: self.start_year,
            end_year: self.end_year,
            total_episodes: self.total_episodes,
            genres: self.genres.clone(),
            runtime_minutes: self.runtime_minutes,
            num_votes: self.num_votes,
            average_rating: self.average_rating,
            writers: self.writers.clone(),
            directors: self.directors.clone(),
        }
    }
}

/// Body of `POST /rate`
#[derive(Debug, Clone, Serialize)]
pub struct RateRequest {
    pub movie_id: TitleId,
    pub rating: f64,
}

/// Body of `PUT /my-ratings/{rating_id}`
#[derive(Debug, Clone, Serialize)]
pub struct RatingUpdate {
    pub rating: f64,
}

/// Response of `POST /predict/{movie_id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub predicted_rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_row_deserialization() {
        let json = r#"{
            "rating_id": 7,
            "movie_id": 42,
            "title": "Inception",
            "titleType": "movie",
            "startYear": 2010,
            "endYear": null,
            "totalEpisodes": null,
            "genres": "Action,Sci-Fi",
            "runtimeMinutes": 148,
            "numVotes": 2500000,
            "averageRating": 8.8,
            "writers": null,
            "directors": "Christopher Nolan",
            "rating": 9.0
        }"#;

        let row: RatingRow = serde_json::from_str(json).unwrap();
        let entry = row.entry();
        assert_eq!(entry.title_id, TitleId(42));
        assert_eq!(entry.rating_record_id, RatingRecordId(7));
        assert_eq!(entry.value, 9.0);
        assert_eq!(row.summary().directors.as_deref(), Some("Christopher Nolan"));
    }

    #[test]
    fn test_prediction_response_deserialization() {
        let response: PredictionResponse =
            serde_json::from_str(r#"{"predictedRating": 7.25}"#).unwrap();
        assert_eq!(response.predicted_rating, 7.25);
    }
}
