//! Session-scoped cache of the user's ratings and fetched predictions.
//!
//! Every view reads per-title user state from here and every rate/predict
//! action writes through here. Mutations are write-through: the cache changes
//! only after the service confirms the write, so a failed request leaves
//! every view exactly as it was.
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use reqwest::Method;
use serde_json::json;

use crate::{
    api::{ApiClient, RequestBody},
    error::{AppError, AppResult},
    models::{
        AnnotatedTitle, PredictionEntry, PredictionResponse, RateRequest, RatingRow, RatingUpdate,
        TitleId, TitleSummary, UserRatingEntry, RATING_RANGE,
    },
};

#[derive(Default)]
struct RatingCache {
    ratings: HashMap<TitleId, UserRatingEntry>,
    predictions: HashMap<TitleId, PredictionEntry>,
    /// Bumped on every clear; responses to requests started earlier are dropped
    generation: u64,
    loaded: bool,
}

/// Marks a title as having a remote operation in flight until dropped
struct FlightGuard {
    in_flight: Arc<Mutex<HashSet<TitleId>>>,
    title_id: TitleId,
}

impl FlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<TitleId>>>, title_id: TitleId) -> AppResult<Self> {
        let inserted = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(title_id);

        if !inserted {
            tracing::debug!(title_id = %title_id, "Rejected duplicate in-flight operation");
            return Err(AppError::InFlight(format!("title {}", title_id)));
        }

        Ok(Self {
            in_flight: Arc::clone(in_flight),
            title_id,
        })
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.title_id);
    }
}

/// Shared handle to the rating/prediction cache; clones share one cache
#[derive(Clone)]
pub struct RatingStore {
    api: ApiClient,
    cache: Arc<RwLock<RatingCache>>,
    in_flight: Arc<Mutex<HashSet<TitleId>>>,
}

impl RatingStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: Arc::new(RwLock::new(RatingCache::default())),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RatingCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RatingCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Applies `update` only if no clear happened since `generation` was read
    fn apply<F>(&self, generation: u64, update: F) -> AppResult<()>
    where
        F: FnOnce(&mut RatingCache),
    {
        let mut cache = self.write();
        if cache.generation != generation {
            tracing::info!(
                started = generation,
                current = cache.generation,
                "Dropping response from an ended session"
            );
            return Err(AppError::Cancelled);
        }
        update(&mut cache);
        Ok(())
    }

    /// Decorates titles with the current rating and prediction for each id
    pub fn annotate(&self, titles: &[TitleSummary]) -> Vec<AnnotatedTitle> {
        let cache = self.read();
        titles
            .iter()
            .map(|title| AnnotatedTitle {
                title: title.clone(),
                rating: cache.ratings.get(&title.id).cloned(),
                prediction: cache.predictions.get(&title.id).cloned(),
            })
            .collect()
    }

    pub fn rating(&self, title_id: TitleId) -> Option<UserRatingEntry> {
        self.read().ratings.get(&title_id).cloned()
    }

    pub fn prediction(&self, title_id: TitleId) -> Option<PredictionEntry> {
        self.read().predictions.get(&title_id).cloned()
    }

    pub fn rating_count(&self) -> usize {
        self.read().ratings.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    /// Whether the "Rate" affordance should be offered for a title
    pub fn rating_allowed(&self, title_id: TitleId) -> bool {
        !self.read().ratings.contains_key(&title_id)
    }

    /// Whether the "Predict" affordance should be offered for a title
    pub fn prediction_allowed(&self, title_id: TitleId) -> bool {
        let cache = self.read();
        !cache.ratings.contains_key(&title_id) && !cache.predictions.contains_key(&title_id)
    }

    /// Loads the user's ratings once per session
    pub async fn ensure_loaded(&self) -> AppResult<()> {
        if self.is_loaded() {
            return Ok(());
        }
        self.reload().await.map(|_| ())
    }

    /// Replaces the cached ratings with the service's list and returns its rows
    pub async fn reload(&self) -> AppResult<Vec<RatingRow>> {
        let generation = self.generation();
        let rows: Vec<RatingRow> = self.api.get_json("/my-ratings").await?;

        self.apply(generation, |cache| {
            cache.ratings = rows
                .iter()
                .map(|row| (row.movie_id, row.entry()))
                .collect();
            cache.loaded = true;
        })?;

        tracing::info!(ratings = rows.len(), "Loaded user ratings");
        Ok(rows)
    }

    /// Rates a title that has no rating yet.
    ///
    /// The rate endpoint does not return the record id, so the ratings list is
    /// re-read after the write to find it.
    pub async fn record_rating(&self, title_id: TitleId, value: f64) -> AppResult<UserRatingEntry> {
        validate_value(value)?;
        if !self.rating_allowed(title_id) {
            return Err(AppError::Validation(format!(
                "Title {} is already rated",
                title_id
            )));
        }

        let _flight = FlightGuard::acquire(&self.in_flight, title_id)?;
        let generation = self.generation();

        let request = RateRequest {
            movie_id: title_id,
            rating: value,
        };
        self.api.send_body(Method::POST, "/rate", &request).await?;

        let rows: Vec<RatingRow> = self.api.get_json("/my-ratings").await.map_err(|e| {
            tracing::warn!(
                title_id = %title_id,
                error = %e,
                "Rating saved on the service but the ratings refresh failed; retrying is safe"
            );
            saved_but_unrefreshed(e)
        })?;
        let entry = rows
            .iter()
            .find(|row| row.movie_id == title_id)
            .map(RatingRow::entry)
            .ok_or_else(|| AppError::Unexpected {
                status: 200,
                message: format!("rating for title {} missing after write", title_id),
            })?;

        self.apply(generation, |cache| {
            cache.ratings.insert(title_id, entry.clone());
        })?;

        tracing::info!(
            title_id = %title_id,
            rating_id = %entry.rating_record_id,
            value = entry.value,
            "Rating recorded"
        );
        Ok(entry)
    }

    /// Changes an existing rating, addressed by its record id
    pub async fn update_rating(
        &self,
        title_id: TitleId,
        new_value: f64,
    ) -> AppResult<UserRatingEntry> {
        validate_value(new_value)?;
        let existing = self.rating(title_id).ok_or(AppError::NotRated(title_id))?;

        let _flight = FlightGuard::acquire(&self.in_flight, title_id)?;
        let generation = self.generation();

        let path = format!("/my-ratings/{}", existing.rating_record_id);
        let body = RatingUpdate { rating: new_value };
        self.api.send_body(Method::PUT, &path, &body).await?;

        let entry = UserRatingEntry {
            value: new_value,
            ..existing
        };
        self.apply(generation, |cache| {
            cache.ratings.insert(title_id, entry.clone());
        })?;

        tracing::info!(title_id = %title_id, value = new_value, "Rating updated");
        Ok(entry)
    }

    /// Removes a rating; every view then shows the title as unrated
    pub async fn delete_rating(&self, title_id: TitleId) -> AppResult<()> {
        let existing = self.rating(title_id).ok_or(AppError::NotRated(title_id))?;

        let _flight = FlightGuard::acquire(&self.in_flight, title_id)?;
        let generation = self.generation();

        let path = format!("/my-ratings/{}", existing.rating_record_id);
        self.api.send(Method::DELETE, &path, None).await?;

        self.apply(generation, |cache| {
            cache.ratings.remove(&title_id);
        })?;

        tracing::info!(title_id = %title_id, "Rating deleted");
        Ok(())
    }

    /// Fetches a predicted rating at most once per title per session.
    ///
    /// Rated titles are not prediction candidates: the call returns whatever is
    /// cached without contacting the service.
    pub async fn request_prediction(&self, title_id: TitleId) -> AppResult<Option<PredictionEntry>> {
        {
            let cache = self.read();
            if cache.ratings.contains_key(&title_id) || cache.predictions.contains_key(&title_id) {
                return Ok(cache.predictions.get(&title_id).cloned());
            }
        }

        let _flight = FlightGuard::acquire(&self.in_flight, title_id)?;
        let generation = self.generation();

        let path = format!("/predict/{}", title_id);
        let response: PredictionResponse = self
            .api
            .execute_json(Method::POST, &path, Some(RequestBody::Json(json!({}))))
            .await?;

        let entry = PredictionEntry {
            title_id,
            predicted_value: response.predicted_rating,
            fetched_at: Utc::now(),
        };
        self.apply(generation, |cache| {
            cache.predictions.insert(title_id, entry.clone());
        })?;

        tracing::info!(
            title_id = %title_id,
            predicted = entry.predicted_value,
            "Prediction cached"
        );
        Ok(Some(entry))
    }

    /// Drops every cached rating and prediction and starts a new generation
    pub fn clear(&self) {
        let mut cache = self.write();
        cache.ratings.clear();
        cache.predictions.clear();
        cache.loaded = false;
        cache.generation += 1;
        tracing::debug!(generation = cache.generation, "Rating store cleared");
    }
}

/// Keeps the failure kind but says the write itself went through
fn saved_but_unrefreshed(error: AppError) -> AppError {
    let note = |message: String| format!("rating saved, but reloading ratings failed: {}", message);
    match error {
        AppError::Unreachable(message) => AppError::Unreachable(note(message)),
        AppError::Unexpected { status, message } => AppError::Unexpected {
            status,
            message: note(message),
        },
        other => other,
    }
}

fn validate_value(value: f64) -> AppResult<()> {
    if value.is_finite() && RATING_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Rating must be between {} and {}",
            RATING_RANGE.start(),
            RATING_RANGE.end()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryCredentialStore;
    use std::time::Duration;

    fn store() -> RatingStore {
        let api = ApiClient::new(
            "http://localhost:1",
            Duration::from_millis(200),
            Arc::new(MemoryCredentialStore::new()),
        )
        .unwrap();
        RatingStore::new(api)
    }

    #[test]
    fn test_validate_value_bounds() {
        assert!(validate_value(0.0).is_ok());
        assert!(validate_value(10.0).is_ok());
        assert!(validate_value(10.5).is_err());
        assert!(validate_value(-1.0).is_err());
        assert!(validate_value(f64::NAN).is_err());
    }

    #[test]
    fn test_flight_guard_rejects_duplicate_until_dropped() {
        let in_flight = Arc::new(Mutex::new(HashSet::new()));
        let guard = FlightGuard::acquire(&in_flight, TitleId(1)).unwrap();
        assert!(matches!(
            FlightGuard::acquire(&in_flight, TitleId(1)),
            Err(AppError::InFlight(_))
        ));
        assert!(FlightGuard::acquire(&in_flight, TitleId(2)).is_ok());
        drop(guard);
        assert!(FlightGuard::acquire(&in_flight, TitleId(1)).is_ok());
    }

    #[test]
    fn test_apply_rejects_stale_generation() {
        let store = store();
        let generation = store.generation();
        store.clear();
        let result = store.apply(generation, |cache| cache.loaded = true);
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_refresh_failure_note_keeps_kind() {
        let err = saved_but_unrefreshed(AppError::Unreachable("timed out".into()));
        assert!(matches!(
            &err,
            AppError::Unreachable(msg) if msg == "rating saved, but reloading ratings failed: timed out"
        ));
        assert!(saved_but_unrefreshed(AppError::Unauthorized(String::new())).is_unauthorized());
    }

    #[tokio::test]
    async fn test_update_without_rating_fails_locally() {
        let store = store();
        let result = store.update_rating(TitleId(9), 5.0).await;
        assert!(matches!(result, Err(AppError::NotRated(TitleId(9)))));
    }

    #[tokio::test]
    async fn test_record_rating_out_of_range_fails_locally() {
        let store = store();
        let result = store.record_rating(TitleId(9), 11.0).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.rating(TitleId(9)), None);
    }
}
