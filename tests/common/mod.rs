#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use screenpick::{
    storage::{Credential, CredentialStore, MemoryCredentialStore},
    ApiClient, AppState,
};

pub const TOKEN: &str = "test_access_token";

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mock service plus a client wired against it
pub struct TestContext {
    pub server: MockServer,
    pub credentials: Arc<MemoryCredentialStore>,
    pub state: AppState,
}

impl TestContext {
    /// Client with a stored credential, as after a successful login
    pub async fn authenticated() -> Self {
        Self::build(Some(TOKEN)).await
    }

    pub async fn anonymous() -> Self {
        Self::build(None).await
    }

    async fn build(token: Option<&str>) -> Self {
        init_logging();
        let server = MockServer::start().await;

        let credentials = Arc::new(match token {
            Some(token) => MemoryCredentialStore::with_credential(Credential::new(token).unwrap()),
            None => MemoryCredentialStore::new(),
        });
        let store: Arc<dyn CredentialStore> = credentials.clone();
        let api = ApiClient::new(&server.uri(), Duration::from_secs(5), store).unwrap();

        Self {
            server,
            credentials,
            state: AppState::new(api),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credentials.get().is_some()
    }

    /// Serves `GET /my-ratings` with the given rows
    pub async fn mock_my_ratings(&self, rows: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/my-ratings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(rows)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_get_titles(&self, route: &str, titles: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(titles)))
            .mount(&self.server)
            .await;
    }
}

pub fn title_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "titleType": "movie",
        "startYear": 2010,
        "endYear": null,
        "totalEpisodes": null,
        "genres": "Drama,Thriller",
        "runtimeMinutes": 120,
        "numVotes": 100000,
        "averageRating": 7.9,
        "writers": "Jane Doe",
        "directors": "John Roe",
        "userRating": null,
        "predictedRating": null
    })
}

pub fn rating_row_json(rating_id: i64, movie_id: i64, rating: f64) -> Value {
    json!({
        "rating_id": rating_id,
        "movie_id": movie_id,
        "title": format!("Title {}", movie_id),
        "titleType": "movie",
        "startYear": 2010,
        "endYear": null,
        "totalEpisodes": null,
        "genres": "Drama",
        "runtimeMinutes": 120,
        "numVotes": 1000,
        "averageRating": 7.0,
        "writers": null,
        "directors": null,
        "rating": rating
    })
}
