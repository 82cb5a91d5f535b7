//! Authorized request executor: every call to the remote service goes through here.
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header::AUTHORIZATION, Client as HttpClient, Method, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::Instrument;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::{make_span_with_request_id, RequestId, REQUEST_ID_HEADER},
    storage::CredentialStore,
};

/// Outbound request payload
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Executes requests against the service, attaching the bearer credential when one is stored.
///
/// Failures are classified into [`AppError`] and never retried. The executor reads the
/// credential store but never writes to it.
#[derive(Clone)]
pub struct ApiClient {
    http_client: HttpClient,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Creates a client with its own connection pool and request timeout
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Unreachable(format!("failed to build HTTP client: {}", e)))?;
        Self::with_http_client(http_client, base_url, credentials)
    }

    pub fn with_http_client(
        http_client: HttpClient,
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            AppError::Validation(format!("invalid service URL '{}': {}", base_url, e))
        })?;

        Ok(Self {
            http_client,
            base_url,
            credentials,
        })
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Resolves a service path against the base URL, keeping any base path prefix
    fn url(&self, path: &str) -> AppResult<Url> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| AppError::Validation(format!("invalid path '{}': {}", path, e)))
    }

    /// Sends one request and returns the successful response
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> AppResult<Response> {
        let request_id = RequestId::generate();
        let span = make_span_with_request_id(&method, path, &request_id);

        async move {
            let mut request = self
                .http_client
                .request(method, self.url(path)?)
                .header(REQUEST_ID_HEADER, request_id.header_value());

            if let Some(credential) = self.credentials.get() {
                request = request.header(AUTHORIZATION, format!("Bearer {}", credential.expose()));
            }

            request = match body {
                Some(RequestBody::Json(json)) => request.json(&json),
                Some(RequestBody::Form(fields)) => request.form(&fields),
                None => request,
            };

            let response = request.send().await.map_err(|e| {
                tracing::warn!(error = %e, "Request did not reach the service");
                AppError::from(e)
            })?;

            let status = response.status();
            if status.is_success() {
                tracing::debug!(status = %status, "Request succeeded");
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            let error = classify(status, &body);
            tracing::info!(status = %status, kind = ?error.kind(), "Request rejected by service");
            Err(error)
        }
        .instrument(span)
        .await
    }

    /// Sends a request and decodes the JSON response
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> AppResult<T> {
        let response = self.execute(method, path, body).await?;
        Ok(response.json().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.execute_json(Method::GET, path, None).await
    }

    /// Sends a JSON body and ignores whatever the service returns
    pub async fn send_body<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> AppResult<()> {
        self.send(method, path, Some(json_body(body)?)).await
    }

    /// Sends a request whose response body is not needed
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> AppResult<()> {
        self.execute(method, path, body).await.map(|_| ())
    }
}

fn json_body<B: Serialize>(body: &B) -> AppResult<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| AppError::Unexpected {
            status: 0,
            message: format!("request serialization error: {}", e),
        })
}

/// Maps a non-success status and its body onto the failure taxonomy
fn classify(status: StatusCode, body: &str) -> AppError {
    let message = detail_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        _ => AppError::Unexpected {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extracts the service's `detail` message; empty when the body carries none
fn detail_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };

    match &json["detail"] {
        Value::String(detail) => detail.clone(),
        // Field validation errors arrive as a list of {loc, msg, type}
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item["msg"].as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}
