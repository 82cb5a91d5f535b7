use reqwest::Method;
use uuid::Uuid;

/// Header carrying the per-call correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifier attached to every outbound call so service logs can be correlated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Hyphenated form sent in [`REQUEST_ID_HEADER`]
    pub fn header_value(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Creates the tracing span an outbound request runs in
pub fn make_span_with_request_id(method: &Method, path: &str, request_id: &RequestId) -> tracing::Span {
    tracing::info_span!(
        "api_request",
        method = %method,
        path = %path,
        request_id = %request_id,
    )
}
