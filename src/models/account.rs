use serde::{Deserialize, Serialize};

/// Response of `POST /token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Body of `POST /register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response of `GET /me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub username: String,
}

/// Body of `PUT /me`; absent fields are left unchanged by the service
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountUpdate {
    pub current_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AccountUpdate {
    pub fn new(current_password: impl Into<String>) -> Self {
        Self {
            current_password: current_password.into(),
            ..Default::default()
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = non_empty(username.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = non_empty(email.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = non_empty(password.into());
        self
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
