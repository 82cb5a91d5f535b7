use std::fmt;

use crate::models::TitleId;

/// Client-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Service unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },

    #[error("Credential storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Operation already in flight: {0}")]
    InFlight(String),

    #[error("Title {0} has no rating")]
    NotRated(TitleId),

    #[error("View is no longer active")]
    Cancelled,
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // A body that does not decode came from a live service; anything else is transport.
        if err.is_decode() {
            AppError::Unexpected {
                status: err.status().map(|s| s.as_u16()).unwrap_or(200),
                message: err.to_string(),
            }
        } else {
            AppError::Unreachable(err.to_string())
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Coarse failure classification used to decide presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    NotFound,
    Validation,
    Unreachable,
    Unknown,
}

/// How a notice is shown next to an already-rendered view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A non-blocking, user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl AppError {
    /// Classifies the error into the presentation taxonomy
    pub fn kind(&self) -> FailureKind {
        match self {
            AppError::Unauthorized(_) => FailureKind::Unauthorized,
            AppError::NotFound(_) => FailureKind::NotFound,
            AppError::Validation(_) | AppError::NotRated(_) | AppError::InFlight(_) => {
                FailureKind::Validation
            }
            AppError::Unreachable(_) => FailureKind::Unreachable,
            AppError::Unexpected { .. } | AppError::Storage(_) | AppError::Cancelled => {
                FailureKind::Unknown
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }

    /// Message supplied by the remote service, if it sent one
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Unexpected { message: msg, .. } => msg.as_str(),
            _ => return None,
        };
        (!message.is_empty()).then_some(message)
    }

    /// Fills an empty server message with `default`, keeping the classification
    pub fn with_default_message(self, default: &str) -> Self {
        match self {
            AppError::Unauthorized(msg) if msg.is_empty() => {
                AppError::Unauthorized(default.to_string())
            }
            AppError::NotFound(msg) if msg.is_empty() => AppError::NotFound(default.to_string()),
            AppError::Validation(msg) if msg.is_empty() => {
                AppError::Validation(default.to_string())
            }
            AppError::Unexpected { status, message } if message.is_empty() => {
                AppError::Unexpected {
                    status,
                    message: default.to_string(),
                }
            }
            other => other,
        }
    }

    /// Maps the error to the notice a view shows.
    ///
    /// Local validation failures carry their own message; everything else the
    /// user sees is the view's `fallback` text. `NotFound` stays informational.
    pub fn notice(&self, fallback: &str) -> Notice {
        match self {
            AppError::Validation(msg) if !msg.is_empty() => Notice::error(msg.clone()),
            AppError::NotFound(_) => Notice::info(fallback),
            _ => Notice::error(fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            AppError::Unauthorized(String::new()).kind(),
            FailureKind::Unauthorized
        );
        assert_eq!(AppError::NotFound("x".into()).kind(), FailureKind::NotFound);
        assert_eq!(
            AppError::NotRated(TitleId(3)).kind(),
            FailureKind::Validation
        );
        assert_eq!(
            AppError::Unreachable("refused".into()).kind(),
            FailureKind::Unreachable
        );
        assert_eq!(
            AppError::Unexpected {
                status: 500,
                message: String::new()
            }
            .kind(),
            FailureKind::Unknown
        );
    }

    #[test]
    fn test_server_message_empty_is_none() {
        assert_eq!(AppError::Validation(String::new()).server_message(), None);
        assert_eq!(
            AppError::Unauthorized("Incorrect username or password".into()).server_message(),
            Some("Incorrect username or password")
        );
        assert_eq!(AppError::Cancelled.server_message(), None);
    }

    #[test]
    fn test_with_default_message_only_fills_empty() {
        let err = AppError::Unauthorized(String::new()).with_default_message("Login failed");
        assert_eq!(err.server_message(), Some("Login failed"));

        let err = AppError::Validation("Username already registered".into())
            .with_default_message("Registration failed");
        assert_eq!(err.server_message(), Some("Username already registered"));
    }

    #[test]
    fn test_not_found_notice_is_informational() {
        let notice = AppError::NotFound("Nothing to recommend".into()).notice("None yet");
        assert_eq!(notice, Notice::info("None yet"));
    }

    #[test]
    fn test_unreachable_notice_uses_fallback() {
        let notice = AppError::Unreachable("timeout".into()).notice("Try again later.");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Try again later.");
    }
}
