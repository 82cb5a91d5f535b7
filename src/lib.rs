//! Session-scoped client for a movie/TV recommendation service.
//!
//! [`api::AppState`] wires the credential store, the authorized request
//! executor, the session controller, the route guard and the shared
//! rating/prediction store that every view renders against.
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

pub use api::{ApiClient, AppState};
pub use config::Config;
pub use error::{AppError, AppResult, FailureKind, Notice, NoticeLevel};
