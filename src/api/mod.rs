pub mod executor;
pub mod state;

pub use executor::{ApiClient, RequestBody};
pub use state::AppState;
