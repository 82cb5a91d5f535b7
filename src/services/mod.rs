pub mod rating_store;
pub mod reference;
pub mod session;
pub mod views;

pub use rating_store::RatingStore;
pub use reference::ReferenceData;
pub use session::{SessionController, SessionPhase};
pub use views::{
    AccountView, RecommendationsView, SearchView, TitleListView, TrendingView, ViewContext,
    ViewModel,
};
