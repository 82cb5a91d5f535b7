mod account;
mod rating;
mod search;
mod title;

pub use account::{AccountUpdate, RegisterRequest, TokenResponse, UserProfile};
pub use rating::{
    PredictionEntry, PredictionResponse, RateRequest, RatingRecordId, RatingRow, RatingUpdate,
    UserRatingEntry, RATING_RANGE,
};
pub use search::{SearchFacet, SearchRequest, SortBy, SortOrder, MIN_QUERY_LEN};
pub use title::{AnnotatedTitle, TitleId, TitleSummary, TitleType};
