// Core algorithm exports
pub mod interest;
pub mod ranker;
pub mod recommender;
pub mod scoring;

pub use interest::shares_interest;
pub use ranker::{rank, select_best};
pub use recommender::{DisplayedStore, ProfileStore, RecommendError, Recommender, StoreError};
pub use scoring::{age_distance, composite_score, interest_overlap};
