// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Candidate, Preference, Profile, Recommendation};
pub use requests::{NextRecommendationRequest, ShownQuery};
pub use responses::{ErrorResponse, HealthResponse, ShownResponse};
