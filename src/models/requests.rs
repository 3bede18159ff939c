use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request for the next recommendation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NextRecommendationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Query parameters for the shown-profiles endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ShownQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
