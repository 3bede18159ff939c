use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Response for the shown-profiles endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShownResponse {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "shownProfiles")]
    pub shown_profiles: Vec<Uuid>,
    pub count: usize,
}
