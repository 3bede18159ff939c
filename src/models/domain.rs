use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Core profile fields as stored in the profile repository.
///
/// Interests and images live in their own tables and are fetched separately
/// during enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub city: String,
    pub country: String,
}

/// Matching preference attached to a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    #[serde(rename = "minAge")]
    pub min_age: i32,
    #[serde(rename = "maxAge")]
    pub max_age: i32,
    #[serde(rename = "genderId")]
    pub gender_id: i32,
    #[serde(rename = "desiredCity")]
    pub desired_city: String,
}

/// A candidate enriched for one recommendation pass. Lives only for the
/// duration of a single call, never persisted.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub profile: Profile,
    pub images: Vec<String>,
    pub interests: Vec<String>,
    pub age_distance: i32,
    pub interest_overlap: usize,
    pub score: f64,
}

/// The winning candidate as returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub city: String,
    pub country: String,
    pub images: Vec<String>,
    pub interests: Vec<String>,
}

impl From<Candidate> for Recommendation {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.profile.id,
            name: candidate.profile.name,
            age: candidate.profile.age,
            gender: candidate.profile.gender,
            city: candidate.profile.city,
            country: candidate.profile.country,
            images: candidate.images,
            interests: candidate.interests,
        }
    }
}
