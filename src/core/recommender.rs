use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use uuid::Uuid;

use crate::core::{ranker, scoring};
use crate::models::{Candidate, Preference, Profile, Recommendation};

/// Errors surfaced by the store collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("malformed id: {0}")]
    MalformedId(#[from] uuid::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Errors returned by [`Recommender::recommend`]
#[derive(Debug, Error)]
pub enum RecommendError {
    /// A collaborator read or write failed; the request is aborted as-is.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Every candidate was filtered out or already shown. Expected outcome,
    /// the caller may retry later or relax the preference.
    #[error("no new recommendations available")]
    NoNewRecommendations,
}

/// Read-only access to the profile repository.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Profile, StoreError>;

    async fn get_preference(&self, id: Uuid) -> Result<Preference, StoreError>;

    async fn get_interests(&self, id: Uuid) -> Result<Vec<String>, StoreError>;

    async fn get_images(&self, id: Uuid) -> Result<Vec<String>, StoreError>;

    /// All profiles with age strictly between the bounds and the desired
    /// gender, excluding the viewer. City mutuality is not evaluated here.
    async fn fetch_candidates(
        &self,
        min_age: i32,
        max_age: i32,
        gender_id: i32,
        exclude_id: Uuid,
    ) -> Result<Vec<Profile>, StoreError>;
}

/// Per-viewer record of candidate ids already shown.
///
/// The set only grows, and only through [`Recommender::recommend`] selecting
/// a winner. `record` is idempotent.
#[async_trait]
pub trait DisplayedStore: Send + Sync {
    async fn shown(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>, StoreError>;

    async fn record(&self, viewer_id: Uuid, candidate_id: Uuid) -> Result<(), StoreError>;
}

/// Single-result recommendation orchestrator
///
/// # Pipeline
/// 1. Load the viewer's profile, preference, and sorted interest list
/// 2. Fetch raw candidates (age bounds, gender, not the viewer)
/// 3. Enrich each candidate (images, interests, preference) with bounded
///    concurrency, gating on city mutuality and the exclusion set
/// 4. Score eligible candidates and pick the lowest composite score
/// 5. Record the winner in the exclusion set and return it
///
/// Both collaborators are injected at construction; the orchestrator keeps
/// no other state and every invocation is independent.
pub struct Recommender {
    profiles: Arc<dyn ProfileStore>,
    displayed: Arc<dyn DisplayedStore>,
    enrichment_concurrency: usize,
}

impl Recommender {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        displayed: Arc<dyn DisplayedStore>,
        enrichment_concurrency: usize,
    ) -> Self {
        Self {
            profiles,
            displayed,
            enrichment_concurrency: enrichment_concurrency.max(1),
        }
    }

    /// Select the next profile to present to the viewer.
    ///
    /// Fail-fast: any collaborator error aborts the whole call; no candidate
    /// is skipped over an error. The exclusion-set update for the winner is
    /// the only state transition performed.
    pub async fn recommend(&self, viewer_id: Uuid) -> Result<Recommendation, RecommendError> {
        let viewer = self.profiles.get_profile(viewer_id).await?;
        let preference = self.profiles.get_preference(viewer_id).await?;

        let mut viewer_interests = self.profiles.get_interests(viewer_id).await?;
        // The ordered interest search requires an ascending-sorted list.
        viewer_interests.sort_unstable();

        let candidates = self
            .profiles
            .fetch_candidates(
                preference.min_age,
                preference.max_age,
                preference.gender_id,
                viewer_id,
            )
            .await?;

        let shown = self.displayed.shown(viewer_id).await?;

        tracing::debug!(
            viewer = %viewer_id,
            candidates = candidates.len(),
            shown = shown.len(),
            "scoring candidate pool"
        );

        let enriched: Vec<Option<Candidate>> = stream::iter(candidates.into_iter().map(|profile| {
            self.enrich_and_score(profile, &viewer, &preference, &viewer_interests, &shown)
        }))
        .buffered(self.enrichment_concurrency)
        .try_collect()
        .await?;

        // A candidate id surfacing twice in one fetch is considered once,
        // keeping its first arrival position.
        let mut seen_ids = HashSet::new();
        let eligible: Vec<Candidate> = enriched
            .into_iter()
            .flatten()
            .filter(|candidate| seen_ids.insert(candidate.profile.id))
            .collect();

        let winner = match ranker::select_best(eligible) {
            Some(candidate) => candidate,
            None => {
                tracing::info!(viewer = %viewer_id, "no new recommendations");
                return Err(RecommendError::NoNewRecommendations);
            }
        };

        // The only state transition this core performs: remember the winner
        // so it is never proposed to this viewer again.
        self.displayed.record(viewer_id, winner.profile.id).await?;

        tracing::info!(
            viewer = %viewer_id,
            winner = %winner.profile.id,
            score = winner.score,
            "recommendation selected"
        );

        Ok(Recommendation::from(winner))
    }

    /// Enrich one candidate with its images, interests, and preference,
    /// returning `None` when a gate drops it before scoring.
    async fn enrich_and_score(
        &self,
        profile: Profile,
        viewer: &Profile,
        preference: &Preference,
        viewer_interests: &[String],
        shown: &HashSet<Uuid>,
    ) -> Result<Option<Candidate>, StoreError> {
        let (images, interests, candidate_preference) = tokio::try_join!(
            self.profiles.get_images(profile.id),
            self.profiles.get_interests(profile.id),
            self.profiles.get_preference(profile.id),
        )?;

        // Mutual desired-city gate, evaluated on each side's preference.
        if candidate_preference.desired_city != preference.desired_city {
            return Ok(None);
        }

        if shown.contains(&profile.id) {
            return Ok(None);
        }

        let age_distance = scoring::age_distance(viewer.age, profile.age);
        let interest_overlap = scoring::interest_overlap(viewer_interests, &interests);
        let score = scoring::composite_score(age_distance, interest_overlap);

        Ok(Some(Candidate {
            profile,
            images,
            interests,
            age_distance,
            interest_overlap,
            score,
        }))
    }
}
