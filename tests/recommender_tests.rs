// Recommendation pipeline tests with in-memory store doubles

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use ember_algo::core::recommender::{
    DisplayedStore, ProfileStore, RecommendError, Recommender, StoreError,
};
use ember_algo::models::{Preference, Profile};

#[derive(Default)]
struct InMemoryProfileStore {
    profiles: HashMap<Uuid, Profile>,
    preferences: HashMap<Uuid, Preference>,
    interests: HashMap<Uuid, Vec<String>>,
    images: HashMap<Uuid, Vec<String>>,
    fail_images_for: Option<Uuid>,
}

impl InMemoryProfileStore {
    fn add_user(&mut self, profile: &Profile, preference: Preference, interests: &[&str]) {
        self.profiles.insert(profile.id, profile.clone());
        self.preferences.insert(profile.id, preference);
        self.interests.insert(
            profile.id,
            interests.iter().map(|s| s.to_string()).collect(),
        );
        self.images
            .insert(profile.id, vec![format!("img-{}", profile.name)]);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Profile, StoreError> {
        self.profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile not found for user {}", id)))
    }

    async fn get_preference(&self, id: Uuid) -> Result<Preference, StoreError> {
        self.preferences
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("preference not found for user {}", id)))
    }

    async fn get_interests(&self, id: Uuid) -> Result<Vec<String>, StoreError> {
        Ok(self.interests.get(&id).cloned().unwrap_or_default())
    }

    async fn get_images(&self, id: Uuid) -> Result<Vec<String>, StoreError> {
        if self.fail_images_for == Some(id) {
            return Err(StoreError::NotFound(format!(
                "images unavailable for {}",
                id
            )));
        }
        Ok(self.images.get(&id).cloned().unwrap_or_default())
    }

    async fn fetch_candidates(
        &self,
        min_age: i32,
        max_age: i32,
        _gender_id: i32,
        exclude_id: Uuid,
    ) -> Result<Vec<Profile>, StoreError> {
        // Age bounds are strict on both sides, as in the production query.
        let mut candidates: Vec<Profile> = self
            .profiles
            .values()
            .filter(|p| p.id != exclude_id)
            .filter(|p| p.age > min_age && p.age < max_age)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(candidates)
    }
}

#[derive(Default)]
struct InMemoryDisplayedStore {
    sets: Mutex<HashMap<Uuid, HashSet<Uuid>>>,
    record_calls: AtomicUsize,
}

#[async_trait]
impl DisplayedStore for InMemoryDisplayedStore {
    async fn shown(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>, StoreError> {
        let sets = self.sets.lock().await;
        Ok(sets.get(&viewer_id).cloned().unwrap_or_default())
    }

    async fn record(&self, viewer_id: Uuid, candidate_id: Uuid) -> Result<(), StoreError> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        let mut sets = self.sets.lock().await;
        sets.entry(viewer_id).or_default().insert(candidate_id);
        Ok(())
    }
}

fn profile(name: &str, age: i32) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        name: name.to_string(),
        age,
        gender: "female".to_string(),
        city: "Pune".to_string(),
        country: "India".to_string(),
    }
}

fn preference(min_age: i32, max_age: i32, desired_city: &str) -> Preference {
    Preference {
        min_age,
        max_age,
        gender_id: 2,
        desired_city: desired_city.to_string(),
    }
}

fn recommender(
    profiles: InMemoryProfileStore,
    displayed: Arc<InMemoryDisplayedStore>,
) -> Recommender {
    Recommender::new(Arc::new(profiles), displayed, 4)
}

#[tokio::test]
async fn test_empty_pool_yields_no_new_recommendations() {
    let viewer = profile("viewer", 22);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &["chess"]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed.clone());

    let result = recommender.recommend(viewer.id).await;

    assert!(matches!(result, Err(RecommendError::NoNewRecommendations)));
    assert_eq!(displayed.record_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_winner_has_minimum_composite_score() {
    let viewer = profile("viewer", 22);
    let overlap_two = profile("asha", 21);
    let overlap_none = profile("bela", 21);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &["music", "travel"]);
    profiles.add_user(&overlap_two, preference(18, 30, "Pune"), &["music", "travel"]);
    profiles.add_user(&overlap_none, preference(18, 30, "Pune"), &[]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed);

    let recommendation = recommender.recommend(viewer.id).await.unwrap();

    // Scores: asha = 1 + 2*2 = 5, bela = 1 + 0 = 1. Lower wins.
    assert_eq!(recommendation.id, overlap_none.id);
    assert_eq!(recommendation.name, "bela");
    assert_eq!(recommendation.images, vec!["img-bela".to_string()]);
}

#[tokio::test]
async fn test_record_called_once_with_winner_id() {
    let viewer = profile("viewer", 22);
    let candidate = profile("asha", 24);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &["chess"]);
    profiles.add_user(&candidate, preference(18, 30, "Pune"), &["chess"]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed.clone());

    let recommendation = recommender.recommend(viewer.id).await.unwrap();

    assert_eq!(displayed.record_calls.load(Ordering::SeqCst), 1);

    let sets = displayed.sets.lock().await;
    let shown = sets.get(&viewer.id).unwrap();
    assert_eq!(shown.len(), 1);
    assert!(shown.contains(&recommendation.id));
}

#[tokio::test]
async fn test_city_mismatch_excluded_regardless_of_score() {
    let viewer = profile("viewer", 22);
    // Perfect score (age gap 0, no overlap) but wants a different city.
    let wrong_city = profile("asha", 22);
    let right_city = profile("bela", 23);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &[]);
    profiles.add_user(&wrong_city, preference(18, 30, "Delhi"), &[]);
    profiles.add_user(&right_city, preference(18, 30, "Pune"), &[]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed);

    let recommendation = recommender.recommend(viewer.id).await.unwrap();

    assert_eq!(recommendation.id, right_city.id);
}

#[tokio::test]
async fn test_only_city_mismatches_is_empty_result() {
    let viewer = profile("viewer", 22);
    let wrong_city = profile("asha", 22);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &[]);
    profiles.add_user(&wrong_city, preference(18, 30, "Delhi"), &[]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed);

    let result = recommender.recommend(viewer.id).await;

    assert!(matches!(result, Err(RecommendError::NoNewRecommendations)));
}

#[tokio::test]
async fn test_shown_candidates_never_repeat() {
    let viewer = profile("viewer", 22);
    let first = profile("asha", 23);
    let second = profile("bela", 25);
    let third = profile("chitra", 27);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &[]);
    profiles.add_user(&first, preference(18, 30, "Pune"), &[]);
    profiles.add_user(&second, preference(18, 30, "Pune"), &[]);
    profiles.add_user(&third, preference(18, 30, "Pune"), &[]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed.clone());

    let mut winners = HashSet::new();
    for _ in 0..3 {
        let recommendation = recommender.recommend(viewer.id).await.unwrap();
        winners.insert(recommendation.id);
    }

    // Three successes, three distinct winners, exclusion set of exactly three.
    assert_eq!(winners.len(), 3);
    assert_eq!(displayed.record_calls.load(Ordering::SeqCst), 3);
    {
        let sets = displayed.sets.lock().await;
        assert_eq!(sets.get(&viewer.id).unwrap().len(), 3);
    }

    // The pool is exhausted now.
    let result = recommender.recommend(viewer.id).await;
    assert!(matches!(result, Err(RecommendError::NoNewRecommendations)));
}

#[tokio::test]
async fn test_viewer_never_recommended_to_self() {
    let viewer = profile("viewer", 22);

    let mut profiles = InMemoryProfileStore::default();
    // The viewer matches their own filters; the fetch still excludes them.
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &["chess"]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed);

    let result = recommender.recommend(viewer.id).await;

    assert!(matches!(result, Err(RecommendError::NoNewRecommendations)));
}

#[tokio::test]
async fn test_age_bounds_are_strict() {
    let viewer = profile("viewer", 25);
    let at_min = profile("asha", 20);
    let at_max = profile("bela", 30);
    let inside = profile("chitra", 21);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(20, 30, "Pune"), &[]);
    profiles.add_user(&at_min, preference(20, 30, "Pune"), &[]);
    profiles.add_user(&at_max, preference(20, 30, "Pune"), &[]);
    profiles.add_user(&inside, preference(20, 30, "Pune"), &[]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed.clone());

    let recommendation = recommender.recommend(viewer.id).await.unwrap();
    assert_eq!(recommendation.id, inside.id);

    // Boundary ages were never eligible, so the pool is now empty.
    let result = recommender.recommend(viewer.id).await;
    assert!(matches!(result, Err(RecommendError::NoNewRecommendations)));
}

#[tokio::test]
async fn test_enrichment_failure_aborts_whole_call() {
    let viewer = profile("viewer", 22);
    let healthy = profile("asha", 23);
    let broken = profile("bela", 24);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &[]);
    profiles.add_user(&healthy, preference(18, 30, "Pune"), &[]);
    profiles.add_user(&broken, preference(18, 30, "Pune"), &[]);
    profiles.fail_images_for = Some(broken.id);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = recommender(profiles, displayed.clone());

    let result = recommender.recommend(viewer.id).await;

    // One failing read fails the call; the healthy candidate is not
    // returned and nothing is recorded.
    assert!(matches!(result, Err(RecommendError::Store(_))));
    assert_eq!(displayed.record_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_duplicate_record_is_idempotent() {
    let displayed = InMemoryDisplayedStore::default();
    let viewer = Uuid::new_v4();
    let candidate = Uuid::new_v4();

    let (first, second) = tokio::join!(
        displayed.record(viewer, candidate),
        displayed.record(viewer, candidate),
    );
    first.unwrap();
    second.unwrap();

    let sets = displayed.sets.lock().await;
    assert_eq!(sets.get(&viewer).unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_calls_for_same_viewer_keep_set_consistent() {
    let viewer = profile("viewer", 22);
    let candidate = profile("asha", 23);

    let mut profiles = InMemoryProfileStore::default();
    profiles.add_user(&viewer, preference(18, 30, "Pune"), &[]);
    profiles.add_user(&candidate, preference(18, 30, "Pune"), &[]);

    let displayed = Arc::new(InMemoryDisplayedStore::default());
    let recommender = Arc::new(recommender(profiles, displayed.clone()));

    // Both calls may race on shown/record; at worst the same candidate is
    // shown twice, but the exclusion set never holds duplicates.
    let (first, second) = tokio::join!(
        recommender.recommend(viewer.id),
        recommender.recommend(viewer.id),
    );

    assert!(first.is_ok() || second.is_ok());

    let sets = displayed.sets.lock().await;
    let shown = sets.get(&viewer.id).unwrap();
    assert_eq!(shown.len(), 1);
    assert!(shown.contains(&candidate.id));
}
