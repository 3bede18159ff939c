use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::core::recommender::{DisplayedStore, StoreError};

/// Redis-backed exclusion tracker
///
/// One set per viewer under `displayed_user_ids:<viewerId>`. Members only
/// grow; SADD keeps `record` idempotent, so a concurrent retry with the
/// same id is a no-op.
pub struct RedisDisplayedStore {
    // Store ConnectionManager in a Mutex for interior mutability
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
}

impl RedisDisplayedStore {
    /// Create a new store from a Redis URL
    pub async fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
        })
    }

    /// Set key holding a viewer's displayed candidate ids
    pub fn key(viewer_id: Uuid) -> String {
        format!("displayed_user_ids:{}", viewer_id)
    }
}

#[async_trait]
impl DisplayedStore for RedisDisplayedStore {
    async fn shown(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>, StoreError> {
        let mut conn = self.redis.lock().await;
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(Self::key(viewer_id))
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        let mut shown = HashSet::with_capacity(members.len());
        for member in members {
            shown.insert(Uuid::parse_str(&member)?);
        }

        tracing::trace!(viewer = %viewer_id, shown = shown.len(), "fetched displayed set");

        Ok(shown)
    }

    async fn record(&self, viewer_id: Uuid, candidate_id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.redis.lock().await;
        redis::cmd("SADD")
            .arg(Self::key(viewer_id))
            .arg(candidate_id.to_string())
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        tracing::debug!(viewer = %viewer_id, candidate = %candidate_id, "recorded displayed candidate");

        Ok(())
    }
}
