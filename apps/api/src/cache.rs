//! Best-effort key/value cache for client-visible workflow state.
//!
//! Holds the per-candidate step counter (`assessmentCurrentStep_<id>`) and the
//! per-admin sent-invite list (`hr_sent_invites_<id>`). PostgreSQL is always
//! the source of truth; callers log and ignore cache failures.

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use uuid::Uuid;

const STEP_KEY_PREFIX: &str = "assessmentCurrentStep_";
const INVITES_KEY_PREFIX: &str = "hr_sent_invites_";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub fn step_key(user_id: Uuid) -> String {
    format!("{STEP_KEY_PREFIX}{user_id}")
}

pub fn invites_key(hr_admin_id: Uuid) -> String {
    format!("{INVITES_KEY_PREFIX}{hr_admin_id}")
}

/// String-valued cache seam. Carried in `AppState` as `Arc<dyn StateCache>`.
#[async_trait]
pub trait StateCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Redis-backed cache. Opens a multiplexed connection per call.
pub struct RedisStateCache {
    client: redis::Client,
}

impl RedisStateCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StateCache for RedisStateCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            step_key(id),
            "assessmentCurrentStep_00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_invites_key_is_per_admin() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(invites_key(a), invites_key(b));
        assert!(invites_key(a).starts_with("hr_sent_invites_"));
    }
}
