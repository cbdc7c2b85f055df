//! Current-step resolution.
//!
//! Source priority: the `assessment_status` row, then the cache key
//! `assessmentCurrentStep_<id>`, then `NotStarted`. A malformed value at one
//! source is skipped; resolution itself never fails.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::assessment::steps::AssessmentStep;
use crate::cache::{step_key, StateCache};
use crate::models::assessment::AssessmentStatusRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSource {
    Database,
    Cache,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedStep {
    pub step: AssessmentStep,
    pub source: StepSource,
}

pub fn resolve_step(status: Option<&AssessmentStatusRow>, cached: Option<&str>) -> ResolvedStep {
    if let Some(step) = status.and_then(|s| AssessmentStep::from_stored(s.current_step as i64)) {
        return ResolvedStep {
            step,
            source: StepSource::Database,
        };
    }
    if let Some(step) = cached.and_then(AssessmentStep::parse_stored) {
        return ResolvedStep {
            step,
            source: StepSource::Cache,
        };
    }
    ResolvedStep {
        step: AssessmentStep::NotStarted,
        source: StepSource::Default,
    }
}

pub async fn get_status(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<AssessmentStatusRow>, sqlx::Error> {
    sqlx::query_as::<_, AssessmentStatusRow>("SELECT * FROM assessment_status WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Status rows for many candidates at once, keyed by user id.
pub async fn get_statuses(
    pool: &PgPool,
    user_ids: &[Uuid],
) -> Result<HashMap<Uuid, AssessmentStatusRow>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, AssessmentStatusRow>(
        "SELECT * FROM assessment_status WHERE user_id = ANY($1)",
    )
    .bind(user_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| (r.user_id, r)).collect())
}

/// Resolves a step given an already-loaded status row. The cache is only
/// consulted when the row is missing or unusable.
pub async fn resolve_with_cache(
    cache: &dyn StateCache,
    user_id: Uuid,
    status: Option<&AssessmentStatusRow>,
) -> ResolvedStep {
    let resolved = resolve_step(status, None);
    if resolved.source == StepSource::Database {
        return resolved;
    }
    let cached = match cache.get(&step_key(user_id)).await {
        Ok(v) => v,
        Err(e) => {
            warn!("Step cache read failed for {user_id}: {e}");
            None
        }
    };
    resolve_step(status, cached.as_deref())
}

pub async fn current_step(
    pool: &PgPool,
    cache: &dyn StateCache,
    user_id: Uuid,
) -> Result<(ResolvedStep, Option<AssessmentStatusRow>), sqlx::Error> {
    let status = get_status(pool, user_id).await?;
    let resolved = resolve_with_cache(cache, user_id, status.as_ref()).await;
    Ok((resolved, status))
}

/// Step to store when a candidate's status row is first created. With no
/// row, readers see the cached step, so the new row must start from it too.
pub async fn seed_step(cache: &dyn StateCache, user_id: Uuid) -> AssessmentStep {
    resolve_with_cache(cache, user_id, None).await.step
}

/// Mirrors a committed step into the cache. Failures are logged and dropped.
pub async fn cache_step(cache: &dyn StateCache, user_id: Uuid, step: AssessmentStep) {
    let value = step.to_stored().to_string();
    if let Err(e) = cache.set(&step_key(user_id), &value).await {
        warn!("Step cache write failed for {user_id}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::cache::memory::MemoryStateCache;

    fn status(current_step: i32) -> AssessmentStatusRow {
        AssessmentStatusRow {
            user_id: Uuid::nil(),
            current_step,
            final_decision: None,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_database_wins_over_cache() {
        let row = status(4);
        let r = resolve_step(Some(&row), Some("2"));
        assert_eq!(r.step.index(), 3);
        assert_eq!(r.source, StepSource::Database);
    }

    #[test]
    fn test_cache_used_without_row() {
        let r = resolve_step(None, Some("3"));
        assert_eq!(r.step.index(), 2);
        assert_eq!(r.source, StepSource::Cache);
    }

    #[test]
    fn test_malformed_row_falls_through_to_cache() {
        let row = status(42);
        let r = resolve_step(Some(&row), Some("2"));
        assert_eq!(r.step, AssessmentStep::ConditionalOffer);
        assert_eq!(r.source, StepSource::Cache);
    }

    #[test]
    fn test_defaults_to_not_started() {
        let r = resolve_step(None, Some("garbage"));
        assert_eq!(r.step, AssessmentStep::NotStarted);
        assert_eq!(r.source, StepSource::Default);
        assert_eq!(resolve_step(None, None).source, StepSource::Default);
    }

    #[tokio::test]
    async fn test_cache_round_trip_three_reads_index_two() {
        let cache = MemoryStateCache::default();
        let user_id = Uuid::new_v4();
        cache.set(&step_key(user_id), "3").await.unwrap();
        let r = resolve_with_cache(&cache, user_id, None).await;
        assert_eq!(r.step.index(), 2);
    }

    #[tokio::test]
    async fn test_cache_step_writes_stored_value() {
        let cache = MemoryStateCache::default();
        let user_id = Uuid::new_v4();
        cache_step(&cache, user_id, AssessmentStep::PreliminaryRevocation).await;
        assert_eq!(
            cache.get(&step_key(user_id)).await.unwrap().as_deref(),
            Some("4")
        );
        let r = resolve_with_cache(&cache, user_id, None).await;
        assert_eq!(r.step, AssessmentStep::PreliminaryRevocation);
    }

    #[tokio::test]
    async fn test_row_skips_cache_lookup() {
        let cache = MemoryStateCache::default();
        let user_id = Uuid::new_v4();
        cache.set(&step_key(user_id), "6").await.unwrap();
        let row = status(1);
        let r = resolve_with_cache(&cache, user_id, Some(&row)).await;
        assert_eq!(r.step, AssessmentStep::NotStarted);
        assert_eq!(r.source, StepSource::Database);
    }
}
