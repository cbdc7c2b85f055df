//! Guarded step transitions with an audit trail.
//!
//! Legal moves: advance exactly one step at a time from `NotStarted` up to
//! `FinalRevocation`, then optionally record a final decision. `revoked` is
//! only legal once the final revocation notice is issued; `hired` is legal
//! from the conditional offer up to, but not after, that notice. Nothing
//! moves after a final decision.
//!
//! Each accepted transition updates `assessment_status` and appends to
//! `assessment_transitions` inside one transaction holding the status row lock.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::assessment::classification::has_final_decision;
use crate::assessment::steps::{AssessmentStep, FinalDecision};
use crate::assessment::tracker::{cache_step, seed_step};
use crate::cache::StateCache;
use crate::errors::AppError;
use crate::models::assessment::{AssessmentStatusRow, AssessmentTransitionRow};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a final decision ('{0}') is already recorded")]
    AlreadyDecided(String),

    #[error("cannot move from '{from}' to '{to}'; the next step is '{expected}'")]
    OutOfOrder {
        from: &'static str,
        to: &'static str,
        expected: &'static str,
    },

    #[error("'{0}' is the last step")]
    NoNextStep(&'static str),

    #[error("cannot return to 'Not Started'")]
    CannotReset,

    #[error("no notice has been issued yet")]
    NotStarted,

    #[error("revocation requires the Final Revocation Notice; current step is '{0}'")]
    RevocationTooEarly(&'static str),

    #[error("cannot hire after the Final Revocation Notice")]
    HireAfterFinalNotice,
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::InvalidTransition(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Advance,
    IssueNotice,
    FinalDecision,
}

impl TransitionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionAction::Advance => "advance",
            TransitionAction::IssueNotice => "issue_notice",
            TransitionAction::FinalDecision => "final_decision",
        }
    }
}

pub fn check_advance(
    current: AssessmentStep,
    final_decision: Option<&str>,
    to: AssessmentStep,
) -> Result<(), TransitionError> {
    if let Some(decision) = final_decision.filter(|_| has_final_decision(final_decision)) {
        return Err(TransitionError::AlreadyDecided(decision.trim().to_string()));
    }
    if to == AssessmentStep::NotStarted {
        return Err(TransitionError::CannotReset);
    }
    let expected = current
        .next()
        .ok_or(TransitionError::NoNextStep(current.name()))?;
    if to != expected {
        return Err(TransitionError::OutOfOrder {
            from: current.name(),
            to: to.name(),
            expected: expected.name(),
        });
    }
    Ok(())
}

pub fn check_final_decision(
    current: AssessmentStep,
    existing: Option<&str>,
    decision: FinalDecision,
) -> Result<(), TransitionError> {
    if let Some(existing) = existing.filter(|_| has_final_decision(existing)) {
        return Err(TransitionError::AlreadyDecided(existing.trim().to_string()));
    }
    match decision {
        FinalDecision::Hired if current == AssessmentStep::NotStarted => {
            Err(TransitionError::NotStarted)
        }
        FinalDecision::Hired if current.is_last() => Err(TransitionError::HireAfterFinalNotice),
        FinalDecision::Revoked if !current.is_last() => {
            Err(TransitionError::RevocationTooEarly(current.name()))
        }
        _ => Ok(()),
    }
}

/// Locks the candidate's status row, creating it at `seed` if missing.
async fn lock_status(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    seed: AssessmentStep,
) -> Result<AssessmentStatusRow, sqlx::Error> {
    sqlx::query(
        "INSERT INTO assessment_status (user_id, current_step) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(seed.to_stored())
    .execute(&mut **tx)
    .await?;

    sqlx::query_as::<_, AssessmentStatusRow>(
        "SELECT * FROM assessment_status WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await
}

async fn record_transition(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    hr_admin_id: Uuid,
    from: AssessmentStep,
    to: AssessmentStep,
    action: TransitionAction,
    note: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO assessment_transitions
            (id, user_id, hr_admin_id, from_step, to_step, action, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(hr_admin_id)
    .bind(from.index() as i32)
    .bind(to.index() as i32)
    .bind(action.as_str())
    .bind(note)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Advances inside a caller-owned transaction. Used directly by notice
/// issuance so the document row and the step move commit together.
pub async fn advance_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    cache: &dyn StateCache,
    user_id: Uuid,
    hr_admin_id: Uuid,
    to: AssessmentStep,
    action: TransitionAction,
    note: Option<&str>,
) -> Result<AssessmentStep, AppError> {
    let seed = seed_step(cache, user_id).await;
    let status = lock_status(tx, user_id, seed).await?;
    let current = AssessmentStep::from_stored(status.current_step as i64)
        .unwrap_or(AssessmentStep::NotStarted);

    check_advance(current, status.final_decision.as_deref(), to)?;

    sqlx::query(
        "UPDATE assessment_status SET current_step = $1, updated_by = $2, updated_at = now() WHERE user_id = $3",
    )
    .bind(to.to_stored())
    .bind(hr_admin_id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    record_transition(tx, user_id, hr_admin_id, current, to, action, note).await?;
    Ok(current)
}

pub async fn advance(
    pool: &PgPool,
    cache: &dyn StateCache,
    user_id: Uuid,
    hr_admin_id: Uuid,
    to: AssessmentStep,
    note: Option<&str>,
) -> Result<AssessmentStep, AppError> {
    let mut tx = pool.begin().await?;
    let from = advance_in_tx(
        &mut tx,
        cache,
        user_id,
        hr_admin_id,
        to,
        TransitionAction::Advance,
        note,
    )
    .await?;
    tx.commit().await?;

    info!(
        "Candidate {user_id} advanced from '{}' to '{}' by {hr_admin_id}",
        from.name(),
        to.name()
    );
    cache_step(cache, user_id, to).await;
    Ok(to)
}

pub async fn record_final_decision(
    pool: &PgPool,
    cache: &dyn StateCache,
    user_id: Uuid,
    hr_admin_id: Uuid,
    decision: FinalDecision,
    note: Option<&str>,
) -> Result<AssessmentStep, AppError> {
    let seed = seed_step(cache, user_id).await;
    let mut tx = pool.begin().await?;
    let status = lock_status(&mut tx, user_id, seed).await?;
    let current = AssessmentStep::from_stored(status.current_step as i64)
        .unwrap_or(AssessmentStep::NotStarted);

    check_final_decision(current, status.final_decision.as_deref(), decision)?;

    sqlx::query(
        "UPDATE assessment_status SET final_decision = $1, updated_by = $2, updated_at = now() WHERE user_id = $3",
    )
    .bind(decision.as_str())
    .bind(hr_admin_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    record_transition(
        &mut tx,
        user_id,
        hr_admin_id,
        current,
        current,
        TransitionAction::FinalDecision,
        Some(note.unwrap_or(decision.as_str())),
    )
    .await?;
    tx.commit().await?;

    info!(
        "Final decision '{}' recorded for candidate {user_id} at '{}' by {hr_admin_id}",
        decision.as_str(),
        current.name()
    );
    Ok(current)
}

pub async fn get_history(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<AssessmentTransitionRow>, sqlx::Error> {
    sqlx::query_as::<_, AssessmentTransitionRow>(
        "SELECT * FROM assessment_transitions WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::tracker::resolve_with_cache;
    use crate::cache::memory::MemoryStateCache;
    use crate::cache::step_key;
    use AssessmentStep::*;

    #[tokio::test]
    async fn test_new_row_seed_matches_advertised_step() {
        let cache = MemoryStateCache::default();
        let user_id = Uuid::new_v4();
        cache.set(&step_key(user_id), "4").await.unwrap();

        let viewed = resolve_with_cache(&cache, user_id, None).await.step;
        assert_eq!(viewed, PreliminaryRevocation);
        let seed = seed_step(&cache, user_id).await;
        assert_eq!(seed, viewed);
        assert!(check_advance(seed, None, IndividualReassessment).is_ok());
        assert!(check_advance(seed, None, ConditionalOffer).is_err());
    }

    #[tokio::test]
    async fn test_empty_cache_seeds_not_started() {
        let cache = MemoryStateCache::default();
        assert_eq!(seed_step(&cache, Uuid::new_v4()).await, NotStarted);
    }

    #[test]
    fn test_advance_one_step_at_a_time() {
        assert!(check_advance(NotStarted, None, ConditionalOffer).is_ok());
        assert!(check_advance(IndividualReassessment, None, FinalRevocation).is_ok());
    }

    #[test]
    fn test_advance_rejects_skip() {
        let err = check_advance(ConditionalOffer, None, PreliminaryRevocation).unwrap_err();
        assert!(matches!(err, TransitionError::OutOfOrder { expected, .. } if expected == "Individualized Assessment"));
    }

    #[test]
    fn test_advance_rejects_reverse_and_repeat() {
        assert!(check_advance(PreliminaryRevocation, None, ConditionalOffer).is_err());
        assert!(check_advance(PreliminaryRevocation, None, PreliminaryRevocation).is_err());
        assert_eq!(
            check_advance(PreliminaryRevocation, None, NotStarted),
            Err(TransitionError::CannotReset)
        );
    }

    #[test]
    fn test_advance_past_last_rejected() {
        assert_eq!(
            check_advance(FinalRevocation, None, FinalRevocation),
            Err(TransitionError::NoNextStep("Final Revocation Notice"))
        );
    }

    #[test]
    fn test_no_advance_after_decision() {
        assert_eq!(
            check_advance(ConditionalOffer, Some("hired"), IndividualizedAssessment),
            Err(TransitionError::AlreadyDecided("hired".to_string()))
        );
    }

    #[test]
    fn test_blank_decision_does_not_block() {
        assert!(check_advance(ConditionalOffer, Some(" "), IndividualizedAssessment).is_ok());
    }

    #[test]
    fn test_hire_requires_offer() {
        assert_eq!(
            check_final_decision(NotStarted, None, FinalDecision::Hired),
            Err(TransitionError::NotStarted)
        );
        assert!(check_final_decision(ConditionalOffer, None, FinalDecision::Hired).is_ok());
        assert!(check_final_decision(IndividualReassessment, None, FinalDecision::Hired).is_ok());
    }

    #[test]
    fn test_hire_rejected_after_final_notice() {
        assert_eq!(
            check_final_decision(FinalRevocation, None, FinalDecision::Hired),
            Err(TransitionError::HireAfterFinalNotice)
        );
    }

    #[test]
    fn test_revoke_only_after_final_notice() {
        assert!(matches!(
            check_final_decision(IndividualReassessment, None, FinalDecision::Revoked),
            Err(TransitionError::RevocationTooEarly(_))
        ));
        assert!(check_final_decision(FinalRevocation, None, FinalDecision::Revoked).is_ok());
    }

    #[test]
    fn test_second_decision_rejected() {
        assert!(matches!(
            check_final_decision(FinalRevocation, Some("revoked"), FinalDecision::Hired),
            Err(TransitionError::AlreadyDecided(_))
        ));
    }

    #[test]
    fn test_transition_error_maps_to_invalid_transition() {
        let app: AppError = TransitionError::CannotReset.into();
        assert!(matches!(app, AppError::InvalidTransition(_)));
    }
}
