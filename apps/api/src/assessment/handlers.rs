use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::handlers::HrAdminQuery;
use crate::access::permissions::{require_hr_admin, require_permission};
use crate::assessment::classification::{classify, Bucket};
use crate::assessment::steps::{step_name, AssessmentStep, FinalDecision, STEP_NAMES};
use crate::assessment::tracker::{current_step, StepSource};
use crate::assessment::transitions::{advance, get_history, record_final_decision};
use crate::documents::notices::NoticeKind;
use crate::errors::AppError;
use crate::models::assessment::AssessmentTransitionRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StepInfo {
    pub index: usize,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AssessmentView {
    pub user_id: Uuid,
    pub step_index: u8,
    pub step_name: &'static str,
    pub source: StepSource,
    pub final_decision: Option<String>,
    pub bucket: Bucket,
    pub next_step: Option<StepInfo>,
    /// Notice that must be issued to reach `next_step`.
    pub next_notice: Option<NoticeKind>,
    pub history: Vec<AssessmentTransitionRow>,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub hr_admin_id: Uuid,
    /// 0-based index of the step to move to.
    pub to_step: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinalDecisionRequest {
    pub hr_admin_id: Uuid,
    pub decision: FinalDecision,
    pub note: Option<String>,
}

/// GET /api/v1/assessments/steps
pub async fn handle_list_steps() -> Json<Vec<StepInfo>> {
    Json(
        (0..STEP_NAMES.len())
            .map(|index| StepInfo {
                index,
                name: step_name(index as i64),
            })
            .collect(),
    )
}

async fn load_view(state: &AppState, user_id: Uuid) -> Result<AssessmentView, AppError> {
    let (resolved, status) = current_step(&state.db, state.cache.as_ref(), user_id).await?;
    let final_decision = status.and_then(|s| s.final_decision);
    let history = get_history(&state.db, user_id).await?;
    let step = resolved.step;

    Ok(AssessmentView {
        user_id,
        step_index: step.index(),
        step_name: step.name(),
        source: resolved.source,
        bucket: classify(step, final_decision.as_deref()),
        next_step: step.next().map(|s| StepInfo {
            index: s.index() as usize,
            name: s.name(),
        }),
        next_notice: step.next().and_then(NoticeKind::for_step),
        final_decision,
        history,
    })
}

/// GET /api/v1/assessments/:user_id
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<HrAdminQuery>,
) -> Result<Json<AssessmentView>, AppError> {
    require_hr_admin(&state.db, params.hr_admin_id).await?;
    require_permission(&state.db, user_id, params.hr_admin_id).await?;
    Ok(Json(load_view(&state, user_id).await?))
}

/// POST /api/v1/assessments/:user_id/advance
pub async fn handle_advance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<AssessmentView>, AppError> {
    let to = AssessmentStep::from_index(req.to_step)
        .ok_or_else(|| AppError::Validation(format!("to_step {} is out of range", req.to_step)))?;
    require_hr_admin(&state.db, req.hr_admin_id).await?;
    require_permission(&state.db, user_id, req.hr_admin_id).await?;

    advance(
        &state.db,
        state.cache.as_ref(),
        user_id,
        req.hr_admin_id,
        to,
        req.note.as_deref(),
    )
    .await?;
    Ok(Json(load_view(&state, user_id).await?))
}

/// POST /api/v1/assessments/:user_id/final-decision
pub async fn handle_final_decision(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<FinalDecisionRequest>,
) -> Result<Json<AssessmentView>, AppError> {
    require_hr_admin(&state.db, req.hr_admin_id).await?;
    require_permission(&state.db, user_id, req.hr_admin_id).await?;

    record_final_decision(
        &state.db,
        state.cache.as_ref(),
        user_id,
        req.hr_admin_id,
        req.decision,
        req.note.as_deref(),
    )
    .await?;
    Ok(Json(load_view(&state, user_id).await?))
}
