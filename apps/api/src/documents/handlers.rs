use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::handlers::HrAdminQuery;
use crate::access::permissions::{require_hr_admin, require_permission};
use crate::assessment::steps::AssessmentStep;
use crate::documents::notices::Notice;
use crate::documents::store::{
    get_rendered, issue_notice, list_documents, IssueParams, RenderedNotice,
};
use crate::errors::AppError;
use crate::models::assessment::AssessmentDocumentRow;
use crate::records::handlers::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssueNoticeRequest {
    pub hr_admin_id: Uuid,
    pub notice: Notice,
    pub note: Option<String>,
}

fn step_from_path(index: i64) -> Result<AssessmentStep, AppError> {
    match AssessmentStep::from_index(index) {
        Some(AssessmentStep::NotStarted) | None => Err(AppError::NotFound(format!(
            "No notice exists for step {index}"
        ))),
        Some(step) => Ok(step),
    }
}

/// POST /api/v1/assessments/:user_id/notices
///
/// Issues the notice for the candidate's next step and advances the tracker.
pub async fn handle_issue_notice(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<IssueNoticeRequest>,
) -> Result<(StatusCode, Json<RenderedNotice>), AppError> {
    require_hr_admin(&state.db, req.hr_admin_id).await?;
    require_permission(&state.db, user_id, req.hr_admin_id).await?;

    let rendered = issue_notice(
        &state.db,
        state.cache.as_ref(),
        &state.s3,
        &state.config.s3_bucket,
        IssueParams {
            user_id,
            hr_admin_id: req.hr_admin_id,
            notice: &req.notice,
            note: req.note.as_deref(),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(rendered)))
}

/// GET /api/v1/assessments/:user_id/notices
pub async fn handle_list_notices(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<HrAdminQuery>,
) -> Result<Json<Vec<AssessmentDocumentRow>>, AppError> {
    require_hr_admin(&state.db, params.hr_admin_id).await?;
    require_permission(&state.db, user_id, params.hr_admin_id).await?;
    Ok(Json(list_documents(&state.db, user_id).await?))
}

/// GET /api/v1/assessments/:user_id/notices/:step
pub async fn handle_get_notice(
    State(state): State<AppState>,
    Path((user_id, step)): Path<(Uuid, i64)>,
    Query(params): Query<HrAdminQuery>,
) -> Result<Json<RenderedNotice>, AppError> {
    require_hr_admin(&state.db, params.hr_admin_id).await?;
    require_permission(&state.db, user_id, params.hr_admin_id).await?;
    let step = step_from_path(step)?;
    Ok(Json(get_rendered(&state.db, user_id, step).await?))
}

/// GET /api/v1/notices/:step
///
/// Candidate's own copy of a notice they received.
pub async fn handle_candidate_get_notice(
    State(state): State<AppState>,
    Path(step): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<RenderedNotice>, AppError> {
    let step = step_from_path(step)?;
    Ok(Json(get_rendered(&state.db, params.user_id, step).await?))
}

/// GET /api/v1/notices
pub async fn handle_candidate_list_notices(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<AssessmentDocumentRow>>, AppError> {
    Ok(Json(list_documents(&state.db, params.user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_from_path_bounds() {
        assert!(step_from_path(0).is_err());
        assert!(step_from_path(6).is_err());
        assert!(step_from_path(-2).is_err());
        assert_eq!(step_from_path(5).unwrap(), AssessmentStep::FinalRevocation);
    }
}
