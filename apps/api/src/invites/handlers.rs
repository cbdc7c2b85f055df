use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::handlers::HrAdminQuery;
use crate::access::permissions::{granting_candidates, require_hr_admin};
use crate::errors::AppError;
use crate::invites::service::{
    list_invites, outstanding_invites, reinvite, send_invite, InviteContext,
};
use crate::models::invite::SentInviteRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub hr_admin_id: Uuid,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ReinviteRequest {
    pub hr_admin_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct InviteListResponse {
    pub invites: Vec<SentInviteRow>,
    /// Invites whose recipient has not yet granted access.
    pub pending: Vec<SentInviteRow>,
}

fn invite_context(state: &AppState) -> InviteContext<'_> {
    InviteContext {
        pool: &state.db,
        cache: state.cache.as_ref(),
        email: state.email.as_ref(),
        app_base_url: &state.config.app_base_url,
    }
}

/// POST /api/v1/invites
pub async fn handle_send_invite(
    State(state): State<AppState>,
    Json(req): Json<InviteRequest>,
) -> Result<(StatusCode, Json<SentInviteRow>), AppError> {
    let admin = require_hr_admin(&state.db, req.hr_admin_id).await?;
    let invite = send_invite(&invite_context(&state), &admin, &req.email).await?;
    Ok((StatusCode::CREATED, Json(invite)))
}

/// POST /api/v1/invites/:id/resend
pub async fn handle_reinvite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReinviteRequest>,
) -> Result<Json<SentInviteRow>, AppError> {
    let admin = require_hr_admin(&state.db, req.hr_admin_id).await?;
    let invite = reinvite(&invite_context(&state), &admin, id).await?;
    Ok(Json(invite))
}

/// GET /api/v1/invites
pub async fn handle_list_invites(
    State(state): State<AppState>,
    Query(params): Query<HrAdminQuery>,
) -> Result<Json<InviteListResponse>, AppError> {
    require_hr_admin(&state.db, params.hr_admin_id).await?;
    let invites = list_invites(&state.db, state.cache.as_ref(), params.hr_admin_id).await?;
    let granted = granting_candidates(&state.db, params.hr_admin_id).await?;
    let pending = outstanding_invites(&invites, &granted);
    Ok(Json(InviteListResponse { invites, pending }))
}
