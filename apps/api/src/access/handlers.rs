use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::permissions::{
    grant, granted_admins, granting_candidates, list_hr_admins, require_hr_admin, revoke,
};
use crate::errors::AppError;
use crate::models::profile::{HrAdminProfileRow, PermissionRow, UserProfileRow};
use crate::records::handlers::UserIdQuery;
use crate::records::store::require_profile;
use crate::records::validation::is_valid_email;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct HrAdminQuery {
    pub hr_admin_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub user_id: Uuid,
    pub hr_admin_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HrProfileRequest {
    pub hr_admin_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub phone: Option<String>,
}

/// POST /api/v1/permissions
pub async fn handle_grant(
    State(state): State<AppState>,
    Json(req): Json<PermissionRequest>,
) -> Result<Json<PermissionRow>, AppError> {
    require_profile(&state.db, req.user_id).await?;
    Ok(Json(grant(&state.db, req.user_id, req.hr_admin_id).await?))
}

/// DELETE /api/v1/permissions
pub async fn handle_revoke(
    State(state): State<AppState>,
    Json(req): Json<PermissionRequest>,
) -> Result<StatusCode, AppError> {
    if revoke(&state.db, req.user_id, req.hr_admin_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "No access grant from {} to {}",
            req.user_id, req.hr_admin_id
        )))
    }
}

/// GET /api/v1/permissions
///
/// HR admins the candidate has granted access to.
pub async fn handle_list_granted(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<HrAdminProfileRow>>, AppError> {
    Ok(Json(granted_admins(&state.db, params.user_id).await?))
}

/// GET /api/v1/hr/admins
pub async fn handle_list_hr_admins(
    State(state): State<AppState>,
) -> Result<Json<Vec<HrAdminProfileRow>>, AppError> {
    Ok(Json(list_hr_admins(&state.db).await?))
}

/// GET /api/v1/hr/candidates
///
/// Candidates who granted this admin access.
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(params): Query<HrAdminQuery>,
) -> Result<Json<Vec<UserProfileRow>>, AppError> {
    require_hr_admin(&state.db, params.hr_admin_id).await?;
    Ok(Json(granting_candidates(&state.db, params.hr_admin_id).await?))
}

/// GET /api/v1/hr/profile
pub async fn handle_get_hr_profile(
    State(state): State<AppState>,
    Query(params): Query<HrAdminQuery>,
) -> Result<Json<HrAdminProfileRow>, AppError> {
    Ok(Json(require_hr_admin(&state.db, params.hr_admin_id).await?))
}

/// PUT /api/v1/hr/profile
pub async fn handle_put_hr_profile(
    State(state): State<AppState>,
    Json(req): Json<HrProfileRequest>,
) -> Result<Json<HrAdminProfileRow>, AppError> {
    if !is_valid_email(&req.email) {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            req.email
        )));
    }

    let row = sqlx::query_as::<_, HrAdminProfileRow>(
        r#"
        INSERT INTO hr_admin_profiles (id, email, first_name, last_name, company, job_title, phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            company = EXCLUDED.company,
            job_title = EXCLUDED.job_title,
            phone = EXCLUDED.phone,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(req.hr_admin_id)
    .bind(req.email.trim())
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.company)
    .bind(&req.job_title)
    .bind(&req.phone)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Upserted HR admin profile {}", row.id);
    Ok(Json(row))
}
