use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::access::handlers::HrAdminQuery;
use crate::access::permissions::{require_hr_admin, require_permission};
use crate::errors::AppError;
use crate::models::profile::UserProfileRow;
use crate::models::record::RecordEntryRow;
use crate::records::completeness::{compute_completeness_report, CompletenessReport};
use crate::records::sections::RecordSection;
use crate::records::store::{
    create_entry, delete_entry, get_record, require_profile, update_entry, upsert_profile,
    ProfileUpdate, SectionEntries,
};
use crate::records::validation::is_valid_email;
use crate::records::wotc::{get_survey, submit_survey, WotcAnswers, WotcSurveyView};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub user_id: Uuid,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct WotcRequest {
    pub user_id: Uuid,
    pub answers: WotcAnswers,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub profile: UserProfileRow,
    pub sections: Vec<SectionEntries>,
    pub completeness: CompletenessReport,
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<UserProfileRow>, AppError> {
    Ok(Json(require_profile(&state.db, params.user_id).await?))
}

/// PUT /api/v1/profile
pub async fn handle_put_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<UserProfileRow>, AppError> {
    if !is_valid_email(&req.email) {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            req.email
        )));
    }
    let row = upsert_profile(
        &state.db,
        ProfileUpdate {
            id: req.user_id,
            email: &req.email,
            first_name: req.first_name.as_deref(),
            last_name: req.last_name.as_deref(),
            phone: req.phone.as_deref(),
        },
    )
    .await?;
    Ok(Json(row))
}

async fn load_record(state: &AppState, user_id: Uuid) -> Result<RecordResponse, AppError> {
    let profile = require_profile(&state.db, user_id).await?;
    let sections = get_record(&state.db, user_id).await?;
    let completeness = compute_completeness_report(&sections);
    Ok(RecordResponse {
        profile,
        sections,
        completeness,
    })
}

/// GET /api/v1/records
pub async fn handle_get_record(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<RecordResponse>, AppError> {
    Ok(Json(load_record(&state, params.user_id).await?))
}

/// GET /api/v1/records/completeness
pub async fn handle_record_completeness(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CompletenessReport>, AppError> {
    let sections = get_record(&state.db, params.user_id).await?;
    Ok(Json(compute_completeness_report(&sections)))
}

/// POST /api/v1/records/:section
pub async fn handle_create_entry(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Json(req): Json<EntryRequest>,
) -> Result<(StatusCode, Json<RecordEntryRow>), AppError> {
    let section: RecordSection = section.parse()?;
    require_profile(&state.db, req.user_id).await?;
    let row = create_entry(&state.db, section, req.user_id, req.data).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/records/:section/:id
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path((section, id)): Path<(String, Uuid)>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<RecordEntryRow>, AppError> {
    let section: RecordSection = section.parse()?;
    let row = update_entry(&state.db, section, req.user_id, id, req.data).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/records/:section/:id
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    Path((section, id)): Path<(String, Uuid)>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let section: RecordSection = section.parse()?;
    delete_entry(&state.db, section, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/hr/candidates/:user_id/record
///
/// HR view of a candidate's record. Requires a granted permission.
pub async fn handle_hr_get_record(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<HrAdminQuery>,
) -> Result<Json<RecordResponse>, AppError> {
    require_hr_admin(&state.db, params.hr_admin_id).await?;
    require_permission(&state.db, user_id, params.hr_admin_id).await?;
    Ok(Json(load_record(&state, user_id).await?))
}

/// POST /api/v1/wotc
pub async fn handle_submit_wotc(
    State(state): State<AppState>,
    Json(req): Json<WotcRequest>,
) -> Result<Json<WotcSurveyView>, AppError> {
    require_profile(&state.db, req.user_id).await?;
    let row = submit_survey(&state.db, req.user_id, &req.answers).await?;
    Ok(Json(WotcSurveyView::from_row(row)))
}

/// GET /api/v1/wotc
pub async fn handle_get_wotc(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<WotcSurveyView>, AppError> {
    let row = get_survey(&state.db, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No WOTC survey for user {}", params.user_id)))?;
    Ok(Json(WotcSurveyView::from_row(row)))
}
