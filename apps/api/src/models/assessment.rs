use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// `current_step` is the 1-based stored value; see `assessment::steps`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentStatusRow {
    pub user_id: Uuid,
    pub current_step: i32,
    pub final_decision: Option<String>,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentTransitionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hr_admin_id: Uuid,
    pub from_step: i32,
    pub to_step: i32,
    pub action: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentDocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hr_admin_id: Uuid,
    pub step: i32,
    pub kind: String,
    pub fields: Value,
    pub s3_key: String,
    pub created_at: DateTime<Utc>,
}
