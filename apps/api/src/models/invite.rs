use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SentInviteRow {
    pub id: Uuid,
    pub hr_admin_id: Uuid,
    pub email: String,
    /// `pending` | `sent` | `failed`
    pub status: String,
    pub last_error: Option<String>,
    pub send_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
