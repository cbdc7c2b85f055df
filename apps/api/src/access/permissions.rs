use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{HrAdminProfileRow, PermissionRow, UserProfileRow};

pub async fn get_hr_admin(
    pool: &PgPool,
    hr_admin_id: Uuid,
) -> Result<Option<HrAdminProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, HrAdminProfileRow>("SELECT * FROM hr_admin_profiles WHERE id = $1")
        .bind(hr_admin_id)
        .fetch_optional(pool)
        .await
}

/// Resolves the caller as a known HR admin.
pub async fn require_hr_admin(
    pool: &PgPool,
    hr_admin_id: Uuid,
) -> Result<HrAdminProfileRow, AppError> {
    get_hr_admin(pool, hr_admin_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

pub async fn has_permission(
    pool: &PgPool,
    user_id: Uuid,
    hr_admin_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM user_hr_permissions WHERE user_id = $1 AND hr_admin_id = $2)",
    )
    .bind(user_id)
    .bind(hr_admin_id)
    .fetch_one(pool)
    .await
}

/// Fails with `Forbidden` unless the candidate has granted this admin access.
pub async fn require_permission(
    pool: &PgPool,
    user_id: Uuid,
    hr_admin_id: Uuid,
) -> Result<(), AppError> {
    if has_permission(pool, user_id, hr_admin_id).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Idempotent: re-granting keeps the original `granted_at`.
pub async fn grant(
    pool: &PgPool,
    user_id: Uuid,
    hr_admin_id: Uuid,
) -> Result<PermissionRow, AppError> {
    if get_hr_admin(pool, hr_admin_id).await?.is_none() {
        return Err(AppError::NotFound(format!("HR admin {hr_admin_id} not found")));
    }

    sqlx::query(
        "INSERT INTO user_hr_permissions (user_id, hr_admin_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(hr_admin_id)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, PermissionRow>(
        "SELECT * FROM user_hr_permissions WHERE user_id = $1 AND hr_admin_id = $2",
    )
    .bind(user_id)
    .bind(hr_admin_id)
    .fetch_one(pool)
    .await?;

    info!("Candidate {user_id} granted access to HR admin {hr_admin_id}");
    Ok(row)
}

/// Returns whether a grant existed.
pub async fn revoke(pool: &PgPool, user_id: Uuid, hr_admin_id: Uuid) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM user_hr_permissions WHERE user_id = $1 AND hr_admin_id = $2")
            .bind(user_id)
            .bind(hr_admin_id)
            .execute(pool)
            .await?;
    let removed = result.rows_affected() > 0;
    if removed {
        info!("Candidate {user_id} revoked access from HR admin {hr_admin_id}");
    }
    Ok(removed)
}

/// HR admins a candidate has granted access to.
pub async fn granted_admins(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<HrAdminProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, HrAdminProfileRow>(
        r#"
        SELECT a.*
        FROM hr_admin_profiles a
        JOIN user_hr_permissions p ON p.hr_admin_id = a.id
        WHERE p.user_id = $1
        ORDER BY p.granted_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Candidates who have granted an HR admin access.
pub async fn granting_candidates(
    pool: &PgPool,
    hr_admin_id: Uuid,
) -> Result<Vec<UserProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, UserProfileRow>(
        r#"
        SELECT u.*
        FROM user_profiles u
        JOIN user_hr_permissions p ON p.user_id = u.id
        WHERE p.hr_admin_id = $1
        ORDER BY p.granted_at ASC
        "#,
    )
    .bind(hr_admin_id)
    .fetch_all(pool)
    .await
}

pub async fn list_hr_admins(pool: &PgPool) -> Result<Vec<HrAdminProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, HrAdminProfileRow>(
        "SELECT * FROM hr_admin_profiles ORDER BY company NULLS LAST, last_name NULLS LAST, email",
    )
    .fetch_all(pool)
    .await
}
