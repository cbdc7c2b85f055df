use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::UserProfileRow;
use crate::models::record::RecordEntryRow;
use crate::records::sections::RecordSection;

/// Writable candidate profile fields.
pub struct ProfileUpdate<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionEntries {
    pub section: RecordSection,
    pub label: &'static str,
    pub entries: Vec<RecordEntryRow>,
}

pub async fn get_profile(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, UserProfileRow>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn require_profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfileRow, AppError> {
    get_profile(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {user_id} not found")))
}

pub async fn upsert_profile(
    pool: &PgPool,
    update: ProfileUpdate<'_>,
) -> Result<UserProfileRow, sqlx::Error> {
    let row = sqlx::query_as::<_, UserProfileRow>(
        r#"
        INSERT INTO user_profiles (id, email, first_name, last_name, phone)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            phone = EXCLUDED.phone,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(update.id)
    .bind(update.email.trim())
    .bind(update.first_name)
    .bind(update.last_name)
    .bind(update.phone)
    .fetch_one(pool)
    .await?;

    info!("Upserted profile {}", row.id);
    Ok(row)
}

pub async fn list_entries(
    pool: &PgPool,
    section: RecordSection,
    user_id: Uuid,
) -> Result<Vec<RecordEntryRow>, sqlx::Error> {
    // Table names come from the closed `RecordSection` set, never from input.
    let sql = format!(
        "SELECT id, user_id, data, created_at, updated_at FROM {} WHERE user_id = $1 ORDER BY created_at ASC",
        section.table()
    );
    sqlx::query_as::<_, RecordEntryRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Every section, in display order, including empty ones.
pub async fn get_record(pool: &PgPool, user_id: Uuid) -> Result<Vec<SectionEntries>, sqlx::Error> {
    let mut record = Vec::with_capacity(RecordSection::ALL.len());
    for section in RecordSection::ALL {
        let entries = list_entries(pool, section, user_id).await?;
        record.push(SectionEntries {
            section,
            label: section.label(),
            entries,
        });
    }
    Ok(record)
}

/// Inserts a new entry. Singleton sections are upserted on `user_id` instead.
pub async fn create_entry(
    pool: &PgPool,
    section: RecordSection,
    user_id: Uuid,
    data: Value,
) -> Result<RecordEntryRow, AppError> {
    let data = section.normalize(data)?;

    let sql = if section.is_singleton() {
        format!(
            r#"
            INSERT INTO {} (id, user_id, data) VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            RETURNING id, user_id, data, created_at, updated_at
            "#,
            section.table()
        )
    } else {
        format!(
            "INSERT INTO {} (id, user_id, data) VALUES ($1, $2, $3) RETURNING id, user_id, data, created_at, updated_at",
            section.table()
        )
    };

    let row = sqlx::query_as::<_, RecordEntryRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&data)
        .fetch_one(pool)
        .await?;

    info!("Saved {section} entry {} for user {user_id}", row.id);
    Ok(row)
}

pub async fn update_entry(
    pool: &PgPool,
    section: RecordSection,
    user_id: Uuid,
    entry_id: Uuid,
    data: Value,
) -> Result<RecordEntryRow, AppError> {
    let data = section.normalize(data)?;

    let sql = format!(
        r#"
        UPDATE {} SET data = $1, updated_at = now()
        WHERE id = $2 AND user_id = $3
        RETURNING id, user_id, data, created_at, updated_at
        "#,
        section.table()
    );

    sqlx::query_as::<_, RecordEntryRow>(&sql)
        .bind(&data)
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{section} entry {entry_id} not found")))
}

pub async fn delete_entry(
    pool: &PgPool,
    section: RecordSection,
    user_id: Uuid,
    entry_id: Uuid,
) -> Result<(), AppError> {
    let sql = format!(
        "DELETE FROM {} WHERE id = $1 AND user_id = $2",
        section.table()
    );
    let result = sqlx::query(&sql)
        .bind(entry_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "{section} entry {entry_id} not found"
        )));
    }
    info!("Deleted {section} entry {entry_id} for user {user_id}");
    Ok(())
}
