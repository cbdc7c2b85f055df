use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::assessment::steps::AssessmentStep;
use crate::assessment::tracker::cache_step;
use crate::assessment::transitions::{advance_in_tx, TransitionAction};
use crate::cache::StateCache;
use crate::documents::notices::{render_notice, Notice};
use crate::errors::AppError;
use crate::models::assessment::AssessmentDocumentRow;

#[derive(Debug, Serialize)]
pub struct RenderedNotice {
    pub document: AssessmentDocumentRow,
    pub markdown: String,
}

/// Parameters for issuing a notice.
pub struct IssueParams<'a> {
    pub user_id: Uuid,
    pub hr_admin_id: Uuid,
    pub notice: &'a Notice,
    pub note: Option<&'a str>,
}

pub fn archive_key(user_id: Uuid, step: AssessmentStep) -> String {
    format!("documents/{user_id}/step-{}.md", step.index())
}

/// Issues a notice: validates, advances the tracker to the notice's step,
/// archives the Markdown to S3 and records the document, all under one
/// database transaction. The cache is updated after commit.
pub async fn issue_notice(
    pool: &PgPool,
    cache: &dyn StateCache,
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    params: IssueParams<'_>,
) -> Result<RenderedNotice, AppError> {
    let IssueParams {
        user_id,
        hr_admin_id,
        notice,
        note,
    } = params;
    notice.validate().map_err(AppError::Validation)?;

    let kind = notice.kind();
    let step = kind.step();
    let markdown = render_notice(notice);
    let fields = serde_json::to_value(notice).map_err(|e| AppError::Internal(e.into()))?;

    let mut tx = pool.begin().await?;
    advance_in_tx(
        &mut tx,
        cache,
        user_id,
        hr_admin_id,
        step,
        TransitionAction::IssueNotice,
        note,
    )
    .await?;

    let s3_key = archive_key(user_id, step);
    s3.put_object()
        .bucket(s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(Bytes::from(markdown.clone())))
        .content_type("text/markdown")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Notice upload failed: {e}")))?;

    info!("Archived {} to s3://{}/{}", kind.as_str(), s3_bucket, s3_key);

    let document = sqlx::query_as::<_, AssessmentDocumentRow>(
        r#"
        INSERT INTO assessment_documents (id, user_id, hr_admin_id, step, kind, fields, s3_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(hr_admin_id)
    .bind(step.index() as i32)
    .bind(kind.as_str())
    .bind(&fields)
    .bind(&s3_key)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(
        "Issued {} for candidate {user_id} by {hr_admin_id}",
        kind.as_str()
    );
    cache_step(cache, user_id, step).await;

    Ok(RenderedNotice { document, markdown })
}

pub async fn list_documents(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<AssessmentDocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, AssessmentDocumentRow>(
        "SELECT * FROM assessment_documents WHERE user_id = $1 ORDER BY step ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Loads a stored notice and re-renders it from its fields.
pub async fn get_rendered(
    pool: &PgPool,
    user_id: Uuid,
    step: AssessmentStep,
) -> Result<RenderedNotice, AppError> {
    let document = sqlx::query_as::<_, AssessmentDocumentRow>(
        "SELECT * FROM assessment_documents WHERE user_id = $1 AND step = $2",
    )
    .bind(user_id)
    .bind(step.index() as i32)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "No '{}' notice issued for candidate {user_id}",
            step.name()
        ))
    })?;

    let notice: Notice = serde_json::from_value(document.fields.clone())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored notice is unreadable: {e}")))?;
    let markdown = render_notice(&notice);
    Ok(RenderedNotice { document, markdown })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_key_per_step() {
        let id = Uuid::nil();
        assert_eq!(
            archive_key(id, AssessmentStep::PreliminaryRevocation),
            "documents/00000000-0000-0000-0000-000000000000/step-3.md"
        );
    }
}
