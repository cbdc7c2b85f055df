//! Invitation lifecycle.
//!
//! An invite row is written as `pending` before the email is attempted and
//! moved to `sent` or `failed` afterwards, so a delivery failure never loses
//! the record of the attempt. The per-admin invite list is mirrored into the
//! cache after every change and read through it.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::classification::{normalize_email, pending_invites};
use crate::cache::{invites_key, StateCache};
use crate::email_client::templates::invitation_email;
use crate::email_client::{EmailError, EmailSender};
use crate::errors::AppError;
use crate::models::invite::SentInviteRow;
use crate::models::profile::{HrAdminProfileRow, UserProfileRow};
use crate::records::validation::is_valid_email;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";

/// Inserts a new invite or reclaims a `failed` one as `pending`. Returns no
/// row when the address is already `pending` or `sent`, so only one caller
/// can claim an address at a time.
const CLAIM_INVITE_SQL: &str = r#"
    INSERT INTO hr_sent_invites (id, hr_admin_id, email, status)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (hr_admin_id, email) DO UPDATE
        SET status = EXCLUDED.status, updated_at = now()
        WHERE hr_sent_invites.status = 'failed'
    RETURNING *
"#;

/// Collaborators an invite send needs beyond the database.
pub struct InviteContext<'a> {
    pub pool: &'a PgPool,
    pub cache: &'a dyn StateCache,
    pub email: &'a dyn EmailSender,
    pub app_base_url: &'a str,
}

async fn load_invites_from_db(
    pool: &PgPool,
    hr_admin_id: Uuid,
) -> Result<Vec<SentInviteRow>, sqlx::Error> {
    sqlx::query_as::<_, SentInviteRow>(
        "SELECT * FROM hr_sent_invites WHERE hr_admin_id = $1 ORDER BY created_at ASC",
    )
    .bind(hr_admin_id)
    .fetch_all(pool)
    .await
}

async fn write_cache(cache: &dyn StateCache, hr_admin_id: Uuid, invites: &[SentInviteRow]) {
    let payload = match serde_json::to_string(invites) {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not serialize invites for {hr_admin_id}: {e}");
            return;
        }
    };
    if let Err(e) = cache.set(&invites_key(hr_admin_id), &payload).await {
        warn!("Invite cache write failed for {hr_admin_id}: {e}");
    }
}

/// Reloads the admin's invites from the database and mirrors them.
pub async fn refresh_cache(
    pool: &PgPool,
    cache: &dyn StateCache,
    hr_admin_id: Uuid,
) -> Result<Vec<SentInviteRow>, sqlx::Error> {
    let invites = load_invites_from_db(pool, hr_admin_id).await?;
    write_cache(cache, hr_admin_id, &invites).await;
    Ok(invites)
}

/// Read-through: cache first, database on miss or unreadable payload.
pub async fn list_invites(
    pool: &PgPool,
    cache: &dyn StateCache,
    hr_admin_id: Uuid,
) -> Result<Vec<SentInviteRow>, sqlx::Error> {
    match cache.get(&invites_key(hr_admin_id)).await {
        Ok(Some(payload)) => match serde_json::from_str::<Vec<SentInviteRow>>(&payload) {
            Ok(invites) => return Ok(invites),
            Err(e) => warn!("Discarding unreadable invite cache for {hr_admin_id}: {e}"),
        },
        Ok(None) => {}
        Err(e) => warn!("Invite cache read failed for {hr_admin_id}: {e}"),
    }
    refresh_cache(pool, cache, hr_admin_id).await
}

/// Invites whose email has no granted-access candidate profile.
pub fn outstanding_invites(
    invites: &[SentInviteRow],
    granted: &[UserProfileRow],
) -> Vec<SentInviteRow> {
    let pending = pending_invites(
        invites.iter().map(|i| i.email.as_str()),
        granted.iter().map(|u| u.email.as_str()),
    );
    let pending: std::collections::HashSet<String> =
        pending.iter().map(|e| normalize_email(e)).collect();
    invites
        .iter()
        .filter(|i| pending.contains(&normalize_email(&i.email)))
        .cloned()
        .collect()
}

/// Row changes that follow one delivery attempt.
#[derive(Debug, PartialEq, Eq)]
struct DeliveryOutcome {
    status: &'static str,
    last_error: Option<String>,
    sends: i32,
}

fn delivery_outcome(result: &Result<String, EmailError>) -> DeliveryOutcome {
    match result {
        Ok(_) => DeliveryOutcome {
            status: STATUS_SENT,
            last_error: None,
            sends: 1,
        },
        Err(e) => DeliveryOutcome {
            status: STATUS_FAILED,
            last_error: Some(e.to_string()),
            sends: 0,
        },
    }
}

fn email_failure(e: EmailError) -> AppError {
    AppError::Email(e.to_string())
}

async fn deliver(
    ctx: &InviteContext<'_>,
    admin: &HrAdminProfileRow,
    invite: &SentInviteRow,
    reminder: bool,
) -> Result<SentInviteRow, AppError> {
    let message = invitation_email(
        &invite.email,
        admin.company.as_deref(),
        &admin.display_name(),
        ctx.app_base_url,
        reminder,
    );

    let result = ctx.email.send(&message).await;
    match &result {
        Ok(message_id) => info!(
            "Invite {} delivered to {} (message {message_id})",
            invite.id, invite.email
        ),
        Err(e) => warn!("Invite {} to {} failed: {e}", invite.id, invite.email),
    }

    let outcome = delivery_outcome(&result);
    let updated = sqlx::query_as::<_, SentInviteRow>(
        r#"
        UPDATE hr_sent_invites
        SET status = $1, last_error = $2, send_count = send_count + $3, updated_at = now()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(outcome.status)
    .bind(&outcome.last_error)
    .bind(outcome.sends)
    .bind(invite.id)
    .fetch_one(ctx.pool)
    .await?;

    refresh_cache(ctx.pool, ctx.cache, admin.id).await?;

    result.map(|_| updated).map_err(email_failure)
}

/// Records and sends a first invitation. Only a new address or a previously
/// `failed` invite is claimed; a `pending` (in flight) or `sent` invite is a
/// conflict and must go through `reinvite`.
pub async fn send_invite(
    ctx: &InviteContext<'_>,
    admin: &HrAdminProfileRow,
    email: &str,
) -> Result<SentInviteRow, AppError> {
    if !is_valid_email(email) {
        return Err(AppError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    let email = normalize_email(email);

    let invite = sqlx::query_as::<_, SentInviteRow>(CLAIM_INVITE_SQL)
        .bind(Uuid::new_v4())
        .bind(admin.id)
        .bind(&email)
        .bind(STATUS_PENDING)
        .fetch_optional(ctx.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("{email} has already been invited")))?;

    deliver(ctx, admin, &invite, false).await
}

/// Re-sends an existing invite as a reminder.
pub async fn reinvite(
    ctx: &InviteContext<'_>,
    admin: &HrAdminProfileRow,
    invite_id: Uuid,
) -> Result<SentInviteRow, AppError> {
    let invite = sqlx::query_as::<_, SentInviteRow>(
        "SELECT * FROM hr_sent_invites WHERE id = $1 AND hr_admin_id = $2",
    )
    .bind(invite_id)
    .bind(admin.id)
    .fetch_optional(ctx.pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Invite {invite_id} not found")))?;

    deliver(ctx, admin, &invite, true).await
}
