use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::cache::StateCache;
use crate::config::Config;
use crate::email_client::EmailSender;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Best-effort mirror of step counters and sent-invite lists. Redis in production.
    pub cache: Arc<dyn StateCache>,
    /// Notice archive bucket client.
    pub s3: S3Client,
    pub email: Arc<dyn EmailSender>,
    pub config: Config,
}
