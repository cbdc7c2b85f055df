/// Email client: the single point of entry for outbound email.
///
/// Speaks the Resend-compatible `POST /emails` API. Retries on 429 and 5xx
/// with exponential backoff; any other non-success status fails immediately.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod templates;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gave up after {retries} retries")]
    RetriesExhausted { retries: u32 },
}

/// A fully rendered outbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Delivery seam. Carried in `AppState` as `Arc<dyn EmailSender>`.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends one message and returns the provider's message id.
    async fn send(&self, email: &OutboundEmail) -> Result<String, EmailError>;
}

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl EmailClient {
    pub fn new(api_url: String, api_key: String, from: String) -> Result<Self, EmailError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_url,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl EmailSender for EmailClient {
    async fn send(&self, email: &OutboundEmail) -> Result<String, EmailError> {
        let request_body = SendRequest {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let mut last_error: Option<EmailError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Email send attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmailError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Email API returned {}: {}", status, body);
                last_error = Some(EmailError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                return Err(EmailError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let sent: SendResponse = response.json().await?;
            debug!("Email {} accepted for {}", sent.id, email.to);
            return Ok(sent.id);
        }

        Err(last_error.unwrap_or(EmailError::RetriesExhausted {
            retries: MAX_RETRIES,
        }))
    }
}

#[cfg(test)]
pub mod fake {
    use std::sync::Mutex;

    use super::*;

    /// Records messages instead of sending them. Fails every send when `fail` is set.
    #[derive(Default)]
    pub struct RecordingSender {
        pub sent: Mutex<Vec<OutboundEmail>>,
        pub fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, email: &OutboundEmail) -> Result<String, EmailError> {
            if self.fail {
                return Err(EmailError::Api {
                    status: 422,
                    message: "rejected".to_string(),
                });
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(email.clone());
            Ok(format!("msg-{}", sent.len()))
        }
    }
}
