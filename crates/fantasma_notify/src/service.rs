// --- File: crates/fantasma_notify/src/service.rs ---
//! Notification service implementation.
//!
//! Booking alerts go out over two REST channels: SMS through the Twilio
//! Messages API and an email copy through the SendGrid v3 mail API. Both
//! are consumed strictly best-effort by the booking flow; a failure here
//! is logged by the caller and never surfaces to the client.

use fantasma_common::services::{BoxFuture, NotificationResult, NotificationService};
use fantasma_common::HTTP_CLIENT;
use fantasma_config::{AppConfig, NotifyConfig};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Notification-specific error types.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Error occurred during an outbound API request
    #[error("Notification API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the notification API
    #[error("Notification API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Missing or incomplete notification configuration
    #[error("Notification configuration missing or incomplete")]
    ConfigError,
}

#[derive(Deserialize, Debug)]
struct TwilioMessageResponse {
    sid: Option<String>,
    status: Option<String>,
}

/// Twilio/SendGrid notification service implementation.
pub struct TwilioNotificationService {
    config: Arc<AppConfig>,
}

impl TwilioNotificationService {
    /// Create a new notification service.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }

    fn notify_config(&self) -> Result<&NotifyConfig, NotifyError> {
        self.config.notify.as_ref().ok_or(NotifyError::ConfigError)
    }
}

impl NotificationService for TwilioNotificationService {
    type Error = NotifyError;

    fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let to = to.to_string();
        let body = body.to_string();

        Box::pin(async move {
            let notify = self.notify_config()?;

            let url = format!(
                "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
                notify.account_sid
            );
            let params = [
                ("To", to.as_str()),
                ("From", notify.from_number.as_str()),
                ("Body", body.as_str()),
            ];

            info!("Sending booking SMS to {}", to);
            let resp = HTTP_CLIENT
                .post(&url)
                .basic_auth(&notify.account_sid, Some(&notify.auth_token))
                .form(&params)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                tracing::error!("Twilio returned {}: {}", status, body);
                return Err(NotifyError::ApiError {
                    status_code: status.as_u16(),
                    message: body,
                });
            }

            let message: TwilioMessageResponse = resp.json().await?;
            Ok(NotificationResult {
                id: message.sid.unwrap_or_default(),
                status: message.status.unwrap_or_else(|| "queued".to_string()),
            })
        })
    }

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();

        Box::pin(async move {
            let notify = self.notify_config()?;
            let api_key = notify
                .sendgrid_api_key
                .as_deref()
                .ok_or(NotifyError::ConfigError)?;
            let from = notify
                .email_from
                .as_deref()
                .ok_or(NotifyError::ConfigError)?;

            let payload = json!({
                "personalizations": [{ "to": [{ "email": to }] }],
                "from": { "email": from },
                "subject": subject,
                "content": [{
                    "type": if is_html { "text/html" } else { "text/plain" },
                    "value": body,
                }],
            });

            info!("Sending booking email to {}", to);
            let resp = HTTP_CLIENT
                .post("https://api.sendgrid.com/v3/mail/send")
                .bearer_auth(api_key)
                .json(&payload)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                tracing::error!("SendGrid returned {}: {}", status, body);
                return Err(NotifyError::ApiError {
                    status_code: status.as_u16(),
                    message: body,
                });
            }

            let message_id = resp
                .headers()
                .get("x-message-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Ok(NotificationResult {
                id: message_id,
                status: "accepted".to_string(),
            })
        })
    }
}
