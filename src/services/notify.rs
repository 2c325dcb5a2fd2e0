//! Outbound notifications (email and SMS).
//!
//! Delivery is best-effort everywhere it is used: callers log failures and carry on.

use async_trait::async_trait;
use serde::Serialize;

use crate::services::metrics::BusinessMetrics;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("missing recipient: {0}")]
    MissingRecipient(&'static str),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected message: status={status} body={body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
    async fn send_sms(&self, phone: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes every message to the log. Used when no provider is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(%to, %subject, "email: {}", body);
        Ok(())
    }

    async fn send_sms(&self, phone: &str, body: &str) -> Result<(), NotifyError> {
        if phone.trim().is_empty() {
            return Err(NotifyError::MissingRecipient("phone"));
        }
        tracing::info!(%phone, "sms: {}", body);
        Ok(())
    }
}

/// Email over the SendGrid v3 API. SMS has no gateway yet and is only logged.
#[derive(Clone)]
pub struct SendgridNotifier {
    http: reqwest::Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl SendgridNotifier {
    pub fn new(api_key: String, from_email: String, from_name: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from_email,
            from_name,
        }
    }
}

#[async_trait]
impl Notifier for SendgridNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let payload = SgMail {
            personalizations: vec![SgPersonalization {
                to: vec![SgEmail { email: to, name: None }],
                subject,
            }],
            from: SgEmail {
                email: &self.from_email,
                name: Some(&self.from_name),
            },
            content: vec![SgContent {
                r#type: "text/plain",
                value: body,
            }],
        };

        let res = self
            .http
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if res.status() == reqwest::StatusCode::ACCEPTED {
            tracing::debug!(%to, "email accepted by provider");
            Ok(())
        } else {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            Err(NotifyError::Rejected { status, body })
        }
    }

    async fn send_sms(&self, phone: &str, body: &str) -> Result<(), NotifyError> {
        LogNotifier.send_sms(phone, body).await
    }
}

#[derive(Serialize)]
struct SgMail<'a> {
    personalizations: Vec<SgPersonalization<'a>>,
    from: SgEmail<'a>,
    content: Vec<SgContent<'a>>,
}

#[derive(Serialize)]
struct SgPersonalization<'a> {
    to: Vec<SgEmail<'a>>,
    subject: &'a str,
}

#[derive(Serialize)]
struct SgEmail<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct SgContent<'a> {
    #[serde(rename = "type")]
    r#type: &'a str,
    value: &'a str,
}

/// Sends an email, logging and counting a failure instead of returning it.
pub async fn email_best_effort(notifier: &dyn Notifier, metrics: &BusinessMetrics, to: &str, message: &Message) {
    if let Err(e) = notifier.send_email(to, &message.subject, &message.body).await {
        tracing::warn!(%to, error = %e, "email delivery failed");
        metrics.record_notification_failure("email");
    }
}

pub async fn sms_best_effort(notifier: &dyn Notifier, metrics: &BusinessMetrics, phone: &str, body: &str) {
    if let Err(e) = notifier.send_sms(phone, body).await {
        tracing::warn!(%phone, error = %e, "sms delivery failed");
        metrics.record_notification_failure("sms");
    }
}

// =============================================================================
// MESSAGE TEXTS
// =============================================================================

pub struct Message {
    pub subject: String,
    pub body: String,
}

pub fn verification_email(first_name: &str, frontend_url: &str, token: &str) -> Message {
    let link = format!("{}/verify-email/?token={}", frontend_url.trim_end_matches('/'), token);
    Message {
        subject: "Confirm your registration".to_string(),
        body: format!(
            "Hello, {first_name}!\n\nThank you for registering.\n\n\
             To confirm your email address, follow this link:\n{link}\n\n\
             If you did not register, simply ignore this message."
        ),
    }
}

pub fn password_reset_email(first_name: &str, frontend_url: &str, token: &str) -> Message {
    let link = format!("{}/reset-password/?token={}", frontend_url.trim_end_matches('/'), token);
    Message {
        subject: "Password reset".to_string(),
        body: format!(
            "Hello, {first_name}!\n\nA password reset was requested for your account.\n\n\
             To choose a new password, follow this link:\n{link}\n\n\
             The link is valid for 24 hours. If you did not request a reset, ignore this message."
        ),
    }
}

pub fn line_item_status_sms(
    first_name: &str,
    order_id: i64,
    product_name: &str,
    quantity: i32,
    status: &str,
    order_total: &str,
) -> String {
    format!(
        "Hello, {first_name}!\n\nThe status of \"{product_name} ({quantity} m)\" in order #{order_id} \
         changed to \"{status}\".\n\nOrder total: {order_total}"
    )
}
