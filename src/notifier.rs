//! Outbound message delivery
//!
//! Replies go out either as free text or as a pre-approved content
//! template referenced by id.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Delivery rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Sends replies to a recipient
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError>;

    async fn send_template(&self, to: &str, content_id: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        (**self).send_text(to, body).await
    }

    async fn send_template(&self, to: &str, content_id: &str) -> Result<(), NotifyError> {
        (**self).send_template(to, content_id).await
    }
}

/// Twilio Programmable Messaging credentials
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending number, e.g. `whatsapp:+14155238886`
    pub from: String,
}

/// Delivers messages through the Twilio Messages REST endpoint
pub struct TwilioNotifier {
    client: reqwest::Client,
    credentials: TwilioCredentials,
    base_url: String,
}

impl TwilioNotifier {
    pub fn new(credentials: TwilioCredentials) -> Self {
        Self::with_base_url(credentials, TWILIO_API_BASE)
    }

    pub fn with_base_url(credentials: TwilioCredentials, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            base_url: base_url.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.credentials.account_sid
        )
    }

    async fn create_message(&self, to: &str, field: (&str, &str)) -> Result<(), NotifyError> {
        let form = vec![("From", self.credentials.from.as_str()), ("To", to), field];
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(recipient = %to, kind = field.0, "Message sent");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(recipient = %to, status = status.as_u16(), body = %body, "Message rejected");
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        self.create_message(to, ("Body", body)).await
    }

    async fn send_template(&self, to: &str, content_id: &str) -> Result<(), NotifyError> {
        self.create_message(to, ("ContentSid", content_id)).await
    }
}

/// Logs replies instead of delivering them (no credentials configured)
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(recipient = %to, body = %body, "Dry run: text message");
        Ok(())
    }

    async fn send_template(&self, to: &str, content_id: &str) -> Result<(), NotifyError> {
        tracing::info!(recipient = %to, content_id = %content_id, "Dry run: template message");
        Ok(())
    }
}
