//! API request and response types

use crate::runtime::{InboundMessage, WebhookError};
use crate::state_machine::Input;
use serde::{Deserialize, Serialize};

/// Message types that carry a button or list selection
const INTERACTIVE_TYPES: [&str; 2] = ["interactive", "button"];

/// Inbound message webhook, form-encoded as the messaging provider posts it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebhookForm {
    pub from: Option<String>,
    pub body: Option<String>,
    pub message_type: Option<String>,
    pub button_payload: Option<String>,
    pub list_id: Option<String>,
    pub message_sid: Option<String>,
}

/// Trim whitespace; blank values count as missing
fn sanitize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl WebhookForm {
    fn is_interactive(&self) -> bool {
        self.message_type
            .as_deref()
            .is_some_and(|t| INTERACTIVE_TYPES.contains(&t.trim().to_lowercase().as_str()))
    }

    /// Extract the sender and the message they sent
    pub fn into_message(self) -> Result<InboundMessage, WebhookError> {
        let interactive = self.is_interactive();
        let sender_id = sanitize(self.from).ok_or(WebhookError::MissingSender)?;
        let message_id = sanitize(self.message_sid);

        let input = if interactive {
            match (sanitize(self.button_payload), sanitize(self.list_id)) {
                (Some(payload), None) => Input::Button(payload),
                (None, Some(list_id)) => Input::List(list_id),
                (Some(_), Some(_)) => {
                    return Err(WebhookError::MalformedPayload(
                        "interactive message with both button payload and list id".to_string(),
                    ));
                }
                (None, None) => {
                    return Err(WebhookError::MalformedPayload(
                        "interactive message without button payload or list id".to_string(),
                    ));
                }
            }
        } else {
            let body = sanitize(self.body).ok_or_else(|| {
                WebhookError::MalformedPayload("text message without body".to_string())
            })?;
            Input::Text(body)
        };

        Ok(InboundMessage {
            sender_id,
            message_id,
            input,
        })
    }
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub result: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
