//! HTTP request handlers

use super::types::{ErrorResponse, HealthResponse, VersionResponse, WebhookForm};
use super::AppState;
use crate::runtime::{Handled, WebhookError};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};

/// Empty TwiML document: acknowledge without an inline reply
const EMPTY_TWIML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/version", get(get_version))
        .route("/webhook", post(webhook))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { result: "ok" })
}

async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================
// Inbound messages
// ============================================================

async fn webhook(
    State(state): State<AppState>,
    Form(form): Form<WebhookForm>,
) -> Result<Response, AppError> {
    let message = form.into_message().map_err(|e| {
        tracing::warn!(error = %e, "Rejecting webhook request");
        AppError::from(e)
    })?;

    match state.runtime.handle(&message).await {
        Ok(Handled::Replied { outcome, step }) => {
            tracing::debug!(sender = %message.sender_id, outcome = %outcome, step = %step, "Webhook handled");
        }
        // Still acknowledged; a provider retry would repeat sends
        Ok(Handled::Undelivered { .. } | Handled::Duplicate) => {}
        Err(e) => {
            tracing::error!(sender = %message.sender_id, error = %e, "Webhook processing failed");
            return Err(e.into());
        }
    }

    Ok(([(header::CONTENT_TYPE, "text/xml")], EMPTY_TWIML).into_response())
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<WebhookError> for AppError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::MalformedPayload(_) => AppError::BadRequest(e.to_string()),
            WebhookError::MissingSender | WebhookError::Store(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
