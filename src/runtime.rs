//! Webhook processing runtime
//!
//! Runs one inbound message through the booking flow: sweep and load the
//! sender's session, classify the message, apply the outcome, deliver the
//! reply and persist. Messages from the same sender are processed one at a
//! time; different senders proceed concurrently.

#[cfg(test)]
pub mod testing;

use crate::config::TemplateIds;
use crate::dispatcher::dispatch;
use crate::notifier::{Notifier, NotifyError};
use crate::session::Sessions;
use crate::state_machine::{transition, Effect, Input, Outcome, Step};
use crate::store::{SessionStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Runtime over type-erased store and notifier, as wired by `main`
pub type SharedRuntime = BookingRuntime<Arc<dyn SessionStore>, Arc<dyn Notifier>>;

/// A sanitized inbound message event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: String,
    /// Transport message id, used to drop redeliveries
    pub message_id: Option<String>,
    pub input: Input,
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Sender id missing from request")]
    MissingSender,
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a message was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// Reply delivered and session persisted
    Replied { outcome: Outcome, step: Step },
    /// Reply could not be delivered; session left as it was
    Undelivered { outcome: Outcome },
    /// Same transport message id as the last processed one
    Duplicate,
}

pub struct BookingRuntime<S: SessionStore, N: Notifier> {
    sessions: Sessions<S>,
    notifier: N,
    templates: TemplateIds,
    sender_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: SessionStore, N: Notifier> BookingRuntime<S, N> {
    pub fn new(store: S, notifier: N, templates: TemplateIds, expiration: Duration) -> Self {
        Self {
            sessions: Sessions::new(store, expiration),
            notifier,
            templates,
            sender_locks: RwLock::new(HashMap::new()),
        }
    }

    pub async fn handle(&self, message: &InboundMessage) -> Result<Handled, WebhookError> {
        self.handle_at(message, Utc::now()).await
    }

    pub async fn handle_at(
        &self,
        message: &InboundMessage,
        now: DateTime<Utc>,
    ) -> Result<Handled, WebhookError> {
        let lock = self.sender_lock(&message.sender_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.process(message, now).await
        };
        drop(lock);
        self.release_sender_lock(&message.sender_id).await;
        result
    }

    async fn process(
        &self,
        message: &InboundMessage,
        now: DateTime<Utc>,
    ) -> Result<Handled, WebhookError> {
        let sender = message.sender_id.as_str();
        let mut session = self.sessions.get_or_create(sender, now).await?;

        if message.message_id.is_some() && session.last_message_id == message.message_id {
            tracing::info!(sender = %sender, message_id = ?message.message_id, "Dropping redelivered message");
            return Ok(Handled::Duplicate);
        }

        session.touch(now);
        let step = session.current_step;
        let decision = transition(step, &message.input);
        let outcome = decision.outcome;
        tracing::info!(sender = %sender, step = %step, outcome = %outcome, "Message classified");

        let effect = {
            let mut rng = rand::thread_rng();
            dispatch(&mut session, decision, now, &mut rng)
        };
        let Some(effect) = effect else {
            return Err(WebhookError::MalformedPayload(format!(
                "empty {} value",
                input_kind_name(&message.input)
            )));
        };

        if let Err(e) = self.deliver(sender, &effect).await {
            tracing::error!(sender = %sender, outcome = %outcome, error = %e, "Reply delivery failed, session not saved");
            return Ok(Handled::Undelivered { outcome });
        }

        session.last_message_id.clone_from(&message.message_id);
        self.sessions.persist(&session).await?;

        Ok(Handled::Replied {
            outcome,
            step: session.current_step,
        })
    }

    async fn deliver(&self, to: &str, effect: &Effect) -> Result<(), NotifyError> {
        match effect {
            Effect::SendTemplate { template } => {
                self.notifier
                    .send_template(to, self.templates.content_id(*template))
                    .await
            }
            Effect::SendText { body } => self.notifier.send_text(to, body).await,
        }
    }

    async fn sender_lock(&self, sender_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.sender_locks.read().await;
            if let Some(lock) = locks.get(sender_id) {
                return lock.clone();
            }
        }
        self.sender_locks
            .write()
            .await
            .entry(sender_id.to_string())
            .or_default()
            .clone()
    }

    /// Drop the sender's lock entry once nobody else holds it
    async fn release_sender_lock(&self, sender_id: &str) {
        let mut locks = self.sender_locks.write().await;
        if locks
            .get(sender_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(sender_id);
        }
    }
}

fn input_kind_name(input: &Input) -> &'static str {
    match input {
        Input::Text(_) => "text",
        Input::Button(_) => "button",
        Input::List(_) => "list",
    }
}
