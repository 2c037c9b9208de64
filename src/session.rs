//! Per-sender booking session and its lifecycle
//!
//! A session records which prompt a sender was last sent and the
//! selections they made so far. Sessions are created on first contact,
//! refreshed on every message, and wiped by resets, fallbacks and expiry.

use crate::state_machine::{Field, Selection, Step};
use crate::store::{SessionStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Consecutive invalid answers tolerated before a forced reset
pub const MAX_INVALID_ATTEMPTS: u8 = 3;

/// Inactivity after which a session is discarded
pub const DEFAULT_EXPIRATION_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub sender_id: String,
    pub service: Option<String>,
    pub date: Option<String>,
    pub slot: Option<String>,
    pub employee: Option<String>,
    pub order_id: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub current_step: Step,
    pub invalid_count: u8,
    /// Transport id of the last message whose reply was delivered.
    ///
    /// Only the latest id is kept, so an older message redelivered after a
    /// newer one is processed again.
    #[serde(default)]
    pub last_message_id: Option<String>,
}

impl Session {
    pub fn new(sender_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            sender_id: sender_id.into(),
            service: None,
            date: None,
            slot: None,
            employee: None,
            order_id: None,
            created_at: now,
            last_active_at: now,
            current_step: Step::None,
            invalid_count: 0,
            last_message_id: None,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active_at = now;
    }

    pub fn is_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.last_active_at > window
    }

    /// Wipe all progress and wait in `landing`
    pub fn reset(&mut self, landing: Step, now: DateTime<Utc>) {
        tracing::debug!(
            sender = %self.sender_id,
            step = %landing,
            had_selections = self.has_selections(),
            "Session reset"
        );
        self.service = None;
        self.date = None;
        self.slot = None;
        self.employee = None;
        self.order_id = None;
        self.invalid_count = 0;
        self.created_at = now;
        self.current_step = landing;
    }

    /// Start a fresh booking cycle, waiting for a service selection.
    ///
    /// Unlike [`Session::advance`] this works on a never-engaged session;
    /// a greeting is what engages it.
    pub fn begin(&mut self, now: DateTime<Utc>) {
        self.reset(Step::Service, now);
    }

    /// Count an invalid answer.
    ///
    /// Returns `true` while the retry budget lasts; `false` means the caller
    /// must reset instead of nudging.
    pub fn record_invalid(&mut self) -> bool {
        if self.invalid_count < MAX_INVALID_ATTEMPTS {
            self.invalid_count += 1;
            true
        } else {
            false
        }
    }

    /// Persist a selection and move to `next`.
    ///
    /// No-op on a session that was never engaged.
    pub fn advance(&mut self, next: Step, selection: Option<Selection>) {
        if !self.current_step.is_engaged() {
            tracing::warn!(sender = %self.sender_id, next = %next, "Refusing to advance unengaged session");
            return;
        }
        if let Some(Selection { field, value }) = selection {
            *self.selection_mut(field) = Some(value);
        }
        self.current_step = next;
        self.invalid_count = 0;
    }

    pub fn assign_order(&mut self, order_id: u32) {
        self.order_id = Some(order_id);
    }

    pub fn selection(&self, field: Field) -> Option<&str> {
        match field {
            Field::Service => self.service.as_deref(),
            Field::Date => self.date.as_deref(),
            Field::Slot => self.slot.as_deref(),
            Field::Employee => self.employee.as_deref(),
        }
    }

    pub fn has_selections(&self) -> bool {
        [Field::Service, Field::Date, Field::Slot, Field::Employee]
            .into_iter()
            .any(|f| self.selection(f).is_some())
    }

    fn selection_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Service => &mut self.service,
            Field::Date => &mut self.date,
            Field::Slot => &mut self.slot,
            Field::Employee => &mut self.employee,
        }
    }
}

/// Session lifecycle over a [`SessionStore`]
pub struct Sessions<S: SessionStore> {
    store: S,
    expiration: Duration,
}

impl<S: SessionStore> Sessions<S> {
    pub fn new(store: S, expiration: Duration) -> Self {
        Self { store, expiration }
    }

    /// Sweep expired sessions, then load the sender's session or start a new one
    pub async fn get_or_create(
        &self,
        sender_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let swept = self.store.sweep_expired(now - self.expiration).await?;
        if swept > 0 {
            tracing::info!(count = swept, "Expired sessions swept");
        }

        match self.store.load(sender_id).await? {
            Some(session) if !session.is_expired(now, self.expiration) => Ok(session),
            _ => {
                tracing::debug!(sender = %sender_id, "Creating session");
                Ok(Session::new(sender_id, now))
            }
        }
    }

    pub async fn persist(&self, session: &Session) -> Result<(), StoreError> {
        self.store.save(session).await
    }
}
