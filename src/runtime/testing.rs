//! Mock implementations for testing
//!
//! These mocks enable runtime and API tests without SQLite or network I/O.

use crate::notifier::{Notifier, NotifyError};
use crate::session::Session;
use crate::store::{SessionStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

// ============================================================================
// In-memory session store
// ============================================================================

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    failing: AtomicBool,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the backend were down
    pub fn fail_all(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("mock store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, sender_id: &str) -> Result<Option<Session>, StoreError> {
        self.check()?;
        Ok(self.sessions.lock().unwrap().get(sender_id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.check()?;
        self.sessions
            .lock()
            .unwrap()
            .insert(session.sender_id.clone(), session.clone());
        Ok(())
    }

    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        self.check()?;
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.last_active_at >= cutoff);
        Ok(before - sessions.len())
    }
}

// ============================================================================
// Recording notifier
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { to: String, body: String },
    Template { to: String, content_id: String },
}

/// Records deliveries; can be switched to fail every send
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Bodies of the text messages sent so far
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { body, .. } => Some(body),
                Sent::Template { .. } => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected {
                status: 503,
                body: "mock notifier offline".to_string(),
            });
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        self.record(Sent::Text {
            to: to.to_string(),
            body: body.to_string(),
        })
    }

    async fn send_template(&self, to: &str, content_id: &str) -> Result<(), NotifyError> {
        self.record(Sent::Template {
            to: to.to_string(),
            content_id: content_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_in_memory_sweep_is_idempotent() {
        let store = InMemorySessionStore::new();
        let now = Utc::now();
        store
            .save(&Session::new("old", now - Duration::hours(3)))
            .await
            .unwrap();
        store.save(&Session::new("new", now)).await.unwrap();

        let cutoff = now - Duration::hours(1);
        assert_eq!(store.sweep_expired(cutoff).await.unwrap(), 1);
        assert_eq!(store.sweep_expired(cutoff).await.unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_recording_notifier_failure_switch() {
        let notifier = RecordingNotifier::new();
        notifier.send_text("a", "one").await.unwrap();
        notifier.fail_sends(true);
        assert!(notifier.send_template("a", "HX1").await.is_err());
        assert_eq!(notifier.texts(), ["one"]);
    }
}
