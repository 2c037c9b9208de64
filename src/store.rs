//! Session storage abstraction
//!
//! The runtime only needs keyed get/set plus an expiry sweep, so any
//! key-value backend can sit behind this trait.

use crate::session::Session;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Session encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for per-sender sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, sender_id: &str) -> Result<Option<Session>, StoreError>;

    /// Insert or replace the session keyed by its sender
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Drop every session last active before `cutoff`, returning how many went
    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn load(&self, sender_id: &str) -> Result<Option<Session>, StoreError> {
        (**self).load(sender_id).await
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        (**self).save(session).await
    }

    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        (**self).sweep_expired(cutoff).await
    }
}
