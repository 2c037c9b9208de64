//! HTTP API for the booking webhook

mod handlers;
mod types;

pub use handlers::create_router;

use crate::runtime::SharedRuntime;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<SharedRuntime>,
}

impl AppState {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self {
            runtime: Arc::new(runtime),
        }
    }
}
