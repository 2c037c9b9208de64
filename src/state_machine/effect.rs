//! Outbound replies produced by the dispatcher

use serde::Serialize;

/// Pre-approved message layouts, resolved to content ids by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// Service list sent at the start of a booking
    FirstPrompt,
    Dates,
    Slots,
    Employees,
}

/// A reply to deliver to the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendTemplate { template: Template },
    SendText { body: String },
}

impl Effect {
    pub fn template(template: Template) -> Self {
        Effect::SendTemplate { template }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Effect::SendText { body: body.into() }
    }
}
