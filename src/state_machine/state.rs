//! Dialogue state types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Service codes offered by the first prompt (list selection)
pub const SERVICE_CODES: [&str; 4] = ["1", "2", "3", "4"];
/// Date codes offered by the date picker (button selection)
pub const DATE_CODES: [&str; 4] = ["7", "8", "9", "10"];
/// Slot codes offered by the slot picker (button selection)
pub const SLOT_CODES: [&str; 3] = ["10", "11", "12"];
/// Employee codes offered by the employee list (list selection)
pub const EMPLOYEE_CODES: [&str; 4] = ["100", "101", "102", "103"];

/// Texts that start (or restart) a booking
pub const GREETINGS: [&str; 12] = [
    "hi",
    "hello",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "help",
    "info",
    "information",
    "support",
    "assist",
];

/// The step whose prompt was most recently sent to a sender.
///
/// The next inbound message from that sender is interpreted as an answer
/// to this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Never engaged
    #[default]
    None,
    /// First prompt sent to a never-engaged record; answered like `Service`
    First,
    Service,
    Date,
    Slot,
    Employee,
    /// Booking id issued, awaiting payment; no structured input expected
    Confirmation,
    Fallback,
    Reset,
    /// Free-text status reply sent
    Custom,
}

/// What an inbound message is expected to look like for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expects {
    Text,
    Button,
    List,
}

impl Step {
    pub fn expects(self) -> Expects {
        match self {
            Step::First | Step::Service | Step::Employee => Expects::List,
            Step::Date | Step::Slot => Expects::Button,
            Step::None | Step::Confirmation | Step::Fallback | Step::Reset | Step::Custom => {
                Expects::Text
            }
        }
    }

    /// Whether the sender has been prompted at least once
    pub fn is_engaged(self) -> bool {
        self != Step::None
    }

    /// Steps in the middle of a booking, where free text is not an answer
    pub fn is_mid_flow(self) -> bool {
        matches!(
            self,
            Step::First | Step::Service | Step::Date | Step::Slot | Step::Employee
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::None => "none",
            Step::First => "first",
            Step::Service => "service",
            Step::Date => "date",
            Step::Slot => "slot",
            Step::Employee => "employee",
            Step::Confirmation => "confirmation",
            Step::Fallback => "fallback",
            Step::Reset => "reset",
            Step::Custom => "custom",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of an inbound message, consumed by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Send the first prompt (service list)
    Service,
    /// Send the date picker
    Date,
    /// Send the slot picker
    Slot,
    /// Send the employee list
    Employee,
    /// Issue a booking id
    Confirmation,
    Fallback,
    Reset,
    Invalid,
    /// Structurally malformed input; nothing is sent or stored
    Error,
    /// Free-text status reply
    Custom,
}

impl Outcome {
    /// The step a session waits in after this outcome's reply went out.
    ///
    /// `Invalid` keeps the current step and `Error` never reaches a session,
    /// so neither has a landing step of its own.
    pub fn landing_step(self) -> Option<Step> {
        match self {
            Outcome::Service => Some(Step::Service),
            Outcome::Date => Some(Step::Date),
            Outcome::Slot => Some(Step::Slot),
            Outcome::Employee => Some(Step::Employee),
            Outcome::Confirmation => Some(Step::Confirmation),
            Outcome::Fallback => Some(Step::Fallback),
            Outcome::Reset => Some(Step::Reset),
            Outcome::Custom => Some(Step::Custom),
            Outcome::Invalid | Outcome::Error => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Service => "service",
            Outcome::Date => "date",
            Outcome::Slot => "slot",
            Outcome::Employee => "employee",
            Outcome::Confirmation => "confirmation",
            Outcome::Fallback => "fallback",
            Outcome::Reset => "reset",
            Outcome::Invalid => "invalid",
            Outcome::Error => "error",
            Outcome::Custom => "custom",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sanitized inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Button(String),
    List(String),
}

impl Input {
    pub fn kind(&self) -> Expects {
        match self {
            Input::Text(_) => Expects::Text,
            Input::Button(_) => Expects::Button,
            Input::List(_) => Expects::List,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Input::Text(v) | Input::Button(v) | Input::List(v) => v,
        }
    }
}

/// Selection slots on a session, each written once per booking cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Service,
    Date,
    Slot,
    Employee,
}

/// A validated selection to persist on the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub field: Field,
    pub value: String,
}

impl Selection {
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}
