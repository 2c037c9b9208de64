//! Pure dialogue transition function
//!
//! Maps the step a sender is waiting in and the message they sent to an
//! outcome, plus the selection to persist when the message answered the
//! step. No I/O and no session mutation happen here.

use super::state::{
    Expects, Field, Input, Outcome, Selection, Step, DATE_CODES, EMPLOYEE_CODES, GREETINGS,
    SERVICE_CODES, SLOT_CODES,
};

/// Result of classifying one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: Outcome,
    pub selection: Option<Selection>,
}

impl Decision {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            selection: None,
        }
    }

    pub fn with_selection(mut self, field: Field, value: &str) -> Self {
        self.selection = Some(Selection::new(field, value));
        self
    }
}

pub fn is_greeting(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    GREETINGS.contains(&lowered.as_str())
}

pub fn is_reset_request(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("reset")
}

/// Classify `input` against the step the sender is waiting in
pub fn transition(step: Step, input: &Input) -> Decision {
    if input.value().trim().is_empty() {
        return Decision::new(Outcome::Error);
    }

    match input {
        Input::Text(text) => Decision::new(classify_text(step, text)),
        Input::Button(_) | Input::List(_) if input.kind() != step.expects() => {
            Decision::new(Outcome::Invalid)
        }
        Input::List(code) => match step {
            Step::First | Step::Service if SERVICE_CODES.contains(&code.as_str()) => {
                Decision::new(Outcome::Date).with_selection(Field::Service, code)
            }
            Step::Employee if EMPLOYEE_CODES.contains(&code.as_str()) => {
                Decision::new(Outcome::Confirmation).with_selection(Field::Employee, code)
            }
            _ => Decision::new(Outcome::Invalid),
        },
        Input::Button(code) => match step {
            Step::Date if DATE_CODES.contains(&code.as_str()) => {
                Decision::new(Outcome::Slot).with_selection(Field::Date, code)
            }
            Step::Slot if SLOT_CODES.contains(&code.as_str()) => {
                Decision::new(Outcome::Employee).with_selection(Field::Slot, code)
            }
            _ => Decision::new(Outcome::Invalid),
        },
    }
}

fn classify_text(step: Step, text: &str) -> Outcome {
    if is_greeting(text) {
        return Outcome::Service;
    }
    if step.is_engaged() && is_reset_request(text) {
        return Outcome::Reset;
    }
    if step == Step::Confirmation {
        return Outcome::Custom;
    }
    if step.is_mid_flow() {
        return Outcome::Invalid;
    }
    debug_assert_eq!(step.expects(), Expects::Text);
    Outcome::Fallback
}
