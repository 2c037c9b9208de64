//! Outcome dispatch
//!
//! Applies a transition decision to a session and picks the reply that
//! goes with it. The runtime delivers the reply and persists the session
//! only once delivery succeeded.

use crate::session::Session;
use crate::state_machine::{Decision, Effect, Outcome, Step, Template};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::ops::Range;

/// Booking ids are six digits drawn from this range
pub const ORDER_ID_RANGE: Range<u32> = 250_000..259_999;

pub const WELCOME_TEXT: &str = "Hi! Welcome to *ServeEase*! 🎉 I'm your virtual assistant, here to help.\n\nSimply send 'Hi' to start booking services effortlessly!";

pub const RESET_TEXT: &str =
    "Sorry! Your session has been reset. Please start a new booking by sending 'Hi'.";

pub const INVALID_TEXT: &str =
    "Sorry, I didn't catch that. Please choose one of the options above, or send 'reset' to start over.";

pub fn confirmation_text(order_id: u32) -> String {
    format!(
        "Fantastic! with a side of Awesome sauce. 😎🔥\n\n\
         Your booking has been successfully confirmed with Booking ID: *{order_id}*.\n\n\
         Our executive will reach out to you within the next 3 business hours to confirm your booking details and address any questions or concerns you may have.\n\n\
         We will send you the available payment options shortly, allowing you to choose from a variety of convenient payment methods.\n\n\
         *IMPORTANT: Kindly note that payment for the booking is required to be completed 24 hours prior to the scheduled work slot. \
         Failure to make the payment within this time frame will result in the cancellation of your booking.*\n\n\
         Thank you for choosing *ServeEase*!! We look forward to serving you."
    )
}

pub fn status_text(order_id: Option<u32>) -> String {
    match order_id {
        Some(id) => format!(
            "Your booking *{id}* is confirmed and awaiting payment. Payment options will reach you shortly.\n\n\
             Send 'Hi' to make another booking or 'reset' to start over."
        ),
        None => "Send 'Hi' to start a new booking.".to_string(),
    }
}

pub fn generate_order_id<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(ORDER_ID_RANGE)
}

/// Mutate `session` for `decision` and return the reply to send.
///
/// Returns `None` for [`Outcome::Error`], which leaves the session untouched.
pub fn dispatch<R: Rng + ?Sized>(
    session: &mut Session,
    decision: Decision,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<Effect> {
    let Decision { outcome, selection } = decision;

    let effect = match outcome {
        Outcome::Service => {
            session.begin(now);
            Effect::template(Template::FirstPrompt)
        }
        Outcome::Date | Outcome::Slot | Outcome::Employee => {
            let template = match outcome {
                Outcome::Date => Template::Dates,
                Outcome::Slot => Template::Slots,
                _ => Template::Employees,
            };
            session.advance(outcome.landing_step()?, selection);
            Effect::template(template)
        }
        Outcome::Confirmation => {
            session.advance(Step::Confirmation, selection);
            let order_id = generate_order_id(rng);
            session.assign_order(order_id);
            tracing::info!(sender = %session.sender_id, order_id, "Booking confirmed");
            Effect::text(confirmation_text(order_id))
        }
        Outcome::Invalid => {
            if session.record_invalid() {
                Effect::text(INVALID_TEXT)
            } else {
                tracing::info!(sender = %session.sender_id, step = %session.current_step, "Invalid budget exhausted");
                session.reset(Step::Reset, now);
                Effect::text(RESET_TEXT)
            }
        }
        Outcome::Reset => {
            session.reset(Step::Reset, now);
            Effect::text(RESET_TEXT)
        }
        Outcome::Fallback => {
            session.reset(Step::Fallback, now);
            Effect::text(WELCOME_TEXT)
        }
        Outcome::Custom => {
            let body = status_text(session.order_id);
            session.advance(Step::Custom, None);
            Effect::text(body)
        }
        Outcome::Error => return None,
    };

    Some(effect)
}
