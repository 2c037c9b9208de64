//! Booking dialogue state machine
//!
//! Pure classification of inbound messages against the step a sender is
//! waiting in. The runtime owns all I/O.

mod effect;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Template};
pub use state::{Field, Input, Outcome, Selection, Step};
pub use transition::{transition, Decision};
