//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use crate::dispatcher::{dispatch, ORDER_ID_RANGE};
use crate::session::{Session, MAX_INVALID_ATTEMPTS};
use chrono::{DateTime, Utc};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Test Helpers
// ============================================================================

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::None),
        Just(Step::First),
        Just(Step::Service),
        Just(Step::Date),
        Just(Step::Slot),
        Just(Step::Employee),
        Just(Step::Confirmation),
        Just(Step::Fallback),
        Just(Step::Reset),
        Just(Step::Custom),
    ]
}

fn arb_engaged_step() -> impl Strategy<Value = Step> {
    arb_step().prop_filter("engaged", |s| s.is_engaged())
}

fn arb_code() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(SERVICE_CODES.to_vec()).prop_map(String::from),
        prop::sample::select(DATE_CODES.to_vec()).prop_map(String::from),
        prop::sample::select(SLOT_CODES.to_vec()).prop_map(String::from),
        prop::sample::select(EMPLOYEE_CODES.to_vec()).prop_map(String::from),
        "[0-9]{1,4}",
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(GREETINGS.to_vec()).prop_map(|g| g.to_uppercase()),
        Just("reset".to_string()),
        "[a-zA-Z ]{1,20}",
    ]
}

fn arb_input() -> impl Strategy<Value = Input> {
    prop_oneof![
        arb_text().prop_map(Input::Text),
        arb_code().prop_map(Input::Button),
        arb_code().prop_map(Input::List),
    ]
}

fn arb_session() -> impl Strategy<Value = Session> {
    (arb_step(), 0..=MAX_INVALID_ATTEMPTS, proptest::option::of(arb_code())).prop_map(
        |(step, invalid_count, service)| {
            let mut session = Session::new("whatsapp:+15550001", now());
            session.current_step = step;
            session.invalid_count = invalid_count;
            session.service = service;
            session
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Non-blank input never classifies as a transport error
    #[test]
    fn prop_nonblank_input_is_never_error(step in arb_step(), input in arb_input()) {
        prop_assume!(!input.value().trim().is_empty());
        prop_assert_ne!(transition(step, &input).outcome, Outcome::Error);
    }

    /// A selection is only persisted by an outcome that moves the flow forward
    #[test]
    fn prop_selection_only_on_progress(step in arb_step(), input in arb_input()) {
        let decision = transition(step, &input);
        if decision.selection.is_some() {
            prop_assert!(matches!(
                decision.outcome,
                Outcome::Date | Outcome::Slot | Outcome::Employee | Outcome::Confirmation
            ));
            prop_assert_eq!(step.expects(), input.kind());
        }
    }

    /// Input of the wrong kind for a structured step is always invalid
    #[test]
    fn prop_kind_mismatch_is_invalid(step in arb_step(), code in arb_code(), as_button in any::<bool>()) {
        let input = if as_button { Input::Button(code) } else { Input::List(code) };
        prop_assume!(step.expects() != input.kind());
        prop_assert_eq!(transition(step, &input).outcome, Outcome::Invalid);
    }

    /// Greetings start a booking from anywhere
    #[test]
    fn prop_greeting_always_starts_booking(step in arb_step(), greeting in prop::sample::select(GREETINGS.to_vec())) {
        let decision = transition(step, &Input::Text(greeting.to_string()));
        prop_assert_eq!(decision.outcome, Outcome::Service);
    }

    /// Reset is absorbing for any engaged session
    #[test]
    fn prop_reset_is_absorbing(mut session in arb_session(), step in arb_engaged_step()) {
        session.current_step = step;
        let decision = transition(step, &Input::Text("reset".to_string()));
        let mut rng = StdRng::seed_from_u64(1);
        dispatch(&mut session, decision, now(), &mut rng);

        prop_assert_eq!(session.current_step, Step::Reset);
        prop_assert!(!session.has_selections());
        prop_assert_eq!(session.invalid_count, 0);
    }

    /// The invalid counter stays within budget over any message sequence
    #[test]
    fn prop_invalid_count_bounded(
        mut session in arb_session(),
        inputs in proptest::collection::vec(arb_input(), 1..30),
        seed in any::<u64>()
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        for input in inputs {
            let decision = transition(session.current_step, &input);
            dispatch(&mut session, decision, now(), &mut rng);
            prop_assert!(session.invalid_count <= MAX_INVALID_ATTEMPTS);
            if let Some(order_id) = session.order_id {
                prop_assert!(ORDER_ID_RANGE.contains(&order_id));
            }
        }
    }

    /// Once the budget is spent, the next invalid answer wipes the session
    #[test]
    fn prop_exhausted_budget_resets(mut session in arb_session(), step in arb_engaged_step()) {
        session.current_step = step;
        session.invalid_count = MAX_INVALID_ATTEMPTS;
        let mut rng = StdRng::seed_from_u64(3);
        dispatch(&mut session, Decision::new(Outcome::Invalid), now(), &mut rng);

        prop_assert_eq!(session.current_step, Step::Reset);
        prop_assert!(!session.has_selections());
    }
}
