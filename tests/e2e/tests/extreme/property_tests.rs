//! Property-Based Tests for the Scheduler
//!
//! Tests the following invariants over random configurations and histories:
//! - Every produced card is structurally valid
//! - Difficulty stays in [1, 10] and stability above its floor
//! - Review intervals are whole days within [1, maximum_interval]
//! - Unfuzzed scheduling is a pure function of its inputs
//! - Replaying a card's logs reproduces the card
//! - Parameter vectors are accepted exactly when every weight is in bounds

use proptest::prelude::*;

use cadence_core::fsrs::{LOWER_BOUNDS, MIN_STABILITY, UPPER_BOUNDS};
use cadence_core::{
    Card, ParameterError, Rating, Scheduler, SchedulerConfig, SchedulerError, State,
    DEFAULT_PARAMETERS,
};
use cadence_e2e_tests::TestDataFactory;
use chrono::Duration;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_rating() -> impl Strategy<Value = Rating> {
    prop_oneof![
        Just(Rating::Again),
        Just(Rating::Hard),
        Just(Rating::Good),
        Just(Rating::Easy),
    ]
}

fn arb_steps() -> impl Strategy<Value = Vec<Duration>> {
    prop::collection::vec((1i64..=1440).prop_map(Duration::minutes), 0..=3)
}

fn arb_config() -> impl Strategy<Value = SchedulerConfig> {
    (
        0.70f64..0.97,          // desired_retention
        arb_steps(),            // learning_steps
        arb_steps(),            // relearning_steps
        1u32..=36500,           // maximum_interval
        any::<bool>(),          // enable_fuzzing
    )
        .prop_map(
            |(desired_retention, learning_steps, relearning_steps, maximum_interval, enable_fuzzing)| {
                SchedulerConfig {
                    desired_retention,
                    learning_steps,
                    relearning_steps,
                    maximum_interval,
                    enable_fuzzing,
                    ..Default::default()
                }
            },
        )
}

/// A rating plus how long after the previous review it was given, in minutes
fn arb_history() -> impl Strategy<Value = Vec<(Rating, i64)>> {
    prop::collection::vec((arb_rating(), 0i64..=200 * 24 * 60), 1..30)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_every_review_keeps_invariants(
        config in arb_config(),
        history in arb_history(),
        seed in any::<u64>(),
    ) {
        let maximum = config.maximum_interval;
        let scheduler = Scheduler::with_seed(config, seed).unwrap();
        let mut card = TestDataFactory::new_card(1);
        let mut now = TestDataFactory::fixed_start();

        for (rating, delay) in history {
            now += Duration::minutes(delay);
            card = scheduler.review_card(&card, rating, now).unwrap();

            prop_assert!(card.validate().is_ok());
            prop_assert!(card.difficulty >= 1.0 && card.difficulty <= 10.0);
            prop_assert!(card.stability >= MIN_STABILITY);
            prop_assert_eq!(card.last_review, Some(now));
            prop_assert!(card.due > now);
            prop_assert_eq!(card.state == State::Review, card.step.is_none());

            if card.state == State::Review {
                let gap = card.due - now;
                prop_assert_eq!(gap.num_seconds() % 86_400, 0);
                prop_assert!(gap.num_days() >= 1);
                prop_assert!(gap.num_days() <= i64::from(maximum));
            }

            let r = scheduler.card_retrievability(&card, now + Duration::days(delay % 365));
            prop_assert!((0.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn prop_unfuzzed_scheduling_is_deterministic(
        config in arb_config(),
        history in arb_history(),
    ) {
        let config = SchedulerConfig { enable_fuzzing: false, ..config };
        let a = Scheduler::new(config.clone()).unwrap();
        let b = Scheduler::with_seed(config, 99).unwrap();

        let mut card_a = TestDataFactory::new_card(1);
        let mut card_b = card_a.clone();
        let mut now = TestDataFactory::fixed_start();

        for (rating, delay) in history {
            now += Duration::minutes(delay);
            card_a = a.review_card(&card_a, rating, now).unwrap();
            card_b = b.review_card(&card_b, rating, now).unwrap();
            prop_assert_eq!(&card_a, &card_b);
        }
    }

    #[test]
    fn prop_replaying_logs_reproduces_card(
        config in arb_config(),
        history in arb_history(),
    ) {
        let scheduler = Scheduler::new(SchedulerConfig { enable_fuzzing: false, ..config }).unwrap();
        let mut card = TestDataFactory::new_card(8);
        let mut now = TestDataFactory::fixed_start();
        let mut logs = Vec::new();

        for (rating, delay) in history {
            now += Duration::minutes(delay);
            let (next, log) = scheduler.review_card_with_log(&card, rating, now, None).unwrap();
            card = next;
            logs.push(log);
        }

        // Replay starts from a fresh card; the first review overwrites its due date
        let replayed = scheduler.reschedule_card(&Card::new(8), &logs).unwrap();
        prop_assert_eq!(replayed, card);
    }

    #[test]
    fn prop_parameters_accepted_iff_in_bounds(
        offsets in prop::collection::vec(-0.5f64..1.5, 21),
    ) {
        // Offsets in [0, 1] land inside [lower, upper]; anything else is out
        let weights: Vec<f64> = offsets
            .iter()
            .enumerate()
            .map(|(i, t)| LOWER_BOUNDS[i] + t * (UPPER_BOUNDS[i] - LOWER_BOUNDS[i]))
            .collect();
        let expected_bad: Vec<usize> = weights
            .iter()
            .enumerate()
            .filter(|(i, w)| !(LOWER_BOUNDS[*i]..=UPPER_BOUNDS[*i]).contains(*w))
            .map(|(i, _)| i)
            .collect();

        let result = Scheduler::new(SchedulerConfig { parameters: weights, ..Default::default() });

        match result {
            Ok(_) => prop_assert!(expected_bad.is_empty()),
            Err(SchedulerError::ParameterOutOfBounds(err @ ParameterError::OutOfBounds(_))) => {
                prop_assert_eq!(err.indices(), expected_bad);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

#[test]
fn test_default_parameters_accepted() {
    let scheduler = Scheduler::new(SchedulerConfig {
        parameters: DEFAULT_PARAMETERS.to_vec(),
        ..Default::default()
    });
    assert!(scheduler.is_ok());
}
