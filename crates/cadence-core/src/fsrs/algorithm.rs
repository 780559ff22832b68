//! FSRS-6 memory model
//!
//! Pure functions over a validated [`ParameterSet`]. None of them allocate or
//! touch shared state, so they are safe to call from any number of threads.
//!
//! - Retrievability: `R = (1 + factor * t / S)^decay`
//! - Interval: `t = S / factor * (R_target^(1/decay) - 1)`

use serde::{Deserialize, Serialize};

use super::parameters::{MAX_DIFFICULTY, MIN_DIFFICULTY, MIN_STABILITY, ParameterSet};
use crate::card::Rating;

// ============================================================================
// TYPES
// ============================================================================

/// Stability and difficulty of one card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub stability: f64,
    pub difficulty: f64,
}

/// Which update rule a review falls under
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateRegime {
    /// First review of a card that has no memory state yet
    Initial,
    /// Reviewed again less than a day after the previous review
    ShortTerm,
    /// Reviewed a day or more later; carries the retrievability at review time
    LongTerm { retrievability: f64 },
}

impl UpdateRegime {
    /// Name used in trace output
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateRegime::Initial => "initial",
            UpdateRegime::ShortTerm => "short_term",
            UpdateRegime::LongTerm { .. } => "long_term",
        }
    }
}

// ============================================================================
// CLAMPS
// ============================================================================

/// Floor stability at [`MIN_STABILITY`]
#[inline]
pub fn clamp_stability(stability: f64) -> f64 {
    stability.max(MIN_STABILITY)
}

/// Keep difficulty inside [1, 10]
#[inline]
pub fn clamp_difficulty(difficulty: f64) -> f64 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

// ============================================================================
// RETRIEVABILITY
// ============================================================================

/// Probability of recall after `elapsed_days` at the given stability
pub fn retrievability(params: &ParameterSet, elapsed_days: f64, stability: f64) -> f64 {
    (1.0 + params.factor() * elapsed_days / stability).powf(params.decay())
}

// ============================================================================
// INITIAL STATE
// ============================================================================

/// Stability after the very first review
pub fn initial_stability(params: &ParameterSet, rating: Rating) -> f64 {
    clamp_stability(params.w(rating.index()))
}

/// Difficulty after the very first review
pub fn initial_difficulty(params: &ParameterSet, rating: Rating) -> f64 {
    clamp_difficulty(initial_difficulty_unclamped(params, rating))
}

fn initial_difficulty_unclamped(params: &ParameterSet, rating: Rating) -> f64 {
    params.w(4) - (params.w(5) * (rating.as_f64() - 1.0)).exp() + 1.0
}

// ============================================================================
// STABILITY UPDATES
// ============================================================================

/// Stability after a review less than a day after the previous one.
///
/// A successful recall (Good/Easy) never lowers stability here.
pub fn short_term_stability(params: &ParameterSet, stability: f64, rating: Rating) -> f64 {
    let mut increase = (params.w(17) * (rating.as_f64() - 3.0 + params.w(18))).exp()
        * stability.powf(-params.w(19));

    if matches!(rating, Rating::Good | Rating::Easy) {
        increase = increase.max(1.0);
    }

    clamp_stability(stability * increase)
}

/// Post-lapse stability: the smaller of the long-term and short-term estimates
pub fn next_forget_stability(
    params: &ParameterSet,
    difficulty: f64,
    stability: f64,
    retrievability: f64,
) -> f64 {
    let long_term = params.w(11)
        * difficulty.powf(-params.w(12))
        * ((stability + 1.0).powf(params.w(13)) - 1.0)
        * ((1.0 - retrievability) * params.w(14)).exp();

    let short_term = stability / (params.w(17) * params.w(18)).exp();

    long_term.min(short_term)
}

/// Stability after a successful recall (Hard, Good or Easy)
pub fn next_recall_stability(
    params: &ParameterSet,
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    rating: Rating,
) -> f64 {
    let hard_penalty = if rating == Rating::Hard {
        params.w(15)
    } else {
        1.0
    };
    let easy_bonus = if rating == Rating::Easy {
        params.w(16)
    } else {
        1.0
    };

    stability
        * (1.0
            + params.w(8).exp()
                * (11.0 - difficulty)
                * stability.powf(-params.w(9))
                * (((1.0 - retrievability) * params.w(10)).exp() - 1.0)
                * hard_penalty
                * easy_bonus)
}

/// Long-term stability update, dispatching on the rating
pub fn next_stability(
    params: &ParameterSet,
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    rating: Rating,
) -> f64 {
    let next = match rating {
        Rating::Again => next_forget_stability(params, difficulty, stability, retrievability),
        _ => next_recall_stability(params, difficulty, stability, retrievability, rating),
    };
    clamp_stability(next)
}

// ============================================================================
// DIFFICULTY UPDATE
// ============================================================================

/// Difficulty after a non-initial review.
///
/// The rating delta is damped as difficulty approaches 10, then the result is
/// pulled toward the initial difficulty of an Easy first review.
pub fn next_difficulty(params: &ParameterSet, difficulty: f64, rating: Rating) -> f64 {
    let delta = -params.w(6) * (rating.as_f64() - 3.0);
    let damped = (10.0 - difficulty) * delta / 9.0;
    let target = difficulty + damped;

    let reverted =
        params.w(7) * initial_difficulty(params, Rating::Easy) + (1.0 - params.w(7)) * target;

    clamp_difficulty(reverted)
}

// ============================================================================
// COMBINED UPDATE
// ============================================================================

/// Apply one review to a memory state under the given regime.
///
/// Stability is always computed from the previous difficulty, before the
/// difficulty itself moves.
pub fn next_memory_state(
    params: &ParameterSet,
    memory: MemoryState,
    regime: UpdateRegime,
    rating: Rating,
) -> MemoryState {
    match regime {
        UpdateRegime::Initial => MemoryState {
            stability: initial_stability(params, rating),
            difficulty: initial_difficulty(params, rating),
        },
        UpdateRegime::ShortTerm => MemoryState {
            stability: short_term_stability(params, memory.stability, rating),
            difficulty: next_difficulty(params, memory.difficulty, rating),
        },
        UpdateRegime::LongTerm { retrievability } => MemoryState {
            stability: next_stability(
                params,
                memory.difficulty,
                memory.stability,
                retrievability,
                rating,
            ),
            difficulty: next_difficulty(params, memory.difficulty, rating),
        },
    }
}

// ============================================================================
// INTERVAL
// ============================================================================

/// Whole days until recall probability falls to `desired_retention`,
/// clamped to `[1, maximum_interval]`
pub fn next_interval(
    params: &ParameterSet,
    stability: f64,
    desired_retention: f64,
    maximum_interval: u32,
) -> u32 {
    let days = (stability / params.factor())
        * (desired_retention.powf(1.0 / params.decay()) - 1.0);

    days.round().clamp(1.0, f64::from(maximum_interval.max(1))) as u32
}

// ============================================================================
// TESTS
// ============================================================================
