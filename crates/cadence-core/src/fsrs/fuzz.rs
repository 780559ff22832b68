//! Interval fuzzing
//!
//! Spreads cards that would otherwise land on the same day by nudging
//! multi-day Review intervals within a tolerance that grows piecewise-linearly
//! with the interval length.
//!
//! The random draw comes from a [`RandomSource`] owned by the scheduler, never
//! from process-global state, so a seeded scheduler is reproducible.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

// ============================================================================
// FUZZ RANGES
// ============================================================================

/// Intervals shorter than this many days are never fuzzed
pub const FUZZ_THRESHOLD_DAYS: f64 = 2.5;

/// Lowest interval a fuzzed Review card can be given
pub const MIN_FUZZED_INTERVAL: u32 = 2;

/// One segment of the tolerance table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzRange {
    pub start: f64,
    pub end: f64,
    pub factor: f64,
}

/// Tolerance table; each segment adds `factor` days per day of overlap
pub const FUZZ_RANGES: [FuzzRange; 3] = [
    FuzzRange {
        start: 2.5,
        end: 7.0,
        factor: 0.15,
    },
    FuzzRange {
        start: 7.0,
        end: 20.0,
        factor: 0.1,
    },
    FuzzRange {
        start: 20.0,
        end: f64::INFINITY,
        factor: 0.05,
    },
];

/// Inclusive `(min_ivl, max_ivl)` window a fuzzed interval may land in
pub fn fuzz_range(days: f64, maximum_interval: u32) -> (u32, u32) {
    let delta = FUZZ_RANGES.iter().fold(1.0, |acc, range| {
        acc + range.factor * (days.min(range.end) - range.start).max(0.0)
    });

    let max_ivl = ((days + delta).round() as u32).min(maximum_interval);
    let min_ivl = ((days - delta).round().max(f64::from(MIN_FUZZED_INTERVAL)) as u32).min(max_ivl);

    (min_ivl, max_ivl)
}

/// Randomize a Review interval.
///
/// Intervals under [`FUZZ_THRESHOLD_DAYS`] come back unchanged.
pub fn fuzz_interval(days: u32, maximum_interval: u32, source: &dyn RandomSource) -> u32 {
    let raw = f64::from(days);
    if raw < FUZZ_THRESHOLD_DAYS {
        return days;
    }

    let (min_ivl, max_ivl) = fuzz_range(raw, maximum_interval);
    let draw = source.next_f64();
    let spread = f64::from(max_ivl - min_ivl + 1);
    let fuzzed = (f64::from(min_ivl) + draw * spread).round() as u32;
    let fuzzed = fuzzed.clamp(min_ivl, max_ivl).min(maximum_interval);

    trace!(days, min_ivl, max_ivl, fuzzed, "fuzzed review interval");
    fuzzed
}

// ============================================================================
// RANDOM SOURCES
// ============================================================================

/// Uniform draws in `[0, 1)`.
///
/// Implementations must be safe to call from several threads at once, since
/// one scheduler may serve many concurrent reviews.
pub trait RandomSource: Send + Sync + fmt::Debug {
    fn next_f64(&self) -> f64;
}

/// Draws from the calling thread's own generator; nothing is shared
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

/// Deterministic ChaCha8 stream behind a mutex
pub struct SeededRandom {
    seed: u64,
    rng: Mutex<ChaCha8Rng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Seed this stream was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandom")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        // A panic mid-draw cannot leave the generator inconsistent
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.r#gen::<f64>()
    }
}

// ============================================================================
// TESTS
// ============================================================================
