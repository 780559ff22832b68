//! FSRS-6 (Free Spaced Repetition Scheduler) Module
//!
//! Reference: https://github.com/open-spaced-repetition/fsrs4anki
//!
//! ## Core Formulas:
//! - Retrievability: R = (1 + FACTOR * t / S)^(-w20) where FACTOR = 0.9^(-1/w20) - 1
//! - Interval: t = S/FACTOR * (R^(1/-w20) - 1), rounded and clamped to [1, maximum_interval]
//!
//! ## Layout
//! - `parameters`: the 21-weight vector, its bounds and derived constants
//! - `algorithm`: pure memory-model formulas
//! - `fuzz`: interval randomization and the injectable random source
//! - `scheduler`: configuration and the Learning/Review/Relearning state machine

mod algorithm;
mod fuzz;
mod parameters;
mod scheduler;

pub use algorithm::{
    clamp_difficulty,
    clamp_stability,
    initial_difficulty,
    initial_stability,
    next_difficulty,
    next_forget_stability,
    next_interval,
    next_memory_state,
    next_recall_stability,
    next_stability,
    // Core functions
    retrievability,
    short_term_stability,
    MemoryState,
    UpdateRegime,
};

pub use parameters::{
    ParameterSet,
    // Constants
    DEFAULT_PARAMETERS,
    INITIAL_STABILITY_MAX,
    LOWER_BOUNDS,
    MAX_DIFFICULTY,
    MIN_DIFFICULTY,
    MIN_STABILITY,
    PARAMETER_COUNT,
    UPPER_BOUNDS,
};

pub use fuzz::{
    fuzz_interval, fuzz_range, FuzzRange, RandomSource, SeededRandom, ThreadRandom,
    FUZZ_RANGES, FUZZ_THRESHOLD_DAYS, MIN_FUZZED_INTERVAL,
};

pub use scheduler::{
    PreviewResults, Scheduler, SchedulerConfig, DEFAULT_MAXIMUM_INTERVAL, DEFAULT_RETENTION,
    MAXIMUM_INTERVAL_LIMIT, MAXIMUM_STEP_DAYS,
};
