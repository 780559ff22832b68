//! # Cadence Core
//!
//! Spaced-repetition scheduling engine built on FSRS-6:
//!
//! - **FSRS-6**: 21-parameter memory model with a personalizable forgetting curve (w20)
//! - **Learning steps**: sub-day Learning and Relearning schedules before and after Review
//! - **Fuzzing**: reproducible interval randomization from an injectable random source
//! - **Replay**: rebuild any card from its review history under a new configuration
//!
//! Cards, review logs and configurations are plain serde values; persisting them
//! is up to the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadence_core::{Card, Rating, Scheduler, SchedulerConfig};
//! use chrono::Utc;
//!
//! // Validates parameters, retention, steps and maximum interval up front
//! let scheduler = Scheduler::new(SchedulerConfig::default())?;
//!
//! let card = Card::new(1);
//! let (card, log) = scheduler.review_card_with_log(&card, Rating::Good, Utc::now(), None)?;
//!
//! println!("next due {} ({})", card.due, card.state);
//! let r = scheduler.card_retrievability(&card, Utc::now());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod card;
pub mod error;
pub mod fsrs;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Card model
pub use card::{Card, InvalidRating, Rating, ReviewLog, State};

// Errors
pub use error::{CardViolation, ParameterError, ParameterViolation, Result, SchedulerError};

// FSRS-6 algorithm
pub use fsrs::{
    // Core functions for advanced usage
    fuzz_range,
    next_interval,
    retrievability,
    ParameterSet,
    PreviewResults,
    RandomSource,
    Scheduler,
    SchedulerConfig,
    SeededRandom,
    ThreadRandom,
    DEFAULT_PARAMETERS,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// FSRS algorithm version (6 = 21 parameters)
pub const FSRS_VERSION: u8 = 6;

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Card, PreviewResults, Rating, Result, ReviewLog, Scheduler, SchedulerConfig,
        SchedulerError, State,
    };
}
