//! Error types
//!
//! Two families of failure exist in the engine:
//! - configuration errors, raised once when a [`Scheduler`](crate::Scheduler) is built
//! - invariant violations, raised when a card snapshot is corrupt
//!
//! Neither is retried anywhere; every operation is a terminating computation.

use std::fmt;

use crate::card::State;

// ============================================================================
// PARAMETER ERRORS
// ============================================================================

/// A single parameter that fell outside its allowed range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterViolation {
    /// Index into the weight vector (w0..w20)
    pub index: usize,
    /// Offending value
    pub value: f64,
    /// Inclusive lower bound for this index
    pub lower: f64,
    /// Inclusive upper bound for this index
    pub upper: f64,
}

impl fmt::Display for ParameterViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameters[{}] = {} is out of bounds: ({}, {})",
            self.index, self.value, self.lower, self.upper
        )
    }
}

/// Rejection of a candidate parameter vector
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    /// The vector does not have exactly one entry per weight
    #[error("expected {expected} parameters, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    /// One or more weights lie outside their bounds; all of them are listed
    #[error("one or more parameters are out of bounds: {}", join_violations(.0))]
    OutOfBounds(Vec<ParameterViolation>),
}

impl ParameterError {
    /// Indices of every offending weight (empty for a length mismatch)
    pub fn indices(&self) -> Vec<usize> {
        match self {
            ParameterError::WrongLength { .. } => Vec::new(),
            ParameterError::OutOfBounds(violations) => {
                violations.iter().map(|v| v.index).collect()
            }
        }
    }
}

fn join_violations(violations: &[ParameterViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// CARD INVARIANTS
// ============================================================================

/// Ways a card snapshot can be corrupt
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CardViolation {
    /// Stability and difficulty must be both zero or both non-zero
    #[error(
        "stability ({stability}) and difficulty ({difficulty}) must be either both zero or both non-zero"
    )]
    StabilityDifficultyMismatch { stability: f64, difficulty: f64 },
    /// State value outside Learning/Review/Relearning
    #[error("unknown card state {0}")]
    UnknownState(i64),
    /// Review cards carry no step; Learning/Relearning cards always do
    #[error("state {state} cannot carry step {step:?}")]
    StepMismatch { state: State, step: Option<usize> },
    /// NaN or infinite stability/difficulty
    #[error("stability and difficulty must be finite")]
    NonFiniteMemory,
    /// Negative stability, or a set difficulty outside [1, 10]
    #[error(
        "stability ({stability}) must be non-negative and difficulty ({difficulty}) 0 or in [1, 10]"
    )]
    MemoryOutOfRange { stability: f64, difficulty: f64 },
    /// A Review card that was never given a memory state
    #[error("card in state {0} has no memory state")]
    MissingMemory(State),
}

// ============================================================================
// SCHEDULER ERRORS
// ============================================================================

/// Scheduler error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The parameter vector was rejected
    #[error("Parameter out of bounds: {0}")]
    ParameterOutOfBounds(#[from] ParameterError),
    /// Any other option of the configuration was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A card handed to the scheduler is corrupt
    #[error("Invariant violation on card {card_id}: {violation}")]
    InvariantViolation {
        card_id: i64,
        violation: CardViolation,
    },
    /// A review log belongs to a different card than the one being replayed
    #[error("Review log for card {found} cannot be replayed onto card {expected}")]
    ReviewLogMismatch { expected: i64, found: i64 },
    /// The next due date falls outside the representable time range
    #[error("Due date of card {card_id} is out of range after {interval_secs}s")]
    DueDateOutOfRange { card_id: i64, interval_secs: i64 },
    /// Configuration could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchedulerError {
    /// True for errors caused by corrupt input data rather than configuration
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SchedulerError::InvariantViolation { .. })
    }
}

/// Scheduler result type
pub type Result<T> = std::result::Result<T, SchedulerError>;

// ============================================================================
// TESTS
// ============================================================================
