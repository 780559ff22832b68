//! Card snapshot
//!
//! A card is a plain value. The scheduler never mutates the card it is given;
//! each review hands back a fresh snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::State;
use crate::error::CardViolation;
use crate::fsrs::{MAX_DIFFICULTY, MIN_DIFFICULTY};

/// Scheduling state of one memorization item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Caller-assigned identity
    pub id: i64,
    /// Position in the state machine
    pub state: State,
    /// Index into the learning/relearning steps; `None` once in Review
    pub step: Option<usize>,
    /// Days until recall probability falls to 90% (0 = never reviewed)
    pub stability: f64,
    /// Inherent difficulty in [1, 10] (0 = never reviewed)
    pub difficulty: f64,
    /// When the card should next be shown
    pub due: DateTime<Utc>,
    /// When the card was last reviewed
    pub last_review: Option<DateTime<Utc>>,
}

impl Card {
    /// Create an empty card that is due now
    pub fn new(id: i64) -> Self {
        Self::new_at(id, Utc::now())
    }

    /// Create an empty card due at the given time
    pub fn new_at(id: i64, due: DateTime<Utc>) -> Self {
        Self {
            id,
            state: State::Learning,
            step: Some(0),
            stability: 0.0,
            difficulty: 0.0,
            due,
            last_review: None,
        }
    }

    /// True until the first review assigns a memory state
    pub fn is_new(&self) -> bool {
        self.stability == 0.0 && self.difficulty == 0.0
    }

    /// Check if this card is due at the given time
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }

    /// Check the structural invariants of this snapshot.
    ///
    /// Stability and difficulty are either both unset (zero) or both set and
    /// within range (stability non-negative, difficulty in [1, 10]), a
    /// Review card always has them set, and the step is present exactly when
    /// the state is step-driven.
    pub fn validate(&self) -> Result<(), CardViolation> {
        if !self.stability.is_finite() || !self.difficulty.is_finite() {
            return Err(CardViolation::NonFiniteMemory);
        }

        if (self.stability == 0.0) != (self.difficulty == 0.0) {
            return Err(CardViolation::StabilityDifficultyMismatch {
                stability: self.stability,
                difficulty: self.difficulty,
            });
        }

        let difficulty_in_range = self.difficulty == 0.0
            || (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty);
        if self.stability < 0.0 || !difficulty_in_range {
            return Err(CardViolation::MemoryOutOfRange {
                stability: self.stability,
                difficulty: self.difficulty,
            });
        }

        if self.state == State::Review && self.is_new() {
            return Err(CardViolation::MissingMemory(self.state));
        }

        if self.state.uses_steps() != self.step.is_some() {
            return Err(CardViolation::StepMismatch {
                state: self.state,
                step: self.step,
            });
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
