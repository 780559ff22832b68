//! Card module - the data that crosses the engine boundary
//!
//! - [`Card`]: an immutable snapshot of one item's scheduling state
//! - [`ReviewLog`]: an append-only record of one review event
//! - [`State`] and [`Rating`]: the small enums both of them carry
//!
//! States and ratings travel as integers (Learning=1, Review=2, Relearning=3;
//! Again=1 .. Easy=4). Decoding an unknown value fails instead of guessing.

mod review_log;
mod snapshot;

pub use review_log::ReviewLog;
pub use snapshot::Card;

use serde::{Deserialize, Serialize};

use crate::error::CardViolation;

// ============================================================================
// STATE
// ============================================================================

/// Position of a card in the learning state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "i64", into = "i64")]
pub enum State {
    /// Working through the learning steps (every new card starts here)
    #[default]
    Learning = 1,
    /// Steady-state, stability-driven scheduling
    Review = 2,
    /// Working through the relearning steps after a lapse
    Relearning = 3,
}

impl State {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Learning => "learning",
            State::Review => "review",
            State::Relearning => "relearning",
        }
    }

    /// Parse from string name
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "learning" => Some(State::Learning),
            "review" => Some(State::Review),
            "relearning" => Some(State::Relearning),
            _ => None,
        }
    }

    /// Whether this state is driven by a step sequence
    #[inline]
    pub fn uses_steps(&self) -> bool {
        matches!(self, State::Learning | State::Relearning)
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i64> for State {
    type Error = CardViolation;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(State::Learning),
            2 => Ok(State::Review),
            3 => Ok(State::Relearning),
            other => Err(CardViolation::UnknownState(other)),
        }
    }
}

impl From<State> for i64 {
    fn from(state: State) -> i64 {
        state as i64
    }
}

// ============================================================================
// RATING
// ============================================================================

/// Rejected integer rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid rating {0}, expected 1 (Again) to 4 (Easy)")]
pub struct InvalidRating(pub i64);

/// How well the item was recalled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rating {
    /// Forgot the item
    Again = 1,
    /// Recalled with serious difficulty
    Hard = 2,
    /// Recalled after some hesitation
    Good = 3,
    /// Recalled instantly
    Easy = 4,
}

impl Rating {
    /// All ratings in ascending order
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Convert from the 1..=4 integer encoding
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::try_from(i64::from(value)).ok()
    }

    /// Ordinal value as used by the memory formulas (1.0 ..= 4.0)
    #[inline]
    pub fn as_f64(&self) -> f64 {
        *self as i32 as f64
    }

    /// Zero-based index, used to look up the initial stability weight
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize - 1
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    /// Parse from string name
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "again" => Some(Rating::Again),
            "hard" => Some(Rating::Hard),
            "good" => Some(Rating::Good),
            "easy" => Some(Rating::Easy),
            _ => None,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i64> for Rating {
    type Error = InvalidRating;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(InvalidRating(other)),
        }
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> i64 {
        rating as i64
    }
}

// ============================================================================
// TESTS
// ============================================================================
