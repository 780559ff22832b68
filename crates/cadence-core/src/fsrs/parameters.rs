//! FSRS-6 weight vector and its validation

use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, ParameterViolation};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of weights in an FSRS-6 parameter vector
pub const PARAMETER_COUNT: usize = 21;

/// Floor applied to every stability value
pub const MIN_STABILITY: f64 = 0.001;

/// Ceiling for the four initial-stability weights (w0..w3)
pub const INITIAL_STABILITY_MAX: f64 = 100.0;

/// Lower difficulty bound
pub const MIN_DIFFICULTY: f64 = 1.0;

/// Upper difficulty bound
pub const MAX_DIFFICULTY: f64 = 10.0;

/// FSRS-6 default weights
pub const DEFAULT_PARAMETERS: [f64; PARAMETER_COUNT] = [
    0.2172, 1.1771, 3.2602, 16.1507, // w0-w3: initial stability per rating
    7.0114, 0.57, // w4-w5: initial difficulty
    2.0966, 0.0069, // w6-w7: difficulty delta, mean reversion
    1.5261, 0.112, 1.0178, // w8-w10: recall stability
    1.849, 0.1133, 0.3127, 2.2934, // w11-w14: forget stability
    0.2191, 3.0004, // w15-w16: hard penalty, easy bonus
    0.7536, 0.3332, 0.1437, // w17-w19: short-term stability
    0.2,    // w20: forgetting curve decay
];

/// Inclusive lower bound per weight
pub const LOWER_BOUNDS: [f64; PARAMETER_COUNT] = [
    MIN_STABILITY,
    MIN_STABILITY,
    MIN_STABILITY,
    MIN_STABILITY,
    1.0,
    0.001,
    0.001,
    0.001,
    0.0,
    0.0,
    0.001,
    0.001,
    0.001,
    0.001,
    0.0,
    0.0,
    1.0,
    0.0,
    0.0,
    0.0,
    0.1,
];

/// Inclusive upper bound per weight
pub const UPPER_BOUNDS: [f64; PARAMETER_COUNT] = [
    INITIAL_STABILITY_MAX,
    INITIAL_STABILITY_MAX,
    INITIAL_STABILITY_MAX,
    INITIAL_STABILITY_MAX,
    10.0,
    4.0,
    4.0,
    0.75,
    4.5,
    0.8,
    3.5,
    5.0,
    0.25,
    0.9,
    4.0,
    1.0,
    6.0,
    2.0,
    2.0,
    0.8,
    0.8,
];

// ============================================================================
// PARAMETER SET
// ============================================================================

/// A validated weight vector plus the two constants derived from it.
///
/// `decay = -w20` and `factor = 0.9^(1/decay) - 1` are computed once at
/// construction; the weights cannot change afterwards, so they never go stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    weights: [f64; PARAMETER_COUNT],
    #[serde(skip)]
    decay: f64,
    #[serde(skip)]
    factor: f64,
}

impl ParameterSet {
    /// Validate a candidate vector.
    ///
    /// Every out-of-range weight is reported, not just the first.
    pub fn new(candidate: &[f64]) -> Result<Self, ParameterError> {
        let weights: [f64; PARAMETER_COUNT] =
            candidate.try_into().map_err(|_| ParameterError::WrongLength {
                expected: PARAMETER_COUNT,
                actual: candidate.len(),
            })?;

        let violations: Vec<ParameterViolation> = weights
            .iter()
            .enumerate()
            .filter_map(|(index, &value)| {
                let (lower, upper) = (LOWER_BOUNDS[index], UPPER_BOUNDS[index]);
                // NaN fails both comparisons, so test containment rather than exclusion
                (!(lower..=upper).contains(&value)).then_some(ParameterViolation {
                    index,
                    value,
                    lower,
                    upper,
                })
            })
            .collect();

        if !violations.is_empty() {
            return Err(ParameterError::OutOfBounds(violations));
        }

        let decay = -weights[20];
        let factor = 0.9_f64.powf(1.0 / decay) - 1.0;

        Ok(Self {
            weights,
            decay,
            factor,
        })
    }

    /// Weight at index `i` (w0..w20)
    #[inline]
    pub fn w(&self, i: usize) -> f64 {
        self.weights[i]
    }

    /// The full weight vector
    pub fn weights(&self) -> &[f64; PARAMETER_COUNT] {
        &self.weights
    }

    /// Forgetting-curve exponent (negative)
    #[inline]
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Scale chosen so that retrievability is 0.9 when elapsed time equals stability
    #[inline]
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        let decay = -DEFAULT_PARAMETERS[20];
        Self {
            weights: DEFAULT_PARAMETERS,
            decay,
            factor: 0.9_f64.powf(1.0 / decay) - 1.0,
        }
    }
}

impl<'de> Deserialize<'de> for ParameterSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            weights: Vec<f64>,
        }

        let raw = Raw::deserialize(deserializer)?;
        ParameterSet::new(&raw.weights).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
