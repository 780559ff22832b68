//! FSRS-6 scheduler
//!
//! Owns one validated configuration and turns `(card, rating, time)` into the
//! next card snapshot. All working state lives on the stack of a single call,
//! so one `Scheduler` can be shared by any number of threads reviewing
//! different cards; the only shared resource is its [`RandomSource`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::algorithm::{MemoryState, UpdateRegime, next_interval, next_memory_state, retrievability};
use super::fuzz::{RandomSource, SeededRandom, ThreadRandom, fuzz_interval};
use super::parameters::{DEFAULT_PARAMETERS, ParameterSet};
use crate::card::{Card, Rating, ReviewLog, State};
use crate::error::{Result, SchedulerError};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default target probability of recall at the due date
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Default cap on any Review interval, in days (100 years)
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36500;

/// Largest accepted `maximum_interval`, in days (1000 years)
pub const MAXIMUM_INTERVAL_LIMIT: u32 = 365_000;

/// Longest accepted learning or relearning step, in days
pub const MAXIMUM_STEP_DAYS: i64 = 365;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Every option a scheduler is built from.
///
/// Steps are (de)serialized as whole seconds. Missing fields take their
/// defaults, so `{}` decodes to [`SchedulerConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// FSRS-6 weights (21 values)
    pub parameters: Vec<f64>,
    /// Target recall probability in (0, 1)
    pub desired_retention: f64,
    /// Sub-day schedule before a card first reaches Review
    #[serde(with = "step_seconds")]
    pub learning_steps: Vec<Duration>,
    /// Sub-day schedule after a lapse in Review
    #[serde(with = "step_seconds")]
    pub relearning_steps: Vec<Duration>,
    /// Hard cap on any computed interval, in days
    pub maximum_interval: u32,
    /// Randomize multi-day Review intervals
    pub enable_fuzzing: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            parameters: DEFAULT_PARAMETERS.to_vec(),
            desired_retention: DEFAULT_RETENTION,
            learning_steps: vec![Duration::minutes(1), Duration::minutes(10)],
            relearning_steps: vec![Duration::minutes(10)],
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            enable_fuzzing: true,
        }
    }
}

impl SchedulerConfig {
    /// Decode a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode this configuration as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn validate_options(&self) -> Result<()> {
        if !(self.desired_retention > 0.0 && self.desired_retention < 1.0) {
            return Err(SchedulerError::InvalidConfig(format!(
                "desired_retention must be in (0, 1), got {}",
                self.desired_retention
            )));
        }

        if !(1..=MAXIMUM_INTERVAL_LIMIT).contains(&self.maximum_interval) {
            return Err(SchedulerError::InvalidConfig(format!(
                "maximum_interval must be in [1, {MAXIMUM_INTERVAL_LIMIT}] days, got {}",
                self.maximum_interval
            )));
        }

        for (name, steps) in [
            ("learning_steps", &self.learning_steps),
            ("relearning_steps", &self.relearning_steps),
        ] {
            let longest = Duration::days(MAXIMUM_STEP_DAYS);
            if let Some(bad) = steps
                .iter()
                .find(|step| **step <= Duration::zero() || **step > longest)
            {
                return Err(SchedulerError::InvalidConfig(format!(
                    "{name} must be positive and at most {MAXIMUM_STEP_DAYS} days, got {}s",
                    bad.num_seconds()
                )));
            }
        }

        Ok(())
    }
}

mod step_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(steps: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(steps.iter().map(Duration::num_seconds))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Duration>, D::Error> {
        let seconds = Vec::<i64>::deserialize(deserializer)?;
        seconds
            .into_iter()
            .map(|secs| {
                Duration::try_seconds(secs)
                    .ok_or_else(|| serde::de::Error::custom(format!("step of {secs}s is out of range")))
            })
            .collect()
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// The card each rating would produce, computed without committing to any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResults {
    pub again: Card,
    pub hard: Card,
    pub good: Card,
    pub easy: Card,
}

impl PreviewResults {
    /// Outcome for one rating
    pub fn get(&self, rating: Rating) -> &Card {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }
}

/// Raw interval chosen by the state machine, before fuzzing
#[derive(Debug, Clone, Copy, PartialEq)]
enum ScheduledInterval {
    /// Whole days from the memory model (Review only)
    Days(u32),
    /// A learning or relearning step
    Step(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    state: State,
    step: Option<usize>,
    interval: ScheduledInterval,
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// FSRS-6 scheduler
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    params: ParameterSet,
    random: Arc<dyn RandomSource>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            config: SchedulerConfig::default(),
            params: ParameterSet::default(),
            random: Arc::new(ThreadRandom),
        }
    }
}

impl Scheduler {
    /// Build a scheduler that fuzzes with the calling thread's generator
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        Self::with_random_source(config, Arc::new(ThreadRandom))
    }

    /// Build a scheduler whose fuzzing is reproducible from `seed`
    pub fn with_seed(config: SchedulerConfig, seed: u64) -> Result<Self> {
        Self::with_random_source(config, Arc::new(SeededRandom::new(seed)))
    }

    /// Build a scheduler drawing fuzz from the given source
    pub fn with_random_source(
        config: SchedulerConfig,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self> {
        let params = ParameterSet::new(&config.parameters).map_err(|e| {
            warn!(error = %e, "rejecting scheduler parameters");
            SchedulerError::from(e)
        })?;

        config.validate_options().inspect_err(|e| {
            warn!(error = %e, "rejecting scheduler configuration");
        })?;

        Ok(Self {
            config,
            params,
            random,
        })
    }

    /// The validated configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The validated parameter set
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// Target recall probability
    pub fn desired_retention(&self) -> f64 {
        self.config.desired_retention
    }

    /// Steps before a card first reaches Review
    pub fn learning_steps(&self) -> &[Duration] {
        &self.config.learning_steps
    }

    /// Steps after a lapse in Review
    pub fn relearning_steps(&self) -> &[Duration] {
        &self.config.relearning_steps
    }

    /// Cap on any Review interval, in days
    pub fn maximum_interval(&self) -> u32 {
        self.config.maximum_interval
    }

    /// Whether Review intervals are fuzzed
    pub fn fuzzing_enabled(&self) -> bool {
        self.config.enable_fuzzing
    }

    /// Probability the card is still remembered at `now`.
    ///
    /// Zero for a card that has never been reviewed.
    pub fn card_retrievability(&self, card: &Card, now: DateTime<Utc>) -> f64 {
        match card.last_review {
            Some(last) if !card.is_new() => retrievability(
                &self.params,
                elapsed_days(last, now).max(0.0),
                card.stability,
            ),
            _ => 0.0,
        }
    }

    /// Days the memory model would schedule for the given stability
    pub fn next_interval(&self, stability: f64) -> u32 {
        next_interval(
            &self.params,
            stability,
            self.config.desired_retention,
            self.config.maximum_interval,
        )
    }

    /// Review a card and return its next snapshot.
    ///
    /// The input card is left untouched. A corrupt card is rejected with
    /// [`SchedulerError::InvariantViolation`] rather than repaired.
    pub fn review_card(
        &self,
        card: &Card,
        rating: Rating,
        review_datetime: DateTime<Utc>,
    ) -> Result<Card> {
        card.validate().map_err(|violation| {
            warn!(card_id = card.id, %violation, "rejecting corrupt card");
            SchedulerError::InvariantViolation {
                card_id: card.id,
                violation,
            }
        })?;

        let regime = self.update_regime(card, review_datetime);
        trace!(card_id = card.id, regime = regime.as_str(), "memory update");

        let memory = next_memory_state(
            &self.params,
            MemoryState {
                stability: card.stability,
                difficulty: card.difficulty,
            },
            regime,
            rating,
        );

        let transition = self.transition(card, rating, memory.stability);

        let interval = match transition.interval {
            ScheduledInterval::Days(days)
                if self.config.enable_fuzzing && transition.state == State::Review =>
            {
                let fuzzed = fuzz_interval(days, self.config.maximum_interval, &*self.random);
                Duration::days(i64::from(fuzzed))
            }
            ScheduledInterval::Days(days) => Duration::days(i64::from(days)),
            ScheduledInterval::Step(step) => step,
        };

        let due = review_datetime.checked_add_signed(interval).ok_or_else(|| {
            warn!(card_id = card.id, interval_secs = interval.num_seconds(), "due date out of range");
            SchedulerError::DueDateOutOfRange {
                card_id: card.id,
                interval_secs: interval.num_seconds(),
            }
        })?;

        let next = Card {
            id: card.id,
            state: transition.state,
            step: transition.step,
            stability: memory.stability,
            difficulty: memory.difficulty,
            due,
            last_review: Some(review_datetime),
        };

        debug!(
            card_id = card.id,
            %rating,
            from = %card.state,
            to = %next.state,
            stability = next.stability,
            difficulty = next.difficulty,
            interval_secs = interval.num_seconds(),
            "card reviewed"
        );

        Ok(next)
    }

    /// Review a card and also produce the log entry for this review
    pub fn review_card_with_log(
        &self,
        card: &Card,
        rating: Rating,
        review_datetime: DateTime<Utc>,
        review_duration: Option<std::time::Duration>,
    ) -> Result<(Card, ReviewLog)> {
        let next = self.review_card(card, rating, review_datetime)?;
        let log = ReviewLog::new(card.id, rating, review_datetime, review_duration);
        Ok((next, log))
    }

    /// What each of the four ratings would do to this card at `now`
    pub fn preview_card(&self, card: &Card, now: DateTime<Utc>) -> Result<PreviewResults> {
        Ok(PreviewResults {
            again: self.review_card(card, Rating::Again, now)?,
            hard: self.review_card(card, Rating::Hard, now)?,
            good: self.review_card(card, Rating::Good, now)?,
            easy: self.review_card(card, Rating::Easy, now)?,
        })
    }

    /// Rebuild a card by replaying its review history under this scheduler.
    ///
    /// Logs are applied in chronological order to a fresh card with the same
    /// id. With no logs the card comes back unchanged.
    pub fn reschedule_card(&self, card: &Card, logs: &[ReviewLog]) -> Result<Card> {
        if let Some(foreign) = logs.iter().find(|log| log.card_id != card.id) {
            return Err(SchedulerError::ReviewLogMismatch {
                expected: card.id,
                found: foreign.card_id,
            });
        }

        let mut ordered: Vec<&ReviewLog> = logs.iter().collect();
        ordered.sort_by_key(|log| log.review_datetime);

        let Some(first) = ordered.first() else {
            return Ok(card.clone());
        };

        let mut replayed = Card::new_at(card.id, first.review_datetime);
        for log in ordered {
            replayed = self.review_card(&replayed, log.rating, log.review_datetime)?;
        }

        Ok(replayed)
    }

    fn update_regime(&self, card: &Card, review_datetime: DateTime<Utc>) -> UpdateRegime {
        if card.state.uses_steps() && card.is_new() {
            return UpdateRegime::Initial;
        }

        match card.last_review {
            Some(last) if elapsed_days(last, review_datetime) < 1.0 => UpdateRegime::ShortTerm,
            _ => UpdateRegime::LongTerm {
                retrievability: self.card_retrievability(card, review_datetime),
            },
        }
    }

    fn transition(&self, card: &Card, rating: Rating, stability: f64) -> Transition {
        match card.state {
            State::Learning | State::Relearning => {
                let steps = if card.state == State::Learning {
                    &self.config.learning_steps
                } else {
                    &self.config.relearning_steps
                };
                let step = card.step.unwrap_or_default();

                if steps.is_empty() || (step >= steps.len() && rating > Rating::Again) {
                    return self.graduate(stability);
                }

                match rating {
                    Rating::Again => Transition {
                        state: card.state,
                        step: Some(0),
                        interval: ScheduledInterval::Step(steps[0]),
                    },
                    Rating::Hard => {
                        let interval = match (step, steps.as_slice()) {
                            (0, [only]) => scale_step(*only, 1.5),
                            (0, [first, second, ..]) => (*first + *second) / 2,
                            _ => steps[step],
                        };
                        Transition {
                            state: card.state,
                            step: Some(step),
                            interval: ScheduledInterval::Step(interval),
                        }
                    }
                    Rating::Good if step + 1 >= steps.len() => self.graduate(stability),
                    Rating::Good => Transition {
                        state: card.state,
                        step: Some(step + 1),
                        interval: ScheduledInterval::Step(steps[step + 1]),
                    },
                    Rating::Easy => self.graduate(stability),
                }
            }
            State::Review => match self.config.relearning_steps.first() {
                Some(&first) if rating == Rating::Again => Transition {
                    state: State::Relearning,
                    step: Some(0),
                    interval: ScheduledInterval::Step(first),
                },
                _ => self.graduate(stability),
            },
        }
    }

    fn graduate(&self, stability: f64) -> Transition {
        Transition {
            state: State::Review,
            step: None,
            interval: ScheduledInterval::Days(self.next_interval(stability)),
        }
    }
}

fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

fn scale_step(step: Duration, factor: f64) -> Duration {
    Duration::milliseconds((step.num_milliseconds() as f64 * factor).round() as i64)
}

// ============================================================================
// TESTS
// ============================================================================
