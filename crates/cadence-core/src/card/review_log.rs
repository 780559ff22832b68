//! Review log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Rating;

/// Record of one review event.
///
/// Produced by the scheduler and handed to the caller for storage; never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLog {
    /// Card that was reviewed
    pub card_id: i64,
    /// Rating given
    pub rating: Rating,
    /// When the review happened
    pub review_datetime: DateTime<Utc>,
    /// How long the review took, in whole seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_duration: Option<u64>,
}

impl ReviewLog {
    /// Create a log entry, dropping zero-length durations
    pub fn new(
        card_id: i64,
        rating: Rating,
        review_datetime: DateTime<Utc>,
        review_duration: Option<std::time::Duration>,
    ) -> Self {
        Self {
            card_id,
            rating,
            review_datetime,
            review_duration: review_duration
                .map(|d| d.as_secs())
                .filter(|&secs| secs > 0),
        }
    }
}
