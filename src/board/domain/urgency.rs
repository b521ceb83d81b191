//! Due-date urgency buckets.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How close a task is to its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueUrgency {
    /// The due date has passed.
    Overdue,
    /// Due within 24 hours.
    Urgent,
    /// Due within three days.
    Soon,
    /// Due later.
    Normal,
}

impl DueUrgency {
    /// Buckets `due` relative to `now`.
    #[must_use]
    pub fn classify(due: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = due - now;
        if remaining < TimeDelta::zero() {
            Self::Overdue
        } else if remaining < TimeDelta::hours(24) {
            Self::Urgent
        } else if remaining < TimeDelta::hours(72) {
            Self::Soon
        } else {
            Self::Normal
        }
    }
}
