//! Free-tier trial window after publishing.

use serde::Serialize;

use crate::plans::PlanTier;
use crate::store::ProjectRecord;
use crate::types::Timestamp;

/// Default trial length in days.
pub const DEFAULT_TRIAL_DAYS: i64 = 15;

pub fn trial_end(published_at: Timestamp, duration: chrono::Duration) -> Timestamp {
    published_at + duration
}

/// `false` when there is no trial.
pub fn is_trial_active(trial_ends_at: Option<Timestamp>, now: Timestamp) -> bool {
    trial_ends_at.is_some_and(|end| now < end)
}

/// `false` when there is no trial. The end instant itself counts as expired.
pub fn is_trial_expired(trial_ends_at: Option<Timestamp>, now: Timestamp) -> bool {
    trial_ends_at.is_some_and(|end| now >= end)
}

/// Whole days left, a partial day counting as one.
pub fn days_remaining(trial_ends_at: Option<Timestamp>, now: Timestamp) -> i64 {
    let Some(end) = trial_ends_at else {
        return 0;
    };
    let left = end - now;
    if left <= chrono::Duration::zero() {
        return 0;
    }
    let days = left.num_days();
    if left > chrono::Duration::days(days) {
        days + 1
    } else {
        days
    }
}

/// Trial and pause state of one project, as shown to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialStatus {
    pub plan: PlanTier,
    pub trial_ends_at: Option<Timestamp>,
    pub is_trial_active: bool,
    pub is_trial_expired: bool,
    pub days_remaining: i64,
    pub is_paused: bool,
}

pub fn trial_status(record: &ProjectRecord, plan: PlanTier, now: Timestamp) -> TrialStatus {
    let end = record.trial_ends_at;
    TrialStatus {
        plan,
        trial_ends_at: end,
        is_trial_active: is_trial_active(end, now),
        is_trial_expired: is_trial_expired(end, now),
        days_remaining: days_remaining(end, now),
        is_paused: record.is_paused,
    }
}
