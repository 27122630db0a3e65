//! Minimum spacing between AI calls on the same project.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default spacing between AI calls on one project.
pub const DEFAULT_COOLDOWN_SECONDS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    pub duration: chrono::Duration,
}

impl Cooldown {
    pub fn new(duration: chrono::Duration) -> Self {
        Self { duration }
    }

    pub fn from_secs(seconds: i64) -> Self {
        Self::new(chrono::Duration::seconds(seconds))
    }

    /// Seconds still to wait, or `None` when a call is allowed.
    ///
    /// A project that never called the AI always passes. Waiting exactly the
    /// cooldown duration passes.
    pub fn remaining(&self, last_call: Option<Timestamp>, now: Timestamp) -> Option<f64> {
        let last_call = last_call?;
        let remaining = self.duration - (now - last_call);
        let millis = remaining.num_milliseconds();
        (millis > 0).then(|| millis as f64 / 1000.0)
    }

    /// Fail with [`CoreError::AiCooldownActive`] while the cooldown runs.
    pub fn check(&self, last_call: Option<Timestamp>, now: Timestamp) -> Result<(), CoreError> {
        match self.remaining(last_call, now) {
            Some(seconds_remaining) => Err(CoreError::AiCooldownActive { seconds_remaining }),
            None => Ok(()),
        }
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::from_secs(DEFAULT_COOLDOWN_SECONDS)
    }
}
