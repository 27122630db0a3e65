//! Usage guards checked before every AI call: plan quota, per-project
//! cooldown, and per-user rate limit.

pub mod cooldown;
pub mod quota;
pub mod rate_limit;

use std::sync::Arc;

pub use cooldown::Cooldown;
pub use quota::{check_quota, increment_usage, AiAction, Limit};
pub use rate_limit::{check_rate_limit, CallCounter, SlidingWindowCounter};

use crate::error::CoreError;
use crate::plans::PlanLimitTable;
use crate::project::{AiUsage, User};
use crate::types::Timestamp;

/// The three usage guards composed in their fixed order.
#[derive(Clone)]
pub struct UsageGuards {
    pub plans: PlanLimitTable,
    pub cooldown: Cooldown,
    rate_limiter: Arc<dyn CallCounter>,
}

impl UsageGuards {
    pub fn new(plans: PlanLimitTable, cooldown: Cooldown, rate_limiter: Arc<dyn CallCounter>) -> Self {
        Self {
            plans,
            cooldown,
            rate_limiter,
        }
    }

    /// Quota, then cooldown, then rate limit. Tiers with `skip_throttles`
    /// only go through the quota check.
    pub fn check(
        &self,
        usage: &AiUsage,
        user: &User,
        action: AiAction,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        let limits = self.plans.for_tier(user.plan);
        check_quota(usage, action, user.plan, limits)?;

        if limits.skip_throttles {
            return Ok(());
        }

        self.cooldown.check(usage.last_ai_call_at, now)?;
        check_rate_limit(self.rate_limiter.as_ref(), &rate_key(user))
    }

    /// Account for one successful AI call: bump the counter for `action`,
    /// stamp the call time, and record the call against the user's window.
    pub fn record_success(&self, usage: &mut AiUsage, user: &User, action: AiAction, now: Timestamp) {
        increment_usage(usage, action);
        usage.last_ai_call_at = Some(now);
        self.rate_limiter.record(&rate_key(user));
    }
}

fn rate_key(user: &User) -> String {
    user.id.to_string()
}
