use crate::workflows::effective_schedule;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Per-call knobs for outbound invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOptions {
    /// Send without waiting for the reply body
    pub async_mode: bool,

    /// Hint carried to the fabric as `request-timeout` metadata
    pub timeout: Duration,

    /// Deliver this long after the call
    pub delay: Option<Duration>,

    /// Deliver at this instant; wins over `delay`
    pub scheduled_to: Option<DateTime<Utc>>,
}

impl Default for InvocationOptions {
    fn default() -> Self {
        Self {
            async_mode: false,
            timeout: Duration::from_secs(10),
            delay: None,
            scheduled_to: None,
        }
    }
}

impl InvocationOptions {
    pub fn schedule_millis(&self, now: DateTime<Utc>) -> Option<i64> {
        effective_schedule(self.delay, self.scheduled_to, now)
    }

    pub fn timeout_millis(&self) -> u128 {
        self.timeout.as_millis()
    }
}
