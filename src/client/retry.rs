// self
use crate::_prelude::*;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY: StdDuration = StdDuration::from_secs(1);

/// Bounded exponential backoff applied to transport failures only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Retries after the first attempt; total attempts are `max_retries + 1`.
	pub max_retries: u32,
	/// Delay before the first retry; doubles on every further retry.
	pub base_delay: StdDuration,
}
impl RetryPolicy {
	/// Overrides the retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the base delay.
	pub fn with_base_delay(mut self, base_delay: StdDuration) -> Self {
		self.base_delay = base_delay;

		self
	}

	/// Delay after failed attempt `attempt` (0-based): `base_delay * 2^attempt`.
	pub fn delay_for(&self, attempt: u32) -> StdDuration {
		self.base_delay.saturating_mul(2_u32.saturating_pow(attempt))
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_retries: DEFAULT_MAX_RETRIES, base_delay: DEFAULT_BASE_DELAY }
	}
}
