//! Rolling-window rate governor.
//!
//! The governor remembers the admission instant of every request inside the current window.
//! A caller that finds the window full sleeps until the oldest admission ages out, then
//! re-evaluates. The admission queue stays locked while a caller sleeps, so waiters are
//! admitted in arrival order and the check-and-record step is atomic.

// self
use crate::{_prelude::*, clock::Clock, config::RateLimitSettings, error::ConfigError, obs};

/// Admits at most `max_requests` calls in any rolling `window`.
pub struct RateGovernor {
	max_requests: usize,
	window: StdDuration,
	clock: Arc<dyn Clock>,
	admissions: AsyncMutex<VecDeque<Instant>>,
}
impl RateGovernor {
	/// Creates a governor; a zero budget is rejected because no caller could ever be admitted.
	pub fn new(
		max_requests: usize,
		window: StdDuration,
		clock: Arc<dyn Clock>,
	) -> Result<Self, ConfigError> {
		if max_requests == 0 {
			return Err(ConfigError::InvalidSetting {
				name: "RATE_LIMIT_REQUESTS",
				reason: "must admit at least one request per window".into(),
			});
		}

		Ok(Self {
			max_requests,
			window,
			clock,
			admissions: AsyncMutex::new(VecDeque::with_capacity(max_requests)),
		})
	}

	/// Creates a governor from settings.
	pub fn from_settings(
		settings: &RateLimitSettings,
		clock: Arc<dyn Clock>,
	) -> Result<Self, ConfigError> {
		Self::new(settings.max_requests, settings.window(), clock)
	}

	/// Requests admitted per window.
	pub fn max_requests(&self) -> usize {
		self.max_requests
	}

	/// Window length.
	pub fn window(&self) -> StdDuration {
		self.window
	}

	/// Suspends the calling task until the window has room, then records the admission.
	pub async fn acquire(&self) {
		let mut admissions = self.admissions.lock().await;

		loop {
			let now = self.clock.now();

			self.prune(&mut admissions, now);

			if admissions.len() < self.max_requests {
				admissions.push_back(now);

				return;
			}

			let oldest = admissions.front().copied().unwrap_or(now);
			let wait = self.window.saturating_sub(now.saturating_duration_since(oldest));

			obs::rate_limit_wait(admissions.len(), wait);
			obs::record_rate_limit_wait();
			self.clock.sleep(wait).await;
		}
	}

	/// Number of admissions still inside the window.
	pub async fn admitted_in_window(&self) -> usize {
		let mut admissions = self.admissions.lock().await;

		self.prune(&mut admissions, self.clock.now());

		admissions.len()
	}

	fn prune(&self, admissions: &mut VecDeque<Instant>, now: Instant) {
		while admissions.front().is_some_and(|t| now.saturating_duration_since(*t) >= self.window) {
			admissions.pop_front();
		}
	}
}
impl Debug for RateGovernor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateGovernor")
			.field("max_requests", &self.max_requests)
			.field("window", &self.window)
			.finish_non_exhaustive()
	}
}
