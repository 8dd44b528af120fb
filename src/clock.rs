//! Time sources and sleep primitives consumed by the rate governor, credential manager, and
//! request executor.
//!
//! Production code uses [`TokioClock`]; tests and simulations use [`ManualClock`], whose
//! sleeps advance virtual time instantly and are recorded for inspection.

// self
use crate::_prelude::*;

/// Boxed future returned by [`Clock::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Monotonic + wall clock pair with an async sleep.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Monotonic instant used for rate windows.
	fn now(&self) -> Instant;

	/// Wall-clock instant used for token expiry.
	fn now_utc(&self) -> OffsetDateTime;

	/// Suspends the calling task (never the whole process) for `duration`.
	fn sleep(&self, duration: StdDuration) -> SleepFuture<'_>;
}

/// Clock backed by the tokio timer; honors paused time in tokio tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;
impl Clock for TokioClock {
	fn now(&self) -> Instant {
		tokio::time::Instant::now().into_std()
	}

	fn now_utc(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}

	fn sleep(&self, duration: StdDuration) -> SleepFuture<'_> {
		Box::pin(tokio::time::sleep(duration))
	}
}

/// Deterministic clock whose time only moves through [`advance`](ManualClock::advance) or
/// [`Clock::sleep`].
#[derive(Debug)]
pub struct ManualClock {
	origin: Instant,
	origin_utc: OffsetDateTime,
	elapsed: Mutex<StdDuration>,
	sleeps: Mutex<Vec<StdDuration>>,
}
impl ManualClock {
	/// Starts a clock at the current real instant.
	pub fn new() -> Self {
		Self::starting_at(OffsetDateTime::now_utc())
	}

	/// Starts a clock whose wall time reads `origin_utc`.
	pub fn starting_at(origin_utc: OffsetDateTime) -> Self {
		Self {
			origin: Instant::now(),
			origin_utc,
			elapsed: Mutex::new(StdDuration::ZERO),
			sleeps: Default::default(),
		}
	}

	/// Moves time forward without recording a sleep.
	pub fn advance(&self, by: StdDuration) {
		*self.elapsed.lock() += by;
	}

	/// Total virtual time elapsed since construction.
	pub fn elapsed(&self) -> StdDuration {
		*self.elapsed.lock()
	}

	/// Every sleep requested so far, in call order.
	pub fn sleeps(&self) -> Vec<StdDuration> {
		self.sleeps.lock().clone()
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}
impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.origin + self.elapsed()
	}

	fn now_utc(&self) -> OffsetDateTime {
		self.origin_utc + self.elapsed()
	}

	fn sleep(&self, duration: StdDuration) -> SleepFuture<'_> {
		self.sleeps.lock().push(duration);
		self.advance(duration);

		Box::pin(async {})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[tokio::test]
	async fn manual_clock_sleep_advances_both_timelines() {
		let clock = ManualClock::starting_at(macros::datetime!(2025-01-01 00:00 UTC));
		let start = clock.now();

		clock.sleep(StdDuration::from_secs(2)).await;
		clock.advance(StdDuration::from_secs(3));

		assert_eq!(clock.now() - start, StdDuration::from_secs(5));
		assert_eq!(clock.now_utc(), macros::datetime!(2025-01-01 00:00:05 UTC));
		assert_eq!(clock.sleeps(), vec![StdDuration::from_secs(2)]);
	}

	#[tokio::test(start_paused = true)]
	async fn tokio_clock_follows_paused_runtime() {
		let clock = TokioClock;
		let start = clock.now();

		clock.sleep(StdDuration::from_secs(30)).await;

		assert!(clock.now() - start >= StdDuration::from_secs(30));
	}
}
