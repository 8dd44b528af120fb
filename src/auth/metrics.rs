//! Token endpoint traffic counters.
//!
//! Refresh and authorization-code exchanges share one set of counters. An attempt is
//! counted as soon as a grant starts, so a missing refresh token still shows up as an
//! attempt followed by a failure even though nothing reached the network.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::_prelude::*;

/// Point-in-time copy of [`RefreshMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RefreshCounts {
	/// Grants started.
	pub attempts: u64,
	/// Grants that installed a token.
	pub successes: u64,
	/// Grants that ended in an error.
	pub failures: u64,
}

/// Lock-free grant counters owned by a [`CredentialManager`](crate::auth::CredentialManager).
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	started: AtomicU64,
	installed: AtomicU64,
	failed: AtomicU64,
}
impl RefreshMetrics {
	/// Grants started so far.
	pub fn attempts(&self) -> u64 {
		self.started.load(Ordering::Relaxed)
	}

	/// Grants that installed a token.
	pub fn successes(&self) -> u64 {
		self.installed.load(Ordering::Relaxed)
	}

	/// Failed grants.
	pub fn failures(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	/// Reads all three counters. Grants still in flight count as attempts only.
	pub fn snapshot(&self) -> RefreshCounts {
		RefreshCounts {
			attempts: self.attempts(),
			successes: self.successes(),
			failures: self.failures(),
		}
	}

	pub(crate) fn record_attempt(&self) {
		self.started.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.installed.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failed.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn snapshot_reports_in_flight_grants_as_attempts() {
		let metrics = RefreshMetrics::default();

		metrics.record_attempt();
		metrics.record_success();
		metrics.record_attempt();

		assert_eq!(metrics.snapshot(), RefreshCounts { attempts: 2, successes: 1, failures: 0 });
	}
}
