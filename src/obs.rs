//! Optional observability helpers for credential and request operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `api_core.op` with the `op` (operation)
//!   and `stage` (call site) fields, plus events for retries, rate-limit waits, and token
//!   refreshes. Secret values are never recorded.
//! - Enable `metrics` to increment the `api_core_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and the
//!   `api_core_rate_limit_wait_total` counter whenever the rate governor suspends a caller.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the access core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Authenticated request issued through the executor.
	Execute,
	/// OAuth 2.0 `refresh_token` grant.
	Refresh,
	/// OAuth 2.0 `authorization_code` grant.
	CodeExchange,
	/// Health endpoint sequence.
	HealthCheck,
	/// Single authenticated request to the health endpoint.
	ValidateAuth,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Execute => "execute",
			OpKind::Refresh => "refresh",
			OpKind::CodeExchange => "code_exchange",
			OpKind::HealthCheck => "health_check",
			OpKind::ValidateAuth => "validate_auth",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto its terminal outcome.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure }
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
