// self
use crate::obs::{OpKind, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"api_core_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts one rate-governor suspension (when enabled).
pub fn record_rate_limit_wait() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("api_core_rate_limit_wait_total").increment(1);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_safe_without_installed_backend() {
		record_op_outcome(OpKind::Execute, OpOutcome::Failure);
		record_rate_limit_wait();
	}
}
