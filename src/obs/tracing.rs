// self
use crate::{_prelude::*, obs::OpKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by credential and request operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("api_core.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warning that a transport failure will be retried after `delay`.
pub fn retry_scheduled(attempt: u32, delay: StdDuration, cause: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, %cause, "Retrying request.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, delay, cause);
	}
}

/// Emits a debug event when the rate governor suspends a caller.
pub fn rate_limit_wait(admitted: usize, delay: StdDuration) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			admitted,
			delay_ms = delay.as_millis() as u64,
			"Rate window is full; waiting."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (admitted, delay);
	}
}

/// Emits an info event once a token grant installs fresh credentials.
pub fn token_installed(kind: OpKind, expires_at: OffsetDateTime, rotated_refresh: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(op = kind.as_str(), %expires_at, rotated_refresh, "Access token installed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, expires_at, rotated_refresh);
	}
}

/// Emits a warning when a JSON-labelled body cannot be decoded and is returned raw.
pub fn undecodable_json(status: u16, cause: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(status, %cause, "Response labelled JSON could not be decoded.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (status, cause);
	}
}

/// Emits a debug event for a failed endpoint check inside a health or auth check.
pub fn health_endpoint_failed(path: &str, cause: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(path, %cause, "Health endpoint check failed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (path, cause);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn event_helpers_accept_plain_values() {
		retry_scheduled(0, StdDuration::from_secs(1), &"refused");
		rate_limit_wait(3, StdDuration::from_millis(250));
		health_endpoint_failed("/health", &"timeout");
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OpSpan::new(OpKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
