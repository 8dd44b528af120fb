// self
use crate::{
	_prelude::*,
	client::ApiClient,
	error::ConnectionError,
	http::{Method, TransportRequest},
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Endpoints tried by [`ApiClient::health_check`], in order.
pub const HEALTH_PATHS: [&str; 4] = ["/health", "/status", "/ping", "/"];

const VALIDATE_AUTH_TIMEOUT: StdDuration = StdDuration::from_secs(10);

impl ApiClient {
	/// Tries the common health endpoints in order.
	///
	/// The first success reports healthy. A 404 moves on to the next endpoint, any
	/// other error status reports unhealthy, and non-API failures move on as well. An API
	/// that exposes none of the endpoints (every endpoint 404 or failing) counts as reachable
	/// and therefore healthy.
	pub async fn health_check(&self) -> bool {
		const KIND: OpKind = OpKind::HealthCheck;

		let span = OpSpan::new(KIND, "health_check");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let healthy = span
			.instrument(async {
				for path in HEALTH_PATHS {
					match self.get(path).await {
						Ok(_) => return true,
						Err(Error::Api(err)) if err.status == 404 => continue,
						Err(Error::Api(err)) => {
							obs::health_endpoint_failed(path, &err);

							return false;
						},
						Err(err) => obs::health_endpoint_failed(path, &err),
					}
				}

				true
			})
			.await;

		obs::record_op_outcome(
			KIND,
			if healthy { OpOutcome::Success } else { OpOutcome::Failure },
		);

		healthy
	}

	/// Sends one authenticated `GET <full_api_url>/health` with a ten second timeout and
	/// reports whether it answered below 400. Any failure reports `false`.
	///
	/// The request bypasses the rate governor and is never retried.
	pub async fn validate_auth(&self) -> bool {
		const KIND: OpKind = OpKind::ValidateAuth;

		let span = OpSpan::new(KIND, "validate_auth");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.get_health_endpoint()).await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		match result {
			Ok(valid) => valid,
			Err(err) => {
				obs::health_endpoint_failed("/health", &err);

				false
			},
		}
	}

	async fn get_health_endpoint(&self) -> Result<bool> {
		let headers = self.credentials().get_auth_headers().await?;
		let transport = self.open_transport()?;
		let url = self.settings().resolve("/health")?;
		let mut request = TransportRequest::new(Method::Get, url, VALIDATE_AUTH_TIMEOUT);

		request.headers = headers;

		let response = transport
			.send(request)
			.await
			.map_err(|source| ConnectionError { attempts: 1, source })?;

		Ok(response.status < 400)
	}
}
