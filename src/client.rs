//! Request executor: rate governance, authentication, and bounded retries for API calls.
//!
//! Every call acquires a slot from the [`RateGovernor`], asks the [`CredentialManager`] for
//! headers, and then sends the request with up to [`RetryPolicy::max_retries`] retries.
//! Only transport failures are retried; any HTTP status of 400 or above is returned
//! immediately as [`ApiError`].

mod health;
mod request;
mod response;
mod retry;
mod session;

pub use health::HEALTH_PATHS;
pub use request::*;
pub use response::*;
pub use retry::*;
pub use session::SessionStatus;

// self
use crate::{
	_prelude::*,
	auth::{CredentialManager, RefreshCounts},
	client::session::Session,
	clock::{Clock, TokioClock},
	config::{AuthScheme, RateLimitSettings, Settings},
	error::{ApiError, ConfigError, ConnectionError},
	http::{HttpConnector, HttpTransport, TransportRequest},
	obs::{self, OpKind, OpOutcome, OpSpan},
	rate_limit::RateGovernor,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestConnector;

/// Non-sensitive description of a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApiInfo {
	/// Base URL of the target API.
	pub base_url: String,
	/// Base URL joined with the version segment.
	pub full_api_url: String,
	/// Per-request timeout in seconds.
	pub timeout_seconds: u64,
	/// Active auth scheme.
	pub scheme: AuthScheme,
	/// Request budget, if rate governance is enabled.
	pub rate_limit: Option<RateLimitSettings>,
	/// Retries allowed after the first attempt.
	pub max_retries: u32,
	/// `User-Agent` header value.
	pub user_agent: String,
	/// Session lifecycle.
	pub session: SessionStatus,
	/// Token endpoint grant counters.
	pub refresh: RefreshCounts,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
	settings: Settings,
	connector: Option<Arc<dyn HttpConnector>>,
	clock: Option<Arc<dyn Clock>>,
	retry: RetryPolicy,
}
impl ApiClientBuilder {
	/// Uses `connector` instead of the default reqwest connector.
	pub fn connector(mut self, connector: Arc<dyn HttpConnector>) -> Self {
		self.connector = Some(connector);

		self
	}

	/// Uses `clock` instead of the tokio clock.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);

		self
	}

	/// Overrides the retry policy.
	pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Validates the URL and rate settings and assembles the client.
	///
	/// Scheme secrets are not checked here; a missing secret surfaces as
	/// [`ConfigError::MissingSecret`] on the first request.
	pub fn build(self) -> Result<ApiClient> {
		let settings = Arc::new(self.settings);

		settings.resolve("/")?;

		if settings.timeout_seconds == 0 {
			return Err(ConfigError::InvalidSetting {
				name: "API_TIMEOUT",
				reason: "must be at least one second".into(),
			}
			.into());
		}

		let connector = match self.connector {
			Some(connector) => connector,
			None => default_connector()?,
		};
		let clock: Arc<dyn Clock> = match self.clock {
			Some(clock) => clock,
			None => Arc::new(TokioClock),
		};
		let governor = settings
			.rate_limit
			.as_ref()
			.map(|limits| RateGovernor::from_settings(limits, clock.clone()))
			.transpose()?;
		let token_transport = connector.connect(settings.timeout())?;
		let credentials =
			Arc::new(CredentialManager::new(settings.clone(), token_transport, clock.clone()));
		let session = Session::new(connector, settings.timeout());

		Ok(ApiClient { settings, credentials, governor, session, retry: self.retry, clock })
	}
}

/// Authenticated, rate-governed API client; one per API target, shared by `Arc`.
pub struct ApiClient {
	settings: Arc<Settings>,
	credentials: Arc<CredentialManager>,
	governor: Option<RateGovernor>,
	session: Session,
	retry: RetryPolicy,
	clock: Arc<dyn Clock>,
}
impl ApiClient {
	/// Starts a builder for `settings`.
	pub fn builder(settings: Settings) -> ApiClientBuilder {
		ApiClientBuilder { settings, connector: None, clock: None, retry: RetryPolicy::default() }
	}

	/// Builds a client with the default connector, clock, and retry policy.
	pub fn new(settings: Settings) -> Result<Self> {
		Self::builder(settings).build()
	}

	/// Settings the client was built from.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Credential manager shared with this client.
	pub fn credentials(&self) -> &Arc<CredentialManager> {
		&self.credentials
	}

	/// Rate governor, when rate governance is enabled.
	pub fn governor(&self) -> Option<&RateGovernor> {
		self.governor.as_ref()
	}

	/// Sends `request` and decodes the response.
	pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: OpKind = OpKind::Execute;

		let span = OpSpan::new(KIND, "execute");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.execute_with_retries(request)).await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}

	/// `GET path`.
	pub async fn get(&self, path: &str) -> Result<ApiResponse> {
		self.execute(ApiRequest::get(path)).await
	}

	/// `POST path` with a JSON body.
	pub async fn post(&self, path: &str, body: impl Into<serde_json::Value>) -> Result<ApiResponse> {
		self.execute(ApiRequest::post(path).with_json(body)).await
	}

	/// `PUT path` with a JSON body.
	pub async fn put(&self, path: &str, body: impl Into<serde_json::Value>) -> Result<ApiResponse> {
		self.execute(ApiRequest::put(path).with_json(body)).await
	}

	/// `PATCH path` with a JSON body.
	pub async fn patch(&self, path: &str, body: impl Into<serde_json::Value>) -> Result<ApiResponse> {
		self.execute(ApiRequest::patch(path).with_json(body)).await
	}

	/// `DELETE path`.
	pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
		self.execute(ApiRequest::delete(path)).await
	}

	/// Describes the client without revealing credentials.
	pub fn api_info(&self) -> ApiInfo {
		ApiInfo {
			base_url: self.settings.base_url.clone(),
			full_api_url: self.settings.full_api_url(),
			timeout_seconds: self.settings.timeout_seconds,
			scheme: self.settings.scheme(),
			rate_limit: self.settings.rate_limit,
			max_retries: self.retry.max_retries,
			user_agent: self.settings.user_agent.clone(),
			session: self.session.status(),
			refresh: self.credentials.refresh_metrics().snapshot(),
		}
	}

	/// Closes the HTTP session; later calls fail with [`ConnectionError`]. Returns `false`
	/// when the session was already closed.
	pub fn close(&self) -> bool {
		self.session.close()
	}

	async fn execute_with_retries(&self, request: ApiRequest) -> Result<ApiResponse> {
		let transport = self.session.transport()?;

		if let Some(governor) = &self.governor {
			governor.acquire().await;
		}

		let ApiRequest { method, path, query, body, headers: overrides } = request;
		let mut headers = self.credentials.get_auth_headers().await?;

		merge_headers(&mut headers, overrides);

		let mut url = self.settings.resolve(&path)?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(&query);
		}

		let body = body.map(RequestBody::into_bytes);
		let mut attempt = 0;

		loop {
			let mut outbound = TransportRequest::new(method, url.clone(), self.settings.timeout());

			outbound.headers = headers.clone();
			outbound.body = body.clone();

			match transport.send(outbound).await {
				Ok(response) if response.status >= 400 =>
					return Err(ApiError {
						status: response.status,
						body: response.text(),
						retry_after: response.retry_after,
					}
					.into()),
				Ok(response) => return Ok(ApiResponse::decode(response)),
				Err(cause) if !cause.is_retryable() || attempt >= self.retry.max_retries =>
					return Err(ConnectionError { attempts: attempt + 1, source: cause }.into()),
				Err(cause) => {
					let delay = self.retry.delay_for(attempt);

					obs::retry_scheduled(attempt, delay, &cause);
					self.clock.sleep(delay).await;

					attempt += 1;
				},
			}
		}
	}

	pub(crate) fn open_transport(&self) -> Result<Arc<dyn HttpTransport>> {
		self.session.transport()
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("full_api_url", &self.settings.full_api_url())
			.field("scheme", &self.settings.scheme())
			.field("governor", &self.governor)
			.field("retry", &self.retry)
			.field("session", &self.session.status())
			.finish_non_exhaustive()
	}
}

#[cfg(feature = "reqwest")]
fn default_connector() -> Result<Arc<dyn HttpConnector>> {
	Ok(Arc::new(ReqwestConnector))
}

#[cfg(not(feature = "reqwest"))]
fn default_connector() -> Result<Arc<dyn HttpConnector>> {
	Err(ConfigError::InvalidSetting {
		name: "connector",
		reason: "no HTTP connector was supplied and the `reqwest` feature is disabled".into(),
	}
	.into())
}
