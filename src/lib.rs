//! Per-process REST API access core: pluggable auth schemes, single-flight OAuth 2.0 refresh,
//! rolling-window rate governance, and bounded-retry request execution.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod classify;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod rate_limit;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::task::{Context, Poll};
	// self
	use crate::{
		auth::CredentialManager,
		client::ApiClient,
		clock::{Clock, ManualClock},
		config::{AuthSettings, Settings},
		error::TransportError,
		http::{HttpConnector, HttpTransport, TransportFuture, TransportRequest, TransportResponse},
	};

	type Responder =
		dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync;

	/// In-process transport that answers every request through a closure and records what it
	/// was asked to send.
	#[derive(Clone)]
	pub struct ScriptedTransport {
		responder: Arc<Responder>,
		requests: Arc<Mutex<Vec<TransportRequest>>>,
	}
	impl ScriptedTransport {
		/// Builds a transport that delegates every call to `responder`.
		pub fn new(
			responder: impl Fn(&TransportRequest) -> Result<TransportResponse, TransportError>
			+ 'static
			+ Send
			+ Sync,
		) -> Self {
			Self { responder: Arc::new(responder), requests: Default::default() }
		}

		/// Returns every request observed so far.
		pub fn requests(&self) -> Vec<TransportRequest> {
			self.requests.lock().clone()
		}

		/// Number of requests whose URL path ends with `suffix`.
		pub fn calls_to(&self, suffix: &str) -> usize {
			self.requests.lock().iter().filter(|req| req.url.path().ends_with(suffix)).count()
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				YieldOnce(false).await;
				self.requests.lock().push(request.clone());

				(self.responder)(&request)
			})
		}
	}
	impl HttpConnector for ScriptedTransport {
		fn connect(&self, _timeout: StdDuration) -> Result<Arc<dyn HttpTransport>> {
			Ok(Arc::new(self.clone()))
		}
	}

	struct YieldOnce(bool);
	impl Future for YieldOnce {
		type Output = ();

		fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
			if self.0 {
				return Poll::Ready(());
			}

			self.0 = true;
			cx.waker().wake_by_ref();

			Poll::Pending
		}
	}

	/// JSON response fixture with the provided status.
	pub fn json_response(status: u16, body: &str) -> TransportResponse {
		TransportResponse::new(status, body.as_bytes().to_vec())
			.with_content_type("application/json")
	}

	/// Settings fixture pointing at a fake host.
	pub fn test_settings(auth: AuthSettings) -> Settings {
		Settings::new("https://api.example.test", auth)
	}

	/// Builds an [`ApiClient`] wired to a scripted transport and manual clock.
	pub fn build_scripted_client(
		settings: Settings,
		transport: &ScriptedTransport,
		clock: &Arc<ManualClock>,
	) -> ApiClient {
		let clock: Arc<dyn Clock> = clock.clone();

		ApiClient::builder(settings)
			.connector(Arc::new(transport.clone()))
			.clock(clock)
			.build()
			.expect("Scripted client should build from valid settings.")
	}

	/// Builds a [`CredentialManager`] wired to a scripted transport and manual clock.
	pub fn build_scripted_credentials(
		settings: Settings,
		transport: &ScriptedTransport,
		clock: &Arc<ManualClock>,
	) -> CredentialManager {
		let clock: Arc<dyn Clock> = clock.clone();

		CredentialManager::new(Arc::new(settings), Arc::new(transport.clone()), clock)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::{Duration as StdDuration, Instant},
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
