//! Transport primitives for API calls and token exchanges.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. The executor obtains
//! a transport from an [`HttpConnector`] lazily on first use and the credential manager
//! receives one at construction time, so both can be swapped for in-process fakes. The
//! default reqwest-backed implementation lives behind the `reqwest` feature.

// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Executes a single HTTP exchange.
///
/// Implementations must resolve to `Err` only for transport-level failures (DNS, connect,
/// TLS, timeout, body read). Any HTTP status, including 4xx/5xx, is a successful exchange.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Sends the request and buffers the full response body.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// Opens transports; called once per session.
pub trait HttpConnector
where
	Self: Send + Sync,
{
	/// Builds a transport whose requests default to `timeout`.
	fn connect(&self, timeout: StdDuration) -> Result<Arc<dyn HttpTransport>>;
}

/// HTTP verbs understood by the transport layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully resolved request handed to a transport.
#[derive(Clone, Debug)]
pub struct TransportRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including query string.
	pub url: Url,
	/// Header map; later layers have already been merged.
	pub headers: BTreeMap<String, String>,
	/// Encoded body, if any.
	pub body: Option<Vec<u8>>,
	/// Per-request timeout.
	pub timeout: StdDuration,
}
impl TransportRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, url: Url, timeout: StdDuration) -> Self {
		Self { method, url, headers: BTreeMap::new(), body: None, timeout }
	}

	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Buffered response returned by a transport.
#[derive(Clone, Debug, Default)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value, if present.
	pub content_type: Option<String>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Creates a response with the given status and body.
	pub fn new(status: u16, body: Vec<u8>) -> Self {
		Self { status, body, ..Default::default() }
	}

	/// Sets the `Content-Type` value.
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());

		self
	}

	/// Sets the Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
		self.retry_after = Some(retry_after);

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Connector producing [`ReqwestHttpClient`] transports.
///
/// Each [`connect`](HttpConnector::connect) builds a fresh client (and connection pool);
/// dropping the last handle closes the pool.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestConnector;
#[cfg(feature = "reqwest")]
impl HttpConnector for ReqwestConnector {
	fn connect(&self, timeout: StdDuration) -> Result<Arc<dyn HttpTransport>> {
		let client = ReqwestClient::builder().timeout(timeout).build().map_err(ConfigError::from)?;

		Ok(Arc::new(ReqwestHttpClient::with_client(client)))
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Patch => reqwest::Method::PATCH,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = self.0.request(method, request.url).timeout(request.timeout);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response.headers();
			let content_type = headers
				.get(reqwest::header::CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let retry_after = headers
				.get(reqwest::header::RETRY_AFTER)
				.and_then(|value| value.to_str().ok())
				.and_then(parse_retry_after);
			let body = response.bytes().await?.to_vec();

			Ok(TransportResponse { status, content_type, retry_after, body })
		})
	}
}

/// Parses a `Retry-After` value given either as delta seconds or an RFC 2822 date.
pub fn parse_retry_after(raw: &str) -> Option<Duration> {
	parse_retry_after_at(raw, OffsetDateTime::now_utc())
}

fn parse_retry_after_at(raw: &str, now: OffsetDateTime) -> Option<Duration> {
	use time::format_description::well_known::Rfc2822;

	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - now;

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
