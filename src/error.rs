//! Core error types shared by the credential manager, rate governor, and request executor.
//!
//! Every public operation returns [`Error`], which always resolves to exactly one of four
//! kinds: configuration, token refresh, API response, or connection failure. Use
//! [`crate::classify`] to map an error onto its [`ErrorKind`](crate::classify::ErrorKind).

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Required static secret or setting is missing or invalid.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// OAuth 2.0 token acquisition failed.
	#[error(transparent)]
	AuthRefresh(#[from] AuthRefreshError),
	/// Remote API answered with a status code of 400 or above.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failed on every permitted attempt.
	#[error(transparent)]
	Connection(#[from] ConnectionError),
}
impl Error {
	/// Returns the HTTP status carried by an [`ApiError`], if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(err) => Some(err.status),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A secret required by the active auth scheme was not configured.
	#[error("{setting} is not configured.")]
	MissingSecret {
		/// Environment variable (or settings field) that must be supplied.
		setting: &'static str,
	},
	/// One or more required settings are absent.
	#[error("Missing required settings: {}.", .names.join(", "))]
	MissingSettings {
		/// Names of every absent setting.
		names: Vec<&'static str>,
	},
	/// A setting holds a value that cannot be used.
	#[error("Setting {name} has an invalid value: {reason}.")]
	InvalidSetting {
		/// Setting name.
		name: &'static str,
		/// Human-readable explanation.
		reason: String,
	},
	/// A URL derived from settings could not be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL text.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The operation needs a different auth scheme than the one configured.
	#[error("Operation requires the {expected} auth scheme but {actual} is configured.")]
	SchemeMismatch {
		/// Scheme the operation supports.
		expected: &'static str,
		/// Scheme currently configured.
		actual: &'static str,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while talking to the OAuth 2.0 token endpoint.
#[derive(Debug, ThisError)]
pub enum AuthRefreshError {
	/// No refresh token is stored, so the access token cannot be renewed.
	#[error("No refresh token is available; re-authentication is required.")]
	MissingRefreshToken,
	/// Token endpoint answered with a non-2xx status.
	#[error("Token endpoint rejected the {grant} grant with status {status}: {body}")]
	Rejected {
		/// Grant label (`refresh_token` or `authorization_code`).
		grant: &'static str,
		/// HTTP status code.
		status: u16,
		/// Raw response text.
		body: String,
	},
	/// Token endpoint could not be reached.
	#[error("Network error occurred during the {grant} grant.")]
	Transport {
		/// Grant label.
		grant: &'static str,
		/// Transport failure.
		#[source]
		source: TransportError,
	},
	/// Token endpoint responded with a payload that is not a token response.
	#[error("Token endpoint returned a malformed token response.")]
	MalformedResponse {
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// The remote API responded with an error status.
#[derive(Debug, ThisError)]
#[error("API error {status}: {body}")]
pub struct ApiError {
	/// HTTP status code (>= 400).
	pub status: u16,
	/// Raw response body.
	pub body: String,
	/// Retry-After hint from upstream, if supplied. Informational only.
	pub retry_after: Option<Duration>,
}

/// Transport failure that retrying did not (or could not) recover.
#[derive(Debug, ThisError)]
#[error("Request failed after {attempts} attempts: {source}")]
pub struct ConnectionError {
	/// Number of attempts made (including the first).
	pub attempts: u32,
	/// Last transport failure observed.
	#[source]
	pub source: TransportError,
}

/// Transport-level failures.
///
/// Only [`Network`](Self::Network), [`Timeout`](Self::Timeout) and [`Io`](Self::Io) are
/// transient; see [`TransportError::is_retryable`].
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error: {source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded its timeout.
	#[error("Request timed out: {source}")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// The request could not be constructed (invalid header, URL, or body) and was never sent.
	#[error("Request could not be constructed: {source}")]
	Request {
		/// Transport-specific construction error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	/// The client session was closed and may not be reused.
	#[error("HTTP session has been closed.")]
	Closed,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a failure raised while building the request.
	pub fn request(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Request { source: Box::new(src) }
	}

	/// Returns `true` when the failure was a timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}

	/// Whether sending the same request again may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Network { .. } | Self::Timeout { .. } | Self::Io(_))
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			Self::timeout(e)
		} else if e.is_builder() {
			Self::request(e)
		} else {
			Self::network(e)
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn connection_error_exposes_last_cause_as_source() {
		let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err: Error =
			ConnectionError { attempts: 4, source: TransportError::network(cause) }.into();

		assert!(err.to_string().starts_with("Request failed after 4 attempts"));

		let source =
			StdError::source(&err).expect("Connection errors should expose the transport cause.");

		assert!(source.to_string().contains("refused"));
	}

	#[test]
	fn only_transient_transport_failures_are_retryable() {
		let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let invalid = std::io::Error::new(std::io::ErrorKind::InvalidInput, "bad header");

		assert!(TransportError::network(refused).is_retryable());
		assert!(
			TransportError::timeout(std::io::Error::from(std::io::ErrorKind::TimedOut))
				.is_retryable()
		);
		assert!(!TransportError::request(invalid).is_retryable());
		assert!(!TransportError::Closed.is_retryable());
	}

	#[test]
	fn missing_settings_lists_every_name() {
		let err = ConfigError::MissingSettings { names: vec!["API_BASE_URL", "API_KEY"] };

		assert_eq!(err.to_string(), "Missing required settings: API_BASE_URL, API_KEY.");
	}

	#[test]
	fn status_is_only_reported_for_api_errors() {
		let api: Error = ApiError { status: 503, body: "down".into(), retry_after: None }.into();
		let config: Error = ConfigError::MissingSecret { setting: "API_KEY" }.into();

		assert_eq!(api.status(), Some(503));
		assert_eq!(config.status(), None);
	}
}
