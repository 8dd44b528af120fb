//! Maps crate errors onto a closed set of kinds for callers that branch on failure type.

// self
use crate::{_prelude::*, error::Error};

/// Failure categories reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
	/// Remote API answered with an error status.
	Api {
		/// HTTP status code.
		status: u16,
	},
	/// Transport failed after every permitted attempt.
	Connection,
	/// A required setting or secret is missing or invalid.
	AuthConfig,
	/// OAuth 2.0 token acquisition failed.
	AuthRefresh,
	/// The last transport failure was a timeout.
	Timeout,
}
impl ErrorKind {
	/// Returns a stable label suitable for logs or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::Api { .. } => "api_error",
			ErrorKind::Connection => "connection_error",
			ErrorKind::AuthConfig => "auth_config_error",
			ErrorKind::AuthRefresh => "auth_refresh_error",
			ErrorKind::Timeout => "timeout",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			ErrorKind::Api { status } => write!(f, "api_error({status})"),
			other => f.write_str(other.as_str()),
		}
	}
}

/// Classifies an error; every crate error maps to exactly one kind.
pub fn classify(error: &Error) -> ErrorKind {
	match error {
		Error::Api(err) => ErrorKind::Api { status: err.status },
		Error::Connection(err) if err.source.is_timeout() => ErrorKind::Timeout,
		Error::Connection(_) => ErrorKind::Connection,
		Error::Config(_) => ErrorKind::AuthConfig,
		Error::AuthRefresh(_) => ErrorKind::AuthRefresh,
	}
}

impl Error {
	/// Shorthand for [`classify`].
	pub fn kind(&self) -> ErrorKind {
		classify(self)
	}
}
