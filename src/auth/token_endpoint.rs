//! Form-encoded round trips against the OAuth 2.0 token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{STATIC_TOKEN_LIFETIME, Secret},
	error::AuthRefreshError,
	http::{HttpTransport, Method, TransportRequest},
};

const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Successful token endpoint payload.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
	pub(crate) access_token: Secret,
	#[serde(default)]
	expires_in: Option<u64>,
	#[serde(default)]
	pub(crate) refresh_token: Option<Secret>,
}
impl TokenResponse {
	/// Lifetime reported by the provider, falling back to one hour when omitted.
	///
	/// Lifetimes are capped at [`STATIC_TOKEN_LIFETIME`].
	pub(crate) fn lifetime(&self) -> Duration {
		let secs = self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);

		i64::try_from(secs)
			.ok()
			.map(Duration::seconds)
			.filter(|lifetime| *lifetime < STATIC_TOKEN_LIFETIME)
			.unwrap_or(STATIC_TOKEN_LIFETIME)
	}
}

/// Posts `form` to `endpoint` and decodes the token response.
///
/// Any non-2xx status is a rejection; the raw body is kept for diagnostics.
pub(crate) async fn request_token(
	transport: &dyn HttpTransport,
	endpoint: Url,
	grant: &'static str,
	form: &[(&str, &str)],
	timeout: StdDuration,
) -> Result<TokenResponse, AuthRefreshError> {
	let body = url::form_urlencoded::Serializer::new(String::new())
		.extend_pairs(form.iter().copied())
		.finish();
	let mut request = TransportRequest::new(Method::Post, endpoint, timeout);

	request
		.headers
		.insert("Content-Type".into(), "application/x-www-form-urlencoded".into());
	request.headers.insert("Accept".into(), "application/json".into());
	request.body = Some(body.into_bytes());

	let response = transport
		.send(request)
		.await
		.map_err(|source| AuthRefreshError::Transport { grant, source })?;

	if !response.is_success() {
		return Err(AuthRefreshError::Rejected {
			grant,
			status: response.status,
			body: response.text(),
		});
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| AuthRefreshError::MalformedResponse { status: response.status, source })
}
