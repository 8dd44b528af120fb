//! Credential manager producing authentication headers for every request.
//!
//! One manager exists per configured API target. Header generation runs inside an async
//! mutex that is held across OAuth 2.0 refresh round trips, so concurrent callers that find
//! an expired token wait for the in-flight refresh and reuse its result instead of issuing
//! their own.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope, basic::BasicClient};
// self
use crate::{
	_prelude::*,
	auth::{
		CredentialState, RefreshMetrics, STATIC_TOKEN_LIFETIME, Secret, TokenLifecycle,
		state::expiry_after,
		token_endpoint::{self, TokenResponse},
	},
	client::merge_headers,
	clock::Clock,
	config::{AuthScheme, AuthSettings, OAuth2Settings, Settings},
	error::{AuthRefreshError, ConfigError},
	http::HttpTransport,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Header map produced for one request.
pub type AuthHeaders = BTreeMap<String, String>;

const CLIENT_ID_PREFIX_LEN: usize = 8;

/// Authorization redirect prepared for an end user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationUrl {
	/// Fully-formed authorize URL the user should visit.
	pub url: Url,
	/// CSRF state that must round-trip through the redirect.
	pub state: String,
}

/// Scheme-specific part of [`AuthInfo`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthDetails {
	/// API key scheme.
	ApiKey {
		/// Whether a non-empty key is configured.
		api_key_configured: bool,
		/// Header that carries the key.
		api_key_header: String,
	},
	/// Static bearer or OAuth 2.0 token scheme.
	Token {
		/// Whether an access token is held.
		access_token_configured: bool,
		/// Whether a refresh token is held (always `false` for static bearer tokens).
		refresh_token_configured: bool,
		/// Whether the held token is outside the expiry buffer.
		token_valid: bool,
		/// Current lifecycle position.
		lifecycle: TokenLifecycle,
		/// Recorded expiry, if any.
		expires_at: Option<OffsetDateTime>,
		/// First eight characters of the client id followed by `...`.
		client_id: Option<String>,
	},
	/// HTTP Basic scheme.
	Basic {
		/// Whether a user name is configured.
		username_configured: bool,
		/// Whether a password is configured.
		password_configured: bool,
	},
	/// Custom header scheme.
	Custom {
		/// Names of the configured headers; values are withheld.
		header_names: Vec<String>,
	},
}

/// Non-sensitive snapshot of the credential manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthInfo {
	/// Active scheme.
	pub scheme: AuthScheme,
	/// Base URL of the target API.
	pub api_base_url: String,
	/// Scheme-specific status.
	pub details: AuthDetails,
}

/// Produces authentication headers and owns the mutable token state.
pub struct CredentialManager {
	settings: Arc<Settings>,
	transport: Arc<dyn HttpTransport>,
	clock: Arc<dyn Clock>,
	state: AsyncMutex<CredentialState>,
	refresh_metrics: Arc<RefreshMetrics>,
}
impl CredentialManager {
	/// Creates a manager whose token exchanges go through `transport`.
	pub fn new(
		settings: Arc<Settings>,
		transport: Arc<dyn HttpTransport>,
		clock: Arc<dyn Clock>,
	) -> Self {
		let seed = match &settings.auth {
			AuthSettings::OAuth2(oauth) => oauth.refresh_token.clone().filter(|t| !t.is_empty()),
			_ => None,
		};
		let state = CredentialState::new(settings.scheme(), seed);

		Self {
			settings,
			transport,
			clock,
			state: AsyncMutex::new(state),
			refresh_metrics: Default::default(),
		}
	}

	/// Settings this manager was built from.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Token endpoint counters.
	pub fn refresh_metrics(&self) -> Arc<RefreshMetrics> {
		self.refresh_metrics.clone()
	}

	/// Returns a copy of the current credential state.
	pub async fn snapshot(&self) -> CredentialState {
		self.state.lock().await.clone()
	}

	/// Produces the headers for one request, renewing OAuth 2.0 tokens when they are missing
	/// or inside the five-minute expiry buffer.
	pub async fn get_auth_headers(&self) -> Result<AuthHeaders> {
		let mut headers = self.base_headers();
		let mut state = self.state.lock().await;

		match &self.settings.auth {
			AuthSettings::ApiKey { api_key, header } => {
				let key = required(api_key.as_ref(), "API_KEY")?;

				headers.insert(header.clone(), key.expose().to_owned());
			},
			AuthSettings::BearerStatic { token } => {
				let now = self.clock.now_utc();
				let access = match current_token(&state, now) {
					Some(access) => access,
					None => {
						let access = required(token.as_ref(), "BEARER_TOKEN")?.clone();

						state.install(
							access.clone(),
							None,
							expiry_after(now, STATIC_TOKEN_LIFETIME),
						);

						access
					},
				};

				headers.insert("Authorization".into(), format!("Bearer {}", access.expose()));
			},
			AuthSettings::OAuth2(oauth) => {
				let access = match current_token(&state, self.clock.now_utc()) {
					Some(access) => access,
					None => self.refresh_locked(&mut state, oauth).await?,
				};

				headers.insert("Authorization".into(), format!("Bearer {}", access.expose()));
			},
			AuthSettings::Basic { username, password } => {
				let username = username
					.as_deref()
					.filter(|name| !name.is_empty())
					.ok_or(ConfigError::MissingSecret { setting: "USERNAME" })?;
				let password = required(password.as_ref(), "PASSWORD")?;
				let encoded = STANDARD.encode(format!("{username}:{}", password.expose()));

				headers.insert("Authorization".into(), format!("Basic {encoded}"));
			},
			AuthSettings::Custom { headers: extra } => {
				merge_headers(&mut headers, extra.clone());
			},
		}

		Ok(headers)
	}

	/// Builds the authorize URL for the authorization-code grant with a fresh CSRF state.
	pub fn authorization_url(&self) -> Result<AuthorizationUrl> {
		let oauth = self.oauth_settings()?;
		let client_id = oauth
			.client_id
			.clone()
			.filter(|id| !id.is_empty())
			.ok_or(ConfigError::MissingSecret { setting: "CLIENT_ID" })?;
		let redirect = RedirectUrl::new(oauth.redirect_uri.clone()).map_err(|source| {
			ConfigError::InvalidUrl { url: oauth.redirect_uri.clone(), source }
		})?;
		let client = BasicClient::new(ClientId::new(client_id))
			.set_auth_uri(AuthUrl::from_url(self.settings.authorization_endpoint()?))
			.set_redirect_uri(redirect);
		let (url, state) = client
			.authorize_url(CsrfToken::new_random)
			.add_scopes(oauth.scopes().map(|scope| Scope::new(scope.to_owned())))
			.url();

		Ok(AuthorizationUrl { url, state: state.secret().to_owned() })
	}

	/// Exchanges an authorization code for tokens and installs them.
	pub async fn exchange_code(&self, code: &str) -> Result<()> {
		const KIND: OpKind = OpKind::CodeExchange;

		let oauth = self.oauth_settings()?;
		let span = OpSpan::new(KIND, "exchange_code");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async {
				let mut state = self.state.lock().await;
				let (client_id, client_secret) = client_credentials(oauth)?;
				let form = [
					("grant_type", "authorization_code"),
					("code", code),
					("redirect_uri", oauth.redirect_uri.as_str()),
					("client_id", client_id),
					("client_secret", client_secret),
				];
				let response = token_endpoint::request_token(
					self.transport.as_ref(),
					self.settings.token_endpoint()?,
					"authorization_code",
					&form,
					self.settings.timeout(),
				)
				.await?;

				self.install_response(&mut state, KIND, response);

				Ok(())
			})
			.await;

		self.finish(KIND, &result);

		result
	}

	/// Seeds OAuth 2.0 state with tokens obtained elsewhere.
	pub async fn install_tokens(
		&self,
		access_token: impl Into<Secret>,
		refresh_token: Option<Secret>,
		expires_at: OffsetDateTime,
	) -> Result<()> {
		self.oauth_settings()?;
		self.state.lock().await.install(access_token.into(), refresh_token, expires_at);

		Ok(())
	}

	/// Reports which credentials are configured without revealing them.
	pub async fn auth_info(&self) -> AuthInfo {
		let details = match &self.settings.auth {
			AuthSettings::ApiKey { api_key, header } => AuthDetails::ApiKey {
				api_key_configured: api_key.as_ref().is_some_and(|key| !key.is_empty()),
				api_key_header: header.clone(),
			},
			AuthSettings::BearerStatic { .. } | AuthSettings::OAuth2(_) => {
				let state = self.state.lock().await;
				let now = self.clock.now_utc();
				let client_id = match &self.settings.auth {
					AuthSettings::OAuth2(oauth) => oauth.client_id.as_deref().map(redact_client_id),
					_ => None,
				};

				AuthDetails::Token {
					access_token_configured: state.has_access_token(),
					refresh_token_configured: state.has_refresh_token(),
					token_valid: state.is_token_valid(now),
					lifecycle: state.lifecycle(now),
					expires_at: state.expires_at(),
					client_id,
				}
			},
			AuthSettings::Basic { username, password } => AuthDetails::Basic {
				username_configured: username.as_ref().is_some_and(|name| !name.is_empty()),
				password_configured: password.as_ref().is_some_and(|pw| !pw.is_empty()),
			},
			AuthSettings::Custom { headers } =>
				AuthDetails::Custom { header_names: headers.keys().cloned().collect() },
		};

		AuthInfo {
			scheme: self.settings.scheme(),
			api_base_url: self.settings.base_url.clone(),
			details,
		}
	}

	fn base_headers(&self) -> AuthHeaders {
		let mut headers = AuthHeaders::new();

		headers.insert("Content-Type".into(), "application/json".into());
		headers.insert("User-Agent".into(), self.settings.user_agent.clone());

		headers
	}

	fn oauth_settings(&self) -> Result<&OAuth2Settings> {
		match &self.settings.auth {
			AuthSettings::OAuth2(oauth) => Ok(oauth),
			other => Err(ConfigError::SchemeMismatch {
				expected: AuthScheme::OAuth2.as_str(),
				actual: other.scheme().as_str(),
			}
			.into()),
		}
	}

	async fn refresh_locked(
		&self,
		state: &mut CredentialState,
		oauth: &OAuth2Settings,
	) -> Result<Secret> {
		const KIND: OpKind = OpKind::Refresh;

		let span = OpSpan::new(KIND, "refresh_locked");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span.instrument(self.refresh_with_grant(state, oauth)).await;

		self.finish(KIND, &result);

		result
	}

	async fn refresh_with_grant(
		&self,
		state: &mut CredentialState,
		oauth: &OAuth2Settings,
	) -> Result<Secret> {
		let refresh = state.refresh_token.clone().ok_or(AuthRefreshError::MissingRefreshToken)?;
		let (client_id, client_secret) = client_credentials(oauth)?;
		let form = [
			("grant_type", "refresh_token"),
			("refresh_token", refresh.expose()),
			("client_id", client_id),
			("client_secret", client_secret),
		];
		let response = token_endpoint::request_token(
			self.transport.as_ref(),
			self.settings.token_endpoint()?,
			"refresh_token",
			&form,
			self.settings.timeout(),
		)
		.await?;

		Ok(self.install_response(state, OpKind::Refresh, response))
	}

	fn install_response(
		&self,
		state: &mut CredentialState,
		kind: OpKind,
		response: TokenResponse,
	) -> Secret {
		let expires_at = expiry_after(self.clock.now_utc(), response.lifetime());
		let rotated = response.refresh_token.is_some();
		let access = response.access_token;

		state.install(access.clone(), response.refresh_token, expires_at);
		obs::token_installed(kind, expires_at, rotated);

		access
	}

	fn finish<T>(&self, kind: OpKind, result: &Result<T>) {
		match result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		obs::record_op_outcome(kind, OpOutcome::of(result));
	}
}
impl Debug for CredentialManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialManager")
			.field("scheme", &self.settings.scheme())
			.field("refresh_metrics", &self.refresh_metrics)
			.finish_non_exhaustive()
	}
}

fn current_token(state: &CredentialState, now: OffsetDateTime) -> Option<Secret> {
	if state.is_token_valid(now) { state.access_token.clone() } else { None }
}

fn required<'a>(secret: Option<&'a Secret>, setting: &'static str) -> Result<&'a Secret> {
	secret.filter(|secret| !secret.is_empty()).ok_or(ConfigError::MissingSecret { setting }.into())
}

fn client_credentials(oauth: &OAuth2Settings) -> Result<(&str, &str)> {
	let client_id = oauth
		.client_id
		.as_deref()
		.filter(|id| !id.is_empty())
		.ok_or(ConfigError::MissingSecret { setting: "CLIENT_ID" })?;
	let client_secret = required(oauth.client_secret.as_ref(), "CLIENT_SECRET")?;

	Ok((client_id, client_secret.expose()))
}

fn redact_client_id(client_id: &str) -> String {
	let prefix: String = client_id.chars().take(CLIENT_ID_PREFIX_LEN).collect();

	format!("{prefix}...")
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		_preludet::*,
		clock::ManualClock,
		error::TransportError,
	};

	fn oauth_settings() -> Settings {
		test_settings(AuthSettings::OAuth2(
			OAuth2Settings::new("client-123456789", "shh").with_refresh_token("r0"),
		))
	}

	fn token_transport(body: &'static str) -> ScriptedTransport {
		ScriptedTransport::new(move |_| Ok(json_response(200, body)))
	}

	fn clock() -> Arc<ManualClock> {
		Arc::new(ManualClock::starting_at(macros::datetime!(2025-01-01 00:00 UTC)))
	}

	#[tokio::test]
	async fn api_key_headers_use_configured_header() {
		let clock = clock();
		let transport = token_transport("{}");
		let settings = test_settings(AuthSettings::ApiKey {
			api_key: Some("k-1".into()),
			header: "X-Custom-Key".into(),
		});
		let manager = build_scripted_credentials(settings, &transport, &clock);
		let headers = manager.get_auth_headers().await.expect("API key headers should build.");

		assert_eq!(headers.get("X-Custom-Key").map(String::as_str), Some("k-1"));
		assert_eq!(headers.get("Content-Type").map(String::as_str), Some("application/json"));
		assert!(headers.contains_key("User-Agent"));
		assert_eq!(transport.requests().len(), 0);
	}

	#[tokio::test]
	async fn missing_api_key_is_configuration_error() {
		let clock = clock();
		let transport = token_transport("{}");
		let settings =
			test_settings(AuthSettings::ApiKey { api_key: None, header: "X-API-Key".into() });
		let manager = build_scripted_credentials(settings, &transport, &clock);
		let err = manager.get_auth_headers().await.expect_err("Missing key should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingSecret { setting: "API_KEY" })));
	}

	#[tokio::test]
	async fn basic_headers_are_base64_encoded() {
		let clock = clock();
		let transport = token_transport("{}");
		let manager = build_scripted_credentials(
			test_settings(AuthSettings::basic("aladdin", "opensesame")),
			&transport,
			&clock,
		);
		let headers = manager.get_auth_headers().await.expect("Basic headers should build.");

		assert_eq!(
			headers.get("Authorization").map(String::as_str),
			Some("Basic YWxhZGRpbjpvcGVuc2VzYW1l")
		);

		let missing = build_scripted_credentials(
			test_settings(AuthSettings::Basic { username: Some("u".into()), password: None }),
			&transport,
			&clock,
		);

		assert!(matches!(
			missing.get_auth_headers().await,
			Err(Error::Config(ConfigError::MissingSecret { setting: "PASSWORD" }))
		));
	}

	#[tokio::test]
	async fn bearer_static_is_adopted_once_and_stable() {
		let clock = clock();
		let transport = token_transport("{}");
		let manager =
			build_scripted_credentials(test_settings(AuthSettings::bearer("t-1")), &transport, &clock);
		let first = manager.get_auth_headers().await.expect("Bearer headers should build.");
		let second = manager.get_auth_headers().await.expect("Bearer headers should build.");

		assert_eq!(first, second);
		assert_eq!(first.get("Authorization").map(String::as_str), Some("Bearer t-1"));
		assert_eq!(transport.requests().len(), 0);
		assert_eq!(
			manager.snapshot().await.expires_at(),
			Some(macros::datetime!(2026-01-01 00:00 UTC))
		);
	}

	#[tokio::test]
	async fn custom_scheme_merges_configured_headers() {
		let clock = clock();
		let transport = token_transport("{}");
		let settings = test_settings(AuthSettings::Custom {
			headers: [("X-Tenant".to_owned(), "acme".to_owned())].into_iter().collect(),
		});
		let manager = build_scripted_credentials(settings, &transport, &clock);
		let headers = manager.get_auth_headers().await.expect("Custom headers should build.");

		assert_eq!(headers.get("X-Tenant").map(String::as_str), Some("acme"));
		assert_eq!(headers.len(), 3);
	}

	#[tokio::test]
	async fn custom_headers_replace_base_headers_ignoring_case() {
		let clock = clock();
		let transport = token_transport("{}");
		let settings = test_settings(AuthSettings::Custom {
			headers: [("content-type".to_owned(), "application/vnd.api+json".to_owned())]
				.into_iter()
				.collect(),
		});
		let manager = build_scripted_credentials(settings, &transport, &clock);
		let headers = manager.get_auth_headers().await.expect("Custom headers should build.");
		let content_types: Vec<_> =
			headers.iter().filter(|(name, _)| name.eq_ignore_ascii_case("content-type")).collect();

		assert_eq!(content_types.len(), 1);
		assert_eq!(headers.get("content-type").map(String::as_str), Some("application/vnd.api+json"));
		assert_eq!(headers.len(), 2);
	}

	#[tokio::test]
	async fn oversized_token_lifetime_does_not_overflow() {
		let clock = clock();
		let transport = token_transport(
			"{\"access_token\":\"long-lived\",\"expires_in\":18446744073709551615}",
		);
		let manager = build_scripted_credentials(oauth_settings(), &transport, &clock);
		let headers = manager.get_auth_headers().await.expect("Huge lifetimes should be capped.");

		assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer long-lived"));
		assert_eq!(
			manager.snapshot().await.expires_at(),
			Some(clock.now_utc() + STATIC_TOKEN_LIFETIME)
		);

		manager.get_auth_headers().await.expect("Capped token should be reused.");

		assert_eq!(transport.calls_to("/oauth/token"), 1);
	}

	#[tokio::test]
	async fn oauth_refreshes_only_inside_buffer() {
		let clock = clock();
		let transport =
			token_transport("{\"access_token\":\"fresh\",\"expires_in\":7200,\"refresh_token\":\"r1\"}");
		let manager = build_scripted_credentials(oauth_settings(), &transport, &clock);
		let now = clock.now_utc();

		manager
			.install_tokens("cached", Some("r0".into()), now + Duration::minutes(10))
			.await
			.expect("Tokens should install.");

		let headers = manager.get_auth_headers().await.expect("Valid token should be reused.");

		assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer cached"));
		assert_eq!(transport.calls_to("/oauth/token"), 0);

		manager
			.install_tokens("stale", None, now + Duration::minutes(4))
			.await
			.expect("Tokens should install.");

		let headers = manager.get_auth_headers().await.expect("Stale token should refresh.");

		assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer fresh"));
		assert_eq!(transport.calls_to("/oauth/token"), 1);

		let state = manager.snapshot().await;

		assert_eq!(state.expires_at(), Some(now + Duration::hours(2)));
		assert_eq!(state.refresh_token.as_ref().map(Secret::expose), Some("r1"));
		assert_eq!(manager.refresh_metrics().successes(), 1);

		let sent = transport.requests().remove(0);
		let form = String::from_utf8(sent.body.expect("Refresh should send a form body."))
			.expect("Form should be UTF-8.");

		assert!(form.contains("grant_type=refresh_token"));
		assert!(form.contains("refresh_token=r0"));
		assert!(form.contains("client_id=client-123456789"));
		assert!(form.contains("client_secret=shh"));
	}

	#[tokio::test]
	async fn oauth_without_refresh_token_fails_without_network() {
		let clock = clock();
		let transport = token_transport("{}");
		let settings =
			test_settings(AuthSettings::OAuth2(OAuth2Settings::new("client-123456789", "shh")));
		let manager = build_scripted_credentials(settings, &transport, &clock);
		let err = manager.get_auth_headers().await.expect_err("Refresh should be impossible.");

		assert!(matches!(err, Error::AuthRefresh(AuthRefreshError::MissingRefreshToken)));
		assert_eq!(transport.requests().len(), 0);
		assert_eq!(manager.refresh_metrics().failures(), 1);
	}

	#[tokio::test]
	async fn oauth_refresh_rejection_surfaces_status() {
		let clock = clock();
		let transport = ScriptedTransport::new(|_| Ok(json_response(400, "{\"error\":\"invalid_grant\"}")));
		let manager = build_scripted_credentials(oauth_settings(), &transport, &clock);
		let err = manager.get_auth_headers().await.expect_err("Rejected refresh should fail.");

		assert!(matches!(
			err,
			Error::AuthRefresh(AuthRefreshError::Rejected { status: 400, .. })
		));

		let network = ScriptedTransport::new(|_| Err(TransportError::Closed));
		let manager = build_scripted_credentials(oauth_settings(), &network, &clock);

		assert!(matches!(
			manager.get_auth_headers().await,
			Err(Error::AuthRefresh(AuthRefreshError::Transport { .. }))
		));
	}

	#[tokio::test]
	async fn exchange_code_installs_tokens() {
		let clock = clock();
		let transport =
			token_transport("{\"access_token\":\"from-code\",\"refresh_token\":\"r-code\"}");
		let settings =
			test_settings(AuthSettings::OAuth2(OAuth2Settings::new("client-123456789", "shh")));
		let manager = build_scripted_credentials(settings, &transport, &clock);

		manager.exchange_code("abc").await.expect("Code exchange should succeed.");

		let headers = manager.get_auth_headers().await.expect("Installed token should be valid.");

		assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer from-code"));
		assert_eq!(transport.calls_to("/oauth/token"), 1);

		let form = String::from_utf8(
			transport.requests().remove(0).body.expect("Exchange should send a form body."),
		)
		.expect("Form should be UTF-8.");

		assert!(form.contains("grant_type=authorization_code"));
		assert!(form.contains("code=abc"));
		assert!(form.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback"));
	}

	#[tokio::test]
	async fn authorization_url_carries_client_and_state() {
		let clock = clock();
		let transport = token_transport("{}");
		let manager = build_scripted_credentials(oauth_settings(), &transport, &clock);
		let auth = manager.authorization_url().expect("Authorize URL should build.");
		let pairs: BTreeMap<String, String> = auth.url.query_pairs().into_owned().collect();

		assert_eq!(auth.url.path(), "/oauth/authorize");
		assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("client-123456789"));
		assert_eq!(pairs.get("scope").map(String::as_str), Some("read write"));
		assert_eq!(pairs.get("state"), Some(&auth.state));
		assert!(!auth.state.is_empty());
	}

	#[tokio::test]
	async fn oauth_only_operations_reject_other_schemes() {
		let clock = clock();
		let transport = token_transport("{}");
		let manager =
			build_scripted_credentials(test_settings(AuthSettings::api_key("k")), &transport, &clock);

		assert!(matches!(
			manager.authorization_url(),
			Err(Error::Config(ConfigError::SchemeMismatch { expected: "oauth2", actual: "api_key" }))
		));
		assert!(manager.exchange_code("abc").await.is_err());
		assert_eq!(transport.requests().len(), 0);
	}

	#[tokio::test]
	async fn auth_info_hides_secrets() {
		let clock = clock();
		let transport = token_transport("{}");
		let manager = build_scripted_credentials(oauth_settings(), &transport, &clock);
		let info = manager.auth_info().await;

		assert_eq!(info.scheme, AuthScheme::OAuth2);
		assert_eq!(info.api_base_url, "https://api.example.test");
		assert_eq!(
			info.details,
			AuthDetails::Token {
				access_token_configured: false,
				refresh_token_configured: true,
				token_valid: false,
				lifecycle: TokenLifecycle::NoToken,
				expires_at: None,
				client_id: Some("client-1...".into()),
			}
		);
		assert!(!format!("{info:?}").contains("shh"));
	}
}
