//! Immutable settings consumed by the access core.
//!
//! Settings can be assembled programmatically with the `with_*` helpers, deserialized with
//! serde, or loaded from the process environment via [`Settings::from_env`] (optionally
//! seeded from a `.env` file with [`Settings::from_dotenv`]). Loading never
//! checks scheme secrets; missing secrets surface lazily as
//! [`ConfigError::MissingSecret`] the first time headers are requested, while
//! [`Settings::validate`] reports every missing variable up front.

// std
use std::path::Path;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

const DEFAULT_ENV_API_VERSION: &str = "v1";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
const DEFAULT_OAUTH_SCOPE: &str = "read,write";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";
const DEFAULT_MAX_REQUESTS: usize = 100;
const DEFAULT_WINDOW_SECONDS: u64 = 3600;

/// Authentication scheme tag selected at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
	/// Static API key sent in a configurable header.
	ApiKey,
	/// Static bearer token.
	BearerStatic,
	/// OAuth 2.0 access token renewed through a refresh token.
	#[serde(rename = "oauth2")]
	OAuth2,
	/// HTTP Basic credentials.
	Basic,
	/// Caller-defined headers only.
	Custom,
}
impl AuthScheme {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthScheme::ApiKey => "api_key",
			AuthScheme::BearerStatic => "bearer_static",
			AuthScheme::OAuth2 => "oauth2",
			AuthScheme::Basic => "basic",
			AuthScheme::Custom => "custom",
		}
	}
}
impl Display for AuthScheme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for AuthScheme {
	type Err = ConfigError;

	/// Accepts both the canonical labels and the human-readable names
	/// (`API Key`, `Bearer Token`, `OAuth2`, `Basic Auth`, `Custom`).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let folded: String = s
			.chars()
			.filter(|c| !matches!(c, ' ' | '_' | '-'))
			.map(|c| c.to_ascii_lowercase())
			.collect();

		match folded.as_str() {
			"apikey" => Ok(Self::ApiKey),
			"bearer" | "bearertoken" | "bearerstatic" => Ok(Self::BearerStatic),
			"oauth2" | "oauth" => Ok(Self::OAuth2),
			"basic" | "basicauth" => Ok(Self::Basic),
			"custom" => Ok(Self::Custom),
			_ => Err(ConfigError::InvalidSetting {
				name: "AUTH_TYPE",
				reason: format!("unknown auth scheme `{s}`"),
			}),
		}
	}
}

/// OAuth 2.0 client registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Settings {
	/// OAuth 2.0 client identifier.
	#[serde(default)]
	pub client_id: Option<String>,
	/// OAuth 2.0 client secret.
	#[serde(default)]
	pub client_secret: Option<Secret>,
	/// Redirect URI registered with the provider.
	#[serde(default = "default_redirect_uri")]
	pub redirect_uri: String,
	/// Requested scope, comma or space delimited.
	#[serde(default = "default_oauth_scope")]
	pub scope: String,
	/// Refresh token obtained out of band, if any.
	#[serde(default)]
	pub refresh_token: Option<Secret>,
}
impl OAuth2Settings {
	/// Creates a registration with default redirect URI and scope.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self {
			client_id: Some(client_id.into()),
			client_secret: Some(client_secret.into()),
			redirect_uri: default_redirect_uri(),
			scope: default_oauth_scope(),
			refresh_token: None,
		}
	}

	/// Seeds the refresh token used for the first renewal.
	pub fn with_refresh_token(mut self, token: impl Into<Secret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Overrides the requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Overrides the redirect URI.
	pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = uri.into();

		self
	}

	/// Splits the configured scope on commas and whitespace.
	pub fn scopes(&self) -> impl Iterator<Item = &str> {
		self.scope.split([',', ' ']).map(str::trim).filter(|scope| !scope.is_empty())
	}
}

/// Scheme-specific credentials; exactly one scheme is active per process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum AuthSettings {
	/// API key credentials.
	ApiKey {
		/// Key value.
		#[serde(default)]
		api_key: Option<Secret>,
		/// Header carrying the key.
		#[serde(default = "default_api_key_header")]
		header: String,
	},
	/// Static bearer token.
	BearerStatic {
		/// Token value.
		#[serde(default)]
		token: Option<Secret>,
	},
	/// OAuth 2.0 registration.
	#[serde(rename = "oauth2")]
	OAuth2(OAuth2Settings),
	/// HTTP Basic credentials.
	Basic {
		/// User name.
		#[serde(default)]
		username: Option<String>,
		/// Password.
		#[serde(default)]
		password: Option<Secret>,
	},
	/// Custom headers merged into every request.
	Custom {
		/// Extra headers.
		#[serde(default)]
		headers: BTreeMap<String, String>,
	},
}
impl AuthSettings {
	/// API key sent in the default `X-API-Key` header.
	pub fn api_key(key: impl Into<Secret>) -> Self {
		Self::ApiKey { api_key: Some(key.into()), header: default_api_key_header() }
	}

	/// Static bearer token.
	pub fn bearer(token: impl Into<Secret>) -> Self {
		Self::BearerStatic { token: Some(token.into()) }
	}

	/// HTTP Basic credentials.
	pub fn basic(username: impl Into<String>, password: impl Into<Secret>) -> Self {
		Self::Basic { username: Some(username.into()), password: Some(password.into()) }
	}

	/// Returns the scheme tag for these credentials.
	pub fn scheme(&self) -> AuthScheme {
		match self {
			Self::ApiKey { .. } => AuthScheme::ApiKey,
			Self::BearerStatic { .. } => AuthScheme::BearerStatic,
			Self::OAuth2(_) => AuthScheme::OAuth2,
			Self::Basic { .. } => AuthScheme::Basic,
			Self::Custom { .. } => AuthScheme::Custom,
		}
	}

	fn missing(&self) -> Vec<&'static str> {
		let mut names = Vec::new();

		match self {
			Self::ApiKey { api_key, .. } =>
				if is_blank(api_key.as_ref().map(Secret::expose)) {
					names.push("API_KEY");
				},
			Self::BearerStatic { token } =>
				if is_blank(token.as_ref().map(Secret::expose)) {
					names.push("BEARER_TOKEN");
				},
			Self::OAuth2(oauth) => {
				if is_blank(oauth.client_id.as_deref()) {
					names.push("CLIENT_ID");
				}
				if is_blank(oauth.client_secret.as_ref().map(Secret::expose)) {
					names.push("CLIENT_SECRET");
				}
			},
			Self::Basic { username, password } => {
				if is_blank(username.as_deref()) {
					names.push("USERNAME");
				}
				if is_blank(password.as_ref().map(Secret::expose)) {
					names.push("PASSWORD");
				}
			},
			Self::Custom { .. } => {},
		}

		names
	}
}

/// Rolling-window request budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
	/// Requests admitted per window.
	pub max_requests: usize,
	/// Window length in seconds.
	pub window_seconds: u64,
}
impl RateLimitSettings {
	/// Window length as a duration.
	pub fn window(&self) -> StdDuration {
		StdDuration::from_secs(self.window_seconds)
	}
}
impl Default for RateLimitSettings {
	fn default() -> Self {
		Self { max_requests: DEFAULT_MAX_REQUESTS, window_seconds: DEFAULT_WINDOW_SECONDS }
	}
}

/// Immutable configuration for one API target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
	/// Base URL of the target API (without version segment).
	pub base_url: String,
	/// Optional version segment appended to the base URL.
	#[serde(default)]
	pub api_version: Option<String>,
	/// Per-request timeout in seconds.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
	/// `User-Agent` header value.
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
	/// Active credentials.
	pub auth: AuthSettings,
	/// Request budget; `None` disables rate governance.
	#[serde(default = "default_rate_limit")]
	pub rate_limit: Option<RateLimitSettings>,
}
impl Settings {
	/// Creates settings with default timeout, user agent, and rate limit and no version segment.
	pub fn new(base_url: impl Into<String>, auth: AuthSettings) -> Self {
		Self {
			base_url: base_url.into(),
			api_version: None,
			timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
			user_agent: default_user_agent(),
			auth,
			rate_limit: default_rate_limit(),
		}
	}

	/// Loads settings from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads `.env` from the working directory (or its parents) when present, then reads the
	/// process environment. Variables already set in the environment win.
	pub fn from_dotenv() -> Result<Self, ConfigError> {
		match dotenvy::dotenv() {
			Ok(_) => (),
			Err(e) if e.not_found() => (),
			Err(e) => return Err(dotenv_error(e)),
		}

		Self::from_env()
	}

	/// Like [`Settings::from_dotenv`] but reads an explicit file, which must exist.
	pub fn from_dotenv_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		dotenvy::from_path(path).map_err(dotenv_error)?;

		Self::from_env()
	}

	/// Loads settings through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let base_url = var("API_BASE_URL")
			.ok_or(ConfigError::MissingSettings { names: vec!["API_BASE_URL"] })?;
		let api_version = match var("API_VERSION") {
			Some(version) if version.eq_ignore_ascii_case("none") => None,
			Some(version) => Some(version),
			None => Some(DEFAULT_ENV_API_VERSION.to_owned()),
		};
		let timeout_seconds = match var("API_TIMEOUT") {
			Some(raw) => parse_number("API_TIMEOUT", &raw)?,
			None => DEFAULT_TIMEOUT_SECONDS,
		};
		let scheme = match var("AUTH_TYPE") {
			Some(raw) => raw.parse()?,
			None => AuthScheme::ApiKey,
		};
		let auth = match scheme {
			AuthScheme::ApiKey => AuthSettings::ApiKey {
				api_key: var("API_KEY").map(Secret::from),
				header: var("API_KEY_HEADER").unwrap_or_else(default_api_key_header),
			},
			AuthScheme::BearerStatic =>
				AuthSettings::BearerStatic { token: var("BEARER_TOKEN").map(Secret::from) },
			AuthScheme::OAuth2 => AuthSettings::OAuth2(OAuth2Settings {
				client_id: var("CLIENT_ID"),
				client_secret: var("CLIENT_SECRET").map(Secret::from),
				redirect_uri: var("OAUTH_REDIRECT_URI").unwrap_or_else(default_redirect_uri),
				scope: var("OAUTH_SCOPE").unwrap_or_else(default_oauth_scope),
				refresh_token: var("OAUTH_REFRESH_TOKEN").map(Secret::from),
			}),
			AuthScheme::Basic => AuthSettings::Basic {
				username: var("USERNAME"),
				password: var("PASSWORD").map(Secret::from),
			},
			AuthScheme::Custom => {
				let headers = match var("CUSTOM_AUTH_HEADERS") {
					Some(raw) => serde_json::from_str(&raw).map_err(|e| {
						ConfigError::InvalidSetting {
							name: "CUSTOM_AUTH_HEADERS",
							reason: format!("expected a JSON object of strings ({e})"),
						}
					})?,
					None => BTreeMap::new(),
				};

				AuthSettings::Custom { headers }
			},
		};
		let rate_limit_enabled = match var("RATE_LIMITING") {
			Some(raw) => parse_flag("RATE_LIMITING", &raw)?,
			None => true,
		};
		let rate_limit = if rate_limit_enabled {
			let mut limits = RateLimitSettings::default();

			if let Some(raw) = var("RATE_LIMIT_REQUESTS") {
				limits.max_requests = parse_number("RATE_LIMIT_REQUESTS", &raw)?;
			}
			if let Some(raw) = var("RATE_LIMIT_WINDOW") {
				limits.window_seconds = parse_number("RATE_LIMIT_WINDOW", &raw)?;
			}

			Some(limits)
		} else {
			None
		};

		Ok(Self {
			base_url,
			api_version,
			timeout_seconds,
			user_agent: var("API_USER_AGENT").unwrap_or_else(default_user_agent),
			auth,
			rate_limit,
		})
	}

	/// Sets the version segment appended to the base URL.
	pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = Some(version.into());

		self
	}

	/// Overrides the per-request timeout.
	pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
		self.timeout_seconds = seconds;

		self
	}

	/// Overrides the `User-Agent` header value.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Sets the rolling-window request budget.
	pub fn with_rate_limit(mut self, max_requests: usize, window_seconds: u64) -> Self {
		self.rate_limit = Some(RateLimitSettings { max_requests, window_seconds });

		self
	}

	/// Disables rate governance.
	pub fn without_rate_limit(mut self) -> Self {
		self.rate_limit = None;

		self
	}

	/// Active auth scheme.
	pub fn scheme(&self) -> AuthScheme {
		self.auth.scheme()
	}

	/// Per-request timeout.
	pub fn timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.timeout_seconds)
	}

	/// Base URL joined with the version segment, without a trailing slash.
	pub fn full_api_url(&self) -> String {
		let base = self.base_url.trim_end_matches('/');

		match self.api_version.as_deref().map(str::trim) {
			Some(version) if !version.is_empty() && !version.eq_ignore_ascii_case("none") =>
				format!("{base}/{}", version.trim_matches('/')),
			_ => base.to_owned(),
		}
	}

	/// OAuth 2.0 token endpoint derived from the base URL.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		join_url(&self.base_url, "oauth/token")
	}

	/// OAuth 2.0 authorization endpoint derived from the base URL.
	pub fn authorization_endpoint(&self) -> Result<Url, ConfigError> {
		join_url(&self.base_url, "oauth/authorize")
	}

	/// Resolves `path` against [`full_api_url`](Self::full_api_url) with exactly one slash
	/// at the join.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		join_url(&self.full_api_url(), path)
	}

	/// Reports every missing required setting and rejects unusable values.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut names = self.auth.missing();

		if self.base_url.trim().is_empty() {
			names.insert(0, "API_BASE_URL");
		}
		if !names.is_empty() {
			return Err(ConfigError::MissingSettings { names });
		}
		if self.timeout_seconds == 0 {
			return Err(ConfigError::InvalidSetting {
				name: "API_TIMEOUT",
				reason: "must be at least one second".into(),
			});
		}
		if let Some(limits) = &self.rate_limit
			&& limits.max_requests == 0
		{
			return Err(ConfigError::InvalidSetting {
				name: "RATE_LIMIT_REQUESTS",
				reason: "must admit at least one request per window".into(),
			});
		}

		self.resolve("/").map(|_| ())
	}
}

/// Joins a base URL and path with exactly one slash at the boundary.
pub(crate) fn join_url(base: &str, path: &str) -> Result<Url, ConfigError> {
	let joined = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));

	Url::parse(&joined).map_err(|source| ConfigError::InvalidUrl { url: joined, source })
}

fn is_blank(value: Option<&str>) -> bool {
	value.is_none_or(|v| v.trim().is_empty())
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
	T: FromStr,
	T::Err: Display,
{
	raw.parse().map_err(|e: T::Err| ConfigError::InvalidSetting { name, reason: e.to_string() })
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
	match raw.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidSetting { name, reason: format!("`{raw}` is not a flag") }),
	}
}

fn default_timeout_seconds() -> u64 {
	DEFAULT_TIMEOUT_SECONDS
}

fn default_user_agent() -> String {
	format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_rate_limit() -> Option<RateLimitSettings> {
	Some(RateLimitSettings::default())
}

fn default_api_key_header() -> String {
	DEFAULT_API_KEY_HEADER.to_owned()
}

fn default_oauth_scope() -> String {
	DEFAULT_OAUTH_SCOPE.to_owned()
}

fn default_redirect_uri() -> String {
	DEFAULT_REDIRECT_URI.to_owned()
}

fn dotenv_error(e: dotenvy::Error) -> ConfigError {
	ConfigError::InvalidSetting { name: ".env", reason: e.to_string() }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: BTreeMap<String, String> =
			pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |name| map.get(name).cloned()
	}

	#[test]
	fn env_defaults_apply_when_unset() {
		let settings = Settings::from_lookup(lookup(&[
			("API_BASE_URL", "https://api.example.com/"),
			("API_KEY", "k-123"),
		]))
		.expect("Minimal environment should load.");

		assert_eq!(settings.full_api_url(), "https://api.example.com/v1");
		assert_eq!(settings.timeout(), StdDuration::from_secs(30));
		assert_eq!(settings.scheme(), AuthScheme::ApiKey);
		assert_eq!(
			settings.rate_limit,
			Some(RateLimitSettings { max_requests: 100, window_seconds: 3600 })
		);
		assert!(matches!(
			&settings.auth,
			AuthSettings::ApiKey { header, .. } if header == "X-API-Key"
		));
		settings.validate().expect("Complete API key settings should validate.");
	}

	#[test]
	fn version_none_disables_segment() {
		let settings = Settings::from_lookup(lookup(&[
			("API_BASE_URL", "https://api.example.com"),
			("API_VERSION", "None"),
		]))
		.expect("Environment should load.");

		assert_eq!(settings.full_api_url(), "https://api.example.com");
	}

	#[test]
	fn human_readable_scheme_names_parse() {
		assert_eq!("Bearer Token".parse::<AuthScheme>().ok(), Some(AuthScheme::BearerStatic));
		assert_eq!("Basic Auth".parse::<AuthScheme>().ok(), Some(AuthScheme::Basic));
		assert_eq!("OAuth2".parse::<AuthScheme>().ok(), Some(AuthScheme::OAuth2));
		assert_eq!("api_key".parse::<AuthScheme>().ok(), Some(AuthScheme::ApiKey));
		assert!("kerberos".parse::<AuthScheme>().is_err());
	}

	#[test]
	fn validate_lists_every_missing_variable() {
		let settings = Settings::from_lookup(lookup(&[
			("API_BASE_URL", "https://api.example.com"),
			("AUTH_TYPE", "OAuth2"),
		]))
		.expect("Environment should load without secrets.");
		let err = settings.validate().expect_err("Missing OAuth secrets should fail validation.");

		assert!(matches!(
			err,
			ConfigError::MissingSettings { ref names } if names == &["CLIENT_ID", "CLIENT_SECRET"]
		));
	}

	#[test]
	fn missing_base_url_is_reported() {
		let err = Settings::from_lookup(lookup(&[])).expect_err("Base URL is mandatory.");

		assert!(matches!(err, ConfigError::MissingSettings { .. }));
	}

	#[test]
	fn rate_limiting_can_be_disabled_and_tuned() {
		let disabled = Settings::from_lookup(lookup(&[
			("API_BASE_URL", "https://api.example.com"),
			("RATE_LIMITING", "no"),
		]))
		.expect("Environment should load.");

		assert_eq!(disabled.rate_limit, None);

		let tuned = Settings::from_lookup(lookup(&[
			("API_BASE_URL", "https://api.example.com"),
			("RATE_LIMIT_REQUESTS", "5"),
			("RATE_LIMIT_WINDOW", "60"),
		]))
		.expect("Environment should load.");

		assert_eq!(tuned.rate_limit, Some(RateLimitSettings { max_requests: 5, window_seconds: 60 }));

		let bad = Settings::from_lookup(lookup(&[
			("API_BASE_URL", "https://api.example.com"),
			("RATE_LIMIT_REQUESTS", "many"),
		]))
		.expect_err("Non-numeric limits should be rejected.");

		assert!(matches!(bad, ConfigError::InvalidSetting { name: "RATE_LIMIT_REQUESTS", .. }));
	}

	#[test]
	fn custom_headers_load_from_json() {
		let settings = Settings::from_lookup(lookup(&[
			("API_BASE_URL", "https://api.example.com"),
			("AUTH_TYPE", "custom"),
			("CUSTOM_AUTH_HEADERS", "{\"X-Tenant\":\"acme\"}"),
		]))
		.expect("Custom header JSON should load.");

		assert!(matches!(
			&settings.auth,
			AuthSettings::Custom { headers } if headers.get("X-Tenant").map(String::as_str) == Some("acme")
		));
	}

	#[test]
	fn resolve_normalizes_single_slash() {
		let settings = Settings::new("https://api.example.com/", AuthSettings::api_key("k"))
			.with_api_version("/v2/");

		assert_eq!(
			settings.resolve("//items/1").expect("Path should resolve.").as_str(),
			"https://api.example.com/v2/items/1"
		);
		assert_eq!(
			settings.token_endpoint().expect("Token endpoint should resolve.").as_str(),
			"https://api.example.com/oauth/token"
		);
	}

	#[test]
	fn auth_settings_deserialize_with_scheme_tag() {
		let auth: AuthSettings = serde_json::from_str(
			"{\"scheme\":\"oauth2\",\"client_id\":\"cid\",\"client_secret\":\"sec\"}",
		)
		.expect("Tagged OAuth2 settings should deserialize.");

		match auth {
			AuthSettings::OAuth2(oauth) => {
				assert_eq!(oauth.client_id.as_deref(), Some("cid"));
				assert_eq!(oauth.scope, "read,write");
				assert_eq!(oauth.scopes().collect::<Vec<_>>(), vec!["read", "write"]);
			},
			other => panic!("Unexpected auth settings: {other:?}."),
		}
	}
}
