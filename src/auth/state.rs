//! Mutable credential state guarded by the credential manager.

// self
use crate::{_prelude::*, auth::Secret, config::AuthScheme};

/// Tokens are treated as stale this long before their recorded expiry.
pub const EXPIRY_BUFFER: Duration = Duration::minutes(5);
/// Lifetime assigned to static bearer tokens when they are adopted.
pub const STATIC_TOKEN_LIFETIME: Duration = Duration::days(365);

/// Expiry `lifetime` after `now`, saturating at `now` when the sum is out of range.
pub(crate) fn expiry_after(now: OffsetDateTime, lifetime: Duration) -> OffsetDateTime {
	now.checked_add(lifetime).unwrap_or(now)
}

/// Observable position in the token lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenLifecycle {
	/// Scheme does not use tokens (API key, basic, custom).
	Static,
	/// No access token has been obtained yet.
	NoToken,
	/// Access token is usable.
	Valid,
	/// Access token is inside the expiry buffer and must be renewed before use.
	Expiring,
	/// Renewal is impossible because no refresh token is stored.
	NoRefreshToken,
}

/// Credential state; exactly one instance exists per credential manager.
#[derive(Clone)]
pub struct CredentialState {
	scheme: AuthScheme,
	pub(crate) access_token: Option<Secret>,
	pub(crate) refresh_token: Option<Secret>,
	pub(crate) expires_at: Option<OffsetDateTime>,
}
impl CredentialState {
	/// Creates an empty state for `scheme`, optionally seeded with a refresh token.
	pub fn new(scheme: AuthScheme, refresh_token: Option<Secret>) -> Self {
		let refresh_token = match scheme {
			AuthScheme::OAuth2 => refresh_token,
			_ => None,
		};

		Self { scheme, access_token: None, refresh_token, expires_at: None }
	}

	/// Scheme fixed at construction.
	pub fn scheme(&self) -> AuthScheme {
		self.scheme
	}

	/// Recorded expiry of the access token.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Whether an access token is stored.
	pub fn has_access_token(&self) -> bool {
		self.access_token.is_some()
	}

	/// Whether a refresh token is stored.
	pub fn has_refresh_token(&self) -> bool {
		self.refresh_token.is_some()
	}

	/// `true` when a token exists and `now < expires_at - 5min`.
	pub fn is_token_valid(&self, now: OffsetDateTime) -> bool {
		match (&self.access_token, self.expires_at) {
			(Some(_), Some(expires_at)) =>
				expires_at.checked_sub(EXPIRY_BUFFER).is_some_and(|deadline| now < deadline),
			_ => false,
		}
	}

	/// Computes the lifecycle position at `now`.
	pub fn lifecycle(&self, now: OffsetDateTime) -> TokenLifecycle {
		if !matches!(self.scheme, AuthScheme::BearerStatic | AuthScheme::OAuth2) {
			return TokenLifecycle::Static;
		}
		if self.is_token_valid(now) {
			return TokenLifecycle::Valid;
		}
		if self.scheme == AuthScheme::OAuth2 && self.refresh_token.is_none() {
			return TokenLifecycle::NoRefreshToken;
		}
		if self.access_token.is_some() {
			return TokenLifecycle::Expiring;
		}

		TokenLifecycle::NoToken
	}

	/// Replaces the access token, expiry, and (if provided) refresh token in one step.
	pub(crate) fn install(
		&mut self,
		access_token: Secret,
		refresh_token: Option<Secret>,
		expires_at: OffsetDateTime,
	) {
		self.access_token = Some(access_token);
		self.expires_at = Some(expires_at);

		if let Some(refresh) = refresh_token {
			self.refresh_token = Some(refresh);
		}
	}
}
impl Debug for CredentialState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialState")
			.field("scheme", &self.scheme)
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
