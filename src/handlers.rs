//! Provider handlers: the `start`, `handler`, and `refresh` entry points.
//!
//! [`OAuthHandlers`] sequences the strategy adapter and the identity resolver into complete
//! transactions. Each call is independent; the handlers hold no mutable state and can be shared
//! across tasks behind an [`Arc`].

pub mod callback;
pub mod common;
pub mod refresh;
pub mod start;

pub use callback::*;
pub use common::*;
pub use start::*;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{BackstageIdentity, OAuthResponse, ProviderId, ProviderInfo, TokenSecret},
	identity::{self, EmailLocalPartResolver, IdentityIssuer, IdentityResolver},
	oauth::{OAuthStrategy, TokenParams},
};

/// Handlers bound to one configured provider.
#[derive(Clone)]
pub struct OAuthHandlers {
	provider_id: ProviderId,
	strategy: Arc<dyn OAuthStrategy>,
	resolver: Arc<dyn IdentityResolver>,
	issuer: Arc<dyn IdentityIssuer>,
}
impl OAuthHandlers {
	/// Binds a strategy adapter and an identity issuer under `provider_id`.
	///
	/// Identities are resolved with [`EmailLocalPartResolver`] until
	/// [`with_resolver`](Self::with_resolver) swaps in another policy.
	pub fn new(
		provider_id: ProviderId,
		strategy: Arc<dyn OAuthStrategy>,
		issuer: Arc<dyn IdentityIssuer>,
	) -> Self {
		Self { provider_id, strategy, resolver: Arc::new(EmailLocalPartResolver), issuer }
	}

	/// Replaces the identity resolution policy.
	pub fn with_resolver(mut self, resolver: Arc<dyn IdentityResolver>) -> Self {
		self.resolver = resolver;

		self
	}

	/// Provider these handlers serve.
	pub fn provider_id(&self) -> &ProviderId {
		&self.provider_id
	}

	/// Strategy adapter the handlers delegate protocol calls to.
	pub fn strategy(&self) -> &dyn OAuthStrategy {
		self.strategy.as_ref()
	}

	/// Mints a session token for an identity resolved by `handler` or `refresh`.
	pub async fn issue_session_token(&self, identity: &BackstageIdentity) -> Result<TokenSecret> {
		self.issuer.issue_token(identity).await
	}

	/// Normalizes the profile, resolves the identity, and assembles the response.
	///
	/// Nothing is returned unless resolution succeeds, so a response never lacks an identity.
	fn assemble_response(
		&self,
		access_token: TokenSecret,
		params: TokenParams,
		raw_profile: &Value,
		requested_scope: Option<&str>,
	) -> Result<OAuthResponse> {
		let profile = identity::make_profile_info(raw_profile, params.id_token.as_deref())?;
		let backstage_identity = self.resolver.resolve(&profile)?;
		let scope = params
			.scope
			.or_else(|| requested_scope.map(str::to_owned))
			.or_else(|| self.strategy.default_scope().map(str::to_owned))
			.unwrap_or_default();

		Ok(OAuthResponse {
			provider_info: ProviderInfo {
				id_token: params.id_token,
				access_token,
				scope,
				expires_in_seconds: params.expires_in,
			},
			profile,
			backstage_identity: Some(backstage_identity),
		})
	}
}
impl Debug for OAuthHandlers {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthHandlers")
			.field("provider_id", &self.provider_id)
			.finish_non_exhaustive()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn start_forces_offline_consent_over_caller_options() {
		let handlers = build_test_handlers("https://idp.example.com");
		let redirect = handlers
			.start(
				StartOptions::new()
					.with_scope("read")
					.with_param("prompt", "none")
					.with_param("access_type", "online"),
			)
			.expect("Start should succeed.");
		let url = redirect.url.as_str();

		assert!(url.starts_with("https://idp.example.com/authorize?"));
		assert!(
			url.contains("client_id=client-mock&scope=read&access_type=offline&prompt=consent")
		);
		assert!(!url.contains("prompt=none"));
		assert!(!url.contains("access_type=online"));
		assert_eq!(redirect.state().map(|state| state.len()), Some(32));
	}

	#[test]
	fn start_rejects_malformed_options() {
		let handlers = build_test_handlers("https://idp.example.com");
		let err = handlers
			.start(StartOptions::new().with_state(""))
			.expect_err("Empty state must be rejected.");

		assert!(matches!(err, Error::InvalidOptions { .. }));
	}

	#[tokio::test]
	async fn session_tokens_come_from_the_issuer() {
		let handlers = build_test_handlers("https://idp.example.com");
		let token = handlers
			.issue_session_token(&BackstageIdentity { id: "alice".into() })
			.await
			.expect("Issuer should mint a token.");

		assert_eq!(token.expose(), "session:alice");
	}

	#[test]
	fn debug_output_hides_collaborators() {
		let handlers = build_test_handlers("https://idp.example.com");
		let rendered = format!("{handlers:?}");

		assert!(rendered.contains("Provider(mock)"));
		assert!(!rendered.contains(TEST_CLIENT_SECRET));
	}
}
