//! OAuth 2.0 Authorization Code identity-provider adapter: redirect construction, code exchange,
//! profile-driven identity resolution, and silent refresh behind one pluggable handler set.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod factory;
pub mod handlers;
pub mod http;
pub mod identity;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{BackstageIdentity, TokenSecret},
		factory::{self, GlobalConfig, ProviderEnvConfig},
		handlers::OAuthHandlers,
		identity::{IdentityIssuer, IssuerFuture},
	};

	/// Base URL the fixtures register callbacks under.
	pub const TEST_BASE_URL: &str = "https://app.example.com/api/auth";
	/// Provider id used by the fixtures.
	pub const TEST_PROVIDER_ID: &str = "mock";
	/// Client id configured by the fixtures.
	pub const TEST_CLIENT_ID: &str = "client-mock";
	/// Client secret configured by the fixtures.
	pub const TEST_CLIENT_SECRET: &str = "secret-mock";

	/// Issuer that mints `session:<id>` tokens.
	#[derive(Clone, Copy, Debug, Default)]
	pub struct EchoIssuer;
	impl IdentityIssuer for EchoIssuer {
		fn issue_token<'a>(&'a self, identity: &'a BackstageIdentity) -> IssuerFuture<'a> {
			Box::pin(async move { Ok(TokenSecret::new(format!("session:{}", identity.id))) })
		}
	}

	/// Provider configuration pointing every endpoint at `server_base` (`/authorize`, `/token`,
	/// `/userinfo`).
	pub fn mock_env_config(server_base: &str) -> ProviderEnvConfig {
		let server_base = server_base.trim_end_matches('/');

		ProviderEnvConfig {
			client_id: Some(TEST_CLIENT_ID.into()),
			client_secret: Some(TokenSecret::new(TEST_CLIENT_SECRET)),
			authorization_url: Some(format!("{server_base}/authorize")),
			token_url: Some(format!("{server_base}/token")),
			profile_url: Some(format!("{server_base}/userinfo")),
			scope: Some("openid email".into()),
			..Default::default()
		}
	}

	/// Builds reqwest-backed handlers for `env`.
	pub fn build_test_handlers_with(env: &ProviderEnvConfig) -> OAuthHandlers {
		factory::create_provider(
			TEST_PROVIDER_ID,
			&GlobalConfig::new(TEST_BASE_URL),
			env,
			Arc::new(EchoIssuer),
		)
		.expect("Failed to build handlers for tests.")
	}

	/// Builds reqwest-backed handlers against a mock server.
	pub fn build_test_handlers(server_base: &str) -> OAuthHandlers {
		build_test_handlers_with(&mock_env_config(server_base))
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
