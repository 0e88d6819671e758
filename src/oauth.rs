//! OAuth 2.0 Authorization Code strategy adapter.
//!
//! [`OAuthStrategy`] is the uniform protocol surface the handlers sequence: authorization URL
//! construction, code exchange, refresh exchange, and profile retrieval. [`OAuth2Strategy`]
//! implements it for any provider family by varying only its [`ProviderConfig`]; profile shape
//! differences are absorbed later by [`make_profile_info`](crate::identity::make_profile_info).

pub mod token;

pub use token::GrantType;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, USER_AGENT},
	},
};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{RedirectInfo, TokenSecret},
	error::{ProfileFetchError, TokenEndpointError, TransportError},
	http::OAuthHttpClient,
	identity,
	provider::ProviderConfig,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Authorization parameters that can never be overridden by callers.
///
/// `access_type=offline` makes the provider issue a refresh token and `prompt=consent` forces the
/// consent screen so that it does so on every login.
pub const FIXED_AUTHORIZATION_PARAMS: [(&str, &str); 2] =
	[("access_type", "offline"), ("prompt", "consent")];

const RESERVED_AUTHORIZATION_PARAMS: [&str; 7] =
	["response_type", "redirect_uri", "client_id", "scope", "state", "access_type", "prompt"];
const USER_AGENT_VALUE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Boxed future returned by [`OAuthStrategy`] operations.
pub type StrategyFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Caller parameters for the authorization redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationParams {
	/// Requested scope; the provider default applies when absent.
	pub scope: Option<String>,
	/// Opaque CSRF/correlation value echoed back on the callback.
	pub state: String,
	/// Additional query parameters. Reserved names are ignored.
	pub extra: BTreeMap<String, String>,
}

/// Token response fields passed through to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenParams {
	/// OIDC id token.
	pub id_token: Option<String>,
	/// Granted scope.
	pub scope: Option<String>,
	/// Access token lifetime in seconds.
	pub expires_in: Option<u64>,
}

/// Result of an authorization code exchange followed by a profile fetch.
#[derive(Clone, Debug)]
pub struct CodeExchange {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Remaining token response fields.
	pub params: TokenParams,
	/// Provider-shaped profile fetched with the new access token.
	pub raw_profile: Value,
}

/// Result of a refresh token grant.
#[derive(Clone, Debug)]
pub struct RefreshExchange {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Remaining token response fields.
	pub params: TokenParams,
	/// Replacement refresh token some providers rotate in; callers keep the token they hold.
	pub rotated_refresh_token: Option<TokenSecret>,
}

/// Wire-level OAuth 2.0 Authorization Code protocol for one provider configuration.
///
/// Implementations are immutable after construction and shared across concurrent transactions.
pub trait OAuthStrategy: Send + Sync {
	/// Default scope requested when the caller does not supply one.
	fn default_scope(&self) -> Option<&str>;

	/// Builds the authorization server redirect. Pure URL construction.
	fn build_authorization_request(&self, params: &AuthorizationParams) -> RedirectInfo;

	/// Exchanges an authorization code for tokens, then fetches the profile with them.
	fn exchange_code_for_token<'a>(&'a self, code: &'a str) -> StrategyFuture<'a, CodeExchange>;

	/// Runs the refresh token grant.
	fn exchange_refresh_token<'a>(
		&'a self,
		refresh_token: &'a str,
		scope: Option<&'a str>,
	) -> StrategyFuture<'a, RefreshExchange>;

	/// Fetches the provider profile with a bearer token.
	fn fetch_profile<'a>(
		&'a self,
		access_token: &'a str,
		id_token: Option<&'a str>,
	) -> StrategyFuture<'a, Value>;
}

/// [`OAuthStrategy`] implementation shared by every provider family.
pub struct OAuth2Strategy<C>
where
	C: ?Sized + OAuthHttpClient,
{
	config: ProviderConfig,
	http_client: Arc<C>,
}
impl<C> OAuth2Strategy<C>
where
	C: ?Sized + OAuthHttpClient,
{
	/// Creates an adapter over `config` that dispatches through `http_client`.
	pub fn with_http_client(config: ProviderConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self { config, http_client: http_client.into() }
	}

	/// Returns the configuration the adapter was built from.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let handle = self.http_client.handle();

		handle.call(request).await.map_err(TransportError::network)
	}

	async fn token_grant(
		&self,
		grant: GrantType,
		fields: &[(&str, &str)],
	) -> Result<token::TokenGrant, TokenEndpointError> {
		let request = token::build_token_request(&self.config, grant, fields)?;
		let response = self.dispatch(request).await?;

		token::parse_token_response(&response)
	}

	async fn request_profile(&self, url: &Url, access_token: &str) -> Result<Value> {
		let request = Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(AUTHORIZATION, format!("Bearer {access_token}"))
			.header(ACCEPT, "application/json")
			.header(USER_AGENT, USER_AGENT_VALUE)
			.body(Vec::new())
			.map_err(|err| ProfileFetchError::Transport(err.into()))?;
		let response = self.dispatch(request).await.map_err(ProfileFetchError::Transport)?;
		let status = response.status();

		if !status.is_success() {
			return Err(ProfileFetchError::Status {
				status: status.as_u16(),
				body_preview: token::body_preview(response.body()),
			}
			.into());
		}

		match serde_json::from_slice::<Value>(response.body()).map_err(ProfileFetchError::Parse)? {
			profile @ Value::Object(_) => Ok(profile),
			_ => Err(ProfileFetchError::NotAnObject.into()),
		}
	}
}
#[cfg(feature = "reqwest")]
impl OAuth2Strategy<ReqwestHttpClient> {
	/// Creates an adapter backed by the default reqwest transport.
	pub fn new(config: ProviderConfig) -> Result<Self> {
		Ok(Self::with_http_client(config, ReqwestHttpClient::new()?))
	}
}
impl<C> OAuthStrategy for OAuth2Strategy<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn default_scope(&self) -> Option<&str> {
		self.config.scope.as_deref()
	}

	fn build_authorization_request(&self, params: &AuthorizationParams) -> RedirectInfo {
		let mut url = self.config.authorization_url.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("redirect_uri", self.config.callback_url.as_str());
		pairs.append_pair("client_id", &self.config.client_id);

		if let Some(scope) = params.scope.as_deref().or(self.default_scope()) {
			pairs.append_pair("scope", scope);
		}
		for (key, value) in FIXED_AUTHORIZATION_PARAMS {
			pairs.append_pair(key, value);
		}

		pairs.append_pair("state", &params.state);

		for (key, value) in &params.extra {
			if !RESERVED_AUTHORIZATION_PARAMS.contains(&key.as_str()) {
				pairs.append_pair(key, value);
			}
		}

		drop(pairs);

		RedirectInfo::new(url)
	}

	fn exchange_code_for_token<'a>(&'a self, code: &'a str) -> StrategyFuture<'a, CodeExchange> {
		Box::pin(async move {
			let grant = self
				.token_grant(
					GrantType::AuthorizationCode,
					&[("code", code), ("redirect_uri", self.config.callback_url.as_str())],
				)
				.await
				.map_err(Error::Exchange)?;
			let raw_profile = self
				.fetch_profile(grant.access_token.expose(), grant.params.id_token.as_deref())
				.await?;

			Ok(CodeExchange {
				access_token: grant.access_token,
				refresh_token: grant.refresh_token,
				params: grant.params,
				raw_profile,
			})
		})
	}

	fn exchange_refresh_token<'a>(
		&'a self,
		refresh_token: &'a str,
		scope: Option<&'a str>,
	) -> StrategyFuture<'a, RefreshExchange> {
		Box::pin(async move {
			if refresh_token.is_empty() {
				return Err(Error::Refresh(TokenEndpointError::MissingRefreshToken));
			}

			let mut fields = vec![("refresh_token", refresh_token)];

			if let Some(scope) = scope.filter(|scope| !scope.is_empty()) {
				fields.push(("scope", scope));
			}

			let grant = self
				.token_grant(GrantType::RefreshToken, &fields)
				.await
				.map_err(Error::Refresh)?;

			Ok(RefreshExchange {
				access_token: grant.access_token,
				params: grant.params,
				rotated_refresh_token: grant.refresh_token,
			})
		})
	}

	fn fetch_profile<'a>(
		&'a self,
		access_token: &'a str,
		id_token: Option<&'a str>,
	) -> StrategyFuture<'a, Value> {
		Box::pin(async move {
			match self.config.profile_url.as_ref() {
				Some(url) => self.request_profile(url, access_token).await,
				None => {
					let claims = id_token
						.map(identity::decode_claims)
						.transpose()
						.map_err(ProfileFetchError::from)?
						.unwrap_or_else(Map::new);

					Ok(Value::Object(claims))
				},
			}
		})
	}
}
impl<C> Debug for OAuth2Strategy<C>
where
	C: ?Sized + OAuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Strategy").field("config", &self.config).finish()
	}
}
