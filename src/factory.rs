//! Provider factory.
//!
//! Turns the global and per-provider configuration documents into a wired [`OAuthHandlers`]
//! instance. Every check runs here, once, at startup: a provider whose configuration is
//! incomplete never produces handlers. The factory registers nothing; hosts keep their own map
//! from provider id to handlers.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenSecret},
	error::ConfigError,
	handlers::OAuthHandlers,
	http::OAuthHttpClient,
	identity::IdentityIssuer,
	oauth::OAuth2Strategy,
	provider::{ClientAuthMethod, ProviderConfig, ProviderPreset, config::parse_url},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Settings shared by every provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
	/// Public base URL of the auth backend, e.g. `https://app.example.com/api/auth`.
	#[serde(default)]
	pub base_url: Option<String>,
}
impl GlobalConfig {
	/// Creates a configuration with the given base URL.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self { base_url: Some(base_url.into()) }
	}

	/// Loads the configuration from a JSON value.
	pub fn from_json(value: Value) -> Result<Self, ConfigError> {
		from_value(value)
	}

	/// Loads the configuration from JSON text.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		from_str(raw)
	}
}

/// Per-provider settings.
///
/// `authorizationUrl` and `tokenUrl` are required unless a non-generic `preset` supplies them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEnvConfig {
	/// Provider family whose endpoints seed the configuration.
	#[serde(default)]
	pub preset: ProviderPreset,
	/// OAuth 2.0 client identifier.
	#[serde(default)]
	pub client_id: Option<String>,
	/// OAuth 2.0 client secret.
	#[serde(default)]
	pub client_secret: Option<TokenSecret>,
	/// Authorization endpoint.
	#[serde(default)]
	pub authorization_url: Option<String>,
	/// Token endpoint.
	#[serde(default)]
	pub token_url: Option<String>,
	/// User-info endpoint.
	#[serde(default)]
	pub profile_url: Option<String>,
	/// Default scope.
	#[serde(default)]
	pub scope: Option<String>,
	/// Client authentication method; `client_secret_post` when absent.
	#[serde(default)]
	pub client_auth_method: Option<ClientAuthMethod>,
}
impl ProviderEnvConfig {
	/// Loads the configuration from a JSON value.
	pub fn from_json(value: Value) -> Result<Self, ConfigError> {
		from_value(value)
	}

	/// Loads the configuration from JSON text.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		from_str(raw)
	}
}

/// Validates the configuration and derives the provider's [`ProviderConfig`].
///
/// The callback URL is `{baseUrl}/{providerId}/handler/frame`, with any trailing `/` on the base
/// URL removed first. Blank strings count as missing.
pub fn provider_config(
	provider_id: &ProviderId,
	global: &GlobalConfig,
	env: &ProviderEnvConfig,
) -> Result<ProviderConfig, ConfigError> {
	let base_url = required("baseUrl", global.base_url.as_deref())?;
	let client_id = required("clientId", env.client_id.as_deref())?;
	let client_secret =
		required("clientSecret", env.client_secret.as_ref().map(TokenSecret::expose))?;
	let callback_url = parse_url(
		"baseUrl",
		&format!("{}/{provider_id}/handler/frame", base_url.trim_end_matches('/')),
	)?;
	let mut builder = ProviderConfig::builder(client_id, client_secret)
		.preset(env.preset)?
		.callback_url(callback_url);

	if let Some(raw) = present(env.authorization_url.as_deref()) {
		builder = builder.authorization_url(parse_url("authorizationUrl", raw)?);
	}
	if let Some(raw) = present(env.token_url.as_deref()) {
		builder = builder.token_url(parse_url("tokenUrl", raw)?);
	}
	if let Some(raw) = present(env.profile_url.as_deref()) {
		builder = builder.profile_url(parse_url("profileUrl", raw)?);
	}
	if let Some(scope) = present(env.scope.as_deref()) {
		builder = builder.scope(scope);
	}
	if let Some(method) = env.client_auth_method {
		builder = builder.client_auth_method(method);
	}

	builder.build()
}

/// Builds handlers for `provider_id` that dispatch through `http_client`.
pub fn create_provider_with_http_client<C>(
	provider_id: &str,
	global: &GlobalConfig,
	env: &ProviderEnvConfig,
	issuer: Arc<dyn IdentityIssuer>,
	http_client: impl Into<Arc<C>>,
) -> Result<OAuthHandlers>
where
	C: ?Sized + OAuthHttpClient,
{
	let provider_id = ProviderId::new(provider_id).map_err(ConfigError::from)?;
	let config = provider_config(&provider_id, global, env)?;
	let strategy = OAuth2Strategy::<C>::with_http_client(config, http_client);

	Ok(OAuthHandlers::new(provider_id, Arc::new(strategy), issuer))
}

/// Builds handlers for `provider_id` backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub fn create_provider(
	provider_id: &str,
	global: &GlobalConfig,
	env: &ProviderEnvConfig,
	issuer: Arc<dyn IdentityIssuer>,
) -> Result<OAuthHandlers> {
	create_provider_with_http_client::<ReqwestHttpClient>(
		provider_id,
		global,
		env,
		issuer,
		ReqwestHttpClient::new()?,
	)
}

fn present(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
	present(value).ok_or(ConfigError::MissingField { field })
}

fn from_value<T>(value: Value) -> Result<T, ConfigError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|source| ConfigError::Deserialize { source })
}

fn from_str<T>(raw: &str) -> Result<T, ConfigError>
where
	T: DeserializeOwned,
{
	let deserializer = &mut serde_json::Deserializer::from_str(raw);

	serde_path_to_error::deserialize(deserializer)
		.map_err(|source| ConfigError::Deserialize { source })
}
