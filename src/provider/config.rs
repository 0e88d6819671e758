//! Validated provider configuration.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError, provider::ProviderPreset};

/// How client credentials are presented to the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// `client_id`/`client_secret` form fields in the POST body.
	#[default]
	ClientSecretPost,
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
}

/// Immutable configuration of one provider, owned by its strategy adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the provider.
	pub callback_url: Url,
	/// Authorization endpoint.
	pub authorization_url: Url,
	/// Token endpoint.
	pub token_url: Url,
	/// User-info endpoint; without one the id token claims serve as the profile.
	pub profile_url: Option<Url>,
	/// Scope requested when the caller does not supply one.
	pub scope: Option<String>,
	/// Client authentication mode for the token endpoint.
	pub client_auth_method: ClientAuthMethod,
}
impl ProviderConfig {
	/// Creates a builder seeded with the client credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(client_id, client_secret)
	}
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	client_id: String,
	client_secret: TokenSecret,
	callback_url: Option<Url>,
	authorization_url: Option<Url>,
	token_url: Option<Url>,
	profile_url: Option<Url>,
	scope: Option<String>,
	client_auth_method: ClientAuthMethod,
}
impl ProviderConfigBuilder {
	/// Creates a builder with no endpoints configured.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			callback_url: None,
			authorization_url: None,
			token_url: None,
			profile_url: None,
			scope: None,
			client_auth_method: ClientAuthMethod::default(),
		}
	}

	/// Seeds endpoints, default scope, and profile URL from a provider family.
	///
	/// Values set explicitly afterwards take precedence.
	pub fn preset(mut self, preset: ProviderPreset) -> Result<Self, ConfigError> {
		if let Some(endpoints) = preset.endpoints() {
			self.authorization_url = Some(parse_url("authorizationUrl", endpoints.authorization)?);
			self.token_url = Some(parse_url("tokenUrl", endpoints.token)?);
			self.profile_url = Some(parse_url("profileUrl", endpoints.profile)?);
			self.scope = Some(endpoints.scope.to_owned());
		}

		Ok(self)
	}

	/// Sets the redirect URI.
	pub fn callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_url(mut self, url: Url) -> Self {
		self.authorization_url = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.token_url = Some(url);

		self
	}

	/// Sets the user-info endpoint.
	pub fn profile_url(mut self, url: Url) -> Self {
		self.profile_url = Some(url);

		self
	}

	/// Sets the default scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "clientId" });
		}
		if self.client_secret.expose().trim().is_empty() {
			return Err(ConfigError::MissingField { field: "clientSecret" });
		}

		let callback_url =
			self.callback_url.ok_or(ConfigError::MissingField { field: "callbackUrl" })?;
		let authorization_url = self
			.authorization_url
			.ok_or(ConfigError::MissingField { field: "authorizationUrl" })?;
		let token_url = self.token_url.ok_or(ConfigError::MissingField { field: "tokenUrl" })?;

		validate_scheme("callbackUrl", &callback_url)?;
		validate_scheme("authorizationUrl", &authorization_url)?;
		validate_scheme("tokenUrl", &token_url)?;

		if let Some(profile_url) = self.profile_url.as_ref() {
			validate_scheme("profileUrl", profile_url)?;
		}

		Ok(ProviderConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			callback_url,
			authorization_url,
			token_url,
			profile_url: self.profile_url,
			scope: self.scope.filter(|scope| !scope.trim().is_empty()),
			client_auth_method: self.client_auth_method,
		})
	}
}

/// Parses a configured URL, tagging failures with the configuration key.
pub(crate) fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn validate_scheme(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ConfigError::UnsupportedScheme { field, url: url.to_string() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	fn complete() -> ProviderConfigBuilder {
		ProviderConfig::builder("c1", "s1")
			.callback_url(url("https://app.example.com/api/auth/idp/handler/frame"))
			.authorization_url(url("https://idp.example.com/auth"))
			.token_url(url("https://idp.example.com/token"))
	}

	#[test]
	fn builds_with_required_fields() {
		let config = complete().scope("  ").build().expect("Config should build.");

		assert_eq!(config.client_id, "c1");
		assert_eq!(config.client_secret.expose(), "s1");
		assert_eq!(config.profile_url, None);
		assert_eq!(config.scope, None);
		assert_eq!(config.client_auth_method, ClientAuthMethod::ClientSecretPost);
		assert!(!format!("{config:?}").contains("s1\""));
	}

	#[test]
	fn missing_fields_fail_fast() {
		let err = ProviderConfig::builder("c1", "s1")
			.callback_url(url("https://app.example.com/cb"))
			.token_url(url("https://idp.example.com/token"))
			.build()
			.expect_err("Missing authorization URL must fail.");

		assert!(matches!(err, ConfigError::MissingField { field: "authorizationUrl" }));

		let err = ProviderConfig::builder(" ", "s1").build().expect_err("Blank id must fail.");

		assert!(matches!(err, ConfigError::MissingField { field: "clientId" }));

		let err = ProviderConfig::builder("c1", "").build().expect_err("Blank secret must fail.");

		assert!(matches!(err, ConfigError::MissingField { field: "clientSecret" }));
	}

	#[test]
	fn non_http_schemes_are_rejected() {
		let err = complete()
			.profile_url(url("ftp://idp.example.com/me"))
			.build()
			.expect_err("FTP profile URL must fail.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { field: "profileUrl", .. }));
	}

	#[test]
	fn presets_seed_endpoints_and_allow_overrides() {
		let config = ProviderConfig::builder("c1", "s1")
			.preset(ProviderPreset::Google)
			.expect("Google preset should parse.")
			.callback_url(url("https://app.example.com/cb"))
			.scope("email")
			.build()
			.expect("Config should build.");

		assert_eq!(config.authorization_url.host_str(), Some("accounts.google.com"));
		assert_eq!(config.token_url.host_str(), Some("oauth2.googleapis.com"));
		assert!(config.profile_url.is_some());
		assert_eq!(config.scope.as_deref(), Some("email"));

		let generic = complete()
			.preset(ProviderPreset::Generic)
			.expect("Generic preset is a no-op.")
			.build()
			.expect("Config should build.");

		assert_eq!(generic.authorization_url.as_str(), "https://idp.example.com/auth");
	}
}
