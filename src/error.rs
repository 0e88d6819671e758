//! Error taxonomy shared by the strategy adapter, identity resolver, handlers, and factory.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error surfaced by every public operation.
///
/// Each variant is a distinct failure kind; hosts translate them into user-visible responses.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Provider configuration is missing or invalid; the provider must not come online.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller-supplied authorization options are malformed.
	#[error("Authorization options are invalid: {reason}.")]
	InvalidOptions {
		/// Human-readable reason.
		reason: String,
	},
	/// The redirect-back request carried no usable authorization code.
	#[error("Authorization callback is invalid: {reason}.")]
	Callback {
		/// Human-readable reason.
		reason: String,
	},
	/// Authorization code exchange failed at the token endpoint.
	#[error("Authorization code exchange failed.")]
	Exchange(#[source] TokenEndpointError),
	/// Refresh token grant failed at the token endpoint.
	#[error("Refresh token grant failed.")]
	Refresh(#[source] TokenEndpointError),
	/// Profile endpoint call failed.
	#[error(transparent)]
	ProfileFetch(#[from] ProfileFetchError),
	/// The resolved profile cannot be mapped onto an internal identity.
	#[error("Identity could not be resolved: {reason}.")]
	IdentityResolution {
		/// Human-readable reason.
		reason: String,
	},
	/// The identity issuer failed to mint a session token.
	#[error("Session token could not be issued.")]
	TokenIssuance {
		/// Issuer-specific failure.
		#[source]
		source: BoxError,
	},
	/// The caller cancelled the transaction or its deadline elapsed.
	#[error("Operation was cancelled before completion.")]
	Cancelled,
}
impl Error {
	/// Wraps an issuer failure inside [`Error::TokenIssuance`].
	pub fn token_issuance(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::TokenIssuance { source: Box::new(src) }
	}

	/// Returns true when the caller must force a fresh login instead of retrying.
	pub fn requires_reauthentication(&self) -> bool {
		matches!(self, Self::Refresh(err) if err.is_rejection())
	}
}

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required configuration field is absent or blank.
	#[error("Missing required configuration field `{field}`.")]
	MissingField {
		/// Configuration key.
		field: &'static str,
	},
	/// A configured URL cannot be parsed.
	#[error("Configuration field `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Configuration key.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than HTTP(S).
	#[error("Configuration field `{field}` must use http or https: {url}.")]
	UnsupportedScheme {
		/// Configuration key.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Provider identifier failed validation.
	#[error(transparent)]
	InvalidProviderId(#[from] crate::auth::IdentifierError),
	/// Configuration document could not be deserialized.
	#[error("Configuration document is malformed.")]
	Deserialize {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint failures shared by the code-exchange and refresh grants.
#[derive(Debug, ThisError)]
pub enum TokenEndpointError {
	/// Provider rejected the grant (bad/expired code, revoked refresh token, bad client) with a
	/// 400/401/403 status or an OAuth `error` body.
	#[error("Token endpoint rejected the grant with HTTP {status}: {}.", rejection_reason(.description, .error))]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// OAuth `error` code, when supplied.
		error: Option<String>,
		/// OAuth `error_description`, when supplied.
		description: Option<String>,
	},
	/// Provider is temporarily unable to serve the request.
	#[error("Token endpoint is unavailable (HTTP {status}).")]
	Unavailable {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// Provider answered with a status that neither grants nor rejects (redirects, 404, ...).
	#[error("Token endpoint returned unexpected HTTP {status}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint responded with JSON that does not match the token schema.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// Token payload lacks `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// No refresh token was supplied to the refresh grant.
	#[error("Refresh token is empty.")]
	MissingRefreshToken,
}
impl TokenEndpointError {
	/// Returns true when the provider refused the credential outright.
	pub fn is_rejection(&self) -> bool {
		matches!(self, Self::Rejected { .. } | Self::MissingRefreshToken)
	}
}

fn rejection_reason<'a>(description: &'a Option<String>, error: &'a Option<String>) -> &'a str {
	description.as_deref().or(error.as_deref()).unwrap_or("no reason given")
}

/// Profile endpoint failures.
#[derive(Debug, ThisError)]
pub enum ProfileFetchError {
	/// Profile endpoint answered with a non-2xx status.
	#[error("Profile endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// Profile body is not valid JSON.
	#[error("Profile endpoint returned malformed JSON.")]
	Parse(#[source] serde_json::Error),
	/// Profile body is JSON but not an object.
	#[error("Profile endpoint returned a non-object JSON document.")]
	NotAnObject,
	/// The id token used as a profile source cannot be decoded.
	#[error(transparent)]
	IdToken(#[from] crate::identity::IdTokenError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Outbound request could not be assembled.
	#[error("Outbound request could not be built.")]
	Request(#[from] oauth2::http::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_rejected_refreshes_force_reauthentication() {
		let rejected = Error::Refresh(TokenEndpointError::Rejected {
			status: 400,
			error: Some("invalid_grant".into()),
			description: None,
		});
		let unavailable = Error::Refresh(TokenEndpointError::Unavailable {
			status: 503,
			body_preview: String::new(),
		});
		let redirected = Error::Refresh(TokenEndpointError::UnexpectedStatus {
			status: 302,
			body_preview: String::new(),
		});
		let exchange = Error::Exchange(TokenEndpointError::Rejected {
			status: 400,
			error: None,
			description: None,
		});

		assert!(rejected.requires_reauthentication());
		assert!(
			Error::Refresh(TokenEndpointError::MissingRefreshToken).requires_reauthentication()
		);
		assert!(!unavailable.requires_reauthentication());
		assert!(!redirected.requires_reauthentication());
		assert!(!exchange.requires_reauthentication());
		assert!(!Error::Cancelled.requires_reauthentication());
	}

	#[test]
	fn rejection_message_prefers_description() {
		let err = TokenEndpointError::Rejected {
			status: 400,
			error: Some("invalid_grant".into()),
			description: Some("code already used".into()),
		};

		assert_eq!(
			err.to_string(),
			"Token endpoint rejected the grant with HTTP 400: code already used."
		);

		let bare = TokenEndpointError::Rejected { status: 401, error: None, description: None };

		assert_eq!(
			bare.to_string(),
			"Token endpoint rejected the grant with HTTP 401: no reason given."
		);
	}
}
