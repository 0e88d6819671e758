//! Token endpoint wire format: form bodies, client authentication, and response classification.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
	},
};
use serde::{Deserializer, de::Error as DeError};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{TokenEndpointError, TransportError},
	oauth::TokenParams,
	provider::{ClientAuthMethod, ProviderConfig},
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// OAuth 2.0 grants issued against the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
	/// Authorization Code grant (callback path).
	AuthorizationCode,
	/// Refresh Token grant (silent renewal).
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Successful token endpoint payload.
#[derive(Debug)]
pub(crate) struct TokenGrant {
	pub(crate) access_token: TokenSecret,
	pub(crate) refresh_token: Option<TokenSecret>,
	pub(crate) params: TokenParams,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	id_token: Option<String>,
	#[serde(default, deserialize_with = "deserialize_expires_in")]
	expires_in: Option<u64>,
	#[serde(default)]
	scope: Option<String>,
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

/// Builds the POST request for `grant`, applying the configured client authentication.
pub(crate) fn build_token_request(
	config: &ProviderConfig,
	grant: GrantType,
	fields: &[(&str, &str)],
) -> Result<HttpRequest, TransportError> {
	let mut form = form_urlencoded::Serializer::new(String::new());

	form.append_pair("grant_type", grant.as_str());
	form.extend_pairs(fields.iter().copied());

	let mut request = Request::builder()
		.method(Method::POST)
		.uri(config.token_url.as_str())
		.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(ACCEPT, "application/json")
		.header(USER_AGENT, super::USER_AGENT_VALUE);

	match config.client_auth_method {
		ClientAuthMethod::ClientSecretPost => {
			form.append_pair("client_id", &config.client_id);
			form.append_pair("client_secret", config.client_secret.expose());
		},
		ClientAuthMethod::ClientSecretBasic => {
			let credentials = format!(
				"{}:{}",
				form_encode(&config.client_id),
				form_encode(config.client_secret.expose())
			);

			request =
				request.header(AUTHORIZATION, format!("Basic {}", STANDARD.encode(credentials)));
		},
	}

	Ok(request.body(form.finish().into_bytes())?)
}

/// Classifies a token endpoint response.
///
/// 5xx, 408, and 429 are [`TokenEndpointError::Unavailable`]. 400, 401, 403, and any body that
/// carries an OAuth `error` field are [`TokenEndpointError::Rejected`]. Any other non-2xx status
/// (redirects included) is [`TokenEndpointError::UnexpectedStatus`].
pub(crate) fn parse_token_response(
	response: &HttpResponse,
) -> Result<TokenGrant, TokenEndpointError> {
	let status = response.status();
	let code = status.as_u16();

	if !status.is_success() {
		if status.is_server_error() || matches!(code, 408 | 429) {
			return Err(TokenEndpointError::Unavailable {
				status: code,
				body_preview: body_preview(response.body()),
			});
		}

		let body = serde_json::from_slice::<ErrorBody>(response.body()).unwrap_or_default();

		if body.error.is_none() && !matches!(code, 400 | 401 | 403) {
			return Err(TokenEndpointError::UnexpectedStatus {
				status: code,
				body_preview: body_preview(response.body()),
			});
		}

		return Err(TokenEndpointError::Rejected {
			status: code,
			error: body.error,
			description: body.error_description,
		});
	}

	let deserializer = &mut serde_json::Deserializer::from_slice(response.body());
	let body: TokenBody = serde_path_to_error::deserialize(deserializer)
		.map_err(|source| TokenEndpointError::MalformedResponse { source, status: code })?;

	if body.error.is_some() {
		return Err(TokenEndpointError::Rejected {
			status: code,
			error: body.error,
			description: body.error_description,
		});
	}

	let access_token = body
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or(TokenEndpointError::MissingAccessToken)?;

	Ok(TokenGrant {
		access_token: TokenSecret::new(access_token),
		refresh_token: body.refresh_token.filter(|token| !token.is_empty()).map(TokenSecret::new),
		params: TokenParams {
			id_token: body.id_token.filter(|token| !token.is_empty()),
			scope: body.scope,
			expires_in: body.expires_in,
		},
	})
}

/// Returns at most [`BODY_PREVIEW_LIMIT`] characters of a response body.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn form_encode(value: &str) -> String {
	form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(u64),
		Text(String),
	}

	match Option::<Raw>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Raw::Number(secs)) => Ok(Some(secs)),
		Some(Raw::Text(text)) => text.trim().parse().map(Some).map_err(DeError::custom),
	}
}
