//! Result types returned by the handlers.
//!
//! [`OAuthResponse`] is safe to forward to the browser. [`PrivateInfo`] is not: it carries the
//! long-lived refresh token and is only meant for the host's session storage.

// self
use crate::{_prelude::*, auth::TokenSecret, identity::ProfileInfo};

/// Redirect target produced by `start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectInfo {
	/// Authorization server URL the user agent must be sent to.
	pub url: Url,
	/// Optional HTTP status override; hosts default to `302 Found` when absent.
	pub status: Option<u16>,
}
impl RedirectInfo {
	/// Creates a redirect without a status override.
	pub fn new(url: Url) -> Self {
		Self { url, status: None }
	}

	/// Returns the `state` value embedded in the redirect URL.
	pub fn state(&self) -> Option<String> {
		self.url.query_pairs().find(|(key, _)| key == "state").map(|(_, value)| value.into_owned())
	}
}

/// Provider-issued credential bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
	/// OIDC id token, when the provider issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
	/// Short-lived bearer token.
	pub access_token: TokenSecret,
	/// Granted scope as reported by the provider (or the requested scope when omitted).
	pub scope: String,
	/// Access token lifetime, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_in_seconds: Option<u64>,
}

/// Internal user identity derived from the profile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackstageIdentity {
	/// Internal user identifier.
	pub id: String,
}

/// Result of a completed `handler` or `refresh` transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthResponse {
	/// Provider credentials.
	pub provider_info: ProviderInfo,
	/// Normalized profile.
	pub profile: ProfileInfo,
	/// Resolved identity; populated only after resolution succeeds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub backstage_identity: Option<BackstageIdentity>,
}

/// Credentials that must never reach the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateInfo {
	/// Long-lived refresh token for later `refresh` calls.
	pub refresh_token: TokenSecret,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn redirect_state_is_read_from_query() {
		let redirect = RedirectInfo::new(
			Url::parse("https://idp.example.com/auth?client_id=c1&state=abc%20def")
				.expect("Redirect fixture should parse."),
		);

		assert_eq!(redirect.state().as_deref(), Some("abc def"));
		assert_eq!(redirect.status, None);
	}

	#[test]
	fn response_serializes_camel_case_and_skips_absent_fields() {
		let response = OAuthResponse {
			provider_info: ProviderInfo {
				id_token: None,
				access_token: TokenSecret::new("T"),
				scope: "email".into(),
				expires_in_seconds: Some(3600),
			},
			profile: ProfileInfo { email: Some("alice@example.com".into()), ..Default::default() },
			backstage_identity: Some(BackstageIdentity { id: "alice".into() }),
		};
		let value = serde_json::to_value(&response).expect("Response should serialize.");

		assert_eq!(
			value,
			serde_json::json!({
				"providerInfo": { "accessToken": "T", "scope": "email", "expiresInSeconds": 3600 },
				"profile": { "email": "alice@example.com" },
				"backstageIdentity": { "id": "alice" }
			})
		);
	}
}
