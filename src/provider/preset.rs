//! Endpoint defaults for known provider families.

// self
use crate::_prelude::*;

/// Static endpoint set of a provider family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresetEndpoints {
	/// Authorization endpoint.
	pub authorization: &'static str,
	/// Token endpoint.
	pub token: &'static str,
	/// User-info endpoint.
	pub profile: &'static str,
	/// Default scope.
	pub scope: &'static str,
}

/// Provider families sharing the same adapter and handlers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderPreset {
	/// Google accounts (OpenID Connect user-info shape).
	Google,
	/// GitHub OAuth apps (`avatar_url`, nullable `email`).
	#[serde(rename = "github")]
	GitHub,
	/// Any OAuth 2.0 server; every endpoint comes from configuration.
	#[default]
	Generic,
}
impl ProviderPreset {
	/// Returns the family's endpoints, or `None` for [`ProviderPreset::Generic`].
	pub const fn endpoints(self) -> Option<PresetEndpoints> {
		match self {
			ProviderPreset::Google => Some(PresetEndpoints {
				authorization: "https://accounts.google.com/o/oauth2/v2/auth",
				token: "https://oauth2.googleapis.com/token",
				profile: "https://openidconnect.googleapis.com/v1/userinfo",
				scope: "openid email profile",
			}),
			ProviderPreset::GitHub => Some(PresetEndpoints {
				authorization: "https://github.com/login/oauth/authorize",
				token: "https://github.com/login/oauth/access_token",
				profile: "https://api.github.com/user",
				scope: "read:user user:email",
			}),
			ProviderPreset::Generic => None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn presets_deserialize_from_snake_case() {
		let preset: ProviderPreset =
			serde_json::from_str("\"github\"").expect("Preset should deserialize.");

		assert_eq!(preset, ProviderPreset::GitHub);
		assert_eq!(ProviderPreset::default().endpoints(), None);
		assert!(ProviderPreset::Google.endpoints().is_some());
	}
}
