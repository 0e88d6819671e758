//! Normalization of provider-shaped profiles.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, identity::id_token};

/// Normalized, still provider-derived, profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
	/// Primary email address. Identity resolution depends on it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Human-readable name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	/// Avatar URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub picture: Option<String>,
}
impl ProfileInfo {
	fn is_complete(&self) -> bool {
		self.email.is_some() && self.display_name.is_some() && self.picture.is_some()
	}
}

/// Extracts [`ProfileInfo`] from a raw profile, back-filling gaps from id token claims.
///
/// Recognized shapes (first match wins, keys are case-sensitive, only non-empty strings count):
///
/// - email: `email`, `emails[0].value`
/// - display name: `displayName`, `name`
/// - picture: `picture`, `avatar_url`, `avatarUrl`, `photos[0].value`
///
/// The id token is only decoded when a field is still missing. A token that cannot be decoded is
/// an error only while `email` is missing, since no identity can be resolved without it.
pub fn make_profile_info(raw: &Value, id_token: Option<&str>) -> Result<ProfileInfo> {
	let mut profile = ProfileInfo {
		email: string_field(raw, "email").or_else(|| first_list_value(raw, "emails")),
		display_name: string_field(raw, "displayName").or_else(|| string_field(raw, "name")),
		picture: string_field(raw, "picture")
			.or_else(|| string_field(raw, "avatar_url"))
			.or_else(|| string_field(raw, "avatarUrl"))
			.or_else(|| first_list_value(raw, "photos")),
	};

	if profile.is_complete() {
		return Ok(profile);
	}

	let Some(token) = id_token else {
		return Ok(profile);
	};
	let claims = match id_token::decode_claims(token) {
		Ok(claims) => Value::Object(claims),
		Err(err) if profile.email.is_none() =>
			return Err(Error::IdentityResolution {
				reason: format!("failed to read the id token for a missing email: {err}"),
			}),
		Err(_) => Value::Object(Map::new()),
	};

	profile.email = profile.email.or_else(|| string_field(&claims, "email"));
	profile.picture = profile.picture.or_else(|| string_field(&claims, "picture"));
	profile.display_name = profile.display_name.or_else(|| string_field(&claims, "name"));

	Ok(profile)
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
	raw.get(key).and_then(Value::as_str).filter(|value| !value.is_empty()).map(str::to_owned)
}

fn first_list_value(raw: &Value, key: &str) -> Option<String> {
	raw.get(key)
		.and_then(|list| list.get(0))
		.and_then(|entry| entry.get("value"))
		.and_then(Value::as_str)
		.filter(|value| !value.is_empty())
		.map(str::to_owned)
}
