//! Unverified id token claim extraction.
//!
//! The token is received directly from the token endpoint over the same connection as the access
//! token, so its claims are read without signature validation. They are only used to fill in
//! profile fields the profile endpoint did not provide.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Failures raised while decoding id token claims.
#[derive(Debug, ThisError)]
pub enum IdTokenError {
	/// The token is not a three-segment compact JWS.
	#[error("Id token is not a compact JWT.")]
	Malformed,
	/// The payload segment is not base64url.
	#[error("Id token payload is not valid base64url.")]
	Encoding(#[source] base64::DecodeError),
	/// The payload is not JSON.
	#[error("Id token payload is not valid JSON.")]
	Json(#[source] serde_json::Error),
	/// The payload is JSON but not an object.
	#[error("Id token payload is not a JSON object.")]
	NotAnObject,
}

/// Decodes the claim set of a compact JWT without verifying its signature.
pub fn decode_claims(id_token: &str) -> Result<Map<String, Value>, IdTokenError> {
	let mut segments = id_token.split('.');
	let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
		(Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
		_ => return Err(IdTokenError::Malformed),
	};
	let bytes =
		URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).map_err(IdTokenError::Encoding)?;

	match serde_json::from_slice::<Value>(&bytes).map_err(IdTokenError::Json)? {
		Value::Object(claims) => Ok(claims),
		_ => Err(IdTokenError::NotAnObject),
	}
}
