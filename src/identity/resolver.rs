//! Profile-to-identity resolution policy.

// self
use crate::{_prelude::*, auth::BackstageIdentity, identity::ProfileInfo};

/// Maps a normalized profile onto an internal identity.
///
/// Implementations must be deterministic and fail closed: a profile that does not carry the
/// data the policy needs produces [`Error::IdentityResolution`], never a synthesized identity.
pub trait IdentityResolver: Send + Sync {
	/// Resolves `profile` into an internal identity.
	fn resolve(&self, profile: &ProfileInfo) -> Result<BackstageIdentity>;
}

/// Uses the local part of the profile email as the identity id.
///
/// A placeholder policy; deployments backed by a user directory should provide their own
/// [`IdentityResolver`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EmailLocalPartResolver;
impl IdentityResolver for EmailLocalPartResolver {
	fn resolve(&self, profile: &ProfileInfo) -> Result<BackstageIdentity> {
		resolve_identity(profile)
	}
}

/// Takes everything before the first `@` of `profile.email` as the identity id.
pub fn resolve_identity(profile: &ProfileInfo) -> Result<BackstageIdentity> {
	let email = profile
		.email
		.as_deref()
		.filter(|email| !email.is_empty())
		.ok_or_else(|| Error::IdentityResolution { reason: "missing email".into() })?;
	let local = email.split_once('@').map_or(email, |(local, _)| local);

	if local.is_empty() {
		return Err(Error::IdentityResolution { reason: "email has no local part".into() });
	}

	Ok(BackstageIdentity { id: local.to_owned() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn profile(email: Option<&str>) -> ProfileInfo {
		ProfileInfo { email: email.map(Into::into), ..Default::default() }
	}

	#[test]
	fn id_is_the_local_part_before_the_first_at() {
		let identity =
			resolve_identity(&profile(Some("alice@example.com"))).expect("Email should resolve.");

		assert_eq!(identity.id, "alice");

		let identity = resolve_identity(&profile(Some("a@b@c"))).expect("Email should resolve.");

		assert_eq!(identity.id, "a");
		assert_eq!(
			EmailLocalPartResolver.resolve(&profile(Some("alice@example.com"))).ok(),
			Some(identity_of("alice"))
		);
	}

	#[test]
	fn missing_or_empty_email_fails_closed() {
		for email in [None, Some(""), Some("@example.com")] {
			let err = resolve_identity(&profile(email)).expect_err("Resolution must fail.");

			assert!(matches!(err, Error::IdentityResolution { .. }), "unexpected error: {err:?}");
		}
	}

	#[test]
	fn email_without_domain_is_used_whole() {
		assert_eq!(resolve_identity(&profile(Some("root"))).ok(), Some(identity_of("root")));
	}

	fn identity_of(id: &str) -> BackstageIdentity {
		BackstageIdentity { id: id.into() }
	}
}
