//! Session-token issuance collaborator.

// self
use crate::{
	_prelude::*,
	auth::{BackstageIdentity, TokenSecret},
};

/// Boxed future returned by [`IdentityIssuer::issue_token`].
pub type IssuerFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret>> + 'a + Send>>;

/// Mints internal session tokens from resolved identities.
///
/// The host owns the implementation (signing keys, claims, lifetimes). Handlers keep a shared
/// reference so the host can mint a token right after `handler` or `refresh` resolves an
/// identity. Failures should be reported through [`Error::token_issuance`].
pub trait IdentityIssuer: Send + Sync {
	/// Issues a session token for `identity`.
	fn issue_token<'a>(&'a self, identity: &'a BackstageIdentity) -> IssuerFuture<'a>;
}
