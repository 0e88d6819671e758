//! `start`: builds the authorization redirect.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::RedirectInfo,
	handlers::OAuthHandlers,
	oauth::AuthorizationParams,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, FlowStage},
};

const STATE_LEN: usize = 32;

/// Caller-supplied login options.
///
/// `access_type` and `prompt` are always forced to `offline` and `consent`; extra parameters with
/// a reserved name are dropped rather than allowed to override the protocol parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartOptions {
	/// Requested scope; the provider default applies when absent.
	pub scope: Option<String>,
	/// Correlation value echoed back on the callback; generated when absent.
	pub state: Option<String>,
	/// Additional authorization query parameters (`login_hint`, `hd`, ...).
	pub extra: BTreeMap<String, String>,
}
impl StartOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Requests `scope` instead of the provider default.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Uses a caller-managed state value.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Adds an extra authorization query parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}

	fn into_params(self) -> Result<AuthorizationParams> {
		if self.scope.as_deref().is_some_and(|scope| scope.trim().is_empty()) {
			return Err(invalid("scope must not be blank"));
		}

		let state = match self.state {
			Some(state) if state.is_empty() => return Err(invalid("state must not be empty")),
			Some(state) => state,
			None => random_string(STATE_LEN),
		};

		for key in self.extra.keys() {
			if key.is_empty() {
				return Err(invalid("parameter names must not be empty"));
			}
			if key.chars().any(char::is_control) {
				return Err(invalid(format!(
					"parameter `{}` contains control characters",
					key.escape_debug()
				)));
			}
		}

		Ok(AuthorizationParams { scope: self.scope, state, extra: self.extra })
	}
}

impl OAuthHandlers {
	/// Builds the redirect that sends the user agent to the authorization server.
	///
	/// Pure URL construction; fails only on malformed `options`.
	pub fn start(&self, options: StartOptions) -> Result<RedirectInfo> {
		const KIND: FlowKind = FlowKind::Start;

		let flow = FlowSpan::new(KIND, self.provider_id());
		let _guard = flow.step(FlowStage::Authorize).entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = options
			.into_params()
			.map(|params| self.strategy().build_authorization_request(&params))
			.inspect_err(|_| obs::record_step_failure(KIND, FlowStage::Authorize));

		obs::record_result(KIND, &result);

		result
	}
}

fn invalid(reason: impl Into<String>) -> Error {
	Error::InvalidOptions { reason: reason.into() }
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn missing_state_is_generated() {
		let params = StartOptions::new().into_params().expect("Options should validate.");

		assert_eq!(params.state.len(), STATE_LEN);
		assert!(params.state.chars().all(|ch| ch.is_ascii_alphanumeric()));

		let other = StartOptions::new().into_params().expect("Options should validate.");

		assert_ne!(params.state, other.state);
	}

	#[test]
	fn caller_state_and_scope_are_kept() {
		let params = StartOptions::new()
			.with_scope("read")
			.with_state("xyz")
			.with_param("login_hint", "alice")
			.into_params()
			.expect("Options should validate.");

		assert_eq!(params.scope.as_deref(), Some("read"));
		assert_eq!(params.state, "xyz");
		assert_eq!(params.extra.get("login_hint").map(String::as_str), Some("alice"));
	}

	#[test]
	fn malformed_options_are_rejected() {
		for options in [
			StartOptions::new().with_state(""),
			StartOptions::new().with_scope("  "),
			StartOptions::new().with_param("", "x"),
			StartOptions::new().with_param("bad\nkey", "x"),
		] {
			let err = options.into_params().expect_err("Malformed options must fail.");

			assert!(matches!(err, Error::InvalidOptions { .. }));
		}
	}
}
