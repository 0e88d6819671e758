//! `handler`: completes the authorization code transaction.

// self
use crate::{
	_prelude::*,
	auth::{OAuthResponse, PrivateInfo, TokenSecret},
	handlers::{OAuthHandlers, RequestContext},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, FlowStage},
};

/// Query parameters the authorization server appends to the callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Echoed state.
	pub state: Option<String>,
	/// OAuth error code reported instead of a code (e.g. `access_denied`).
	pub error: Option<String>,
	/// Human-readable error detail.
	pub error_description: Option<String>,
	/// State the host issued for this transaction; checked when present.
	pub expected_state: Option<String>,
}
impl CallbackParams {
	/// Wraps a bare authorization code.
	pub fn with_code(code: impl Into<String>) -> Self {
		Self { code: Some(code.into()), ..Default::default() }
	}

	/// Parses a raw query string, with or without its leading `?`.
	pub fn from_query(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);
		let mut params = Self::default();

		for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
			let slot = match &*key {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}

	/// Parses the query of a full callback URL.
	pub fn from_url(url: &Url) -> Self {
		Self::from_query(url.query().unwrap_or_default())
	}

	/// Requires the callback to echo `state`.
	pub fn expect_state(mut self, state: impl Into<String>) -> Self {
		self.expected_state = Some(state.into());

		self
	}

	/// Returns the authorization code once the callback is known to be usable.
	pub fn authorization_code(&self) -> Result<&str> {
		if let Some(error) = self.error.as_deref() {
			let reason = match self.error_description.as_deref() {
				Some(description) => format!("provider returned `{error}`: {description}"),
				None => format!("provider returned `{error}`"),
			};

			return Err(Error::Callback { reason });
		}
		if self
			.expected_state
			.as_deref()
			.is_some_and(|expected| self.state.as_deref() != Some(expected))
		{
			return Err(Error::Callback { reason: "state mismatch".into() });
		}

		self.code
			.as_deref()
			.filter(|code| !code.trim().is_empty())
			.ok_or_else(|| Error::Callback { reason: "missing authorization code".into() })
	}
}

/// Result of a completed callback transaction.
#[derive(Clone, Debug)]
pub struct CallbackOutcome {
	/// Session data safe to forward to the client.
	pub response: OAuthResponse,
	/// Refresh token for session storage; `None` when the provider issued none.
	pub private_info: Option<PrivateInfo>,
}
impl CallbackOutcome {
	/// Refresh token to persist, if any.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.private_info.as_ref().map(|info| &info.refresh_token)
	}
}

impl OAuthHandlers {
	/// Exchanges the callback's code, resolves the identity, and splits off the refresh token.
	///
	/// Exchange, profile fetch, and resolution run strictly in that order. A provider that omits
	/// the refresh token still completes the login; the absence is reported through
	/// [`CallbackOutcome::private_info`].
	pub async fn handler(
		&self,
		ctx: &RequestContext,
		callback: &CallbackParams,
	) -> Result<CallbackOutcome> {
		const KIND: FlowKind = FlowKind::Handler;

		let flow = FlowSpan::new(KIND, self.provider_id());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = flow
			.instrument(async {
				let code = callback.authorization_code()?;
				let exchange = flow
					.step(FlowStage::ExchangeCode)
					.instrument(ctx.run(self.strategy().exchange_code_for_token(code)))
					.await
					.inspect_err(|_| obs::record_step_failure(KIND, FlowStage::ExchangeCode))?;
				let private_info = exchange
					.refresh_token
					.filter(|token| !token.is_empty())
					.map(|refresh_token| PrivateInfo { refresh_token });

				#[cfg(feature = "tracing")]
				{
					if private_info.is_none() {
						tracing::warn!("token endpoint issued no refresh token");
					}
				}

				let _resolve = flow.step(FlowStage::ResolveIdentity).entered();
				let response = self
					.assemble_response(
						exchange.access_token,
						exchange.params,
						&exchange.raw_profile,
						None,
					)
					.inspect_err(|_| obs::record_step_failure(KIND, FlowStage::ResolveIdentity))?;

				Ok(CallbackOutcome { response, private_info })
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
