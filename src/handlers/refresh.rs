//! `refresh`: renews a session from a stored refresh token.

// self
use crate::{
	_prelude::*,
	auth::OAuthResponse,
	handlers::{OAuthHandlers, RequestContext},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, FlowStage},
};

impl OAuthHandlers {
	/// Runs the refresh grant, re-fetches the profile, and resolves the identity again.
	///
	/// The response never carries a new refresh token; callers keep the one they passed in, even
	/// when the provider rotates it. A rejected token fails with [`Error::Refresh`] and
	/// [`Error::requires_reauthentication`] returns true for it.
	pub async fn refresh(
		&self,
		ctx: &RequestContext,
		refresh_token: &str,
		scope: Option<&str>,
	) -> Result<OAuthResponse> {
		const KIND: FlowKind = FlowKind::Refresh;

		let flow = FlowSpan::new(KIND, self.provider_id());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = flow
			.instrument(async {
				let strategy = self.strategy();
				let (exchange, raw_profile) = ctx
					.run(async {
						let exchange = flow
							.step(FlowStage::RefreshGrant)
							.instrument(strategy.exchange_refresh_token(refresh_token, scope))
							.await
							.inspect_err(|_| {
								obs::record_step_failure(KIND, FlowStage::RefreshGrant)
							})?;
						let raw_profile = flow
							.step(FlowStage::FetchProfile)
							.instrument(strategy.fetch_profile(
								exchange.access_token.expose(),
								exchange.params.id_token.as_deref(),
							))
							.await
							.inspect_err(|_| {
								obs::record_step_failure(KIND, FlowStage::FetchProfile)
							})?;

						Ok((exchange, raw_profile))
					})
					.await?;

				#[cfg(feature = "tracing")]
				{
					if exchange.rotated_refresh_token.is_some() {
						tracing::debug!("ignoring refresh token rotated in by the provider");
					}
				}

				let _resolve = flow.step(FlowStage::ResolveIdentity).entered();

				self.assemble_response(exchange.access_token, exchange.params, &raw_profile, scope)
					.inspect_err(|_| obs::record_step_failure(KIND, FlowStage::ResolveIdentity))
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
