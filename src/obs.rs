//! Optional observability helpers for the handler entry points.
//!
//! # Feature Flags
//!
//! - `tracing`: each entry point opens an `oauth2_identity.flow` span (`flow`, `provider`), and
//!   each protocol step inside it opens a child `oauth2_identity.step` span (`stage`).
//! - `metrics`: `oauth2_identity_flow_total` counts attempts and terminal outcomes per `flow`;
//!   `oauth2_identity_step_failure_total` counts failures per `flow` and `stage`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Handler entry points observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization redirect construction.
	Start,
	/// Callback handling and code exchange.
	Handler,
	/// Silent session renewal.
	Refresh,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Start => "start",
			FlowKind::Handler => "handler",
			FlowKind::Refresh => "refresh",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Protocol steps an entry point is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Building the authorization redirect.
	Authorize,
	/// Authorization code grant, including the profile request made with the new token.
	ExchangeCode,
	/// Refresh token grant.
	RefreshGrant,
	/// Profile endpoint request.
	FetchProfile,
	/// Profile normalization and identity resolution.
	ResolveIdentity,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Authorize => "authorize",
			FlowStage::ExchangeCode => "exchange_code",
			FlowStage::RefreshGrant => "refresh_grant",
			FlowStage::FetchProfile => "fetch_profile",
			FlowStage::ResolveIdentity => "resolve_identity",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a handler.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
