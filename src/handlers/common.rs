//! Per-request context shared by the handler entry points.

// std
use std::time::Duration;
// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::_prelude::*;

/// Caller-owned context for one transaction.
///
/// Cancelling the token, or letting the timeout elapse, aborts whichever network call is
/// outstanding and fails the transaction with [`Error::Cancelled`].
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
	cancellation: CancellationToken,
	timeout: Option<Duration>,
}
impl RequestContext {
	/// Creates a context with a fresh token and no deadline.
	pub fn new() -> Self {
		Self::default()
	}

	/// Ties the transaction to an existing cancellation token.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = token;

		self
	}

	/// Bounds the whole transaction by `limit`.
	pub fn with_timeout(mut self, limit: Duration) -> Self {
		self.timeout = Some(limit);

		self
	}

	/// Token observed by the transaction.
	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancellation
	}

	/// Configured deadline, if any.
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout
	}

	/// Returns true once the caller has cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancellation.is_cancelled()
	}

	/// Drives `fut` to completion unless the context is cancelled or times out first.
	///
	/// The losing future is dropped, which aborts any in-flight request it owns.
	pub(crate) async fn run<F, T>(&self, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		if self.is_cancelled() {
			return Err(Error::Cancelled);
		}

		let guarded = async {
			tokio::select! {
				biased;
				_ = self.cancellation.cancelled() => Err(Error::Cancelled),
				result = fut => result,
			}
		};

		match self.timeout {
			Some(limit) => tokio::time::timeout(limit, guarded)
				.await
				.unwrap_or_else(|_elapsed| Err(Error::Cancelled)),
			None => guarded.await,
		}
	}
}
