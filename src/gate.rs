//! Token gate: every request proves its identity before reaching the engine.
//!
//! [`TokenGate::authenticate`] submits the bearer token to a [`TokenReviewer`] and admits
//! the request only when the authority reports the token as authenticated **and** scoped
//! to the configured audience. There is deliberately no verdict cache: every request is
//! re-reviewed so a revoked token stops working immediately. Each review runs under the
//! configured deadline; dropping the returned future cancels the in-flight call.

mod metrics;

pub use metrics::*;

// self
use crate::{
	_prelude::*,
	auth::AuthToken,
	config::GateConfig,
	error::{AuthError, TransportError},
	obs::{Stage, StageRun},
	review::TokenReviewer,
};

/// Extracts a credential from a raw header value.
///
/// Missing, empty, or whitespace-only values yield [`AuthError::MissingCredential`], so
/// callers can reject the request before any authority call is made.
pub fn credential_from_header(raw: Option<&str>) -> Result<AuthToken, AuthError> {
	raw.and_then(AuthToken::from_header).ok_or(AuthError::MissingCredential)
}

/// Authenticates requests against a token review authority.
pub struct TokenGate<R>
where
	R: ?Sized + TokenReviewer,
{
	/// Authority every token is submitted to.
	pub reviewer: Arc<R>,
	/// Expected audience and review deadline.
	pub config: GateConfig,
	/// Shared counters for gate decisions.
	pub metrics: Arc<GateMetrics>,
}
impl<R> TokenGate<R>
where
	R: ?Sized + TokenReviewer,
{
	/// Creates a gate that consults `reviewer` for every request.
	pub fn new(reviewer: impl Into<Arc<R>>, config: GateConfig) -> Self {
		Self { reviewer: reviewer.into(), config, metrics: Default::default() }
	}

	/// Admits the request carrying `token`, or explains why it cannot proceed.
	///
	/// # Errors
	///
	/// - [`AuthError::MissingCredential`] for an empty token; the authority is not called.
	/// - [`AuthError::Forbidden`] when the token does not authenticate or lacks the audience.
	/// - [`AuthError::AuthorityUnavailable`] when the review fails or exceeds its deadline.
	pub async fn authenticate(&self, token: &AuthToken) -> Result<(), AuthError> {
		self.metrics.record_attempt();

		let result = StageRun::start(Stage::Authenticate)
			.with_token(token)
			.run(self.review(token))
			.await;

		match &result {
			Ok(()) => self.metrics.record_accepted(),
			Err(AuthError::MissingCredential) => self.metrics.record_missing(),
			Err(AuthError::Forbidden) => self.metrics.record_forbidden(),
			Err(AuthError::AuthorityUnavailable(_)) => self.metrics.record_unavailable(),
		}

		result
	}

	async fn review(&self, token: &AuthToken) -> Result<(), AuthError> {
		if token.is_empty() {
			return Err(AuthError::MissingCredential);
		}

		let deadline = self.config.review_timeout;
		let review = tokio::time::timeout(deadline, self.reviewer.review(token))
			.await
			.map_err(|_| TransportError::Timeout {
				target: "token review authority",
				after: deadline,
			})
			.and_then(|inner| inner)
			.inspect_err(|_e| {
				#[cfg(feature = "tracing")]
				tracing::error!(error = %_e, "Token review failed.");
			})?;

		if review.admits(&self.config.audience) {
			#[cfg(feature = "tracing")]
			tracing::debug!(
				username = review.username.as_deref().unwrap_or("<unknown>"),
				"Token accepted."
			);

			return Ok(());
		}

		#[cfg(feature = "tracing")]
		tracing::info!(
			authenticated = review.authenticated,
			audience_matched = review.audiences.contains(&self.config.audience),
			authority_error = review.error.as_deref().unwrap_or(""),
			"Token rejected."
		);

		Err(AuthError::Forbidden)
	}
}
impl<R> Clone for TokenGate<R>
where
	R: ?Sized + TokenReviewer,
{
	fn clone(&self) -> Self {
		Self {
			reviewer: self.reviewer.clone(),
			config: self.config.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<R> Debug for TokenGate<R>
where
	R: ?Sized + TokenReviewer,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGate").field("config", &self.config).finish()
	}
}
