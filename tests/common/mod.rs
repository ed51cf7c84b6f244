//! Fakes shared by integration tests.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// self
use factor_gate::{
	auth::{AuthToken, TokenReview},
	error::TransportError,
	review::{ReviewFuture, TokenReviewer},
};

enum Outcome {
	Review(TokenReview),
	Unavailable,
}

/// Reviewer returning a canned verdict and counting how often it was consulted.
pub struct RecordingReviewer {
	outcome: Outcome,
	calls: AtomicUsize,
}
impl RecordingReviewer {
	/// Authenticates every token for `audiences`.
	pub fn accepting<const N: usize>(audiences: [&str; N]) -> Arc<Self> {
		Self::with(Outcome::Review(TokenReview::authenticated(audiences)))
	}

	/// Refuses every token.
	pub fn rejecting() -> Arc<Self> {
		Self::with(Outcome::Review(TokenReview::rejected().with_error("token is invalid")))
	}

	/// Fails every review as if the authority were down.
	pub fn unavailable() -> Arc<Self> {
		Self::with(Outcome::Unavailable)
	}

	/// Number of reviews requested so far.
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn with(outcome: Outcome) -> Arc<Self> {
		Arc::new(Self { outcome, calls: AtomicUsize::new(0) })
	}
}
impl TokenReviewer for RecordingReviewer {
	fn review<'a>(&'a self, _token: &'a AuthToken) -> ReviewFuture<'a> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let result = match &self.outcome {
			Outcome::Review(review) => Ok(review.clone()),
			Outcome::Unavailable =>
				Err(TransportError::Status { target: "token review authority", status: 503 }),
		};

		Box::pin(async move { result })
	}
}
