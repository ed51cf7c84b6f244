//! Token review authority contract and built-in implementations.
//!
//! The gate's only dependency on an identity provider is [`TokenReviewer`]. The crate
//! ships [`KubeTokenReviewer`], which speaks the Kubernetes `TokenReview` API, and tests
//! plug in fakes that return canned [`TokenReview`] values.

#[cfg(feature = "reqwest")] pub mod kube;

#[cfg(feature = "reqwest")] pub use kube::KubeTokenReviewer;

// self
use crate::{
	_prelude::*,
	auth::{AuthToken, TokenReview},
	error::TransportError,
};

/// Boxed future returned by [`TokenReviewer::review`].
pub type ReviewFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenReview, TransportError>> + 'a + Send>>;

/// Capability that validates a bearer token against a trusted authority.
///
/// Implementations report whether the token authenticates and which audiences it is
/// valid for. They must return [`TransportError`] only when the authority could not give
/// an answer; a token the authority does not recognise is a successful review with
/// `authenticated = false`. Implementations must not cache verdicts.
pub trait TokenReviewer
where
	Self: Send + Sync,
{
	/// Submits `token` for review.
	fn review<'a>(&'a self, token: &'a AuthToken) -> ReviewFuture<'a>;
}
impl<T> TokenReviewer for Arc<T>
where
	T: ?Sized + TokenReviewer,
{
	fn review<'a>(&'a self, token: &'a AuthToken) -> ReviewFuture<'a> {
		T::review(self.as_ref(), token)
	}
}
