//! Token review results reported by an authority.

// self
use crate::{
	_prelude::*,
	auth::{Audience, AudienceSet},
};

/// Verdict an authority returns for a single bearer token.
///
/// Produced once per request and discarded right after the gate decides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReview {
	/// Whether the token authenticates to a known identity.
	pub authenticated: bool,
	/// Audiences the token is valid for.
	pub audiences: AudienceSet,
	/// Identity the token maps to, when the authority discloses it.
	pub username: Option<String>,
	/// Authority-side explanation for a failed review. Only ever logged.
	pub error: Option<String>,
}
impl TokenReview {
	/// Authenticated review valid for the provided audiences.
	pub fn authenticated<I, S>(audiences: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { authenticated: true, audiences: AudienceSet::new(audiences), ..Default::default() }
	}

	/// Review that failed to authenticate the token.
	pub fn rejected() -> Self {
		Self::default()
	}

	/// Attaches the identity reported by the authority.
	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());

		self
	}

	/// Attaches the authority-side error string.
	pub fn with_error(mut self, error: impl Into<String>) -> Self {
		self.error = Some(error.into());

		self
	}

	/// Returns true when the token authenticated and is scoped to `expected`.
	pub fn admits(&self, expected: &Audience) -> bool {
		self.authenticated && self.audiences.contains(expected)
	}
}
