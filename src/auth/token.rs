//! Bearer token wrapper that redacts sensitive material.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Header carrying the caller's bearer token on every compute request.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

const FINGERPRINT_LEN: usize = 12;

/// Caller-supplied bearer credential, scoped to a single request.
///
/// The raw value only leaves the wrapper through [`expose`](Self::expose); formatters
/// redact it and logs should carry the [`fingerprint`](Self::fingerprint) instead.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);
impl AuthToken {
	/// Wraps a raw header value, returning `None` for empty or whitespace-only input.
	pub fn from_header(value: &str) -> Option<Self> {
		let trimmed = value.trim();

		if trimmed.is_empty() { None } else { Some(Self(trimmed.to_owned())) }
	}

	/// Wraps a new token string without validation.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns true when the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Short, stable digest of the token suitable for log correlation.
	///
	/// The value is the first characters of a base64 (no padding) SHA-256 digest, so
	/// distinct tokens can be told apart in logs without revealing either of them.
	pub fn fingerprint(&self) -> String {
		let mut hasher = Sha256::new();

		hasher.update(self.0.as_bytes());

		let mut encoded = STANDARD_NO_PAD.encode(hasher.finalize());

		encoded.truncate(FINGERPRINT_LEN);

		encoded
	}
}
impl AsRef<str> for AuthToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AuthToken").field(&"<redacted>").finish()
	}
}
impl Display for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = AuthToken::new("super-secret");

		assert_eq!(format!("{token:?}"), "AuthToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn header_values_trim_and_reject_blank() {
		assert!(AuthToken::from_header("").is_none());
		assert!(AuthToken::from_header("   ").is_none());

		let token = AuthToken::from_header(" abc.def ").expect("Padded token should be accepted.");

		assert_eq!(token.expose(), "abc.def");
	}

	#[test]
	fn fingerprint_is_stable_and_distinct() {
		let lhs = AuthToken::new("token-a");
		let rhs = AuthToken::new("token-b");

		assert_eq!(lhs.fingerprint(), AuthToken::new("token-a").fingerprint());
		assert_ne!(lhs.fingerprint(), rhs.fingerprint());
		assert_eq!(lhs.fingerprint().len(), FINGERPRINT_LEN);
		assert!(!lhs.fingerprint().contains("token-a"));
	}
}
