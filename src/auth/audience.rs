//! Audience labels scoping which service a token may be presented to.

// std
use std::{borrow::Borrow, collections::BTreeSet, ops::Deref};
// self
use crate::_prelude::*;

/// Audience value the token gate expects unless configured otherwise.
pub const DEFAULT_AUDIENCE: &str = "factors";

const AUDIENCE_MAX_LEN: usize = 253;

/// Error returned when audience validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum AudienceError {
	/// The audience was empty.
	#[error("Audience cannot be empty.")]
	Empty,
	/// The audience contains whitespace characters.
	#[error("Audience contains whitespace: {audience}.")]
	ContainsWhitespace {
		/// The offending audience string.
		audience: String,
	},
	/// The audience exceeded the allowed character count.
	#[error("Audience exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Validated audience label.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Audience(String);
impl Audience {
	/// Creates a new audience after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, AudienceError> {
		let view = value.as_ref();

		validate(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Default for Audience {
	fn default() -> Self {
		Self(DEFAULT_AUDIENCE.to_owned())
	}
}
impl Deref for Audience {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for Audience {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for Audience {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<Audience> for String {
	fn from(value: Audience) -> Self {
		value.0
	}
}
impl TryFrom<String> for Audience {
	type Error = AudienceError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for Audience {
	type Err = AudienceError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for Audience {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Audience({})", self.0)
	}
}
impl Display for Audience {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Set of audiences an authority reports a token as valid for.
///
/// Authorities may hand back arbitrary strings, so entries are kept verbatim (deduplicated
/// and sorted) instead of being forced through [`Audience`] validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudienceSet(BTreeSet<String>);
impl AudienceSet {
	/// Builds a set from any iterator of strings.
	pub fn new<I, S>(audiences: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(audiences.into_iter().map(Into::into).collect())
	}

	/// Returns true if the set names the provided audience.
	pub fn contains(&self, audience: &Audience) -> bool {
		self.0.contains(audience.as_ref())
	}

	/// Number of distinct audiences.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no audiences were reported.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over the reported audiences in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}
impl<S> FromIterator<S> for AudienceSet
where
	S: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self::new(iter)
	}
}

fn validate(view: &str) -> Result<(), AudienceError> {
	if view.is_empty() {
		return Err(AudienceError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(AudienceError::ContainsWhitespace { audience: view.to_owned() });
	}
	if view.len() > AUDIENCE_MAX_LEN {
		return Err(AudienceError::TooLong { max: AUDIENCE_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn audiences_validate() {
		assert!(Audience::new("").is_err());
		assert!(Audience::new(" factors").is_err());
		assert!(Audience::new("a".repeat(AUDIENCE_MAX_LEN + 1)).is_err());

		let audience = Audience::new("factors").expect("Audience fixture should be valid.");

		assert_eq!(audience, Audience::default());
		assert_eq!(audience.as_ref(), "factors");
	}

	#[test]
	fn serde_enforces_validation() {
		let audience: Audience =
			serde_json::from_str("\"factors\"").expect("Audience should deserialize.");

		assert_eq!(audience.to_string(), "factors");
		assert!(serde_json::from_str::<Audience>("\"with space\"").is_err());
	}

	#[test]
	fn audience_set_matches_exactly() {
		let expected = Audience::default();
		let set = AudienceSet::new(["https://kubernetes.default.svc", "factors", "factors"]);

		assert_eq!(set.len(), 2);
		assert!(set.contains(&expected));
		assert!(!AudienceSet::new(["factors-v2", "Factors"]).contains(&expected));
		assert!(!AudienceSet::default().contains(&expected));
	}
}
