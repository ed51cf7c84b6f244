//! Read-only configuration held for the process lifetime.

pub mod cluster;
#[cfg(feature = "server")] pub mod settings;

pub use cluster::*;
#[cfg(feature = "server")] pub use settings::*;

// self
use crate::{_prelude::*, auth::Audience, error::ConfigError};

/// Gate settings shared by every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateConfig {
	/// Audience a token must be scoped to.
	pub audience: Audience,
	/// Deadline applied to every token review call.
	pub review_timeout: Duration,
}
impl GateConfig {
	/// Default deadline for a single token review.
	pub const DEFAULT_REVIEW_TIMEOUT: Duration = Duration::from_secs(5);

	/// Starts a builder expecting `audience`.
	pub fn builder(audience: Audience) -> GateConfigBuilder {
		GateConfigBuilder::new(audience)
	}
}
impl Default for GateConfig {
	fn default() -> Self {
		Self { audience: Audience::default(), review_timeout: Self::DEFAULT_REVIEW_TIMEOUT }
	}
}

/// Builder for [`GateConfig`] values.
#[derive(Debug)]
pub struct GateConfigBuilder {
	/// Audience a token must be scoped to.
	pub audience: Audience,
	/// Deadline applied to every token review call.
	pub review_timeout: Duration,
}
impl GateConfigBuilder {
	/// Creates a new builder seeded with the provided audience.
	pub fn new(audience: Audience) -> Self {
		Self { audience, review_timeout: GateConfig::DEFAULT_REVIEW_TIMEOUT }
	}

	/// Overrides the review deadline (defaults to five seconds).
	pub fn review_timeout(mut self, timeout: Duration) -> Self {
		self.review_timeout = timeout;

		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<GateConfig, ConfigError> {
		if self.review_timeout.is_zero() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(GateConfig { audience: self.audience, review_timeout: self.review_timeout })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builder_applies_defaults_and_rejects_zero_timeout() {
		let config = GateConfig::builder(Audience::default())
			.build()
			.expect("Default gate config should build.");

		assert_eq!(config, GateConfig::default());
		assert_eq!(config.review_timeout, Duration::from_secs(5));

		let err = GateConfig::builder(Audience::default())
			.review_timeout(Duration::ZERO)
			.build()
			.expect_err("Zero timeout must be rejected.");

		assert!(matches!(err, ConfigError::NonPositiveTimeout));
	}
}
