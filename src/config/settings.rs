//! Environment-driven settings for the bundled binaries.

// std
use std::{net::SocketAddr, path::PathBuf};
// self
use crate::{
	_prelude::*,
	auth::Audience,
	config::{GateConfig, GateConfigBuilder},
	error::ConfigError,
};

const LISTEN: &str = "FACTOR_GATE_LISTEN";
const AUDIENCE: &str = "FACTOR_GATE_AUDIENCE";
const REVIEW_TIMEOUT_MS: &str = "FACTOR_GATE_REVIEW_TIMEOUT_MS";
const DOWNSTREAM: &str = "FACTOR_GATE_DOWNSTREAM";
const TOKEN_PATH: &str = "FACTOR_GATE_TOKEN_PATH";

/// Settings resolved from `FACTOR_GATE_*` environment variables.
#[derive(Clone, Debug)]
pub struct ServerSettings {
	/// Socket address the HTTP server binds.
	pub listen: SocketAddr,
	/// Gate configuration.
	pub gate: GateConfig,
	/// Compute endpoint the relay forwards to.
	pub downstream: Url,
	/// Projected service-account token the relay attaches.
	pub token_path: PathBuf,
}
impl ServerSettings {
	/// Default listen address.
	pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
	/// Default downstream compute endpoint.
	pub const DEFAULT_DOWNSTREAM: &str = "http://factor-server:8080/factor";
	/// Default projected token path.
	pub const DEFAULT_TOKEN_PATH: &str = "/var/run/secrets/tokens/factor-token";

	/// Reads settings from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads settings through `lookup`, falling back to defaults for unset names.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let listen = parse(LISTEN, lookup(LISTEN).unwrap_or_else(|| Self::DEFAULT_LISTEN.into()))?;
		let audience = match lookup(AUDIENCE) {
			Some(raw) => Audience::new(raw)?,
			None => Audience::default(),
		};
		let mut gate = GateConfigBuilder::new(audience);

		if let Some(raw) = lookup(REVIEW_TIMEOUT_MS) {
			gate = gate.review_timeout(Duration::from_millis(parse(REVIEW_TIMEOUT_MS, raw)?));
		}

		let downstream_raw = lookup(DOWNSTREAM).unwrap_or_else(|| Self::DEFAULT_DOWNSTREAM.into());
		let downstream = Url::parse(&downstream_raw)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "downstream", source })?;
		let token_path =
			PathBuf::from(lookup(TOKEN_PATH).unwrap_or_else(|| Self::DEFAULT_TOKEN_PATH.into()));

		Ok(Self { listen, gate: gate.build()?, downstream, token_path })
	}
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
	T: FromStr,
{
	value.parse().map_err(|_| ConfigError::InvalidEnv { name, value })
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> =
			pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |name| map.get(name).cloned()
	}

	#[test]
	fn defaults_apply_when_unset() {
		let settings =
			ServerSettings::from_lookup(lookup_from(&[])).expect("Defaults should resolve.");

		assert_eq!(settings.listen.to_string(), "0.0.0.0:8080");
		assert_eq!(settings.gate, GateConfig::default());
		assert_eq!(settings.downstream.as_str(), "http://factor-server:8080/factor");
		assert_eq!(settings.token_path, PathBuf::from("/var/run/secrets/tokens/factor-token"));
	}

	#[test]
	fn overrides_are_parsed() {
		let settings = ServerSettings::from_lookup(lookup_from(&[
			(LISTEN, "127.0.0.1:9000"),
			(AUDIENCE, "compute"),
			(REVIEW_TIMEOUT_MS, "250"),
		]))
		.expect("Overrides should resolve.");

		assert_eq!(settings.listen.port(), 9000);
		assert_eq!(settings.gate.audience.as_ref(), "compute");
		assert_eq!(settings.gate.review_timeout, Duration::from_millis(250));
	}

	#[test]
	fn invalid_values_are_rejected() {
		let err = ServerSettings::from_lookup(lookup_from(&[(REVIEW_TIMEOUT_MS, "soon")]))
			.expect_err("Non-numeric timeout must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEnv { name: REVIEW_TIMEOUT_MS, .. }));

		let err = ServerSettings::from_lookup(lookup_from(&[(REVIEW_TIMEOUT_MS, "0")]))
			.expect_err("Zero timeout must be rejected.");

		assert!(matches!(err, ConfigError::NonPositiveTimeout));

		let err = ServerSettings::from_lookup(lookup_from(&[(AUDIENCE, "two words")]))
			.expect_err("Audience with whitespace must be rejected.");

		assert!(matches!(err, ConfigError::InvalidAudience(_)));
	}
}
