//! Gate-level error types shared across the token gate, the divisor engine, and the relay.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller identity could not be established or was rejected.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Divisor computation failed.
	#[error(transparent)]
	Compute(#[from] ComputeError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Forwarding to the downstream compute endpoint failed.
	#[error(transparent)]
	Relay(#[from] RelayError),

	/// Request body is not a well-formed factor request.
	#[error("Request body is invalid: {reason}.")]
	InvalidBody {
		/// Parser-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// HTTP status code a caller should observe for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Auth(e) => e.status_code(),
			Self::Compute(e) => e.status_code(),
			Self::Relay(e) => e.status_code(),
			Self::InvalidBody { .. } => 400,
			Self::Config(_) => 500,
		}
	}
}

/// Outcomes of the token gate that stop a request.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// No bearer token was supplied, or it was empty.
	#[error("Authorization header is not provided.")]
	MissingCredential,
	/// The authority rejected the token or the expected audience is absent.
	///
	/// The message stays generic so callers learn nothing about which check failed.
	#[error("The request could not be authenticated.")]
	Forbidden,
	/// The token review authority could not be reached or answered nonsense.
	#[error("Token review authority is unavailable.")]
	AuthorityUnavailable(
		#[from]
		#[source]
		TransportError,
	),
}
impl AuthError {
	/// HTTP status code a caller should observe for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::MissingCredential => 401,
			Self::Forbidden => 403,
			Self::AuthorityUnavailable(_) => 500,
		}
	}
}

/// Failures raised by the divisor engine.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ComputeError {
	/// Input is not a positive integer.
	#[error(
		"Factors of {value} not computed, please provide a positive integer greater than 0."
	)]
	InvalidInput {
		/// Offending input value.
		value: i64,
	},
	/// A divisor product left the 64-bit range.
	#[error("Divisor product overflows the 64-bit range.")]
	Overflow,
	/// The computation worker stopped before producing a result.
	#[error("Divisor computation was aborted.")]
	Aborted,
}
impl ComputeError {
	/// HTTP status code a caller should observe for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::InvalidInput { .. } => 400,
			Self::Overflow | Self::Aborted => 500,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL cannot be parsed.
	#[error("The {endpoint} endpoint is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Audience label failed validation.
	#[error(transparent)]
	InvalidAudience(#[from] crate::auth::AudienceError),
	/// Review deadline must be strictly positive.
	#[error("The token review timeout must be positive.")]
	NonPositiveTimeout,
	/// A required environment variable is missing.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds an unparsable value.
	#[error("Environment variable `{name}` has an invalid value: {value}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// Cluster credential files could not be read.
	#[error("Cluster credential file `{path}` could not be read.")]
	ClusterCredentials {
		/// File path that failed.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures talking to the token review authority or a downstream endpoint.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {target}.")]
	Network {
		/// Remote being called.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The call did not finish before its deadline.
	#[error("The {target} did not respond within {after:?}.")]
	Timeout {
		/// Remote being called.
		target: &'static str,
		/// Deadline that elapsed.
		after: Duration,
	},
	/// Remote answered with a non-success status.
	#[error("The {target} responded with HTTP {status}.")]
	Status {
		/// Remote being called.
		target: &'static str,
		/// HTTP status code.
		status: u16,
	},
	/// Remote responded with JSON that could not be parsed.
	#[error("The {target} returned malformed JSON.")]
	Decode {
		/// Remote being called.
		target: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		target: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { target, source: Box::new(src) }
	}
}

/// Failures raised while forwarding a request to the downstream compute endpoint.
#[derive(Debug, ThisError)]
pub enum RelayError {
	/// Service token could not be loaded.
	#[error("Service token could not be read from `{path}`.")]
	TokenSource {
		/// Token file path.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Service token file exists but is empty.
	#[error("Service token at `{path}` is empty.")]
	EmptyToken {
		/// Token file path.
		path: String,
	},
	/// Downstream refused the service token.
	#[error("The HTTP request was not authenticated, downstream service responded with 403.")]
	Rejected,
	/// Downstream answered with a status the relay does not pass through.
	#[error("Downstream service responded with HTTP {status}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
	},
	/// Downstream could not be reached or answered malformed JSON.
	#[error(transparent)]
	Downstream(#[from] TransportError),
}
impl RelayError {
	/// HTTP status code a caller should observe for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Rejected => 403,
			_ => 500,
		}
	}
}
