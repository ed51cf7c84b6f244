//! JSON bodies exchanged on the compute endpoint.

// self
use crate::{
	_prelude::*,
	error::{ComputeError, Error},
};

/// Body of `POST /factor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorRequest {
	/// Value whose divisors are requested.
	pub nr: i64,
}
impl FactorRequest {
	/// Parses and validates a request body.
	///
	/// Malformed JSON or a missing `nr` yields [`Error::InvalidBody`]; a value below 1 yields
	/// [`ComputeError::InvalidInput`]. Both surface as 400.
	pub fn from_slice(body: &[u8]) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_slice(body);
		let request: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|e| Error::InvalidBody { reason: e.to_string() })?;

		request.validate()?;

		Ok(request)
	}

	/// Rejects values the engine does not accept.
	pub fn validate(&self) -> Result<(), ComputeError> {
		if self.nr < 1 {
			return Err(ComputeError::InvalidInput { value: self.nr });
		}

		Ok(())
	}
}

/// Success body of `POST /factor`.
///
/// Despite the field name, `factors` holds the complete divisor set, not prime factors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorResponse {
	/// Every positive divisor of the requested value, ascending.
	pub factors: Vec<i64>,
}

/// Body returned with every non-success status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Human-readable message.
	pub error: String,
}
impl ErrorResponse {
	/// Builds a body carrying `message`.
	pub fn new(message: impl Into<String>) -> Self {
		Self { error: message.into() }
	}
}
