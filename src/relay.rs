//! Caller-side forwarder that attaches a service token and relays factor requests.
//!
//! The relay re-reads its projected service-account token on every call because the
//! kubelet rotates it in place. Downstream `200` bodies pass through, `403` stays a `403`,
//! and everything else becomes a server error.

// std
use std::path::PathBuf;
// crates.io
use reqwest::{StatusCode, redirect::Policy};
// self
use crate::{
	_prelude::*,
	api::{FactorRequest, FactorResponse},
	auth::{AUTH_TOKEN_HEADER, AuthToken},
	error::{ConfigError, RelayError, TransportError},
	obs::{Stage, StageRun},
};

const TARGET: &str = "downstream compute endpoint";

/// Where the relay gets the token it presents downstream.
#[derive(Clone, Debug)]
pub enum TokenSource {
	/// File re-read on every request.
	File(PathBuf),
	/// Fixed token.
	Static(AuthToken),
}
impl TokenSource {
	/// Loads the current token.
	pub async fn load(&self) -> Result<AuthToken, RelayError> {
		match self {
			Self::Static(token) => Ok(token.clone()),
			Self::File(path) => {
				let raw = tokio::fs::read_to_string(path).await.map_err(|source| {
					RelayError::TokenSource { path: path.display().to_string(), source }
				})?;

				AuthToken::from_header(&raw)
					.ok_or_else(|| RelayError::EmptyToken { path: path.display().to_string() })
			},
		}
	}
}

/// Forwards factor requests to the downstream compute endpoint.
#[derive(Clone, Debug)]
pub struct Relay {
	client: ReqwestClient,
	downstream: Url,
	token_source: TokenSource,
}
impl Relay {
	/// Default deadline for one downstream round trip.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

	/// Builds a relay with its own reqwest client.
	pub fn new(downstream: Url, token_source: TokenSource) -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(Policy::none()).timeout(Self::DEFAULT_TIMEOUT).build()?;

		Ok(Self::with_client(client, downstream, token_source))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, downstream: Url, token_source: TokenSource) -> Self {
		Self { client, downstream, token_source }
	}

	/// Downstream endpoint requests are forwarded to.
	pub fn downstream(&self) -> &Url {
		&self.downstream
	}

	/// Forwards `request` with the service token attached.
	pub async fn forward(&self, request: &FactorRequest) -> Result<FactorResponse, RelayError> {
		let result = StageRun::start(Stage::Relay).run(self.send(request)).await;

		#[cfg(feature = "tracing")]
		if let Err(e) = &result {
			tracing::warn!(downstream = %self.downstream, error = %e, "Relay failed.");
		}

		result
	}

	async fn send(&self, request: &FactorRequest) -> Result<FactorResponse, RelayError> {
		let token = self.token_source.load().await?;
		let response = self
			.client
			.post(self.downstream.clone())
			.header(AUTH_TOKEN_HEADER, token.expose())
			.json(request)
			.send()
			.await
			.map_err(|e| TransportError::network(TARGET, e))?;

		match response.status() {
			StatusCode::OK => {
				let bytes =
					response.bytes().await.map_err(|e| TransportError::network(TARGET, e))?;
				let mut de = serde_json::Deserializer::from_slice(&bytes);

				serde_path_to_error::deserialize(&mut de)
					.map_err(|source| TransportError::Decode { target: TARGET, source }.into())
			},
			StatusCode::FORBIDDEN => Err(RelayError::Rejected),
			status => Err(RelayError::UnexpectedStatus { status: status.as_u16() }),
		}
	}
}
