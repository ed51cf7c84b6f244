//! Kubernetes `TokenReview` client.
//!
//! Each review POSTs an `authentication.k8s.io/v1` `TokenReview` object to the API server,
//! authenticated with the pod's own service-account token, and reads the verdict out of
//! `status`. The API server answers `201 Created` for a completed review whether or not
//! the token authenticated; any other non-success status means the review itself failed.

// crates.io
use reqwest::{Certificate, redirect::Policy};
// self
use crate::{
	_prelude::*,
	auth::{AuthToken, TokenReview},
	config::ClusterCredentials,
	error::{ConfigError, TransportError},
	review::{ReviewFuture, TokenReviewer},
};

const TARGET: &str = "token review authority";
const TOKEN_REVIEW_PATH: &str = "apis/authentication.k8s.io/v1/tokenreviews";
const API_VERSION: &str = "authentication.k8s.io/v1";
const KIND: &str = "TokenReview";

/// [`TokenReviewer`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeTokenReviewer {
	client: ReqwestClient,
	endpoint: Url,
	bearer: AuthToken,
	request_audiences: Vec<String>,
}
impl KubeTokenReviewer {
	/// Builds a reviewer with its own reqwest client trusting the cluster CA.
	///
	/// Redirects are disabled and `request_timeout` bounds every review at the transport
	/// level, in addition to the gate's own deadline.
	pub fn new(
		credentials: &ClusterCredentials,
		request_timeout: Duration,
	) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(Policy::none()).timeout(request_timeout);

		if let Some(pem) = credentials.ca_pem.as_deref() {
			builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
		}

		Self::with_client(builder.build()?, credentials)
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(
		client: ReqwestClient,
		credentials: &ClusterCredentials,
	) -> Result<Self, ConfigError> {
		let endpoint = credentials
			.api_server
			.join(TOKEN_REVIEW_PATH)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token review", source })?;

		Ok(Self {
			client,
			endpoint,
			bearer: credentials.bearer.clone(),
			request_audiences: Vec::new(),
		})
	}

	/// Asks the API server to validate tokens against these audiences.
	///
	/// Without this the API server falls back to its own `--api-audiences`. The gate checks
	/// the returned set either way.
	pub fn with_request_audiences<I, S>(mut self, audiences: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.request_audiences = audiences.into_iter().map(Into::into).collect();

		self
	}

	/// Fully qualified `tokenreviews` endpoint.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn submit(&self, token: &AuthToken) -> Result<TokenReview, TransportError> {
		let body = ReviewRequest {
			api_version: API_VERSION,
			kind: KIND,
			spec: ReviewSpec { token: token.expose(), audiences: &self.request_audiences },
		};
		let response = self
			.client
			.post(self.endpoint.clone())
			.bearer_auth(self.bearer.expose())
			.json(&body)
			.send()
			.await
			.map_err(|e| TransportError::network(TARGET, e))?;
		let status = response.status();

		if !status.is_success() {
			return Err(TransportError::Status { target: TARGET, status: status.as_u16() });
		}

		let bytes = response.bytes().await.map_err(|e| TransportError::network(TARGET, e))?;
		let mut de = serde_json::Deserializer::from_slice(&bytes);
		let parsed: ReviewResponse = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| TransportError::Decode { target: TARGET, source })?;

		Ok(parsed.status.into())
	}
}
impl TokenReviewer for KubeTokenReviewer {
	fn review<'a>(&'a self, token: &'a AuthToken) -> ReviewFuture<'a> {
		Box::pin(self.submit(token))
	}
}
impl Debug for KubeTokenReviewer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KubeTokenReviewer")
			.field("endpoint", &self.endpoint.as_str())
			.field("request_audiences", &self.request_audiences)
			.finish()
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewRequest<'a> {
	api_version: &'static str,
	kind: &'static str,
	spec: ReviewSpec<'a>,
}

#[derive(Serialize)]
struct ReviewSpec<'a> {
	token: &'a str,
	#[serde(skip_serializing_if = "<[String]>::is_empty")]
	audiences: &'a [String],
}

#[derive(Deserialize)]
struct ReviewResponse {
	#[serde(default)]
	status: ReviewStatus,
}

#[derive(Default, Deserialize)]
struct ReviewStatus {
	#[serde(default)]
	authenticated: bool,
	#[serde(default)]
	audiences: Vec<String>,
	#[serde(default)]
	user: Option<ReviewUser>,
	#[serde(default)]
	error: Option<String>,
}
impl From<ReviewStatus> for TokenReview {
	fn from(status: ReviewStatus) -> Self {
		Self {
			authenticated: status.authenticated,
			audiences: status.audiences.into_iter().collect(),
			username: status.user.and_then(|user| user.username),
			error: status.error.filter(|e| !e.is_empty()),
		}
	}
}

#[derive(Deserialize)]
struct ReviewUser {
	#[serde(default)]
	username: Option<String>,
}
