//! Credentials for reaching the cluster API server.

// std
use std::path::Path;
// self
use crate::{_prelude::*, auth::AuthToken, error::ConfigError};

/// Directory where Kubernetes mounts a pod's service-account credentials.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// API server location plus the bearer credential used to call it.
///
/// Only the in-pod service account is discovered automatically ([`Self::in_cluster`]);
/// kubeconfig files are not read.
///
/// # Running outside a cluster
///
/// Start `kubectl proxy`, which authenticates with your kubeconfig, and point plain-HTTP
/// credentials at it. The proxy ignores the bearer token, so any placeholder works:
///
/// ```
/// use factor_gate::{auth::AuthToken, config::ClusterCredentials, url::Url};
///
/// let credentials = ClusterCredentials::new_insecure(
/// 	Url::parse("http://127.0.0.1:8001")?,
/// 	AuthToken::new("unused"),
/// );
///
/// assert_eq!(credentials.api_server.as_str(), "http://127.0.0.1:8001/");
/// # Ok::<(), factor_gate::url::ParseError>(())
/// ```
#[derive(Clone)]
pub struct ClusterCredentials {
	/// API server base URL, always ending in `/`.
	pub api_server: Url,
	/// Bearer token presented to the API server.
	pub bearer: AuthToken,
	/// PEM bundle for the cluster CA, if the API server uses a private one.
	pub ca_pem: Option<Vec<u8>>,
}
impl ClusterCredentials {
	/// Creates credentials for an HTTPS API server.
	pub fn new(api_server: Url, bearer: AuthToken) -> Result<Self, ConfigError> {
		if api_server.scheme() != "https" {
			return Err(ConfigError::InsecureEndpoint {
				endpoint: "API server",
				url: api_server.to_string(),
			});
		}

		Ok(Self::new_unchecked(api_server, bearer))
	}

	/// Creates credentials without the HTTPS check; meant for local clusters and tests.
	pub fn new_insecure(api_server: Url, bearer: AuthToken) -> Self {
		Self::new_unchecked(api_server, bearer)
	}

	/// Loads the credentials Kubernetes injects into every pod.
	pub fn in_cluster() -> Result<Self, ConfigError> {
		let host = env_var("KUBERNETES_SERVICE_HOST")?;
		let port = env_var("KUBERNETES_SERVICE_PORT")?;

		Self::from_service_account(&host, &port, Path::new(SERVICE_ACCOUNT_DIR))
	}

	/// Builds credentials from an API server host/port and a mounted service-account
	/// directory holding `token` and, optionally, `ca.crt`.
	pub fn from_service_account(host: &str, port: &str, dir: &Path) -> Result<Self, ConfigError> {
		// IPv6 service hosts need brackets inside a URL authority.
		let authority =
			if host.contains(':') { format!("[{host}]:{port}") } else { format!("{host}:{port}") };
		let api_server = Url::parse(&format!("https://{authority}"))
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "API server", source })?;
		let token_path = dir.join("token");
		let raw_token = std::fs::read_to_string(&token_path).map_err(|source| {
			ConfigError::ClusterCredentials { path: token_path.display().to_string(), source }
		})?;
		let bearer = AuthToken::from_header(&raw_token).ok_or_else(|| {
			ConfigError::ClusterCredentials {
				path: token_path.display().to_string(),
				source: std::io::Error::new(std::io::ErrorKind::InvalidData, "token file is empty"),
			}
		})?;
		let ca_path = dir.join("ca.crt");
		let ca_pem = match std::fs::read(&ca_path) {
			Ok(pem) => Some(pem),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
			Err(source) =>
				return Err(ConfigError::ClusterCredentials {
					path: ca_path.display().to_string(),
					source,
				}),
		};

		Ok(Self { ca_pem, ..Self::new(api_server, bearer)? })
	}

	/// Trusts the provided PEM bundle in addition to the system roots.
	pub fn with_ca_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
		self.ca_pem = Some(pem.into());

		self
	}

	fn new_unchecked(mut api_server: Url, bearer: AuthToken) -> Self {
		if !api_server.path().ends_with('/') {
			let path = format!("{}/", api_server.path());

			api_server.set_path(&path);
		}

		Self { api_server, bearer, ca_pem: None }
	}
}
impl Debug for ClusterCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClusterCredentials")
			.field("api_server", &self.api_server.as_str())
			.field("bearer", &self.bearer)
			.field("ca_pem_set", &self.ca_pem.is_some())
			.finish()
	}
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
	std::env::var(name).map_err(|_| ConfigError::MissingEnv { name })
}
