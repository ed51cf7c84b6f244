//! Compute endpoint guarded by the cluster `TokenReview` API.

// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use factor_gate::{
	config::{ClusterCredentials, ServerSettings},
	obs,
	review::KubeTokenReviewer,
	server::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	obs::init_subscriber();

	let settings = ServerSettings::from_env()?;
	let credentials = ClusterCredentials::in_cluster()?;
	let reviewer = KubeTokenReviewer::new(&credentials, settings.gate.review_timeout)?;

	tracing::info!(
		audience = %settings.gate.audience,
		authority = %reviewer.endpoint(),
		"Starting factor gate."
	);

	let app = server::router(AppState::new(reviewer, settings.gate));
	let listener = TcpListener::bind(settings.listen).await?;

	server::serve(listener, app).await?;

	Ok(())
}
