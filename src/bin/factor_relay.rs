//! Forwarder that attaches the projected service token and relays factor requests.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use factor_gate::{
	config::ServerSettings,
	obs,
	relay::{Relay, TokenSource},
	server,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	obs::init_subscriber();

	let settings = ServerSettings::from_env()?;
	let relay = Relay::new(settings.downstream, TokenSource::File(settings.token_path))?;

	tracing::info!(downstream = %relay.downstream(), "Starting factor relay.");

	let listener = TcpListener::bind(settings.listen).await?;

	server::serve(listener, server::relay_router(Arc::new(relay))).await?;

	Ok(())
}
