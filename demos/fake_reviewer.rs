//! Runs the compute endpoint locally against an in-process reviewer instead of a cluster.
//!
//! 1. Implement [`TokenReviewer`] so it returns a [`TokenReview`] for each token.
//! 2. Wrap it in [`AppState`] together with a [`GateConfig`].
//! 3. Serve [`server::router`] and call it:
//!
//! ```sh
//! curl -s localhost:8080/factor -H 'X-Auth-Token: demo' -d '{"nr": 360}'
//! ```

// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use factor_gate::{
	auth::{Audience, AuthToken, TokenReview},
	config::GateConfig,
	obs,
	review::{ReviewFuture, TokenReviewer},
	server::{self, AppState},
};

/// Accepts `demo` for the `factors` audience, `other` for an unrelated audience, and
/// nothing else.
struct DemoReviewer;
impl TokenReviewer for DemoReviewer {
	fn review<'a>(&'a self, token: &'a AuthToken) -> ReviewFuture<'a> {
		let review = match token.expose() {
			"demo" => TokenReview::authenticated(["factors"]).with_username("demo-user"),
			"other" => TokenReview::authenticated(["billing"]).with_username("demo-user"),
			_ => TokenReview::rejected().with_error("unknown token"),
		};

		Box::pin(async move { Ok(review) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	obs::init_subscriber();

	let config = GateConfig::builder(Audience::new("factors")?).build()?;
	let app = server::router(AppState::new(DemoReviewer, config));
	let listener = TcpListener::bind("127.0.0.1:8080").await?;

	server::serve(listener, app).await?;

	Ok(())
}
