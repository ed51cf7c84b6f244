//! axum wiring for the compute endpoint and the relay.
//!
//! `POST /factor` runs a fixed pipeline:
//!
//! 1. [`Credential`] rejects a missing or blank `X-Auth-Token` with 401, before anything else.
//! 2. [`FactorBody`] buffers, parses and validates the body; an unreadable or oversized body,
//!    malformed JSON, or `nr < 1` is a 400, so bad input never costs an authority round trip.
//! 3. The [`TokenGate`] reviews the token: 403 on rejection, 500 when the authority fails.
//! 4. The divisor engine runs on the blocking pool and the ascending divisor set is returned.
//!
//! Every error renders as `{"error": "<message>"}`.

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{FromRequest, FromRequestParts, Request, State},
	http::{StatusCode, request::Parts},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	api::{ErrorResponse, FactorRequest, FactorResponse},
	auth::{AUTH_TOKEN_HEADER, AuthToken},
	config::GateConfig,
	divisor,
	error::ComputeError,
	gate::{self, TokenGate},
	obs::{Stage, StageRun},
	relay::Relay,
	review::TokenReviewer,
};

/// Shared state for the compute router.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Gate every compute request passes through.
	pub gate: Arc<TokenGate<dyn TokenReviewer>>,
}
impl AppState {
	/// Builds state around `reviewer` and `config`.
	pub fn new<R>(reviewer: R, config: GateConfig) -> Self
	where
		R: 'static + TokenReviewer,
	{
		let reviewer: Arc<dyn TokenReviewer> = Arc::new(reviewer);

		Self { gate: Arc::new(TokenGate::new(reviewer, config)) }
	}
}

/// Bearer token taken from `X-Auth-Token`; rejects with 401 when absent or blank.
#[derive(Debug)]
pub struct Credential(pub AuthToken);
impl<S> FromRequestParts<S> for Credential
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let raw = parts.headers.get(AUTH_TOKEN_HEADER).and_then(|value| value.to_str().ok());

		Ok(Self(gate::credential_from_header(raw)?))
	}
}

/// Buffered and validated `POST /factor` body.
///
/// Buffering failures, including bodies over axum's default limit, surface as
/// [`Error::InvalidBody`] so they share the JSON error shape of every other rejection.
#[derive(Debug)]
pub struct FactorBody(pub FactorRequest);
impl<S> FromRequest<S> for FactorBody
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let body = Bytes::from_request(req, state)
			.await
			.map_err(|rejection| Error::InvalidBody { reason: rejection.body_text() })?;

		Ok(Self(FactorRequest::from_slice(&body)?))
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status =
			StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		if status.is_server_error() {
			tracing::error!(
				error = %self,
				source = ?StdError::source(&self),
				"Request failed."
			);
		}

		(status, Json(ErrorResponse::new(self.to_string()))).into_response()
	}
}

/// Compute router: `POST /factor` behind the token gate, plus `GET /healthz`.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/factor", post(factor))
		.route("/healthz", get(healthz))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Relay router: `POST /factor` forwarded downstream, plus `GET /healthz`.
pub fn relay_router(relay: Arc<Relay>) -> Router {
	Router::new()
		.route("/factor", post(forward))
		.route("/healthz", get(healthz))
		.layer(TraceLayer::new_for_http())
		.with_state(relay)
}

/// Serves `app` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
	if let Ok(addr) = listener.local_addr() {
		tracing::info!(%addr, "Listening.");
	}

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
	if tokio::signal::ctrl_c().await.is_ok() {
		tracing::info!("Shutdown signal received.");
	}
}

async fn factor(
	State(state): State<AppState>,
	Credential(token): Credential,
	FactorBody(request): FactorBody,
) -> Result<Json<FactorResponse>> {
	state.gate.authenticate(&token).await?;

	let factors = compute(request.nr).await?;

	Ok(Json(FactorResponse { factors }))
}

async fn forward(
	State(relay): State<Arc<Relay>>,
	FactorBody(request): FactorBody,
) -> Result<Json<FactorResponse>> {
	Ok(Json(relay.forward(&request).await?))
}

async fn healthz() -> Json<Value> {
	Json(json!({ "status": "ok" }))
}

/// Runs the divisor engine on the blocking pool.
///
/// Large prime inputs take seconds of trial division. The blocking task is not cancelled
/// when the client disconnects; it runs to completion and its result is discarded.
async fn compute(nr: i64) -> Result<Vec<i64>, ComputeError> {
	run_blocking(move || divisor::divisors_sorted(nr)).await
}

async fn run_blocking<F>(work: F) -> Result<Vec<i64>, ComputeError>
where
	F: 'static + Send + FnOnce() -> Result<Vec<i64>, ComputeError>,
{
	let run = StageRun::start(Stage::Factor);
	let scope = run.clone();
	let result =
		tokio::task::spawn_blocking(move || scope.in_scope(work)).await.unwrap_or_else(|e| {
			tracing::error!(error = %e, panicked = e.is_panic(), "Divisor computation aborted.");

			Err(ComputeError::Aborted)
		});

	run.finish(&result);

	result
}
