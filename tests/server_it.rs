mod common;

// std
use std::sync::Arc;
// crates.io
use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
// self
use common::RecordingReviewer;
use factor_gate::{
	config::GateConfig,
	server::{self, AppState},
};

fn app(reviewer: Arc<RecordingReviewer>) -> (Router, AppState) {
	let state = AppState::new(reviewer, GateConfig::default());

	(server::router(state.clone()), state)
}

fn factor_request(token: Option<&str>, body: &str) -> Request<Body> {
	let mut builder =
		Request::builder().method("POST").uri("/factor").header("content-type", "application/json");

	if let Some(token) = token {
		builder = builder.header("X-Auth-Token", token);
	}

	builder.body(Body::from(body.to_owned())).expect("Request fixture should build.")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.expect("Router should respond.");
	let status = response.status();
	let bytes = response
		.into_body()
		.collect()
		.await
		.expect("Response body should be readable.")
		.to_bytes();

	(status, serde_json::from_slice(&bytes).expect("Response body should be JSON."))
}

#[tokio::test]
async fn authenticated_request_returns_ascending_divisors() {
	let reviewer = RecordingReviewer::accepting(["https://kubernetes.default.svc", "factors"]);
	let (app, state) = app(reviewer.clone());
	let (status, body) = send(app, factor_request(Some("good"), r#"{"nr": 12}"#)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "factors": [1, 2, 3, 4, 6, 12] }));
	assert_eq!(reviewer.calls(), 1);
	assert_eq!(state.gate.metrics.accepted(), 1);
}

#[tokio::test]
async fn divisor_set_of_360_has_24_entries() {
	let (app, _) = app(RecordingReviewer::accepting(["factors"]));
	let (status, body) = send(app, factor_request(Some("good"), r#"{"nr": 360}"#)).await;

	assert_eq!(status, StatusCode::OK);

	let factors = body["factors"].as_array().expect("Factors should be an array.");

	assert_eq!(factors.len(), 24);
	assert_eq!(factors.first(), Some(&json!(1)));
	assert_eq!(factors.last(), Some(&json!(360)));
}

#[tokio::test]
async fn missing_token_is_401_without_authority_call() {
	let reviewer = RecordingReviewer::accepting(["factors"]);

	for token in [None, Some(""), Some("   ")] {
		let (app, _) = app(reviewer.clone());
		let (status, body) = send(app, factor_request(token, r#"{"nr": 12}"#)).await;

		assert_eq!(status, StatusCode::UNAUTHORIZED);
		assert_eq!(body, json!({ "error": "Authorization header is not provided." }));
	}

	assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn missing_token_wins_over_invalid_body() {
	let reviewer = RecordingReviewer::accepting(["factors"]);
	let (app, _) = app(reviewer.clone());
	let (status, _) = send(app, factor_request(None, r#"{"nr": 0}"#)).await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn invalid_input_is_400_before_authority_call() {
	let reviewer = RecordingReviewer::accepting(["factors"]);

	for body in [r#"{"nr": 0}"#, r#"{"nr": -4}"#, r#"{"nr": "12"}"#, "{}", "not json"] {
		let (app, _) = app(reviewer.clone());
		let (status, response) = send(app, factor_request(Some("good"), body)).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "Body {body} should be rejected.");
		assert!(response["error"].is_string());
	}

	assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn oversized_body_is_400_json_before_authority_call() {
	let reviewer = RecordingReviewer::accepting(["factors"]);
	let (app, _) = app(reviewer.clone());
	let body = format!(r#"{{"nr": 12{}}}"#, " ".repeat(3 * 1024 * 1024));
	let (status, response) = send(app, factor_request(Some("good"), &body)).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);

	let message = response["error"].as_str().expect("Error message should be a string.");

	assert!(message.starts_with("Request body is invalid"), "Unexpected message: {message}.");
	assert!(message.contains("length limit"), "Unexpected message: {message}.");
	assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn audience_mismatch_is_403() {
	let reviewer = RecordingReviewer::accepting(["https://kubernetes.default.svc"]);
	let (app, state) = app(reviewer.clone());
	let (status, body) = send(app, factor_request(Some("replayed"), r#"{"nr": 12}"#)).await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body, json!({ "error": "The request could not be authenticated." }));
	assert_eq!(reviewer.calls(), 1);
	assert_eq!(state.gate.metrics.forbidden(), 1);
}

#[tokio::test]
async fn unauthenticated_token_is_403() {
	let (app, _) = app(RecordingReviewer::rejecting());
	let (status, _) = send(app, factor_request(Some("bogus"), r#"{"nr": 12}"#)).await;

	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn authority_failure_is_500_not_403() {
	let (app, state) = app(RecordingReviewer::unavailable());
	let (status, body) = send(app, factor_request(Some("any"), r#"{"nr": 12}"#)).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, json!({ "error": "Token review authority is unavailable." }));
	assert_eq!(state.gate.metrics.unavailable(), 1);
}

#[tokio::test]
async fn healthz_skips_the_gate() {
	let reviewer = RecordingReviewer::unavailable();
	let (app, _) = app(reviewer.clone());
	let request =
		Request::builder().uri("/healthz").body(Body::empty()).expect("Request should build.");
	let (status, body) = send(app, request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "status": "ok" }));
	assert_eq!(reviewer.calls(), 0);
}
