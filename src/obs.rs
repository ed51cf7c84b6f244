//! Stage-level observability for the request pipeline.
//!
//! Every pipeline step runs inside a [`StageRun`]. Starting a run counts the attempt;
//! finishing it records the outcome on the run's span and on the stage metrics, so callers
//! never book-keep attempt/success/failure by hand.
//!
//! # Feature Flags
//!
//! - `tracing`: each run opens a `factor_gate.stage` span carrying `stage`, the caller's
//!   token fingerprint when one is attached, and the final `outcome`.
//! - `metrics`: `factor_gate_stage_total{stage, outcome}` counts attempts and outcomes;
//!   `factor_gate_stage_seconds{stage, outcome}` records how long finished runs took.
//! - `server`: [`init_subscriber`] installs the process-wide `tracing-subscriber` registry
//!   used by the bundled binaries.

mod metrics;

// std
use std::time::Instant;
// self
use crate::{_prelude::*, auth::AuthToken};

/// Pipeline stages observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Token gate review.
	Authenticate,
	/// Divisor enumeration.
	Factor,
	/// Forwarding to the downstream compute endpoint.
	Relay,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Authenticate => "authenticate",
			Stage::Factor => "factor",
			Stage::Relay => "relay",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One observed execution of a pipeline stage.
///
/// Clones share the span, so a clone can carry the run onto the blocking pool while the
/// original records the outcome.
#[derive(Clone, Debug)]
pub struct StageRun {
	stage: Stage,
	started: Instant,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageRun {
	/// Opens the stage span and counts the attempt.
	pub fn start(stage: Stage) -> Self {
		metrics::record_attempt(stage);

		Self {
			stage,
			started: Instant::now(),
			#[cfg(feature = "tracing")]
			span: tracing::info_span!(
				"factor_gate.stage",
				stage = stage.as_str(),
				token = tracing::field::Empty,
				outcome = tracing::field::Empty,
			),
		}
	}

	/// Tags the run with the fingerprint of `token`; the token itself is never recorded.
	pub fn with_token(self, token: &AuthToken) -> Self {
		#[cfg(feature = "tracing")]
		self.span.record("token", tracing::field::display(token.fingerprint()));
		#[cfg(not(feature = "tracing"))]
		let _ = token;

		self
	}

	/// Stage this run observes.
	pub fn stage(&self) -> Stage {
		self.stage
	}

	/// Drives `fut` inside the run's span and records how it ended.
	pub async fn run<F, T, E>(self, fut: F) -> Result<T, E>
	where
		F: Future<Output = Result<T, E>>,
	{
		#[cfg(feature = "tracing")]
		let result = {
			use tracing::Instrument;

			fut.instrument(self.span.clone()).await
		};
		#[cfg(not(feature = "tracing"))]
		let result = fut.await;

		self.finish(&result);

		result
	}

	/// Runs synchronous work with the run's span entered.
	pub fn in_scope<T>(&self, work: impl FnOnce() -> T) -> T {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(work)
		}
		#[cfg(not(feature = "tracing"))]
		{
			work()
		}
	}

	/// Records the outcome of `result` and returns the label it was filed under.
	pub fn finish<T, E>(self, result: &Result<T, E>) -> StageOutcome {
		let outcome = if result.is_ok() { StageOutcome::Success } else { StageOutcome::Failure };

		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());

		metrics::record_finish(self.stage, outcome, self.started.elapsed());

		outcome
	}
}

/// Installs the global subscriber: `RUST_LOG`-style filtering plus a fmt layer.
///
/// Falls back to `factor_gate=info,tower_http=info` when `RUST_LOG` is unset. Calling it
/// twice is harmless; the second install is ignored.
#[cfg(feature = "server")]
pub fn init_subscriber() {
	// crates.io
	use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("factor_gate=info,tower_http=info"));

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_target(false))
		.try_init();
}
