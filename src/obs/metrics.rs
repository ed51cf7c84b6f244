// self
use crate::{
	_prelude::*,
	obs::{Stage, StageOutcome},
};

#[cfg(feature = "metrics")]
const STAGE_TOTAL: &str = "factor_gate_stage_total";
#[cfg(feature = "metrics")]
const STAGE_SECONDS: &str = "factor_gate_stage_seconds";

pub(super) fn record_attempt(stage: Stage) {
	#[cfg(feature = "metrics")]
	metrics::counter!(STAGE_TOTAL, &labels(stage, StageOutcome::Attempt)).increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = stage;
}

pub(super) fn record_finish(stage: Stage, outcome: StageOutcome, elapsed: Duration) {
	#[cfg(feature = "metrics")]
	{
		let labels = labels(stage, outcome);

		metrics::counter!(STAGE_TOTAL, &labels).increment(1);
		metrics::histogram!(STAGE_SECONDS, &labels).record(elapsed.as_secs_f64());
	}
	#[cfg(not(feature = "metrics"))]
	let _ = (stage, outcome, elapsed);
}

#[cfg(any(feature = "metrics", test))]
fn labels(stage: Stage, outcome: StageOutcome) -> [(&'static str, &'static str); 2] {
	[("stage", stage.as_str()), ("outcome", outcome.as_str())]
}
