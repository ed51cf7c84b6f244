// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for gate decisions.
#[derive(Debug, Default)]
pub struct GateMetrics {
	attempts: AtomicU64,
	accepted: AtomicU64,
	missing: AtomicU64,
	forbidden: AtomicU64,
	unavailable: AtomicU64,
}
impl GateMetrics {
	/// Returns the total number of authentication attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of accepted requests.
	pub fn accepted(&self) -> u64 {
		self.accepted.load(Ordering::Relaxed)
	}

	/// Returns the number of requests rejected for lacking a token.
	pub fn missing_credentials(&self) -> u64 {
		self.missing.load(Ordering::Relaxed)
	}

	/// Returns the number of requests the authority or audience check rejected.
	pub fn forbidden(&self) -> u64 {
		self.forbidden.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that failed because the authority was unavailable.
	pub fn unavailable(&self) -> u64 {
		self.unavailable.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_accepted(&self) {
		self.accepted.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_missing(&self) {
		self.missing.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_forbidden(&self) {
		self.forbidden.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_unavailable(&self) {
		self.unavailable.fetch_add(1, Ordering::Relaxed);
	}
}
