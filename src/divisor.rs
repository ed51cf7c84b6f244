//! Divisor enumeration built from the multiplicative structure of the input.
//!
//! The engine factors `n` by trial division (the factor 2 first, then odd candidates up
//! to `√n`) and, for every prime power `p^e` it finds, multiplies each divisor collected
//! so far by `p^1..=p^e`. Starting from `{1}`, this yields every divisor exactly once in
//! `O(√n)` trial divisions plus work proportional to the output.
//!
//! Every multiplication is checked. Products of divisors of a valid `i64` never leave the
//! 64-bit range, so [`ComputeError::Overflow`] is only reachable through
//! [`DivisorSet::extend`] with inputs that are not divisors of a single `i64`.

// self
use crate::error::ComputeError;

/// Returns every positive divisor of `n`, in generation order.
///
/// The first element is always `1`; the last is always `n`.
pub fn divisors(n: i64) -> Result<Vec<i64>, ComputeError> {
	let mut set = DivisorSet::new();

	for (prime, exponent) in PrimePowers::of(n)? {
		set.extend(prime, exponent)?;
	}

	Ok(set.into_vec())
}

/// Returns every positive divisor of `n` in ascending order.
pub fn divisors_sorted(n: i64) -> Result<Vec<i64>, ComputeError> {
	let mut all = divisors(n)?;

	all.sort_unstable();

	Ok(all)
}

/// Divisors accumulated so far while walking a factorization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivisorSet(Vec<i64>);
impl DivisorSet {
	/// Creates the set `{1}`.
	pub fn new() -> Self {
		Self(vec![1])
	}

	/// Multiplies every current divisor by `prime^1..=prime^exponent` and appends the results.
	///
	/// The set is left untouched when any product overflows.
	pub fn extend(&mut self, prime: i64, exponent: u32) -> Result<(), ComputeError> {
		if prime < 2 {
			return Err(ComputeError::InvalidInput { value: prime });
		}

		// No i64 holds a prime power above 2^62, so larger exponents overflow below anyway.
		let mut grown = Vec::with_capacity(self.0.len().saturating_mul(exponent.min(63) as usize));
		let mut power = 1_i64;

		for _ in 0..exponent {
			power = power.checked_mul(prime).ok_or(ComputeError::Overflow)?;

			for divisor in &self.0 {
				grown.push(divisor.checked_mul(power).ok_or(ComputeError::Overflow)?);
			}
		}

		self.0.append(&mut grown);

		Ok(())
	}

	/// Consumes the set, returning divisors in generation order.
	pub fn into_vec(self) -> Vec<i64> {
		self.0
	}
}
impl Default for DivisorSet {
	fn default() -> Self {
		Self::new()
	}
}

/// Trial-division walk yielding `(prime, exponent)` pairs in ascending order.
struct PrimePowers {
	rest: i64,
	candidate: i64,
}
impl PrimePowers {
	fn of(n: i64) -> Result<Self, ComputeError> {
		if n < 1 {
			return Err(ComputeError::InvalidInput { value: n });
		}

		Ok(Self { rest: n, candidate: 2 })
	}
}
impl Iterator for PrimePowers {
	type Item = (i64, u32);

	fn next(&mut self) -> Option<Self::Item> {
		if self.candidate == 2 {
			self.candidate = 3;

			let twos = self.rest.trailing_zeros();

			if twos > 0 {
				self.rest >>= twos;

				return Some((2, twos));
			}
		}

		while self.rest > 1 {
			let mut d = self.candidate;

			// Once d² exceeds the cofactor, the cofactor is prime. An overflowing square
			// is larger than any i64 cofactor.
			if d.checked_mul(d).is_none_or(|square| square > self.rest) {
				d = self.rest;
			}

			let mut exponent = 0;

			while self.rest % d == 0 {
				self.rest /= d;
				exponent += 1;
			}

			self.candidate = d.saturating_add(2);

			if exponent > 0 {
				return Some((d, exponent));
			}
		}

		None
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::BTreeSet;
	// self
	use super::*;

	const LARGEST_PRIME_BELOW_2_63: i64 = 9_223_372_036_854_775_783;

	fn brute_force(n: i64) -> BTreeSet<i64> {
		(1..=n).filter(|d| n % d == 0).collect()
	}

	#[test]
	fn matches_brute_force_without_duplicates() {
		for n in 1..=2_000 {
			let found = divisors(n).expect("Positive input should succeed.");
			let unique: BTreeSet<i64> = found.iter().copied().collect();

			assert_eq!(unique.len(), found.len(), "Duplicates produced for {n}.");
			assert_eq!(unique, brute_force(n), "Wrong divisor set for {n}.");
		}
	}

	#[test]
	fn small_fixtures() {
		assert_eq!(divisors(1).expect("One is valid."), vec![1]);
		assert_eq!(divisors_sorted(12).expect("Twelve is valid."), vec![1, 2, 3, 4, 6, 12]);

		let of_360 = divisors_sorted(360).expect("360 is valid.");

		assert_eq!(of_360.len(), 24);
		assert_eq!(&of_360[..8], &[1, 2, 3, 4, 5, 6, 8, 9]);
		assert_eq!(of_360.last(), Some(&360));
	}

	#[test]
	fn generation_order_starts_at_one_and_ends_at_n() {
		for n in [2, 9, 97, 360, 1_024, 999_983 * 2] {
			let found = divisors(n).expect("Positive input should succeed.");

			assert_eq!(found.first(), Some(&1));
			assert_eq!(found.last(), Some(&n));
		}
	}

	#[test]
	fn primes_yield_one_and_themselves() {
		for p in [2, 3, 5, 7, 97, 7_919, 1_000_000_007] {
			assert_eq!(divisors_sorted(p).expect("Prime input should succeed."), vec![1, p]);
		}
	}

	#[test]
	fn prime_powers_have_k_plus_one_divisors() {
		for (p, k) in [(2_i64, 62_u32), (3, 39), (5, 10), (7_919, 4)] {
			let n = p.pow(k);

			assert_eq!(divisors(n).expect("Prime power should succeed.").len(), k as usize + 1);
		}
	}

	#[test]
	fn i64_max_factors_without_overflow() {
		// 2^63 - 1 = 7^2 * 73 * 127 * 337 * 92737 * 649657
		assert_eq!(
			PrimePowers::of(i64::MAX).expect("i64::MAX is valid.").collect::<Vec<_>>(),
			vec![(7, 2), (73, 1), (127, 1), (337, 1), (92_737, 1), (649_657, 1)]
		);

		let found = divisors(i64::MAX).expect("i64::MAX is valid.");

		assert_eq!(found.len(), 3 * 2 * 2 * 2 * 2 * 2);
		assert!(found.iter().all(|d| i64::MAX % d == 0));
	}

	#[test]
	fn deterministic() {
		assert_eq!(divisors(720_720), divisors(720_720));
	}

	#[test]
	fn non_positive_input_is_invalid() {
		assert_eq!(divisors(0), Err(ComputeError::InvalidInput { value: 0 }));
		assert_eq!(divisors(-12), Err(ComputeError::InvalidInput { value: -12 }));
		assert_eq!(divisors(i64::MIN), Err(ComputeError::InvalidInput { value: i64::MIN }));
	}

	#[test]
	fn overflowing_square_treats_cofactor_as_prime() {
		let walk = PrimePowers { rest: LARGEST_PRIME_BELOW_2_63, candidate: 3_037_000_501 };

		assert_eq!(walk.collect::<Vec<_>>(), vec![(LARGEST_PRIME_BELOW_2_63, 1)]);
	}

	#[test]
	fn extend_rejects_overflow_atomically() {
		let mut set = DivisorSet::new();

		set.extend(2, 62).expect("2^62 fits in i64.");

		let before = set.clone();

		assert_eq!(set.extend(3, 1), Err(ComputeError::Overflow));
		assert_eq!(set, before, "Failed extension must not leave partial results.");
		assert_eq!(DivisorSet::new().extend(2, 63), Err(ComputeError::Overflow));
		assert_eq!(
			DivisorSet::new().extend(1, 3),
			Err(ComputeError::InvalidInput { value: 1 })
		);
	}

	#[test]
	fn extension_order_is_generation_order() {
		let mut set = DivisorSet::default();

		set.extend(3, 1).expect("Small extension should succeed.");
		set.extend(2, 1).expect("Small extension should succeed.");

		assert_eq!(set.into_vec(), vec![1, 3, 2, 6]);
	}
}
