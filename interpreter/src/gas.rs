use crate::error::Failure;

/// Remaining gas of one call frame.
///
/// The counter is signed, matching the wire type used by processors, but it
/// never drops below zero: a charge that does not fit fails with
/// [`Failure::OutOfGas`] and leaves the counter untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Gas(i64);

impl Gas {
	/// Create a new counter holding `left` gas.
	#[must_use]
	pub const fn new(left: i64) -> Self {
		Self(left)
	}

	/// Gas remaining.
	#[inline]
	#[must_use]
	pub const fn left(&self) -> i64 {
		self.0
	}

	/// Charge `amount` gas.
	#[inline]
	pub fn consume(&mut self, amount: i64) -> Result<(), Failure> {
		if self.0 < 0 || amount < 0 || self.0 < amount {
			return Err(Failure::OutOfGas);
		}
		self.0 -= amount;
		Ok(())
	}

	/// Charge a cost that may exceed the `i64` range, as memory expansion
	/// deltas can.
	pub fn consume_wide(&mut self, amount: u128) -> Result<(), Failure> {
		let amount = i64::try_from(amount).map_err(|_| Failure::OutOfGas)?;
		self.consume(amount)
	}

	/// Return gas handed back by a nested call.
	#[inline]
	pub fn reclaim(&mut self, amount: i64) {
		self.0 += amount;
	}
}

/// Number of 32-byte words needed to hold `len` bytes.
#[inline]
#[must_use]
pub const fn words(len: u64) -> u64 {
	len.div_ceil(32)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn consume_within_budget() {
		let mut gas = Gas::new(10);
		assert_eq!(gas.consume(4), Ok(()));
		assert_eq!(gas.left(), 6);
		assert_eq!(gas.consume(6), Ok(()));
		assert_eq!(gas.left(), 0);
	}

	#[test]
	fn consume_beyond_budget_fails_without_change() {
		let mut gas = Gas::new(5);
		assert_eq!(gas.consume(6), Err(Failure::OutOfGas));
		assert_eq!(gas.left(), 5);
	}

	#[test]
	fn negative_amounts_are_rejected() {
		let mut gas = Gas::new(5);
		assert_eq!(gas.consume(-1), Err(Failure::OutOfGas));
	}

	#[test]
	fn wide_overflow_is_out_of_gas() {
		let mut gas = Gas::new(i64::MAX);
		assert_eq!(gas.consume_wide(u128::from(u64::MAX) * 2), Err(Failure::OutOfGas));
	}

	#[test]
	fn word_counts() {
		assert_eq!(words(0), 0);
		assert_eq!(words(1), 1);
		assert_eq!(words(32), 1);
		assert_eq!(words(33), 2);
	}
}
