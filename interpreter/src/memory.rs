use primitive_types::U256;

use crate::{
	error::Failure,
	gas::{words, Gas},
	utils::to_u64,
};

/// Byte-addressed memory of one call frame.
///
/// Memory grows in 32-byte words and is zero-initialized. Growth is paid for
/// up front through the quadratic cost counter: expanding to `w` words costs
/// `3·w + w²/512` in total, and each expansion charges the difference to the
/// current high-water mark. If the charge fails, the contents are unchanged.
#[derive(Clone, Debug, Default)]
pub struct Memory {
	store: Vec<u8>,
	current_cost: i64,
}

fn total_cost(words: u64) -> u128 {
	let words = u128::from(words);
	3 * words + words * words / 512
}

impl Memory {
	/// Create an empty memory.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Current size in bytes. Always a multiple of 32.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize {
		self.store.len()
	}

	/// Whether the memory was never grown.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.store.is_empty()
	}

	/// The raw contents.
	#[must_use]
	pub fn as_bytes(&self) -> &[u8] {
		&self.store
	}

	/// Reconstruct a memory from externally-held contents, charging nothing:
	/// the cost counter is restored to match the high-water mark, so later
	/// expansions charge only their difference.
	#[must_use]
	pub fn from_bytes(data: &[u8]) -> Self {
		let word_count = words(data.len() as u64);
		let mut store = vec![0; (word_count * 32) as usize];
		store[..data.len()].copy_from_slice(data);
		Self {
			store,
			// Reconstructed sizes are far below the i64 cost range.
			current_cost: total_cost(word_count) as i64,
		}
	}

	fn grow(&mut self, end: u64, gas: &mut Gas) -> Result<(), Failure> {
		if end <= self.store.len() as u64 {
			return Ok(());
		}
		let word_count = words(end);
		let new_cost = total_cost(word_count);
		gas.consume_wide(new_cost - self.current_cost as u128)?;
		// The charge succeeded, so the total fits the remaining-gas range.
		self.current_cost = new_cost as i64;
		self.store.resize((word_count * 32) as usize, 0);
		Ok(())
	}

	/// Mutable access to `offset..offset + len`, growing as needed. A zero
	/// length never grows nor charges.
	pub fn slice_mut(
		&mut self,
		offset: U256,
		len: u64,
		gas: &mut Gas,
	) -> Result<&mut [u8], Failure> {
		if len == 0 {
			return Ok(&mut []);
		}
		let offset = to_u64(offset).ok_or(Failure::OutOfGas)?;
		let end = offset.checked_add(len).ok_or(Failure::OutOfGas)?;
		self.grow(end, gas)?;
		Ok(&mut self.store[offset as usize..end as usize])
	}

	/// Read the 32-byte word at `offset`.
	pub fn load_word(&mut self, offset: U256, gas: &mut Gas) -> Result<U256, Failure> {
		let slice = self.slice_mut(offset, 32, gas)?;
		Ok(U256::from_big_endian(slice))
	}

	/// Write the 32-byte word `value` at `offset`.
	pub fn store_word(&mut self, offset: U256, value: U256, gas: &mut Gas) -> Result<(), Failure> {
		let slice = self.slice_mut(offset, 32, gas)?;
		value.to_big_endian(slice);
		Ok(())
	}

	/// Write a single byte at `offset`.
	pub fn store_byte(&mut self, offset: U256, byte: u8, gas: &mut Gas) -> Result<(), Failure> {
		let slice = self.slice_mut(offset, 1, gas)?;
		slice[0] = byte;
		Ok(())
	}

	/// Copy `len` bytes from `src` to `dst` within the memory, growing to
	/// cover both ranges first.
	pub fn copy_within(
		&mut self,
		dst: U256,
		src: U256,
		len: u64,
		gas: &mut Gas,
	) -> Result<(), Failure> {
		if len == 0 {
			return Ok(());
		}
		let dst = to_u64(dst).ok_or(Failure::OutOfGas)?;
		let src = to_u64(src).ok_or(Failure::OutOfGas)?;
		let dst_end = dst.checked_add(len).ok_or(Failure::OutOfGas)?;
		let src_end = src.checked_add(len).ok_or(Failure::OutOfGas)?;
		self.grow(dst_end.max(src_end), gas)?;
		self.store
			.copy_within(src as usize..src_end as usize, dst as usize);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn growth_is_word_aligned_and_zeroed() {
		let mut memory = Memory::new();
		let mut gas = Gas::new(1_000);
		let slice = memory.slice_mut(U256::from(10), 4, &mut gas).unwrap();
		assert_eq!(slice, &[0, 0, 0, 0]);
		assert_eq!(memory.len(), 32);
	}

	#[test]
	fn growth_charges_the_quadratic_difference() {
		let mut memory = Memory::new();
		let mut gas = Gas::new(1_000);

		// First word: 3·1 + 1/512 = 3.
		memory.store_word(U256::zero(), U256::one(), &mut gas).unwrap();
		assert_eq!(gas.left(), 997);

		// Covering four words in total: 3·4 + 16/512 = 12, of which 3 are
		// already paid.
		memory.load_word(U256::from(95), &mut gas).unwrap();
		assert_eq!(gas.left(), 997 - 9);
		assert_eq!(memory.len(), 128);

		// Accessing covered ranges charges nothing further.
		memory.load_word(U256::from(64), &mut gas).unwrap();
		assert_eq!(gas.left(), 997 - 9);
	}

	#[test]
	fn zero_length_never_charges() {
		let mut memory = Memory::new();
		let mut gas = Gas::new(10);
		let slice = memory
			.slice_mut(U256::from(1_000_000), 0, &mut gas)
			.unwrap();
		assert!(slice.is_empty());
		assert_eq!(gas.left(), 10);
		assert!(memory.is_empty());
	}

	#[test]
	fn failed_growth_leaves_memory_unchanged() {
		let mut memory = Memory::new();
		let mut gas = Gas::new(5);
		memory.store_word(U256::zero(), U256::one(), &mut gas).unwrap();
		assert_eq!(
			memory.store_word(U256::from(1 << 20), U256::one(), &mut gas),
			Err(Failure::OutOfGas)
		);
		assert_eq!(memory.len(), 32);
	}

	#[test]
	fn absurd_offsets_are_out_of_gas() {
		let mut memory = Memory::new();
		let mut gas = Gas::new(i64::MAX);
		assert_eq!(
			memory.slice_mut(U256::MAX, 1, &mut gas),
			Err(Failure::OutOfGas)
		);
	}

	#[test]
	fn copy_within_moves_overlapping_ranges() {
		let mut memory = Memory::new();
		let mut gas = Gas::new(1_000);
		memory
			.slice_mut(U256::zero(), 4, &mut gas)
			.unwrap()
			.copy_from_slice(&[1, 2, 3, 4]);
		memory
			.copy_within(U256::from(2), U256::zero(), 4, &mut gas)
			.unwrap();
		assert_eq!(&memory.as_bytes()[..6], &[1, 2, 1, 2, 3, 4]);
	}

	#[test]
	fn reconstruction_restores_the_cost_counter() {
		let mut gas = Gas::new(1_000);
		let mut memory = Memory::from_bytes(&[7; 64]);
		assert_eq!(memory.len(), 64);

		// Two words are already paid for; the third charges 3.
		memory.load_word(U256::from(64), &mut gas).unwrap();
		assert_eq!(gas.left(), 997);
	}
}
