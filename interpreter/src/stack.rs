use std::cell::RefCell;

use primitive_types::U256;

use crate::error::Failure;

/// Capacity of the operand stack, in 256-bit words.
pub const STACK_LIMIT: usize = 1024;

// Buffers kept per thread; enough for the maximum call depth plus the frames
// a conformance driver may hold open.
const MAX_POOLED: usize = 1100;

thread_local! {
	static POOL: RefCell<Vec<Vec<U256>>> = const { RefCell::new(Vec::new()) };
}

/// Operand stack of one call frame.
///
/// The backing buffer is acquired from a thread-local free list on
/// construction and handed back on drop, so no call allocates on the hot
/// path and every exit path — including failures — releases its buffer.
/// Nested calls acquiring further stacks reentrantly are fine; the pool is
/// only borrowed for the duration of a single acquire or release.
#[derive(Debug)]
pub struct Stack {
	data: Vec<U256>,
}

impl Stack {
	/// Acquire a stack with an empty, full-capacity buffer.
	#[must_use]
	pub fn new() -> Self {
		let data = POOL
			.with(|pool| pool.borrow_mut().pop())
			.unwrap_or_else(|| Vec::with_capacity(STACK_LIMIT));
		Self { data }
	}

	/// Stack depth.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Whether the stack is empty.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Push a new value onto the stack.
	#[inline]
	pub fn push(&mut self, value: U256) -> Result<(), Failure> {
		if self.data.len() == STACK_LIMIT {
			return Err(Failure::StackOverflow);
		}
		self.data.push(value);
		Ok(())
	}

	/// Pop the top `N` values; element 0 of the result is the old top.
	#[inline]
	pub fn pop<const N: usize>(&mut self) -> Result<[U256; N], Failure> {
		let len = self.data.len();
		if len < N {
			return Err(Failure::StackUnderflow);
		}
		let mut values = [U256::zero(); N];
		for (i, value) in values.iter_mut().enumerate() {
			*value = self.data[len - 1 - i];
		}
		self.data.truncate(len - N);
		Ok(values)
	}

	/// Read the value `depth` positions below the top, where depth 0 is the
	/// top itself.
	#[inline]
	pub fn peek(&self, depth: usize) -> Result<U256, Failure> {
		let len = self.data.len();
		if depth >= len {
			return Err(Failure::StackUnderflow);
		}
		Ok(self.data[len - 1 - depth])
	}

	/// Push a copy of the value at depth `n - 1`, for `DUPn`.
	#[inline]
	pub fn dup(&mut self, n: usize) -> Result<(), Failure> {
		let value = self.peek(n - 1)?;
		self.push(value)
	}

	/// Swap the top with the value `n` positions below it, for `SWAPn`.
	#[inline]
	pub fn swap(&mut self, n: usize) -> Result<(), Failure> {
		let len = self.data.len();
		if n >= len {
			return Err(Failure::StackUnderflow);
		}
		self.data.swap(len - 1, len - 1 - n);
		Ok(())
	}

	/// Values from bottom to top.
	#[must_use]
	pub fn as_slice(&self) -> &[U256] {
		&self.data
	}

	/// Acquire a stack pre-filled with `values`, given bottom to top.
	/// Values beyond the capacity are ignored.
	#[must_use]
	pub fn from_values(values: &[U256]) -> Self {
		let mut stack = Self::new();
		for value in values.iter().take(STACK_LIMIT) {
			stack.data.push(*value);
		}
		stack
	}
}

impl Default for Stack {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Stack {
	fn drop(&mut self) {
		let mut data = std::mem::take(&mut self.data);
		data.clear();
		// Thread teardown may have destroyed the pool already.
		let _ = POOL.try_with(|pool| {
			let mut pool = pool.borrow_mut();
			if pool.len() < MAX_POOLED {
				pool.push(data);
			}
		});
	}
}
