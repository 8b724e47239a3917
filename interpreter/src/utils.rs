//! Small utilities.

use primitive_types::{H160, H256, U256};

/// Convert a 256-bit word to `u64`, if it fits.
#[inline]
pub(crate) fn to_u64(value: U256) -> Option<u64> {
	if value > U256::from(u64::MAX) {
		None
	} else {
		Some(value.low_u64())
	}
}

/// Convert a 256-bit word to a 32-byte hash.
#[inline]
pub(crate) fn u256_to_h256(value: U256) -> H256 {
	let mut bytes = [0u8; 32];
	value.to_big_endian(&mut bytes);
	H256(bytes)
}

/// Convert a 32-byte hash to a 256-bit word.
#[inline]
pub(crate) fn h256_to_u256(value: H256) -> U256 {
	U256::from_big_endian(value.as_bytes())
}

/// Truncate a 256-bit word to an address (the low 160 bits).
#[inline]
pub(crate) fn u256_to_address(value: U256) -> H160 {
	let mut bytes = [0u8; 32];
	value.to_big_endian(&mut bytes);
	H160::from_slice(&bytes[12..])
}

/// Zero-extend an address to a 256-bit word.
#[inline]
pub(crate) fn address_to_u256(address: H160) -> U256 {
	U256::from_big_endian(address.as_bytes())
}

// Signed instructions reinterpret stack words as two's-complement. Rather
// than unpacking into a sign-and-magnitude pair, the helpers below work on
// the raw words: the sign is bit 255, negation is complement-plus-one, and
// same-sign words compare the same way signed and unsigned.

/// Whether the word is negative as a two's-complement integer.
#[inline]
pub(crate) fn is_negative(value: U256) -> bool {
	value.bit(255)
}

/// Two's-complement negation, wrapping on the minimum value.
#[inline]
pub(crate) fn twos_negate(value: U256) -> U256 {
	(!value).overflowing_add(U256::one()).0
}

/// Magnitude of a two's-complement word. The minimum value has no positive
/// counterpart and maps to itself.
#[inline]
pub(crate) fn magnitude(value: U256) -> U256 {
	if is_negative(value) {
		twos_negate(value)
	} else {
		value
	}
}

/// Two's-complement `a < b`.
#[inline]
pub(crate) fn signed_lt(a: U256, b: U256) -> bool {
	match (is_negative(a), is_negative(b)) {
		(true, false) => true,
		(false, true) => false,
		_ => a < b,
	}
}
