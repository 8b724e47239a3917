//! Per-opcode handlers, grouped by category.
//!
//! The dispatch loop has already charged static gas and checked the stack
//! bounds when a handler runs; handlers charge dynamic costs, mutate the
//! execution context, and set a terminal status where applicable.

pub(crate) mod arithmetic;
pub(crate) mod bitwise;
pub(crate) mod misc;
pub(crate) mod system;

/// Fill `dest` from `src`, zero-padding the tail.
pub(crate) fn copy_padded(dest: &mut [u8], src: &[u8]) {
	dest[..src.len()].copy_from_slice(src);
	dest[src.len()..].fill(0);
}

/// The in-range part of `data[offset..offset + len]`; empty when the offset
/// is past the end.
pub(crate) fn source_range(data: &[u8], offset: primitive_types::U256, len: u64) -> &[u8] {
	let Some(offset) = crate::utils::to_u64(offset) else {
		return &[];
	};
	let offset = offset.min(data.len() as u64) as usize;
	let end = (offset as u64).saturating_add(len).min(data.len() as u64) as usize;
	&data[offset..end]
}
