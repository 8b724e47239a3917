use std::{num::NonZeroUsize, sync::Arc};

use lru::LruCache;
use parking_lot::Mutex;
use primitive_types::H256;

use crate::opcode::Opcode;

/// Mapping of valid jump destinations of one contract.
///
/// Bit `i` is set iff byte `i` of the code is `JUMPDEST` and not part of the
/// immediate data of a preceding push instruction. Computed by a single
/// left-to-right scan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JumpDestMap {
	bitmap: Vec<u64>,
	code_size: u64,
}

impl JumpDestMap {
	fn with_size(code_size: u64) -> Self {
		Self {
			bitmap: vec![0; (code_size / 64 + 1) as usize],
			code_size,
		}
	}

	/// Scan `code` and mark every valid jump destination.
	#[must_use]
	pub fn analyze(code: &[u8]) -> Self {
		let mut map = Self::with_size(code.len() as u64);
		let mut i = 0;
		while i < code.len() {
			let opcode = Opcode(code[i]);
			if let Some(data_size) = opcode.is_push() {
				// Skip the pushed data, whatever its bytes are.
				i += data_size as usize + 1;
			} else {
				if opcode == Opcode::JUMPDEST {
					map.mark(i as u64);
				}
				i += 1;
			}
		}
		map
	}

	/// Returns `true` if `index` is a valid jump destination. Positions at or
	/// beyond the end of the code are not.
	#[must_use]
	pub fn is_jump_dest(&self, index: u64) -> bool {
		if index >= self.code_size {
			return false;
		}
		let (word, mask) = index_and_mask(index);
		self.bitmap[word] & mask != 0
	}

	fn mark(&mut self, index: u64) {
		if index >= self.code_size {
			return;
		}
		let (word, mask) = index_and_mask(index);
		self.bitmap[word] |= mask;
	}
}

fn index_and_mask(index: u64) -> (usize, u64) {
	((index / 64) as usize, 1 << (index % 64))
}

/// Shared cache of jump-destination maps, keyed by code hash.
///
/// The cache is engine-wide: concurrent calls look up and insert under an
/// internal lock, and a hit returns the same shared map that was inserted.
pub struct AnalysisCache {
	cache: Mutex<LruCache<H256, Arc<JumpDestMap>>>,
}

impl AnalysisCache {
	/// Create a cache holding up to `capacity` analyses.
	#[must_use]
	pub fn new(capacity: NonZeroUsize) -> Self {
		Self {
			cache: Mutex::new(LruCache::new(capacity)),
		}
	}

	/// Return the jump-destination map for `code`, computing and caching it
	/// under `code_hash` on a miss. Without a hash the result is computed
	/// fresh and not cached.
	#[must_use]
	pub fn analyze(&self, code: &[u8], code_hash: Option<H256>) -> Arc<JumpDestMap> {
		let Some(hash) = code_hash else {
			return Arc::new(JumpDestMap::analyze(code));
		};

		let mut cache = self.cache.lock();
		if let Some(found) = cache.get(&hash) {
			return found.clone();
		}

		let map = Arc::new(JumpDestMap::analyze(code));
		cache.put(hash, map.clone());
		map
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_map_is_non_empty() {
		let map = JumpDestMap::with_size(10);
		assert_eq!(map.code_size, 10);
		assert!(!map.bitmap.is_empty());
	}

	#[test]
	fn mark_and_query_across_word_boundaries() {
		let mut map = JumpDestMap::with_size(100);
		map.mark(2);
		map.mark(65);
		for i in 0..100 {
			assert_eq!(map.is_jump_dest(i), i == 2 || i == 65, "index {i}");
		}
	}

	#[test]
	fn marks_jump_dest_at_correct_index() {
		let code = [
			Opcode::JUMPDEST.as_u8(),
			Opcode::PUSH1.as_u8(),
			Opcode::JUMPDEST.as_u8(),
			Opcode::JUMPDEST.as_u8(),
		];
		let map = JumpDestMap::analyze(&code);
		assert!(map.is_jump_dest(0));
		assert!(!map.is_jump_dest(1));
		assert!(!map.is_jump_dest(2));
		assert!(map.is_jump_dest(3));
	}

	#[test]
	fn push_data_is_skipped() {
		let jd = Opcode::JUMPDEST.as_u8();
		let code = [
			Opcode(0x68).as_u8(), // PUSH9
			jd, jd, jd, jd, jd, jd, jd, jd, jd,
			jd,
			Opcode::PUSH2.as_u8(), jd, jd,
			jd,
		];
		let map = JumpDestMap::analyze(&code);
		for i in 0..code.len() as u64 {
			assert_eq!(map.is_jump_dest(i), i == 10 || i == 14, "index {i}");
		}
	}

	#[test]
	fn out_of_range_is_never_a_destination() {
		let map = JumpDestMap::analyze(&[Opcode::JUMPDEST.as_u8()]);
		assert!(map.is_jump_dest(0));
		assert!(!map.is_jump_dest(1));
		assert!(!map.is_jump_dest(1_000_000));
	}

	#[test]
	fn results_are_cached_by_code_hash() {
		let cache = AnalysisCache::new(NonZeroUsize::new(4).unwrap());
		let code = [Opcode::STOP.as_u8()];
		let hash = H256::repeat_byte(1);

		let want = cache.analyze(&code, Some(hash));
		let got = cache.analyze(&code, Some(hash));
		assert!(Arc::ptr_eq(&want, &got), "cached analysis not returned");
	}

	#[test]
	fn missing_hash_skips_the_cache() {
		let cache = AnalysisCache::new(NonZeroUsize::new(4).unwrap());
		let code = [Opcode::JUMPDEST.as_u8()];

		let first = cache.analyze(&code, None);
		let second = cache.analyze(&code, None);
		assert!(!Arc::ptr_eq(&first, &second));
		assert_eq!(first, second);
	}

	#[test]
	fn capacity_is_enforced_lru() {
		let cache = AnalysisCache::new(NonZeroUsize::new(1).unwrap());
		let code = [Opcode::JUMPDEST.as_u8()];

		let first = cache.analyze(&code, Some(H256::repeat_byte(1)));
		let _evicts = cache.analyze(&code, Some(H256::repeat_byte(2)));
		let again = cache.analyze(&code, Some(H256::repeat_byte(1)));
		assert!(!Arc::ptr_eq(&first, &again), "evicted entry was returned");
	}
}
