use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use primitive_types::H256;
use sha3::{Digest, Keccak256};

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> H256 {
	H256::from_slice(Keccak256::digest(data).as_slice())
}

// Solidity mapping and dynamic-array slot computations hash 32- or 64-byte
// preimages over and over; only those sizes are worth remembering.
const CACHED_INPUT_SIZES: [usize; 2] = [32, 64];

/// Engine-wide cache of keccak results for the hot input sizes.
pub struct ShaCache {
	cache: Mutex<LruCache<Vec<u8>, H256>>,
}

impl ShaCache {
	pub(crate) fn new(capacity: NonZeroUsize) -> Self {
		Self {
			cache: Mutex::new(LruCache::new(capacity)),
		}
	}

	/// Hash `data`, serving repeated cacheable inputs from the cache.
	#[must_use]
	pub fn hash(&self, data: &[u8]) -> H256 {
		if !CACHED_INPUT_SIZES.contains(&data.len()) {
			return keccak256(data);
		}

		let mut cache = self.cache.lock();
		if let Some(hash) = cache.get(data) {
			return *hash;
		}
		let hash = keccak256(data);
		cache.put(data.to_vec(), hash);
		hash
	}
}
