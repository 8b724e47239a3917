use primitive_types::{H160, H256, U256};

use crate::revision::Revision;

/// Opaque world-state snapshot identifier, handed out and consumed by the
/// host.
pub type Snapshot = u64;

/// Access-list state of an account or storage slot, as introduced in Berlin.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessStatus {
	/// First access within this transaction.
	Cold,
	/// Accessed before within this transaction.
	Warm,
}

/// Effect of a storage write, following the EIP-2200 state classification.
///
/// The variants are named `original → current → new`; the host derives the
/// status while applying the write, and the interpreter maps it to gas and
/// refund deltas.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageStatus {
	/// The write had no net effect (`X → Y → Y`, including dirty no-ops).
	Assigned,
	/// A fresh slot was set (`0 → 0 → Z`).
	Added,
	/// A live slot was cleared (`X → X → 0`).
	Deleted,
	/// A live slot was changed (`X → X → Z`).
	Modified,
	/// A slot deleted earlier in the transaction was set again (`X → 0 → Z`).
	DeletedAdded,
	/// A slot modified earlier in the transaction was cleared (`X → Y → 0`).
	ModifiedDeleted,
	/// A deleted slot was restored to its original value (`X → 0 → X`).
	DeletedRestored,
	/// A slot added earlier in the transaction was cleared (`0 → Y → 0`).
	AddedDeleted,
	/// A modified slot was restored to its original value (`X → Y → X`).
	ModifiedRestored,
}

impl StorageStatus {
	/// Classify a write from the committed value, the value before the
	/// write, and the value being written.
	#[must_use]
	pub fn from_values(original: H256, current: H256, new: H256) -> Self {
		if current == new {
			return Self::Assigned;
		}
		if original == current {
			return if original.is_zero() {
				Self::Added
			} else if new.is_zero() {
				Self::Deleted
			} else {
				Self::Modified
			};
		}
		// The slot is already dirty within this transaction.
		if current.is_zero() {
			return if new == original {
				Self::DeletedRestored
			} else {
				Self::DeletedAdded
			};
		}
		if new.is_zero() {
			return if original.is_zero() {
				Self::AddedDeleted
			} else {
				Self::ModifiedDeleted
			};
		}
		if new == original {
			return Self::ModifiedRestored;
		}
		Self::Assigned
	}
}

/// Kind of a nested execution requested through [`Host::call`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallKind {
	/// `CALL`
	Call,
	/// `CALLCODE`
	CallCode,
	/// `DELEGATECALL`
	DelegateCall,
	/// `STATICCALL`
	StaticCall,
	/// `CREATE`
	Create,
	/// `CREATE2`
	Create2,
}

/// A nested call or create, handed to the host for execution.
#[derive(Clone, Debug)]
pub struct CallRequest {
	/// Kind of the nested frame.
	pub kind: CallKind,
	/// Whether the nested frame runs without state-mutation rights.
	pub is_static: bool,
	/// Frame depth of the nested execution.
	pub depth: u32,
	/// Gas forwarded to the nested frame.
	pub gas: i64,
	/// Account whose storage and balance the frame operates on.
	pub recipient: H160,
	/// Caller visible to the nested frame.
	pub sender: H160,
	/// Input bytes.
	pub input: Vec<u8>,
	/// Value transferred, or the apparent value for `DELEGATECALL`.
	pub value: U256,
	/// `CREATE2` salt; zero otherwise.
	pub salt: H256,
	/// Account providing the code to run. Differs from `recipient` for
	/// `CALLCODE` and `DELEGATECALL`.
	pub code_address: H160,
}

/// Outcome of a nested execution.
#[derive(Clone, Debug, Default)]
pub struct CallResponse {
	/// Whether the nested frame succeeded.
	pub success: bool,
	/// Returned or revert data.
	pub output: Vec<u8>,
	/// Gas left over in the nested frame, returned to the caller.
	pub gas_left: i64,
	/// Refund accrued by the nested frame.
	pub gas_refund: i64,
	/// Address of the created contract, for successful creates.
	pub created_address: H160,
}

/// World-state capabilities the interpreter borrows for the duration of one
/// call. A single object exposes account state, storage, access lists,
/// snapshots, logs, self-destruct bookkeeping, block hashes and nested
/// execution; the interpreter never retains it across calls.
pub trait Host {
	/// Whether an account exists.
	fn account_exists(&self, address: H160) -> bool;
	/// Balance of an account.
	fn balance(&self, address: H160) -> U256;
	/// Overwrite the balance of an account.
	fn set_balance(&mut self, address: H160, balance: U256);
	/// Nonce of an account.
	fn nonce(&self, address: H160) -> u64;
	/// Overwrite the nonce of an account.
	fn set_nonce(&mut self, address: H160, nonce: u64);
	/// Code of an account.
	fn code(&self, address: H160) -> Vec<u8>;
	/// Code hash of an account.
	fn code_hash(&self, address: H160) -> H256;
	/// Code size of an account.
	fn code_size(&self, address: H160) -> u64;
	/// Overwrite the code of an account.
	fn set_code(&mut self, address: H160, code: Vec<u8>);

	/// Current value of a storage slot.
	fn storage(&self, address: H160, key: H256) -> H256;
	/// Write a storage slot, reporting the EIP-2200 classification of the
	/// write.
	fn set_storage(&mut self, address: H160, key: H256, value: H256) -> StorageStatus;
	/// Value of a storage slot as of the start of the transaction.
	fn committed_storage(&self, address: H160, key: H256) -> H256;
	/// Current value of a transient storage slot.
	fn transient_storage(&self, address: H160, key: H256) -> H256;
	/// Write a transient storage slot.
	fn set_transient_storage(&mut self, address: H160, key: H256, value: H256);

	/// Touch an account, returning its previous access-list state.
	fn access_account(&mut self, address: H160) -> AccessStatus;
	/// Touch a storage slot, returning its previous access-list state.
	fn access_storage(&mut self, address: H160, key: H256) -> AccessStatus;
	/// Whether the address is warm without touching it.
	fn is_address_in_access_list(&self, address: H160) -> bool;
	/// Whether the slot is warm without touching it.
	fn is_slot_in_access_list(&self, address: H160, key: H256) -> bool;

	/// Capture the world state for a later rollback.
	fn snapshot(&mut self) -> Snapshot;
	/// Roll the world state back to `snapshot`.
	fn restore_snapshot(&mut self, snapshot: Snapshot);

	/// Emit a log record owned by `address`.
	fn emit_log(&mut self, address: H160, topics: &[H256], data: &[u8]);

	/// Mark `address` for destruction, sweeping its balance to
	/// `beneficiary`. Returns `true` the first time the account is marked
	/// within this transaction.
	fn self_destruct(&mut self, address: H160, beneficiary: H160) -> bool;
	/// Whether `address` was marked for destruction in this transaction.
	fn has_self_destructed(&self, address: H160) -> bool;

	/// Hash of a recent block, or zero if `number` is out of range.
	fn block_hash(&self, number: u64) -> H256;

	/// Run a nested call or create on behalf of the current frame. The host
	/// recurses into the surrounding processor, which enforces the depth
	/// limit and value transfer rules.
	fn call(&mut self, request: CallRequest) -> CallResponse;
}

/// Block-level execution environment.
#[derive(Clone, Debug, Default)]
pub struct BlockContext {
	/// Block number.
	pub number: u64,
	/// Block timestamp in seconds.
	pub timestamp: u64,
	/// Beneficiary of the block rewards and fees.
	pub coinbase: H160,
	/// Block gas limit.
	pub gas_limit: u64,
	/// Randomness beacon value; carries the difficulty before Paris.
	pub prev_randao: H256,
	/// Base fee per gas, London onwards.
	pub base_fee: U256,
	/// Blob base fee per gas, Cancun onwards.
	pub blob_base_fee: U256,
	/// Chain identifier.
	pub chain_id: U256,
}

/// Transaction-level execution environment.
#[derive(Clone, Debug, Default)]
pub struct TransactionContext {
	/// Sender of the outermost transaction.
	pub origin: H160,
	/// Effective gas price of the transaction.
	pub gas_price: U256,
	/// Versioned hashes of the transaction's blobs, Cancun onwards.
	pub blob_hashes: Vec<H256>,
}

/// Parameters of one interpreter call.
#[derive(Clone, Debug)]
pub struct RunParams<'a> {
	/// Protocol revision to execute under.
	pub revision: Revision,
	/// Contract code. Borrowed for the duration of the call, never copied.
	pub code: &'a [u8],
	/// Hash of `code`, if known; enables the analysis cache.
	pub code_hash: Option<H256>,
	/// Gas budget.
	pub gas: i64,
	/// Call input bytes.
	pub input: &'a [u8],
	/// Caller of this frame.
	pub sender: H160,
	/// Account this frame executes as.
	pub recipient: H160,
	/// Value transferred with the call.
	pub value: U256,
	/// Whether this frame runs without state-mutation rights.
	pub is_static: bool,
	/// Depth of this frame; the processor enforces the limit.
	pub depth: u32,
	/// Block environment.
	pub block: BlockContext,
	/// Transaction environment.
	pub transaction: TransactionContext,
}

impl<'a> RunParams<'a> {
	/// Whether `revision` or a newer one is in effect.
	#[inline]
	#[must_use]
	pub fn is_at_least(&self, revision: Revision) -> bool {
		self.revision >= revision
	}
}

/// Result of one interpreter call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunResult {
	/// Whether the call succeeded. Reverts and failures both clear this;
	/// they differ in the gas they preserve.
	pub success: bool,
	/// Returned or revert data.
	pub output: Vec<u8>,
	/// Gas remaining after the call.
	pub gas_left: i64,
	/// Refund accrued by the call, applied by the processor afterwards.
	pub gas_refund: i64,
}
