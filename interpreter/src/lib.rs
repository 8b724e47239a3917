//! A revision-aware interpreter for EVM bytecode.
//!
//! The engine is long-lived and shared between calls: it owns the
//! jump-destination analysis cache, the optional keccak cache, and the
//! per-revision instruction tables. Each call builds a fresh execution
//! context around a borrowed [`Host`], runs the dispatch loop to a terminal
//! status, and marshals that status into a [`RunResult`].
//!
//! ```
//! use evm_interpreter::{Config, Interpreter, Revision, RunParams};
//! # use evm_interpreter::{AccessStatus, CallRequest, CallResponse, Host, StorageStatus};
//! # use primitive_types::{H160, H256, U256};
//! # struct NullHost;
//! # impl Host for NullHost {
//! #     fn account_exists(&self, _: H160) -> bool { false }
//! #     fn balance(&self, _: H160) -> U256 { U256::zero() }
//! #     fn set_balance(&mut self, _: H160, _: U256) {}
//! #     fn nonce(&self, _: H160) -> u64 { 0 }
//! #     fn set_nonce(&mut self, _: H160, _: u64) {}
//! #     fn code(&self, _: H160) -> Vec<u8> { Vec::new() }
//! #     fn code_hash(&self, _: H160) -> H256 { H256::zero() }
//! #     fn code_size(&self, _: H160) -> u64 { 0 }
//! #     fn set_code(&mut self, _: H160, _: Vec<u8>) {}
//! #     fn storage(&self, _: H160, _: H256) -> H256 { H256::zero() }
//! #     fn set_storage(&mut self, _: H160, _: H256, _: H256) -> StorageStatus { StorageStatus::Assigned }
//! #     fn committed_storage(&self, _: H160, _: H256) -> H256 { H256::zero() }
//! #     fn transient_storage(&self, _: H160, _: H256) -> H256 { H256::zero() }
//! #     fn set_transient_storage(&mut self, _: H160, _: H256, _: H256) {}
//! #     fn access_account(&mut self, _: H160) -> AccessStatus { AccessStatus::Warm }
//! #     fn access_storage(&mut self, _: H160, _: H256) -> AccessStatus { AccessStatus::Warm }
//! #     fn is_address_in_access_list(&self, _: H160) -> bool { false }
//! #     fn is_slot_in_access_list(&self, _: H160, _: H256) -> bool { false }
//! #     fn snapshot(&mut self) -> u64 { 0 }
//! #     fn restore_snapshot(&mut self, _: u64) {}
//! #     fn emit_log(&mut self, _: H160, _: &[H256], _: &[u8]) {}
//! #     fn self_destruct(&mut self, _: H160, _: H160) -> bool { false }
//! #     fn has_self_destructed(&self, _: H160) -> bool { false }
//! #     fn block_hash(&self, _: u64) -> H256 { H256::zero() }
//! #     fn call(&mut self, _: CallRequest) -> CallResponse { CallResponse::default() }
//! # }
//!
//! let engine = Interpreter::new(Config::default()).unwrap();
//! let params = RunParams {
//!     revision: Revision::CANCUN,
//!     code: &[0x60, 0x01, 0x60, 0x02, 0x01, 0x00], // PUSH1 1; PUSH1 2; ADD; STOP
//!     code_hash: None,
//!     gas: 100_000,
//!     input: &[],
//!     sender: H160::zero(),
//!     recipient: H160::zero(),
//!     value: U256::zero(),
//!     is_static: false,
//!     depth: 0,
//!     block: Default::default(),
//!     transaction: Default::default(),
//! };
//! let result = engine.run(&params, &mut NullHost).unwrap();
//! assert!(result.success);
//! ```

mod analysis;
mod error;
mod etable;
mod eval;
mod gas;
mod interpreter;
mod memory;
mod opcode;
mod revision;
mod runtime;
mod sha_cache;
mod stack;
mod step;
mod utils;

pub use crate::analysis::{AnalysisCache, JumpDestMap};
pub use crate::error::{Error, Failure};
pub use crate::etable::{InstructionTable, OpProperties};
pub use crate::gas::Gas;
pub use crate::interpreter::Status;
pub use crate::memory::Memory;
pub use crate::opcode::Opcode;
pub use crate::revision::Revision;
pub use crate::runtime::{
	AccessStatus, BlockContext, CallKind, CallRequest, CallResponse, Host, RunParams, RunResult,
	Snapshot, StorageStatus, TransactionContext,
};
pub use crate::sha_cache::{keccak256, ShaCache};
pub use crate::stack::{Stack, STACK_LIMIT};
pub use crate::step::{StepState, StepStatus};

use std::num::NonZeroUsize;
use std::sync::Arc;

use log::debug;
use primitive_types::H256;

use crate::interpreter::{execute, into_result, Context};

const SHA_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1 << 16) {
	Some(capacity) => capacity,
	None => panic!("capacity is non-zero"),
};

/// User-definable options of an [`Interpreter`].
#[derive(Clone, Debug)]
pub struct Config {
	/// Serve repeated `SHA3` inputs from a shared cache.
	pub with_sha_cache: bool,
	/// Cache jump-destination analyses by code hash.
	pub with_analysis_cache: bool,
	/// Capacity of the analysis cache, in entries.
	pub analysis_cache_capacity: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			with_sha_cache: true,
			with_analysis_cache: true,
			analysis_cache_capacity: 1 << 30,
		}
	}
}

/// The interpreter engine. One instance serves many calls, possibly from
/// many threads; the caches are its only shared mutable state.
pub struct Interpreter {
	analysis: Option<AnalysisCache>,
	sha_cache: Option<ShaCache>,
	tables: [InstructionTable; Revision::COUNT],
}

impl Interpreter {
	/// Create an engine with the given options.
	pub fn new(config: Config) -> Result<Self, Error> {
		let analysis = if config.with_analysis_cache {
			let capacity = NonZeroUsize::new(config.analysis_cache_capacity)
				.ok_or(Error::InvalidCacheCapacity)?;
			Some(AnalysisCache::new(capacity))
		} else {
			None
		};
		let sha_cache = config
			.with_sha_cache
			.then(|| ShaCache::new(SHA_CACHE_CAPACITY));
		let tables = core::array::from_fn(|i| InstructionTable::new(Revision(i as u8)));
		Ok(Self {
			analysis,
			sha_cache,
			tables,
		})
	}

	fn analyze(&self, code: &[u8], code_hash: Option<H256>) -> Arc<JumpDestMap> {
		match &self.analysis {
			Some(cache) => cache.analyze(code, code_hash),
			None => Arc::new(JumpDestMap::analyze(code)),
		}
	}

	/// Execute a contract call to completion.
	pub fn run<H: Host + ?Sized>(
		&self,
		params: &RunParams<'_>,
		host: &mut H,
	) -> Result<RunResult, Error> {
		if params.revision > Revision::NEWEST_SUPPORTED {
			debug!(target: "evm", "rejected execution under {}", params.revision);
			return Err(Error::UnsupportedRevision(params.revision));
		}

		// Don't bother with the execution if there's no code.
		if params.code.is_empty() {
			return Ok(RunResult {
				success: true,
				output: Vec::new(),
				gas_left: params.gas,
				gas_refund: 0,
			});
		}

		let jumpdests = self.analyze(params.code, params.code_hash);
		let table = &self.tables[params.revision.0 as usize];
		let mut ctx = Context::new(params, host, jumpdests, self.sha_cache.as_ref());
		let status = execute(&mut ctx, table, false);
		Ok(into_result(status, ctx))
	}

	/// Execute up to `num_steps` single instructions of an externally-held
	/// machine state and hand the state back. States that are not running
	/// are returned unchanged.
	pub fn step_n<H: Host + ?Sized>(
		&self,
		params: &RunParams<'_>,
		host: &mut H,
		mut state: StepState,
		num_steps: usize,
	) -> Result<StepState, Error> {
		if params.revision > Revision::NEWEST_SUPPORTED {
			return Err(Error::UnsupportedRevision(params.revision));
		}
		if state.status != Status::Running {
			return Ok(state);
		}

		let jumpdests = self.analyze(params.code, params.code_hash);
		let table = &self.tables[params.revision.0 as usize];
		let mut ctx = step::resume(params, host, jumpdests, self.sha_cache.as_ref(), &state);

		let mut status = Status::Running;
		for _ in 0..num_steps {
			if status != Status::Running {
				break;
			}
			status = execute(&mut ctx, table, true);
		}

		step::capture(&mut state, &ctx, status);
		Ok(state)
	}
}
