use crate::{opcode::Opcode, revision::Revision, stack::STACK_LIMIT};

/// Static properties of one opcode under one revision: the gas charged
/// before its handler runs and the stack bounds the dispatch loop enforces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OpProperties {
	/// Static gas cost. Dynamic parts are charged inside the handlers.
	pub gas: i64,
	/// Minimum stack depth required before the instruction.
	pub min_stack: usize,
	/// Maximum stack depth allowed before the instruction.
	pub max_stack: usize,
}

/// Per-revision table of opcode properties. `None` marks bytes that are
/// unassigned or not yet available in the revision.
pub struct InstructionTable([Option<OpProperties>; 256]);

impl InstructionTable {
	/// Build the table for `revision`.
	#[must_use]
	pub fn new(revision: Revision) -> Self {
		let mut table = [None; 256];
		for (byte, entry) in table.iter_mut().enumerate() {
			*entry = op_info(Opcode(byte as u8), revision).map(|(gas, pops, pushes)| {
				OpProperties {
					gas,
					min_stack: pops as usize,
					max_stack: STACK_LIMIT - (pushes.saturating_sub(pops)) as usize,
				}
			});
		}
		Self(table)
	}

	/// Properties of `opcode`, or `None` if it cannot be executed.
	#[inline]
	#[must_use]
	pub fn get(&self, opcode: Opcode) -> Option<OpProperties> {
		self.0[opcode.as_usize()]
	}
}

/// Static gas and stack usage `(gas, pops, pushes)` of `op` under `revision`.
#[allow(clippy::match_same_arms)]
fn op_info(op: Opcode, revision: Revision) -> Option<(i64, u8, u8)> {
	// Berlin moves account and storage access costs into the cold/warm
	// scheme charged by the handlers; before that they are flat.
	let account_access = if revision < Revision::BERLIN { 700 } else { 0 };

	let info = match op {
		Opcode::STOP => (0, 0, 0),
		Opcode::ADD | Opcode::SUB => (3, 2, 1),
		Opcode::MUL | Opcode::DIV | Opcode::SDIV | Opcode::MOD | Opcode::SMOD => (5, 2, 1),
		Opcode::ADDMOD | Opcode::MULMOD => (8, 3, 1),
		Opcode::EXP => (10, 2, 1),
		Opcode::SIGNEXTEND => (5, 2, 1),

		Opcode::LT | Opcode::GT | Opcode::SLT | Opcode::SGT | Opcode::EQ => (3, 2, 1),
		Opcode::ISZERO | Opcode::NOT => (3, 1, 1),
		Opcode::AND | Opcode::OR | Opcode::XOR | Opcode::BYTE => (3, 2, 1),
		Opcode::SHL | Opcode::SHR | Opcode::SAR => (3, 2, 1),
		Opcode::CLZ if revision >= Revision::OSAKA => (5, 1, 1),

		Opcode::SHA3 => (30, 2, 1),

		Opcode::ADDRESS
		| Opcode::ORIGIN
		| Opcode::CALLER
		| Opcode::CALLVALUE
		| Opcode::CALLDATASIZE
		| Opcode::CODESIZE
		| Opcode::GASPRICE
		| Opcode::RETURNDATASIZE
		| Opcode::COINBASE
		| Opcode::TIMESTAMP
		| Opcode::NUMBER
		| Opcode::PREVRANDAO
		| Opcode::GASLIMIT
		| Opcode::CHAINID => (2, 0, 1),
		Opcode::SELFBALANCE => (5, 0, 1),
		Opcode::BASEFEE if revision >= Revision::LONDON => (2, 0, 1),
		Opcode::BLOBHASH if revision >= Revision::CANCUN => (3, 1, 1),
		Opcode::BLOBBASEFEE if revision >= Revision::CANCUN => (2, 0, 1),

		Opcode::BALANCE => (account_access, 1, 1),
		Opcode::CALLDATALOAD => (3, 1, 1),
		Opcode::CALLDATACOPY | Opcode::CODECOPY | Opcode::RETURNDATACOPY => (3, 3, 0),
		Opcode::EXTCODESIZE | Opcode::EXTCODEHASH => (account_access, 1, 1),
		Opcode::EXTCODECOPY => (account_access, 4, 0),
		Opcode::BLOCKHASH => (20, 1, 1),

		Opcode::POP => (2, 1, 0),
		Opcode::MLOAD => (3, 1, 1),
		Opcode::MSTORE | Opcode::MSTORE8 => (3, 2, 0),
		Opcode::SLOAD => (if revision < Revision::BERLIN { 800 } else { 0 }, 1, 1),
		Opcode::SSTORE => (0, 2, 0),
		Opcode::JUMP => (8, 1, 0),
		Opcode::JUMPI => (10, 2, 0),
		Opcode::PC | Opcode::MSIZE | Opcode::GAS => (2, 0, 1),
		Opcode::JUMPDEST => (1, 0, 0),
		Opcode::TLOAD if revision >= Revision::CANCUN => (100, 1, 1),
		Opcode::TSTORE if revision >= Revision::CANCUN => (100, 2, 0),
		Opcode::MCOPY if revision >= Revision::CANCUN => (3, 3, 0),

		Opcode::PUSH0 if revision >= Revision::SHANGHAI => (2, 0, 1),

		Opcode::CREATE => (32_000, 3, 1),
		Opcode::CALL | Opcode::CALLCODE => (account_access, 7, 1),
		Opcode::DELEGATECALL | Opcode::STATICCALL => (account_access, 6, 1),
		Opcode::CREATE2 => (32_000, 4, 1),
		Opcode::RETURN | Opcode::REVERT => (0, 2, 0),
		Opcode::SELFDESTRUCT => (5_000, 1, 0),

		_ if op.is_push().is_some() => (3, 0, 1),
		Opcode(byte @ 0x80..=0x8f) => {
			let n = byte - 0x80 + 1;
			(3, n, n + 1)
		}
		Opcode(byte @ 0x90..=0x9f) => {
			let n = byte - 0x90 + 1;
			(3, n + 1, n + 1)
		}
		Opcode(byte @ 0xa0..=0xa4) => {
			let n = byte - 0xa0;
			(375, 2 + n, 0)
		}

		_ => return None,
	};
	Some(info)
}
