use std::sync::Arc;

use log::trace;
use primitive_types::H160;

use crate::{
	analysis::JumpDestMap,
	error::Failure,
	etable::InstructionTable,
	eval::{arithmetic, bitwise, misc, system, system::CallScheme},
	gas::Gas,
	memory::Memory,
	opcode::Opcode,
	runtime::{Host, RunParams, RunResult},
	sha_cache::ShaCache,
	stack::Stack,
};

/// Execution state of an interpreter run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Status {
	/// Instructions are being processed.
	#[default]
	Running,
	/// Execution ended with `STOP` or by running off the end of the code.
	Stopped,
	/// Execution ended with `RETURN`.
	Returned,
	/// Execution ended with `REVERT`.
	Reverted,
	/// Execution ended with `SELFDESTRUCT`.
	SelfDestructed,
	/// Execution ended with an execution violation.
	Failed,
}

/// Execution environment of one call. It bundles the immutable call
/// parameters, the borrowed host, and the mutable machine state; a fresh
/// context is created for every contract execution.
pub(crate) struct Context<'a, H: Host + ?Sized> {
	pub params: &'a RunParams<'a>,
	pub host: &'a mut H,
	pub jumpdests: Arc<JumpDestMap>,
	pub sha_cache: Option<&'a ShaCache>,

	pub pc: i32,
	pub gas: Gas,
	pub refund: i64,
	pub stack: Stack,
	pub memory: Memory,
	pub status: Status,

	/// Result of the last nested call, and the final output once a
	/// `RETURN`/`REVERT` ends the frame.
	pub return_data: Vec<u8>,
}

impl<'a, H: Host + ?Sized> Context<'a, H> {
	pub(crate) fn new(
		params: &'a RunParams<'a>,
		host: &'a mut H,
		jumpdests: Arc<JumpDestMap>,
		sha_cache: Option<&'a ShaCache>,
	) -> Self {
		Self {
			gas: Gas::new(params.gas),
			pc: 0,
			refund: 0,
			stack: Stack::new(),
			memory: Memory::new(),
			status: Status::Running,
			return_data: Vec::new(),
			params,
			host,
			jumpdests,
			sha_cache,
		}
	}

	/// The account this frame executes as.
	#[inline]
	pub(crate) fn self_address(&self) -> H160 {
		self.params.recipient
	}

	/// Fail with a write-protection violation inside static frames.
	#[inline]
	pub(crate) fn ensure_not_static(&self) -> Result<(), Failure> {
		if self.params.is_static {
			Err(Failure::WriteProtection)
		} else {
			Ok(())
		}
	}
}

/// Run the context until it leaves the running state. Execution violations
/// are folded into the failed status.
pub(crate) fn execute<H: Host + ?Sized>(
	ctx: &mut Context<H>,
	table: &InstructionTable,
	one_step_only: bool,
) -> Status {
	match steps(ctx, table, one_step_only) {
		Ok(()) => ctx.status,
		Err(failure) => {
			trace!(target: "evm", "execution failed at pc {}: {}", ctx.pc, failure);
			ctx.status = Status::Failed;
			Status::Failed
		}
	}
}

/// The dispatch loop. If `one_step_only` is set, exactly one instruction is
/// processed before returning.
fn steps<H: Host + ?Sized>(
	ctx: &mut Context<H>,
	table: &InstructionTable,
	one_step_only: bool,
) -> Result<(), Failure> {
	while ctx.status == Status::Running {
		let Some(&byte) = ctx.params.code.get(ctx.pc as usize) else {
			ctx.status = Status::Stopped;
			return Ok(());
		};
		let op = Opcode(byte);

		let properties = table.get(op).ok_or(Failure::InvalidOpcode(op))?;

		// Stack boundaries are checked up front for every instruction, so
		// the handlers can rely on their operands being present.
		let depth = ctx.stack.len();
		if depth < properties.min_stack {
			return Err(Failure::StackUnderflow);
		}
		if depth > properties.max_stack {
			return Err(Failure::StackOverflow);
		}

		ctx.gas.consume(properties.gas)?;

		run_op(ctx, op)?;

		ctx.pc += 1;

		if one_step_only {
			return Ok(());
		}
	}
	Ok(())
}

fn run_op<H: Host + ?Sized>(ctx: &mut Context<H>, op: Opcode) -> Result<(), Failure> {
	match op {
		Opcode::STOP => misc::stop(ctx),
		Opcode::ADD => arithmetic::add(ctx),
		Opcode::MUL => arithmetic::mul(ctx),
		Opcode::SUB => arithmetic::sub(ctx),
		Opcode::DIV => arithmetic::div(ctx),
		Opcode::SDIV => arithmetic::sdiv(ctx),
		Opcode::MOD => arithmetic::rem(ctx),
		Opcode::SMOD => arithmetic::srem(ctx),
		Opcode::ADDMOD => arithmetic::addmod(ctx),
		Opcode::MULMOD => arithmetic::mulmod(ctx),
		Opcode::EXP => arithmetic::exp(ctx),
		Opcode::SIGNEXTEND => arithmetic::signextend(ctx),

		Opcode::LT => bitwise::lt(ctx),
		Opcode::GT => bitwise::gt(ctx),
		Opcode::SLT => bitwise::slt(ctx),
		Opcode::SGT => bitwise::sgt(ctx),
		Opcode::EQ => bitwise::eq(ctx),
		Opcode::ISZERO => bitwise::iszero(ctx),
		Opcode::AND => bitwise::and(ctx),
		Opcode::OR => bitwise::or(ctx),
		Opcode::XOR => bitwise::xor(ctx),
		Opcode::NOT => bitwise::not(ctx),
		Opcode::BYTE => bitwise::byte(ctx),
		Opcode::SHL => bitwise::shl(ctx),
		Opcode::SHR => bitwise::shr(ctx),
		Opcode::SAR => bitwise::sar(ctx),
		Opcode::CLZ => arithmetic::clz(ctx),

		Opcode::SHA3 => system::sha3(ctx),

		Opcode::ADDRESS => system::address(ctx),
		Opcode::BALANCE => system::balance(ctx),
		Opcode::ORIGIN => system::origin(ctx),
		Opcode::CALLER => system::caller(ctx),
		Opcode::CALLVALUE => system::callvalue(ctx),
		Opcode::CALLDATALOAD => misc::calldataload(ctx),
		Opcode::CALLDATASIZE => misc::calldatasize(ctx),
		Opcode::CALLDATACOPY => misc::calldatacopy(ctx),
		Opcode::CODESIZE => misc::codesize(ctx),
		Opcode::CODECOPY => misc::codecopy(ctx),
		Opcode::GASPRICE => system::gasprice(ctx),
		Opcode::EXTCODESIZE => system::extcodesize(ctx),
		Opcode::EXTCODECOPY => system::extcodecopy(ctx),
		Opcode::RETURNDATASIZE => misc::returndatasize(ctx),
		Opcode::RETURNDATACOPY => misc::returndatacopy(ctx),
		Opcode::EXTCODEHASH => system::extcodehash(ctx),

		Opcode::BLOCKHASH => system::blockhash(ctx),
		Opcode::COINBASE => system::coinbase(ctx),
		Opcode::TIMESTAMP => system::timestamp(ctx),
		Opcode::NUMBER => system::number(ctx),
		Opcode::PREVRANDAO => system::prevrandao(ctx),
		Opcode::GASLIMIT => system::gaslimit(ctx),
		Opcode::CHAINID => system::chainid(ctx),
		Opcode::SELFBALANCE => system::selfbalance(ctx),
		Opcode::BASEFEE => system::basefee(ctx),
		Opcode::BLOBHASH => system::blobhash(ctx),
		Opcode::BLOBBASEFEE => system::blobbasefee(ctx),

		Opcode::POP => misc::pop(ctx),
		Opcode::MLOAD => misc::mload(ctx),
		Opcode::MSTORE => misc::mstore(ctx),
		Opcode::MSTORE8 => misc::mstore8(ctx),
		Opcode::SLOAD => system::sload(ctx),
		Opcode::SSTORE => system::sstore(ctx),
		Opcode::JUMP => misc::jump(ctx),
		Opcode::JUMPI => misc::jumpi(ctx),
		Opcode::PC => misc::pc(ctx),
		Opcode::MSIZE => misc::msize(ctx),
		Opcode::GAS => misc::gas(ctx),
		Opcode::JUMPDEST => Ok(()),
		Opcode::TLOAD => system::tload(ctx),
		Opcode::TSTORE => system::tstore(ctx),
		Opcode::MCOPY => misc::mcopy(ctx),

		Opcode::PUSH0 => misc::push0(ctx),
		Opcode(byte @ 0x60..=0x7f) => misc::push(ctx, (byte - 0x5f) as usize),
		Opcode(byte @ 0x80..=0x8f) => misc::dup(ctx, (byte - 0x7f) as usize),
		Opcode(byte @ 0x90..=0x9f) => misc::swap(ctx, (byte - 0x8f) as usize),
		Opcode(byte @ 0xa0..=0xa4) => system::log(ctx, (byte - 0xa0) as usize),

		Opcode::CREATE => system::create(ctx, false),
		Opcode::CREATE2 => system::create(ctx, true),
		Opcode::CALL => system::call(ctx, CallScheme::Call),
		Opcode::CALLCODE => system::call(ctx, CallScheme::CallCode),
		Opcode::DELEGATECALL => system::call(ctx, CallScheme::DelegateCall),
		Opcode::STATICCALL => system::call(ctx, CallScheme::StaticCall),

		Opcode::RETURN => misc::ret(ctx),
		Opcode::REVERT => misc::revert(ctx),
		Opcode::SELFDESTRUCT => system::selfdestruct(ctx),

		other => Err(Failure::InvalidOpcode(other)),
	}
}

/// Translate a terminal status into the caller-visible result record.
pub(crate) fn into_result<H: Host + ?Sized>(status: Status, ctx: Context<H>) -> RunResult {
	match status {
		Status::Stopped | Status::SelfDestructed => RunResult {
			success: true,
			output: Vec::new(),
			gas_left: ctx.gas.left(),
			gas_refund: ctx.refund,
		},
		Status::Returned => RunResult {
			success: true,
			gas_left: ctx.gas.left(),
			gas_refund: ctx.refund,
			output: ctx.return_data,
		},
		Status::Reverted => RunResult {
			success: false,
			gas_left: ctx.gas.left(),
			gas_refund: 0,
			output: ctx.return_data,
		},
		Status::Failed | Status::Running => RunResult {
			success: false,
			output: Vec::new(),
			gas_left: 0,
			gas_refund: 0,
		},
	}
}
