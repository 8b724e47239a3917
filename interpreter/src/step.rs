use std::sync::Arc;

use primitive_types::U256;

use crate::{
	analysis::JumpDestMap,
	gas::Gas,
	interpreter::{Context, Status},
	memory::Memory,
	runtime::{Host, RunParams},
	sha_cache::ShaCache,
	stack::Stack,
};

/// Externally-held machine state for single-stepped execution.
///
/// The state mirrors what a driver needs to stop an execution between any
/// two instructions and resume it later: converting a running state into a
/// context and back without executing anything is the identity.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StepState {
	/// Execution state of the frame.
	pub status: StepStatus,
	/// Program counter; meaningful while the status is running.
	pub pc: u32,
	/// Gas remaining.
	pub gas: i64,
	/// Refund accrued so far.
	pub refund: i64,
	/// Stack values, bottom to top.
	pub stack: Vec<U256>,
	/// Memory contents; the driver keeps them word-aligned.
	pub memory: Vec<u8>,
	/// Result of the last nested call.
	pub last_call_return_data: Vec<u8>,
	/// Final output, set once the frame returns or reverts.
	pub output: Vec<u8>,
}

/// [`Status`] as visible to a single-step driver.
pub type StepStatus = Status;

/// Rebuild an execution context from a captured state.
pub(crate) fn resume<'a, H: Host + ?Sized>(
	params: &'a RunParams<'a>,
	host: &'a mut H,
	jumpdests: Arc<JumpDestMap>,
	sha_cache: Option<&'a ShaCache>,
	state: &StepState,
) -> Context<'a, H> {
	let mut ctx = Context::new(params, host, jumpdests, sha_cache);
	ctx.pc = state.pc as i32;
	ctx.gas = Gas::new(state.gas);
	ctx.refund = state.refund;
	ctx.stack = Stack::from_values(&state.stack);
	ctx.memory = Memory::from_bytes(&state.memory);
	ctx.return_data = state.last_call_return_data.clone();
	ctx
}

/// Capture the context back into the state after up to `n` steps.
pub(crate) fn capture<H: Host + ?Sized>(
	state: &mut StepState,
	ctx: &Context<H>,
	status: Status,
) {
	state.status = status;
	if status == Status::Running {
		state.pc = ctx.pc as u32;
	}
	state.gas = ctx.gas.left();
	state.refund = ctx.refund;
	state.stack = ctx.stack.as_slice().to_vec();
	state.memory = ctx.memory.as_bytes().to_vec();
	state.last_call_return_data = ctx.return_data.clone();
	if matches!(status, Status::Returned | Status::Reverted) {
		state.output = ctx.return_data.clone();
	}
}
