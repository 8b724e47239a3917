use thiserror::Error;

use crate::{opcode::Opcode, revision::Revision};

/// Reason a contract execution terminated with a failed status.
///
/// Any of these ends the current call with all remaining gas consumed; the
/// surrounding processor rolls the world state back to its pre-call snapshot.
/// An explicit `REVERT` is not a failure and is not represented here.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Failure {
	/// A gas charge exceeded the remaining gas.
	#[error("out of gas")]
	OutOfGas,
	/// An instruction required more operands than the stack holds.
	#[error("stack underflow")]
	StackUnderflow,
	/// An instruction would grow the stack beyond its capacity.
	#[error("stack overflow")]
	StackOverflow,
	/// The byte is unassigned or not available in the current revision.
	#[error("invalid opcode {0}")]
	InvalidOpcode(Opcode),
	/// A `JUMP`/`JUMPI` target is not a valid `JUMPDEST`.
	#[error("invalid jump destination")]
	InvalidJump,
	/// A state-mutating instruction ran inside a static call frame.
	#[error("write protection")]
	WriteProtection,
}

/// Errors reported by the engine itself, before or instead of execution.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
	/// The requested revision is newer than the newest supported one.
	#[error("unsupported revision {0}")]
	UnsupportedRevision(Revision),
	/// The analysis cache was configured with a capacity of zero.
	#[error("analysis cache capacity must be positive")]
	InvalidCacheCapacity,
}
