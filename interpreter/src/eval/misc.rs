use primitive_types::U256;

use crate::{
	error::Failure,
	eval::{copy_padded, source_range},
	gas::words,
	interpreter::{Context, Status},
	runtime::Host,
	utils::to_u64,
};

pub(crate) fn stop<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.status = Status::Stopped;
	Ok(())
}

pub(crate) fn pop<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [_] = ctx.stack.pop()?;
	Ok(())
}

pub(crate) fn push0<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::zero())
}

/// `PUSHn`. Immediate bytes past the end of the code read as zero.
pub(crate) fn push<H: Host + ?Sized>(ctx: &mut Context<H>, n: usize) -> Result<(), Failure> {
	let code = ctx.params.code;
	let position = ctx.pc as usize;
	let start = (position + 1).min(code.len());
	let end = (position + 1 + n).min(code.len());
	let slice = &code[start..end];

	let mut bytes = [0u8; 32];
	bytes[32 - n..32 - n + slice.len()].copy_from_slice(slice);
	ctx.stack.push(U256::from_big_endian(&bytes))?;

	// Skip the immediate data; the loop advances past the opcode itself.
	ctx.pc += n as i32;
	Ok(())
}

pub(crate) fn dup<H: Host + ?Sized>(ctx: &mut Context<H>, n: usize) -> Result<(), Failure> {
	ctx.stack.dup(n)
}

pub(crate) fn swap<H: Host + ?Sized>(ctx: &mut Context<H>, n: usize) -> Result<(), Failure> {
	ctx.stack.swap(n)
}

pub(crate) fn jump<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [dest] = ctx.stack.pop()?;
	jump_to(ctx, dest)
}

pub(crate) fn jumpi<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [dest, condition] = ctx.stack.pop()?;
	if condition.is_zero() {
		return Ok(());
	}
	jump_to(ctx, dest)
}

fn jump_to<H: Host + ?Sized>(ctx: &mut Context<H>, dest: U256) -> Result<(), Failure> {
	let target = to_u64(dest).ok_or(Failure::InvalidJump)?;
	if !ctx.jumpdests.is_jump_dest(target) {
		return Err(Failure::InvalidJump);
	}
	// The loop increments past this instruction; the next fetch must read
	// the JUMPDEST byte itself.
	ctx.pc = target as i32 - 1;
	Ok(())
}

pub(crate) fn pc<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.pc as u64))
}

pub(crate) fn msize<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.memory.len()))
}

pub(crate) fn gas<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.gas.left() as u64))
}

pub(crate) fn mload<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [offset] = ctx.stack.pop()?;
	let value = ctx.memory.load_word(offset, &mut ctx.gas)?;
	ctx.stack.push(value)
}

pub(crate) fn mstore<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [offset, value] = ctx.stack.pop()?;
	ctx.memory.store_word(offset, value, &mut ctx.gas)
}

pub(crate) fn mstore8<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [offset, value] = ctx.stack.pop()?;
	ctx.memory.store_byte(offset, value.byte(0), &mut ctx.gas)
}

pub(crate) fn mcopy<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [dest_offset, src_offset, len] = ctx.stack.pop()?;
	let len = to_u64(len).ok_or(Failure::OutOfGas)?;
	if len == 0 {
		return Ok(());
	}
	ctx.gas.consume(3 * words(len) as i64)?;
	ctx.memory.copy_within(dest_offset, src_offset, len, &mut ctx.gas)
}

pub(crate) fn calldataload<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [offset] = ctx.stack.pop()?;
	let mut word = [0u8; 32];
	let src = source_range(ctx.params.input, offset, 32);
	word[..src.len()].copy_from_slice(src);
	ctx.stack.push(U256::from_big_endian(&word))
}

pub(crate) fn calldatasize<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.params.input.len()))
}

pub(crate) fn calldatacopy<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let data = ctx.params.input;
	data_copy(ctx, data)
}

pub(crate) fn codesize<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.params.code.len()))
}

pub(crate) fn codecopy<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let data = ctx.params.code;
	data_copy(ctx, data)
}

/// Bulk copy from an external byte source into memory, zero-padding reads
/// past the end of the source.
pub(crate) fn data_copy<H: Host + ?Sized>(
	ctx: &mut Context<H>,
	data: &[u8],
) -> Result<(), Failure> {
	let [dest_offset, data_offset, len] = ctx.stack.pop()?;
	let len = to_u64(len).ok_or(Failure::OutOfGas)?;
	if len == 0 {
		return Ok(());
	}
	ctx.gas.consume(3 * words(len) as i64)?;
	let src = source_range(data, data_offset, len);
	let dest = ctx.memory.slice_mut(dest_offset, len, &mut ctx.gas)?;
	copy_padded(dest, src);
	Ok(())
}

pub(crate) fn returndatasize<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.return_data.len()))
}

pub(crate) fn returndatacopy<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [dest_offset, data_offset, len] = ctx.stack.pop()?;
	let len = to_u64(len).ok_or(Failure::OutOfGas)?;
	let data_offset = to_u64(data_offset).ok_or(Failure::OutOfGas)?;
	let end = data_offset.checked_add(len).ok_or(Failure::OutOfGas)?;
	// Reading past the buffer is a hard failure, not a padded copy.
	if end > ctx.return_data.len() as u64 {
		return Err(Failure::OutOfGas);
	}
	if len == 0 {
		return Ok(());
	}
	ctx.gas.consume(3 * words(len) as i64)?;
	let dest = ctx.memory.slice_mut(dest_offset, len, &mut ctx.gas)?;
	dest.copy_from_slice(&ctx.return_data[data_offset as usize..end as usize]);
	Ok(())
}

pub(crate) fn ret<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	end_with_result(ctx, Status::Returned)
}

pub(crate) fn revert<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	end_with_result(ctx, Status::Reverted)
}

fn end_with_result<H: Host + ?Sized>(ctx: &mut Context<H>, status: Status) -> Result<(), Failure> {
	let [offset, len] = ctx.stack.pop()?;
	let len = to_u64(len).ok_or(Failure::OutOfGas)?;
	let data = ctx.memory.slice_mut(offset, len, &mut ctx.gas)?.to_vec();
	ctx.return_data = data;
	ctx.status = status;
	Ok(())
}
