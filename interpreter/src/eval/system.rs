use primitive_types::{H160, H256, U256};

use crate::{
	error::Failure,
	gas::words,
	interpreter::{Context, Status},
	revision::Revision,
	runtime::{AccessStatus, CallKind, CallRequest, Host, StorageStatus},
	sha_cache::keccak256,
	utils::{address_to_u256, h256_to_u256, to_u64, u256_to_address, u256_to_h256},
};

/// Message-call flavour of the `CALL` opcode family.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CallScheme {
	Call,
	CallCode,
	DelegateCall,
	StaticCall,
}

fn account_access_cost<H: Host + ?Sized>(
	ctx: &mut Context<H>,
	address: H160,
) -> Result<(), Failure> {
	if ctx.params.is_at_least(Revision::BERLIN) {
		let cost = match ctx.host.access_account(address) {
			AccessStatus::Cold => 2_600,
			AccessStatus::Warm => 100,
		};
		ctx.gas.consume(cost)?;
	}
	Ok(())
}

pub(crate) fn sha3<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [offset, len] = ctx.stack.pop()?;
	let len = to_u64(len).ok_or(Failure::OutOfGas)?;
	ctx.gas.consume(6 * words(len) as i64)?;
	let data = ctx.memory.slice_mut(offset, len, &mut ctx.gas)?;
	let hash = match ctx.sha_cache {
		Some(cache) => cache.hash(data),
		None => keccak256(data),
	};
	ctx.stack.push(h256_to_u256(hash))
}

pub(crate) fn address<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(address_to_u256(ctx.params.recipient))
}

pub(crate) fn origin<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(address_to_u256(ctx.params.transaction.origin))
}

pub(crate) fn caller<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(address_to_u256(ctx.params.sender))
}

pub(crate) fn callvalue<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(ctx.params.value)
}

pub(crate) fn gasprice<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(ctx.params.transaction.gas_price)
}

pub(crate) fn balance<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [addr] = ctx.stack.pop()?;
	let address = u256_to_address(addr);
	account_access_cost(ctx, address)?;
	ctx.stack.push(ctx.host.balance(address))
}

pub(crate) fn selfbalance<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let balance = ctx.host.balance(ctx.self_address());
	ctx.stack.push(balance)
}

pub(crate) fn extcodesize<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [addr] = ctx.stack.pop()?;
	let address = u256_to_address(addr);
	account_access_cost(ctx, address)?;
	ctx.stack.push(U256::from(ctx.host.code_size(address)))
}

pub(crate) fn extcodehash<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [addr] = ctx.stack.pop()?;
	let address = u256_to_address(addr);
	account_access_cost(ctx, address)?;
	ctx.stack.push(h256_to_u256(ctx.host.code_hash(address)))
}

pub(crate) fn extcodecopy<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [addr, dest_offset, code_offset, len] = ctx.stack.pop()?;
	let address = u256_to_address(addr);
	account_access_cost(ctx, address)?;

	let len = to_u64(len).ok_or(Failure::OutOfGas)?;
	if len == 0 {
		return Ok(());
	}
	ctx.gas.consume(3 * words(len) as i64)?;
	let code = ctx.host.code(address);
	let src = crate::eval::source_range(&code, code_offset, len);
	let dest = ctx.memory.slice_mut(dest_offset, len, &mut ctx.gas)?;
	crate::eval::copy_padded(dest, src);
	Ok(())
}

pub(crate) fn blockhash<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [number] = ctx.stack.pop()?;
	let hash = match to_u64(number) {
		Some(number) => ctx.host.block_hash(number),
		None => H256::zero(),
	};
	ctx.stack.push(h256_to_u256(hash))
}

pub(crate) fn coinbase<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(address_to_u256(ctx.params.block.coinbase))
}

pub(crate) fn timestamp<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.params.block.timestamp))
}

pub(crate) fn number<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.params.block.number))
}

/// `PREVRANDAO`; the same field carries the difficulty before Paris.
pub(crate) fn prevrandao<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(h256_to_u256(ctx.params.block.prev_randao))
}

pub(crate) fn gaslimit<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(U256::from(ctx.params.block.gas_limit))
}

pub(crate) fn chainid<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(ctx.params.block.chain_id)
}

pub(crate) fn basefee<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(ctx.params.block.base_fee)
}

pub(crate) fn blobbasefee<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.stack.push(ctx.params.block.blob_base_fee)
}

pub(crate) fn blobhash<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [index] = ctx.stack.pop()?;
	let hashes = &ctx.params.transaction.blob_hashes;
	let hash = to_u64(index)
		.and_then(|index| hashes.get(index as usize))
		.copied()
		.unwrap_or_default();
	ctx.stack.push(h256_to_u256(hash))
}

pub(crate) fn sload<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [key] = ctx.stack.pop()?;
	let key = u256_to_h256(key);
	let address = ctx.self_address();
	if ctx.params.is_at_least(Revision::BERLIN) {
		let cost = match ctx.host.access_storage(address, key) {
			AccessStatus::Cold => 2_100,
			AccessStatus::Warm => 100,
		};
		ctx.gas.consume(cost)?;
	}
	ctx.stack.push(h256_to_u256(ctx.host.storage(address, key)))
}

pub(crate) fn sstore<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.ensure_not_static()?;

	// EIP-2200 sentry: a frame about to run on fumes may not write.
	if ctx.gas.left() <= 2_300 {
		return Err(Failure::OutOfGas);
	}

	let [key, value] = ctx.stack.pop()?;
	let key = u256_to_h256(key);
	let value = u256_to_h256(value);
	let address = ctx.self_address();

	if ctx.params.is_at_least(Revision::BERLIN)
		&& ctx.host.access_storage(address, key) == AccessStatus::Cold
	{
		ctx.gas.consume(2_100)?;
	}

	// Net-metering constants per revision: warm write, reset, set, and the
	// restore / clear / added-then-deleted refunds.
	let (warm, reset, set, restore_refund, clear_refund, drop_refund) =
		if ctx.params.is_at_least(Revision::LONDON) {
			(100, 2_900, 20_000, 5_000 - 2_100 - 100, 4_800, 20_000 - 100)
		} else if ctx.params.is_at_least(Revision::BERLIN) {
			(100, 2_900, 20_000, 5_000 - 2_100 - 100, 15_000, 20_000 - 100)
		} else {
			(800, 5_000, 20_000, 4_200, 15_000, 19_200)
		};

	let status = ctx.host.set_storage(address, key, value);
	let (cost, refund_delta) = match status {
		StorageStatus::Assigned => (warm, 0),
		StorageStatus::Added => (set, 0),
		StorageStatus::Deleted => (reset, clear_refund),
		StorageStatus::Modified => (reset, 0),
		StorageStatus::DeletedAdded => (warm, -clear_refund),
		StorageStatus::ModifiedDeleted => (warm, clear_refund),
		StorageStatus::DeletedRestored => (warm, restore_refund - clear_refund),
		StorageStatus::AddedDeleted => (warm, drop_refund),
		StorageStatus::ModifiedRestored => (warm, restore_refund),
	};
	ctx.gas.consume(cost)?;
	ctx.refund += refund_delta;
	Ok(())
}

pub(crate) fn tload<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [key] = ctx.stack.pop()?;
	let value = ctx
		.host
		.transient_storage(ctx.self_address(), u256_to_h256(key));
	ctx.stack.push(h256_to_u256(value))
}

pub(crate) fn tstore<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.ensure_not_static()?;
	let [key, value] = ctx.stack.pop()?;
	ctx.host
		.set_transient_storage(ctx.self_address(), u256_to_h256(key), u256_to_h256(value));
	Ok(())
}

pub(crate) fn log<H: Host + ?Sized>(ctx: &mut Context<H>, n: usize) -> Result<(), Failure> {
	ctx.ensure_not_static()?;

	let [offset, len] = ctx.stack.pop()?;
	let len = to_u64(len).ok_or(Failure::OutOfGas)?;
	ctx.gas
		.consume_wide(375 * n as u128 + 8 * u128::from(len))?;

	let mut topics = [H256::zero(); 4];
	for topic in topics.iter_mut().take(n) {
		let [value] = ctx.stack.pop()?;
		*topic = u256_to_h256(value);
	}

	let address = ctx.self_address();
	let data = ctx.memory.slice_mut(offset, len, &mut ctx.gas)?;
	ctx.host.emit_log(address, &topics[..n], data);
	Ok(())
}

pub(crate) fn selfdestruct<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	ctx.ensure_not_static()?;

	let [beneficiary] = ctx.stack.pop()?;
	let beneficiary = u256_to_address(beneficiary);

	if ctx.params.is_at_least(Revision::BERLIN)
		&& ctx.host.access_account(beneficiary) == AccessStatus::Cold
	{
		ctx.gas.consume(2_600)?;
	}

	let address = ctx.self_address();
	if !ctx.host.balance(address).is_zero() && !ctx.host.account_exists(beneficiary) {
		ctx.gas.consume(25_000)?;
	}

	let destructed = ctx.host.self_destruct(address, beneficiary);
	// London removed the self-destruct refund.
	if ctx.params.revision <= Revision::BERLIN && destructed {
		ctx.refund += 24_000;
	}

	ctx.status = Status::SelfDestructed;
	Ok(())
}

pub(crate) fn call<H: Host + ?Sized>(
	ctx: &mut Context<H>,
	scheme: CallScheme,
) -> Result<(), Failure> {
	let has_value = matches!(scheme, CallScheme::Call | CallScheme::CallCode);

	let (gas_requested, addr, value, args_offset, args_len, ret_offset, ret_len) = if has_value {
		let [g, a, v, ao, al, ro, rl] = ctx.stack.pop()?;
		(g, a, v, ao, al, ro, rl)
	} else {
		let [g, a, ao, al, ro, rl] = ctx.stack.pop()?;
		(g, a, U256::zero(), ao, al, ro, rl)
	};
	let address = u256_to_address(addr);

	// Moving value is a state mutation; only plain CALL is restricted.
	if scheme == CallScheme::Call && !value.is_zero() {
		ctx.ensure_not_static()?;
	}

	account_access_cost(ctx, address)?;
	if !value.is_zero() {
		ctx.gas.consume(9_000)?;
		if scheme == CallScheme::Call && !ctx.host.account_exists(address) {
			ctx.gas.consume(25_000)?;
		}
	}

	let args_len = to_u64(args_len).ok_or(Failure::OutOfGas)?;
	let ret_len = to_u64(ret_len).ok_or(Failure::OutOfGas)?;
	// Expand for the output range now so its cost is charged before
	// forwarding; the bytes are written after the call returns.
	ctx.memory.slice_mut(ret_offset, ret_len, &mut ctx.gas)?;
	let input = ctx
		.memory
		.slice_mut(args_offset, args_len, &mut ctx.gas)?
		.to_vec();

	let left = ctx.gas.left();
	let limit = left - left / 64;
	let endowment = to_u64(gas_requested).unwrap_or(u64::MAX).min(limit as u64) as i64;
	let stipend = if value.is_zero() { 0 } else { 2_300 };
	ctx.gas.reclaim(stipend);

	if !value.is_zero() && value > ctx.host.balance(ctx.self_address()) {
		ctx.return_data.clear();
		return ctx.stack.push(U256::zero());
	}

	let (kind, recipient, sender, frame_value, is_static) = match scheme {
		CallScheme::Call => (
			CallKind::Call,
			address,
			ctx.self_address(),
			value,
			ctx.params.is_static,
		),
		CallScheme::CallCode => (
			CallKind::CallCode,
			ctx.self_address(),
			ctx.self_address(),
			value,
			ctx.params.is_static,
		),
		CallScheme::DelegateCall => (
			CallKind::DelegateCall,
			ctx.self_address(),
			ctx.params.sender,
			ctx.params.value,
			ctx.params.is_static,
		),
		CallScheme::StaticCall => (CallKind::StaticCall, address, ctx.self_address(), U256::zero(), true),
	};

	let response = ctx.host.call(CallRequest {
		kind,
		is_static,
		depth: ctx.params.depth + 1,
		gas: endowment + stipend,
		recipient,
		sender,
		input,
		value: frame_value,
		salt: H256::zero(),
		code_address: address,
	});

	ctx.return_data = response.output;
	let out = ctx.memory.slice_mut(ret_offset, ret_len, &mut ctx.gas)?;
	let copied = out.len().min(ctx.return_data.len());
	out[..copied].copy_from_slice(&ctx.return_data[..copied]);

	ctx.gas.reclaim(response.gas_left);
	ctx.gas.consume(endowment)?;
	ctx.gas.consume(stipend)?;
	ctx.refund += response.gas_refund;

	ctx.stack.push(if response.success {
		U256::one()
	} else {
		U256::zero()
	})
}

pub(crate) fn create<H: Host + ?Sized>(ctx: &mut Context<H>, create2: bool) -> Result<(), Failure> {
	ctx.ensure_not_static()?;

	let [value, offset, len] = ctx.stack.pop()?;
	let salt = if create2 {
		let [salt] = ctx.stack.pop()?;
		u256_to_h256(salt)
	} else {
		H256::zero()
	};
	let len = to_u64(len).ok_or(Failure::OutOfGas)?;

	if ctx.params.is_at_least(Revision::SHANGHAI) {
		const MAX_INIT_CODE_LEN: u64 = 2 * 24_576;
		if len > MAX_INIT_CODE_LEN {
			return Err(Failure::OutOfGas);
		}
		ctx.gas.consume(2 * words(len) as i64)?;
	}
	if create2 {
		ctx.gas.consume(6 * words(len) as i64)?;
	}

	let init_code = ctx.memory.slice_mut(offset, len, &mut ctx.gas)?.to_vec();

	if value > ctx.host.balance(ctx.self_address()) {
		ctx.return_data.clear();
		return ctx.stack.push(U256::zero());
	}

	let left = ctx.gas.left();
	let limit = left - left / 64;
	ctx.gas.consume(limit)?;

	let response = ctx.host.call(CallRequest {
		kind: if create2 {
			CallKind::Create2
		} else {
			CallKind::Create
		},
		is_static: false,
		depth: ctx.params.depth + 1,
		gas: limit,
		recipient: H160::zero(),
		sender: ctx.self_address(),
		input: init_code,
		value,
		salt,
		code_address: H160::zero(),
	});

	ctx.gas.reclaim(response.gas_left);
	ctx.refund += response.gas_refund;

	if response.success {
		ctx.return_data.clear();
		ctx.stack.push(address_to_u256(response.created_address))
	} else {
		ctx.return_data = response.output;
		ctx.stack.push(U256::zero())
	}
}
