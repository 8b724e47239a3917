use primitive_types::{U256, U512};

use crate::{
	error::Failure,
	interpreter::Context,
	runtime::Host,
	utils::{is_negative, magnitude, twos_negate},
};

pub(crate) fn add<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b] = ctx.stack.pop()?;
	ctx.stack.push(a.overflowing_add(b).0)
}

pub(crate) fn mul<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b] = ctx.stack.pop()?;
	ctx.stack.push(a.overflowing_mul(b).0)
}

pub(crate) fn sub<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b] = ctx.stack.pop()?;
	ctx.stack.push(a.overflowing_sub(b).0)
}

pub(crate) fn div<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b] = ctx.stack.pop()?;
	ctx.stack.push(wrapping_div(a, b))
}

pub(crate) fn sdiv<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b] = ctx.stack.pop()?;
	ctx.stack.push(signed_div(a, b))
}

pub(crate) fn rem<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b] = ctx.stack.pop()?;
	ctx.stack.push(wrapping_rem(a, b))
}

pub(crate) fn srem<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b] = ctx.stack.pop()?;
	ctx.stack.push(signed_rem(a, b))
}

pub(crate) fn addmod<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b, m] = ctx.stack.pop()?;
	ctx.stack.push(wide_addmod(a, b, m))
}

pub(crate) fn mulmod<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [a, b, m] = ctx.stack.pop()?;
	ctx.stack.push(wide_mulmod(a, b, m))
}

pub(crate) fn exp<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [base, power] = ctx.stack.pop()?;
	// Spurious Dragon pricing: 50 per byte of the exponent.
	let byte_len = (power.bits() as u64).div_ceil(8);
	ctx.gas.consume(50 * byte_len as i64)?;
	ctx.stack.push(wrapping_exp(base, power))
}

pub(crate) fn signextend<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [index, value] = ctx.stack.pop()?;
	ctx.stack.push(sign_extend(index, value))
}

pub(crate) fn clz<H: Host + ?Sized>(ctx: &mut Context<H>) -> Result<(), Failure> {
	let [value] = ctx.stack.pop()?;
	ctx.stack.push(U256::from(value.leading_zeros()))
}

#[inline]
fn wrapping_div(a: U256, b: U256) -> U256 {
	if b.is_zero() {
		U256::zero()
	} else {
		a / b
	}
}

#[inline]
fn wrapping_rem(a: U256, b: U256) -> U256 {
	if b.is_zero() {
		U256::zero()
	} else {
		a % b
	}
}

// Signed division works on magnitudes and re-applies the sign afterwards,
// which truncates toward zero as the instruction requires. MIN / -1 wraps
// back to MIN through the negation.
#[inline]
fn signed_div(a: U256, b: U256) -> U256 {
	if b.is_zero() {
		return U256::zero();
	}
	let quotient = magnitude(a) / magnitude(b);
	if is_negative(a) != is_negative(b) {
		twos_negate(quotient)
	} else {
		quotient
	}
}

// The remainder takes the sign of the dividend.
#[inline]
fn signed_rem(a: U256, b: U256) -> U256 {
	if b.is_zero() {
		return U256::zero();
	}
	let remainder = magnitude(a) % magnitude(b);
	if is_negative(a) {
		twos_negate(remainder)
	} else {
		remainder
	}
}

fn wide_addmod(a: U256, b: U256, m: U256) -> U256 {
	if m.is_zero() {
		return U256::zero();
	}
	let r = (U512::from(a) + U512::from(b)) % U512::from(m);
	low_half(r)
}

fn wide_mulmod(a: U256, b: U256, m: U256) -> U256 {
	if m.is_zero() {
		return U256::zero();
	}
	let r = (U512::from(a) * U512::from(b)) % U512::from(m);
	low_half(r)
}

// The remainder is below a 256-bit modulus, so the high half is zero.
fn low_half(value: U512) -> U256 {
	let mut bytes = [0u8; 64];
	value.to_big_endian(&mut bytes);
	U256::from_big_endian(&bytes[32..])
}

fn wrapping_exp(mut base: U256, mut power: U256) -> U256 {
	let mut result = U256::one();
	while !power.is_zero() {
		if !(power & U256::one()).is_zero() {
			result = result.overflowing_mul(base).0;
		}
		power >>= 1;
		base = base.overflowing_mul(base).0;
	}
	result
}

fn sign_extend(index: U256, value: U256) -> U256 {
	if index >= U256::from(31) {
		return value;
	}
	let bit = index.low_u64() as usize * 8 + 7;
	let mask = (U256::one() << (bit + 1)) - U256::one();
	if value.bit(bit) {
		value | !mask
	} else {
		value & mask
	}
}
