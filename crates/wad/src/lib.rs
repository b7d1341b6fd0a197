//! Fixed-point arithmetic on `u128` values scaled by 10^18 (WAD).
//!
//! Every operation is checked: a result that does not fit in `u128`, a
//! negative difference or a zero divisor is reported as a [`MathError`].

#![no_std]

/// 1.0 in WAD representation
pub const WAD: u128 = 1_000_000_000_000_000_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MathError {
    Overflow,
    Underflow,
    DivisionByZero,
}

pub fn add(x: u128, y: u128) -> Result<u128, MathError> {
    x.checked_add(y).ok_or(MathError::Overflow)
}

pub fn sub(x: u128, y: u128) -> Result<u128, MathError> {
    x.checked_sub(y).ok_or(MathError::Underflow)
}

/// Fixed-point multiply
///
/// Formula: wmul(x, y) = x × y / WAD
///
/// Example:
/// - x: 0.5 (50% target percentage)
/// - y: 100 units of supply
/// - result: 50 units
pub fn wmul(x: u128, y: u128) -> Result<u128, MathError> {
    Ok(x.checked_mul(y).ok_or(MathError::Overflow)? / WAD)
}

/// Fixed-point multiply, rounded up
///
/// Formula: wmul_up(x, y) = ⌈x × y / WAD⌉
pub fn wmul_up(x: u128, y: u128) -> Result<u128, MathError> {
    let product = x.checked_mul(y).ok_or(MathError::Overflow)?;
    Ok(product / WAD + if product % WAD == 0 { 0 } else { 1 })
}

/// Fixed-point divide
///
/// Formula: wdiv(x, y) = x × WAD / y
///
/// Example:
/// - x: 5 units contributed
/// - y: 50 units available
/// - result: 0.1 (price per unit)
pub fn wdiv(x: u128, y: u128) -> Result<u128, MathError> {
    if y == 0 {
        return Err(MathError::DivisionByZero);
    }
    Ok(x.checked_mul(WAD).ok_or(MathError::Overflow)? / y)
}

/// Plain ratio `x × y / z`, floored
pub fn mul_div(x: u128, y: u128, z: u128) -> Result<u128, MathError> {
    if z == 0 {
        return Err(MathError::DivisionByZero);
    }
    Ok(x.checked_mul(y).ok_or(MathError::Overflow)? / z)
}

pub fn min(x: u128, y: u128) -> u128 {
    if x < y { x } else { y }
}

pub fn max(x: u128, y: u128) -> u128 {
    if x > y { x } else { y }
}
