// crates/furrow-economics/src/accrual.rs
//
// Per-share accumulator arithmetic.
//
// A pool's accumulator `acc_reward_per_share` is the cumulative reward earned
// by one unit of stake since the pool was created, scaled by PRECISION. The
// accrual for an interval is
//
//   emission(last, current] * alloc_weight / total_alloc_weight
//     * PRECISION / staked_supply
//
// All intermediate products are 256-bit and checked.

use primitive_types::U256;

use furrow_core::error::FurrowError;

use crate::emission::EmissionSchedule;

/// Fixed-point scale of per-share accumulators and reward debts (10^12).
pub const PRECISION: u128 = 1_000_000_000_000;

/// Pool state consumed by `accrual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualInput {
    /// The pool's current accumulator. Informational only: it never changes
    /// the computed delta.
    pub acc_reward_per_share: U256,
    pub last_update_index: u64,
    pub current_index: u64,
    pub alloc_weight: u64,
    pub total_alloc_weight: u64,
    pub staked_supply: u128,
}

/// Increment to add to a pool's accumulator for `(last_update_index, current_index]`.
///
/// The caller adds the result to its running accumulator.
///
/// # Errors
/// Returns `FurrowError::EmptyStakedSupply` if `staked_supply` is zero and
/// `FurrowError::ArithmeticOverflow` if a product leaves 256 bits.
pub fn accrual(schedule: &EmissionSchedule, input: &AccrualInput) -> Result<U256, FurrowError> {
    if input.staked_supply == 0 {
        return Err(FurrowError::EmptyStakedSupply);
    }
    // No weight anywhere means no pool is entitled to emission.
    if input.current_index <= input.last_update_index || input.total_alloc_weight == 0 {
        return Ok(U256::zero());
    }

    let emitted = schedule.emission_between(input.last_update_index, input.current_index)?;
    let pool_reward = emitted
        .checked_mul(U256::from(input.alloc_weight))
        .ok_or(FurrowError::ArithmeticOverflow("pool reward"))?
        / U256::from(input.total_alloc_weight);

    let scaled = pool_reward
        .checked_mul(U256::from(PRECISION))
        .ok_or(FurrowError::ArithmeticOverflow("reward per share"))?;
    Ok(scaled / U256::from(input.staked_supply))
}

/// `amount * acc_reward_per_share / PRECISION`: the reward a stake of
/// `amount` has earned against an accumulator.
pub fn accumulated_reward(amount: u128, acc_reward_per_share: U256) -> Result<u128, FurrowError> {
    let product = U256::from(amount)
        .checked_mul(acc_reward_per_share)
        .ok_or(FurrowError::ArithmeticOverflow("accumulated reward"))?;
    narrow_u128(product / U256::from(PRECISION), "accumulated reward")
}

/// Signed form of `accumulated_reward`, for reward-debt bookkeeping.
pub fn accumulated_debt(amount: u128, acc_reward_per_share: U256) -> Result<i128, FurrowError> {
    let reward = accumulated_reward(amount, acc_reward_per_share)?;
    i128::try_from(reward).map_err(|_| FurrowError::ArithmeticOverflow("reward debt"))
}

/// Narrow a 256-bit value to `u128`, failing instead of truncating.
pub fn narrow_u128(value: U256, context: &'static str) -> Result<u128, FurrowError> {
    if value > U256::from(u128::MAX) {
        return Err(FurrowError::ArithmeticOverflow(context));
    }
    Ok(value.low_u128())
}
