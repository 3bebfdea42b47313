// crates/furrow-economics/src/position.rs
//
// Per-(pool, depositor) stake and reward-debt bookkeeping.
//
// After every settlement `reward_debt == staked_amount * acc / PRECISION`,
// so pending reward exists only when the pool accumulator has grown since.
// Deposits and withdrawals shift the debt by exactly the accumulated value
// of the moved stake, which keeps previously earned reward untouched.

use std::collections::BTreeMap;

use primitive_types::U256;
use serde::Serialize;

use furrow_core::error::FurrowError;
use furrow_core::identity::{AccountId, PoolId};

use crate::accrual::accumulated_debt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserPosition {
    pub staked_amount: u128,
    /// Reward already credited, scaled like the accumulator. Can go negative
    /// after a withdrawal that leaves reward unharvested.
    pub reward_debt: i128,
}

impl UserPosition {
    /// Reward earned but not yet harvested, never below zero.
    pub fn pending_reward(&self, acc_reward_per_share: U256) -> Result<u128, FurrowError> {
        let accumulated = accumulated_debt(self.staked_amount, acc_reward_per_share)?;
        let pending = accumulated
            .checked_sub(self.reward_debt)
            .ok_or(FurrowError::ArithmeticOverflow("pending reward"))?;
        Ok(pending.max(0) as u128)
    }

    pub fn deposit(&mut self, amount: u128, acc_reward_per_share: U256) -> Result<(), FurrowError> {
        let staked = self
            .staked_amount
            .checked_add(amount)
            .ok_or(FurrowError::ArithmeticOverflow("staked amount"))?;
        let debt = self
            .reward_debt
            .checked_add(accumulated_debt(amount, acc_reward_per_share)?)
            .ok_or(FurrowError::ArithmeticOverflow("reward debt"))?;
        self.staked_amount = staked;
        self.reward_debt = debt;
        Ok(())
    }

    /// # Errors
    /// Returns `FurrowError::InsufficientStake` if `amount` exceeds the stake.
    pub fn withdraw(&mut self, amount: u128, acc_reward_per_share: U256) -> Result<(), FurrowError> {
        self.ensure_staked(amount)?;
        let debt = self
            .reward_debt
            .checked_sub(accumulated_debt(amount, acc_reward_per_share)?)
            .ok_or(FurrowError::ArithmeticOverflow("reward debt"))?;
        self.staked_amount -= amount;
        self.reward_debt = debt;
        Ok(())
    }

    /// Reset the debt to the current accumulated value and return the reward
    /// released by doing so. Negative rounding residue pays nothing.
    pub fn settle(&mut self, acc_reward_per_share: U256) -> Result<u128, FurrowError> {
        self.withdraw_and_settle(0, acc_reward_per_share)
    }

    /// Settle against the stake held before the withdrawal, then withdraw
    /// `amount` and re-base the debt on what remains.
    pub fn withdraw_and_settle(
        &mut self,
        amount: u128,
        acc_reward_per_share: U256,
    ) -> Result<u128, FurrowError> {
        self.ensure_staked(amount)?;
        let accumulated = accumulated_debt(self.staked_amount, acc_reward_per_share)?;
        let pending = accumulated
            .checked_sub(self.reward_debt)
            .ok_or(FurrowError::ArithmeticOverflow("pending reward"))?;

        let remaining = self.staked_amount - amount;
        self.reward_debt = accumulated_debt(remaining, acc_reward_per_share)?;
        self.staked_amount = remaining;
        Ok(pending.max(0) as u128)
    }

    /// Zero the position and return the stake it held.
    pub fn clear(&mut self) -> u128 {
        let amount = self.staked_amount;
        *self = UserPosition::default();
        amount
    }

    fn ensure_staked(&self, amount: u128) -> Result<(), FurrowError> {
        if amount > self.staked_amount {
            return Err(FurrowError::InsufficientStake {
                requested: amount,
                staked: self.staked_amount,
            });
        }
        Ok(())
    }
}

/// All positions, keyed by (pool, depositor). Records are created on first
/// touch and only removed when the transaction that created them fails.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: BTreeMap<(PoolId, AccountId), UserPosition>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The position for `(pool_id, user)`, or an empty one if never touched.
    pub fn get(&self, pool_id: PoolId, user: &AccountId) -> UserPosition {
        self.lookup(pool_id, user).unwrap_or_default()
    }

    pub fn entry(&mut self, pool_id: PoolId, user: &AccountId) -> &mut UserPosition {
        self.positions.entry((pool_id, user.clone())).or_default()
    }

    /// The stored record, distinguishing "never touched" from an empty one.
    pub fn lookup(&self, pool_id: PoolId, user: &AccountId) -> Option<UserPosition> {
        self.positions.get(&(pool_id, user.clone())).copied()
    }

    pub(crate) fn restore(
        &mut self,
        pool_id: PoolId,
        user: &AccountId,
        previous: Option<UserPosition>,
    ) {
        let key = (pool_id, user.clone());
        match previous {
            Some(position) => {
                self.positions.insert(key, position);
            }
            None => {
                self.positions.remove(&key);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &AccountId, &UserPosition)> {
        self.positions
            .iter()
            .map(|((pool_id, user), position)| (*pool_id, user, position))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accrual::PRECISION;

    fn acc(per_unit: u64) -> U256 {
        U256::from(PRECISION) * U256::from(per_unit)
    }

    #[test]
    fn test_deposit_at_zero_accumulator() {
        let mut position = UserPosition::default();
        position.deposit(100, U256::zero()).unwrap();
        assert_eq!(position.staked_amount, 100);
        assert_eq!(position.reward_debt, 0);
        assert_eq!(position.pending_reward(acc(2)).unwrap(), 200);
    }

    #[test]
    fn test_late_deposit_does_not_earn_past_reward() {
        let mut position = UserPosition::default();
        position.deposit(100, acc(5)).unwrap();
        assert_eq!(position.reward_debt, 500);
        assert_eq!(position.pending_reward(acc(5)).unwrap(), 0);
        assert_eq!(position.pending_reward(acc(6)).unwrap(), 100);
    }

    #[test]
    fn test_deposit_then_withdraw_round_trip() {
        let mut position = UserPosition::default();
        position.deposit(1_234, acc(7)).unwrap();
        position.withdraw(1_234, acc(7)).unwrap();
        assert_eq!(position, UserPosition::default());
        assert_eq!(position.pending_reward(acc(7)).unwrap(), 0);
    }

    #[test]
    fn test_withdraw_leaves_negative_debt() {
        let mut position = UserPosition::default();
        position.deposit(10, U256::zero()).unwrap();
        position.withdraw(10, acc(3)).unwrap();
        assert_eq!(position.staked_amount, 0);
        assert_eq!(position.reward_debt, -30);
        assert_eq!(position.settle(acc(3)).unwrap(), 30);
        assert_eq!(position.reward_debt, 0);
    }

    #[test]
    fn test_withdraw_more_than_staked() {
        let mut position = UserPosition::default();
        position.deposit(10, U256::zero()).unwrap();
        assert_eq!(
            position.withdraw(11, U256::zero()),
            Err(FurrowError::InsufficientStake {
                requested: 11,
                staked: 10
            })
        );
        assert_eq!(position.staked_amount, 10);
    }

    #[test]
    fn test_settle_resets_debt() {
        let mut position = UserPosition::default();
        position.deposit(10, U256::zero()).unwrap();
        assert_eq!(position.settle(acc(4)).unwrap(), 40);
        assert_eq!(position.reward_debt, 40);
        assert_eq!(position.settle(acc(4)).unwrap(), 0);
    }

    #[test]
    fn test_withdraw_and_settle() {
        let mut position = UserPosition::default();
        position.deposit(10, U256::zero()).unwrap();
        let pending = position.withdraw_and_settle(4, acc(2)).unwrap();
        assert_eq!(pending, 20);
        assert_eq!(position.staked_amount, 6);
        assert_eq!(position.reward_debt, 12);
    }

    #[test]
    fn test_clear_returns_stake() {
        let mut position = UserPosition::default();
        position.deposit(10, acc(1)).unwrap();
        assert_eq!(position.clear(), 10);
        assert_eq!(position, UserPosition::default());
    }

    #[test]
    fn test_book_creates_lazily() {
        let mut book = PositionBook::new();
        let alice = AccountId::from("alice");
        assert_eq!(book.get(0, &alice), UserPosition::default());
        assert!(book.is_empty());
        book.entry(0, &alice).deposit(5, U256::zero()).unwrap();
        assert_eq!(book.get(0, &alice).staked_amount, 5);
        assert_eq!(book.get(1, &alice).staked_amount, 0);
        assert_eq!(book.len(), 1);
    }
}
