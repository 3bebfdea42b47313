// crates/furrow-economics/src/staking.rs
//
// Depositor operations: deposit, withdraw, harvest, and the emergency exit.
//
// Deposits credit the beneficiary `to`; the caller pays. Every other
// operation acts on the caller's own position and pays out to `to`.
// Each operation (except the emergency exit) first syncs the pool, so
// positions are always settled against an accumulator that includes the
// current index.

use furrow_core::error::FurrowError;
use furrow_core::events::Event;
use furrow_core::identity::{AccountId, CallContext, PoolId};
use furrow_core::traits::{AssetLedger, RewardNotice};

use crate::chef::Chef;

impl<L: AssetLedger> Chef<L> {
    /// Stake `amount` of the pool's asset from the caller on behalf of `to`.
    ///
    /// A zero amount is accepted and only syncs the pool and notifies the
    /// rewarder.
    ///
    /// # Errors
    /// `InvalidPoolId`, `InsufficientBalance` if the caller cannot pay, or
    /// any rewarder failure.
    pub fn deposit(
        &mut self,
        ctx: &CallContext,
        pool_id: PoolId,
        amount: u128,
        to: &AccountId,
    ) -> Result<(), FurrowError> {
        self.transact("deposit", |chef| {
            let acc = chef.sync_pool(pool_id, ctx.index)?;
            let stake_asset = chef.stake_asset(pool_id)?.clone();
            let custody = chef.custody().clone();
            chef.ledger
                .transfer(&stake_asset, &ctx.caller, &custody, amount)?;

            let position = chef.position_mut(pool_id, to);
            position.deposit(amount, acc)?;
            let new_staked_amount = position.staked_amount;

            chef.notify_rewarder(RewardNotice {
                pool_id,
                user: to.clone(),
                recipient: to.clone(),
                reward_amount: 0,
                new_staked_amount,
            })?;
            chef.emit(Event::Deposit {
                user: ctx.caller.clone(),
                pool_id,
                amount,
                to: to.clone(),
            });
            Ok(())
        })
    }

    /// Unstake `amount` from the caller's position and send it to `to`.
    /// Unharvested reward stays claimable.
    ///
    /// # Errors
    /// `ZeroAmount`, `InsufficientStake`, `InvalidPoolId`, or any rewarder
    /// failure.
    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        pool_id: PoolId,
        amount: u128,
        to: &AccountId,
    ) -> Result<(), FurrowError> {
        if amount == 0 {
            return Err(FurrowError::ZeroAmount);
        }
        self.transact("withdraw", |chef| {
            let acc = chef.sync_pool(pool_id, ctx.index)?;

            let position = chef.position_mut(pool_id, &ctx.caller);
            position.withdraw(amount, acc)?;
            let new_staked_amount = position.staked_amount;

            chef.release_stake(pool_id, to, amount)?;
            chef.notify_rewarder(RewardNotice {
                pool_id,
                user: ctx.caller.clone(),
                recipient: to.clone(),
                reward_amount: 0,
                new_staked_amount,
            })?;
            chef.emit(Event::Withdraw {
                user: ctx.caller.clone(),
                pool_id,
                amount,
                to: to.clone(),
            });
            Ok(())
        })
    }

    /// Pay the caller's pending reward to `to`. Returns the amount paid.
    /// `Harvest` is emitted even when nothing was pending.
    pub fn harvest(
        &mut self,
        ctx: &CallContext,
        pool_id: PoolId,
        to: &AccountId,
    ) -> Result<u128, FurrowError> {
        self.transact("harvest", |chef| {
            let acc = chef.sync_pool(pool_id, ctx.index)?;

            let position = chef.position_mut(pool_id, &ctx.caller);
            let pending = position.settle(acc)?;
            let staked_amount = position.staked_amount;

            chef.pay_reward(to, pending)?;
            chef.notify_rewarder(RewardNotice {
                pool_id,
                user: ctx.caller.clone(),
                recipient: to.clone(),
                reward_amount: pending,
                new_staked_amount: staked_amount,
            })?;
            chef.emit(Event::Harvest {
                user: ctx.caller.clone(),
                pool_id,
                amount: pending,
            });
            Ok(pending)
        })
    }

    /// Withdraw `amount` and harvest everything pending in one step, with a
    /// single sync and a single rewarder call. `amount` may be zero.
    /// Returns the reward paid.
    pub fn withdraw_and_harvest(
        &mut self,
        ctx: &CallContext,
        pool_id: PoolId,
        amount: u128,
        to: &AccountId,
    ) -> Result<u128, FurrowError> {
        self.transact("withdraw_and_harvest", |chef| {
            let acc = chef.sync_pool(pool_id, ctx.index)?;

            let position = chef.position_mut(pool_id, &ctx.caller);
            let pending = position.withdraw_and_settle(amount, acc)?;
            let new_staked_amount = position.staked_amount;

            chef.pay_reward(to, pending)?;
            chef.release_stake(pool_id, to, amount)?;
            chef.notify_rewarder(RewardNotice {
                pool_id,
                user: ctx.caller.clone(),
                recipient: to.clone(),
                reward_amount: pending,
                new_staked_amount,
            })?;
            chef.emit(Event::Withdraw {
                user: ctx.caller.clone(),
                pool_id,
                amount,
                to: to.clone(),
            });
            chef.emit(Event::Harvest {
                user: ctx.caller.clone(),
                pool_id,
                amount: pending,
            });
            Ok(pending)
        })
    }

    /// Return the caller's whole stake to `to` and forfeit pending reward.
    ///
    /// Does not sync the pool, so it keeps working when accrual cannot. A
    /// failing rewarder is logged and does not block the exit. Returns the
    /// amount released.
    pub fn emergency_exit(
        &mut self,
        ctx: &CallContext,
        pool_id: PoolId,
        to: &AccountId,
    ) -> Result<u128, FurrowError> {
        self.transact("emergency_exit", |chef| {
            let rewarder = chef.pool(pool_id)?.rewarder.clone();
            let amount = chef.position_mut(pool_id, &ctx.caller).clear();

            chef.release_stake(pool_id, to, amount)?;
            let notice = RewardNotice {
                pool_id,
                user: ctx.caller.clone(),
                recipient: to.clone(),
                reward_amount: 0,
                new_staked_amount: 0,
            };
            if let Err(err) = rewarder.notify_emergency(&notice) {
                tracing::warn!(
                    "Rewarder {} failed on emergency exit from pool {}: {}",
                    rewarder
                        .address()
                        .map(|address| address.to_string())
                        .unwrap_or_default(),
                    pool_id,
                    err
                );
            }
            tracing::info!(
                "Emergency exit of {} from pool {} by {}",
                amount,
                pool_id,
                ctx.caller
            );
            chef.emit(Event::EmergencyWithdraw {
                user: ctx.caller.clone(),
                pool_id,
                amount,
                to: to.clone(),
            });
            Ok(amount)
        })
    }

    fn release_stake(
        &mut self,
        pool_id: PoolId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), FurrowError> {
        let stake_asset = self.stake_asset(pool_id)?.clone();
        let custody = self.custody().clone();
        self.ledger.transfer(&stake_asset, &custody, to, amount)
    }

    fn pay_reward(&mut self, to: &AccountId, amount: u128) -> Result<(), FurrowError> {
        if amount == 0 {
            return Ok(());
        }
        let reward_asset = self.reward_asset().clone();
        let custody = self.custody().clone();
        self.ledger.transfer(&reward_asset, &custody, to, amount)
    }

    fn notify_rewarder(&mut self, notice: RewardNotice) -> Result<(), FurrowError> {
        let rewarder = self.pool(notice.pool_id)?.rewarder.clone();
        rewarder.notify(&mut self.ledger, &notice)
    }
}
