// crates/furrow-economics/src/chef.rs
//
// The reward engine: pool administration, accumulator refresh, reward
// top-ups and read views. Depositor operations live in `staking.rs` and
// batched execution in `batch.rs`; both extend `Chef` with further impls.
//
// Every public mutating method runs inside `transact`. A failed call leaves
// no trace: transfers are undone from the ledger journal, touched positions
// are put back, the event log is cut to its old length, and the pool
// registry is restored from a copy.

use std::sync::Arc;

use primitive_types::U256;

use furrow_core::error::FurrowError;
use furrow_core::events::Event;
use furrow_core::identity::{AccountId, AssetId, CallContext, PoolId};
use furrow_core::traits::{AccessGate, AssetLedger};

use crate::accrual::accrual;
use crate::emission::EmissionSchedule;
use crate::journal::{JournaledLedger, PositionJournal};
use crate::pool::{Pool, PoolRegistry, RewarderHook};
use crate::position::{PositionBook, UserPosition};
use crate::treasury::TreasuryPlanner;

/// Engine state besides the ledger.
#[derive(Debug, Default)]
pub(crate) struct ChefState {
    pub(crate) pools: PoolRegistry,
    pub(crate) positions: PositionBook,
    pub(crate) events: Vec<Event>,
}

/// Where a transaction started, for rolling back to it.
#[derive(Debug)]
struct Savepoint {
    pools: PoolRegistry,
    events: usize,
    positions: usize,
    transfers: usize,
}

/// Staking-reward engine over an asset ledger `L`.
///
/// The engine holds every stake and the reward reserve in its `custody`
/// account on the ledger. A pool's staked supply is the custody balance of
/// the pool's stake asset.
#[derive(Debug)]
pub struct Chef<L: AssetLedger> {
    schedule: EmissionSchedule,
    gate: Arc<dyn AccessGate>,
    custody: AccountId,
    reward_asset: AssetId,
    pub(crate) state: ChefState,
    pub(crate) ledger: JournaledLedger<L>,
    position_journal: PositionJournal,
    depth: usize,
}

impl<L: AssetLedger> Chef<L> {
    pub fn new(
        schedule: EmissionSchedule,
        gate: Arc<dyn AccessGate>,
        custody: impl Into<AccountId>,
        reward_asset: impl Into<AssetId>,
        ledger: L,
    ) -> Self {
        Self {
            schedule,
            gate,
            custody: custody.into(),
            reward_asset: reward_asset.into(),
            state: ChefState::default(),
            ledger: JournaledLedger::new(ledger),
            position_journal: PositionJournal::default(),
            depth: 0,
        }
    }

    /// Run `operation` atomically: on error, engine state and ledger are
    /// restored to what they were before the call. Nests: an inner failure
    /// only undoes the inner operation, and journals are dropped when the
    /// outermost transaction commits.
    pub(crate) fn transact<T>(
        &mut self,
        name: &'static str,
        operation: impl FnOnce(&mut Self) -> Result<T, FurrowError>,
    ) -> Result<T, FurrowError> {
        let savepoint = Savepoint {
            pools: self.state.pools.clone(),
            events: self.state.events.len(),
            positions: self.position_journal.mark(),
            transfers: self.ledger.mark(),
        };
        self.depth += 1;
        let result = operation(self);
        self.depth -= 1;

        match result {
            Ok(value) => {
                if self.depth == 0 {
                    self.ledger.commit();
                    self.position_journal.commit();
                }
                Ok(value)
            }
            Err(err) => {
                self.ledger.rewind(savepoint.transfers);
                self.position_journal
                    .rewind(savepoint.positions, &mut self.state.positions);
                self.state.events.truncate(savepoint.events);
                self.state.pools = savepoint.pools;
                tracing::warn!("{} rolled back: {}", name, err);
                Err(err)
            }
        }
    }

    /// Mutable position, recorded so a failed transaction can restore it.
    pub(crate) fn position_mut(&mut self, pool_id: PoolId, user: &AccountId) -> &mut UserPosition {
        let previous = self.state.positions.lookup(pool_id, user);
        self.position_journal.record(pool_id, user, previous);
        self.state.positions.entry(pool_id, user)
    }

    pub(crate) fn emit(&mut self, event: Event) {
        tracing::debug!("event {}", event);
        self.state.events.push(event);
    }

    // ---- Pool administration ----

    /// Register a new pool staking `stake_asset`.
    ///
    /// Every existing pool is synced first, so the weight change only
    /// affects emission from `ctx.index` onward.
    ///
    /// # Errors
    /// `NotOwner`, `DuplicateStakeAsset`, `StakeAssetIsRewardAsset`, or any
    /// error from syncing.
    pub fn add(
        &mut self,
        ctx: &CallContext,
        alloc_weight: u64,
        stake_asset: impl Into<AssetId>,
        rewarder: RewarderHook,
    ) -> Result<PoolId, FurrowError> {
        let stake_asset = stake_asset.into();
        self.transact("add", |chef| {
            chef.gate.ensure_owner(&ctx.caller)?;
            if chef.state.pools.contains_asset(&stake_asset) {
                return Err(FurrowError::DuplicateStakeAsset(stake_asset));
            }
            // Staked supply is read from custody, which also holds the reserve.
            if stake_asset == chef.reward_asset {
                return Err(FurrowError::StakeAssetIsRewardAsset(stake_asset));
            }
            chef.sync_all(ctx.index)?;

            let rewarder_address = rewarder.address();
            let pool_id = chef.state.pools.push(
                stake_asset.clone(),
                alloc_weight,
                ctx.index,
                rewarder,
            )?;
            tracing::info!(
                "Added pool {} for {} with weight {} (total {})",
                pool_id,
                stake_asset,
                alloc_weight,
                chef.state.pools.total_alloc_weight()
            );
            chef.emit(Event::PoolAdded {
                pool_id,
                alloc_weight,
                stake_asset,
                rewarder: rewarder_address,
            });
            Ok(pool_id)
        })
    }

    /// Change a pool's weight, and its rewarder when `overwrite` is set.
    ///
    /// # Errors
    /// `NotOwner`, `InvalidPoolId`, or any error from syncing.
    pub fn set(
        &mut self,
        ctx: &CallContext,
        pool_id: PoolId,
        alloc_weight: u64,
        rewarder: RewarderHook,
        overwrite: bool,
    ) -> Result<(), FurrowError> {
        self.transact("set", |chef| {
            chef.gate.ensure_owner(&ctx.caller)?;
            chef.state.pools.get(pool_id)?;
            chef.sync_all(ctx.index)?;

            chef.state.pools.set_alloc_weight(pool_id, alloc_weight)?;
            let pool = chef.state.pools.get_mut(pool_id)?;
            if overwrite {
                pool.rewarder = rewarder;
            }
            let effective = pool.rewarder.address();
            tracing::info!(
                "Set pool {} weight to {} (total {})",
                pool_id,
                alloc_weight,
                chef.state.pools.total_alloc_weight()
            );
            chef.emit(Event::PoolSet {
                pool_id,
                alloc_weight,
                rewarder: effective,
                overwrite,
            });
            Ok(())
        })
    }

    // ---- Accumulator refresh ----

    /// Bring one pool's accumulator up to `ctx.index`.
    pub fn update_pool(&mut self, ctx: &CallContext, pool_id: PoolId) -> Result<(), FurrowError> {
        self.transact("update_pool", |chef| {
            chef.sync_pool(pool_id, ctx.index).map(|_| ())
        })
    }

    /// Refresh the listed pools. Fails without touching any pool if one id
    /// is out of range.
    pub fn mass_update_pools(
        &mut self,
        ctx: &CallContext,
        pool_ids: &[PoolId],
    ) -> Result<(), FurrowError> {
        self.transact("mass_update_pools", |chef| {
            chef.state.pools.validate_ids(pool_ids)?;
            pool_ids
                .iter()
                .try_for_each(|&pool_id| chef.sync_pool(pool_id, ctx.index).map(|_| ()))
        })
    }

    pub fn update_all_pools(&mut self, ctx: &CallContext) -> Result<(), FurrowError> {
        self.transact("update_all_pools", |chef| chef.sync_all(ctx.index))
    }

    pub(crate) fn sync_all(&mut self, index: u64) -> Result<(), FurrowError> {
        for pool_id in self.state.pools.ids() {
            self.sync_pool(pool_id, index)?;
        }
        Ok(())
    }

    /// Refresh a pool and return its accumulator. Always emits `PoolSynced`.
    pub(crate) fn sync_pool(&mut self, pool_id: PoolId, index: u64) -> Result<U256, FurrowError> {
        let (acc_reward_per_share, staked_supply) = self.projected_accumulator(pool_id, index)?;
        let pool = self.state.pools.get_mut(pool_id)?;
        pool.acc_reward_per_share = acc_reward_per_share;
        pool.last_update_index = pool.last_update_index.max(index);
        let last_update_index = pool.last_update_index;

        self.emit(Event::PoolSynced {
            pool_id,
            last_update_index,
            staked_supply,
            acc_reward_per_share,
        });
        Ok(acc_reward_per_share)
    }

    /// The accumulator a sync at `index` would produce, with the staked
    /// supply it was computed against. Does not mutate.
    fn projected_accumulator(
        &self,
        pool_id: PoolId,
        index: u64,
    ) -> Result<(U256, u128), FurrowError> {
        let pool = self.state.pools.get(pool_id)?;
        let staked_supply = self.staked_supply(pool);
        if index <= pool.last_update_index || staked_supply == 0 {
            return Ok((pool.acc_reward_per_share, staked_supply));
        }

        let input = pool.accrual_input(index, self.state.pools.total_alloc_weight(), staked_supply);
        let delta = accrual(&self.schedule, &input)?;
        let acc = pool
            .acc_reward_per_share
            .checked_add(delta)
            .ok_or(FurrowError::ArithmeticOverflow("reward per share"))?;
        Ok((acc, staked_supply))
    }

    fn staked_supply(&self, pool: &Pool) -> u128 {
        self.ledger.balance_of(&pool.stake_asset, &self.custody)
    }

    // ---- Reward reserve ----

    /// Move `amount` reward units from the owner into custody.
    ///
    /// # Errors
    /// `ZeroAmount`, `NotOwner`, or `InsufficientBalance` from the ledger.
    pub fn deposit_reward(&mut self, ctx: &CallContext, amount: u128) -> Result<(), FurrowError> {
        if amount == 0 {
            return Err(FurrowError::ZeroAmount);
        }
        self.transact("deposit_reward", |chef| {
            chef.gate.ensure_owner(&ctx.caller)?;
            let reward_asset = chef.reward_asset.clone();
            let custody = chef.custody.clone();
            chef.ledger
                .transfer(&reward_asset, &ctx.caller, &custody, amount)?;
            tracing::info!("Deposited {} reward units at index {}", amount, ctx.index);
            chef.emit(Event::DepositReward {
                index: ctx.index,
                amount,
            });
            Ok(())
        })
    }

    // ---- Views ----

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    pub fn reward_asset(&self) -> &AssetId {
        &self.reward_asset
    }

    pub fn pool_length(&self) -> usize {
        self.state.pools.len()
    }

    pub fn pool(&self, pool_id: PoolId) -> Result<&Pool, FurrowError> {
        self.state.pools.get(pool_id)
    }

    pub fn pools(&self) -> &[Pool] {
        self.state.pools.pools()
    }

    pub fn stake_asset(&self, pool_id: PoolId) -> Result<&AssetId, FurrowError> {
        Ok(&self.state.pools.get(pool_id)?.stake_asset)
    }

    pub fn total_alloc_weight(&self) -> u64 {
        self.state.pools.total_alloc_weight()
    }

    pub fn user_position(&self, pool_id: PoolId, user: &AccountId) -> UserPosition {
        self.state.positions.get(pool_id, user)
    }

    pub fn positions(&self) -> &PositionBook {
        &self.state.positions
    }

    /// Reward `user` could harvest from `pool_id` at `index`, without
    /// touching state.
    pub fn pending_reward(
        &self,
        pool_id: PoolId,
        user: &AccountId,
        index: u64,
    ) -> Result<u128, FurrowError> {
        let (acc, _) = self.projected_accumulator(pool_id, index)?;
        self.state.positions.get(pool_id, user).pending_reward(acc)
    }

    /// Reward units currently held in custody.
    pub fn reward_balance(&self) -> u128 {
        self.ledger.balance_of(&self.reward_asset, &self.custody)
    }

    pub fn planner(&self) -> TreasuryPlanner {
        TreasuryPlanner::new(self.schedule)
    }

    /// Reward still missing from custody to pay out everything emitted
    /// after `index`.
    pub fn funding_shortfall(&self, index: u64) -> Result<u128, FurrowError> {
        self.planner().shortfall(index, self.reward_balance())
    }

    pub fn events(&self) -> &[Event] {
        &self.state.events
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.state.events)
    }

    pub fn ledger(&self) -> &L {
        self.ledger.inner()
    }

    /// Direct ledger access for the host (minting, seeding balances).
    /// Changes made here are outside any transaction.
    pub fn ledger_mut(&mut self) -> &mut L {
        self.ledger.inner_mut()
    }
}
