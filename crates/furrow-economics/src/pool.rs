// crates/furrow-economics/src/pool.rs
//
// Pool records and the append-only pool registry.
//
// Pools are never removed: a pool's id is its position in the registry.
// The registry keeps `total_alloc_weight` equal to the sum of all pool
// weights; every weight change goes through it.

use std::sync::Arc;

use primitive_types::U256;

use furrow_core::error::FurrowError;
use furrow_core::identity::{AccountId, AssetId, PoolId};
use furrow_core::traits::{AssetLedger, RewardNotice, Rewarder};

use crate::accrual::AccrualInput;

/// Optional secondary reward program attached to a pool.
///
/// `Disabled` is the "no rewarder" case; every notification is skipped.
#[derive(Debug, Clone, Default)]
pub enum RewarderHook {
    #[default]
    Disabled,
    Enabled(Arc<dyn Rewarder>),
}

impl RewarderHook {
    pub fn new(rewarder: Arc<dyn Rewarder>) -> Self {
        RewarderHook::Enabled(rewarder)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, RewarderHook::Enabled(_))
    }

    /// Address of the attached rewarder, if any.
    pub fn address(&self) -> Option<AccountId> {
        match self {
            RewarderHook::Disabled => None,
            RewarderHook::Enabled(rewarder) => Some(rewarder.address().clone()),
        }
    }

    /// Call `on_reward` with a ledger that only spends from the rewarder's
    /// own address.
    pub fn notify(
        &self,
        ledger: &mut dyn AssetLedger,
        notice: &RewardNotice,
    ) -> Result<(), FurrowError> {
        match self {
            RewarderHook::Disabled => Ok(()),
            RewarderHook::Enabled(rewarder) => {
                let mut scoped = RewarderLedger::new(ledger, rewarder.address());
                rewarder.on_reward(&mut scoped, notice)
            }
        }
    }

    pub fn notify_emergency(&self, notice: &RewardNotice) -> Result<(), FurrowError> {
        match self {
            RewarderHook::Disabled => Ok(()),
            RewarderHook::Enabled(rewarder) => rewarder.on_emergency_exit(notice),
        }
    }
}

/// The ledger a rewarder sees: every balance is readable, but only its own
/// account can be debited.
pub struct RewarderLedger<'a> {
    ledger: &'a mut dyn AssetLedger,
    rewarder: &'a AccountId,
}

impl<'a> RewarderLedger<'a> {
    pub fn new(ledger: &'a mut dyn AssetLedger, rewarder: &'a AccountId) -> Self {
        Self { ledger, rewarder }
    }
}

impl AssetLedger for RewarderLedger<'_> {
    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> u128 {
        self.ledger.balance_of(asset, account)
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), FurrowError> {
        if from != self.rewarder {
            return Err(FurrowError::UnauthorizedTransfer {
                rewarder: self.rewarder.clone(),
                from: from.clone(),
            });
        }
        self.ledger.transfer(asset, from, to, amount)
    }
}

impl From<Option<Arc<dyn Rewarder>>> for RewarderHook {
    fn from(rewarder: Option<Arc<dyn Rewarder>>) -> Self {
        rewarder.map(RewarderHook::Enabled).unwrap_or_default()
    }
}

/// A staking pool.
#[derive(Debug, Clone)]
pub struct Pool {
    pub id: PoolId,
    pub stake_asset: AssetId,
    pub alloc_weight: u64,
    /// Last index the accumulator was refreshed at.
    pub last_update_index: u64,
    /// Cumulative reward per unit of stake, scaled by PRECISION. Never decreases.
    pub acc_reward_per_share: U256,
    pub rewarder: RewarderHook,
}

impl Pool {
    /// Accrual input for refreshing this pool at `current_index`.
    pub fn accrual_input(
        &self,
        current_index: u64,
        total_alloc_weight: u64,
        staked_supply: u128,
    ) -> AccrualInput {
        AccrualInput {
            acc_reward_per_share: self.acc_reward_per_share,
            last_update_index: self.last_update_index,
            current_index,
            alloc_weight: self.alloc_weight,
            total_alloc_weight,
            staked_supply,
        }
    }
}

/// Ordered collection of pools plus the global allocation total.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
    total_alloc_weight: u64,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn total_alloc_weight(&self) -> u64 {
        self.total_alloc_weight
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn ids(&self) -> std::ops::Range<PoolId> {
        0..self.pools.len()
    }

    /// # Errors
    /// Returns `FurrowError::InvalidPoolId` if no pool has this id.
    pub fn get(&self, pool_id: PoolId) -> Result<&Pool, FurrowError> {
        self.pools
            .get(pool_id)
            .ok_or(FurrowError::InvalidPoolId(pool_id))
    }

    pub fn get_mut(&mut self, pool_id: PoolId) -> Result<&mut Pool, FurrowError> {
        self.pools
            .get_mut(pool_id)
            .ok_or(FurrowError::InvalidPoolId(pool_id))
    }

    /// Reject the whole list if any id is out of range.
    pub fn validate_ids(&self, pool_ids: &[PoolId]) -> Result<(), FurrowError> {
        match pool_ids.iter().find(|&&id| id >= self.pools.len()) {
            Some(&invalid) => Err(FurrowError::InvalidPoolId(invalid)),
            None => Ok(()),
        }
    }

    pub fn contains_asset(&self, stake_asset: &AssetId) -> bool {
        self.pools.iter().any(|pool| pool.stake_asset == *stake_asset)
    }

    /// Append a new pool with a zero accumulator.
    ///
    /// # Errors
    /// Returns `FurrowError::DuplicateStakeAsset` if a pool already stakes
    /// `stake_asset`, or `FurrowError::ArithmeticOverflow` if the weight
    /// total would overflow.
    pub fn push(
        &mut self,
        stake_asset: AssetId,
        alloc_weight: u64,
        index: u64,
        rewarder: RewarderHook,
    ) -> Result<PoolId, FurrowError> {
        if self.contains_asset(&stake_asset) {
            return Err(FurrowError::DuplicateStakeAsset(stake_asset));
        }
        let total = self
            .total_alloc_weight
            .checked_add(alloc_weight)
            .ok_or(FurrowError::ArithmeticOverflow("total allocation weight"))?;

        let id = self.pools.len();
        self.pools.push(Pool {
            id,
            stake_asset,
            alloc_weight,
            last_update_index: index,
            acc_reward_per_share: U256::zero(),
            rewarder,
        });
        self.total_alloc_weight = total;
        Ok(id)
    }

    /// Replace a pool's weight, moving the total by the difference.
    pub fn set_alloc_weight(
        &mut self,
        pool_id: PoolId,
        alloc_weight: u64,
    ) -> Result<(), FurrowError> {
        let previous = self.get(pool_id)?.alloc_weight;
        let total = (self.total_alloc_weight - previous)
            .checked_add(alloc_weight)
            .ok_or(FurrowError::ArithmeticOverflow("total allocation weight"))?;
        self.get_mut(pool_id)?.alloc_weight = alloc_weight;
        self.total_alloc_weight = total;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_of_weights(registry: &PoolRegistry) -> u64 {
        registry.pools().iter().map(|pool| pool.alloc_weight).sum()
    }

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut registry = PoolRegistry::new();
        let a = registry.push(AssetId::from("A"), 10, 5, RewarderHook::Disabled).unwrap();
        let b = registry.push(AssetId::from("B"), 20, 6, RewarderHook::Disabled).unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().last_update_index, 6);
        assert_eq!(registry.get(1).unwrap().acc_reward_per_share, U256::zero());
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let mut registry = PoolRegistry::new();
        registry.push(AssetId::from("A"), 10, 0, RewarderHook::Disabled).unwrap();
        let result = registry.push(AssetId::from("A"), 5, 0, RewarderHook::Disabled);
        assert_eq!(result, Err(FurrowError::DuplicateStakeAsset(AssetId::from("A"))));
        assert_eq!(registry.total_alloc_weight(), 10);
    }

    #[test]
    fn test_total_tracks_weight_changes() {
        let mut registry = PoolRegistry::new();
        registry.push(AssetId::from("A"), 10, 0, RewarderHook::Disabled).unwrap();
        registry.push(AssetId::from("B"), 30, 0, RewarderHook::Disabled).unwrap();
        assert_eq!(registry.total_alloc_weight(), sum_of_weights(&registry));

        registry.set_alloc_weight(0, 2).unwrap();
        assert_eq!(registry.total_alloc_weight(), 32);
        registry.set_alloc_weight(1, 100).unwrap();
        assert_eq!(registry.total_alloc_weight(), 102);
        assert_eq!(registry.total_alloc_weight(), sum_of_weights(&registry));
    }

    #[test]
    fn test_invalid_ids() {
        let mut registry = PoolRegistry::new();
        registry.push(AssetId::from("A"), 10, 0, RewarderHook::Disabled).unwrap();
        assert!(registry.get(1).is_err());
        assert_eq!(registry.set_alloc_weight(7, 1), Err(FurrowError::InvalidPoolId(7)));
        assert_eq!(
            registry.validate_ids(&[0, 10_000, 100_000]),
            Err(FurrowError::InvalidPoolId(10_000))
        );
        assert!(registry.validate_ids(&[0, 0]).is_ok());
    }

    #[test]
    fn test_rewarder_ledger_only_spends_own_account() {
        let lp = AssetId::from("LP");
        let rewarder = AccountId::from("bonus");
        let mut bank = crate::token::MemoryBank::new();
        bank.mint(&lp, &AccountId::from("chef"), 40);
        bank.mint(&lp, &rewarder, 5);

        let mut scoped = RewarderLedger::new(&mut bank, &rewarder);
        assert_eq!(scoped.balance_of(&lp, &AccountId::from("chef")), 40);
        assert_eq!(
            scoped.transfer(&lp, &AccountId::from("chef"), &rewarder, 40),
            Err(FurrowError::UnauthorizedTransfer {
                rewarder: rewarder.clone(),
                from: AccountId::from("chef"),
            })
        );
        scoped
            .transfer(&lp, &rewarder, &AccountId::from("alice"), 5)
            .unwrap();
        assert_eq!(bank.balance_of(&lp, &AccountId::from("chef")), 40);
        assert_eq!(bank.balance_of(&lp, &AccountId::from("alice")), 5);
    }

    #[test]
    fn test_disabled_hook_has_no_address() {
        let hook = RewarderHook::from(None::<Arc<dyn Rewarder>>);
        assert!(!hook.is_enabled());
        assert_eq!(hook.address(), None);
        assert!(hook
            .notify_emergency(&RewardNotice {
                pool_id: 0,
                user: AccountId::from("a"),
                recipient: AccountId::from("a"),
                reward_amount: 0,
                new_staked_amount: 0,
            })
            .is_ok());
    }
}
