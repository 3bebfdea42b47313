// crates/furrow-core/src/traits.rs
//
// Capabilities the engine consumes from its environment. None of them are
// designed here: balances, secondary reward programs, and ownership live
// outside the accounting core.

use std::fmt;

use crate::error::FurrowError;
use crate::identity::{AccountId, AssetId, PoolId};

/// Value-transfer capability for both the stake assets and the reward asset.
///
/// Implementations must make `transfer` all-or-nothing: on error, no balance
/// changes.
pub trait AssetLedger {
    /// Balance of `account` in `asset`, in raw units.
    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> u128;

    /// Move `amount` units of `asset` from `from` to `to`.
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), FurrowError>;
}

/// What a rewarder is told after a stake-affecting operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardNotice {
    pub pool_id: PoolId,
    /// Owner of the position that changed.
    pub user: AccountId,
    /// Account receiving any payout.
    pub recipient: AccountId,
    /// Primary reward paid by this operation (zero for deposits and withdrawals).
    pub reward_amount: u128,
    /// The position's staked amount after the operation.
    pub new_staked_amount: u128,
}

/// A secondary reward program attached to a pool.
///
/// Called after the engine has mutated its own state, inside the same
/// transaction: an error from `on_reward` aborts the whole operation.
pub trait Rewarder: Send + Sync + fmt::Debug {
    /// Address reported in pool notifications. The rewarder spends from
    /// this account only.
    fn address(&self) -> &AccountId;

    /// Settle the secondary reward for a deposit, withdrawal, or harvest.
    ///
    /// `ledger` reads every balance, but its `transfer` fails with
    /// `UnauthorizedTransfer` unless `from` is `address()`.
    fn on_reward(
        &self,
        ledger: &mut dyn AssetLedger,
        notice: &RewardNotice,
    ) -> Result<(), FurrowError>;

    /// Emergency-exit notification. Receives no ledger: it can never pay out.
    /// An error here is logged and the exit goes ahead.
    fn on_emergency_exit(&self, notice: &RewardNotice) -> Result<(), FurrowError> {
        let _ = notice;
        Ok(())
    }
}

/// Owner check gating pool administration and reward top-ups.
pub trait AccessGate: Send + Sync + fmt::Debug {
    fn is_owner(&self, caller: &AccountId) -> bool;

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), FurrowError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(FurrowError::NotOwner(caller.clone()))
        }
    }
}

/// The common gate: exactly one account may administer the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleOwner {
    owner: AccountId,
}

impl SingleOwner {
    pub fn new(owner: impl Into<AccountId>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }
}

impl AccessGate for SingleOwner {
    fn is_owner(&self, caller: &AccountId) -> bool {
        *caller == self.owner
    }
}
