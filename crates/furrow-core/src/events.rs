// crates/furrow-core/src/events.rs
//
// Notifications emitted by the engine, consumed by monitoring and indexing.
// Field order of each variant is part of the external contract.

use primitive_types::U256;
use serde::Serialize;
use std::fmt;

use crate::identity::{AccountId, AssetId, PoolId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum Event {
    /// A pool was appended to the registry.
    PoolAdded {
        pool_id: PoolId,
        alloc_weight: u64,
        stake_asset: AssetId,
        rewarder: Option<AccountId>,
    },
    /// A pool's allocation weight (and optionally its rewarder) changed.
    /// `rewarder` is the pool's rewarder after the change.
    PoolSet {
        pool_id: PoolId,
        alloc_weight: u64,
        rewarder: Option<AccountId>,
        overwrite: bool,
    },
    /// A pool's accumulator was refreshed. Fires even when nothing accrued.
    PoolSynced {
        pool_id: PoolId,
        last_update_index: u64,
        staked_supply: u128,
        acc_reward_per_share: U256,
    },
    Deposit {
        user: AccountId,
        pool_id: PoolId,
        amount: u128,
        to: AccountId,
    },
    Withdraw {
        user: AccountId,
        pool_id: PoolId,
        amount: u128,
        to: AccountId,
    },
    Harvest {
        user: AccountId,
        pool_id: PoolId,
        amount: u128,
    },
    EmergencyWithdraw {
        user: AccountId,
        pool_id: PoolId,
        amount: u128,
        to: AccountId,
    },
    /// Reward units were moved into the engine's custody by the owner.
    DepositReward { index: u64, amount: u128 },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::PoolAdded { .. } => "PoolAdded",
            Event::PoolSet { .. } => "PoolSet",
            Event::PoolSynced { .. } => "PoolSynced",
            Event::Deposit { .. } => "Deposit",
            Event::Withdraw { .. } => "Withdraw",
            Event::Harvest { .. } => "Harvest",
            Event::EmergencyWithdraw { .. } => "EmergencyWithdraw",
            Event::DepositReward { .. } => "DepositReward",
        }
    }
}

fn or_none(rewarder: &Option<AccountId>) -> &str {
    rewarder.as_ref().map(AccountId::as_str).unwrap_or("none")
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::PoolAdded {
                pool_id,
                alloc_weight,
                stake_asset,
                rewarder,
            } => write!(
                f,
                "PoolAdded({}, {}, {}, {})",
                pool_id,
                alloc_weight,
                stake_asset,
                or_none(rewarder)
            ),
            Event::PoolSet {
                pool_id,
                alloc_weight,
                rewarder,
                overwrite,
            } => write!(
                f,
                "PoolSet({}, {}, {}, {})",
                pool_id,
                alloc_weight,
                or_none(rewarder),
                overwrite
            ),
            Event::PoolSynced {
                pool_id,
                last_update_index,
                staked_supply,
                acc_reward_per_share,
            } => write!(
                f,
                "PoolSynced({}, {}, {}, {})",
                pool_id, last_update_index, staked_supply, acc_reward_per_share
            ),
            Event::Deposit {
                user,
                pool_id,
                amount,
                to,
            } => write!(f, "Deposit({}, {}, {}, {})", user, pool_id, amount, to),
            Event::Withdraw {
                user,
                pool_id,
                amount,
                to,
            } => write!(f, "Withdraw({}, {}, {}, {})", user, pool_id, amount, to),
            Event::Harvest {
                user,
                pool_id,
                amount,
            } => write!(f, "Harvest({}, {}, {})", user, pool_id, amount),
            Event::EmergencyWithdraw {
                user,
                pool_id,
                amount,
                to,
            } => write!(
                f,
                "EmergencyWithdraw({}, {}, {}, {})",
                user, pool_id, amount, to
            ),
            Event::DepositReward { index, amount } => {
                write!(f, "DepositReward({}, {})", index, amount)
            }
        }
    }
}
