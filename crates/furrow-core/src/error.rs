use thiserror::Error;

use crate::identity::{AccountId, AssetId, PoolId};

/// Engine-wide error types for Furrow.
///
/// Every failure aborts the triggering operation with no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FurrowError {
    /// The pool id does not name an existing pool.
    #[error("Invalid pool id: {0}")]
    InvalidPoolId(PoolId),

    /// A pool for this stake asset already exists.
    #[error("Duplicate stake asset: {0} already has a pool")]
    DuplicateStakeAsset(AssetId),

    /// The reward asset cannot be staked: the reserve would count as stake.
    #[error("Stake asset {0} is the reward asset")]
    StakeAssetIsRewardAsset(AssetId),

    /// Accrual was requested against a pool with nothing staked.
    #[error("Staked supply should be greater than 0")]
    EmptyStakedSupply,

    /// The amount must be greater than zero for this operation.
    #[error("Amount should not be 0")]
    ZeroAmount,

    /// Withdrawal exceeds the caller's staked amount.
    #[error("Insufficient stake: requested {requested} but only {staked} staked")]
    InsufficientStake { requested: u128, staked: u128 },

    /// The index precedes the first index of the emission schedule.
    #[error("Index {index} is before the emission origin {origin}")]
    IndexBeforeOrigin { index: u64, origin: u64 },

    /// The caller does not hold the owner capability.
    #[error("Caller {0} is not the owner")]
    NotOwner(AccountId),

    /// A checked fixed-point or index computation overflowed.
    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// The asset ledger refused a transfer.
    #[error("Insufficient {asset} balance for {account}: requested {requested} but only {available} available")]
    InsufficientBalance {
        asset: AssetId,
        account: AccountId,
        requested: u128,
        available: u128,
    },

    /// A rewarder hook failed.
    #[error("Rewarder error: {0}")]
    Rewarder(String),

    /// A rewarder tried to spend from an account other than its own.
    #[error("Rewarder {rewarder} cannot spend from {from}")]
    UnauthorizedTransfer { rewarder: AccountId, from: AccountId },

    /// Invalid schedule or engine configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

}
