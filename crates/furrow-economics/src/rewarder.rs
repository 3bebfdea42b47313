// crates/furrow-economics/src/rewarder.rs
//
// A secondary reward program paying a fixed multiple of the primary reward.
//
// On every harvest the rewarder pays `reward_amount * multiplier / 10^18`
// units of its own asset from its own account. When its balance runs short
// it pays whatever is left. Deposits and withdrawals carry no primary
// reward, so they pay nothing.

use primitive_types::U256;
use serde::Serialize;

use furrow_core::error::FurrowError;
use furrow_core::identity::{AccountId, AssetId};
use furrow_core::traits::{AssetLedger, RewardNotice, Rewarder};

use crate::accrual::narrow_u128;

/// Fixed-point scale of `multiplier` (10^18 = one secondary unit per
/// primary unit).
pub const MULTIPLIER_DIVISOR: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiplierRewarder {
    address: AccountId,
    reward_asset: AssetId,
    multiplier: u128,
}

impl MultiplierRewarder {
    pub fn new(
        address: impl Into<AccountId>,
        reward_asset: impl Into<AssetId>,
        multiplier: u128,
    ) -> Self {
        Self {
            address: address.into(),
            reward_asset: reward_asset.into(),
            multiplier,
        }
    }

    pub fn reward_asset(&self) -> &AssetId {
        &self.reward_asset
    }

    pub fn multiplier(&self) -> u128 {
        self.multiplier
    }

    /// Secondary reward owed for `primary_reward` units of primary reward,
    /// before capping at the rewarder's balance.
    pub fn pending_tokens(&self, primary_reward: u128) -> Result<u128, FurrowError> {
        let product = U256::from(primary_reward)
            .checked_mul(U256::from(self.multiplier))
            .ok_or(FurrowError::ArithmeticOverflow("secondary reward"))?;
        narrow_u128(product / U256::from(MULTIPLIER_DIVISOR), "secondary reward")
    }
}

impl Rewarder for MultiplierRewarder {
    fn address(&self) -> &AccountId {
        &self.address
    }

    fn on_reward(
        &self,
        ledger: &mut dyn AssetLedger,
        notice: &RewardNotice,
    ) -> Result<(), FurrowError> {
        let owed = self.pending_tokens(notice.reward_amount)?;
        let amount = owed.min(ledger.balance_of(&self.reward_asset, &self.address));
        if amount == 0 {
            return Ok(());
        }
        tracing::debug!(
            "Rewarder {} paying {} {} to {} for pool {}",
            self.address,
            amount,
            self.reward_asset,
            notice.recipient,
            notice.pool_id
        );
        ledger.transfer(&self.reward_asset, &self.address, &notice.recipient, amount)
    }
}
