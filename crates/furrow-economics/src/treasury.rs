// crates/furrow-economics/src/treasury.rs
//
// Reward-reserve planning.
//
// The engine pays reward out of the balance held in custody; nothing mints
// it. The planner answers how much reward the schedule will still emit from
// a given index until it is exhausted, so the operator can keep custody
// funded. A fully weighted single pool with one unit staked earns exactly
// the whole emission, which is how the liability is computed.

use primitive_types::U256;

use furrow_core::error::FurrowError;

use crate::accrual::{accrual, narrow_u128, AccrualInput, PRECISION};
use crate::emission::EmissionSchedule;

/// Liability calculator over an emission schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreasuryPlanner {
    schedule: EmissionSchedule,
}

impl TreasuryPlanner {
    pub fn new(schedule: EmissionSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    /// Reward units emitted after `from` until the schedule ends.
    ///
    /// Zero once `from` reaches the final emitting index.
    ///
    /// # Errors
    /// Returns `FurrowError::ArithmeticOverflow` if the total exceeds `u128`.
    pub fn necessary_reward(&self, from: u64) -> Result<u128, FurrowError> {
        let final_index = self.schedule.final_index()?;
        let input = AccrualInput {
            acc_reward_per_share: U256::zero(),
            last_update_index: from,
            current_index: final_index,
            alloc_weight: 1,
            total_alloc_weight: 1,
            staked_supply: 1,
        };
        let per_share = accrual(&self.schedule, &input)?;
        narrow_u128(per_share / U256::from(PRECISION), "necessary reward")
    }

    /// Everything the schedule emits, origin to final index.
    pub fn total_emission(&self) -> Result<u128, FurrowError> {
        let per_period = (0..=self.schedule.max_period()).try_fold(U256::zero(), |total, period| {
            U256::from(self.schedule.reward_rate(period))
                .checked_mul(U256::from(self.schedule.period_length()))
                .and_then(|emitted| total.checked_add(emitted))
                .ok_or(FurrowError::ArithmeticOverflow("total emission"))
        })?;
        narrow_u128(per_period, "total emission")
    }

    /// Reward still to be deposited on top of `funded` to cover everything
    /// emitted after `from`.
    pub fn shortfall(&self, from: u64, funded: u128) -> Result<u128, FurrowError> {
        Ok(self.necessary_reward(from)?.saturating_sub(funded))
    }
}

impl Default for TreasuryPlanner {
    fn default() -> Self {
        Self::new(EmissionSchedule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_FROM: u64 = 1_090_674;
    const REFERENCE_NECESSARY: u128 = 189_159_009_460_828_483_008_592_000;

    #[test]
    fn test_necessary_reward_reference() {
        let planner = TreasuryPlanner::default();
        assert_eq!(planner.necessary_reward(REFERENCE_FROM).unwrap(), REFERENCE_NECESSARY);
    }

    #[test]
    fn test_necessary_reward_matches_emission() {
        let planner = TreasuryPlanner::default();
        let schedule = planner.schedule();
        let expected = schedule
            .emission_between(REFERENCE_FROM, schedule.final_index().unwrap())
            .unwrap();
        assert_eq!(U256::from(planner.necessary_reward(REFERENCE_FROM).unwrap()), expected);
    }

    #[test]
    fn test_necessary_reward_after_schedule_is_zero() {
        let planner = TreasuryPlanner::default();
        let final_index = planner.schedule().final_index().unwrap();
        assert_eq!(final_index, 5_402_180);
        assert_eq!(planner.necessary_reward(final_index).unwrap(), 0);
        assert_eq!(planner.necessary_reward(u64::MAX).unwrap(), 0);
        assert_eq!(
            planner.necessary_reward(final_index - 1).unwrap(),
            planner.schedule().reward_rate(23)
        );
    }

    #[test]
    fn test_total_emission() {
        let planner = TreasuryPlanner::default();
        let total = planner.total_emission().unwrap();
        assert_eq!(total, 299_999_999_999_999_411_051_490_000);
        let origin = planner.schedule().origin_index();
        assert_eq!(planner.necessary_reward(origin - 1).unwrap(), total);
        assert_eq!(planner.necessary_reward(0).unwrap(), total);
    }

    #[test]
    fn test_shortfall() {
        let planner = TreasuryPlanner::default();
        assert_eq!(
            planner.shortfall(REFERENCE_FROM, 9_000_000).unwrap(),
            REFERENCE_NECESSARY - 9_000_000
        );
        assert_eq!(planner.shortfall(REFERENCE_FROM, u128::MAX).unwrap(), 0);
    }
}
