// crates/furrow-economics/src/emission.rs
//
// Block-indexed emission schedule with geometric decay.
//
// Indices from `origin_index` onward are grouped into periods of
// `period_length` indices. Every index inside period p emits
//   first_period_supply * 0.9^p
// reward units, until `max_period`; later periods emit nothing.
//
// Production values: origin 242,181, 215,000 indices per period,
// 151.629858171523 reward tokens (18 decimals) per index in period 0,
// 24 emitting periods (0..=23).

use primitive_types::U256;
use serde::Serialize;

use furrow_core::error::FurrowError;

/// Decay per period is DECAY_NUMERATOR / DECAY_DENOMINATOR (0.9).
pub const DECAY_NUMERATOR: u64 = 9;
pub const DECAY_DENOMINATOR: u64 = 10;

/// Last period with a nonzero rate in the production schedule.
pub const DEFAULT_MAX_PERIOD: u64 = 23;

/// Upper limit on `max_period` so `supply * 9^p` always fits in 256 bits.
pub const MAX_SUPPORTED_PERIOD: u64 = 40;

pub const DEFAULT_ORIGIN_INDEX: u64 = 242_181;
pub const DEFAULT_PERIOD_LENGTH: u64 = 215_000;
pub const DEFAULT_FIRST_PERIOD_SUPPLY: u128 = 151_629_858_171_523_000_000;

/// Immutable emission curve shared by pool accrual and treasury planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmissionSchedule {
    origin_index: u64,
    period_length: u64,
    first_period_supply: u128,
    max_period: u64,
}

impl EmissionSchedule {
    /// Build a schedule with the default decay cutoff (`DEFAULT_MAX_PERIOD`).
    pub fn new(
        origin_index: u64,
        period_length: u64,
        first_period_supply: u128,
    ) -> Result<Self, FurrowError> {
        Self::with_max_period(
            origin_index,
            period_length,
            first_period_supply,
            DEFAULT_MAX_PERIOD,
        )
    }

    /// Build a schedule with an explicit last emitting period.
    ///
    /// # Errors
    /// Returns `FurrowError::InvalidConfig` if `period_length` is zero,
    /// `max_period` exceeds `MAX_SUPPORTED_PERIOD`, or the schedule's final
    /// index does not fit in a `u64`.
    pub fn with_max_period(
        origin_index: u64,
        period_length: u64,
        first_period_supply: u128,
        max_period: u64,
    ) -> Result<Self, FurrowError> {
        if period_length == 0 {
            return Err(FurrowError::InvalidConfig(
                "period length should be greater than 0".to_string(),
            ));
        }
        if max_period > MAX_SUPPORTED_PERIOD {
            return Err(FurrowError::InvalidConfig(format!(
                "max period {} exceeds the supported maximum of {}",
                max_period, MAX_SUPPORTED_PERIOD
            )));
        }

        let schedule = Self {
            origin_index,
            period_length,
            first_period_supply,
            max_period,
        };
        schedule.final_index().map_err(|_| {
            FurrowError::InvalidConfig(format!(
                "schedule ending after period {} overflows the index range",
                max_period
            ))
        })?;
        Ok(schedule)
    }

    pub fn origin_index(&self) -> u64 {
        self.origin_index
    }

    pub fn period_length(&self) -> u64 {
        self.period_length
    }

    pub fn first_period_supply(&self) -> u128 {
        self.first_period_supply
    }

    pub fn max_period(&self) -> u64 {
        self.max_period
    }

    /// Period containing `index`.
    ///
    /// # Errors
    /// Returns `FurrowError::IndexBeforeOrigin` if `index < origin_index`.
    pub fn period_of(&self, index: u64) -> Result<u64, FurrowError> {
        if index < self.origin_index {
            return Err(FurrowError::IndexBeforeOrigin {
                index,
                origin: self.origin_index,
            });
        }
        Ok((index - self.origin_index) / self.period_length)
    }

    /// First index inside `period`.
    pub fn period_lower_bound(&self, period: u64) -> Result<u64, FurrowError> {
        period
            .checked_mul(self.period_length)
            .and_then(|offset| offset.checked_add(self.origin_index))
            .ok_or(FurrowError::ArithmeticOverflow("period lower bound"))
    }

    /// Last index still inside `period`.
    pub fn period_upper_bound(&self, period: u64) -> Result<u64, FurrowError> {
        period
            .checked_add(1)
            .and_then(|count| count.checked_mul(self.period_length))
            .and_then(|span| span.checked_add(self.origin_index))
            .map(|end| end - 1)
            .ok_or(FurrowError::ArithmeticOverflow("period upper bound"))
    }

    /// Last index with a nonzero reward rate.
    pub fn final_index(&self) -> Result<u64, FurrowError> {
        self.period_upper_bound(self.max_period)
    }

    /// Reward units emitted per index during `period`.
    ///
    /// Computed as `first_period_supply * 9^period / 10^period` in 256-bit
    /// integers and truncated once, so rates do not drift from repeated
    /// rounding.
    pub fn reward_rate(&self, period: u64) -> u128 {
        if period > self.max_period {
            return 0;
        }

        let mut numerator = U256::from(self.first_period_supply);
        let mut denominator = U256::one();
        for _ in 0..period {
            numerator = numerator * DECAY_NUMERATOR;
            denominator = denominator * DECAY_DENOMINATOR;
        }
        // The quotient never exceeds first_period_supply.
        (numerator / denominator).low_u128()
    }

    /// Total reward units emitted over the indices in `(from, to]`.
    ///
    /// Every index is charged the rate of its own period, so an interval
    /// straddling a period boundary pays each side at its own rate. Indices
    /// before the origin and after the final period emit nothing.
    pub fn emission_between(&self, from: u64, to: u64) -> Result<U256, FurrowError> {
        let mut total = U256::zero();
        if to <= from {
            return Ok(total);
        }

        let first = (from + 1).max(self.origin_index);
        let last = to.min(self.final_index()?);

        let mut cursor = first;
        while cursor <= last {
            let period = self.period_of(cursor)?;
            let segment_end = self.period_upper_bound(period)?.min(last);
            let indices = segment_end - cursor + 1;
            let segment = U256::from(self.reward_rate(period))
                .checked_mul(U256::from(indices))
                .ok_or(FurrowError::ArithmeticOverflow("emission segment"))?;
            total = total
                .checked_add(segment)
                .ok_or(FurrowError::ArithmeticOverflow("emission total"))?;

            match segment_end.checked_add(1) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        Ok(total)
    }
}

impl Default for EmissionSchedule {
    /// The production schedule.
    fn default() -> Self {
        Self {
            origin_index: DEFAULT_ORIGIN_INDEX,
            period_length: DEFAULT_PERIOD_LENGTH,
            first_period_supply: DEFAULT_FIRST_PERIOD_SUPPLY,
            max_period: DEFAULT_MAX_PERIOD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_schedule() -> EmissionSchedule {
        EmissionSchedule::new(3, 3, DEFAULT_FIRST_PERIOD_SUPPLY).unwrap()
    }

    #[test]
    fn test_reward_rate_period_zero() {
        assert_eq!(short_schedule().reward_rate(0), 151_629_858_171_523_000_000);
    }

    #[test]
    fn test_reward_rate_period_one() {
        assert_eq!(short_schedule().reward_rate(1), 136_466_872_354_370_700_000);
    }

    #[test]
    fn test_reward_rate_last_period() {
        assert_eq!(short_schedule().reward_rate(23), 13_438_860_500_658_934_856);
    }

    #[test]
    fn test_reward_rate_after_max_period() {
        let schedule = short_schedule();
        assert_eq!(schedule.reward_rate(24), 0);
        assert_eq!(schedule.reward_rate(1_000), 0);
    }

    #[test]
    fn test_reward_rate_decays_geometrically() {
        let schedule = short_schedule();
        for period in 1..=DEFAULT_MAX_PERIOD {
            let previous = schedule.reward_rate(period - 1);
            let current = schedule.reward_rate(period);
            assert!(current < previous);
            // Within one unit of previous * 0.9 (only the exact rate is truncated).
            let approx = previous * 9 / 10;
            assert!(current.abs_diff(approx) <= 1, "period {}", period);
        }
    }

    #[test]
    fn test_period_of_production_boundaries() {
        let schedule = EmissionSchedule::default();
        assert_eq!(schedule.period_of(457_181).unwrap(), 1);
        assert_eq!(schedule.period_of(500_000).unwrap(), 1);
        assert_eq!(schedule.period_of(457_180).unwrap(), 0);
    }

    #[test]
    fn test_period_of_before_origin() {
        let schedule = EmissionSchedule::default();
        assert_eq!(
            schedule.period_of(242_180),
            Err(FurrowError::IndexBeforeOrigin {
                index: 242_180,
                origin: 242_181
            })
        );
    }

    #[test]
    fn test_period_upper_bound_production() {
        let schedule = EmissionSchedule::default();
        assert_eq!(schedule.period_upper_bound(0).unwrap(), 457_180);
        assert_eq!(schedule.period_upper_bound(1).unwrap(), 672_180);
    }

    #[test]
    fn test_upper_bound_round_trips_through_period_of() {
        let schedule = short_schedule();
        for period in 0..30 {
            let end = schedule.period_upper_bound(period).unwrap();
            assert_eq!(schedule.period_of(end).unwrap(), period);
            assert_eq!(schedule.period_of(end + 1).unwrap(), period + 1);
            assert_eq!(schedule.period_lower_bound(period + 1).unwrap(), end + 1);
        }
    }

    #[test]
    fn test_zero_period_length_rejected() {
        assert!(matches!(
            EmissionSchedule::new(0, 0, 1),
            Err(FurrowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unsupported_max_period_rejected() {
        assert!(EmissionSchedule::with_max_period(0, 10, 1, MAX_SUPPORTED_PERIOD + 1).is_err());
        assert!(EmissionSchedule::with_max_period(0, 10, u128::MAX, MAX_SUPPORTED_PERIOD).is_ok());
    }

    #[test]
    fn test_overflowing_final_index_rejected() {
        assert!(EmissionSchedule::new(u64::MAX - 10, 100, 1).is_err());
    }

    #[test]
    fn test_emission_single_index() {
        let schedule = short_schedule();
        assert_eq!(
            schedule.emission_between(3, 4).unwrap(),
            U256::from(schedule.reward_rate(0))
        );
    }

    #[test]
    fn test_emission_empty_interval() {
        let schedule = short_schedule();
        assert_eq!(schedule.emission_between(10, 10).unwrap(), U256::zero());
        assert_eq!(schedule.emission_between(10, 4).unwrap(), U256::zero());
    }

    #[test]
    fn test_emission_across_period_boundary() {
        // (3, 6]: indices 4 and 5 are in period 0, index 6 opens period 1.
        let schedule = short_schedule();
        let expected =
            U256::from(schedule.reward_rate(0)) * U256::from(2u64) + U256::from(schedule.reward_rate(1));
        assert_eq!(schedule.emission_between(3, 6).unwrap(), expected);
    }

    #[test]
    fn test_emission_before_origin_is_free() {
        let schedule = short_schedule();
        // Indices 1..=2 precede the origin; only index 3 emits.
        assert_eq!(
            schedule.emission_between(0, 3).unwrap(),
            U256::from(schedule.reward_rate(0))
        );
        assert_eq!(schedule.emission_between(0, 2).unwrap(), U256::zero());
    }

    #[test]
    fn test_emission_stops_after_final_period() {
        let schedule = short_schedule();
        let final_index = schedule.final_index().unwrap();
        assert_eq!(
            schedule.emission_between(final_index, final_index + 100).unwrap(),
            U256::zero()
        );
        assert_eq!(
            schedule.emission_between(final_index - 1, u64::MAX).unwrap(),
            U256::from(schedule.reward_rate(DEFAULT_MAX_PERIOD))
        );
    }
}
