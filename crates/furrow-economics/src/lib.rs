// crates/furrow-economics/src/lib.rs
//
// furrow-economics: emission schedule, pool accrual, the staking ledger,
// secondary rewarders, treasury planning, and batched execution for the
// Furrow staking-reward engine.
//
// Reward amounts are raw integer units of the reward asset (18 decimals).
// Per-share accumulators are 256-bit fixed-point values scaled by 10^12.

pub mod accrual;
pub mod batch;
pub mod chef;
pub mod emission;
mod journal;
pub mod pool;
pub mod position;
pub mod rewarder;
pub mod staking;
pub mod token;
pub mod treasury;

// Re-export key types for ergonomic access from downstream crates.
pub use accrual::{accrual, AccrualInput, PRECISION};
pub use batch::{BatchReport, Operation};
pub use chef::Chef;
pub use emission::{
    EmissionSchedule, DEFAULT_FIRST_PERIOD_SUPPLY, DEFAULT_MAX_PERIOD, DEFAULT_ORIGIN_INDEX,
    DEFAULT_PERIOD_LENGTH,
};
pub use pool::{Pool, RewarderHook, RewarderLedger};
pub use position::UserPosition;
pub use rewarder::{MultiplierRewarder, MULTIPLIER_DIVISOR};
pub use token::{MemoryBank, TokenAmount, REWARD_DECIMALS, UNITS_PER_TOKEN};
pub use treasury::TreasuryPlanner;
