// crates/furrow-core/src/lib.rs
//
// furrow-core: identities, errors, events, and capability traits for the
// Furrow staking-reward engine.
//
// This is the leaf crate of the workspace. It knows nothing about emission
// or accounting; it defines the vocabulary the engine and its environment
// share.

pub mod error;
pub mod events;
pub mod identity;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use furrow_core::AccountId;`

pub use error::FurrowError;
pub use events::Event;
pub use identity::{AccountId, AssetId, CallContext, PoolId};
pub use traits::{AccessGate, AssetLedger, RewardNotice, Rewarder, SingleOwner};

// 256-bit integer used for per-share accumulators.
pub use primitive_types::U256;
