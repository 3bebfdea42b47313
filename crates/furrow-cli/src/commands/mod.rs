// crates/furrow-cli/src/commands/mod.rs
//
// Command module declarations for the Furrow CLI.

pub mod necessary;
pub mod period;
pub mod schedule;
pub mod simulate;
