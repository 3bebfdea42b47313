// crates/furrow-cli/src/commands/necessary.rs
//
// `furrow necessary --from N [--funded X]`: reward the custody account
// must still hold to pay out the rest of the schedule.

use serde::Serialize;
use tabled::Tabled;

use furrow_core::error::FurrowError;
use furrow_economics::{TokenAmount, TreasuryPlanner};

use crate::output::{print_rows, OutputFormat};

#[derive(Debug, Tabled, Serialize)]
pub struct LiabilityRow {
    #[tabled(rename = "From index")]
    pub from: u64,
    #[tabled(rename = "Necessary (units)")]
    pub necessary: u128,
    #[tabled(rename = "Necessary (tokens)")]
    pub necessary_tokens: String,
    #[tabled(rename = "Funded (units)")]
    pub funded: u128,
    #[tabled(rename = "Shortfall (units)")]
    pub shortfall: u128,
    #[tabled(rename = "Shortfall (tokens)")]
    pub shortfall_tokens: String,
}

pub fn liability(
    planner: &TreasuryPlanner,
    from: u64,
    funded: u128,
) -> Result<LiabilityRow, FurrowError> {
    let necessary = planner.necessary_reward(from)?;
    let shortfall = planner.shortfall(from, funded)?;
    Ok(LiabilityRow {
        from,
        necessary,
        necessary_tokens: TokenAmount::reward(necessary).to_string(),
        funded,
        shortfall,
        shortfall_tokens: TokenAmount::reward(shortfall).to_string(),
    })
}

/// Run the necessary command.
pub fn run(
    planner: &TreasuryPlanner,
    from: u64,
    funded: Option<u128>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let row = liability(planner, from, funded.unwrap_or(0))?;
    print_rows("Reward liability", &[row], format);
    if format == OutputFormat::Table {
        println!(
            "Whole schedule: {} tokens",
            TokenAmount::reward(planner.total_emission()?)
        );
    }
    Ok(())
}
