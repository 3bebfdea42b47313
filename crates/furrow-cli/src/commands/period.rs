// crates/furrow-cli/src/commands/period.rs
//
// `furrow period --index N`: which period an index falls in and its rate.

use serde::Serialize;
use tabled::Tabled;

use furrow_core::error::FurrowError;
use furrow_economics::{EmissionSchedule, TokenAmount};

use crate::output::{print_rows, OutputFormat};

#[derive(Debug, Tabled, Serialize)]
pub struct PeriodInfo {
    #[tabled(rename = "Index")]
    pub index: u64,
    #[tabled(rename = "Period")]
    pub period: u64,
    #[tabled(rename = "Period ends")]
    pub period_end: u64,
    #[tabled(rename = "Rate (units)")]
    pub rate: u128,
    #[tabled(rename = "Rate (tokens)")]
    pub rate_tokens: String,
}

pub fn period_info(schedule: &EmissionSchedule, index: u64) -> Result<PeriodInfo, FurrowError> {
    let period = schedule.period_of(index)?;
    let rate = schedule.reward_rate(period);
    Ok(PeriodInfo {
        index,
        period,
        period_end: schedule.period_upper_bound(period)?,
        rate,
        rate_tokens: TokenAmount::reward(rate).to_string(),
    })
}

/// Run the period command.
pub fn run(
    schedule: &EmissionSchedule,
    index: u64,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let info = period_info(schedule, index)?;
    print_rows("Period", &[info], format);
    Ok(())
}
