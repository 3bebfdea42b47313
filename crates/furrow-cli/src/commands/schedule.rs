// crates/furrow-cli/src/commands/schedule.rs
//
// `furrow schedule`: the emission curve, one row per emitting period.

use serde::Serialize;
use tabled::Tabled;

use furrow_core::error::FurrowError;
use furrow_economics::{EmissionSchedule, TokenAmount};

use crate::output::{print_rows, OutputFormat};

/// A row in the schedule table.
#[derive(Debug, Tabled, Serialize)]
pub struct PeriodRow {
    #[tabled(rename = "Period")]
    pub period: u64,
    #[tabled(rename = "First index")]
    pub first_index: u64,
    #[tabled(rename = "Last index")]
    pub last_index: u64,
    #[tabled(rename = "Rate (units)")]
    pub rate: u128,
    #[tabled(rename = "Rate (tokens)")]
    pub rate_tokens: String,
}

/// Rows for every period from 0 through the schedule's last emitting period.
pub fn period_rows(schedule: &EmissionSchedule) -> Result<Vec<PeriodRow>, FurrowError> {
    (0..=schedule.max_period())
        .map(|period| {
            let rate = schedule.reward_rate(period);
            Ok(PeriodRow {
                period,
                first_index: schedule.period_lower_bound(period)?,
                last_index: schedule.period_upper_bound(period)?,
                rate,
                rate_tokens: TokenAmount::reward(rate).to_string(),
            })
        })
        .collect()
}

/// Run the schedule command.
pub fn run(
    schedule: &EmissionSchedule,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = period_rows(schedule)?;
    if format == OutputFormat::Table {
        println!(
            "Origin index: {}  |  Period length: {}  |  Final index: {}",
            schedule.origin_index(),
            schedule.period_length(),
            schedule.final_index()?
        );
        println!();
    }
    print_rows("Emission schedule", &rows, format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_rows() {
        let rows = period_rows(&EmissionSchedule::default()).unwrap();
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].first_index, 242_181);
        assert_eq!(rows[0].last_index, 457_180);
        assert_eq!(rows[0].rate_tokens, "151.629858171523");
        assert_eq!(rows[23].rate, 13_438_860_500_658_934_856);
        assert_eq!(rows[23].last_index, 5_402_180);
    }
}
