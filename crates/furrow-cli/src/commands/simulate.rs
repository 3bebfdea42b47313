// crates/furrow-cli/src/commands/simulate.rs
//
// `furrow simulate`: replay the configured scenario against an in-memory
// ledger and print the event log, pools, positions, and balances.
//
// Each `[[steps]]` entry is one batch executed under its own caller and
// clock index. A failed step is reported and the scenario carries on.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use furrow_core::events::Event;
use furrow_core::identity::{AccountId, CallContext};
use furrow_core::traits::SingleOwner;
use furrow_economics::{Chef, MemoryBank};

use crate::config::{ConfigError, FurrowConfig};
use crate::output::{format_json, print_rows, OutputFormat};

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct StepRow {
    #[tabled(rename = "Step")]
    pub step: usize,
    #[tabled(rename = "Index")]
    pub index: u64,
    #[tabled(rename = "Caller")]
    pub caller: String,
    #[tabled(rename = "Ops")]
    pub operations: usize,
    #[tabled(rename = "Failed")]
    pub failed: usize,
    #[tabled(rename = "Error")]
    pub error: String,
}

#[derive(Debug, Tabled, Serialize)]
struct EventRow {
    #[tabled(rename = "#")]
    seq: usize,
    #[tabled(rename = "Event")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

#[derive(Debug, Tabled, Serialize)]
struct PoolRow {
    #[tabled(rename = "Pool")]
    pool_id: usize,
    #[tabled(rename = "Stake asset")]
    stake_asset: String,
    #[tabled(rename = "Weight")]
    alloc_weight: u64,
    #[tabled(rename = "Last update")]
    last_update_index: u64,
    #[tabled(rename = "Acc/share")]
    acc_reward_per_share: String,
    #[tabled(rename = "Rewarder")]
    rewarder: String,
}

#[derive(Debug, Tabled, Serialize)]
struct PositionRow {
    #[tabled(rename = "Pool")]
    pool_id: usize,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Staked")]
    staked_amount: u128,
    #[tabled(rename = "Reward debt")]
    reward_debt: i128,
    #[tabled(rename = "Pending")]
    pending: u128,
}

#[derive(Debug, Tabled, Serialize)]
struct BalanceRow {
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Amount")]
    amount: u128,
}

#[derive(Serialize)]
struct SimulationOutput<'a> {
    steps: &'a [StepRow],
    events: &'a [Event],
    pools: Vec<PoolRow>,
    positions: Vec<PositionRow>,
    balances: Vec<BalanceRow>,
}

/// Build the engine from `config` and run every step.
pub fn simulate(config: &FurrowConfig) -> Result<(Chef<MemoryBank>, Vec<StepRow>), ConfigError> {
    let schedule = config.emission_schedule()?;
    let rewarders = config.rewarder_registry()?;

    let mut bank = MemoryBank::new();
    for balance in &config.balances {
        let (asset, account, amount) = balance.parts()?;
        bank.try_mint(&asset, &account, amount)?;
    }

    let mut chef = Chef::new(
        schedule,
        Arc::new(SingleOwner::new(config.owner.as_str())),
        config.custody.as_str(),
        config.reward_asset.as_str(),
        bank,
    );
    tracing::info!(
        "Simulating {} steps with {} rewarders",
        config.steps.len(),
        rewarders.len()
    );

    let mut rows = Vec::with_capacity(config.steps.len());
    for (step, step_config) in config.steps.iter().enumerate() {
        let caller = AccountId::from(step_config.caller.as_str());
        let operations = step_config
            .operations
            .iter()
            .map(|operation| operation.to_operation(&caller, &rewarders))
            .collect::<Result<Vec<_>, _>>()?;
        let count = operations.len();
        let ctx = CallContext::new(caller, step_config.index);

        let row = match chef.execute(&ctx, operations, step_config.revert_on_failure) {
            Ok(report) => StepRow {
                step,
                index: ctx.index,
                caller: ctx.caller.to_string(),
                operations: count,
                failed: report.failed(),
                error: report
                    .outcomes
                    .iter()
                    .find_map(|outcome| outcome.as_ref().err())
                    .map(|err| err.to_string())
                    .unwrap_or_default(),
            },
            Err(err) => {
                tracing::warn!("Step {} at index {} reverted: {}", step, ctx.index, err);
                StepRow {
                    step,
                    index: ctx.index,
                    caller: ctx.caller.to_string(),
                    operations: count,
                    failed: count,
                    error: err.to_string(),
                }
            }
        };
        rows.push(row);
    }

    Ok((chef, rows))
}

/// Run the simulate command.
pub fn run(config: &FurrowConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    if config.steps.is_empty() {
        tracing::warn!("No [[steps]] configured; nothing to simulate");
    }
    let (chef, steps) = simulate(config)?;
    let last_index = config.steps.iter().map(|step| step.index).max().unwrap_or(0);

    let events: Vec<EventRow> = chef
        .events()
        .iter()
        .enumerate()
        .map(|(seq, event)| EventRow {
            seq,
            name: event.name().to_string(),
            details: event.to_string(),
        })
        .collect();

    let pools: Vec<PoolRow> = chef
        .pools()
        .iter()
        .map(|pool| PoolRow {
            pool_id: pool.id,
            stake_asset: pool.stake_asset.to_string(),
            alloc_weight: pool.alloc_weight,
            last_update_index: pool.last_update_index,
            acc_reward_per_share: pool.acc_reward_per_share.to_string(),
            rewarder: pool
                .rewarder
                .address()
                .map(|address| address.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let mut positions = Vec::new();
    for (pool_id, user, position) in chef.positions().iter() {
        positions.push(PositionRow {
            pool_id,
            user: user.to_string(),
            staked_amount: position.staked_amount,
            reward_debt: position.reward_debt,
            pending: chef.pending_reward(pool_id, user, last_index)?,
        });
    }

    let balances: Vec<BalanceRow> = chef
        .ledger()
        .balances()
        .into_iter()
        .map(|(asset, account, amount)| BalanceRow {
            asset: asset.to_string(),
            account: account.to_string(),
            amount,
        })
        .collect();

    match format {
        OutputFormat::Table => {
            print_rows("Steps", &steps, format);
            print_rows("Events", &events, format);
            print_rows("Pools", &pools, format);
            print_rows(
                &format!("Positions (pending at index {})", last_index),
                &positions,
                format,
            );
            print_rows("Balances", &balances, format);
        }
        OutputFormat::Json => {
            let output = SimulationOutput {
                steps: &steps,
                events: chef.events(),
                pools,
                positions,
                balances,
            };
            println!("{}", format_json(&output));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        owner = "ops"
        reward_asset = "SUSHI"

        [schedule]
        origin_index = 3
        period_length = 3
        first_period_supply = 1000

        [[balances]]
        asset = "SUSHI"
        account = "ops"
        amount = 1000000

        [[balances]]
        asset = "LP"
        account = "alice"
        amount = 100

        [[steps]]
        index = 3
        caller = "ops"

        [[steps.operations]]
        op = "add"
        alloc_weight = 1
        stake_asset = "LP"

        [[steps.operations]]
        op = "deposit_reward"
        amount = 500000

        [[steps]]
        index = 3
        caller = "alice"

        [[steps.operations]]
        op = "deposit"
        pool_id = 0
        amount = 10

        [[steps]]
        index = 5
        caller = "alice"

        [[steps.operations]]
        op = "harvest"
        pool_id = 0

        [[steps.operations]]
        op = "withdraw"
        pool_id = 0
        amount = 50
    "#;

    #[test]
    fn test_scenario_runs() {
        let config: FurrowConfig = toml::from_str(SCENARIO).unwrap();
        let (chef, steps) = simulate(&config).unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].failed, 0);
        assert_eq!(steps[1].failed, 0);
        // The over-withdrawal reverts the harvest in the same step.
        assert_eq!(steps[2].failed, 2);
        assert!(steps[2].error.contains("Insufficient stake"));

        let alice = AccountId::from("alice");
        assert_eq!(chef.user_position(0, &alice).staked_amount, 10);
        assert_eq!(chef.pending_reward(0, &alice, 5).unwrap(), 2_000);
        assert_eq!(chef.reward_balance(), 500_000);
    }

    #[test]
    fn test_best_effort_step_keeps_successes() {
        let mut config: FurrowConfig = toml::from_str(SCENARIO).unwrap();
        config.steps[2].revert_on_failure = false;
        let (chef, steps) = simulate(&config).unwrap();

        assert_eq!(steps[2].failed, 1);
        assert_eq!(chef.reward_balance(), 498_000);
        assert_eq!(
            chef.events().last().map(|event| event.name()),
            Some("Harvest")
        );
    }
}
