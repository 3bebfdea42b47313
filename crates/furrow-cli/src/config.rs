// crates/furrow-cli/src/config.rs
//
// Operator configuration for the Furrow CLI.
// Loaded from a TOML file or populated with the production schedule.
//
// TOML integers stop at i64, so reward amounts (u128) may be written either
// as integers or as decimal strings.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use furrow_core::error::FurrowError;
use furrow_core::identity::{AccountId, AssetId, PoolId};
use furrow_core::traits::Rewarder;
use furrow_economics::emission::{
    EmissionSchedule, DEFAULT_FIRST_PERIOD_SUPPLY, DEFAULT_MAX_PERIOD, DEFAULT_ORIGIN_INDEX,
    DEFAULT_PERIOD_LENGTH,
};
use furrow_economics::{MultiplierRewarder, Operation, RewarderHook};

/// Errors turning a parsed config into engine inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid amount {0:?}: expected a non-negative integer")]
    InvalidAmount(String),

    #[error("Unknown rewarder {0:?}: not declared under [[rewarders]]")]
    UnknownRewarder(String),

    #[error("Duplicate rewarder name {0:?}")]
    DuplicateRewarder(String),

    #[error(transparent)]
    Engine(#[from] FurrowError),
}

/// An amount written as a TOML integer or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Int(u64),
    Text(String),
}

impl RawAmount {
    pub fn value(&self) -> Result<u128, ConfigError> {
        match self {
            RawAmount::Int(amount) => Ok(u128::from(*amount)),
            RawAmount::Text(text) => {
                let digits: String = text.chars().filter(|c| *c != '_').collect();
                digits
                    .parse::<u128>()
                    .map_err(|_| ConfigError::InvalidAmount(text.clone()))
            }
        }
    }
}

impl From<u128> for RawAmount {
    fn from(amount: u128) -> Self {
        match u64::try_from(amount) {
            Ok(small) => RawAmount::Int(small),
            Err(_) => RawAmount::Text(amount.to_string()),
        }
    }
}

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct FurrowConfig {
    /// Log level used when RUST_LOG is unset: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Account allowed to add pools, change weights, and fund rewards.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Account holding every stake and the reward reserve.
    #[serde(default = "default_custody")]
    pub custody: String,

    #[serde(default = "default_reward_asset")]
    pub reward_asset: String,

    /// Opening balances for the simulated ledger.
    #[serde(default)]
    pub balances: Vec<BalanceConfig>,

    /// Secondary reward programs pools may reference by name.
    #[serde(default)]
    pub rewarders: Vec<RewarderConfig>,

    /// Scenario for `furrow simulate`, one batch per step.
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_origin_index")]
    pub origin_index: u64,

    #[serde(default = "default_period_length")]
    pub period_length: u64,

    /// Reward units per index in period 0.
    #[serde(default = "default_first_period_supply")]
    pub first_period_supply: RawAmount,

    #[serde(default = "default_max_period")]
    pub max_period: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceConfig {
    pub asset: String,
    pub account: String,
    pub amount: RawAmount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewarderConfig {
    /// Name used in `[[steps]]` and also the rewarder's account.
    pub name: String,
    pub asset: String,
    /// Secondary units per primary unit, scaled by 10^18.
    pub multiplier: RawAmount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    /// Clock index the step runs at.
    pub index: u64,
    pub caller: String,
    /// Undo the whole step if one operation fails.
    #[serde(default = "default_revert_on_failure")]
    pub revert_on_failure: bool,
    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

/// One scenario operation. `to` defaults to the step's caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationConfig {
    Add {
        alloc_weight: u64,
        stake_asset: String,
        #[serde(default)]
        rewarder: Option<String>,
    },
    Set {
        pool_id: PoolId,
        alloc_weight: u64,
        #[serde(default)]
        rewarder: Option<String>,
        #[serde(default)]
        overwrite: bool,
    },
    UpdatePool {
        pool_id: PoolId,
    },
    MassUpdatePools {
        pool_ids: Vec<PoolId>,
    },
    UpdateAllPools,
    Deposit {
        pool_id: PoolId,
        amount: RawAmount,
        #[serde(default)]
        to: Option<String>,
    },
    Withdraw {
        pool_id: PoolId,
        amount: RawAmount,
        #[serde(default)]
        to: Option<String>,
    },
    Harvest {
        pool_id: PoolId,
        #[serde(default)]
        to: Option<String>,
    },
    WithdrawAndHarvest {
        pool_id: PoolId,
        amount: RawAmount,
        #[serde(default)]
        to: Option<String>,
    },
    EmergencyExit {
        pool_id: PoolId,
        #[serde(default)]
        to: Option<String>,
    },
    DepositReward {
        amount: RawAmount,
    },
}

/// Rewarders declared in the config, by name.
pub type RewarderRegistry = HashMap<String, Arc<dyn Rewarder>>;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_owner() -> String {
    "owner".to_string()
}

fn default_custody() -> String {
    "chef".to_string()
}

fn default_reward_asset() -> String {
    "REWARD".to_string()
}

fn default_origin_index() -> u64 {
    DEFAULT_ORIGIN_INDEX
}

fn default_period_length() -> u64 {
    DEFAULT_PERIOD_LENGTH
}

fn default_first_period_supply() -> RawAmount {
    RawAmount::from(DEFAULT_FIRST_PERIOD_SUPPLY)
}

fn default_max_period() -> u64 {
    DEFAULT_MAX_PERIOD
}

fn default_revert_on_failure() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            origin_index: default_origin_index(),
            period_length: default_period_length(),
            first_period_supply: default_first_period_supply(),
            max_period: default_max_period(),
        }
    }
}

impl Default for FurrowConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            schedule: ScheduleConfig::default(),
            owner: default_owner(),
            custody: default_custody(),
            reward_asset: default_reward_asset(),
            balances: Vec::new(),
            rewarders: Vec::new(),
            steps: Vec::new(),
        }
    }
}

impl FurrowConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        let config: FurrowConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn emission_schedule(&self) -> Result<EmissionSchedule, ConfigError> {
        let schedule = &self.schedule;
        Ok(EmissionSchedule::with_max_period(
            schedule.origin_index,
            schedule.period_length,
            schedule.first_period_supply.value()?,
            schedule.max_period,
        )?)
    }

    pub fn rewarder_registry(&self) -> Result<RewarderRegistry, ConfigError> {
        let mut registry = RewarderRegistry::new();
        for rewarder in &self.rewarders {
            let program = MultiplierRewarder::new(
                rewarder.name.as_str(),
                rewarder.asset.as_str(),
                rewarder.multiplier.value()?,
            );
            if registry
                .insert(rewarder.name.clone(), Arc::new(program))
                .is_some()
            {
                return Err(ConfigError::DuplicateRewarder(rewarder.name.clone()));
            }
        }
        Ok(registry)
    }
}

impl BalanceConfig {
    pub fn parts(&self) -> Result<(AssetId, AccountId, u128), ConfigError> {
        Ok((
            AssetId::from(self.asset.as_str()),
            AccountId::from(self.account.as_str()),
            self.amount.value()?,
        ))
    }
}

impl OperationConfig {
    /// Resolve names and amounts into an engine operation for `caller`.
    pub fn to_operation(
        &self,
        caller: &AccountId,
        rewarders: &RewarderRegistry,
    ) -> Result<Operation, ConfigError> {
        let beneficiary = |to: &Option<String>| {
            to.as_deref()
                .map(AccountId::from)
                .unwrap_or_else(|| caller.clone())
        };

        let operation = match self {
            OperationConfig::Add {
                alloc_weight,
                stake_asset,
                rewarder,
            } => Operation::AddPool {
                alloc_weight: *alloc_weight,
                stake_asset: AssetId::from(stake_asset.as_str()),
                rewarder: resolve_rewarder(rewarder, rewarders)?,
            },
            OperationConfig::Set {
                pool_id,
                alloc_weight,
                rewarder,
                overwrite,
            } => Operation::SetPool {
                pool_id: *pool_id,
                alloc_weight: *alloc_weight,
                rewarder: resolve_rewarder(rewarder, rewarders)?,
                overwrite: *overwrite,
            },
            OperationConfig::UpdatePool { pool_id } => Operation::UpdatePool { pool_id: *pool_id },
            OperationConfig::MassUpdatePools { pool_ids } => Operation::MassUpdatePools {
                pool_ids: pool_ids.clone(),
            },
            OperationConfig::UpdateAllPools => Operation::UpdateAllPools,
            OperationConfig::Deposit {
                pool_id,
                amount,
                to,
            } => Operation::Deposit {
                pool_id: *pool_id,
                amount: amount.value()?,
                to: beneficiary(to),
            },
            OperationConfig::Withdraw {
                pool_id,
                amount,
                to,
            } => Operation::Withdraw {
                pool_id: *pool_id,
                amount: amount.value()?,
                to: beneficiary(to),
            },
            OperationConfig::Harvest { pool_id, to } => Operation::Harvest {
                pool_id: *pool_id,
                to: beneficiary(to),
            },
            OperationConfig::WithdrawAndHarvest {
                pool_id,
                amount,
                to,
            } => Operation::WithdrawAndHarvest {
                pool_id: *pool_id,
                amount: amount.value()?,
                to: beneficiary(to),
            },
            OperationConfig::EmergencyExit { pool_id, to } => Operation::EmergencyExit {
                pool_id: *pool_id,
                to: beneficiary(to),
            },
            OperationConfig::DepositReward { amount } => Operation::DepositReward {
                amount: amount.value()?,
            },
        };
        Ok(operation)
    }
}

fn resolve_rewarder(
    name: &Option<String>,
    rewarders: &RewarderRegistry,
) -> Result<RewarderHook, ConfigError> {
    match name {
        None => Ok(RewarderHook::Disabled),
        Some(name) => rewarders
            .get(name)
            .cloned()
            .map(RewarderHook::new)
            .ok_or_else(|| ConfigError::UnknownRewarder(name.clone())),
    }
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &path[1..]);
        }
    }
    path.to_string()
}
