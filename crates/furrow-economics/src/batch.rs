// crates/furrow-economics/src/batch.rs
//
// Several engine operations under one call context.
//
// In revert mode the batch is a single transaction: the first failure
// undoes every earlier operation and is returned. In best-effort mode each
// operation is its own transaction; failures are recorded and the batch
// carries on.

use furrow_core::error::FurrowError;
use furrow_core::identity::{AccountId, AssetId, CallContext, PoolId};
use furrow_core::traits::AssetLedger;

use crate::chef::Chef;
use crate::pool::RewarderHook;

/// One mutating engine call, minus the call context.
#[derive(Debug, Clone)]
pub enum Operation {
    AddPool {
        alloc_weight: u64,
        stake_asset: AssetId,
        rewarder: RewarderHook,
    },
    SetPool {
        pool_id: PoolId,
        alloc_weight: u64,
        rewarder: RewarderHook,
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
        amount: u128,
        to: AccountId,
    },
    Withdraw {
        pool_id: PoolId,
        amount: u128,
        to: AccountId,
    },
    Harvest {
        pool_id: PoolId,
        to: AccountId,
    },
    WithdrawAndHarvest {
        pool_id: PoolId,
        amount: u128,
        to: AccountId,
    },
    EmergencyExit {
        pool_id: PoolId,
        to: AccountId,
    },
    DepositReward {
        amount: u128,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddPool { .. } => "add",
            Operation::SetPool { .. } => "set",
            Operation::UpdatePool { .. } => "update_pool",
            Operation::MassUpdatePools { .. } => "mass_update_pools",
            Operation::UpdateAllPools => "update_all_pools",
            Operation::Deposit { .. } => "deposit",
            Operation::Withdraw { .. } => "withdraw",
            Operation::Harvest { .. } => "harvest",
            Operation::WithdrawAndHarvest { .. } => "withdraw_and_harvest",
            Operation::EmergencyExit { .. } => "emergency_exit",
            Operation::DepositReward { .. } => "deposit_reward",
        }
    }
}

/// Per-operation results of a batch, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<Result<(), FurrowError>>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

impl<L: AssetLedger> Chef<L> {
    /// Run `operations` in order under `ctx`.
    ///
    /// # Errors
    /// With `revert_on_failure`, the first failing operation's error; all
    /// earlier operations are undone. Without it this never fails: errors
    /// are reported per operation.
    pub fn execute(
        &mut self,
        ctx: &CallContext,
        operations: Vec<Operation>,
        revert_on_failure: bool,
    ) -> Result<BatchReport, FurrowError> {
        if revert_on_failure {
            return self.transact("batch", |chef| {
                let mut report = BatchReport::default();
                for operation in operations {
                    chef.apply(ctx, operation)?;
                    report.outcomes.push(Ok(()));
                }
                Ok(report)
            });
        }

        let mut report = BatchReport::default();
        for (position, operation) in operations.into_iter().enumerate() {
            let name = operation.name();
            let outcome = self.apply(ctx, operation);
            if let Err(err) = &outcome {
                tracing::warn!("Batch operation {} ({}) failed: {}", position, name, err);
            }
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    /// Dispatch one operation to its engine method.
    pub fn apply(&mut self, ctx: &CallContext, operation: Operation) -> Result<(), FurrowError> {
        match operation {
            Operation::AddPool {
                alloc_weight,
                stake_asset,
                rewarder,
            } => self.add(ctx, alloc_weight, stake_asset, rewarder).map(|_| ()),
            Operation::SetPool {
                pool_id,
                alloc_weight,
                rewarder,
                overwrite,
            } => self.set(ctx, pool_id, alloc_weight, rewarder, overwrite),
            Operation::UpdatePool { pool_id } => self.update_pool(ctx, pool_id),
            Operation::MassUpdatePools { pool_ids } => self.mass_update_pools(ctx, &pool_ids),
            Operation::UpdateAllPools => self.update_all_pools(ctx),
            Operation::Deposit {
                pool_id,
                amount,
                to,
            } => self.deposit(ctx, pool_id, amount, &to),
            Operation::Withdraw {
                pool_id,
                amount,
                to,
            } => self.withdraw(ctx, pool_id, amount, &to),
            Operation::Harvest { pool_id, to } => self.harvest(ctx, pool_id, &to).map(|_| ()),
            Operation::WithdrawAndHarvest {
                pool_id,
                amount,
                to,
            } => self
                .withdraw_and_harvest(ctx, pool_id, amount, &to)
                .map(|_| ()),
            Operation::EmergencyExit { pool_id, to } => {
                self.emergency_exit(ctx, pool_id, &to).map(|_| ())
            }
            Operation::DepositReward { amount } => self.deposit_reward(ctx, amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use furrow_core::traits::SingleOwner;

    use super::*;
    use crate::emission::EmissionSchedule;
    use crate::token::MemoryBank;

    fn chef() -> Chef<MemoryBank> {
        let schedule = EmissionSchedule::new(3, 3, 1_000).unwrap();
        let mut bank = MemoryBank::new();
        bank.mint(&AssetId::from("LP"), &AccountId::from("owner"), 50);
        Chef::new(
            schedule,
            Arc::new(SingleOwner::new("owner")),
            "chef",
            "SUSHI",
            bank,
        )
    }

    fn add(asset: &str) -> Operation {
        Operation::AddPool {
            alloc_weight: 1,
            stake_asset: AssetId::from(asset),
            rewarder: RewarderHook::Disabled,
        }
    }

    #[test]
    fn test_revert_mode_undoes_everything() {
        let mut chef = chef();
        let ctx = CallContext::new("owner", 4);
        let result = chef.execute(&ctx, vec![add("LP"), add("LP")], true);
        assert_eq!(result, Err(FurrowError::DuplicateStakeAsset(AssetId::from("LP"))));
        assert_eq!(chef.pool_length(), 0);
        assert!(chef.events().is_empty());
    }

    #[test]
    fn test_best_effort_reports_failures() {
        let mut chef = chef();
        let ctx = CallContext::new("owner", 4);
        let owner = AccountId::from("owner");
        let report = chef
            .execute(
                &ctx,
                vec![
                    add("LP"),
                    add("LP"),
                    Operation::Deposit {
                        pool_id: 0,
                        amount: 20,
                        to: owner.clone(),
                    },
                ],
                false,
            )
            .unwrap();
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_clean());
        assert!(report.outcomes[1].is_err());
        assert_eq!(chef.user_position(0, &owner).staked_amount, 20);
    }

    #[test]
    fn test_revert_mode_success() {
        let mut chef = chef();
        let ctx = CallContext::new("owner", 4);
        let report = chef
            .execute(&ctx, vec![add("LP"), add("XLP"), Operation::UpdateAllPools], true)
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(chef.pool_length(), 2);
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(add("LP").name(), "add");
        assert_eq!(Operation::DepositReward { amount: 1 }.name(), "deposit_reward");
    }
}
