// crates/furrow-economics/src/token.rs
//
// Token amounts and the in-memory asset ledger.
//
// Every asset is accounted in raw integer units. The reward asset uses 18
// decimals: 1 token = 10^18 units. `MemoryBank` is the ledger used by the
// CLI simulator and the tests; hosts embedding the engine supply their own
// `AssetLedger`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use furrow_core::error::FurrowError;
use furrow_core::identity::{AccountId, AssetId};
use furrow_core::traits::AssetLedger;

/// Decimal places of the reward asset.
pub const REWARD_DECIMALS: u32 = 18;

/// Raw units in one whole reward token (10^18).
pub const UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// A raw amount rendered with a fixed number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    pub units: u128,
    pub decimals: u32,
}

impl TokenAmount {
    /// An amount of the reward asset.
    pub fn reward(units: u128) -> Self {
        Self {
            units,
            decimals: REWARD_DECIMALS,
        }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Past 38 decimals the scale does not fit: print raw units.
        let Some(scale) = 10u128.checked_pow(self.decimals) else {
            return write!(f, "{}", self.units);
        };
        let whole = self.units / scale;
        let frac = self.units % scale;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            // Trailing zeros are dropped.
            let frac_str = format!("{:0width$}", frac, width = self.decimals as usize);
            write!(f, "{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }
}

/// Balances keyed by (asset, account). Two banks are equal when their
/// nonzero balances are.
#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    balances: HashMap<(AssetId, AccountId), u128>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `account` out of thin air.
    ///
    /// # Errors
    /// Returns `FurrowError::ArithmeticOverflow` if the balance would exceed `u128`.
    pub fn try_mint(
        &mut self,
        asset: &AssetId,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), FurrowError> {
        let balance = self
            .balances
            .entry((asset.clone(), account.clone()))
            .or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(FurrowError::ArithmeticOverflow("balance"))?;
        Ok(())
    }

    /// Like `try_mint`, saturating at `u128::MAX`.
    pub fn mint(&mut self, asset: &AssetId, account: &AccountId, amount: u128) {
        let balance = self
            .balances
            .entry((asset.clone(), account.clone()))
            .or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Nonzero balances, sorted by asset then account.
    pub fn balances(&self) -> Vec<(&AssetId, &AccountId, u128)> {
        let mut rows: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, &amount)| amount > 0)
            .map(|((asset, account), &amount)| (asset, account, amount))
            .collect();
        rows.sort();
        rows
    }
}

impl PartialEq for MemoryBank {
    fn eq(&self, other: &Self) -> bool {
        self.balances() == other.balances()
    }
}

impl Eq for MemoryBank {}

impl AssetLedger for MemoryBank {
    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> u128 {
        self.balances
            .get(&(asset.clone(), account.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), FurrowError> {
        let available = self.balance_of(asset, from);
        if amount > available {
            return Err(FurrowError::InsufficientBalance {
                asset: asset.clone(),
                account: from.clone(),
                requested: amount,
                available,
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(FurrowError::ArithmeticOverflow("balance"))?;
        self.balances
            .insert((asset.clone(), from.clone()), available - amount);
        self.balances.insert((asset.clone(), to.clone()), credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lp() -> AssetId {
        AssetId::from("LP")
    }

    #[test]
    fn test_units_per_token() {
        assert_eq!(UNITS_PER_TOKEN, 10u128.pow(REWARD_DECIMALS));
    }

    #[test]
    fn test_display_whole() {
        assert_eq!(TokenAmount::reward(42 * UNITS_PER_TOKEN).to_string(), "42");
    }

    #[test]
    fn test_display_fractional() {
        let rate = TokenAmount::reward(151_629_858_171_523_000_000);
        assert_eq!(rate.to_string(), "151.629858171523");
    }

    #[test]
    fn test_display_small() {
        assert_eq!(TokenAmount::reward(5).to_string(), "0.000000000000000005");
        assert_eq!(TokenAmount::reward(0).to_string(), "0");
    }

    #[test]
    fn test_display_beyond_u128_scale() {
        let amount = TokenAmount {
            units: 12_345,
            decimals: 39,
        };
        assert_eq!(amount.to_string(), "12345");
        let widest = TokenAmount {
            units: 5,
            decimals: 38,
        };
        assert_eq!(widest.to_string(), format!("0.{}5", "0".repeat(37)));
    }

    #[test]
    fn test_equality_ignores_emptied_accounts() {
        let (a, b) = (AccountId::from("a"), AccountId::from("b"));
        let mut bank = MemoryBank::new();
        bank.mint(&lp(), &a, 10);
        let before = bank.clone();
        bank.transfer(&lp(), &a, &b, 10).unwrap();
        bank.transfer(&lp(), &b, &a, 10).unwrap();
        assert_eq!(bank, before);
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut bank = MemoryBank::new();
        let (a, b) = (AccountId::from("a"), AccountId::from("b"));
        bank.mint(&lp(), &a, 10);
        bank.transfer(&lp(), &a, &b, 4).unwrap();
        assert_eq!(bank.balance_of(&lp(), &a), 6);
        assert_eq!(bank.balance_of(&lp(), &b), 4);
    }

    #[test]
    fn test_transfer_insufficient_is_noop() {
        let mut bank = MemoryBank::new();
        let (a, b) = (AccountId::from("a"), AccountId::from("b"));
        bank.mint(&lp(), &a, 3);
        let before = bank.clone();
        let result = bank.transfer(&lp(), &a, &b, 4);
        assert_eq!(
            result,
            Err(FurrowError::InsufficientBalance {
                asset: lp(),
                account: a.clone(),
                requested: 4,
                available: 3,
            })
        );
        assert_eq!(bank, before);
    }

    #[test]
    fn test_zero_transfer_from_empty_account() {
        let mut bank = MemoryBank::new();
        let (a, b) = (AccountId::from("a"), AccountId::from("b"));
        assert!(bank.transfer(&lp(), &a, &b, 0).is_ok());
    }

    #[test]
    fn test_try_mint_overflow() {
        let mut bank = MemoryBank::new();
        let a = AccountId::from("a");
        bank.mint(&lp(), &a, u128::MAX);
        assert!(bank.try_mint(&lp(), &a, 1).is_err());
        bank.mint(&lp(), &a, 1);
        assert_eq!(bank.balance_of(&lp(), &a), u128::MAX);
    }

    #[test]
    fn test_balances_sorted() {
        let mut bank = MemoryBank::new();
        bank.mint(&AssetId::from("B"), &AccountId::from("x"), 1);
        bank.mint(&AssetId::from("A"), &AccountId::from("y"), 2);
        bank.mint(&AssetId::from("A"), &AccountId::from("z"), 0);
        let rows = bank.balances();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, &AssetId::from("A"));
    }
}
