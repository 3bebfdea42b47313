// crates/furrow-economics/src/journal.rs
//
// Undo records for engine transactions.
//
// `JournaledLedger` wraps the host ledger and remembers every transfer made
// through it. A failed transaction rewinds to its mark by replaying the
// recorded transfers backwards, so the host ledger never has to be cloned.
// `PositionJournal` does the same for positions: it keeps the value a
// position held before each mutable access.

use furrow_core::error::FurrowError;
use furrow_core::identity::{AccountId, AssetId, PoolId};
use furrow_core::traits::AssetLedger;

use crate::position::{PositionBook, UserPosition};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Transfer {
    asset: AssetId,
    from: AccountId,
    to: AccountId,
    amount: u128,
}

/// Host ledger plus the transfers made since the last commit.
#[derive(Debug)]
pub(crate) struct JournaledLedger<L> {
    inner: L,
    transfers: Vec<Transfer>,
}

impl<L: AssetLedger> JournaledLedger<L> {
    pub(crate) fn new(inner: L) -> Self {
        Self {
            inner,
            transfers: Vec::new(),
        }
    }

    pub(crate) fn inner(&self) -> &L {
        &self.inner
    }

    /// Bypasses the journal. Only for use outside a transaction.
    pub(crate) fn inner_mut(&mut self) -> &mut L {
        &mut self.inner
    }

    pub(crate) fn mark(&self) -> usize {
        self.transfers.len()
    }

    /// Undo every transfer recorded after `mark`, newest first.
    pub(crate) fn rewind(&mut self, mark: usize) {
        for transfer in self.transfers.drain(mark..).rev() {
            if let Err(err) = self.inner.transfer(
                &transfer.asset,
                &transfer.to,
                &transfer.from,
                transfer.amount,
            ) {
                tracing::error!(
                    "Could not undo transfer of {} {} from {} to {}: {}",
                    transfer.amount,
                    transfer.asset,
                    transfer.from,
                    transfer.to,
                    err
                );
            }
        }
    }

    /// Drop the journal once the outermost transaction has committed.
    pub(crate) fn commit(&mut self) {
        self.transfers.clear();
    }
}

impl<L: AssetLedger> AssetLedger for JournaledLedger<L> {
    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> u128 {
        self.inner.balance_of(asset, account)
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), FurrowError> {
        self.inner.transfer(asset, from, to, amount)?;
        if amount > 0 && from != to {
            self.transfers.push(Transfer {
                asset: asset.clone(),
                from: from.clone(),
                to: to.clone(),
                amount,
            });
        }
        Ok(())
    }
}

/// Prior values of positions touched since the last commit.
#[derive(Debug, Default)]
pub(crate) struct PositionJournal {
    entries: Vec<(PoolId, AccountId, Option<UserPosition>)>,
}

impl PositionJournal {
    pub(crate) fn mark(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn record(&mut self, pool_id: PoolId, user: &AccountId, previous: Option<UserPosition>) {
        self.entries.push((pool_id, user.clone(), previous));
    }

    /// Put back every position recorded after `mark`. Newest first, so a
    /// position touched twice ends at its oldest recorded value.
    pub(crate) fn rewind(&mut self, mark: usize, book: &mut PositionBook) {
        for (pool_id, user, previous) in self.entries.drain(mark..).rev() {
            book.restore(pool_id, &user, previous);
        }
    }

    pub(crate) fn commit(&mut self) {
        self.entries.clear();
    }
}
