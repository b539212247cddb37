//! Edit sessions: begin, commit and destroy.
//!
//! A transaction is `Closed` until `begin_edit` opens it. While open,
//! field and membership mutators are accepted; with `defer_rebalance` set
//! they skip rebalancing until `commit_edit`. Commit rebalances from the
//! source split, puts every split back in date order within its account
//! and recomputes the balances of each account involved.

use std::collections::HashSet;

use splitbook_core::{AccountId, LedgerError, LedgerResult, SplitId, TransactionId};
use splitbook_journal::{Journal, JournalEventKind};

use crate::account::{AccountBook, Postings};
use crate::ledger::Ledger;
use crate::split::Split;
use crate::transaction::EditState;

impl<A: AccountBook, J: Journal> Ledger<A, J> {
    /// Open `trans` for editing and log a `Begin` record.
    ///
    /// Opening an already open transaction only updates the defer flag.
    pub fn begin_edit(&mut self, trans: TransactionId, defer_rebalance: bool) -> LedgerResult<()> {
        self.transaction_mut(trans)?.edit = EditState::Open { defer_rebalance };
        self.journal.open()?;
        self.write_journal(trans, JournalEventKind::Begin)?;
        tracing::debug!(transaction = %trans, defer_rebalance, "edit session opened");
        Ok(())
    }

    /// Close the session: rebalance, restore date order, recompute
    /// balances and log a `Commit` record.
    pub fn commit_edit(&mut self, trans: TransactionId) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.transaction_mut(trans)?.edit = EditState::Open {
            defer_rebalance: false,
        };

        self.rebalance_transaction(trans)?;

        let ids = self.transaction_ref(trans)?.splits().to_vec();
        let mut touched: Vec<AccountId> = Vec::new();
        let mut seen = HashSet::new();
        for id in &ids {
            let Some(account) = self.splits.get(*id).and_then(Split::account) else {
                continue;
            };
            let postings = Postings::new(&self.splits, &self.transactions);
            self.accounts.check_date_order(account, *id, &postings);
            if seen.insert(account) {
                touched.push(account);
            }
        }
        for account in touched {
            self.recompute_account(Some(account));
        }

        self.transaction_mut(trans)?.edit = EditState::Closed;
        self.write_journal(trans, JournalEventKind::Commit)?;
        tracing::debug!(transaction = %trans, splits = ids.len(), "edit session committed");
        Ok(())
    }

    /// Destroy an open transaction together with all its splits.
    pub fn destroy_transaction(&mut self, trans: TransactionId) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.discard_transaction(trans)
    }

    fn discard_transaction(&mut self, trans: TransactionId) -> LedgerResult<()> {
        self.write_journal(trans, JournalEventKind::Destroy)?;

        let ids = self.transaction_ref(trans)?.splits().to_vec();
        for id in &ids {
            self.mark_split(*id);
            let account = self.splits.get(*id).and_then(Split::account);
            if let Some(account) = account {
                self.accounts.remove_split(account, *id);
            }
            self.splits.remove(*id);
            self.recompute_account(account);
        }
        self.transactions.remove(trans);

        tracing::debug!(transaction = %trans, splits = ids.len(), "transaction destroyed");
        Ok(())
    }

    /// Destroy one split of an open transaction.
    ///
    /// With more than two splits only `split` goes and the rest are
    /// rebalanced. Otherwise the whole transaction is discarded, since a
    /// lone remaining split could not balance.
    pub fn destroy_split(&mut self, split: SplitId) -> LedgerResult<()> {
        let Some(trans) = self.split_ref(split)?.parent() else {
            tracing::error!(split = %split, "destroy_split on a detached split");
            return Err(LedgerError::DetachedSplit(split));
        };
        self.ensure_open(trans)?;

        let t = self.transaction_ref(trans)?;
        if !t.contains(split) {
            return Err(LedgerError::invariant(format!(
                "split {split} names transaction {trans} as parent but is not one of its splits"
            )));
        }
        if t.split_count() <= 2 {
            return self.discard_transaction(trans);
        }

        self.mark_split(split);
        self.transaction_mut(trans)?.remove_split(split);
        let account = self.split_ref(split)?.account();
        if let Some(account) = account {
            self.accounts.remove_split(account, split);
        }
        self.splits.remove(split);
        self.recompute_account(account);

        tracing::debug!(transaction = %trans, split = %split, "split destroyed");
        self.rebalance_transaction(trans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use splitbook_core::{CommodityId, EnforcementMode, EngineConfig};
    use splitbook_journal::JournalRecord;

    fn usd() -> CommodityId {
        CommodityId::new("USD").unwrap()
    }

    fn kinds(ledger: &Ledger, trans: TransactionId) -> Vec<JournalEventKind> {
        ledger
            .journal()
            .entries_for(trans)
            .into_iter()
            .map(|r: &JournalRecord| r.kind)
            .collect()
    }

    #[test]
    fn begin_and_commit_are_journaled() {
        let mut ledger = Ledger::default();
        let trans = ledger.create_transaction();
        assert!(!ledger.journal().is_open());

        ledger.begin_edit(trans, false).unwrap();
        assert!(ledger.journal().is_open());
        assert!(ledger.transaction(trans).unwrap().is_open());

        ledger.set_description(trans, "Groceries").unwrap();
        ledger.commit_edit(trans).unwrap();

        assert!(!ledger.transaction(trans).unwrap().is_open());
        assert_eq!(
            kinds(&ledger, trans),
            vec![JournalEventKind::Begin, JournalEventKind::Commit]
        );
        let committed = ledger.journal().entries_for(trans)[1];
        assert_eq!(committed.transaction.description, "Groceries");
    }

    #[test]
    fn commit_requires_open_session() {
        let mut ledger = Ledger::default();
        let trans = ledger.create_transaction();
        assert_eq!(ledger.commit_edit(trans), Err(LedgerError::NotOpen(trans)));
        assert_eq!(ledger.destroy_transaction(trans), Err(LedgerError::NotOpen(trans)));
        assert!(ledger.journal().entries().is_empty());
    }

    #[test]
    fn destroy_transaction_removes_splits_from_accounts() {
        let mut ledger = Ledger::default();
        let acc = ledger.accounts_mut().add_account(Account::new("Checking", usd()));
        let trans = ledger.create_transaction();
        ledger.begin_edit(trans, false).unwrap();
        let source = ledger.split_at(trans, 0).unwrap();
        let other = ledger.create_split();
        ledger.append_split(trans, other).unwrap();
        ledger.insert_split_into_account(acc, source).unwrap();
        ledger.insert_split_into_account(acc, other).unwrap();

        ledger.destroy_transaction(trans).unwrap();

        assert!(ledger.transaction(trans).is_none());
        assert!(ledger.split(source).is_none());
        assert!(ledger.split(other).is_none());
        assert!(ledger.accounts().account(acc).unwrap().splits().is_empty());
        assert_eq!(
            kinds(&ledger, trans),
            vec![JournalEventKind::Begin, JournalEventKind::Destroy]
        );
    }

    #[test]
    fn destroying_a_detached_split_is_fatal() {
        let mut ledger = Ledger::default();
        let loose = ledger.create_split();
        let err = ledger.destroy_split(loose).unwrap_err();
        assert_eq!(err, LedgerError::DetachedSplit(loose));
        assert!(err.is_fatal());
    }

    #[test]
    fn destroy_split_needs_open_parent() {
        let mut ledger = Ledger::default();
        let trans = ledger.create_transaction();
        let source = ledger.split_at(trans, 0).unwrap();
        assert_eq!(ledger.destroy_split(source), Err(LedgerError::NotOpen(trans)));
        assert!(ledger.split(source).is_some());
    }

    #[test]
    fn commit_restores_balance_and_date_order() {
        let mut ledger = Ledger::new(EngineConfig::new(EnforcementMode::ForceBalance));
        let cash = ledger.accounts_mut().add_account(Account::new("Cash", usd()));
        let food = ledger.accounts_mut().add_account(Account::new("Food", usd()));

        let trans = ledger.create_transaction();
        ledger.begin_edit(trans, true).unwrap();
        let source = ledger.split_at(trans, 0).unwrap();
        let other = ledger.create_split();
        ledger.insert_split_into_account(cash, source).unwrap();
        ledger.insert_split_into_account(food, other).unwrap();
        ledger.append_split(trans, other).unwrap();
        ledger.set_share_amount(source, -12.5).unwrap();
        assert_eq!(ledger.value(other), 0.0);

        ledger.commit_edit(trans).unwrap();
        assert_eq!(ledger.value(other), 12.5);
        assert_eq!(ledger.balance(other), 12.5);
        assert_eq!(ledger.balance(source), -12.5);
        assert!(ledger.is_balanced(trans).unwrap());
    }
}
