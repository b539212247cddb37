//! Account collaborator.
//!
//! The engine does not own accounts. It asks an [`AccountBook`] for account
//! attributes, tells it when split membership changes, and asks it to
//! recompute running balances. [`InMemoryAccountBook`] is the in-process
//! implementation.

use core::cmp::Ordering;
use std::collections::HashMap;

use splitbook_core::{AccountId, CommodityId, Entity, ReconcileState, SplitId, TransactionId};

use crate::arena::Arena;
use crate::order::{SplitPosition, split_order};
use crate::split::{RunningBalance, Split};
use crate::transaction::Transaction;

/// An account as seen by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    id: AccountId,
    name: String,
    currency: CommodityId,
    security: Option<CommodityId>,
    changed: bool,
    defer_rebalance: bool,
    splits: Vec<SplitId>,
}

impl Account {
    pub fn new(name: impl Into<String>, currency: CommodityId) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            currency,
            security: None,
            changed: false,
            defer_rebalance: false,
            splits: Vec::new(),
        }
    }

    /// Account holding a security priced in `currency`.
    pub fn with_security(mut self, security: CommodityId) -> Self {
        self.security = Some(security);
        self
    }

    pub fn id_typed(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &CommodityId {
        &self.currency
    }

    pub fn security(&self) -> Option<&CommodityId> {
        self.security.as_ref()
    }

    /// Dirty flag: set whenever one of the account's splits is mutated.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn defers_rebalance(&self) -> bool {
        self.defer_rebalance
    }

    /// Member splits in ledger order.
    pub fn splits(&self) -> &[SplitId] {
        &self.splits
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Read-only view of engine storage handed to the account collaborator.
#[derive(Debug, Copy, Clone)]
pub struct Postings<'a> {
    splits: &'a Arena<Split>,
    transactions: &'a Arena<Transaction>,
}

impl<'a> Postings<'a> {
    pub(crate) fn new(splits: &'a Arena<Split>, transactions: &'a Arena<Transaction>) -> Self {
        Self {
            splits,
            transactions,
        }
    }

    pub fn split(&self, id: SplitId) -> Option<&'a Split> {
        self.splits.get(id)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&'a Transaction> {
        self.transactions.get(id)
    }

    pub fn position(&self, id: SplitId) -> Option<SplitPosition<'a>> {
        let split = self.split(id)?;
        let parent = split.parent().and_then(|t| self.transaction(t));
        Some(SplitPosition { split, parent })
    }

    /// Ledger order of two splits; stale ids sort last.
    pub fn compare(&self, a: SplitId, b: SplitId) -> Ordering {
        split_order(self.position(a), self.position(b))
    }
}

/// Operations the engine needs from whoever owns accounts.
pub trait AccountBook {
    fn account(&self, id: AccountId) -> Option<&Account>;

    fn mark_changed(&mut self, id: AccountId);

    /// Account-level "defer rebalance" bit.
    fn defers_rebalance(&self, id: AccountId) -> bool {
        self.account(id).is_some_and(Account::defers_rebalance)
    }

    /// Add `split` to the account, keeping membership in ledger order.
    fn insert_split(&mut self, id: AccountId, split: SplitId, postings: &Postings<'_>);

    fn remove_split(&mut self, id: AccountId, split: SplitId);

    /// Move `split` to its ordered position if it drifted. Returns whether
    /// it had to move.
    fn check_date_order(&mut self, id: AccountId, split: SplitId, postings: &Postings<'_>) -> bool;

    /// Running balances for every member split, in ledger order.
    fn recompute_balances(
        &mut self,
        id: AccountId,
        postings: &Postings<'_>,
    ) -> Vec<(SplitId, RunningBalance)>;

    /// Find an account named `name` related to account `id`.
    fn find_peer_by_name(&self, id: AccountId, name: &str) -> Option<AccountId>;
}

/// In-memory account book. All accounts in a book are peers of each other.
#[derive(Debug, Default)]
pub struct InMemoryAccountBook {
    accounts: HashMap<AccountId, Account>,
}

impl InMemoryAccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&mut self, account: Account) -> AccountId {
        let id = *account.id();
        self.accounts.insert(id, account);
        id
    }

    pub fn set_defer_rebalance(&mut self, id: AccountId, defer: bool) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.defer_rebalance = defer;
        }
    }

    pub fn clear_changed(&mut self, id: AccountId) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.changed = false;
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountBook for InMemoryAccountBook {
    fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    fn mark_changed(&mut self, id: AccountId) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.changed = true;
        }
    }

    fn insert_split(&mut self, id: AccountId, split: SplitId, postings: &Postings<'_>) {
        let Some(account) = self.accounts.get_mut(&id) else {
            tracing::warn!(account = %id, split = %split, "insert into unknown account ignored");
            return;
        };

        account.splits.retain(|s| *s != split);
        let at = account
            .splits
            .partition_point(|s| postings.compare(*s, split) != Ordering::Greater);
        account.splits.insert(at, split);
        account.changed = true;
    }

    fn remove_split(&mut self, id: AccountId, split: SplitId) {
        if let Some(account) = self.accounts.get_mut(&id) {
            account.splits.retain(|s| *s != split);
            account.changed = true;
        }
    }

    fn check_date_order(&mut self, id: AccountId, split: SplitId, postings: &Postings<'_>) -> bool {
        let Some(account) = self.accounts.get(&id) else {
            return false;
        };
        let Some(at) = account.splits.iter().position(|s| *s == split) else {
            return false;
        };

        let after_prev = at == 0
            || postings.compare(account.splits[at - 1], split) != Ordering::Greater;
        let before_next = at + 1 >= account.splits.len()
            || postings.compare(split, account.splits[at + 1]) != Ordering::Greater;
        if after_prev && before_next {
            return false;
        }

        tracing::debug!(account = %id, split = %split, "split out of date order; re-inserting");
        self.insert_split(id, split, postings);
        true
    }

    fn recompute_balances(
        &mut self,
        id: AccountId,
        postings: &Postings<'_>,
    ) -> Vec<(SplitId, RunningBalance)> {
        let Some(account) = self.accounts.get(&id) else {
            return Vec::new();
        };

        let mut running = RunningBalance::default();
        let mut out = Vec::with_capacity(account.splits.len());
        for split_id in &account.splits {
            let Some(split) = postings.split(*split_id) else {
                continue;
            };
            let amount = split.share_amount();
            let value = split.value();

            running.balance += value;
            running.share_balance += amount;
            if split.reconcile().is_cleared() {
                running.cleared += value;
                running.share_cleared += amount;
            }
            if split.reconcile() == ReconcileState::Reconciled {
                running.reconciled += value;
                running.share_reconciled += amount;
            }
            out.push((*split_id, running));
        }
        out
    }

    fn find_peer_by_name(&self, id: AccountId, name: &str) -> Option<AccountId> {
        if !self.accounts.contains_key(&id) {
            return None;
        }
        self.accounts
            .values()
            .find(|a| a.name == name)
            .map(Account::id_typed)
    }
}
