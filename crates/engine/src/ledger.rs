//! The ledger: owner of transactions and splits.
//!
//! Every engine operation goes through [`Ledger`]. It carries the engine
//! configuration, the account collaborator and the journal, so none of
//! them need to be global.
//!
//! Accessors that take an id are tolerant: a stale or unknown id yields a
//! documented default (0.0 amount, 1.0 price, `' '` reconcile flag, `None`
//! for references and text) instead of an error.

use core::cmp::Ordering;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use splitbook_core::{
    AccountId, EngineConfig, LedgerError, LedgerResult, ReconcileState, SplitId, TransactionId,
};
use splitbook_journal::{
    InMemoryJournal, Journal, JournalEventKind, JournalRecord, SplitSnapshot, TransactionSnapshot,
};

use crate::account::{AccountBook, InMemoryAccountBook, Postings};
use crate::arena::Arena;
use crate::order::{split_order, transaction_order};
use crate::rebalance::Synthesis;
use crate::split::{RunningBalance, Split};
use crate::transaction::Transaction;

/// Hour of day used when a posting date is given as a calendar day.
const CALENDAR_DAY_HOUR: u32 = 11;

/// Which split text field a transaction-level setter writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SplitText {
    Memo,
    Action,
}

impl SplitText {
    fn field(self, split: &mut Split) -> &mut String {
        match self {
            SplitText::Memo => &mut split.memo,
            SplitText::Action => &mut split.action,
        }
    }
}

fn finite(name: &str, value: f64) -> LedgerResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LedgerError::validation(format!("{name} must be finite, got {value}")))
    }
}

/// Transactions, splits and their collaborators.
#[derive(Debug)]
pub struct Ledger<A = InMemoryAccountBook, J = InMemoryJournal> {
    pub(crate) config: EngineConfig,
    pub(crate) splits: Arena<Split>,
    pub(crate) transactions: Arena<Transaction>,
    pub(crate) accounts: A,
    pub(crate) journal: J,
}

impl Ledger {
    /// Ledger with an in-memory account book and journal.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_collaborators(config, InMemoryAccountBook::new(), InMemoryJournal::new())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<A: AccountBook, J: Journal> Ledger<A, J> {
    pub fn with_collaborators(config: EngineConfig, accounts: A, journal: J) -> Self {
        Self {
            config,
            splits: Arena::default(),
            transactions: Arena::default(),
            accounts,
            journal,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn accounts_mut(&mut self) -> &mut A {
        &mut self.accounts
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }

    pub fn journal_mut(&mut self) -> &mut J {
        &mut self.journal
    }

    pub fn postings(&self) -> Postings<'_> {
        Postings::new(&self.splits, &self.transactions)
    }

    // ---- creation -------------------------------------------------------

    /// A new, detached, empty split.
    pub fn create_split(&mut self) -> SplitId {
        self.splits.insert(Split::empty())
    }

    /// A new closed transaction holding exactly one empty split.
    pub fn create_transaction(&mut self) -> TransactionId {
        let mut split = Split::empty();
        let trans = Transaction::with_source(split.id_typed());
        split.parent = Some(trans.id_typed());
        self.splits.insert(split);
        let id = self.transactions.insert(trans);
        tracing::debug!(transaction = %id, "transaction created");
        id
    }

    /// Discard a split that belongs to no transaction.
    ///
    /// Splits inside a transaction go through `destroy_split`.
    pub fn discard_split(&mut self, split: SplitId) -> LedgerResult<()> {
        let s = self.split_ref(split)?;
        if s.parent().is_some() {
            return Err(LedgerError::validation(format!(
                "split {split} belongs to a transaction; destroy it through the transaction"
            )));
        }
        if let Some(acc) = s.account() {
            self.accounts.remove_split(acc, split);
            self.recompute_account(Some(acc));
        }
        self.splits.remove(split);
        Ok(())
    }

    // ---- lookup ---------------------------------------------------------

    pub fn split(&self, id: SplitId) -> Option<&Split> {
        self.splits.get(id)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    /// Number of live splits, attached or not.
    pub fn split_count(&self) -> usize {
        self.splits.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Live transaction ids in ledger order.
    pub fn transactions_in_order(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = self.transactions.values().map(Transaction::id_typed).collect();
        self.sort_transactions(&mut ids);
        ids
    }

    pub(crate) fn split_ref(&self, id: SplitId) -> LedgerResult<&Split> {
        self.splits
            .get(id)
            .ok_or_else(|| LedgerError::not_found(format!("split {id}")))
    }

    pub(crate) fn split_mut(&mut self, id: SplitId) -> LedgerResult<&mut Split> {
        self.splits
            .get_mut(id)
            .ok_or_else(|| LedgerError::not_found(format!("split {id}")))
    }

    pub(crate) fn transaction_ref(&self, id: TransactionId) -> LedgerResult<&Transaction> {
        self.transactions
            .get(id)
            .ok_or_else(|| LedgerError::not_found(format!("transaction {id}")))
    }

    pub(crate) fn transaction_mut(&mut self, id: TransactionId) -> LedgerResult<&mut Transaction> {
        self.transactions
            .get_mut(id)
            .ok_or_else(|| LedgerError::not_found(format!("transaction {id}")))
    }

    // ---- tolerant split accessors --------------------------------------

    pub fn share_amount(&self, split: SplitId) -> f64 {
        self.split(split).map_or(0.0, Split::share_amount)
    }

    pub fn share_price(&self, split: SplitId) -> f64 {
        self.split(split).map_or(1.0, Split::share_price)
    }

    /// Value in the split's account currency.
    pub fn value(&self, split: SplitId) -> f64 {
        self.split(split).map_or(0.0, Split::value)
    }

    /// Reconcile flag character; `' '` for an unknown split.
    pub fn reconcile_flag(&self, split: SplitId) -> char {
        self.split(split).map_or(' ', |s| s.reconcile().as_char())
    }

    pub fn reconcile_state(&self, split: SplitId) -> Option<ReconcileState> {
        self.split(split).map(Split::reconcile)
    }

    pub fn date_reconciled(&self, split: SplitId) -> DateTime<Utc> {
        self.split(split)
            .map_or_else(DateTime::<Utc>::default, Split::date_reconciled)
    }

    pub fn memo(&self, split: SplitId) -> Option<&str> {
        self.split(split).map(Split::memo)
    }

    pub fn action(&self, split: SplitId) -> Option<&str> {
        self.split(split).map(Split::action)
    }

    pub fn split_docref(&self, split: SplitId) -> Option<&str> {
        self.split(split).map(Split::docref)
    }

    pub fn split_account(&self, split: SplitId) -> Option<AccountId> {
        self.split(split).and_then(Split::account)
    }

    pub fn split_parent(&self, split: SplitId) -> Option<TransactionId> {
        self.split(split).and_then(Split::parent)
    }

    pub fn running_balance(&self, split: SplitId) -> RunningBalance {
        self.split(split)
            .map(|s| *s.running_balance())
            .unwrap_or_default()
    }

    pub fn balance(&self, split: SplitId) -> f64 {
        self.running_balance(split).balance
    }

    pub fn cleared_balance(&self, split: SplitId) -> f64 {
        self.running_balance(split).cleared
    }

    pub fn reconciled_balance(&self, split: SplitId) -> f64 {
        self.running_balance(split).reconciled
    }

    pub fn share_balance(&self, split: SplitId) -> f64 {
        self.running_balance(split).share_balance
    }

    pub fn share_cleared_balance(&self, split: SplitId) -> f64 {
        self.running_balance(split).share_cleared
    }

    pub fn share_reconciled_balance(&self, split: SplitId) -> f64 {
        self.running_balance(split).share_reconciled
    }

    // ---- tolerant transaction accessors --------------------------------

    pub fn num(&self, trans: TransactionId) -> Option<&str> {
        self.transaction(trans).map(Transaction::num)
    }

    pub fn description(&self, trans: TransactionId) -> Option<&str> {
        self.transaction(trans).map(Transaction::description)
    }

    pub fn transaction_docref(&self, trans: TransactionId) -> Option<&str> {
        self.transaction(trans).map(Transaction::docref)
    }

    /// Posted date; the Unix epoch for an unknown transaction.
    pub fn date_posted(&self, trans: TransactionId) -> DateTime<Utc> {
        self.transaction(trans)
            .map_or_else(DateTime::<Utc>::default, Transaction::date_posted)
    }

    pub fn date_entered(&self, trans: TransactionId) -> DateTime<Utc> {
        self.transaction(trans)
            .map_or_else(DateTime::<Utc>::default, Transaction::date_entered)
    }

    pub fn split_at(&self, trans: TransactionId, index: usize) -> Option<SplitId> {
        self.transaction(trans).and_then(|t| t.split_at(index))
    }

    pub fn transaction_split_count(&self, trans: TransactionId) -> usize {
        self.transaction(trans).map_or(0, Transaction::split_count)
    }

    // ---- guards and bookkeeping ----------------------------------------

    pub(crate) fn ensure_open(&self, trans: TransactionId) -> LedgerResult<()> {
        if self.transaction_ref(trans)?.is_open() {
            Ok(())
        } else {
            tracing::warn!(transaction = %trans, "mutation rejected: transaction not open for editing");
            Err(LedgerError::NotOpen(trans))
        }
    }

    /// Splits inside a transaction may only change while it is open.
    pub(crate) fn ensure_split_editable(&self, split: SplitId) -> LedgerResult<()> {
        match self.split_ref(split)?.parent() {
            Some(parent) => self.ensure_open(parent),
            None => Ok(()),
        }
    }

    pub(crate) fn mark_split(&mut self, split: SplitId) {
        if let Some(acc) = self.splits.get(split).and_then(Split::account) {
            self.accounts.mark_changed(acc);
        }
    }

    pub(crate) fn mark_transaction(&mut self, trans: TransactionId) {
        let ids = match self.transactions.get(trans) {
            Some(t) => t.splits().to_vec(),
            None => return,
        };
        for id in ids {
            self.mark_split(id);
        }
    }

    /// Ask the account collaborator for fresh running balances and cache
    /// them on the splits.
    pub(crate) fn recompute_account(&mut self, account: Option<AccountId>) {
        let Some(account) = account else {
            return;
        };
        let postings = Postings::new(&self.splits, &self.transactions);
        let balances = self.accounts.recompute_balances(account, &postings);
        for (id, running) in balances {
            if let Some(split) = self.splits.get_mut(id) {
                split.running = running;
            }
        }
    }

    // ---- split mutators --------------------------------------------------

    pub fn set_share_price_and_amount(
        &mut self,
        split: SplitId,
        price: f64,
        amount: f64,
    ) -> LedgerResult<()> {
        let price = finite("share price", price)?;
        let amount = finite("share amount", amount)?;
        self.ensure_split_editable(split)?;
        self.mark_split(split);
        let s = self.split_mut(split)?;
        s.share_price = price;
        s.share_amount = amount;
        self.rebalance_split(split)
    }

    pub fn set_share_price(&mut self, split: SplitId, price: f64) -> LedgerResult<()> {
        let price = finite("share price", price)?;
        self.ensure_split_editable(split)?;
        self.mark_split(split);
        self.split_mut(split)?.share_price = price;
        self.rebalance_split(split)
    }

    pub fn set_share_amount(&mut self, split: SplitId, amount: f64) -> LedgerResult<()> {
        let amount = finite("share amount", amount)?;
        self.ensure_split_editable(split)?;
        self.mark_split(split);
        self.split_mut(split)?.share_amount = amount;
        self.rebalance_split(split)
    }

    /// Set the value in account currency; the amount becomes
    /// `value / share_price`.
    pub fn set_value(&mut self, split: SplitId, value: f64) -> LedgerResult<()> {
        let value = finite("value", value)?;
        self.ensure_split_editable(split)?;
        let price = self.split_ref(split)?.share_price();
        if price == 0.0 {
            return Err(LedgerError::validation(format!(
                "split {split} has a zero share price; cannot derive an amount"
            )));
        }
        self.mark_split(split);
        self.split_mut(split)?.share_amount = value / price;
        self.rebalance_split(split)
    }

    pub fn set_memo(&mut self, split: SplitId, memo: impl Into<String>) -> LedgerResult<()> {
        self.ensure_split_editable(split)?;
        self.split_mut(split)?.memo = memo.into();
        self.mark_split(split);
        Ok(())
    }

    pub fn set_action(&mut self, split: SplitId, action: impl Into<String>) -> LedgerResult<()> {
        self.ensure_split_editable(split)?;
        self.split_mut(split)?.action = action.into();
        self.mark_split(split);
        Ok(())
    }

    pub fn set_split_docref(&mut self, split: SplitId, docref: impl Into<String>) -> LedgerResult<()> {
        self.ensure_split_editable(split)?;
        self.split_mut(split)?.docref = docref.into();
        self.mark_split(split);
        Ok(())
    }

    /// Changing the reconcile state shifts cleared/reconciled balances, so
    /// the account is recomputed.
    pub fn set_reconcile(&mut self, split: SplitId, state: ReconcileState) -> LedgerResult<()> {
        self.ensure_split_editable(split)?;
        self.split_mut(split)?.reconcile = state;
        self.mark_split(split);
        let acc = self.split_ref(split)?.account();
        self.recompute_account(acc);
        Ok(())
    }

    pub fn set_date_reconciled(&mut self, split: SplitId, when: DateTime<Utc>) -> LedgerResult<()> {
        self.ensure_split_editable(split)?;
        self.split_mut(split)?.date_reconciled = when;
        self.mark_split(split);
        Ok(())
    }

    // ---- transaction mutators -------------------------------------------

    pub fn set_num(&mut self, trans: TransactionId, num: impl Into<String>) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.transaction_mut(trans)?.num = num.into();
        self.mark_transaction(trans);
        Ok(())
    }

    pub fn set_description(
        &mut self,
        trans: TransactionId,
        description: impl Into<String>,
    ) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.transaction_mut(trans)?.description = description.into();
        self.mark_transaction(trans);
        Ok(())
    }

    pub fn set_transaction_docref(
        &mut self,
        trans: TransactionId,
        docref: impl Into<String>,
    ) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.transaction_mut(trans)?.docref = docref.into();
        self.mark_transaction(trans);
        Ok(())
    }

    /// Set the posted date and move every split to its new place in its
    /// account.
    pub fn set_date_posted(&mut self, trans: TransactionId, when: DateTime<Utc>) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.transaction_mut(trans)?.date_posted = when;
        self.reposition_splits(trans)?;
        self.mark_transaction(trans);
        Ok(())
    }

    pub fn set_date_entered(&mut self, trans: TransactionId, when: DateTime<Utc>) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.transaction_mut(trans)?.date_entered = when;
        self.mark_transaction(trans);
        Ok(())
    }

    /// Post on a calendar day (11:00 UTC). Entered and posted dates are
    /// kept in step.
    pub fn set_date(&mut self, trans: TransactionId, day: u32, month: u32, year: i32) -> LedgerResult<()> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(CALENDAR_DAY_HOUR, 0, 0))
            .ok_or_else(|| {
                LedgerError::validation(format!("invalid date {year:04}-{month:02}-{day:02}"))
            })?;
        self.set_dates(trans, Utc.from_utc_datetime(&naive))
    }

    pub fn set_date_today(&mut self, trans: TransactionId) -> LedgerResult<()> {
        self.set_dates(trans, Utc::now())
    }

    fn set_dates(&mut self, trans: TransactionId, when: DateTime<Utc>) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.transaction_mut(trans)?.date_entered = when;
        self.set_date_posted(trans, when)
    }

    fn reposition_splits(&mut self, trans: TransactionId) -> LedgerResult<()> {
        let ids = self.transaction_ref(trans)?.splits().to_vec();
        for id in ids {
            let Some(acc) = self.splits.get(id).and_then(Split::account) else {
                continue;
            };
            let postings = Postings::new(&self.splits, &self.transactions);
            self.accounts.remove_split(acc, id);
            self.accounts.insert_split(acc, id, &postings);
        }
        Ok(())
    }

    /// Set the memo of the first split, mirrored onto the second when the
    /// transaction has exactly two splits.
    pub fn set_transaction_memo(&mut self, trans: TransactionId, memo: &str) -> LedgerResult<()> {
        self.set_mirrored_text(trans, SplitText::Memo, memo)
    }

    /// Set the action of the first split, mirrored like the memo.
    pub fn set_transaction_action(&mut self, trans: TransactionId, action: &str) -> LedgerResult<()> {
        self.set_mirrored_text(trans, SplitText::Action, action)
    }

    fn set_mirrored_text(&mut self, trans: TransactionId, which: SplitText, text: &str) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        let t = self.transaction_ref(trans)?;
        let ids = t.splits().to_vec();
        let Some(&first) = ids.first() else {
            return Err(LedgerError::invariant(format!("transaction {trans} has no splits")));
        };

        if self.config.enforced() && ids.len() < 2 && self.split_ref(first)?.share_amount() != 0.0 {
            tracing::error!(transaction = %trans, "non-zero split without a counterpart under double entry");
            return Err(LedgerError::invariant(format!(
                "transaction {trans} has a non-zero split but no balancing split"
            )));
        }

        *which.field(self.split_mut(first)?) = text.to_string();
        self.mark_split(first);

        if let [_, second] = ids.as_slice() {
            *which.field(self.split_mut(*second)?) = text.to_string();
            self.mark_split(*second);
        }
        Ok(())
    }

    // ---- membership -----------------------------------------------------

    /// Append `split` to `trans`, taking it away from any previous owner.
    ///
    /// The previous owner must also be open for editing. It is rebalanced
    /// first, then the appended split triggers a rebalance of `trans`. If
    /// the previous owner fails to rebalance, the split stays where it was.
    pub fn append_split(&mut self, trans: TransactionId, split: SplitId) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        self.attach_split(trans, split, Synthesis::Allowed)
    }

    pub(crate) fn attach_split(
        &mut self,
        trans: TransactionId,
        split: SplitId,
        synthesis: Synthesis,
    ) -> LedgerResult<()> {
        self.transaction_ref(trans)?;

        if let Some(old) = self.split_ref(split)?.parent() {
            if old == trans {
                self.transaction_mut(trans)?.remove_split(split);
            } else {
                self.ensure_open(old)?;
                let previous = self.transaction_ref(old)?;
                if previous.split_count() <= 1 {
                    return Err(LedgerError::validation(format!(
                        "split {split} is the only split of transaction {old}"
                    )));
                }
                let index = previous.splits().iter().position(|s| *s == split);
                self.transaction_mut(old)?.remove_split(split);
                self.split_mut(split)?.parent = None;
                if let Some(source) = self.transaction_ref(old)?.source_split() {
                    if let Err(err) = self.rebalance_pass(source, synthesis) {
                        // Put the split back so it is never left without a parent.
                        if let Some(index) = index {
                            self.transaction_mut(old)?.insert_split_at(index, split);
                            self.split_mut(split)?.parent = Some(old);
                        }
                        return Err(err);
                    }
                }
            }
        }

        self.split_mut(split)?.parent = Some(trans);
        self.transaction_mut(trans)?.push_split(split);
        self.mark_split(split);
        self.rebalance_pass(split, synthesis)
    }

    /// Take `split` out of `trans` without rebalancing.
    ///
    /// The remaining splits keep their relative order. The caller is
    /// responsible for rebalancing afterwards.
    pub fn remove_split(&mut self, trans: TransactionId, split: SplitId) -> LedgerResult<()> {
        self.ensure_open(trans)?;
        let t = self.transaction_ref(trans)?;
        if !t.contains(split) {
            return Err(LedgerError::validation(format!(
                "split {split} is not part of transaction {trans}"
            )));
        }
        if t.split_count() == 1 {
            return Err(LedgerError::validation(format!(
                "split {split} is the only split of transaction {trans}"
            )));
        }

        self.transaction_mut(trans)?.remove_split(split);
        self.split_mut(split)?.parent = None;
        self.mark_split(split);
        Ok(())
    }

    /// Put `split` into `account`, leaving its previous account.
    pub fn insert_split_into_account(&mut self, account: AccountId, split: SplitId) -> LedgerResult<()> {
        if self.accounts.account(account).is_none() {
            return Err(LedgerError::not_found(format!("account {account}")));
        }
        self.ensure_split_editable(split)?;

        if let Some(previous) = self.split_ref(split)?.account() {
            self.accounts.remove_split(previous, split);
            self.recompute_account(Some(previous));
        }

        self.split_mut(split)?.account = Some(account);
        let postings = Postings::new(&self.splits, &self.transactions);
        self.accounts.insert_split(account, split, &postings);
        self.recompute_account(Some(account));
        Ok(())
    }

    pub fn remove_split_from_account(&mut self, split: SplitId) -> LedgerResult<()> {
        self.ensure_split_editable(split)?;
        let Some(account) = self.split_ref(split)?.account() else {
            return Ok(());
        };
        self.accounts.remove_split(account, split);
        self.split_mut(split)?.account = None;
        self.recompute_account(Some(account));
        Ok(())
    }

    // ---- relations ------------------------------------------------------

    /// Look up an account named `name` related to the accounts used by
    /// `trans`. The first split that has an account anchors the search.
    pub fn account_by_name(&self, trans: TransactionId, name: &str) -> Option<AccountId> {
        let t = self.transaction(trans)?;
        let anchor = t
            .splits()
            .iter()
            .find_map(|id| self.splits.get(*id).and_then(Split::account))?;
        self.accounts.find_peer_by_name(anchor, name)
    }

    /// The other split of a two-split transaction.
    ///
    /// `Ok(None)` for an unknown split or a transaction with more than two
    /// splits; a split with no parent is a fatal error.
    pub fn other_split(&self, split: SplitId) -> LedgerResult<Option<SplitId>> {
        let Some(s) = self.split(split) else {
            return Ok(None);
        };
        let parent = s.parent().ok_or_else(|| {
            tracing::error!(split = %split, "other_split on a detached split");
            LedgerError::DetachedSplit(split)
        })?;
        let ids = self.transaction_ref(parent)?.splits();
        Ok(match ids {
            [a, b] if *a == split => Some(*b),
            [a, b] if *b == split => Some(*a),
            _ => None,
        })
    }

    /// True when both splits belong to the same transaction.
    pub fn is_peer_split(&self, a: SplitId, b: SplitId) -> bool {
        match (self.split_parent(a), self.split_parent(b)) {
            (Some(ta), Some(tb)) => ta == tb,
            _ => false,
        }
    }

    // ---- ordering -------------------------------------------------------

    pub fn compare_transactions(&self, a: TransactionId, b: TransactionId) -> Ordering {
        transaction_order(self.transaction(a), self.transaction(b))
    }

    pub fn compare_splits(&self, a: SplitId, b: SplitId) -> Ordering {
        let postings = self.postings();
        split_order(postings.position(a), postings.position(b))
    }

    /// Stable sort into ledger order.
    pub fn sort_transactions(&self, ids: &mut [TransactionId]) {
        ids.sort_by(|a, b| self.compare_transactions(*a, *b));
    }

    pub fn sort_splits(&self, ids: &mut [SplitId]) {
        ids.sort_by(|a, b| self.compare_splits(*a, *b));
    }

    // ---- journal --------------------------------------------------------

    pub(crate) fn snapshot(&self, trans: TransactionId) -> LedgerResult<TransactionSnapshot> {
        let t = self.transaction_ref(trans)?;
        let splits = t
            .splits()
            .iter()
            .filter_map(|id| self.splits.get(*id))
            .map(|s| SplitSnapshot {
                split_id: s.id_typed(),
                account_id: s.account(),
                memo: s.memo().to_string(),
                action: s.action().to_string(),
                docref: s.docref().to_string(),
                reconcile: s.reconcile(),
                share_amount: s.share_amount(),
                share_price: s.share_price(),
            })
            .collect();

        Ok(TransactionSnapshot {
            transaction_id: trans,
            num: t.num().to_string(),
            description: t.description().to_string(),
            docref: t.docref().to_string(),
            date_posted: t.date_posted(),
            date_entered: t.date_entered(),
            splits,
        })
    }

    pub(crate) fn write_journal(&mut self, trans: TransactionId, kind: JournalEventKind) -> LedgerResult<()> {
        let record = JournalRecord::new(kind, self.snapshot(trans)?);
        self.journal.write(&record)?;
        tracing::debug!(transaction = %trans, kind = %kind.tag(), "journal record written");
        Ok(())
    }
}
