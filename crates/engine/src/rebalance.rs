//! Rebalancing: keeping a transaction's splits netting to zero.
//!
//! After a split's amount or price changes, exactly one other split is
//! recomputed so the transaction sums to zero in a commodity every split
//! can express:
//!
//! - when the edited split is the source (first) split, the second split
//!   absorbs the difference; if there is no second split and double entry
//!   is enforced, a mirroring split is synthesized;
//! - otherwise the source split absorbs it.
//!
//! Values are expressed in a base commodity narrowed from the accounts of
//! all splits (see [`CommodityCandidate`]). A split converts to the base by
//! `amount * price` when its account currency is the base, or by `amount`
//! when its account security is the base.

use splitbook_core::{CommodityId, LedgerError, LedgerResult, SplitId, TransactionId};
use splitbook_journal::Journal;

use crate::account::{Account, AccountBook, Postings};
use crate::ledger::Ledger;
use crate::split::Split;

/// Amounts closer to zero than this count as zero.
pub(crate) const EPSILON: f64 = 1e-6;

/// Whether a rebalance pass may create a balancing split.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Synthesis {
    Allowed,
    Forbidden,
}

/// How a split's amount relates to a requested base commodity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ValuePolicy {
    /// `value = amount * price`
    Priced,
    /// `value = amount`
    Shares,
    /// The split cannot be expressed in the requested commodity.
    Mismatch,
}

/// Candidate base commodity while scanning a transaction's splits.
///
/// Seeded with the triggering split's account (currency, security) and
/// narrowed against every other account: a slot survives only while each
/// account has it as its currency or its security. Running out of
/// candidates means the transaction mixes commodities that cannot be
/// balanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityCandidate {
    primary: Option<CommodityId>,
    secondary: Option<CommodityId>,
}

impl CommodityCandidate {
    pub fn seed(currency: &CommodityId, security: Option<&CommodityId>) -> Self {
        Self {
            primary: Some(currency.clone()),
            secondary: security.cloned(),
        }
    }

    /// Narrow against an account holding `currency` and optionally
    /// `security`.
    pub fn narrow(&mut self, currency: &CommodityId, security: Option<&CommodityId>) {
        let is_currency = |c: &CommodityId| c == currency;
        let is_security = |c: &CommodityId| security == Some(c);

        match (&self.primary, &self.secondary) {
            (Some(ra), Some(rb)) => {
                let aa = is_currency(ra);
                let ab = is_security(ra);
                let ba = is_currency(rb);
                let bb = is_security(rb);

                if (aa && !bb) || (ab && !ba) {
                    self.secondary = None;
                } else if (ba && !ab) || (bb && !aa) {
                    self.primary = None;
                } else if !(aa || ab || ba || bb) {
                    self.primary = None;
                    self.secondary = None;
                }

                if self.primary.is_none() {
                    self.primary = self.secondary.take();
                }
            }
            (Some(ra), None) => {
                if !is_currency(ra) && !is_security(ra) {
                    self.primary = None;
                }
            }
            _ => {}
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }

    /// The commodity a rebalance will use.
    pub fn resolved(&self) -> Option<&CommodityId> {
        self.primary.as_ref()
    }

    pub fn into_resolved(self) -> Option<CommodityId> {
        self.primary
    }
}

fn describe_security(account: &Account) -> String {
    account.security().map(ToString::to_string).unwrap_or_default()
}

impl<A: AccountBook, J: Journal> Ledger<A, J> {
    fn account_of(&self, split: &Split) -> LedgerResult<Option<&Account>> {
        match split.account() {
            None => Ok(None),
            Some(id) => self.accounts.account(id).map(Some).ok_or_else(|| {
                LedgerError::invariant(format!(
                    "split {} references unknown account {id}",
                    split.id_typed()
                ))
            }),
        }
    }

    /// The shared get/set/sum policy for expressing `split` in `base`.
    fn value_policy(&self, split: &Split, base: Option<&CommodityId>) -> LedgerResult<ValuePolicy> {
        let enforced = self.config.enforced();
        let Some(account) = self.account_of(split)? else {
            if enforced {
                tracing::error!(split = %split.id_typed(), "split without account under double entry");
                return Err(LedgerError::OrphanSplit(split.id_typed()));
            }
            return Ok(ValuePolicy::Priced);
        };

        Ok(match base {
            Some(base) if account.currency() == base => ValuePolicy::Priced,
            Some(base) if account.security() == Some(base) => ValuePolicy::Shares,
            None if !enforced => ValuePolicy::Priced,
            _ => ValuePolicy::Mismatch,
        })
    }

    /// Value of `split` expressed in `base`.
    ///
    /// An unknown split is worth 0.0. Asking for a commodity the split's
    /// account cannot express is logged and also yields 0.0.
    pub fn split_base_value(&self, split: SplitId, base: Option<&CommodityId>) -> LedgerResult<f64> {
        let Some(s) = self.split(split) else {
            return Ok(0.0);
        };
        Ok(match self.value_policy(s, base)? {
            ValuePolicy::Priced => s.value(),
            ValuePolicy::Shares => s.share_amount(),
            ValuePolicy::Mismatch => {
                tracing::warn!(
                    split = %split,
                    base = ?base.map(CommodityId::as_str),
                    "inappropriate base commodity for split; value reported as zero"
                );
                0.0
            }
        })
    }

    /// Set the value of `split` expressed in `base`, adjusting its amount.
    ///
    /// A commodity mismatch is logged and leaves the split unchanged. Does
    /// not rebalance.
    pub fn set_split_base_value(
        &mut self,
        split: SplitId,
        value: f64,
        base: Option<&CommodityId>,
    ) -> LedgerResult<()> {
        if !value.is_finite() {
            return Err(LedgerError::validation(format!("value must be finite, got {value}")));
        }
        self.ensure_split_editable(split)?;
        self.apply_base_value(split, value, base)?;
        self.mark_split(split);
        Ok(())
    }

    /// Returns whether the split's amount was changed.
    fn apply_base_value(&mut self, split: SplitId, value: f64, base: Option<&CommodityId>) -> LedgerResult<bool> {
        let s = self.split_ref(split)?;
        let amount = match self.value_policy(s, base)? {
            ValuePolicy::Priced => {
                let price = s.share_price();
                if price == 0.0 {
                    tracing::warn!(split = %split, "zero share price; base value not applied");
                    return Ok(false);
                }
                value / price
            }
            ValuePolicy::Shares => value,
            ValuePolicy::Mismatch => {
                tracing::warn!(
                    split = %split,
                    base = ?base.map(CommodityId::as_str),
                    "inappropriate base commodity for split; value not applied"
                );
                return Ok(false);
            }
        };
        self.split_mut(split)?.share_amount = amount;
        Ok(true)
    }

    /// Sum of the base values of every split of `trans` except `skip`.
    ///
    /// A split that cannot be expressed in `base` here means the commodity
    /// resolution was bypassed; that is a fatal inconsistency.
    pub fn transaction_value(
        &self,
        trans: TransactionId,
        skip: Option<SplitId>,
        base: Option<&CommodityId>,
    ) -> LedgerResult<f64> {
        let t = self.transaction_ref(trans)?;
        let mut total = 0.0;
        for id in t.splits() {
            if Some(*id) == skip {
                continue;
            }
            let s = self.split_ref(*id)?;
            total += match self.value_policy(s, base)? {
                ValuePolicy::Priced => s.value(),
                ValuePolicy::Shares => s.share_amount(),
                ValuePolicy::Mismatch => {
                    tracing::error!(transaction = %trans, split = %id, "inconsistent commodities");
                    return Err(LedgerError::invariant(format!(
                        "split {id} of transaction {trans} cannot be valued in {}",
                        base.map(CommodityId::as_str).unwrap_or("<none>")
                    )));
                }
            };
        }
        Ok(total)
    }

    /// Commodity every split of `trans` agrees on, starting from the
    /// account of `trigger`.
    ///
    /// `Ok(None)` when the trigger has no account and double entry is not
    /// enforced; values are then taken at face value.
    pub fn common_commodity(
        &self,
        trans: TransactionId,
        trigger: SplitId,
    ) -> LedgerResult<Option<CommodityId>> {
        let enforced = self.config.enforced();
        let t = self.transaction_ref(trans)?;
        let trigger_split = self.split_ref(trigger)?;

        let Some(base_account) = self.account_of(trigger_split)? else {
            if enforced {
                tracing::error!(split = %trigger, "split without account under double entry");
                return Err(LedgerError::OrphanSplit(trigger));
            }
            return Ok(None);
        };

        let mut candidate =
            CommodityCandidate::seed(base_account.currency(), base_account.security());

        for id in t.splits() {
            let s = self.split_ref(*id)?;
            let Some(account) = self.account_of(s)? else {
                if enforced {
                    tracing::error!(split = %id, "split without account under double entry");
                    return Err(LedgerError::OrphanSplit(*id));
                }
                continue;
            };

            candidate.narrow(account.currency(), account.security());
            if candidate.is_exhausted() {
                tracing::error!(
                    transaction = %trans,
                    base_account = %base_account.name(),
                    account = %account.name(),
                    "no common split commodities"
                );
                return Err(LedgerError::NoCommonCommodity {
                    base_account: base_account.id_typed(),
                    base_currency: base_account.currency().clone(),
                    base_security: describe_security(base_account),
                    account: account.id_typed(),
                    currency: account.currency().clone(),
                    security: describe_security(account),
                });
            }
        }

        Ok(candidate.into_resolved())
    }

    /// Rebalance the transaction owning `split`, treating `split` as the
    /// edited leg.
    pub fn rebalance_split(&mut self, split: SplitId) -> LedgerResult<()> {
        self.rebalance_pass(split, Synthesis::Allowed)
    }

    /// Rebalance from the source split.
    pub fn rebalance_transaction(&mut self, trans: TransactionId) -> LedgerResult<()> {
        match self.transaction_ref(trans)?.source_split() {
            Some(source) => self.rebalance_split(source),
            None => Ok(()),
        }
    }

    /// Sum of all split values of `trans` in its common commodity.
    ///
    /// Zero (within tolerance) for a balanced transaction.
    pub fn imbalance(&self, trans: TransactionId) -> LedgerResult<f64> {
        let Some(source) = self.transaction_ref(trans)?.source_split() else {
            return Ok(0.0);
        };
        let base = self.common_commodity(trans, source)?;
        self.transaction_value(trans, None, base.as_ref())
    }

    pub fn is_balanced(&self, trans: TransactionId) -> LedgerResult<bool> {
        Ok(self.imbalance(trans)?.abs() <= EPSILON)
    }

    pub(crate) fn rebalance_pass(&mut self, split: SplitId, synthesis: Synthesis) -> LedgerResult<()> {
        let s = self.split_ref(split)?;
        // A split being built outside any transaction has nothing to balance.
        let Some(trans) = s.parent() else {
            return Ok(());
        };
        let account = s.account();

        let t = self.transaction_ref(trans)?;
        if t.edit_state().defers_rebalance() {
            tracing::trace!(transaction = %trans, "rebalance deferred by transaction");
            return Ok(());
        }
        if let Some(account) = account {
            if self.accounts.defers_rebalance(account) {
                tracing::trace!(transaction = %trans, account = %account, "rebalance deferred by account");
                return Ok(());
            }
        }

        let Some(source) = t.source_split() else {
            return Ok(());
        };
        let destination = t.split_at(1);
        let base = self.common_commodity(trans, split)?;

        if split != source {
            return self.force_balance_onto(trans, source, base.as_ref());
        }

        match destination {
            Some(destination) => self.force_balance_onto(trans, destination, base.as_ref())?,
            None => {
                // A lone zero-amount split only records a price and is
                // balanced as it stands.
                let amount = self.split_ref(source)?.share_amount();
                if self.config.enforced() && amount.abs() > EPSILON {
                    match synthesis {
                        Synthesis::Allowed => {
                            self.synthesize_balancing_split(trans, source)?;
                        }
                        Synthesis::Forbidden => {
                            tracing::debug!(transaction = %trans, "balancing split already synthesized in this pass");
                        }
                    }
                }
            }
        }

        // TODO: under enforcement, move splits without an account into the
        // source split's account or a lost-and-found account.
        Ok(())
    }

    /// Set `target` to the negated sum of every other split.
    fn force_balance_onto(
        &mut self,
        trans: TransactionId,
        target: SplitId,
        base: Option<&CommodityId>,
    ) -> LedgerResult<()> {
        let value = self.transaction_value(trans, Some(target), base)?;
        let applied = self.apply_base_value(target, -value, base)?;
        if !applied && self.config.enforced() && value.abs() > EPSILON {
            let price = self.split_ref(target)?.share_price();
            tracing::error!(
                transaction = %trans,
                split = %target,
                price,
                "balancing split cannot absorb the imbalance"
            );
            return Err(LedgerError::validation(format!(
                "split {target} cannot balance transaction {trans} at share price {price}"
            )));
        }
        self.mark_split(target);
        let account = self.split_ref(target)?.account();
        self.recompute_account(account);
        Ok(())
    }

    /// Create a split mirroring `source` with the opposite value, in the
    /// same transaction and account.
    fn synthesize_balancing_split(&mut self, trans: TransactionId, source: SplitId) -> LedgerResult<SplitId> {
        let src = self.split_ref(source)?;
        let mut mirror = Split::empty();
        mirror.share_amount = -src.value();
        mirror.memo = src.memo().to_string();
        mirror.action = src.action().to_string();
        // The account is set before attaching so the nested pass never sees
        // an orphan; membership in the account follows once it has a parent.
        mirror.account = src.account();
        let account = mirror.account;

        let id = self.splits.insert(mirror);
        self.attach_split(trans, id, Synthesis::Forbidden)?;

        if let Some(account) = account {
            let postings = Postings::new(&self.splits, &self.transactions);
            self.accounts.insert_split(account, id, &postings);
            self.recompute_account(Some(account));
        }

        tracing::info!(transaction = %trans, split = %id, "synthesized balancing split");
        Ok(id)
    }
}
