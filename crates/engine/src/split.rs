//! Split entity: one monetary leg of a transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitbook_core::{AccountId, Entity, ReconcileState, SplitId, TransactionId};

/// Running balances of the owning account, as of this split.
///
/// Maintained by the account collaborator; the engine only caches them.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningBalance {
    pub balance: f64,
    pub cleared: f64,
    pub reconciled: f64,
    pub share_balance: f64,
    pub share_cleared: f64,
    pub share_reconciled: f64,
}

/// One leg of a transaction.
///
/// `share_amount` is a signed quantity of the account's security (or of its
/// currency when the account holds no security); `share_price` converts
/// it into the account currency, so `value = share_amount * share_price`.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    id: SplitId,
    pub(crate) account: Option<AccountId>,
    pub(crate) parent: Option<TransactionId>,
    pub(crate) memo: String,
    pub(crate) action: String,
    pub(crate) docref: String,
    pub(crate) reconcile: ReconcileState,
    pub(crate) date_reconciled: DateTime<Utc>,
    pub(crate) share_amount: f64,
    pub(crate) share_price: f64,
    pub(crate) running: RunningBalance,
}

impl Split {
    /// An empty, detached split: blank text, zero amount, unit price.
    pub(crate) fn empty() -> Self {
        Self {
            id: SplitId::new(),
            account: None,
            parent: None,
            memo: String::new(),
            action: String::new(),
            docref: String::new(),
            reconcile: ReconcileState::Unreconciled,
            date_reconciled: DateTime::<Utc>::default(),
            share_amount: 0.0,
            share_price: 1.0,
            running: RunningBalance::default(),
        }
    }

    pub fn id_typed(&self) -> SplitId {
        self.id
    }

    pub fn account(&self) -> Option<AccountId> {
        self.account
    }

    pub fn parent(&self) -> Option<TransactionId> {
        self.parent
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn docref(&self) -> &str {
        &self.docref
    }

    pub fn reconcile(&self) -> ReconcileState {
        self.reconcile
    }

    pub fn date_reconciled(&self) -> DateTime<Utc> {
        self.date_reconciled
    }

    pub fn share_amount(&self) -> f64 {
        self.share_amount
    }

    pub fn share_price(&self) -> f64 {
        self.share_price
    }

    /// Value in the account currency.
    pub fn value(&self) -> f64 {
        self.share_amount * self.share_price
    }

    pub fn running_balance(&self) -> &RunningBalance {
        &self.running
    }
}

impl Entity for Split {
    type Id = SplitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_split_has_documented_defaults() {
        let split = Split::empty();
        assert_eq!(split.memo(), "");
        assert_eq!(split.action(), "");
        assert_eq!(split.share_amount(), 0.0);
        assert_eq!(split.share_price(), 1.0);
        assert_eq!(split.reconcile(), ReconcileState::Unreconciled);
        assert_eq!(split.date_reconciled().timestamp(), 0);
        assert!(split.account().is_none());
        assert!(split.parent().is_none());
        assert_eq!(*split.running_balance(), RunningBalance::default());
    }

    #[test]
    fn value_is_amount_times_price() {
        let mut split = Split::empty();
        split.share_amount = 4.0;
        split.share_price = 2.5;
        assert_eq!(split.value(), 10.0);
    }
}
