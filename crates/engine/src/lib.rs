//! Double-entry bookkeeping engine.
//!
//! A [`Ledger`] owns transactions and their splits, keeps every committed
//! transaction netting to zero through the rebalancer, orders entries for
//! register display, and gates mutation behind edit sessions. Accounts and
//! the crash-recovery journal are collaborators reached through the
//! [`AccountBook`] and [`splitbook_journal::Journal`] traits.

mod arena;

pub mod account;
pub mod ledger;
pub mod order;
pub mod rebalance;
pub mod session;
pub mod split;
pub mod transaction;

pub use account::{Account, AccountBook, InMemoryAccountBook, Postings};
pub use ledger::Ledger;
pub use order::{SplitPosition, split_order, transaction_order};
pub use rebalance::CommodityCandidate;
pub use split::{RunningBalance, Split};
pub use transaction::{EditState, Transaction};

pub use splitbook_core::{
    AccountId, CommodityId, EnforcementMode, EngineConfig, LedgerError, LedgerResult,
    ReconcileState, SplitId, TransactionId,
};
