//! Canonical ledger order.
//!
//! Registers compute running balances by walking splits in this order, so
//! it must be a strict weak ordering: entries that agree on every compared
//! field are equal, whether or not they are the same entity.

use core::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::split::Split;
use crate::transaction::Transaction;

/// A split together with its parent transaction, if it has one.
#[derive(Debug, Copy, Clone)]
pub struct SplitPosition<'a> {
    pub split: &'a Split,
    pub parent: Option<&'a Transaction>,
}

/// Compare text that may be missing. Missing sorts first; two missing
/// values are equal.
pub fn text_order(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

fn posted_order(a: DateTime<Utc>, b: DateTime<Utc>) -> Ordering {
    a.timestamp()
        .cmp(&b.timestamp())
        .then_with(|| a.timestamp_subsec_nanos().cmp(&b.timestamp_subsec_nanos()))
}

/// Order transactions by posted date, then num, then description.
///
/// A present transaction sorts before a missing one.
pub fn transaction_order(a: Option<&Transaction>, b: Option<&Transaction>) -> Ordering {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => return Ordering::Equal,
    };

    posted_order(a.date_posted(), b.date_posted())
        .then_with(|| text_order(Some(a.num()), Some(b.num())))
        .then_with(|| text_order(Some(a.description()), Some(b.description())))
}

/// Order splits by their transaction, then memo, then action.
///
/// A present split sorts before a missing one.
pub fn split_order(a: Option<SplitPosition<'_>>, b: Option<SplitPosition<'_>>) -> Ordering {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => return Ordering::Equal,
    };

    transaction_order(a.parent, b.parent)
        .then_with(|| text_order(Some(a.split.memo()), Some(b.split.memo())))
        .then_with(|| text_order(Some(a.split.action()), Some(b.split.action())))
}
