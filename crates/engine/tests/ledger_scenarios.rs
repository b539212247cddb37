use proptest::prelude::*;

use splitbook_engine::{
    Account, AccountBook, CommodityId, EnforcementMode, EngineConfig, InMemoryAccountBook, Ledger,
    LedgerError, SplitId, TransactionId,
};
use splitbook_journal::{JournalEnvelope, JournalEventKind, JournalRecord, JsonLinesJournal};

fn commodity(code: &str) -> CommodityId {
    CommodityId::new(code).unwrap()
}

fn tolerant() -> Ledger {
    splitbook_observability::init_for_tests();
    Ledger::new(EngineConfig::new(EnforcementMode::Tolerant))
}

fn enforced() -> Ledger {
    splitbook_observability::init_for_tests();
    Ledger::new(EngineConfig::new(EnforcementMode::ForceBalance))
}

fn open_transaction(ledger: &mut Ledger) -> anyhow::Result<(TransactionId, SplitId)> {
    let trans = ledger.create_transaction();
    ledger.begin_edit(trans, false)?;
    let source = ledger
        .split_at(trans, 0)
        .ok_or_else(|| anyhow::anyhow!("new transaction has no source split"))?;
    Ok((trans, source))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

#[test]
fn lone_split_stays_unbalanced_when_tolerant() -> anyhow::Result<()> {
    let mut ledger = tolerant();
    let (trans, source) = open_transaction(&mut ledger)?;

    ledger.set_share_price_and_amount(source, 1.0, 100.0)?;
    ledger.commit_edit(trans)?;

    assert_eq!(ledger.transaction_split_count(trans), 1);
    assert_eq!(ledger.imbalance(trans)?, 100.0);
    Ok(())
}

#[test]
fn lone_split_gets_a_mirror_under_enforcement() -> anyhow::Result<()> {
    let mut ledger = enforced();
    let cash = ledger
        .accounts_mut()
        .add_account(Account::new("Cash", commodity("USD")));
    let (trans, source) = open_transaction(&mut ledger)?;
    ledger.insert_split_into_account(cash, source)?;
    ledger.set_memo(source, "opening balance")?;

    ledger.set_share_price_and_amount(source, 1.0, 100.0)?;
    ledger.commit_edit(trans)?;

    assert_eq!(ledger.transaction_split_count(trans), 2);
    let mirror = ledger.split_at(trans, 1).unwrap();
    assert_eq!(ledger.value(mirror), -100.0);
    assert_eq!(ledger.value(source), 100.0);
    assert_eq!(ledger.memo(mirror), Some("opening balance"));
    assert_eq!(ledger.split_account(mirror), Some(cash));
    assert_eq!(ledger.imbalance(trans)?, 0.0);
    assert_eq!(ledger.accounts().account(cash).unwrap().splits().len(), 2);
    Ok(())
}

#[test]
fn lone_zero_split_is_not_mirrored() -> anyhow::Result<()> {
    let mut ledger = enforced();
    let cash = ledger
        .accounts_mut()
        .add_account(Account::new("Cash", commodity("USD")));
    let (trans, source) = open_transaction(&mut ledger)?;
    ledger.insert_split_into_account(cash, source)?;

    ledger.set_share_price(source, 3.0)?;
    ledger.commit_edit(trans)?;

    assert_eq!(ledger.transaction_split_count(trans), 1);
    Ok(())
}

#[test]
fn zero_priced_balancing_split_blocks_commit_under_enforcement() -> anyhow::Result<()> {
    let mut ledger = enforced();
    let cash = ledger
        .accounts_mut()
        .add_account(Account::new("Cash", commodity("USD")));
    let food = ledger
        .accounts_mut()
        .add_account(Account::new("Food", commodity("USD")));
    let trans = ledger.create_transaction();
    ledger.begin_edit(trans, true)?;
    let a = ledger.split_at(trans, 0).unwrap();
    let b = ledger.create_split();
    ledger.insert_split_into_account(cash, a)?;
    ledger.insert_split_into_account(food, b)?;
    ledger.append_split(trans, b)?;

    ledger.set_share_price(b, 0.0)?;
    ledger.set_share_amount(a, 50.0)?;

    assert!(matches!(ledger.commit_edit(trans), Err(LedgerError::Validation(_))));
    assert!(!ledger.is_balanced(trans)?);

    // Still open: repricing the destination lets the commit through.
    ledger.set_share_price_and_amount(b, 1.0, -50.0)?;
    ledger.commit_edit(trans)?;
    assert_eq!(ledger.value(a), 50.0);
    assert!(ledger.is_balanced(trans)?);
    Ok(())
}

#[test]
fn editing_source_moves_the_second_split() -> anyhow::Result<()> {
    let mut ledger = tolerant();
    let (trans, a) = open_transaction(&mut ledger)?;
    let b = ledger.create_split();
    ledger.append_split(trans, b)?;

    ledger.set_share_price_and_amount(a, 1.0, 50.0)?;
    assert_eq!(ledger.value(b), -50.0);

    ledger.set_share_amount(a, 80.0)?;
    assert_eq!(ledger.value(b), -80.0);
    assert_eq!(ledger.value(a), 80.0);
    ledger.commit_edit(trans)?;
    assert!(ledger.is_balanced(trans)?);
    Ok(())
}

#[test]
fn editing_any_other_split_moves_the_source() -> anyhow::Result<()> {
    let mut ledger = tolerant();
    let (trans, a) = open_transaction(&mut ledger)?;
    let b = ledger.create_split();
    let c = ledger.create_split();
    ledger.append_split(trans, b)?;
    ledger.append_split(trans, c)?;

    ledger.set_share_amount(b, 30.0)?;
    ledger.set_share_amount(c, 20.0)?;

    assert_eq!(ledger.value(a), -50.0);
    assert_eq!(ledger.value(b), 30.0);
    assert_eq!(ledger.value(c), 20.0);
    Ok(())
}

#[test]
fn destroying_splits_keeps_balance_then_discards_transaction() -> anyhow::Result<()> {
    let mut ledger = tolerant();
    let (trans, a) = open_transaction(&mut ledger)?;
    let b = ledger.create_split();
    let c = ledger.create_split();
    ledger.append_split(trans, b)?;
    ledger.append_split(trans, c)?;
    ledger.set_share_amount(b, 30.0)?;
    ledger.set_share_amount(c, 20.0)?;
    assert!(ledger.is_balanced(trans)?);

    ledger.destroy_split(c)?;
    assert_eq!(ledger.transaction(trans).unwrap().splits(), &[a, b]);
    assert!(ledger.split(c).is_none());
    assert!(ledger.is_balanced(trans)?);
    assert_eq!(ledger.value(b), 50.0);

    ledger.destroy_split(b)?;
    assert!(ledger.transaction(trans).is_none());
    assert!(ledger.split(a).is_none());
    assert!(ledger.split(b).is_none());
    assert_eq!(ledger.transaction_count(), 0);

    let kinds: Vec<JournalEventKind> = ledger
        .journal()
        .entries_for(trans)
        .into_iter()
        .map(|r| r.kind)
        .collect();
    assert_eq!(kinds, vec![JournalEventKind::Begin, JournalEventKind::Destroy]);
    Ok(())
}

#[test]
fn disjoint_commodities_are_a_fatal_error() -> anyhow::Result<()> {
    let mut ledger = tolerant();
    let dollars = ledger
        .accounts_mut()
        .add_account(Account::new("Checking", commodity("USD")));
    let euros = ledger
        .accounts_mut()
        .add_account(Account::new("Girokonto", commodity("EUR")).with_security(commodity("SAP")));

    let (trans, a) = open_transaction(&mut ledger)?;
    ledger.insert_split_into_account(dollars, a)?;
    let b = ledger.create_split();
    ledger.insert_split_into_account(euros, b)?;

    let err = ledger.append_split(trans, b).unwrap_err();
    assert!(err.is_fatal());
    match err {
        LedgerError::NoCommonCommodity {
            base_account,
            account,
            ..
        } => {
            assert_eq!(base_account, euros);
            assert_eq!(account, dollars);
        }
        other => panic!("expected NoCommonCommodity, got {other:?}"),
    }
    Ok(())
}

#[test]
fn accountless_split_is_fatal_under_enforcement() -> anyhow::Result<()> {
    let mut ledger = enforced();
    let (_trans, source) = open_transaction(&mut ledger)?;

    let err = ledger.set_share_amount(source, 10.0).unwrap_err();
    assert_eq!(err, LedgerError::OrphanSplit(source));
    assert!(err.is_fatal());
    Ok(())
}

#[test]
fn moving_a_split_rebalances_both_transactions() -> anyhow::Result<()> {
    let mut ledger = tolerant();
    let (first, a) = open_transaction(&mut ledger)?;
    let b = ledger.create_split();
    let c = ledger.create_split();
    ledger.append_split(first, b)?;
    ledger.append_split(first, c)?;
    ledger.set_share_amount(b, 30.0)?;
    ledger.set_share_amount(c, 20.0)?;

    let (second, d) = open_transaction(&mut ledger)?;
    ledger.append_split(second, c)?;

    assert_eq!(ledger.split_parent(c), Some(second));
    assert_eq!(ledger.transaction(first).unwrap().splits(), &[a, b]);
    assert!(ledger.is_balanced(first)?);
    assert_eq!(ledger.transaction(second).unwrap().splits(), &[d, c]);
    assert_eq!(ledger.value(d), -20.0);
    Ok(())
}

#[test]
fn session_is_journaled_as_json_lines() -> anyhow::Result<()> {
    splitbook_observability::init_for_tests();
    let mut sink: Vec<u8> = Vec::new();
    let (trans, doomed) = {
        let mut ledger = Ledger::with_collaborators(
            EngineConfig::default(),
            InMemoryAccountBook::new(),
            JsonLinesJournal::new(&mut sink),
        );
        let trans = ledger.create_transaction();
        ledger.begin_edit(trans, true)?;
        ledger.set_num(trans, "1042")?;
        ledger.commit_edit(trans)?;

        let doomed = ledger.create_transaction();
        ledger.begin_edit(doomed, false)?;
        ledger.destroy_transaction(doomed)?;
        assert_eq!(ledger.journal().last_sequence(), 4);
        (trans, doomed)
    };

    let text = String::from_utf8(sink)?;
    let envelopes = text
        .lines()
        .map(serde_json::from_str::<JournalEnvelope<JournalRecord>>)
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(envelopes.len(), 4);

    let summary: Vec<(u64, JournalEventKind, TransactionId)> = envelopes
        .iter()
        .map(|e| (e.sequence_number(), e.payload().kind, e.payload().transaction_id()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, JournalEventKind::Begin, trans),
            (2, JournalEventKind::Commit, trans),
            (3, JournalEventKind::Begin, doomed),
            (4, JournalEventKind::Destroy, doomed),
        ]
    );
    assert_eq!(envelopes[1].payload().transaction.num, "1042");
    assert_eq!(envelopes[1].event_type(), "ledger.transaction.commit");
    Ok(())
}

/// Build an open transaction whose splits carry the given (price, amount)
/// pairs, all in one currency.
fn priced_transaction(ledger: &mut Ledger, legs: &[(f64, f64)]) -> (TransactionId, Vec<SplitId>) {
    let cash = ledger
        .accounts_mut()
        .add_account(Account::new("Cash", commodity("USD")));
    let expenses = ledger
        .accounts_mut()
        .add_account(Account::new("Expenses", commodity("USD")));

    let (trans, source) = open_transaction(ledger).unwrap();
    ledger.insert_split_into_account(cash, source).unwrap();
    let mut ids = vec![source];
    for _ in 1..legs.len() {
        let split = ledger.create_split();
        ledger.insert_split_into_account(expenses, split).unwrap();
        ledger.append_split(trans, split).unwrap();
        ids.push(split);
    }
    for (id, (price, amount)) in ids.iter().zip(legs) {
        ledger.set_share_price_and_amount(*id, *price, *amount).unwrap();
    }
    (trans, ids)
}

fn values(ledger: &Ledger, trans: TransactionId) -> Vec<f64> {
    ledger
        .transaction(trans)
        .unwrap()
        .splits()
        .iter()
        .map(|id| ledger.value(*id))
        .collect()
}

fn leg() -> impl Strategy<Value = (f64, f64)> {
    (0.5f64..20.0, -10_000.0f64..10_000.0)
}

proptest! {
    #[test]
    fn committed_transactions_sum_to_zero(legs in prop::collection::vec(leg(), 1..6)) {
        let mut ledger = enforced();
        let (trans, _) = priced_transaction(&mut ledger, &legs);
        ledger.commit_edit(trans).unwrap();

        let scale: f64 = values(&ledger, trans).iter().map(|v| v.abs()).sum();
        let imbalance = ledger.imbalance(trans).unwrap();
        prop_assert!(imbalance.abs() <= 1e-6 * (1.0 + scale), "imbalance {imbalance}");
    }

    #[test]
    fn rebalancing_twice_changes_nothing(legs in prop::collection::vec(leg(), 2..6)) {
        let mut ledger = enforced();
        let (trans, _) = priced_transaction(&mut ledger, &legs);
        ledger.commit_edit(trans).unwrap();
        let before = values(&ledger, trans);

        ledger.begin_edit(trans, false).unwrap();
        ledger.rebalance_transaction(trans).unwrap();
        ledger.commit_edit(trans).unwrap();
        let after = values(&ledger, trans);

        prop_assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            prop_assert!(close(*a, *b), "{b} became {a}");
        }
    }

    #[test]
    fn append_then_remove_restores_splits(amount in -10_000.0f64..10_000.0) {
        let mut ledger = tolerant();
        let (trans, a) = open_transaction(&mut ledger).unwrap();
        let b = ledger.create_split();
        ledger.append_split(trans, b).unwrap();
        ledger.set_share_amount(a, amount).unwrap();
        let splits_before = ledger.transaction(trans).unwrap().splits().to_vec();
        let sum_before = ledger.imbalance(trans).unwrap();

        let extra = ledger.create_split();
        ledger.append_split(trans, extra).unwrap();
        ledger.remove_split(trans, extra).unwrap();

        prop_assert_eq!(ledger.transaction(trans).unwrap().splits(), splits_before.as_slice());
        prop_assert_eq!(ledger.imbalance(trans).unwrap(), sum_before);
        prop_assert_eq!(ledger.split_parent(extra), None);
    }
}
