// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use coinkeep::db::{KEY_CURRENCY, MemoryStore};
use coinkeep::error::LedgerError;
use coinkeep::fx::migrate_ledger;
use coinkeep::lifecycle::Session;
use coinkeep::models::{Profile, SubscriptionDraft, TransactionDraft, TxType};
use coinkeep::rates::{RateLookup, RateTable};
use rust_decimal::Decimal;
use std::cell::Cell;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn ready_session(ccy: &str) -> Session<MemoryStore> {
    let mut s = Session::start(MemoryStore::new(), RateTable::default(), "RUB");
    s.complete_onboarding(Profile {
        name: "Ivan".into(),
        avatar: None,
        currency_code: ccy.into(),
    })
    .unwrap();
    s
}

fn tx(amount: &str, kind: TxType) -> TransactionDraft {
    TransactionDraft {
        date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        merchant: "Market".into(),
        category: "Food".into(),
        amount: d(amount),
        r#type: kind,
    }
}

/// Delegates to the default table but starts answering 0 after `ok_calls`
/// lookups.
struct FlakyRates {
    inner: RateTable,
    ok_calls: usize,
    calls: Cell<usize>,
}

impl RateLookup for FlakyRates {
    fn rate(&self, code: &str) -> Decimal {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n >= self.ok_calls {
            Decimal::ZERO
        } else {
            self.inner.rate(code)
        }
    }
}

#[test]
fn rub_expense_becomes_usd() {
    let mut s = ready_session("RUB");
    s.add_transaction(tx("1000", TxType::Expense)).unwrap();
    assert!(s.change_currency("USD").unwrap());
    assert_eq!(s.ledger().transactions()[0].amount, d("-10.36"));
    assert_eq!(s.base_currency().unwrap(), "USD");
    let stored = s.persistence().store().entries.get(KEY_CURRENCY).cloned();
    assert_eq!(stored.as_deref(), Some("USD"));
}

#[test]
fn signs_survive_migration() {
    let mut s = ready_session("USD");
    s.add_transaction(tx("12.34", TxType::Expense)).unwrap();
    s.add_transaction(tx("2500", TxType::Income)).unwrap();
    s.add_transaction(tx("0.01", TxType::Expense)).unwrap();
    s.add_subscription(SubscriptionDraft {
        name: "Video".into(),
        amount: d("9.99"),
        billing_day: 3,
        category: "Entertainment".into(),
    })
    .unwrap();

    for code in ["KZT", "EUR", "BYN", "RUB", "USD"] {
        s.change_currency(code).unwrap();
        for t in s.ledger().transactions() {
            match t.r#type {
                TxType::Income => assert!(t.amount > Decimal::ZERO, "{} {}", code, t.amount),
                TxType::Expense => assert!(t.amount < Decimal::ZERO, "{} {}", code, t.amount),
            }
        }
        assert!(s.ledger().subscriptions()[0].amount > Decimal::ZERO);
        let l = s.ledger();
        assert_eq!(l.total_balance(), l.total_income() - l.total_expenses());
    }
}

#[test]
fn failing_lookup_mid_batch_changes_nothing() {
    let mut s = ready_session("RUB");
    s.add_transaction(tx("1000", TxType::Expense)).unwrap();
    s.add_transaction(tx("50000", TxType::Income)).unwrap();
    s.add_transaction(tx("300", TxType::Expense)).unwrap();

    let ledger_before = s.ledger().clone();
    let store_before = s.persistence().store().entries.clone();

    // first record converts (2 lookups), the second hits a zero rate
    let flaky = FlakyRates {
        inner: RateTable::default(),
        ok_calls: 2,
        calls: Cell::new(0),
    };
    let err = s.change_currency_using("USD", &flaky).unwrap_err();
    assert!(matches!(err, LedgerError::Conversion(_)));

    assert_eq!(s.ledger(), &ledger_before);
    assert_eq!(s.base_currency().unwrap(), "RUB");
    assert_eq!(s.persistence().store().entries, store_before);
}

#[test]
fn switching_to_the_same_currency_is_a_no_op() {
    let mut s = ready_session("EUR");
    s.add_transaction(tx("3.33", TxType::Expense)).unwrap();
    let before = s.ledger().clone();
    assert!(!s.change_currency("eur").unwrap());
    assert_eq!(s.ledger(), &before);
}

#[test]
fn unsupported_currency_is_rejected() {
    let mut s = ready_session("EUR");
    let err = s.change_currency("XYZ").unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(s.base_currency().unwrap(), "EUR");
}

#[test]
fn migrate_ledger_leaves_input_alone() {
    let mut s = ready_session("USD");
    s.add_transaction(tx("10", TxType::Expense)).unwrap();
    let original = s.ledger().clone();
    let migrated = migrate_ledger(&original, &RateTable::default(), "USD", "RUB").unwrap();
    assert_eq!(migrated.transactions()[0].amount, d("-965"));
    assert_eq!(original.transactions()[0].amount, d("-10"));
    assert_eq!(migrated.transactions()[0].id, original.transactions()[0].id);
}

#[test]
fn sub_cent_amounts_keep_their_sign() {
    let mut s = ready_session("RUB");
    s.add_transaction(tx("0.40", TxType::Expense)).unwrap();
    s.add_transaction(tx("0.30", TxType::Income)).unwrap();
    s.add_subscription(SubscriptionDraft {
        name: "Tiny".into(),
        amount: d("0.40"),
        billing_day: 10,
        category: "Entertainment".into(),
    })
    .unwrap();

    s.change_currency("USD").unwrap();
    let txs = s.ledger().transactions();
    assert_eq!(txs[0].amount, d("0.01"));
    assert_eq!(txs[1].amount, d("-0.01"));
    assert_eq!(s.ledger().subscriptions()[0].amount, d("0.01"));
}
