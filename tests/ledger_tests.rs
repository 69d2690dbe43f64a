// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use coinkeep::error::LedgerError;
use coinkeep::ledger::{Ledger, MAX_AMOUNT};
use coinkeep::models::{
    Subscription, SubscriptionDraft, Transaction, TransactionDraft, TxStatus, TxType,
};
use rust_decimal::Decimal;
use std::collections::HashSet;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn draft(amount: &str, kind: TxType, date: &str, category: &str) -> TransactionDraft {
    TransactionDraft {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        merchant: "Corner Shop".into(),
        category: category.into(),
        amount: d(amount),
        r#type: kind,
    }
}

fn sub(name: &str, amount: &str, day: u32) -> SubscriptionDraft {
    SubscriptionDraft {
        name: name.into(),
        amount: d(amount),
        billing_day: day,
        category: "Entertainment".into(),
    }
}

fn assert_consistent(l: &Ledger) {
    assert_eq!(l.total_balance(), l.total_income() - l.total_expenses());
}

#[test]
fn sign_follows_type_and_newest_comes_first() {
    let mut l = Ledger::default();
    let a = l
        .add_transaction(draft("25.50", TxType::Expense, "2025-03-01", "Food"))
        .unwrap();
    assert_eq!(a.amount, d("-25.50"));
    assert_eq!(a.status, TxStatus::Completed);

    let b = l
        .add_transaction(draft("-1000", TxType::Income, "2025-03-02", "Income"))
        .unwrap();
    assert_eq!(b.amount, d("1000"));

    assert_eq!(l.transactions()[0].id, b.id);
    assert_eq!(l.transactions()[1].id, a.id);
}

#[test]
fn invalid_transactions_are_rejected_without_side_effects() {
    let mut l = Ledger::default();
    let err = l
        .add_transaction(draft("0", TxType::Expense, "2025-03-01", "Food"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let mut blank = draft("5", TxType::Expense, "2025-03-01", "Food");
    blank.merchant = "   ".into();
    assert!(l.add_transaction(blank).is_err());

    assert!(l
        .add_transaction(draft("5", TxType::Expense, "2025-03-01", " "))
        .is_err());
    assert!(l.transactions().is_empty());
}

#[test]
fn ids_stay_unique_under_rapid_inserts() {
    let mut l = Ledger::default();
    for _ in 0..200 {
        l.add_transaction(draft("1", TxType::Expense, "2025-01-01", "Food"))
            .unwrap();
    }
    let ids: HashSet<&str> = l.transactions().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), 200);
    // newest first means ids descend
    let nums: Vec<i64> = l
        .transactions()
        .iter()
        .map(|t| t.id.parse().unwrap())
        .collect();
    assert!(nums.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn removing_unknown_id_is_a_no_op() {
    let mut l = Ledger::default();
    l.add_transaction(draft("10", TxType::Expense, "2025-01-01", "Food"))
        .unwrap();
    let before = l.clone();
    assert!(!l.remove_transaction("does-not-exist"));
    assert_eq!(l, before);
    assert!(!l.remove_subscription("does-not-exist"));
    assert_eq!(l, before);
}

#[test]
fn remove_transaction_by_id() {
    let mut l = Ledger::default();
    let t = l
        .add_transaction(draft("10", TxType::Expense, "2025-01-01", "Food"))
        .unwrap();
    assert!(l.remove_transaction(&t.id));
    assert!(l.transactions().is_empty());
}

#[test]
fn billing_day_must_be_within_month_range() {
    let mut l = Ledger::default();
    assert!(l.add_subscription(sub("Gym", "20", 0)).is_err());
    assert!(l.add_subscription(sub("Gym", "20", 32)).is_err());
    assert!(l.subscriptions().is_empty());
    let s = l.add_subscription(sub("Gym", "20", 31)).unwrap();
    assert_eq!(s.billing_day, 31);
    assert!(s.active);
}

#[test]
fn subscription_amount_is_stored_positive() {
    let mut l = Ledger::default();
    let s = l.add_subscription(sub("Music", "-9.99", 5)).unwrap();
    assert_eq!(s.amount, d("9.99"));
    assert!(l.add_subscription(sub("Free", "0", 5)).is_err());
    assert!(l.add_subscription(sub("  ", "3", 5)).is_err());
}

#[test]
fn aggregates_hold_after_every_mutation() {
    let mut l = Ledger::default();
    assert_consistent(&l);
    let salary = l
        .add_transaction(draft("1000", TxType::Income, "2025-02-01", "Income"))
        .unwrap();
    assert_consistent(&l);
    l.add_transaction(draft("250", TxType::Expense, "2025-02-03", "Housing"))
        .unwrap();
    assert_consistent(&l);
    l.add_transaction(draft("50", TxType::Expense, "2025-02-04", "Food"))
        .unwrap();
    assert_consistent(&l);

    assert_eq!(l.total_income(), d("1000"));
    assert_eq!(l.total_expenses(), d("300"));
    assert_eq!(l.total_balance(), d("700"));

    l.remove_transaction(&salary.id);
    assert_consistent(&l);
    assert_eq!(l.total_balance(), d("-300"));
}

#[test]
fn paused_subscriptions_do_not_count() {
    let mut l = Ledger::default();
    let a = l.add_subscription(sub("Video", "10", 1)).unwrap();
    l.add_subscription(sub("Cloud", "2.50", 15)).unwrap();
    assert_eq!(l.monthly_subscription_cost(), d("12.50"));

    assert_eq!(l.toggle_subscription(&a.id), Some(false));
    assert_eq!(l.monthly_subscription_cost(), d("2.50"));
    assert_eq!(l.toggle_subscription(&a.id), Some(true));
    assert_eq!(l.monthly_subscription_cost(), d("12.50"));

    assert_eq!(l.toggle_subscription("nope"), None);
}

#[test]
fn monthly_breakdown_and_category_spend() {
    let mut l = Ledger::default();
    l.add_transaction(draft("100", TxType::Income, "2025-01-10", "Income"))
        .unwrap();
    l.add_transaction(draft("30", TxType::Expense, "2025-01-12", "Food"))
        .unwrap();
    l.add_transaction(draft("70", TxType::Expense, "2025-02-01", "Transport"))
        .unwrap();
    l.add_transaction(draft("5", TxType::Expense, "2025-02-02", "Food"))
        .unwrap();

    let months = l.monthly_breakdown();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].month, "2025-02");
    assert_eq!(months[0].income, Decimal::ZERO);
    assert_eq!(months[0].expenses, d("75"));
    assert_eq!(months[1].month, "2025-01");
    assert_eq!(months[1].income, d("100"));
    assert_eq!(months[1].expenses, d("30"));

    let cats = l.spend_by_category();
    assert_eq!(cats, vec![("Transport".to_string(), d("70")), ("Food".to_string(), d("35"))]);
}

#[test]
fn recent_is_bounded() {
    let mut l = Ledger::default();
    for _ in 0..3 {
        l.add_transaction(draft("1", TxType::Expense, "2025-01-01", "Food"))
            .unwrap();
    }
    assert_eq!(l.recent(5).len(), 3);
    assert_eq!(l.recent(2).len(), 2);
    assert_eq!(l.recent(2)[0].id, l.transactions()[0].id);
}

#[test]
fn entered_amounts_are_rounded_to_cents() {
    let mut l = Ledger::default();
    let t = l
        .add_transaction(draft("1.005", TxType::Expense, "2025-01-01", "Food"))
        .unwrap();
    assert_eq!(t.amount, d("-1.01"));
    let err = l
        .add_transaction(draft("0.004", TxType::Expense, "2025-01-01", "Food"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    let s = l.add_subscription(sub("Cloud", "2.495", 3)).unwrap();
    assert_eq!(s.amount, d("2.50"));
}

#[test]
fn oversized_amounts_are_rejected() {
    let mut l = Ledger::default();
    let huge = "50000000000000000000000000000";
    let err = l
        .add_transaction(draft(huge, TxType::Income, "2025-01-01", "Income"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(l.add_subscription(sub("Yacht", huge, 1)).is_err());

    for _ in 0..2 {
        l.add_transaction(draft(&MAX_AMOUNT.to_string(), TxType::Income, "2025-01-01", "Income"))
            .unwrap();
    }
    assert_eq!(l.totals().income, MAX_AMOUNT * Decimal::from(2));
}

#[test]
fn aggregates_saturate_on_loaded_extremes() {
    let huge = d("50000000000000000000000000000");
    let tx = |id: &str, kind: TxType, amount: Decimal| Transaction {
        id: id.into(),
        date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        merchant: "Import".into(),
        category: "Income".into(),
        amount,
        r#type: kind,
        status: TxStatus::Completed,
    };
    let subs = vec![
        Subscription {
            id: "s1".into(),
            name: "A".into(),
            amount: huge,
            billing_day: 1,
            category: "Entertainment".into(),
            active: true,
        };
        2
    ];
    let l = Ledger::new(
        vec![
            tx("1", TxType::Income, huge),
            tx("2", TxType::Income, huge),
            tx("3", TxType::Expense, -huge),
            tx("4", TxType::Expense, -huge),
        ],
        subs,
    );
    let totals = l.totals();
    assert_eq!(totals.income, Decimal::MAX);
    assert_eq!(totals.expenses, Decimal::MAX);
    assert_eq!(totals.monthly_subscriptions, Decimal::MAX);
    assert_eq!(l.monthly_breakdown()[0].income, Decimal::MAX);
    assert_eq!(l.spend_by_category()[0].1, Decimal::MAX);
}
