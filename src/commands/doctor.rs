// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{KEY_CURRENCY, KEY_SUBSCRIPTIONS, KEY_TRANSACTIONS, KEY_USERNAME, KvStore};
use crate::ledger::MAX_AMOUNT;
use crate::lifecycle::Session;
use crate::models::{Subscription, Transaction, TxType, currency_info};
use crate::utils::pretty_table;
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle<S: KvStore>(session: &Session<S>) -> Result<()> {
    let rows = diagnose(session)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Reads the raw stored values and the loaded ledger and reports anything
/// that breaks the ledger's invariants.
pub fn diagnose<S: KvStore>(session: &Session<S>) -> Result<Vec<Vec<String>>> {
    let store = session.persistence().store();
    let mut rows = Vec::new();

    if store.get(KEY_USERNAME)?.is_none() {
        rows.push(vec!["profile_missing".into(), "run `coinkeep init`".into()]);
    }
    if let Some(c) = store.get(KEY_CURRENCY)? {
        if currency_info(&c).is_none() {
            rows.push(vec!["unsupported_currency".into(), c]);
        }
    }
    if let Some(raw) = store.get(KEY_TRANSACTIONS)? {
        if let Err(e) = serde_json::from_str::<Vec<Transaction>>(&raw) {
            rows.push(vec!["transactions_unreadable".into(), e.to_string()]);
        }
    }
    if let Some(raw) = store.get(KEY_SUBSCRIPTIONS)? {
        if let Err(e) = serde_json::from_str::<Vec<Subscription>>(&raw) {
            rows.push(vec!["subscriptions_unreadable".into(), e.to_string()]);
        }
    }

    let ledger = session.ledger();
    for t in ledger.transactions() {
        let sign_ok = match t.r#type {
            TxType::Income => t.amount > Decimal::ZERO,
            TxType::Expense => t.amount < Decimal::ZERO,
        };
        if !sign_ok {
            rows.push(vec![
                "sign_mismatch".into(),
                format!("{} {} {}", t.id, t.r#type.as_str(), t.amount),
            ]);
        }
        if t.amount.abs() > MAX_AMOUNT {
            rows.push(vec!["amount_out_of_range".into(), format!("{} {}", t.id, t.amount)]);
        }
    }
    for s in ledger.subscriptions() {
        if !(1..=31).contains(&s.billing_day) {
            rows.push(vec![
                "billing_day_out_of_range".into(),
                format!("{} day {}", s.id, s.billing_day),
            ]);
        }
        if s.amount <= Decimal::ZERO {
            rows.push(vec![
                "subscription_not_positive".into(),
                format!("{} {}", s.id, s.amount),
            ]);
        }
    }
    Ok(rows)
}
