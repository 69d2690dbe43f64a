// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::fx::round_money;
use crate::models::{
    Subscription, SubscriptionDraft, Transaction, TransactionDraft, TxStatus, TxType,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Largest magnitude a single stored amount may have. Keeps every aggregate
/// far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0); // 1e12

/// Microsecond timestamp, bumped past the last id handed out by this process
/// so two records created in the same tick still get distinct, ordered ids.
pub fn next_id() -> String {
    let now = Utc::now().timestamp_micros();
    let prev = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(if now > last { now } else { last + 1 })
        })
        .unwrap_or(now);
    let id = if now > prev { now } else { prev + 1 };
    id.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    transactions: Vec<Transaction>, // newest first
    subscriptions: Vec<Subscription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub monthly_subscriptions: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub month: String, // YYYY-MM
    pub income: Decimal,
    pub expenses: Decimal,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>, subscriptions: Vec<Subscription>) -> Self {
        Ledger {
            transactions,
            subscriptions,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub(crate) fn transactions_mut(&mut self) -> impl Iterator<Item = &mut Transaction> {
        self.transactions.iter_mut()
    }

    pub(crate) fn subscriptions_mut(&mut self) -> impl Iterator<Item = &mut Subscription> {
        self.subscriptions.iter_mut()
    }

    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.transactions[..n.min(self.transactions.len())]
    }

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction, LedgerError> {
        let amount = checked_amount(draft.amount)?;
        let merchant = draft.merchant.trim();
        if merchant.is_empty() {
            return Err(LedgerError::validation("merchant must not be empty"));
        }
        let category = draft.category.trim();
        if category.is_empty() {
            return Err(LedgerError::validation("category must not be empty"));
        }
        let tx = Transaction {
            id: next_id(),
            date: draft.date,
            merchant: merchant.to_string(),
            category: category.to_string(),
            amount: draft.r#type.signed(amount),
            r#type: draft.r#type,
            status: TxStatus::Completed,
        };
        self.transactions.insert(0, tx.clone());
        Ok(tx)
    }

    /// Returns whether anything was removed; unknown ids are not an error.
    pub fn remove_transaction(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() != before
    }

    pub fn add_subscription(
        &mut self,
        draft: SubscriptionDraft,
    ) -> Result<Subscription, LedgerError> {
        let amount = checked_amount(draft.amount)?;
        if !(1..=31).contains(&draft.billing_day) {
            return Err(LedgerError::validation(format!(
                "billing day {} is outside 1..=31",
                draft.billing_day
            )));
        }
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("subscription name must not be empty"));
        }
        let category = draft.category.trim();
        if category.is_empty() {
            return Err(LedgerError::validation("category must not be empty"));
        }
        let sub = Subscription {
            id: next_id(),
            name: name.to_string(),
            amount: amount.abs(),
            billing_day: draft.billing_day,
            category: category.to_string(),
            active: true,
        };
        self.subscriptions.push(sub.clone());
        Ok(sub)
    }

    pub fn remove_subscription(&mut self, id: &str) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Pauses or resumes a subscription. Returns the new `active` flag, or
    /// `None` when the id is unknown.
    pub fn toggle_subscription(&mut self, id: &str) -> Option<bool> {
        let sub = self.subscriptions.iter_mut().find(|s| s.id == id)?;
        sub.active = !sub.active;
        Some(sub.active)
    }

    pub fn total_income(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.r#type == TxType::Income)
            .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
    }

    pub fn total_expenses(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.r#type == TxType::Expense)
            .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount.abs()))
    }

    pub fn total_balance(&self) -> Decimal {
        self.total_income().saturating_sub(self.total_expenses())
    }

    pub fn monthly_subscription_cost(&self) -> Decimal {
        self.subscriptions
            .iter()
            .filter(|s| s.active)
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.amount))
    }

    pub fn totals(&self) -> Totals {
        let income = self.total_income();
        let expenses = self.total_expenses();
        Totals {
            income,
            expenses,
            balance: income.saturating_sub(expenses),
            monthly_subscriptions: self.monthly_subscription_cost(),
        }
    }

    /// Income and expenses grouped by calendar month, newest month first.
    pub fn monthly_breakdown(&self) -> Vec<MonthlyTotals> {
        let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for t in &self.transactions {
            let entry = map
                .entry(t.date.format("%Y-%m").to_string())
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            match t.r#type {
                TxType::Income => entry.0 = entry.0.saturating_add(t.amount),
                TxType::Expense => entry.1 = entry.1.saturating_add(t.amount.abs()),
            }
        }
        map.into_iter()
            .rev()
            .map(|(month, (income, expenses))| MonthlyTotals {
                month,
                income,
                expenses,
            })
            .collect()
    }

    /// Expense magnitude per category, largest first.
    pub fn spend_by_category(&self) -> Vec<(String, Decimal)> {
        let mut map: BTreeMap<String, Decimal> = BTreeMap::new();
        for t in self.transactions.iter().filter(|t| t.r#type == TxType::Expense) {
            let total = map.entry(t.category.clone()).or_insert(Decimal::ZERO);
            *total = total.saturating_add(t.amount.abs());
        }
        let mut out: Vec<(String, Decimal)> = map.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}

/// Rounds an entered amount to cents and checks it is usable.
fn checked_amount(raw: Decimal) -> Result<Decimal, LedgerError> {
    let amount = round_money(raw);
    if amount.is_zero() {
        return Err(LedgerError::validation("amount must be at least 0.01"));
    }
    if amount.abs() > MAX_AMOUNT {
        return Err(LedgerError::validation(format!(
            "amount {} exceeds the limit of {}",
            amount, MAX_AMOUNT
        )));
    }
    Ok(amount)
}
