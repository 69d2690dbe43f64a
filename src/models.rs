// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub fn parse(s: &str) -> Option<TxType> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" | "in" => Some(TxType::Income),
            "expense" | "out" => Some(TxType::Expense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        }
    }

    /// Applies the sign convention: income positive, expense negative.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TxType::Income => amount.abs(),
            TxType::Expense => -amount.abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Completed,
    Pending,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Completed => "completed",
            TxStatus::Pending => "pending",
        }
    }
}

/// A recorded income or expense. `amount` is denominated in the profile's
/// current base currency and carries no currency tag of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub merchant: String,
    pub category: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub r#type: TxType,
    pub status: TxStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub amount: Decimal, // always positive, base currency
    pub billing_day: u32,
    pub category: String,
    pub active: bool,
}

/// User input for a new transaction, before validation.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub merchant: String,
    pub category: String,
    pub amount: Decimal,
    pub r#type: TxType,
}

#[derive(Debug, Clone)]
pub struct SubscriptionDraft {
    pub name: String,
    pub amount: Decimal,
    pub billing_day: u32,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub avatar: Option<String>, // data URL
    pub currency_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
}

pub const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "RUB", symbol: "₽", name: "Russian ruble" },
    CurrencyInfo { code: "USD", symbol: "$", name: "US dollar" },
    CurrencyInfo { code: "EUR", symbol: "€", name: "Euro" },
    CurrencyInfo { code: "KZT", symbol: "₸", name: "Kazakhstani tenge" },
    CurrencyInfo { code: "BYN", symbol: "Br", name: "Belarusian ruble" },
];

pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}

pub const CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Shopping",
    "Utilities",
    "Housing",
    "Entertainment",
    "Sports",
    "Income",
];

pub fn default_category(t: TxType) -> &'static str {
    match t {
        TxType::Income => "Income",
        TxType::Expense => "Food",
    }
}

pub const DEFAULT_SUBSCRIPTION_CATEGORY: &str = "Entertainment";
