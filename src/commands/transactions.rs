// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::require_ready;
use crate::db::KvStore;
use crate::lifecycle::Session;
use crate::models::{CATEGORIES, TransactionDraft, TxType, default_category};
use crate::utils::{arg, fmt_money, maybe_print_json, opt_arg, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use serde::Serialize;

pub fn handle<S: KvStore>(session: &mut Session<S>, m: &clap::ArgMatches) -> Result<()> {
    require_ready(session)?;
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("list", sub)) => list(session, sub)?,
        Some(("rm", sub)) => rm(session, sub)?,
        Some(("categories", sub)) => categories(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add<S: KvStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let kind_raw = opt_arg(sub, "type").unwrap_or("expense");
    let kind = TxType::parse(kind_raw)
        .ok_or_else(|| anyhow!("Invalid type '{}', expected income or expense", kind_raw))?;
    let merchant = arg(sub, "merchant")?.to_string();
    let category = opt_arg(sub, "category")
        .filter(|c| !c.is_empty())
        .unwrap_or(default_category(kind))
        .to_string();
    let date = match opt_arg(sub, "date") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };

    let tx = session.add_transaction(TransactionDraft {
        date,
        merchant,
        category,
        amount,
        r#type: kind,
    })?;
    println!(
        "Recorded {} on {} at '{}' (id: {})",
        fmt_money(&tx.amount, session.base_currency()?),
        tx.date,
        tx.merchant,
        tx.id
    );
    Ok(())
}

fn list<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(session, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.date.clone(),
                    r.merchant.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                    r.r#type.clone(),
                    r.status.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Merchant", "Category", "Amount", "Type", "Status"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub merchant: String,
    pub category: String,
    pub amount: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub status: String,
}

/// Newest first, honouring `--limit`.
pub fn query_rows<S: KvStore>(
    session: &Session<S>,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let ccy = session.base_currency()?;
    let limit = sub
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(usize::MAX);
    let data = session
        .ledger()
        .transactions()
        .iter()
        .take(limit)
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t.date.to_string(),
            merchant: t.merchant.clone(),
            category: t.category.clone(),
            amount: format!("{:.2}", t.amount),
            currency: ccy.to_string(),
            r#type: t.r#type.as_str().to_string(),
            status: t.status.as_str().to_string(),
        })
        .collect();
    Ok(data)
}

fn rm<S: KvStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id")?;
    if session.remove_transaction(id)? {
        println!("Removed transaction {}", id);
    } else {
        println!("No transaction with id {}; nothing removed", id);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub builtin: bool,
    pub transactions: usize,
}

/// The built-in catalog in its own order, then any free-text categories in
/// use, alphabetically.
pub fn category_rows<S: KvStore>(session: &Session<S>) -> Vec<CategoryRow> {
    let txs = session.ledger().transactions();
    let count = |name: &str| txs.iter().filter(|t| t.category == name).count();
    let mut rows: Vec<CategoryRow> = CATEGORIES
        .iter()
        .map(|c| CategoryRow {
            name: c.to_string(),
            builtin: true,
            transactions: count(*c),
        })
        .collect();
    let mut custom: Vec<&str> = txs
        .iter()
        .map(|t| t.category.as_str())
        .filter(|c| !CATEGORIES.contains(c))
        .collect();
    custom.sort_unstable();
    custom.dedup();
    rows.extend(custom.into_iter().map(|c| CategoryRow {
        name: c.to_string(),
        builtin: false,
        transactions: count(c),
    }));
    rows
}

fn categories<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let data = category_rows(session);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    if r.builtin { "built-in" } else { "custom" }.to_string(),
                    r.transactions.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Kind", "Transactions"], rows));
    }
    Ok(())
}
