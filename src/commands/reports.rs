// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::require_ready;
use crate::db::KvStore;
use crate::lifecycle::Session;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle<S: KvStore>(session: &Session<S>, m: &clap::ArgMatches) -> Result<()> {
    require_ready(session)?;
    match m.subcommand() {
        Some(("summary", sub)) => summary(session, sub)?,
        Some(("monthly", sub)) => monthly(session, sub)?,
        Some(("by-category", sub)) => by_category(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn summary<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let totals = session.ledger().totals();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        let ccy = session.base_currency()?;
        let rows = vec![
            vec!["Income".into(), fmt_money(&totals.income, ccy)],
            vec!["Expenses".into(), fmt_money(&totals.expenses, ccy)],
            vec!["Balance".into(), fmt_money(&totals.balance, ccy)],
            vec![
                "Subscriptions / month".into(),
                fmt_money(&totals.monthly_subscriptions, ccy),
            ],
        ];
        println!("{}", pretty_table(&["Metric", "Amount"], rows));
    }
    Ok(())
}

fn monthly<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    let data: Vec<_> = session
        .ledger()
        .monthly_breakdown()
        .into_iter()
        .take(months)
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|m| {
                vec![
                    m.month.clone(),
                    format!("{:.2}", m.income),
                    format!("{:.2}", m.expenses),
                    format!("{:.2}", m.income - m.expenses),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Net"], rows)
        );
    }
    Ok(())
}

fn by_category<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let data = session.ledger().spend_by_category();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = session.base_currency()?;
        let rows = data
            .iter()
            .map(|(cat, amt)| vec![cat.clone(), fmt_money(amt, ccy)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }
    Ok(())
}
