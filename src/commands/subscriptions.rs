// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::require_ready;
use crate::db::KvStore;
use crate::lifecycle::Session;
use crate::models::{DEFAULT_SUBSCRIPTION_CATEGORY, SubscriptionDraft};
use crate::utils::{arg, fmt_money, maybe_print_json, opt_arg, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use serde::Serialize;

pub fn handle<S: KvStore>(session: &mut Session<S>, m: &clap::ArgMatches) -> Result<()> {
    require_ready(session)?;
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("list", sub)) => list(session, sub)?,
        Some(("rm", sub)) => {
            let id = arg(sub, "id")?;
            if session.remove_subscription(id)? {
                println!("Removed subscription {}", id);
            } else {
                println!("No subscription with id {}; nothing removed", id);
            }
        }
        Some(("toggle", sub)) => {
            let id = arg(sub, "id")?;
            match session.toggle_subscription(id)? {
                Some(true) => println!("Subscription {} resumed", id),
                Some(false) => println!("Subscription {} paused", id),
                None => println!("No subscription with id {}; nothing changed", id),
            }
        }
        _ => {}
    }
    Ok(())
}

fn add<S: KvStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let name = arg(sub, "name")?.to_string();
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let billing_day = *sub
        .get_one::<u32>("day")
        .ok_or_else(|| anyhow!("missing --day"))?;
    let category = opt_arg(sub, "category")
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_SUBSCRIPTION_CATEGORY)
        .to_string();
    let s = session.add_subscription(SubscriptionDraft {
        name,
        amount,
        billing_day,
        category,
    })?;
    println!(
        "Added subscription '{}' {} on day {} (id: {})",
        s.name,
        fmt_money(&s.amount, session.base_currency()?),
        s.billing_day,
        s.id
    );
    Ok(())
}

#[derive(Serialize)]
pub struct SubscriptionRow {
    pub id: String,
    pub name: String,
    pub amount: String,
    pub currency: String,
    pub billing_day: u32,
    pub category: String,
    pub active: bool,
}

pub fn query_rows<S: KvStore>(session: &Session<S>) -> Result<Vec<SubscriptionRow>> {
    let ccy = session.base_currency()?;
    Ok(session
        .ledger()
        .subscriptions()
        .iter()
        .map(|s| SubscriptionRow {
            id: s.id.clone(),
            name: s.name.clone(),
            amount: format!("{:.2}", s.amount),
            currency: ccy.to_string(),
            billing_day: s.billing_day,
            category: s.category.clone(),
            active: s.active,
        })
        .collect())
}

fn list<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(session)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.name.clone(),
                    r.amount.clone(),
                    r.billing_day.to_string(),
                    r.category.clone(),
                    if r.active { "active" } else { "paused" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Amount", "Day", "Category", "State"], rows)
        );
        println!(
            "Monthly total: {}",
            fmt_money(&session.ledger().monthly_subscription_cost(), session.base_currency()?)
        );
    }
    Ok(())
}
