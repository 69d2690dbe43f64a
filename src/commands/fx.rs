// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::require_ready;
use crate::db::KvStore;
use crate::fx::convert;
use crate::lifecycle::Session;
use crate::models::{CURRENCIES, currency_info};
use crate::rates::RateRefresh;
use crate::utils::{arg, fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

/// `refresh` is the pending background rate fetch; commands that read rates
/// give it up to `wait` to land before falling back to the defaults.
pub fn handle<S: KvStore>(
    session: &mut Session<S>,
    m: &clap::ArgMatches,
    refresh: &RateRefresh,
    wait: Duration,
) -> Result<()> {
    match m.subcommand() {
        Some(("set-base", sub)) => {
            require_ready(session)?;
            refresh.wait_apply(session.rates_mut(), wait);
            set_base(session, arg(sub, "currency")?)?;
        }
        Some(("list", sub)) => {
            refresh.wait_apply(session.rates_mut(), wait);
            list_rates(session, sub)?;
        }
        Some(("fetch", _)) => {
            if refresh.wait_apply(session.rates_mut(), wait) {
                let n = session.rates().effective().len();
                println!("Exchange rates refreshed ({} currencies).", n);
            } else {
                println!("Exchange rates unavailable; using built-in defaults.");
            }
        }
        Some(("currencies", _)) => list_currencies(),
        Some(("convert", sub)) => {
            refresh.wait_apply(session.rates_mut(), wait);
            convert_amount(session, sub)?;
        }
        _ => {}
    }
    Ok(())
}

fn set_base<S: KvStore>(session: &mut Session<S>, code: &str) -> Result<()> {
    let from = session.base_currency()?.to_string();
    let changed = session
        .change_currency(code)
        .with_context(|| format!("Currency change {} -> {} failed; nothing was changed", from, code))?;
    if changed {
        let ledger = session.ledger();
        println!(
            "Base currency set to {} ({} transactions, {} subscriptions converted from {})",
            session.base_currency()?,
            ledger.transactions().len(),
            ledger.subscriptions().len(),
            from
        );
    } else {
        println!("Base currency is already {}", from);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct RateRow {
    pub code: String,
    pub rate: String,
    pub source: String,
}

pub fn rate_rows<S: KvStore>(session: &Session<S>) -> Vec<RateRow> {
    session
        .rates()
        .effective()
        .into_iter()
        .map(|(code, rate, source)| RateRow {
            code,
            rate: rate.normalize().to_string(),
            source: source.as_str().to_string(),
        })
        .collect()
}

fn list_rates<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let data = rate_rows(session);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| vec![r.code, r.rate, r.source])
            .collect();
        println!("{}", pretty_table(&["Code", "Per USD", "Source"], rows));
        if let Some(at) = session.rates().fetched_at() {
            println!("Live rates as of {}", at.format("%Y-%m-%d %H:%M UTC"));
        }
    }
    Ok(())
}

fn list_currencies() {
    let rows = CURRENCIES
        .iter()
        .map(|c| vec![c.code.to_string(), c.symbol.to_string(), c.name.to_string()])
        .collect();
    println!("{}", pretty_table(&["Code", "Symbol", "Name"], rows));
}

fn convert_amount<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let from = arg(sub, "from")?.to_uppercase();
    let to = arg(sub, "to")?.to_uppercase();
    for code in [&from, &to] {
        if currency_info(code).is_none() && !session.rates().is_known(code) {
            tracing::warn!(%code, "unknown currency; treating it as USD-equivalent");
        }
    }
    let res = convert(session.rates(), amount, &from, &to)?;
    println!("{} -> {}", fmt_money(&amount, &from), fmt_money(&res, &to));
    Ok(())
}
