// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::advisor::{
    Advisor, CHAT_FAILURE_REPLY, INSIGHT_WINDOW, LanguageModel, context_summary, spawn_chat,
    spawn_insights,
};
use crate::commands::require_ready;
use crate::db::KvStore;
use crate::lifecycle::Session;
use crate::models::{Insight, Severity};
use crate::tasks::LatestSlot;
use crate::utils::{arg, maybe_print_json, pretty_table};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

const ADVISOR_WAIT: Duration = Duration::from_secs(30);

pub fn handle<S: KvStore, M: LanguageModel + 'static>(
    session: &Session<S>,
    m: &clap::ArgMatches,
    advisor: Arc<Advisor<M>>,
) -> Result<()> {
    require_ready(session)?;
    match m.subcommand() {
        Some(("insights", sub)) => {
            let insights = fetch_insights(session, advisor);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &insights)? {
                let rows = insights
                    .iter()
                    .map(|i| {
                        vec![
                            severity_label(i.severity).to_string(),
                            i.title.clone(),
                            i.description.clone(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["", "Insight", "Details"], rows));
            }
        }
        Some(("chat", sub)) => {
            let message = arg(sub, "message")?;
            println!("{}", ask(session, advisor, message));
        }
        _ => {}
    }
    Ok(())
}

/// Runs the insight request in the background and waits for its result.
pub fn fetch_insights<S: KvStore, M: LanguageModel + 'static>(
    session: &Session<S>,
    advisor: Arc<Advisor<M>>,
) -> Vec<Insight> {
    let ledger = session.ledger();
    let currency = session.base_currency().unwrap_or_default().to_string();
    let mut slot: LatestSlot<Vec<Insight>> = LatestSlot::new();
    spawn_insights(
        advisor,
        slot.issue(),
        ledger.recent(INSIGHT_WINDOW).to_vec(),
        ledger.total_balance(),
        currency,
    );
    slot.wait(ADVISOR_WAIT)
        .cloned()
        .unwrap_or_else(crate::advisor::unavailable_insights)
}

/// Sends one chat question with the bounded ledger context and waits for
/// the newest answer.
pub fn ask<S: KvStore, M: LanguageModel + 'static>(
    session: &Session<S>,
    advisor: Arc<Advisor<M>>,
    message: &str,
) -> String {
    let ledger = session.ledger();
    let context = context_summary(
        ledger.total_balance(),
        session.base_currency().unwrap_or_default(),
        ledger.transactions(),
    );
    let mut slot: LatestSlot<String> = LatestSlot::new();
    spawn_chat(advisor, slot.issue(), message.to_string(), context);
    slot.wait(ADVISOR_WAIT)
        .cloned()
        .unwrap_or_else(|| CHAT_FAILURE_REPLY.to_string())
}

fn severity_label(s: Severity) -> &'static str {
    match s {
        Severity::Warning => "!",
        Severity::Success => "+",
        Severity::Info => "i",
    }
}
