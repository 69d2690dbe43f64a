// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::require_ready;
use crate::db::KvStore;
use crate::lifecycle::Session;
use crate::utils::{arg, maybe_print_json, opt_arg, pretty_table};
use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use serde::Serialize;
use std::path::Path;

pub fn handle<S: KvStore>(session: &mut Session<S>, m: &clap::ArgMatches) -> Result<()> {
    require_ready(session)?;
    match m.subcommand() {
        Some(("show", sub)) => show(session, sub)?,
        Some(("rename", sub)) => {
            let name = arg(sub, "name")?;
            session.rename(name)?;
            println!("Profile renamed to '{}'", name);
        }
        Some(("avatar", sub)) => avatar(session, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct ProfileView<'a> {
    name: &'a str,
    currency: &'a str,
    has_avatar: bool,
    transactions: usize,
    subscriptions: usize,
}

fn show<S: KvStore>(session: &Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let profile = session.profile().ok_or_else(|| anyhow!("no profile"))?;
    let view = ProfileView {
        name: &profile.name,
        currency: &profile.currency_code,
        has_avatar: profile.avatar.is_some(),
        transactions: session.ledger().transactions().len(),
        subscriptions: session.ledger().subscriptions().len(),
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        let rows = vec![
            vec!["Name".into(), view.name.to_string()],
            vec!["Currency".into(), view.currency.to_string()],
            vec!["Avatar".into(), if view.has_avatar { "set" } else { "none" }.into()],
            vec!["Transactions".into(), view.transactions.to_string()],
            vec!["Subscriptions".into(), view.subscriptions.to_string()],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}

fn avatar<S: KvStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    if sub.get_flag("clear") {
        session.set_avatar(None)?;
        println!("Avatar removed");
        return Ok(());
    }
    let path = opt_arg(sub, "file").ok_or_else(|| anyhow!("pass --file <image> or --clear"))?;
    let url = avatar_data_url(Path::new(path))?;
    session.set_avatar(Some(url))?;
    println!("Avatar updated from {}", path);
    Ok(())
}

/// Reads an image into a `data:<mime>;base64,...` URL.
pub fn avatar_data_url(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Read {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        other => return Err(anyhow!("Unsupported image type '{}'", other)),
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{}", mime, encoded))
}
