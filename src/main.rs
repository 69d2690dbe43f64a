// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::sync::Arc;

use coinkeep::advisor::{Advisor, GeminiClient};
use coinkeep::config::{self, Config};
use coinkeep::db::Store;
use coinkeep::lifecycle::Session;
use coinkeep::rates::{HttpRateProvider, RateTable, spawn_refresh};
use coinkeep::{cli, commands, logging};

fn main() -> Result<()> {
    config::init_env();
    logging::init();
    let cfg = Config::from_env()?;

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let store = Store::open_or_fallback(&cfg.db_path);
    if !store.is_durable() {
        eprintln!(
            "warning: database at {} is unusable; running without saving",
            cfg.db_path.display()
        );
    }
    let mut session = Session::start(store, RateTable::default(), &cfg.default_currency);

    match matches.subcommand() {
        Some(("init", sub)) => commands::onboard::handle(&mut session, sub)?,
        Some(("profile", sub)) => commands::profile::handle(&mut session, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut session, sub)?,
        Some(("sub", sub)) => commands::subscriptions::handle(&mut session, sub)?,
        Some(("fx", sub)) => {
            let refresh = spawn_refresh(HttpRateProvider::new(cfg.rates_url.clone()));
            commands::fx::handle(&mut session, sub, &refresh, cfg.rates_wait)?
        }
        Some(("report", sub)) => commands::reports::handle(&session, sub)?,
        Some(("advisor", sub)) => {
            let model = GeminiClient::new(&cfg.ai_endpoint, &cfg.ai_model, cfg.ai_api_key.clone())?;
            commands::advisor::handle(&session, sub, Arc::new(Advisor::new(model)))?
        }
        Some(("doctor", _)) => commands::doctor::handle(&session)?,
        Some(("reset", sub)) => commands::reset::handle(&mut session, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
