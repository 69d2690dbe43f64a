// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::KvStore;
use crate::error::LedgerError;
use crate::lifecycle::Session;
use crate::onboarding::Onboarding;
use crate::utils::{arg, opt_arg};
use anyhow::Result;

pub fn handle<S: KvStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    if session.is_ready() {
        return Err(LedgerError::AlreadyOnboarded.into());
    }
    let mut flow = Onboarding::new(session.default_currency());
    flow.set_name(arg(sub, "name")?)?;
    flow.submit_name()?;
    if let Some(code) = opt_arg(sub, "currency") {
        flow.select_currency(code)?;
    }
    let profile = flow.finish()?;
    let (name, ccy) = (profile.name.clone(), profile.currency_code.clone());
    session.complete_onboarding(profile)?;
    println!("Welcome, {}! Amounts will be kept in {}.", name, ccy);
    Ok(())
}
