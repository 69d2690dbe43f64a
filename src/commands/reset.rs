// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::KvStore;
use crate::lifecycle::Session;
use anyhow::{Result, anyhow};

pub fn handle<S: KvStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    if !sub.get_flag("yes") {
        return Err(anyhow!(
            "This erases the profile, all transactions and subscriptions. Re-run with --yes."
        ));
    }
    session.reset()?;
    println!("All data erased. Run `coinkeep init` to start again.");
    Ok(())
}
