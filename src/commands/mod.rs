// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod advisor;
pub mod doctor;
pub mod fx;
pub mod onboard;
pub mod profile;
pub mod reports;
pub mod reset;
pub mod subscriptions;
pub mod transactions;

use crate::db::KvStore;
use crate::error::LedgerError;
use crate::lifecycle::Session;

pub(crate) fn require_ready<S: KvStore>(session: &Session<S>) -> Result<(), LedgerError> {
    if session.is_ready() {
        Ok(())
    } else {
        Err(LedgerError::NotReady)
    }
}
