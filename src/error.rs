// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures the ledger core can report to its callers.
///
/// Validation and conversion failures leave every piece of state untouched.
/// A storage failure on write is reported after the in-memory change has
/// already been applied: the session keeps the new state.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("currency conversion failed: {0}")]
    Conversion(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("profile is not set up yet; run onboarding first")]
    NotReady,

    #[error("profile already exists; reset the data to onboard again")]
    AlreadyOnboarded,
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        LedgerError::Conversion(msg.into())
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        LedgerError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Storage(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnboardingError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("unsupported currency '{0}'")]
    UnknownCurrency(String),

    #[error("action not available at step {0:?}")]
    WrongStep(crate::onboarding::OnboardingStep),
}
