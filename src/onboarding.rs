// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::OnboardingError;
use crate::models::{Profile, currency_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    NameEntry,
    CurrencySelection,
    Complete,
}

/// First-run flow: name, then currency, then a finished `Profile`.
/// A rejected transition leaves the step unchanged.
#[derive(Debug, Clone)]
pub struct Onboarding {
    step: OnboardingStep,
    name: String,
    currency: String,
}

impl Onboarding {
    /// `default_currency` is pre-selected so the last step can never block.
    /// An unsupported default falls back to the first catalog entry.
    pub fn new(default_currency: &str) -> Self {
        let currency = currency_info(default_currency)
            .or_else(|| crate::models::CURRENCIES.first())
            .map(|c| c.code.to_string())
            .unwrap_or_else(|| "USD".to_string());
        Onboarding {
            step: OnboardingStep::NameEntry,
            name: String::new(),
            currency,
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), OnboardingError> {
        if self.step != OnboardingStep::NameEntry {
            return Err(OnboardingError::WrongStep(self.step));
        }
        self.name = name.to_string();
        Ok(())
    }

    pub fn submit_name(&mut self) -> Result<(), OnboardingError> {
        if self.step != OnboardingStep::NameEntry {
            return Err(OnboardingError::WrongStep(self.step));
        }
        if self.name.trim().is_empty() {
            return Err(OnboardingError::EmptyName);
        }
        self.step = OnboardingStep::CurrencySelection;
        Ok(())
    }

    pub fn select_currency(&mut self, code: &str) -> Result<(), OnboardingError> {
        if self.step != OnboardingStep::CurrencySelection {
            return Err(OnboardingError::WrongStep(self.step));
        }
        let info =
            currency_info(code).ok_or_else(|| OnboardingError::UnknownCurrency(code.to_string()))?;
        self.currency = info.code.to_string();
        Ok(())
    }

    /// Back to name entry; the typed name is kept.
    pub fn back(&mut self) -> Result<(), OnboardingError> {
        if self.step != OnboardingStep::CurrencySelection {
            return Err(OnboardingError::WrongStep(self.step));
        }
        self.step = OnboardingStep::NameEntry;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<Profile, OnboardingError> {
        if self.step != OnboardingStep::CurrencySelection {
            return Err(OnboardingError::WrongStep(self.step));
        }
        self.step = OnboardingStep::Complete;
        Ok(Profile {
            name: self.name.trim().to_string(),
            avatar: None,
            currency_code: self.currency.clone(),
        })
    }
}
