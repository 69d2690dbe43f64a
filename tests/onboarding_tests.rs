// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use coinkeep::error::OnboardingError;
use coinkeep::onboarding::{Onboarding, OnboardingStep};

#[test]
fn blank_names_hold_the_flow() {
    let mut flow = Onboarding::new("RUB");
    assert_eq!(flow.submit_name(), Err(OnboardingError::EmptyName));
    flow.set_name("   \t").unwrap();
    assert_eq!(flow.submit_name(), Err(OnboardingError::EmptyName));
    assert_eq!(flow.step(), OnboardingStep::NameEntry);
}

#[test]
fn back_keeps_the_typed_name() {
    let mut flow = Onboarding::new("RUB");
    flow.set_name("Ivan").unwrap();
    flow.submit_name().unwrap();
    flow.select_currency("usd").unwrap();
    flow.back().unwrap();
    assert_eq!(flow.step(), OnboardingStep::NameEntry);
    assert_eq!(flow.name(), "Ivan");
    assert_eq!(flow.currency(), "USD");
}

#[test]
fn finish_produces_trimmed_profile() {
    let mut flow = Onboarding::new("EUR");
    flow.set_name("  Maria ").unwrap();
    flow.submit_name().unwrap();
    assert_eq!(flow.currency(), "EUR");
    let p = flow.finish().unwrap();
    assert_eq!(p.name, "Maria");
    assert_eq!(p.currency_code, "EUR");
    assert!(p.avatar.is_none());
    assert_eq!(flow.step(), OnboardingStep::Complete);
}

#[test]
fn finish_requires_currency_step() {
    let mut flow = Onboarding::new("RUB");
    flow.set_name("Ivan").unwrap();
    assert_eq!(
        flow.finish(),
        Err(OnboardingError::WrongStep(OnboardingStep::NameEntry))
    );
    assert_eq!(flow.step(), OnboardingStep::NameEntry);
}

#[test]
fn unknown_currency_keeps_selection() {
    let mut flow = Onboarding::new("RUB");
    flow.set_name("Ivan").unwrap();
    flow.submit_name().unwrap();
    flow.select_currency("KZT").unwrap();
    assert_eq!(
        flow.select_currency("JPY"),
        Err(OnboardingError::UnknownCurrency("JPY".into()))
    );
    assert_eq!(flow.currency(), "KZT");
    assert_eq!(flow.step(), OnboardingStep::CurrencySelection);
}

#[test]
fn completed_flow_accepts_nothing() {
    let mut flow = Onboarding::new("RUB");
    flow.set_name("Ivan").unwrap();
    flow.submit_name().unwrap();
    flow.finish().unwrap();

    let wrong = Err(OnboardingError::WrongStep(OnboardingStep::Complete));
    assert_eq!(flow.set_name("Other"), wrong);
    assert_eq!(flow.submit_name(), wrong);
    assert_eq!(flow.select_currency("USD"), wrong);
    assert_eq!(flow.back(), wrong);
    assert_eq!(flow.finish().map(|_| ()), wrong);
}

#[test]
fn unsupported_default_falls_back() {
    let flow = Onboarding::new("GBP");
    assert_eq!(flow.currency(), "RUB");
    assert_eq!(Onboarding::new("byn").currency(), "BYN");
}
