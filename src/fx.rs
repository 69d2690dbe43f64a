// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::rates::RateLookup;
use rust_decimal::{Decimal, RoundingStrategy};

pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn checked_rate(rates: &impl RateLookup, code: &str) -> Result<Decimal, LedgerError> {
    let r = rates.rate(code);
    if r <= Decimal::ZERO {
        return Err(LedgerError::conversion(format!(
            "rate for {} is not positive ({})",
            code, r
        )));
    }
    Ok(r)
}

/// Converts `amount` from `from_ccy` to `to_ccy` through the USD pivot and
/// rounds to cents. Same-currency conversion returns the input untouched.
pub fn convert(
    rates: &impl RateLookup,
    amount: Decimal,
    from_ccy: &str,
    to_ccy: &str,
) -> Result<Decimal, LedgerError> {
    if from_ccy.eq_ignore_ascii_case(to_ccy) {
        return Ok(amount);
    }
    let rate_from = checked_rate(rates, from_ccy)?;
    let rate_to = checked_rate(rates, to_ccy)?;
    let usd = amount.checked_div(rate_from).ok_or_else(|| {
        LedgerError::conversion(format!("{} {} overflows in USD", amount, from_ccy))
    })?;
    let out = usd.checked_mul(rate_to).ok_or_else(|| {
        LedgerError::conversion(format!("{} {} overflows in {}", amount, from_ccy, to_ccy))
    })?;
    Ok(round_money(out))
}

/// Converts one stored amount. A non-zero amount that would round to zero
/// keeps one cent of its own sign, so an expense never turns into `0.00`.
fn migrate_amount(
    rates: &impl RateLookup,
    amount: Decimal,
    from_ccy: &str,
    to_ccy: &str,
) -> Result<Decimal, LedgerError> {
    let out = convert(rates, amount, from_ccy, to_ccy)?;
    if out.is_zero() && !amount.is_zero() {
        let cent = Decimal::new(1, 2);
        return Ok(if amount.is_sign_negative() { -cent } else { cent });
    }
    Ok(out)
}

/// Produces a copy of `ledger` with every amount re-denominated from
/// `from_ccy` into `to_ccy`. The input is never touched, so a failure on any
/// record leaves the caller's ledger exactly as it was.
pub fn migrate_ledger(
    ledger: &Ledger,
    rates: &impl RateLookup,
    from_ccy: &str,
    to_ccy: &str,
) -> Result<Ledger, LedgerError> {
    let mut next = ledger.clone();
    for t in next.transactions_mut() {
        t.amount = migrate_amount(rates, t.amount, from_ccy, to_ccy)?;
    }
    for s in next.subscriptions_mut() {
        s.amount = migrate_amount(rates, s.amount, from_ccy, to_ccy)?;
    }
    Ok(next)
}
