// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use coinkeep::error::LedgerError;
use coinkeep::fx::convert;
use coinkeep::rates::{
    RateLookup, RateProvider, RateRefresh, RateSnapshot, RateSource, RateTable,
    parse_snapshot_json, spawn_refresh,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Duration;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn snapshot(pairs: &[(&str, &str)]) -> RateSnapshot {
    RateSnapshot {
        rates: pairs
            .iter()
            .map(|(c, r)| (c.to_string(), d(r)))
            .collect::<BTreeMap<_, _>>(),
        fetched_at: chrono::Utc::now(),
    }
}

struct FixedRates(Vec<(&'static str, Decimal)>);

impl RateLookup for FixedRates {
    fn rate(&self, code: &str) -> Decimal {
        self.0
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, r)| *r)
            .unwrap_or(Decimal::ONE)
    }
}

#[test]
fn same_currency_is_returned_untouched() {
    let rates = RateTable::default();
    let amt = d("-123.456");
    assert_eq!(convert(&rates, amt, "RUB", "RUB").unwrap(), amt);
    assert_eq!(convert(&rates, amt, "XYZ", "XYZ").unwrap(), amt);
}

#[test]
fn rub_expense_to_usd() {
    let rates = RateTable::default();
    let res = convert(&rates, d("-1000"), "RUB", "USD").unwrap();
    // -1000 / 96.5 = -10.3626...
    assert_eq!(res, d("-10.36"));
}

#[test]
fn cross_rate_goes_through_usd() {
    let rates = RateTable::default();
    // 100 EUR / 0.92 = 108.6956... USD; * 96.5 = 10489.1304...
    let rub = convert(&rates, d("100"), "EUR", "RUB").unwrap();
    assert_eq!(rub, d("10489.13"));
    let back = convert(&rates, rub, "RUB", "EUR").unwrap();
    assert!((back - d("100")).abs() <= d("0.01"));
}

#[test]
fn round_trip_into_weaker_currency_is_stable() {
    let rates = RateTable::default();
    for amt in ["12.34", "-0.99", "1000", "7.07"] {
        let a = d(amt);
        for (c1, c2) in [("USD", "RUB"), ("EUR", "KZT"), ("BYN", "RUB")] {
            let there = convert(&rates, a, c1, c2).unwrap();
            let back = convert(&rates, there, c2, c1).unwrap();
            assert!(
                (back - a).abs() <= d("0.01"),
                "{} {}->{}->{} gave {}",
                a,
                c1,
                c2,
                c1,
                back
            );
        }
    }
}

#[test]
fn unknown_currency_counts_as_usd() {
    let rates = RateTable::default();
    assert_eq!(rates.get("XYZ"), Decimal::ONE);
    assert!(!rates.is_known("XYZ"));
    assert_eq!(convert(&rates, d("50"), "XYZ", "USD").unwrap(), d("50"));
}

#[test]
fn midpoint_rounds_away_from_zero_for_both_signs() {
    let rates = FixedRates(vec![("AAA", Decimal::ONE), ("BBB", d("0.5"))]);
    assert_eq!(convert(&rates, d("0.01"), "AAA", "BBB").unwrap(), d("0.01"));
    assert_eq!(convert(&rates, d("-0.01"), "AAA", "BBB").unwrap(), d("-0.01"));
    assert_eq!(convert(&rates, d("0.03"), "AAA", "BBB").unwrap(), d("0.02"));
}

#[test]
fn non_positive_rate_is_a_conversion_error() {
    let rates = FixedRates(vec![("AAA", Decimal::ZERO)]);
    let err = convert(&rates, d("10"), "AAA", "USD").unwrap_err();
    assert!(matches!(err, LedgerError::Conversion(_)));
    let rates = FixedRates(vec![("BBB", d("-2"))]);
    assert!(convert(&rates, d("10"), "USD", "BBB").is_err());
}

#[test]
fn merge_overrides_defaults_and_keeps_the_rest() {
    let mut rates = RateTable::default();
    let taken = rates.merge(snapshot(&[("RUB", "90"), ("GBP", "0.8"), ("EUR", "0")]));
    assert_eq!(taken, 2);
    assert_eq!(rates.get("RUB"), d("90"));
    assert_eq!(rates.get("GBP"), d("0.8"));
    // zero rate ignored, default kept
    assert_eq!(rates.get("EUR"), d("0.92"));
    assert_eq!(rates.resolve("KZT").1, Some(RateSource::Default));
    assert_eq!(rates.resolve("RUB").1, Some(RateSource::Live));
    assert!(rates.fetched_at().is_some());
}

#[test]
fn provider_payload_parsing() {
    let ok = parse_snapshot_json(
        r#"{"result":"success","base_code":"USD","rates":{"USD":1,"RUB":91.25,"BAD":-1}}"#,
    )
    .unwrap();
    assert_eq!(ok.rates.get("RUB"), Some(&d("91.25")));
    assert!(!ok.rates.contains_key("BAD"));

    assert!(parse_snapshot_json(r#"{"result":"error","rates":{}}"#).is_err());
    assert!(parse_snapshot_json(r#"{"base_code":"EUR","rates":{"USD":1.1}}"#).is_err());
    assert!(parse_snapshot_json("not json").is_err());
}

#[test]
fn refresh_channel_merges_published_snapshots() {
    let (tx, refresh) = RateRefresh::channel();
    let mut rates = RateTable::default();
    assert!(!refresh.try_apply(&mut rates));
    tx.send(snapshot(&[("RUB", "100")])).unwrap();
    assert!(refresh.try_apply(&mut rates));
    assert_eq!(rates.get("RUB"), d("100"));
}

struct DownProvider;

impl RateProvider for DownProvider {
    fn fetch(&self) -> anyhow::Result<RateSnapshot> {
        Err(anyhow::anyhow!("network unreachable"))
    }
}

#[test]
fn failed_refresh_leaves_defaults() {
    let refresh = spawn_refresh(DownProvider);
    let mut rates = RateTable::default();
    assert!(!refresh.wait_apply(&mut rates, Duration::from_secs(2)));
    assert_eq!(rates.get("RUB"), d("96.5"));
    assert!(rates.fetched_at().is_none());
}
