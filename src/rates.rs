// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Currency rates pivoted on USD: `rate[code]` is how many units of `code`
//! buy one US dollar.

use crate::utils::http_client;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

pub const PIVOT: &str = "USD";

pub fn default_rates() -> BTreeMap<String, Decimal> {
    [
        ("USD", Decimal::ONE),
        ("RUB", Decimal::new(965, 1)),
        ("EUR", Decimal::new(92, 2)),
        ("KZT", Decimal::new(490, 0)),
        ("BYN", Decimal::new(325, 2)),
    ]
    .into_iter()
    .map(|(c, r)| (c.to_string(), r))
    .collect()
}

/// Anything that can answer "how many units of `code` per USD".
pub trait RateLookup {
    fn rate(&self, code: &str) -> Decimal;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    Live,
    Default,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::Live => "live",
            RateSource::Default => "default",
        }
    }
}

/// A full set of fetched rates, as published by a refresh task.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    pub rates: BTreeMap<String, Decimal>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RateTable {
    defaults: BTreeMap<String, Decimal>,
    live: BTreeMap<String, Decimal>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Default for RateTable {
    fn default() -> Self {
        RateTable::with_defaults(default_rates())
    }
}

impl RateTable {
    pub fn with_defaults(defaults: BTreeMap<String, Decimal>) -> Self {
        RateTable {
            defaults: defaults
                .into_iter()
                .filter(|(_, r)| *r > Decimal::ZERO)
                .map(|(c, r)| (c.to_uppercase(), r))
                .collect(),
            live: BTreeMap::new(),
            fetched_at: None,
        }
    }

    /// Live rate, else static default, else 1 (unknown codes are treated
    /// as USD-equivalent).
    pub fn get(&self, code: &str) -> Decimal {
        self.resolve(code).0
    }

    pub fn resolve(&self, code: &str) -> (Decimal, Option<RateSource>) {
        let key = code.trim().to_uppercase();
        if let Some(r) = self.live.get(&key) {
            return (*r, Some(RateSource::Live));
        }
        if let Some(r) = self.defaults.get(&key) {
            return (*r, Some(RateSource::Default));
        }
        (Decimal::ONE, None)
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.resolve(code).1.is_some()
    }

    /// Overlays a fetched snapshot. Fetched values override defaults and
    /// earlier fetches; codes the snapshot lacks keep their previous value.
    /// Non-positive rates are ignored. Returns how many rates were taken.
    pub fn merge(&mut self, snapshot: RateSnapshot) -> usize {
        let mut taken = 0;
        for (code, rate) in snapshot.rates {
            if rate <= Decimal::ZERO {
                tracing::warn!(%code, %rate, "ignoring non-positive rate");
                continue;
            }
            self.live.insert(code.to_uppercase(), rate);
            taken += 1;
        }
        self.fetched_at = Some(snapshot.fetched_at);
        tracing::debug!(taken, "merged rate snapshot");
        taken
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Every code the table can resolve, with its effective rate.
    pub fn effective(&self) -> Vec<(String, Decimal, RateSource)> {
        let mut out: BTreeMap<String, (Decimal, RateSource)> = self
            .defaults
            .iter()
            .map(|(c, r)| (c.clone(), (*r, RateSource::Default)))
            .collect();
        for (c, r) in &self.live {
            out.insert(c.clone(), (*r, RateSource::Live));
        }
        out.into_iter().map(|(c, (r, s))| (c, r, s)).collect()
    }
}

impl RateLookup for RateTable {
    fn rate(&self, code: &str) -> Decimal {
        self.get(code)
    }
}

/// Source of USD-pivoted rate snapshots.
pub trait RateProvider: Send + 'static {
    fn fetch(&self) -> Result<RateSnapshot>;
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: Option<String>,
    base_code: Option<String>,
    rates: HashMap<String, f64>,
}

pub struct HttpRateProvider {
    url: String,
}

impl HttpRateProvider {
    pub fn new(url: impl Into<String>) -> Self {
        HttpRateProvider { url: url.into() }
    }
}

impl RateProvider for HttpRateProvider {
    fn fetch(&self) -> Result<RateSnapshot> {
        let client = http_client()?;
        let resp = client.get(&self.url).send()?.error_for_status()?;
        let body: LatestResponse = resp.json()?;
        parse_latest(body)
    }
}

fn parse_latest(body: LatestResponse) -> Result<RateSnapshot> {
    if let Some(result) = body.result.as_deref() {
        if result != "success" {
            return Err(anyhow!("rate provider answered '{}'", result));
        }
    }
    if let Some(base) = body.base_code.as_deref() {
        if !base.eq_ignore_ascii_case(PIVOT) {
            return Err(anyhow!("rate snapshot pivoted on {}, expected {}", base, PIVOT));
        }
    }
    let mut rates = BTreeMap::new();
    for (code, value) in body.rates {
        match Decimal::try_from(value) {
            Ok(d) if d > Decimal::ZERO => {
                rates.insert(code.to_uppercase(), d);
            }
            _ => tracing::warn!(%code, value, "skipping unusable rate"),
        }
    }
    if rates.is_empty() {
        return Err(anyhow!("rate snapshot contained no usable rates"));
    }
    Ok(RateSnapshot {
        rates,
        fetched_at: Utc::now(),
    })
}

/// Parses a raw provider response body. Exposed for callers that fetch
/// through their own transport.
pub fn parse_snapshot_json(body: &str) -> Result<RateSnapshot> {
    let parsed: LatestResponse = serde_json::from_str(body)?;
    parse_latest(parsed)
}

/// Receiving end of a background refresh. The task only ever holds the
/// sending half; the table is written exclusively through `RateTable::merge`.
pub struct RateRefresh {
    rx: Receiver<RateSnapshot>,
}

impl RateRefresh {
    pub fn channel() -> (Sender<RateSnapshot>, RateRefresh) {
        let (tx, rx) = mpsc::channel();
        (tx, RateRefresh { rx })
    }

    /// Merges whatever snapshots have arrived, without blocking.
    pub fn try_apply(&self, table: &mut RateTable) -> bool {
        let mut applied = false;
        while let Ok(snap) = self.rx.try_recv() {
            table.merge(snap);
            applied = true;
        }
        applied
    }

    /// Waits at most `timeout` for the first snapshot, then drains the rest.
    pub fn wait_apply(&self, table: &mut RateTable, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(snap) => {
                table.merge(snap);
                self.try_apply(table);
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::debug!("rate refresh still pending; using current table");
                false
            }
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

/// Starts a single best-effort fetch on a background thread. Failures are
/// logged and swallowed; the table keeps its defaults.
pub fn spawn_refresh<P: RateProvider>(provider: P) -> RateRefresh {
    let (tx, refresh) = RateRefresh::channel();
    std::thread::spawn(move || match provider.fetch() {
        Ok(snap) => {
            let _ = tx.send(snap);
        }
        Err(e) => tracing::warn!(error = %e, "rate refresh failed, keeping defaults"),
    });
    refresh
}
