// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bootstrap and write-through persistence of the profile and ledger.
//!
//! `Persistence` is the only component that touches the key/value store.
//! `Session` owns the in-memory state and mirrors every mutation through
//! `Persistence::save` once it has reached `Phase::Ready`.

use crate::db::{
    ALL_KEYS, KEY_AVATAR, KEY_CURRENCY, KEY_SUBSCRIPTIONS, KEY_TRANSACTIONS, KEY_USERNAME,
    KvStore,
};
use crate::error::LedgerError;
use crate::fx;
use crate::ledger::Ledger;
use crate::models::{
    Profile, Subscription, SubscriptionDraft, Transaction, TransactionDraft, currency_info,
};
use crate::rates::{RateLookup, RateTable};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Onboarding,
    Loaded,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub profile: Profile,
    pub ledger: Ledger,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Onboarding,
    Ready(Snapshot),
}

pub struct Persistence<S: KvStore> {
    store: S,
}

impl<S: KvStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Persistence { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reads the persisted state. A missing or unreadable profile name means
    /// the installation was never set up. Optional pieces that are missing or
    /// unreadable fall back to empty values.
    pub fn load(&self, default_currency: &str) -> LoadOutcome {
        let name = match self.store.get(KEY_USERNAME) {
            Ok(Some(n)) if !n.trim().is_empty() => n,
            Ok(_) => return LoadOutcome::Onboarding,
            Err(e) => {
                tracing::error!(error = %e, "could not read profile; starting onboarding");
                return LoadOutcome::Onboarding;
            }
        };

        let currency_code = match self.read_scalar(KEY_CURRENCY) {
            Some(c) if currency_info(&c).is_some() => c.trim().to_uppercase(),
            Some(c) => {
                tracing::warn!(currency = %c, "stored currency is not supported; using default");
                default_currency.to_string()
            }
            None => default_currency.to_string(),
        };
        let avatar = self.read_scalar(KEY_AVATAR).filter(|a| !a.is_empty());
        let transactions: Vec<Transaction> = self.read_json(KEY_TRANSACTIONS);
        let subscriptions: Vec<Subscription> = self.read_json(KEY_SUBSCRIPTIONS);

        LoadOutcome::Ready(Snapshot {
            profile: Profile {
                name,
                avatar,
                currency_code,
            },
            ledger: Ledger::new(transactions, subscriptions),
        })
    }

    fn read_scalar(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "read failed; using default");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.read_scalar(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is malformed; starting empty");
                T::default()
            }
        }
    }

    /// Writes every key of the snapshot in one batch.
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<(), LedgerError> {
        let transactions = serde_json::to_string(snapshot.ledger.transactions())?;
        let subscriptions = serde_json::to_string(snapshot.ledger.subscriptions())?;
        self.store.write_batch(&[
            (KEY_USERNAME, Some(snapshot.profile.name.clone())),
            (KEY_CURRENCY, Some(snapshot.profile.currency_code.clone())),
            (KEY_TRANSACTIONS, Some(transactions)),
            (KEY_SUBSCRIPTIONS, Some(subscriptions)),
            (KEY_AVATAR, snapshot.profile.avatar.clone()),
        ])
    }

    pub fn reset(&mut self) -> Result<(), LedgerError> {
        let entries: Vec<(&str, Option<String>)> = ALL_KEYS.iter().map(|k| (*k, None)).collect();
        self.store.write_batch(&entries)
    }
}

pub struct Session<S: KvStore> {
    persistence: Persistence<S>,
    phase: Phase,
    state: Option<Snapshot>,
    rates: RateTable,
    default_currency: String,
}

impl<S: KvStore> Session<S> {
    pub fn new(store: S, rates: RateTable, default_currency: &str) -> Self {
        Session {
            persistence: Persistence::new(store),
            phase: Phase::Uninitialized,
            state: None,
            rates,
            default_currency: default_currency.to_uppercase(),
        }
    }

    /// Creates a session and runs the bootstrap in one go.
    pub fn start(store: S, rates: RateTable, default_currency: &str) -> Self {
        let mut s = Session::new(store, rates, default_currency);
        s.bootstrap();
        s
    }

    pub fn bootstrap(&mut self) {
        match self.persistence.load(&self.default_currency) {
            LoadOutcome::Onboarding => {
                self.state = None;
                self.phase = Phase::Onboarding;
                tracing::debug!("no profile stored; onboarding");
            }
            LoadOutcome::Ready(snapshot) => {
                self.phase = Phase::Loaded;
                tracing::debug!(currency = %snapshot.profile.currency_code, "profile loaded");
                self.state = Some(snapshot);
                self.phase = Phase::Ready;
                tracing::debug!(
                    transactions = self.ledger().transactions().len(),
                    subscriptions = self.ledger().subscriptions().len(),
                    "ledger hydrated"
                );
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.state.as_ref().map(|s| &s.profile)
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.state.as_ref()
    }

    pub fn ledger(&self) -> &Ledger {
        static EMPTY: Lazy<Ledger> = Lazy::new(Ledger::default);
        match &self.state {
            Some(s) => &s.ledger,
            None => &EMPTY,
        }
    }

    /// The single currency every stored amount is denominated in.
    pub fn base_currency(&self) -> Result<&str, LedgerError> {
        self.profile()
            .map(|p| p.currency_code.as_str())
            .ok_or(LedgerError::NotReady)
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn rates_mut(&mut self) -> &mut RateTable {
        &mut self.rates
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut Persistence<S> {
        &mut self.persistence
    }

    /// Installs the profile produced by onboarding and persists it. Only
    /// valid after `bootstrap` found no stored profile.
    pub fn complete_onboarding(&mut self, profile: Profile) -> Result<(), LedgerError> {
        match self.phase {
            Phase::Onboarding => {}
            Phase::Ready => return Err(LedgerError::AlreadyOnboarded),
            Phase::Uninitialized | Phase::Loaded => return Err(LedgerError::NotReady),
        }
        self.state = Some(Snapshot {
            profile,
            ledger: Ledger::default(),
        });
        self.phase = Phase::Ready;
        tracing::debug!("onboarding complete");
        self.persist()
    }

    fn state_mut(&mut self) -> Result<&mut Snapshot, LedgerError> {
        if self.phase != Phase::Ready {
            return Err(LedgerError::NotReady);
        }
        self.state.as_mut().ok_or(LedgerError::NotReady)
    }

    /// Mirrors the current state to storage. The in-memory state stays
    /// authoritative when the write fails.
    fn persist(&mut self) -> Result<(), LedgerError> {
        if self.phase != Phase::Ready {
            return Ok(());
        }
        let Some(state) = self.state.as_ref() else {
            return Ok(());
        };
        self.persistence.save(state).map_err(|e| {
            tracing::error!(error = %e, "failed to persist ledger");
            e
        })
    }

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction, LedgerError> {
        let tx = self.state_mut()?.ledger.add_transaction(draft)?;
        self.persist()?;
        Ok(tx)
    }

    pub fn remove_transaction(&mut self, id: &str) -> Result<bool, LedgerError> {
        let removed = self.state_mut()?.ledger.remove_transaction(id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn add_subscription(
        &mut self,
        draft: SubscriptionDraft,
    ) -> Result<Subscription, LedgerError> {
        let sub = self.state_mut()?.ledger.add_subscription(draft)?;
        self.persist()?;
        Ok(sub)
    }

    pub fn remove_subscription(&mut self, id: &str) -> Result<bool, LedgerError> {
        let removed = self.state_mut()?.ledger.remove_subscription(id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn toggle_subscription(&mut self, id: &str) -> Result<Option<bool>, LedgerError> {
        let active = self.state_mut()?.ledger.toggle_subscription(id);
        if active.is_some() {
            self.persist()?;
        }
        Ok(active)
    }

    pub fn rename(&mut self, name: &str) -> Result<(), LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("name must not be empty"));
        }
        self.state_mut()?.profile.name = name.to_string();
        self.persist()
    }

    pub fn set_avatar(&mut self, avatar: Option<String>) -> Result<(), LedgerError> {
        self.state_mut()?.profile.avatar = avatar;
        self.persist()
    }

    /// Switches the base currency using the session's rate table. Returns
    /// `false` when `new_code` already is the base currency.
    pub fn change_currency(&mut self, new_code: &str) -> Result<bool, LedgerError> {
        let rates = self.rates.clone();
        self.change_currency_using(new_code, &rates)
    }

    /// Re-denominates every amount and the profile currency together. On a
    /// conversion error nothing is changed and nothing is written.
    pub fn change_currency_using(
        &mut self,
        new_code: &str,
        rates: &impl RateLookup,
    ) -> Result<bool, LedgerError> {
        let code = new_code.trim().to_uppercase();
        if currency_info(&code).is_none() {
            return Err(LedgerError::validation(format!("unsupported currency '{}'", code)));
        }
        let state = self.state_mut()?;
        let from = state.profile.currency_code.clone();
        if from == code {
            return Ok(false);
        }
        let migrated = fx::migrate_ledger(&state.ledger, rates, &from, &code)?;
        state.ledger = migrated;
        state.profile.currency_code = code.clone();
        tracing::info!(from = %from, to = %code, "base currency changed");
        self.persist()?;
        Ok(true)
    }

    /// Wipes every stored key and returns the session to onboarding. The
    /// in-memory state is cleared even if the storage wipe fails.
    pub fn reset(&mut self) -> Result<(), LedgerError> {
        let res = self.persistence.reset();
        self.state = None;
        self.phase = Phase::Onboarding;
        tracing::info!("all data reset");
        res
    }
}
