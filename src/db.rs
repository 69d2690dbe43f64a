// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "CoinKeep", "coinkeep"));

pub const KEY_USERNAME: &str = "username";
pub const KEY_CURRENCY: &str = "currency";
pub const KEY_TRANSACTIONS: &str = "transactions";
pub const KEY_SUBSCRIPTIONS: &str = "subscriptions";
pub const KEY_AVATAR: &str = "avatar";

pub const ALL_KEYS: [&str; 5] = [
    KEY_USERNAME,
    KEY_CURRENCY,
    KEY_TRANSACTIONS,
    KEY_SUBSCRIPTIONS,
    KEY_AVATAR,
];

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("coinkeep.sqlite"))
}

/// Durable key/value storage. `write_batch` must apply all entries or none;
/// a `None` value deletes the key.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;
    fn write_batch(&mut self, entries: &[(&str, Option<String>)]) -> Result<(), LedgerError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Create dir {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(SqliteStore { conn })
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS kv(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let v: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }

    fn write_batch(&mut self, entries: &[(&str, Option<String>)]) -> Result<(), LedgerError> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            match value {
                Some(v) => {
                    tx.execute(
                        "INSERT INTO kv(key, value) VALUES(?1, ?2)
                         ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
                        params![key, v],
                    )?;
                }
                None => {
                    tx.execute("DELETE FROM kv WHERE key=?1", params![key])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Process-local store. The `fail_*` switches make the matching operation
/// report a storage error without touching the contents.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub entries: BTreeMap<String, String>,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        if self.fail_reads {
            return Err(LedgerError::Storage(format!("read of '{}' failed", key)));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn write_batch(&mut self, entries: &[(&str, Option<String>)]) -> Result<(), LedgerError> {
        if self.fail_writes {
            return Err(LedgerError::Storage("write rejected".into()));
        }
        for (key, value) in entries {
            match value {
                Some(v) => {
                    self.entries.insert(key.to_string(), v.clone());
                }
                None => {
                    self.entries.remove(*key);
                }
            }
        }
        Ok(())
    }
}

/// The store the binary runs on: the database file, or process memory when
/// that file cannot be opened.
pub enum Store {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl Store {
    /// Opens the database at `path`. An unreadable or corrupt file is logged
    /// and replaced by an empty in-memory store, so startup lands in
    /// onboarding instead of failing.
    pub fn open_or_fallback(path: &Path) -> Store {
        match SqliteStore::open(path) {
            Ok(s) => Store::Sqlite(s),
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "could not open database; changes will not be saved"
                );
                Store::Memory(MemoryStore::new())
            }
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, Store::Sqlite(_))
    }
}

impl KvStore for Store {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        match self {
            Store::Sqlite(s) => s.get(key),
            Store::Memory(m) => m.get(key),
        }
    }

    fn write_batch(&mut self, entries: &[(&str, Option<String>)]) -> Result<(), LedgerError> {
        match self {
            Store::Sqlite(s) => s.write_batch(entries),
            Store::Memory(m) => m.write_batch(entries),
        }
    }
}
