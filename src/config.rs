// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6/latest/USD";
pub const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub rates_url: String,
    pub rates_wait: Duration,
    pub default_currency: String,
    pub ai_endpoint: String,
    pub ai_model: String,
    pub ai_api_key: Option<String>,
}

/// Loads `.env` from the working directory if there is one.
pub fn init_env() {
    dotenvy::dotenv().ok();
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match var(key) {
        Some(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "could not parse setting; using default");
                default
            }
        },
        None => default,
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let db_path = match var("COINKEEP_DB_PATH") {
            Some(p) => PathBuf::from(p),
            None => crate::db::default_db_path()?,
        };
        Ok(Config {
            db_path,
            rates_url: var("COINKEEP_RATES_URL").unwrap_or_else(|| DEFAULT_RATES_URL.to_string()),
            rates_wait: Duration::from_millis(parse_or("COINKEEP_RATES_WAIT_MS", 3000u64)),
            default_currency: var("COINKEEP_DEFAULT_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| "RUB".to_string()),
            ai_endpoint: var("COINKEEP_AI_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_AI_ENDPOINT.to_string()),
            ai_model: var("COINKEEP_AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            ai_api_key: var("COINKEEP_AI_API_KEY").or_else(|| var("GEMINI_API_KEY")),
        })
    }
}
