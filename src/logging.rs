// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

fn resolve_env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var("COINKEEP_LOG") {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the stderr subscriber once per process. Filter: `COINKEEP_LOG`,
/// then `RUST_LOG`, then `warn`.
pub fn init() {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(resolve_env_filter())
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .try_init();
    });
}
