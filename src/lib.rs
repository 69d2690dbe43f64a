// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod advisor;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod fx;
pub mod ledger;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod onboarding;
pub mod rates;
pub mod tasks;
pub mod utils;
