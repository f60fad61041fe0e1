// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Evtracker hand history analyzer.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod analysis;
pub mod db;
pub mod import;
pub mod pool;
pub use analysis::{Config, Report, run};
