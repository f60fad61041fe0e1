// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Evtracker core types and algorithms.
//!
//! The [parser] turns hand history text into [Tournament] records, the [ev]
//! module computes the hero realized and all-in adjusted chips for each hand
//! and the [curve] module aggregates them in cumulative curves.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod curve;
pub mod ev;
pub mod history;
pub mod parser;
pub mod poker;
pub mod store;

pub use ev::{EvCalculator, EvError, EvHand, EvResult, compute_hand_ev};
pub use history::{Action, Hand, HandId, HandPlayer, Tournament};
pub use parser::{ParseOutput, parse};
pub use poker::{ActionKind, Chips, HoleCards, Street};
pub use store::{HandRepository, MemoryRepository};
