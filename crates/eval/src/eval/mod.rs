// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker hand evaluator.
//!
//! The evaluator ranks 5, 6, and 7 cards hands into a [HandValue] that can be
//! compared directly, a greater value is a stronger hand and equal values are
//! split pots. Ranks and suits are read from the [Cactus Kev's][kevlink] card
//! encoding and folded into per rank counts and per suit bitmasks so that a 7
//! cards hand is ranked without enumerating its 21 five cards subsets.
//!
//! [kevlink]: http://suffe.cool/poker/evaluator.html

mod value;
pub use value::{HandRank, HandValue};
