// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Types used in a Poker hand.
use serde::{Deserialize, Serialize};
use std::{fmt, ops};

pub use evtracker_eval::{Card, Deck, Rank, Suit, format_cards, parse_cards};

/// Chips amount.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Chips(u64);

impl Chips {
    /// The zero chips.
    pub const ZERO: Chips = Chips(0);

    /// Creates chips with the given value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The amount as a signed value for EV deltas.
    pub fn signed(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }

    /// Parses an amount like `1,080` ignoring separators.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s
            .chars()
            .filter(|c| *c != ',' && *c != '_')
            .collect::<String>();
        digits.trim().parse().ok().map(Chips)
    }
}

impl ops::Add for Chips {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Chips(self.0.saturating_add(rhs.0))
    }
}

impl ops::AddAssign for Chips {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl ops::Sub<Chips> for Chips {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl std::iter::Sum for Chips {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Chips::ZERO, |acc, c| acc + c)
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.0;
        if amount >= 10_000_000 {
            write!(f, "{:.1}M", amount as f64 / 1e6)
        } else if amount >= 1_000_000 {
            write!(
                f,
                "{},{:03},{:03}",
                amount / 1_000_000,
                amount % 1_000_000 / 1_000,
                amount % 1000
            )
        } else if amount >= 1_000 {
            write!(f, "{},{:03}", amount / 1000, amount % 1000)
        } else {
            write!(f, "{}", amount)
        }
    }
}

/// Parses a money string into cents, `20.00 EUR` is 2000.
///
/// Non numeric characters are dropped, a comma followed by exactly two digits
/// at the end is taken as the decimal separator.
pub fn parse_money(s: &str) -> Option<i64> {
    let mut text = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect::<String>();

    if !text.contains('.') {
        if let Some(pos) = text.rfind(',') {
            if text.len() - pos == 3 {
                text.replace_range(pos..=pos, ".");
            }
        }
    }

    text.retain(|c| c != ',');
    let value = text.parse::<f64>().ok()?;
    Some((value * 100.0).round() as i64)
}

/// A betting street.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Street {
    /// Before the flop.
    #[default]
    Preflop,
    /// Flop.
    Flop,
    /// Turn.
    Turn,
    /// River.
    River,
}

impl Street {
    /// Number of board cards known on this street.
    pub fn board_len(&self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        };

        write!(f, "{s}")
    }
}

/// The kind of a player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Check.
    Check,
    /// Fold.
    Fold,
    /// Call.
    Call,
    /// Bet, blinds are posted as bets.
    Bet,
    /// Raise to an amount.
    Raise,
    /// Bet or raise all-in to an amount.
    Push,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Check => "check",
            ActionKind::Fold => "fold",
            ActionKind::Call => "call",
            ActionKind::Bet => "bet",
            ActionKind::Raise => "raise",
            ActionKind::Push => "push",
        };

        write!(f, "{s}")
    }
}

/// A player hole cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HoleCards(pub Card, pub Card);

impl HoleCards {
    /// Parses the first two card tokens in a text, `[As Kd]` or `As Kd`.
    pub fn parse(s: &str) -> Option<Self> {
        match parse_cards(s).as_slice() {
            [c1, c2, ..] if c1 != c2 => Some(HoleCards(*c1, *c2)),
            _ => None,
        }
    }

    /// The cards as an array.
    pub fn to_array(&self) -> [Card; 2] {
        [self.0, self.1]
    }
}

impl fmt::Display for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chips_formatting() {
        assert_eq!(Chips(123).to_string(), "123");
        assert_eq!(Chips(1_000).to_string(), "1,000");
        assert_eq!(Chips(12_345).to_string(), "12,345");
        assert_eq!(Chips(1_234_567).to_string(), "1,234,567");
        assert_eq!(Chips(123_456_789).to_string(), "123.5M");
    }

    #[test]
    fn chips_ops() {
        assert_eq!(Chips(10) - Chips(20), Chips::ZERO);
        assert_eq!(Chips(u64::MAX) + Chips(1), Chips(u64::MAX));
        assert_eq!([Chips(10), Chips(20)].into_iter().sum::<Chips>(), Chips(30));
        assert_eq!(Chips::parse("1,080"), Some(Chips(1080)));
        assert_eq!(Chips::parse("abc"), None);
    }

    #[test]
    fn money_parsing() {
        assert_eq!(parse_money("20.00 EUR"), Some(2000));
        assert_eq!(parse_money("$4.60"), Some(460));
        assert_eq!(parse_money("0.4"), Some(40));
        assert_eq!(parse_money("1,000.50"), Some(100_050));
        assert_eq!(parse_money("10,50 €"), Some(1050));
        assert_eq!(parse_money("1,000"), Some(100_000));
        assert_eq!(parse_money("free"), None);
    }

    #[test]
    fn hole_cards() {
        let cards = HoleCards::parse("[as KD]").unwrap();
        assert_eq!(cards.to_string(), "As Kd");
        assert_eq!(HoleCards::parse("[As]"), None);
        assert_eq!(HoleCards::parse("As As"), None);
    }
}
