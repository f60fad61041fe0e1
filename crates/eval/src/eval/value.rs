// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Hand value computation.
use serde::{Deserialize, Serialize};
use std::fmt;

use evtracker_cards::Card;

/// The hand category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandRank {
    /// High card.
    HighCard = 0,
    /// One pair.
    OnePair,
    /// Two pairs.
    TwoPair,
    /// Three of a kind.
    ThreeOfAKind,
    /// Straight.
    Straight,
    /// Flush.
    Flush,
    /// Full house.
    FullHouse,
    /// Four of a kind.
    FourOfAKind,
    /// Straight flush.
    StraightFlush,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandRank::HighCard => "High Card",
            HandRank::OnePair => "One Pair",
            HandRank::TwoPair => "Two Pairs",
            HandRank::ThreeOfAKind => "Three of a Kind",
            HandRank::Straight => "Straight",
            HandRank::Flush => "Flush",
            HandRank::FullHouse => "Full House",
            HandRank::FourOfAKind => "Four of a Kind",
            HandRank::StraightFlush => "Straight Flush",
        };

        write!(f, "{name}")
    }
}

/// A hand value.
///
/// The value packs the hand category in the bits 20..24 and up to five ranks
/// that break ties in the bits 0..20, four bits per rank with the most
/// significant rank first:
///
/// ```text
///   +--------+--------+--------+
///   |xxxxcccc|aaaabbbb|ddddeeee| ... (e in bits 0..4)
///   +--------+--------+--------+
///   c = hand category (high card=0,...,straight flush=8)
///   a..e = tie breaking ranks (deuce=0,...,ace=12)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandValue(u32);

impl HandValue {
    /// Evaluates a 5, 6 or 7 cards hand.
    ///
    /// Panics if the number of cards is not 5 <= n <= 7.
    pub fn eval(cards: &[Card]) -> Self {
        assert!(
            (5..=7).contains(&cards.len()),
            "Cannot evaluate a {} cards hand",
            cards.len()
        );

        let mut counts = [0u8; 13];
        let mut suits = [0u16; 4];
        let mut ranks = 0u16;

        for card in cards {
            let rank = card.rank_bits();
            counts[rank as usize] += 1;
            suits[card.suit_bits().trailing_zeros() as usize] |= 1 << rank;
            ranks |= 1 << rank;
        }

        // With at most 7 cards a flush leaves too few cards of other suits for
        // quads or a full house.
        if let Some(&flush) = suits.iter().find(|s| s.count_ones() >= 5) {
            return match straight_top(flush) {
                Some(top) => Self::new(HandRank::StraightFlush, &[top]),
                None => Self::new(HandRank::Flush, &top_ranks(flush, 5)),
            };
        }

        let mut quads = None;
        let mut trips = Vec::with_capacity(2);
        let mut pairs = Vec::with_capacity(3);
        for rank in (0..13u8).rev() {
            match counts[rank as usize] {
                4 => quads = Some(rank),
                3 => trips.push(rank),
                2 => pairs.push(rank),
                _ => {}
            }
        }

        if let Some(quad) = quads {
            let kicker = top_ranks(without(ranks, &[quad]), 1);
            return Self::new(HandRank::FourOfAKind, &[quad, kicker[0]]);
        }

        // A second trips counts as the pair of a full house.
        if let Some(&trip) = trips.first() {
            let pair = trips.get(1).into_iter().chain(pairs.first()).max();
            if let Some(&pair) = pair {
                return Self::new(HandRank::FullHouse, &[trip, pair]);
            }
        }

        if let Some(top) = straight_top(ranks) {
            return Self::new(HandRank::Straight, &[top]);
        }

        if let Some(&trip) = trips.first() {
            let mut ties = vec![trip];
            ties.extend(top_ranks(without(ranks, &[trip]), 2));
            return Self::new(HandRank::ThreeOfAKind, &ties);
        }

        match pairs.as_slice() {
            [p1, p2, ..] => {
                let kicker = top_ranks(without(ranks, &[*p1, *p2]), 1);
                Self::new(HandRank::TwoPair, &[*p1, *p2, kicker[0]])
            }
            [p] => {
                let mut ties = vec![*p];
                ties.extend(top_ranks(without(ranks, &[*p]), 3));
                Self::new(HandRank::OnePair, &ties)
            }
            [] => Self::new(HandRank::HighCard, &top_ranks(ranks, 5)),
        }
    }

    /// Returns the hand category.
    pub fn rank(&self) -> HandRank {
        match self.0 >> 20 {
            0 => HandRank::HighCard,
            1 => HandRank::OnePair,
            2 => HandRank::TwoPair,
            3 => HandRank::ThreeOfAKind,
            4 => HandRank::Straight,
            5 => HandRank::Flush,
            6 => HandRank::FullHouse,
            7 => HandRank::FourOfAKind,
            8 => HandRank::StraightFlush,
            _ => panic!("Invalid hand value 0x{:x}", self.0),
        }
    }

    fn new(rank: HandRank, ties: &[u8]) -> Self {
        let value = ties
            .iter()
            .take(5)
            .enumerate()
            .fold((rank as u32) << 20, |acc, (idx, &r)| {
                acc | ((r as u32) << (16 - 4 * idx))
            });
        Self(value)
    }
}

/// Returns the top rank of the highest straight in a ranks mask.
fn straight_top(mask: u16) -> Option<u8> {
    const WHEEL: u16 = 0b1_0000_0000_1111;

    (4..13u8)
        .rev()
        .find(|&top| {
            let run = 0b11111 << (top - 4);
            mask & run == run
        })
        .or_else(|| (mask & WHEEL == WHEEL).then_some(3))
}

/// Returns the n highest ranks in a ranks mask.
fn top_ranks(mask: u16, n: usize) -> Vec<u8> {
    (0..13u8)
        .rev()
        .filter(|&r| mask & (1 << r) != 0)
        .take(n)
        .collect()
}

fn without(mask: u16, ranks: &[u8]) -> u16 {
    ranks.iter().fold(mask, |m, &r| m & !(1 << r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtracker_cards::{Deck, parse_cards};

    fn eval(s: &str) -> HandValue {
        HandValue::eval(&parse_cards(s))
    }

    #[test]
    fn hand_categories() {
        assert_eq!(eval("2c 7d 9h Js Kc").rank(), HandRank::HighCard);
        assert_eq!(eval("2c 2d 9h Js Kc").rank(), HandRank::OnePair);
        assert_eq!(eval("2c 2d 9h 9s Kc").rank(), HandRank::TwoPair);
        assert_eq!(eval("2c 2d 2h 9s Kc").rank(), HandRank::ThreeOfAKind);
        assert_eq!(eval("Ac 2d 3h 4s 5c").rank(), HandRank::Straight);
        assert_eq!(eval("Tc Jd Qh Ks Ac").rank(), HandRank::Straight);
        assert_eq!(eval("2c 7c 9c Jc Kc").rank(), HandRank::Flush);
        assert_eq!(eval("2c 2d 2h 9s 9c").rank(), HandRank::FullHouse);
        assert_eq!(eval("2c 2d 2h 2s 9c").rank(), HandRank::FourOfAKind);
        assert_eq!(eval("Ac 2c 3c 4c 5c").rank(), HandRank::StraightFlush);
    }

    #[test]
    fn seven_cards_best_hand() {
        // Two trips make a full house with the lower trips as the pair.
        let v = eval("9c 9d 9h 4s 4c 4d Ks");
        assert_eq!(v.rank(), HandRank::FullHouse);
        assert!(v > eval("9c 9d 9h 3s 3c Ad Ks"));

        // Flush and straight on the same board, flush wins.
        assert_eq!(eval("5h 6h 7c 8h 9d Kh 2h").rank(), HandRank::Flush);

        // Straight flush in 7 cards with a higher non flush straight card.
        assert_eq!(eval("5h 6h 7h 8h 9h Tc 2d").rank(), HandRank::StraightFlush);

        // Three pairs uses the best two and the best kicker.
        assert_eq!(eval("Ac Ad Kc Kd Qc Qd 2s"), eval("Ah As Kh Ks Qh 3c 2d"));
    }

    #[test]
    fn kickers_and_ties() {
        assert!(eval("Ac Ad Kh 7s 3c") > eval("As Ah Qh Js Tc"));
        assert!(eval("Ac Kd 9h 7s 3c") > eval("As Kh 9c 7d 2c"));
        assert_eq!(eval("Ac Kd 9h 7s 3c"), eval("Ah Ks 9c 7d 3d"));

        // The wheel is the lowest straight.
        assert!(eval("2c 3d 4h 5s 6c") > eval("Ac 2d 3h 4s 5c"));
        assert!(eval("Ac 2d 3h 4s 5c") > eval("Ac Ad Ah Ks Qc"));
    }

    #[test]
    fn eval_all_5cards() {
        let mut counts = [0usize; 9];
        Deck::default().for_each(5, |hand| {
            counts[HandValue::eval(hand).rank() as usize] += 1;
        });

        assert_eq!(counts[HandRank::HighCard as usize], 1_302_540);
        assert_eq!(counts[HandRank::OnePair as usize], 1_098_240);
        assert_eq!(counts[HandRank::TwoPair as usize], 123_552);
        assert_eq!(counts[HandRank::ThreeOfAKind as usize], 54_912);
        assert_eq!(counts[HandRank::Straight as usize], 10_200);
        assert_eq!(counts[HandRank::Flush as usize], 5_108);
        assert_eq!(counts[HandRank::FullHouse as usize], 3_744);
        assert_eq!(counts[HandRank::FourOfAKind as usize], 624);
        assert_eq!(counts[HandRank::StraightFlush as usize], 40);
    }
}
