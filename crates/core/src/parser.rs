// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Hand history text parser.
//!
//! The parser folds the input lines through a small state machine, each line
//! is matched against an ordered list of patterns and the first match updates
//! the current tournament, hand or section. Lines that don't match any pattern
//! are skipped and parsing never fails, missing data results in partial
//! records.
//!
//! ```
//! # use evtracker_core::parser::parse;
//! let output = parse(
//!     "*** HEADER ***\n\
//!      Game ID: 1001\n\
//!      *** PLAYERS ***\n\
//!      Seat 1: Alice (500)\n\
//!      Seat 2: Bob (500) [BTN SB Hero]\n\
//!      *** PRE-FLOP ***\n\
//!      Bob: Posts SB 10\n\
//!      Alice: Posts BB 20\n\
//!      Bob: Folds\n\
//!      *** SUMMARY ***\n\
//!      Total Pot: 30\n\
//!      Alice wins pot of 30\n",
//! );
//!
//! assert_eq!(output.hand_count(), 1);
//! let hand = &output.tournaments[0].hands[0];
//! assert_eq!(hand.actions.len(), 3);
//! assert_eq!(hand.winner_seat, Some(1));
//! ```
use ahash::AHashMap;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use regex::{Captures, Regex, RegexBuilder};
use std::sync::LazyLock;

use crate::{
    history::{Action, Hand, HandPlayer, Tournament},
    poker::{ActionKind, Card, Chips, HoleCards, Street, format_cards, parse_cards, parse_money},
};

/// The tournaments parsed from a text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    /// Tournaments in order of first appearance.
    pub tournaments: Vec<Tournament>,
}

impl ParseOutput {
    /// Total number of hands.
    pub fn hand_count(&self) -> usize {
        self.tournaments.iter().map(|t| t.hands.len()).sum()
    }
}

/// Parses a hand history text.
pub fn parse(text: &str) -> ParseOutput {
    let output = text.lines().fold(Parser::default(), Parser::line).finish();

    debug!(
        "Parsed {} tournaments with {} hands",
        output.tournaments.len(),
        output.hand_count()
    );

    output
}

/// The hand history section being parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Section {
    #[default]
    Header,
    Players,
    HoleCards,
    Street(Street),
    Summary,
}

type Handler = fn(&mut Parser, &Captures<'_>);

struct Rule {
    re: Regex,
    handler: Handler,
}

impl Rule {
    fn new(pattern: &str, handler: Handler) -> Self {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("Invalid line pattern");
        Self { re, handler }
    }
}

/// Line rules, the first matching rule handles the line.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(r"^\*\*\*\s*HEADER\s*\*\*\*", Parser::on_header),
        Rule::new(r"^\*\*\*\s*PLAYERS\s*\*\*\*", Parser::on_players),
        Rule::new(r"^\*\*\*\s*HOLE CARDS\s*\*\*\*", Parser::on_hole_cards),
        Rule::new(
            r"^\*\*\*\s*(PRE-?FLOP|FLOP|TURN|RIVER)\s*\*\*\*(.*)$",
            Parser::on_street,
        ),
        Rule::new(r"^\*\*\*\s*SUMMARY\s*\*\*\*", Parser::on_summary),
        Rule::new(r"^-{4,}$", Parser::on_separator),
        Rule::new(r"^Game ID:\s*(.+)$", Parser::on_game_id),
        Rule::new(
            r"^Date & Time:\s*(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2}(?::\d{2})?)",
            Parser::on_date,
        ),
        Rule::new(r"^Buy[ -]?In:\s*(.+)$", Parser::on_buy_in),
        Rule::new(r"^Rake:\s*(.+)$", Parser::on_rake),
        Rule::new(r"^Prize ?pool:\s*(.+)$", Parser::on_prize_pool),
        Rule::new(r"^Multiplier:\s*x?\s*(\d+(?:\.\d+)?)", Parser::on_multiplier),
        Rule::new(r"^Hand (?:ID:\s*|#)(\S+)", Parser::on_hand_number),
        Rule::new(r"^Blinds:\s*([\d,]+)\s*/\s*([\d,]+)", Parser::on_blinds),
        Rule::new(
            r"^Seat (\d+):\s*(.+?)\s*\(([\d,]+)(?:\s*chips)?\)\s*(?:\[([^\]]*)\])?$",
            Parser::on_seat,
        ),
        Rule::new(r"^Total Pot:\s*([\d,]+)", Parser::on_total_pot),
        Rule::new(
            r"^(.+?) finished (\d+)(?:st|nd|rd|th)(?: and wins (.+))?$",
            Parser::on_finished,
        ),
        Rule::new(r"^(.+?) wins (?:(.*?)\s*of )?([\d,]+)$", Parser::on_wins),
        Rule::new(r"^Dealt to (.+?)\s*\[([^\]]+)\]", Parser::on_dealt),
        Rule::new(
            r"^(?:\d{1,2}:\d{2}(?::\d{2})?\s*-\s*)?([^:\[]+?):\s*(.+)$",
            Parser::on_player_line,
        ),
    ]
});

/// What a player line says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Post { blind: Blind, size: Chips },
    Act { kind: ActionKind, size: Option<Chips> },
    Cards(HoleCards),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blind {
    Small,
    Big,
    Ante,
}

type VerbFn = fn(&Captures<'_>, bool) -> Option<Verb>;

/// Player line verbs, the bool argument is the all-in flag.
static VERBS: LazyLock<Vec<(Regex, VerbFn)>> = LazyLock::new(|| {
    let verb = |pattern: &str, f: VerbFn| {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("Invalid verb pattern");
        (re, f)
    };

    vec![
        verb(r"^\[([^\]]+)\]$", |c, _| {
            HoleCards::parse(&c[1]).map(Verb::Cards)
        }),
        verb(r"^shows\s*\[([^\]]+)\]", |c, _| {
            HoleCards::parse(&c[1]).map(Verb::Cards)
        }),
        verb(
            r"^posts (?:the )?(small blind|big blind|sb|bb|ante)\s*([\d,]+)",
            |c, _| {
                let blind = match c[1].to_ascii_lowercase().as_str() {
                    "sb" | "small blind" => Blind::Small,
                    "bb" | "big blind" => Blind::Big,
                    _ => Blind::Ante,
                };
                let size = Chips::parse(&c[2])?;
                Some(Verb::Post { blind, size })
            },
        ),
        verb(r"^raises (?:[\d,]+ )?to ([\d,]+)", |c, all_in| {
            let kind = if all_in {
                ActionKind::Push
            } else {
                ActionKind::Raise
            };
            Some(Verb::Act {
                kind,
                size: Some(Chips::parse(&c[1])?),
            })
        }),
        verb(r"^bets ([\d,]+)", |c, all_in| {
            let kind = if all_in {
                ActionKind::Push
            } else {
                ActionKind::Bet
            };
            Some(Verb::Act {
                kind,
                size: Some(Chips::parse(&c[1])?),
            })
        }),
        verb(r"^calls ([\d,]+)", |c, _| {
            Some(Verb::Act {
                kind: ActionKind::Call,
                size: Some(Chips::parse(&c[1])?),
            })
        }),
        verb(r"^checks", |_, _| {
            Some(Verb::Act {
                kind: ActionKind::Check,
                size: None,
            })
        }),
        verb(r"^folds", |_, _| {
            Some(Verb::Act {
                kind: ActionKind::Fold,
                size: None,
            })
        }),
    ]
});

impl Verb {
    fn parse(text: &str) -> Option<(Verb, bool)> {
        let lower = text.to_ascii_lowercase();
        let all_in = lower.contains("all-in") || lower.contains("all in");

        VERBS
            .iter()
            .find_map(|(re, f)| re.captures(text).map(|caps| f(&caps, all_in)))
            .flatten()
            .map(|verb| (verb, all_in))
    }
}

/// The parser state.
#[derive(Debug, Default)]
struct Parser {
    section: Section,
    street: Street,
    /// Merged tournaments.
    output: Vec<Tournament>,
    index: AHashMap<String, usize>,
    tournament: Option<Tournament>,
    hand: Option<Hand>,
    seats: AHashMap<String, u8>,
    order: u32,
    board: Vec<Card>,
}

impl Parser {
    fn line(mut self, line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return self;
        }

        let matched = RULES
            .iter()
            .find_map(|rule| rule.re.captures(line).map(|caps| (rule.handler, caps)));
        if let Some((handler, caps)) = matched {
            handler(&mut self, &caps);
        }

        self
    }

    fn finish(mut self) -> ParseOutput {
        self.flush_tournament();

        let mut tournaments = self.output;
        tournaments.iter_mut().for_each(Tournament::finalize);
        ParseOutput { tournaments }
    }

    fn tournament_mut(&mut self) -> &mut Tournament {
        self.tournament.get_or_insert_with(Tournament::default)
    }

    fn hand_mut(&mut self) -> &mut Hand {
        self.hand.get_or_insert_with(Hand::default)
    }

    /// The hand being parsed or the last hand of the current tournament.
    fn target_hand(&mut self) -> Option<&mut Hand> {
        match &mut self.hand {
            Some(hand) => Some(hand),
            None => self.tournament.as_mut().and_then(|t| t.hands.last_mut()),
        }
    }

    fn is_hero_name(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case("hero")
            || self
                .tournament
                .as_ref()
                .and_then(|t| t.hero_name.as_deref())
                .is_some_and(|hero| hero == name)
    }

    /// Resolves a seat by name, the hero is also found by its alias.
    fn resolve_seat(&self, name: &str) -> Option<u8> {
        self.seats.get(name).copied().or_else(|| {
            if self.is_hero_name(name) {
                self.hand.as_ref().and_then(|h| h.hero_seat)
            } else {
                None
            }
        })
    }

    fn flush_hand(&mut self) {
        if let Some(mut hand) = self.hand.take() {
            if !hand.is_empty() {
                let tournament = self.tournament_mut();
                if hand.played_at.is_none() {
                    hand.played_at = tournament.started_at;
                }

                tournament.hands.push(hand);
            }
        }

        self.seats.clear();
        self.order = 0;
        self.street = Street::Preflop;
        self.board.clear();
    }

    fn flush_tournament(&mut self) {
        self.flush_hand();

        let Some(tournament) = self.tournament.take() else {
            return;
        };

        if tournament.game_id.is_empty() && tournament.hands.is_empty() {
            return;
        }

        match self.index.get(&tournament.game_id) {
            Some(&idx) => self.output[idx].merge(tournament),
            None => {
                self.index
                    .insert(tournament.game_id.clone(), self.output.len());
                self.output.push(tournament);
            }
        }
    }

    fn push_action(&mut self, seat: Option<u8>, kind: ActionKind, size: Option<Chips>, all_in: bool) {
        self.order += 1;
        let street = match self.section {
            Section::Street(street) => street,
            _ => self.street,
        };

        let action = Action {
            order: self.order,
            street,
            seat,
            kind,
            size,
            all_in,
        };

        self.hand_mut().actions.push(action);
    }

    fn reveal(&mut self, name: &str, cards: HoleCards) {
        let seat = self.resolve_seat(name);
        let is_hero = self.is_hero_name(name);
        let hand = self.hand_mut();

        if let Some(seat) = seat {
            if let Some(player) = hand.player_mut(seat) {
                player.hole_cards = Some(cards);
            }
        }

        if is_hero || (seat.is_some() && seat == hand.hero_seat) {
            hand.hero_cards = Some(cards);
        }
    }

    fn on_header(&mut self, _: &Captures<'_>) {
        self.flush_tournament();
        self.tournament = Some(Tournament::default());
        self.section = Section::Header;
    }

    fn on_players(&mut self, _: &Captures<'_>) {
        self.hand_mut();
        self.section = Section::Players;
    }

    fn on_hole_cards(&mut self, _: &Captures<'_>) {
        self.hand_mut();
        self.section = Section::HoleCards;
        self.street = Street::Preflop;
    }

    fn on_street(&mut self, caps: &Captures<'_>) {
        let street = match caps[1].to_ascii_uppercase().as_str() {
            "FLOP" => Street::Flop,
            "TURN" => Street::Turn,
            "RIVER" => Street::River,
            _ => Street::Preflop,
        };

        self.section = Section::Street(street);
        self.street = street;

        for card in parse_cards(&caps[2]) {
            if !self.board.contains(&card) {
                self.board.push(card);
            }
        }

        let snapshot = (!self.board.is_empty()).then(|| format_cards(&self.board));
        let hand = self.hand.get_or_insert_with(Hand::default);
        if let Some(snapshot) = snapshot {
            match street {
                Street::Flop => hand.board_flop = Some(snapshot.clone()),
                Street::Turn => hand.board_turn = Some(snapshot.clone()),
                Street::River => hand.board_river = Some(snapshot.clone()),
                Street::Preflop => {}
            }

            hand.board = Some(snapshot);
        }
    }

    fn on_summary(&mut self, _: &Captures<'_>) {
        self.section = Section::Summary;
    }

    fn on_separator(&mut self, _: &Captures<'_>) {
        self.flush_hand();
        self.section = Section::Header;
    }

    fn on_game_id(&mut self, caps: &Captures<'_>) {
        self.tournament_mut().game_id = caps[1].trim().to_string();
    }

    fn on_date(&mut self, caps: &Captures<'_>) {
        if let Some(dt) = parse_time(&caps[1], &caps[2]) {
            self.tournament_mut().started_at = Some(dt);
        }
    }

    fn on_buy_in(&mut self, caps: &Captures<'_>) {
        self.tournament_mut().buy_in = parse_money(&caps[1]);
    }

    fn on_rake(&mut self, caps: &Captures<'_>) {
        self.tournament_mut().rake = parse_money(&caps[1]);
    }

    fn on_prize_pool(&mut self, caps: &Captures<'_>) {
        self.tournament_mut().prize_pool = parse_money(&caps[1]);
    }

    fn on_multiplier(&mut self, caps: &Captures<'_>) {
        self.tournament_mut().multiplier = caps[1].parse().ok();
    }

    fn on_hand_number(&mut self, caps: &Captures<'_>) {
        self.hand_mut().hand_number = Some(caps[1].to_string());
    }

    fn on_blinds(&mut self, caps: &Captures<'_>) {
        let hand = self.hand_mut();
        hand.small_blind = Chips::parse(&caps[1]);
        hand.big_blind = Chips::parse(&caps[2]);
    }

    fn on_seat(&mut self, caps: &Captures<'_>) {
        // Summary sections repeat the seats with the results.
        if self.section != Section::Players {
            return;
        }

        let (Ok(seat), Some(stack)) = (caps[1].parse::<u8>(), Chips::parse(&caps[3])) else {
            return;
        };

        let name = caps[2].trim().to_string();
        let is_hero = name.eq_ignore_ascii_case("hero")
            || caps.get(4).is_some_and(|tags| {
                tags.as_str()
                    .split_whitespace()
                    .any(|tag| tag.eq_ignore_ascii_case("hero"))
            });

        self.seats.insert(name.clone(), seat);
        if is_hero {
            self.tournament_mut().hero_name = Some(name.clone());
        }

        let hand = self.hand_mut();
        if is_hero {
            hand.hero_seat = Some(seat);
        }

        hand.players.retain(|p| p.seat != seat);
        hand.players.push(HandPlayer {
            seat,
            name,
            stack,
            hole_cards: None,
            is_hero,
        });
    }

    fn on_total_pot(&mut self, caps: &Captures<'_>) {
        let pot = Chips::parse(&caps[1]);
        if let Some(hand) = self.target_hand() {
            hand.total_pot = pot;
        }
    }

    fn on_finished(&mut self, caps: &Captures<'_>) {
        if !self.is_hero_name(caps[1].trim()) {
            return;
        }

        let position = caps[2].parse().ok();
        let winnings = caps.get(3).and_then(|m| parse_money(m.as_str()));

        let tournament = self.tournament_mut();
        tournament.hero_position = position;
        tournament.hero_winnings = Some(winnings.unwrap_or_default());
    }

    fn on_wins(&mut self, caps: &Captures<'_>) {
        let name = caps[1].trim();
        let pot = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());
        let amount = Chips::parse(&caps[3]);

        let seat = self.seats.get(name).copied();
        let is_hero = self.is_hero_name(name);
        let Some(hand) = self.target_hand() else {
            return;
        };

        let seat = seat.or(if is_hero { hand.hero_seat } else { None });
        let is_main = pot.as_deref().is_some_and(|p| p.contains("main"));
        let is_side = pot.as_deref().is_some_and(|p| p.contains("side"));

        if seat.is_some() && (!is_side || hand.winner_seat.is_none()) {
            hand.winner_seat = seat;
        }

        if is_main {
            hand.main_pot = amount;
        }
    }

    fn on_dealt(&mut self, caps: &Captures<'_>) {
        if let Some(cards) = HoleCards::parse(&caps[2]) {
            self.reveal(caps[1].trim(), cards);
        }
    }

    fn on_player_line(&mut self, caps: &Captures<'_>) {
        let name = caps[1].trim();
        let Some((verb, all_in)) = Verb::parse(caps[2].trim()) else {
            return;
        };

        match verb {
            Verb::Cards(cards) => self.reveal(name, cards),
            Verb::Post { blind, size } => {
                let seat = self.resolve_seat(name);
                let hand = self.hand_mut();
                match blind {
                    Blind::Small => hand.small_blind = hand.small_blind.or(Some(size)),
                    Blind::Big => hand.big_blind = hand.big_blind.or(Some(size)),
                    Blind::Ante => {}
                }

                self.push_action(seat, ActionKind::Bet, Some(size), all_in);
            }
            Verb::Act { kind, size } => {
                let seat = self.resolve_seat(name);
                self.push_action(seat, kind, size, all_in);
            }
        }
    }
}

fn parse_time(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let text = format!("{date} {time}");
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&text, fmt).ok())
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use indoc::indoc;

    /// A three players tournament, the hero wins a walk and then busts all-in
    /// with AKo against QQ.
    pub(crate) const FIXTURE: &str = indoc! {"
        *** HEADER ***
        Game ID: 2024050112345
        Date & Time: 2024-05-01 10:00:00 (UTC)
        Buy In: 4.60 EUR
        Rake: 0.40 EUR
        Prize pool: 20.00 EUR
        Multiplier: x2
        Hand #1
        Blinds: 10/20
        *** PLAYERS ***
        Seat 1: Alice (500) [BTN]
        Seat 2: Bob (500) [SB]
        Seat 3: Villain (500) [BB Hero]
        *** HOLE CARDS ***
        Villain: [7c 2d]
        *** PRE-FLOP ***
        10:00:02 - Bob: Posts SB 10
        10:00:02 - Villain: Posts BB 20
        10:00:05 - Alice: Folds
        10:00:07 - Bob: Folds
        *** SUMMARY ***
        Total Pot: 30
        Hero wins pot of 30
        ------------
        *** HEADER ***
        Game ID: 2024050112345
        Date & Time: 2024-05-01 10:01:00 (UTC)
        Buy In: 4.60 EUR
        Rake: 0.40 EUR
        Prize pool: 20.00 EUR
        Multiplier: x2
        Hand #2
        Blinds: 10/20
        *** PLAYERS ***
        Seat 1: Alice (500) [BTN]
        Seat 2: Bob (490) [SB]
        Seat 3: Villain (500) [BB Hero]
        *** HOLE CARDS ***
        Villain: [As Kd]
        *** PRE-FLOP ***
        10:01:02 - Bob: Posts SB 10
        10:01:02 - Villain: Posts BB 20
        10:01:05 - Alice: Raises to 500 and is all-in
        10:01:07 - Bob: Folds
        10:01:09 - Villain: Calls 480 and is all-in
        Alice: Shows [Qh Qd]
        *** FLOP *** [2h 7s Jd]
        *** TURN *** [2h 7s Jd] [4c]
        *** RIVER *** [2h 7s Jd 4c] [9c]
        *** SUMMARY ***
        Total Pot: 1,010
        Alice wins main pot of 1,010
        Villain finished 3rd
        ------------
    "};

    #[test]
    fn parse_fixture() {
        let output = parse(FIXTURE);
        assert_eq!(output.tournaments.len(), 1);
        assert_eq!(output.hand_count(), 2);

        let t = &output.tournaments[0];
        assert_eq!(t.game_id, "2024050112345");
        assert_eq!(
            t.started_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(t.buy_in, Some(460));
        assert_eq!(t.rake, Some(40));
        assert_eq!(t.prize_pool, Some(2000));
        assert_eq!(t.multiplier, Some(2.0));
        assert_eq!(t.hero_name.as_deref(), Some("Villain"));
        assert_eq!(t.hero_position, Some(3));
        assert_eq!(t.hero_profit, Some(-500));

        // At least one complete hand.
        assert!(t.hands.iter().any(|h| h.players.len() >= 2
            && !h.actions.is_empty()
            && h.total_pot.is_some_and(|p| p > Chips::ZERO)));

        let walk = &t.hands[0];
        assert_eq!(walk.hand_number.as_deref(), Some("1"));
        assert_eq!(walk.small_blind, Some(Chips::new(10)));
        assert_eq!(walk.big_blind, Some(Chips::new(20)));
        assert_eq!(walk.hero_seat, Some(3));
        assert_eq!(walk.winner_seat, Some(3));
        assert_eq!(walk.total_pot, Some(Chips::new(30)));
        assert_eq!(walk.actions.len(), 4);
        assert_eq!(walk.board, None);
        assert_eq!(walk.hero_cards, HoleCards::parse("7c 2d"));

        let allin = &t.hands[1];
        assert_eq!(
            allin.played_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 1, 0).unwrap())
        );
        assert_eq!(allin.hero_cards, HoleCards::parse("As Kd"));
        assert_eq!(allin.player(1).unwrap().hole_cards, HoleCards::parse("Qh Qd"));
        assert_eq!(allin.player(2).unwrap().stack, Chips::new(490));
        assert!(allin.player(3).unwrap().is_hero);
        assert_eq!(allin.board_flop.as_deref(), Some("2h 7s Jd"));
        assert_eq!(allin.board_turn.as_deref(), Some("2h 7s Jd 4c"));
        assert_eq!(allin.board_river.as_deref(), Some("2h 7s Jd 4c 9c"));
        assert_eq!(allin.board.as_deref(), Some("2h 7s Jd 4c 9c"));
        assert_eq!(allin.total_pot, Some(Chips::new(1010)));
        assert_eq!(allin.main_pot, Some(Chips::new(1010)));
        assert_eq!(allin.winner_seat, Some(1));

        let kinds = allin.actions.iter().map(|a| a.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [
                ActionKind::Bet,
                ActionKind::Bet,
                ActionKind::Push,
                ActionKind::Fold,
                ActionKind::Call
            ]
        );

        let push = &allin.actions[2];
        assert_eq!(push.seat, Some(1));
        assert_eq!(push.size, Some(Chips::new(500)));
        assert!(push.all_in);
        assert_eq!(allin.actions[3].size, None);
        assert_eq!(allin.actions[4].seat, Some(3));
        assert_eq!(allin.actions[4].size, Some(Chips::new(480)));
        assert!(allin.actions[4].all_in);
    }

    #[test]
    fn reparse_is_stable() {
        let o1 = parse(FIXTURE);
        let o2 = parse(FIXTURE);
        assert_eq!(o1, o2);
        assert_eq!(o1.tournaments[0].hands[1].id, o2.tournaments[0].hands[1].id);
        assert_ne!(o1.tournaments[0].hands[0].id, o1.tournaments[0].hands[1].id);
    }

    #[test]
    fn action_orders_are_contiguous() {
        let output = parse(FIXTURE);
        for hand in output.tournaments.iter().flat_map(|t| &t.hands) {
            let orders = hand.actions.iter().map(|a| a.order).collect::<Vec<_>>();
            let expected = (1..=hand.actions.len() as u32).collect::<Vec<_>>();
            assert_eq!(orders, expected);
        }
    }

    #[test]
    fn actions_by_street() {
        let text = indoc! {"
            *** PLAYERS ***
            Seat 1: Alice (1000)
            Seat 2: Hero (1000)
            *** PRE-FLOP ***
            Alice: Posts SB 10
            Hero: Posts BB 20
            Alice: Calls 10
            Hero: Checks
            *** FLOP *** [Ah 5C tD]
            Hero: Bets 40
            Alice: Raises 40 to 120
            Hero: Raises to 980 and is all-in
            Alice: Calls 860 and is all-in
        "};

        let output = parse(text);
        assert_eq!(output.tournaments.len(), 1);
        assert_eq!(output.tournaments[0].game_id, "");

        let hand = &output.tournaments[0].hands[0];
        assert_eq!(hand.hero_seat, Some(2));
        assert_eq!(hand.board_flop.as_deref(), Some("Ah 5c Td"));

        let streets = hand.actions.iter().map(|a| a.street).collect::<Vec<_>>();
        assert_eq!(&streets[..4], &[Street::Preflop; 4]);
        assert_eq!(&streets[4..], &[Street::Flop; 4]);

        assert_eq!(hand.actions[5].kind, ActionKind::Raise);
        assert_eq!(hand.actions[5].size, Some(Chips::new(120)));
        assert_eq!(hand.actions[6].kind, ActionKind::Push);
        assert_eq!(hand.actions[7].kind, ActionKind::Call);
        assert!(hand.actions[7].all_in);
    }

    #[test]
    fn merge_chunks_by_game_id() {
        let chunk = |time: &str, buy_in: &str, seat: &str| {
            format!(
                "*** HEADER ***\nGame ID: 77\nDate & Time: 2024-05-01 {time}\n\
                 Buy In: {buy_in}\n*** PLAYERS ***\n{seat}\n------------\n"
            )
        };

        let text = [
            chunk("12:00:00", "1.00", "Seat 1: A (500) [Hero]"),
            chunk("11:00:00", "", "Seat 2: B (500)"),
            "*** HEADER ***\nGame ID: 78\n".to_string(),
            chunk("13:00:00", "2.00", "Seat 3: C (500)"),
        ]
        .concat();

        let output = parse(&text);
        assert_eq!(output.tournaments.len(), 2);

        let t = &output.tournaments[0];
        assert_eq!(t.game_id, "77");
        assert_eq!(t.hands.len(), 3);
        assert_eq!(t.buy_in, Some(200));
        assert_eq!(t.hero_name.as_deref(), Some("A"));
        assert_eq!(
            t.started_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap())
        );

        let seats = t.hands.iter().map(|h| h.players[0].seat).collect::<Vec<_>>();
        assert_eq!(seats, [1, 2, 3]);
        assert_eq!(output.tournaments[1].game_id, "78");
        assert!(output.tournaments[1].hands.is_empty());
    }

    #[test]
    fn tolerates_garbage() {
        assert_eq!(parse("").hand_count(), 0);
        assert_eq!(parse("hello\nworld: foo\n*** SUMMARY ***\n").hand_count(), 0);

        // Unresolved names and broken lines still give partial records.
        let text = indoc! {"
            *** HEADER ***
            Game ID: 1
            Date & Time: yesterday
            Buy In: ???
            *** PLAYERS ***
            Seat x: Nobody (abc)
            Seat 1: Alice (500)
            *** PRE-FLOP ***
            Stranger: Calls 20
            Alice: Dances
            Alice: [Zz 9x]
            Summary line without data
            Total Pot: 20
        "};

        let output = parse(text);
        let t = &output.tournaments[0];
        assert_eq!(t.started_at, None);
        assert_eq!(t.buy_in, None);

        let hand = &t.hands[0];
        assert_eq!(hand.players.len(), 1);
        assert_eq!(hand.actions.len(), 1);
        assert_eq!(hand.actions[0].seat, None);
        assert_eq!(hand.player(1).unwrap().hole_cards, None);
        assert_eq!(hand.total_pot, Some(Chips::new(20)));
    }

    #[test]
    fn hero_aliases_and_finish() {
        let text = indoc! {"
            *** HEADER ***
            Game ID: 5
            Buy In: 1.84 EUR
            Rake: 0.16 EUR
            Multiplier: x10
            Hand ID: 99-1
            *** PLAYERS ***
            Seat 1: Alice (500)
            Seat 2: Bob (500)
            Seat 3: Joe (500) [BTN Hero]
            *** HOLE CARDS ***
            Dealt to Joe [Th Tc]
            *** PRE-FLOP ***
            Hero: Raises to 40
            *** SUMMARY ***
            Total Pot: 70
            Hero wins 70
            Joe finished 1st and wins 20,00 EUR
        "};

        let t = &parse(text).tournaments[0];
        let hand = &t.hands[0];
        assert_eq!(hand.hand_number.as_deref(), Some("99-1"));
        assert_eq!(hand.hero_cards, HoleCards::parse("Th Tc"));
        assert_eq!(hand.actions[0].seat, Some(3));
        assert_eq!(hand.winner_seat, Some(3));
        assert_eq!(hand.main_pot, None);

        assert_eq!(t.prize_pool, Some(1840));
        assert_eq!(t.hero_position, Some(1));
        assert_eq!(t.hero_winnings, Some(2000));
        assert_eq!(t.hero_profit, Some(2000 - 184 - 16));
    }
}
