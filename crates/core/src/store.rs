// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Tournaments and hands storage.
use ahash::AHashMap;

use crate::history::{Hand, HandId, Tournament};

/// Storage for parsed tournaments and computed EV.
pub trait HandRepository {
    /// Stores a tournament replacing a stored tournament with the same game
    /// id and all its hands.
    fn replace_tournament(&mut self, tournament: Tournament);

    /// Returns all the stored tournaments.
    fn tournaments(&self) -> Vec<Tournament>;

    /// Returns a hand by id.
    fn hand(&self, id: HandId) -> Option<Hand>;

    /// Returns the ids of all stored hands.
    fn hand_ids(&self) -> Vec<HandId>;

    /// Sets a hand EV values, returns false if the hand doesn't exist.
    fn set_ev(&mut self, id: HandId, realized: Option<i64>, adjusted: Option<i64>) -> bool;
}

/// An in memory [HandRepository].
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tournaments: Vec<Tournament>,
    /// Hand id to tournament and hand index.
    hands: AHashMap<HandId, (usize, usize)>,
}

impl MemoryRepository {
    fn reindex(&mut self) {
        self.hands.clear();
        for (tidx, tournament) in self.tournaments.iter().enumerate() {
            for (hidx, hand) in tournament.hands.iter().enumerate() {
                self.hands.insert(hand.id, (tidx, hidx));
            }
        }
    }

    fn hand_mut(&mut self, id: HandId) -> Option<&mut Hand> {
        let &(tidx, hidx) = self.hands.get(&id)?;
        self.tournaments.get_mut(tidx)?.hands.get_mut(hidx)
    }
}

impl HandRepository for MemoryRepository {
    fn replace_tournament(&mut self, tournament: Tournament) {
        match self
            .tournaments
            .iter_mut()
            .find(|t| t.game_id == tournament.game_id)
        {
            Some(stored) => *stored = tournament,
            None => self.tournaments.push(tournament),
        }

        self.reindex();
    }

    fn tournaments(&self) -> Vec<Tournament> {
        self.tournaments.clone()
    }

    fn hand(&self, id: HandId) -> Option<Hand> {
        let &(tidx, hidx) = self.hands.get(&id)?;
        self.tournaments.get(tidx)?.hands.get(hidx).cloned()
    }

    fn hand_ids(&self) -> Vec<HandId> {
        self.tournaments
            .iter()
            .flat_map(|t| t.hands.iter().map(|h| h.id))
            .collect()
    }

    fn set_ev(&mut self, id: HandId, realized: Option<i64>, adjusted: Option<i64>) -> bool {
        match self.hand_mut(id) {
            Some(hand) => {
                hand.realized_change = realized;
                hand.all_in_adjusted_change = adjusted;
                true
            }
            None => false,
        }
    }
}
