// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Persistent cache of computed hands EV.
use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::{path::Path, sync::Arc};
use xxhash_rust::xxh3::xxh3_64;

use evtracker_core::{EvHand, HandId};

use crate::pool::HandEv;

/// Cache entries with a different version are ignored.
pub const SCHEMA_VERSION: i64 = 1;

/// A cache entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The hand id.
    pub id: HandId,
    /// Hash of the hand data and the computation parameters.
    pub fingerprint: u64,
}

impl CacheKey {
    /// Creates the key for a hand computed with the given parameters.
    pub fn new(hand: &EvHand, samples: usize, seed: Option<u64>) -> Result<Self> {
        let bytes = bincode::serialize(&(hand, samples as u64, seed))?;
        Ok(Self {
            id: hand.id,
            fingerprint: xxh3_64(&bytes),
        })
    }
}

/// Cache of computed hands EV.
#[derive(Debug, Clone)]
pub struct EvCache {
    db: Arc<Mutex<Connection>>,
}

impl EvCache {
    /// Open a cache database creating the parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::init(Connection::open(path)?)
    }

    /// Open an in memory cache.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS hand_ev (
               hand_id INTEGER PRIMARY KEY,
               version INTEGER NOT NULL,
               fingerprint INTEGER NOT NULL,
               realized INTEGER,
               adjusted INTEGER,
               samples INTEGER NOT NULL,
               last_update DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )?;

        Ok(EvCache {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Looks up the keys, returns none for entries that are missing or that
    /// have a different version or fingerprint.
    pub async fn lookup(&self, keys: Vec<CacheKey>) -> Result<Vec<Option<HandEv>>> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let db = db.lock();

            let mut stmt = db.prepare_cached(
                "SELECT realized, adjusted, samples
                 FROM hand_ev
                 WHERE hand_id = ?1 AND version = ?2 AND fingerprint = ?3",
            )?;

            let mut results = Vec::with_capacity(keys.len());
            for key in keys {
                let row = stmt
                    .query_row(
                        params![
                            key.id.value() as i64,
                            SCHEMA_VERSION,
                            key.fingerprint as i64
                        ],
                        |row| {
                            Ok(HandEv {
                                id: key.id,
                                realized: row.get(0)?,
                                adjusted: row.get(1)?,
                                samples: row.get::<usize, i64>(2)? as usize,
                            })
                        },
                    )
                    .optional()?;
                results.push(row);
            }

            Ok(results)
        })
        .await?
    }

    /// Stores the results, replacing previous entries for the same hands.
    pub async fn store(&self, entries: Vec<(CacheKey, HandEv)>) -> Result<()> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let mut db = db.lock();

            let tx = db.transaction()?;

            for (key, ev) in entries {
                tx.execute(
                    "INSERT INTO hand_ev
                       (hand_id, version, fingerprint, realized, adjusted, samples, last_update)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, CURRENT_TIMESTAMP)
                     ON CONFLICT(hand_id) DO UPDATE SET
                       version = excluded.version,
                       fingerprint = excluded.fingerprint,
                       realized = excluded.realized,
                       adjusted = excluded.adjusted,
                       samples = excluded.samples,
                       last_update = CURRENT_TIMESTAMP",
                    params![
                        key.id.value() as i64,
                        SCHEMA_VERSION,
                        key.fingerprint as i64,
                        ev.realized,
                        ev.adjusted,
                        ev.samples as i64
                    ],
                )?;
            }

            tx.commit()?;

            Ok(())
        })
        .await?
    }

    /// Number of cached hands.
    pub async fn count(&self) -> Result<usize> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let db = db.lock();
            let count = db.query_row("SELECT COUNT(*) FROM hand_ev", (), |row| {
                row.get::<usize, i64>(0)
            })?;
            Ok(count as usize)
        })
        .await?
    }

    #[cfg(test)]
    fn set_version(&self, id: HandId, version: i64) -> Result<()> {
        self.db.lock().execute(
            "UPDATE hand_ev SET version = ?1 WHERE hand_id = ?2",
            params![version, id.value() as i64],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtracker_core::{Hand, HoleCards};

    fn ev_hand(ordinal: usize, cards: &str) -> EvHand {
        EvHand::from(&Hand {
            id: HandId::new("cache", ordinal),
            hero_seat: Some(1),
            hero_cards: HoleCards::parse(cards),
            ..Default::default()
        })
    }

    fn ev(key: &CacheKey, realized: i64) -> HandEv {
        HandEv {
            id: key.id,
            realized: Some(realized),
            adjusted: None,
            samples: 0,
        }
    }

    #[test]
    fn fingerprints() {
        let hand = ev_hand(0, "As Kd");
        let k1 = CacheKey::new(&hand, 1_000, Some(1)).unwrap();
        assert_eq!(k1, CacheKey::new(&hand, 1_000, Some(1)).unwrap());
        assert_ne!(k1, CacheKey::new(&hand, 2_000, Some(1)).unwrap());
        assert_ne!(k1, CacheKey::new(&hand, 1_000, None).unwrap());

        let other = ev_hand(0, "Ah Kd");
        let k2 = CacheKey::new(&other, 1_000, Some(1)).unwrap();
        assert_eq!(k1.id, k2.id);
        assert_ne!(k1.fingerprint, k2.fingerprint);
    }

    #[tokio::test]
    async fn lookup_and_store() {
        let cache = EvCache::open_in_memory().unwrap();
        let k1 = CacheKey::new(&ev_hand(0, "As Kd"), 100, Some(1)).unwrap();
        let k2 = CacheKey::new(&ev_hand(1, "Qs Qd"), 100, Some(1)).unwrap();

        let res = cache.lookup(vec![k1, k2]).await.unwrap();
        assert!(res.iter().all(Option::is_none));

        cache.store(vec![(k1, ev(&k1, 10))]).await.unwrap();
        let res = cache.lookup(vec![k1, k2]).await.unwrap();
        assert_eq!(res, vec![Some(ev(&k1, 10)), None]);

        // Last write wins.
        cache
            .store(vec![(k1, ev(&k1, -20)), (k2, ev(&k2, 5))])
            .await
            .unwrap();
        let res = cache.lookup(vec![k1, k2]).await.unwrap();
        assert_eq!(res, vec![Some(ev(&k1, -20)), Some(ev(&k2, 5))]);
        assert_eq!(cache.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn mismatches_are_misses() {
        let cache = EvCache::open_in_memory().unwrap();
        let key = CacheKey::new(&ev_hand(0, "As Kd"), 100, Some(1)).unwrap();
        cache.store(vec![(key, ev(&key, 10))]).await.unwrap();

        let changed = CacheKey::new(&ev_hand(0, "Ah Kd"), 100, Some(1)).unwrap();
        assert_eq!(cache.lookup(vec![changed]).await.unwrap()[0], None);

        cache.set_version(key.id, SCHEMA_VERSION + 1).unwrap();
        assert_eq!(cache.lookup(vec![key]).await.unwrap()[0], None);
    }
}
