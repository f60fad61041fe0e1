// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Hands EV analysis.
use ahash::AHashMap;
use anyhow::{Result, bail};
use log::{debug, info, warn};
use serde::Serialize;
use std::{fmt, path::PathBuf, time::Instant};
use tokio::task::JoinSet;

use evtracker_core::{
    Chips, EvHand, HandRepository, MemoryRepository, Tournament,
    curve::{self, BankrollPoint, EvPoint},
};

use crate::{
    db::{CacheKey, EvCache},
    import::import_file,
    pool::WorkerPool,
};

/// Analysis config.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hand history files to import.
    pub files: Vec<PathBuf>,
    /// Monte Carlo samples per all-in.
    pub samples: usize,
    /// Random seed for reproducible results.
    pub seed: Option<u64>,
    /// Number of workers.
    pub workers: usize,
    /// Hands per worker batch.
    pub batch_size: usize,
    /// The EV cache database path.
    pub cache: Option<PathBuf>,
    /// Players per tournament.
    pub player_count: u32,
    /// Path for writing the curves as JSON.
    pub curves: Option<PathBuf>,
}

/// Where the hands EV came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    /// Hands computed by the workers.
    pub computed: usize,
    /// Hands found in the cache.
    pub cached: usize,
}

/// The analysis results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Number of tournaments.
    pub tournaments: usize,
    /// Number of hands.
    pub hands: usize,
    /// EV sources.
    pub stats: AnalysisStats,
    /// The cumulative EV curve.
    pub ev_curve: Vec<EvPoint>,
    /// The cumulative bankroll curve.
    pub bankroll: Vec<BankrollPoint>,
}

impl Report {
    /// Builds the report curves from the analyzed tournaments.
    pub fn new(tournaments: &[Tournament], stats: AnalysisStats, player_count: u32) -> Self {
        Self {
            tournaments: tournaments.len(),
            hands: tournaments.iter().map(|t| t.hands.len()).sum(),
            stats,
            ev_curve: curve::ev_curve(tournaments.iter().flat_map(|t| &t.hands)),
            bankroll: curve::bankroll_curve(tournaments, player_count),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ev = self.ev_curve.last().cloned().unwrap_or_default();
        let bankroll = self.bankroll.last().cloned().unwrap_or_default();

        writeln!(f, "Tournaments  {}", self.tournaments)?;
        writeln!(
            f,
            "Hands        {} ({} computed, {} cached)",
            self.hands, self.stats.computed, self.stats.cached
        )?;
        writeln!(
            f,
            "Chips won    {} (all-in adjusted {})",
            signed_chips(ev.cum_actual),
            signed_chips(ev.cum_adj)
        )?;
        write!(
            f,
            "Profit       {} (expected {})",
            money(bankroll.cum_profit_cents),
            money(bankroll.cum_expected_cents)
        )
    }
}

fn signed_chips(value: i64) -> String {
    let chips = Chips::new(value.unsigned_abs());
    if value < 0 {
        format!("-{chips}")
    } else {
        chips.to_string()
    }
}

fn money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

/// Imports the files, computes the hands EV and builds the curves.
pub async fn run(config: Config) -> Result<Report> {
    let mut repo = MemoryRepository::default();
    for path in &config.files {
        if let Err(e) = import_file(&mut repo, path).await {
            warn!("Import failed: {e}");
        }
    }

    if repo.hand_ids().is_empty() {
        bail!("No hands imported");
    }

    let cache = config.cache.as_ref().map(EvCache::open).transpose()?;
    let pool = WorkerPool::new(config.workers);
    info!(
        "Analyzing with {} workers and {} samples",
        pool.size(),
        config.samples
    );

    let stats = analyze(
        &mut repo,
        &pool,
        cache.as_ref(),
        config.samples,
        config.seed,
        config.batch_size,
    )
    .await?;

    let report = Report::new(&repo.tournaments(), stats, config.player_count);

    if let Some(path) = &config.curves {
        #[derive(Serialize)]
        struct Curves<'a> {
            ev: &'a [EvPoint],
            bankroll: &'a [BankrollPoint],
        }

        let json = serde_json::to_string_pretty(&Curves {
            ev: &report.ev_curve,
            bankroll: &report.bankroll,
        })?;
        tokio::fs::write(path, json).await?;
        info!("Curves written to {}", path.display());
    }

    Ok(report)
}

/// Computes the EV of all the stored hands and saves it in the repository.
///
/// Hands found in the cache are not computed, the computed ones are added to
/// the cache.
pub async fn analyze<R>(
    repo: &mut R,
    pool: &WorkerPool,
    cache: Option<&EvCache>,
    samples: usize,
    seed: Option<u64>,
    batch_size: usize,
) -> Result<AnalysisStats>
where
    R: HandRepository + ?Sized,
{
    let start = Instant::now();
    let hands = repo
        .tournaments()
        .iter()
        .flat_map(|t| t.hands.iter().map(EvHand::from))
        .collect::<Vec<_>>();

    let keys = hands
        .iter()
        .map(|hand| CacheKey::new(hand, samples, seed))
        .collect::<Result<Vec<_>>>()?;

    let cached = match cache {
        Some(cache) => cache.lookup(keys.clone()).await?,
        None => vec![None; hands.len()],
    };

    let mut stats = AnalysisStats::default();
    let mut todo = Vec::new();
    let mut todo_keys = AHashMap::new();
    for ((hand, key), hit) in hands.into_iter().zip(keys).zip(cached) {
        match hit {
            Some(ev) => {
                repo.set_ev(ev.id, ev.realized, ev.adjusted);
                stats.cached += 1;
            }
            None => {
                todo_keys.insert(key.id, key);
                todo.push(hand);
            }
        }
    }

    let mut jobs = JoinSet::new();
    for batch in todo.chunks(batch_size.max(1)) {
        let pool = pool.clone();
        let batch = batch.to_vec();
        jobs.spawn(async move { pool.submit(batch, samples, seed).await });
    }

    let mut computed = Vec::with_capacity(todo.len());
    while let Some(res) = jobs.join_next().await {
        let resp = res??;
        debug!(
            "Job {} computed {} hands in {}ms",
            resp.job_id,
            resp.results.len(),
            resp.duration_ms
        );

        for ev in resp.results {
            repo.set_ev(ev.id, ev.realized, ev.adjusted);
            if let Some(&key) = todo_keys.get(&ev.id) {
                computed.push((key, ev));
            }
        }
    }

    stats.computed = computed.len();
    if let Some(cache) = cache {
        if !computed.is_empty() {
            cache.store(computed).await?;
        }
    }

    info!(
        "Hands EV ready in {:.1}s, {} computed {} cached",
        start.elapsed().as_secs_f64(),
        stats.computed,
        stats.cached
    );

    Ok(stats)
}
