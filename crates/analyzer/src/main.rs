// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
use clap::Parser;
use directories::ProjectDirs;
use log::error;
use std::path::PathBuf;

use evtracker_analyzer::pool::WorkerPool;
use evtracker_core::{EvCalculator, curve::DEFAULT_PLAYER_COUNT};

#[derive(Debug, Parser)]
struct Cli {
    /// Hand history files.
    #[clap(required = true)]
    files: Vec<PathBuf>,
    /// Monte Carlo samples per all-in.
    #[clap(long, short, default_value_t = EvCalculator::DEFAULT_SAMPLES as u64, value_parser = clap::value_parser!(u64).range(1..))]
    samples: u64,
    /// Random seed for reproducible results.
    #[clap(long)]
    seed: Option<u64>,
    /// Number of workers, defaults to half the cores.
    #[clap(long, short, value_parser = clap::value_parser!(u16).range(1..=256))]
    workers: Option<u16>,
    /// Hands per worker batch.
    #[clap(long, default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    batch_size: u32,
    /// The EV cache database path.
    #[clap(long)]
    cache: Option<PathBuf>,
    /// Don't use the EV cache.
    #[clap(long, conflicts_with = "cache")]
    no_cache: bool,
    /// Players per tournament.
    #[clap(long, default_value_t = DEFAULT_PLAYER_COUNT, value_parser = clap::value_parser!(u32).range(2..=10))]
    player_count: u32,
    /// Write the EV and bankroll curves as JSON to this file.
    #[clap(long)]
    curves: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let cache = if cli.no_cache {
        None
    } else {
        cli.cache.or_else(|| {
            ProjectDirs::from("", "", "evtracker").map(|dirs| dirs.data_dir().join("ev_cache.sqlite"))
        })
    };

    let config = evtracker_analyzer::Config {
        files: cli.files,
        samples: cli.samples as usize,
        seed: cli.seed,
        workers: cli
            .workers
            .map_or_else(WorkerPool::default_size, |n| n as usize),
        batch_size: cli.batch_size as usize,
        cache,
        player_count: cli.player_count,
        curves: cli.curves,
    };

    match evtracker_analyzer::run(config).await {
        Ok(report) => println!("{report}"),
        Err(e) => error!("{e}"),
    }
}
