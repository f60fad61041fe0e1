// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
//
// Run with:
//
// ```bash
// $ cargo r --release --example equity -- --hero "As Kd" --villain "Qh Qd"
// Hero:     As Kd
// Villains: Qh Qd
// Board:    -
// Samples:  100000
// Win:      43.39%
// Tie:      0.45%
// Elapsed:  0.142s
// ```
use clap::Parser;
use std::time::Instant;

use evtracker_eval::{Card, Estimator, format_cards, parse_cards};

#[derive(Debug, Parser)]
struct Cli {
    /// The hero hole cards.
    #[clap(long)]
    hero: String,
    /// Villain hole cards, repeat for multiway pots.
    #[clap(long, required = true)]
    villain: Vec<String>,
    /// Known board cards.
    #[clap(long, default_value = "")]
    board: String,
    /// Monte Carlo samples.
    #[clap(long, short, default_value_t = 100_000)]
    samples: usize,
    /// Random seed.
    #[clap(long)]
    seed: Option<u64>,
}

fn hole_cards(s: &str) -> Result<[Card; 2], String> {
    match parse_cards(s).as_slice() {
        [c1, c2] => Ok([*c1, *c2]),
        _ => Err(format!("Invalid hole cards '{s}'")),
    }
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();

    let hero = hole_cards(&cli.hero)?;
    let villains = cli
        .villain
        .iter()
        .map(|v| hole_cards(v))
        .collect::<Result<Vec<_>, _>>()?;
    let board = parse_cards(&cli.board);

    let now = Instant::now();
    let estimator = Estimator::new(&hero, &villains, &board);
    let equity = match cli.seed {
        Some(seed) => estimator.seeded(cli.samples, seed),
        None => estimator.estimate(cli.samples),
    }
    .map_err(|e| e.to_string())?;

    let villains = villains
        .iter()
        .map(|v| format_cards(v))
        .collect::<Vec<_>>()
        .join(", ");

    println!("Hero:     {}", format_cards(&hero));
    println!("Villains: {villains}");
    if board.is_empty() {
        println!("Board:    -");
    } else {
        println!("Board:    {}", format_cards(&board));
    }
    println!("Samples:  {}", equity.samples);
    println!("Win:      {:.2}%", equity.win * 100.0);
    println!("Tie:      {:.2}%", equity.tie * 100.0);
    println!("Elapsed:  {:.3}s", now.elapsed().as_secs_f64());

    Ok(())
}
