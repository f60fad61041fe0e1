// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Hand history import.
use log::info;
use std::path::Path;
use thiserror::Error;

use evtracker_core::{HandRepository, parse};

/// Import errors.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The text has no hands.
    #[error("no hands found in {0}")]
    NoHands(String),
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// The file path.
        path: String,
        /// The read error.
        source: std::io::Error,
    },
}

/// What an import added to the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of tournaments.
    pub tournaments: usize,
    /// Number of hands.
    pub hands: usize,
}

/// Parses a hand history text and stores its tournaments.
///
/// Stored tournaments with the same game id are replaced, a text with no
/// hands is an error and leaves the repository unchanged.
pub fn import_text<R>(repo: &mut R, source: &str, text: &str) -> Result<ImportSummary, ImportError>
where
    R: HandRepository + ?Sized,
{
    let output = parse(text);
    let hands = output.hand_count();
    if hands == 0 {
        return Err(ImportError::NoHands(source.to_string()));
    }

    let tournaments = output.tournaments.len();
    for tournament in output.tournaments {
        repo.replace_tournament(tournament);
    }

    info!("Imported {tournaments} tournaments with {hands} hands from {source}");

    Ok(ImportSummary { tournaments, hands })
}

/// Reads and imports a hand history file.
pub async fn import_file<R>(repo: &mut R, path: &Path) -> Result<ImportSummary, ImportError>
where
    R: HandRepository + ?Sized,
{
    let source = path.display().to_string();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source_err| ImportError::Read {
            path: source.clone(),
            source: source_err,
        })?;

    import_text(repo, &source, &text)
}
