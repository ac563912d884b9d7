//! CSV export of ranked standings.

use crate::models::PlayerWithTieBreakers;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const HEADER: [&str; 8] = ["rank", "name", "match_points", "wins", "losses", "draws", "omw", "oomw"];

#[derive(Serialize)]
struct StandingRow<'a> {
    rank: usize,
    name: &'a str,
    match_points: u32,
    wins: u32,
    losses: u32,
    draws: u32,
    omw: String,
    oomw: String,
}

/// One row per player in the given (already ranked) order; percentages with 2 decimals.
pub fn standings_csv(ranked: &[PlayerWithTieBreakers]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for (i, p) in ranked.iter().enumerate() {
        wtr.serialize(StandingRow {
            rank: i + 1,
            name: &p.standing.name,
            match_points: p.standing.match_points,
            wins: p.standing.wins,
            losses: p.standing.losses,
            draws: p.standing.draws,
            omw: format!("{:.2}", p.opponent_match_win_percentage * 100.0),
            oomw: format!("{:.2}", p.opponent_opponent_match_win_percentage * 100.0),
        })?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
