//! Leaderboard entries and the ranking rules applied on every read.

use std::cmp::Ordering;

use thiserror::Error;
use time::OffsetDateTime;

/// Number of rows highlighted on the podium.
pub const PODIUM_SIZE: usize = 3;

/// A finished attempt as stored on the leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    /// Trimmed, non-empty player name.
    pub player_name: String,
    /// Number of correct answers.
    pub score: u32,
    /// Time spent on the quiz, when known.
    pub duration_seconds: Option<f64>,
    /// When the score was submitted (UTC).
    pub submitted_at: OffsetDateTime,
}

/// Reasons a score cannot be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidScoreEntry {
    /// The player name is empty once trimmed.
    #[error("player name must not be empty")]
    EmptyName,
    /// The duration is negative or not a finite number.
    #[error("duration must be a finite, non-negative number of seconds")]
    InvalidDuration,
}

impl ScoreEntry {
    /// Validate and build a new entry, trimming the player name.
    pub fn new(
        player_name: &str,
        score: u32,
        duration_seconds: Option<f64>,
        submitted_at: OffsetDateTime,
    ) -> Result<Self, InvalidScoreEntry> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(InvalidScoreEntry::EmptyName);
        }

        if let Some(duration) = duration_seconds {
            if !duration.is_finite() || duration < 0.0 {
                return Err(InvalidScoreEntry::InvalidDuration);
            }
        }

        Ok(Self {
            player_name: player_name.to_string(),
            score,
            duration_seconds,
            submitted_at,
        })
    }
}

/// An entry with its dense rank for the current read.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    /// 1-based dense rank.
    pub rank: u32,
    /// The ranked entry.
    pub entry: ScoreEntry,
}

/// Leaderboard order: higher score first, then shorter duration (entries without a duration
/// after every entry that has one), then earlier submission.
pub fn compare_entries(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| compare_durations(a.duration_seconds, b.duration_seconds))
        .then_with(|| a.submitted_at.cmp(&b.submitted_at))
}

fn compare_durations(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort `entries` and assign dense ranks.
///
/// Rows sharing a score share a rank and the next score gets the following rank, with no
/// gaps. Duration and submission time only order rows inside a rank.
pub fn rank_entries(mut entries: Vec<ScoreEntry>) -> Vec<RankedEntry> {
    entries.sort_by(compare_entries);

    let mut rank = 0;
    let mut previous_score = None;
    entries
        .into_iter()
        .map(|entry| {
            if previous_score != Some(entry.score) {
                rank += 1;
                previous_score = Some(entry.score);
            }
            RankedEntry { rank, entry }
        })
        .collect()
}

/// Rank every entry and keep at most `limit` rows.
pub fn list_ranked(entries: Vec<ScoreEntry>, limit: usize) -> Vec<RankedEntry> {
    let mut ranked = rank_entries(entries);
    ranked.truncate(limit);
    ranked
}

/// Personal best of `player_name`: their own entries ranked among themselves, rank-1 row.
pub fn best_for(entries: Vec<ScoreEntry>, player_name: &str) -> Option<RankedEntry> {
    let player_name = player_name.trim();
    let own = entries
        .into_iter()
        .filter(|entry| entry.player_name == player_name)
        .collect();
    rank_entries(own).into_iter().next()
}

/// Rows shown on the podium.
pub fn podium(ranked: &[RankedEntry]) -> &[RankedEntry] {
    &ranked[..ranked.len().min(PODIUM_SIZE)]
}
