use std::{fmt, time::Duration};

use thiserror::Error;

use crate::dto::{movie::PreviousMovieResponse, phase::PhaseResponse, players::PlayerResponse};

/// Discrete stage of a game round as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Players are gathering before the first movie.
    Init,
    /// A movie is being played and guesses are open.
    Movie,
    /// Break between two movies; the previous answer is revealed.
    Pause,
    /// Final standings.
    End,
}

impl Phase {
    /// Parse the wire representation of a phase.
    ///
    /// The service sends `INIT_PHASE`-style names; the bare names are accepted as well.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "INIT_PHASE" | "INIT" => Some(Phase::Init),
            "MOVIE_PHASE" | "MOVIE" => Some(Phase::Movie),
            "PAUSE_PHASE" | "PAUSE" => Some(Phase::Pause),
            "END_PHASE" | "END" => Some(Phase::End),
            _ => None,
        }
    }

    /// Canonical wire name for this phase.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Phase::Init => "INIT_PHASE",
            Phase::Movie => "MOVIE_PHASE",
            Phase::Pause => "PAUSE_PHASE",
            Phase::End => "END_PHASE",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Error returned when the server reports a phase outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game phase `{phase}`")]
pub struct UnknownPhase {
    /// Raw value received from the server.
    pub phase: String,
}

/// A single fetched description of the current phase and its timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub duration_from_start: Duration,
    /// Server-reported delay before the next phase starts; drives the refresh cadence.
    pub duration_to_next_phase: Duration,
    /// Zero-based index of the current phase within the game.
    pub phase_number: u32,
    pub total_phase: u32,
}

impl TryFrom<PhaseResponse> for GameSnapshot {
    type Error = UnknownPhase;

    fn try_from(value: PhaseResponse) -> Result<Self, Self::Error> {
        let phase = Phase::from_wire(&value.phase).ok_or(UnknownPhase { phase: value.phase })?;

        Ok(Self {
            phase,
            duration_from_start: value.duration_from_start,
            duration_to_next_phase: value.duration_to_next_phase,
            phase_number: value.phase_number,
            total_phase: value.total_phase,
        })
    }
}

/// Standing of one player.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardEntry {
    pub name: String,
    pub rank: i64,
    pub score: f64,
    pub total_win: f64,
    pub answered: bool,
    pub bonus: bool,
}

impl From<PlayerResponse> for ScoreboardEntry {
    fn from(value: PlayerResponse) -> Self {
        Self {
            name: value.name,
            rank: value.rank,
            score: value.score,
            total_win: value.total_win,
            answered: value.answered,
            bonus: value.bonus,
        }
    }
}

/// Player standings ordered by descending rank.
///
/// The ordering is established on construction, whatever order the server used. Entries
/// sharing a rank keep their relative server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scoreboard(Vec<ScoreboardEntry>);

impl Scoreboard {
    /// Build a scoreboard, sorting the entries by descending rank.
    pub fn new(mut entries: Vec<ScoreboardEntry>) -> Self {
        entries.sort_by(|a, b| b.rank.cmp(&a.rank));
        Self(entries)
    }

    pub fn entries(&self) -> &[ScoreboardEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<PlayerResponse>> for Scoreboard {
    fn from(value: Vec<PlayerResponse>) -> Self {
        Self::new(value.into_iter().map(Into::into).collect())
    }
}

/// Metadata of the movie that was just guessed, shown during the pause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousMovieReveal {
    pub title: String,
    pub french_title: String,
    pub poster_url: String,
}

impl From<PreviousMovieResponse> for PreviousMovieReveal {
    fn from(value: PreviousMovieResponse) -> Self {
        Self {
            title: value.title,
            french_title: value.french_title,
            poster_url: value.poster_url,
        }
    }
}
