use serde::{Deserialize, Serialize};

/// One scoreboard row as returned by `GET /game/players`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub name: String,
    pub rank: i64,
    pub score: f64,
    pub total_win: f64,
    /// Whether the player already answered the current movie.
    pub answered: bool,
    /// Whether the player earned the bonus for the current movie.
    pub bonus: bool,
}
