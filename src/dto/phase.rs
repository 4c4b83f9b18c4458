use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, formats::Flexible, serde_as};

/// Payload returned by `GET /game/phase`.
///
/// `phase` stays a raw string here; it is only narrowed to a known phase when the payload is
/// turned into a snapshot, so an unexpected value can be reported verbatim.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResponse {
    pub phase: String,
    /// Time elapsed since the game started (milliseconds on the wire).
    #[serde_as(as = "DurationMilliSeconds<f64, Flexible>")]
    pub duration_from_start: Duration,
    /// Time left before the server moves to the next phase (milliseconds on the wire).
    #[serde_as(as = "DurationMilliSeconds<f64, Flexible>")]
    pub duration_to_next_phase: Duration,
    pub phase_number: u32,
    pub total_phase: u32,
}
