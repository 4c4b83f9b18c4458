use serde::{Deserialize, Serialize};

/// Payload returned by `GET /game/previous-movie`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousMovieResponse {
    pub title: String,
    pub french_title: String,
    pub poster_url: String,
}
