/// Answer submission and the follow-up scoreboard refresh.
pub mod answer_service;
/// Login session of the local player.
pub mod auth_service;
/// Phase polling loop.
pub mod scheduler;
