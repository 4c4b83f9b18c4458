//! Phase-dependent fetch policy: which remote data a new snapshot requires and how it lands in
//! the local view.

use crate::{
    remote::{RemoteError, RemoteGameService},
    state::{
        GameView,
        game::{GameSnapshot, Phase, PreviousMovieReveal, Scoreboard},
    },
};

/// Transition implied by a freshly fetched snapshot, one variant per policy row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    /// Lobby before the first movie.
    Init,
    /// First movie of the game (`phase_number == 0`).
    FirstMovie,
    /// Any later movie; standings did not move since the last pause.
    NextMovie,
    /// Reveal of the movie that was just played.
    Pause,
    /// Final standings.
    End,
}

/// Remote reads a transition needs before it can be committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredFetches {
    pub scoreboard: bool,
    pub previous_movie: bool,
}

/// How the previous-movie reveal changes when an effect is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealUpdate {
    Keep,
    Clear,
    Replace(PreviousMovieReveal),
}

/// State change produced by a resolved transition, applied as a single commit.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEffect {
    pub scoreboard: Option<Scoreboard>,
    pub previous_movie: RevealUpdate,
}

impl PhaseTransition {
    /// Classify a snapshot.
    pub fn for_snapshot(snapshot: &GameSnapshot) -> Self {
        match snapshot.phase {
            Phase::Init => PhaseTransition::Init,
            Phase::Movie if snapshot.phase_number == 0 => PhaseTransition::FirstMovie,
            Phase::Movie => PhaseTransition::NextMovie,
            Phase::Pause => PhaseTransition::Pause,
            Phase::End => PhaseTransition::End,
        }
    }

    pub fn required_fetches(&self) -> RequiredFetches {
        match self {
            PhaseTransition::Init | PhaseTransition::FirstMovie | PhaseTransition::End => {
                RequiredFetches {
                    scoreboard: true,
                    previous_movie: false,
                }
            }
            PhaseTransition::NextMovie => RequiredFetches::default(),
            PhaseTransition::Pause => RequiredFetches {
                scoreboard: true,
                previous_movie: true,
            },
        }
    }

    /// Perform the remote reads listed by [`Self::required_fetches`] and build the resulting
    /// effect.
    ///
    /// When both reads are needed they are issued concurrently and only produce an effect when
    /// both succeed, so the reveal and the scoreboard are never committed separately.
    pub async fn resolve(
        self,
        remote: &dyn RemoteGameService,
    ) -> Result<TransitionEffect, RemoteError> {
        let fetches = self.required_fetches();
        let (scoreboard, reveal) = match (fetches.scoreboard, fetches.previous_movie) {
            (true, true) => {
                let (reveal, scoreboard) =
                    tokio::try_join!(remote.fetch_previous_movie(), fetch_scoreboard(remote))?;
                (Some(scoreboard), Some(reveal))
            }
            (true, false) => (Some(fetch_scoreboard(remote).await?), None),
            (false, true) => (None, Some(remote.fetch_previous_movie().await?)),
            (false, false) => (None, None),
        };

        let previous_movie = match reveal {
            Some(reveal) => RevealUpdate::Replace(reveal.into()),
            None if self == PhaseTransition::Init => RevealUpdate::Keep,
            None => RevealUpdate::Clear,
        };

        Ok(TransitionEffect {
            scoreboard,
            previous_movie,
        })
    }
}

impl TransitionEffect {
    /// Write the effect into the view.
    pub fn apply(self, view: &mut GameView) {
        if let Some(scoreboard) = self.scoreboard {
            view.scoreboard = scoreboard;
        }

        match self.previous_movie {
            RevealUpdate::Keep => {}
            RevealUpdate::Clear => view.previous_movie = None,
            RevealUpdate::Replace(reveal) => view.previous_movie = Some(reveal),
        }
    }
}

/// Fetch the players list and order it for display.
pub async fn fetch_scoreboard(remote: &dyn RemoteGameService) -> Result<Scoreboard, RemoteError> {
    let players = remote.fetch_players().await?;
    Ok(players.into())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{FakeRemote, player, previous_movie};

    fn snapshot(phase: Phase, phase_number: u32) -> GameSnapshot {
        GameSnapshot {
            phase,
            duration_from_start: Duration::ZERO,
            duration_to_next_phase: Duration::from_secs(5),
            phase_number,
            total_phase: 10,
        }
    }

    fn reveal(title: &str) -> PreviousMovieReveal {
        previous_movie(title).into()
    }

    #[test]
    fn classifies_every_phase() {
        assert_eq!(
            PhaseTransition::for_snapshot(&snapshot(Phase::Init, 0)),
            PhaseTransition::Init
        );
        assert_eq!(
            PhaseTransition::for_snapshot(&snapshot(Phase::Movie, 0)),
            PhaseTransition::FirstMovie
        );
        assert_eq!(
            PhaseTransition::for_snapshot(&snapshot(Phase::Movie, 4)),
            PhaseTransition::NextMovie
        );
        assert_eq!(
            PhaseTransition::for_snapshot(&snapshot(Phase::Pause, 4)),
            PhaseTransition::Pause
        );
        assert_eq!(
            PhaseTransition::for_snapshot(&snapshot(Phase::End, 9)),
            PhaseTransition::End
        );
    }

    #[test]
    fn fetch_requirements_follow_the_phase() {
        let scoreboard_only = RequiredFetches {
            scoreboard: true,
            previous_movie: false,
        };
        assert_eq!(PhaseTransition::Init.required_fetches(), scoreboard_only);
        assert_eq!(PhaseTransition::FirstMovie.required_fetches(), scoreboard_only);
        assert_eq!(PhaseTransition::End.required_fetches(), scoreboard_only);
        assert_eq!(
            PhaseTransition::NextMovie.required_fetches(),
            RequiredFetches::default()
        );
        assert_eq!(
            PhaseTransition::Pause.required_fetches(),
            RequiredFetches {
                scoreboard: true,
                previous_movie: true,
            }
        );
    }

    #[test]
    fn init_effect_keeps_reveal() {
        let mut view = GameView {
            previous_movie: Some(reveal("Heat")),
            ..GameView::default()
        };
        let effect = TransitionEffect {
            scoreboard: Some(Scoreboard::from(vec![player("ana", 1)])),
            previous_movie: RevealUpdate::Keep,
        };

        effect.apply(&mut view);

        assert_eq!(view.previous_movie, Some(reveal("Heat")));
        assert_eq!(view.scoreboard.len(), 1);
    }

    #[test]
    fn clearing_effect_leaves_scoreboard_alone() {
        let scoreboard = Scoreboard::from(vec![player("ana", 1), player("bob", 2)]);
        let mut view = GameView {
            previous_movie: Some(reveal("Heat")),
            scoreboard: scoreboard.clone(),
            ..GameView::default()
        };
        let effect = TransitionEffect {
            scoreboard: None,
            previous_movie: RevealUpdate::Clear,
        };

        effect.apply(&mut view);

        assert_eq!(view.previous_movie, None);
        assert_eq!(view.scoreboard, scoreboard);
    }

    #[tokio::test]
    async fn next_movie_resolves_without_remote_reads() {
        let remote = FakeRemote::new();

        let effect = PhaseTransition::NextMovie.resolve(&remote).await.unwrap();

        assert_eq!(effect.scoreboard, None);
        assert_eq!(effect.previous_movie, RevealUpdate::Clear);
        assert_eq!(remote.calls().players, 0);
        assert_eq!(remote.calls().previous_movie, 0);
    }

    #[tokio::test]
    async fn resolve_reads_exactly_the_required_fetches() {
        for transition in [
            PhaseTransition::Init,
            PhaseTransition::FirstMovie,
            PhaseTransition::NextMovie,
            PhaseTransition::Pause,
            PhaseTransition::End,
        ] {
            let remote = FakeRemote::new();
            remote.set_players(vec![player("ana", 1)]);

            let effect = transition.resolve(&remote).await.unwrap();

            let fetches = transition.required_fetches();
            assert_eq!(remote.calls().players, usize::from(fetches.scoreboard), "{transition:?}");
            assert_eq!(
                remote.calls().previous_movie,
                usize::from(fetches.previous_movie),
                "{transition:?}"
            );
            assert_eq!(effect.scoreboard.is_some(), fetches.scoreboard, "{transition:?}");
            let expected_reveal = match transition {
                PhaseTransition::Init => RevealUpdate::Keep,
                PhaseTransition::Pause => RevealUpdate::Replace(reveal("Unknown")),
                _ => RevealUpdate::Clear,
            };
            assert_eq!(effect.previous_movie, expected_reveal, "{transition:?}");
        }
    }

    #[tokio::test]
    async fn pause_resolves_reveal_and_sorted_scoreboard() {
        let remote = FakeRemote::new();
        remote.set_players(vec![player("ana", 1), player("bob", 2)]);
        remote.set_previous_movie(previous_movie("Alien"));

        let effect = PhaseTransition::Pause.resolve(&remote).await.unwrap();

        assert_eq!(effect.previous_movie, RevealUpdate::Replace(reveal("Alien")));
        let scoreboard = effect.scoreboard.unwrap();
        assert_eq!(scoreboard.entries()[0].name, "bob");
        assert_eq!(remote.calls().players, 1);
        assert_eq!(remote.calls().previous_movie, 1);
    }

    #[tokio::test]
    async fn pause_fails_as_a_whole_when_one_read_fails() {
        let remote = FakeRemote::new();
        remote.set_players(vec![player("ana", 1)]);
        remote.fail_previous_movie(true);

        let result = PhaseTransition::Pause.resolve(&remote).await;

        assert!(result.is_err());
    }
}
