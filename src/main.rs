//! Movie quiz client binary: logs in, keeps the game view in sync and submits guesses read from
//! stdin.

use std::{sync::Arc, time::SystemTime};

use anyhow::Context;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_quiz_client::{
    config::ClientConfig,
    error::ServiceError,
    remote::{
        RemoteGameService,
        http::{HttpRemote, HttpRemoteConfig},
    },
    services::{
        answer_service::AnswerService, auth_service::AuthService, scheduler::PhaseScheduler,
    },
    state::{GameState, GameView, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::load();
    let http = HttpRemote::new(
        HttpRemoteConfig::new(&config.base_url).with_timeout(config.request_timeout),
    )
    .context("building HTTP client")?;
    info!(base_url = %config.base_url, stream = %http.current_movie_url(), "connecting to game service");
    let remote: Arc<dyn RemoteGameService> = Arc::new(http);

    let auth = AuthService::new(Arc::clone(&remote));
    if let Some(username) = config.username.as_deref() {
        auth.login(username).await.context("logging in")?;
    }

    let state = GameState::new();
    tokio::spawn(log_updates(Arc::clone(&state)));

    let scheduler = PhaseScheduler::new(Arc::clone(&remote), Arc::clone(&state), config.scheduler);
    scheduler
        .start()
        .await
        .context("starting game synchronization")?;

    let answers = AnswerService::new(remote, state);
    run_until_shutdown(
        &answers,
        BufReader::new(tokio::io::stdin()),
        shutdown_signal(),
    )
    .await
    .context("reading guesses")?;

    scheduler.stop().await;
    auth.logout();
    Ok(())
}

/// Submit guesses read from `input` until `shutdown` resolves.
///
/// A closed input only ends guessing; synchronization keeps running until shutdown.
async fn run_until_shutdown<R>(
    answers: &AnswerService,
    input: R,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    tokio::pin!(shutdown);
    tokio::select! {
        result = read_guesses(answers, input) => {
            result?;
            info!("stdin closed; syncing until shutdown");
            shutdown.await;
        }
        () = &mut shutdown => {}
    }
    info!("shutdown requested");
    Ok(())
}

/// Submit every non-empty line as a guess until the input closes.
async fn read_guesses<R>(answers: &AnswerService, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match answers.guess(&line).await {
            Ok(verdict) => info!(guess = %line.trim(), verdict = verdict.message(), "answer checked"),
            Err(ServiceError::InvalidInput(reason)) => warn!(%reason, "guess rejected"),
            Err(err) => error!(error = %err, "failed to submit guess"),
        }
    }
    Ok(())
}

/// Log the interesting parts of every view change.
async fn log_updates(state: SharedState) {
    let mut updates = state.updates();
    let mut previous = GameView::default();

    while let Some(view) = updates.next().await {
        if view.current_snapshot != previous.current_snapshot {
            if let Some(snapshot) = &view.current_snapshot {
                info!(
                    phase = %snapshot.phase,
                    phase_number = snapshot.phase_number,
                    total_phase = snapshot.total_phase,
                    next_in = ?snapshot.duration_to_next_phase,
                    "phase update"
                );
            }
        }

        if view.previous_movie != previous.previous_movie {
            if let Some(movie) = &view.previous_movie {
                info!(title = %movie.title, french_title = %movie.french_title, poster = %movie.poster_url, "previous movie revealed");
            }
        }

        if view.scoreboard != previous.scoreboard {
            for entry in view.scoreboard.entries() {
                info!(
                    rank = entry.rank,
                    name = %entry.name,
                    score = entry.score,
                    total_win = entry.total_win,
                    answered = entry.answered,
                    "scoreboard"
                );
            }
        }

        if view.last_failure != previous.last_failure {
            if let Some(failure) = &view.last_failure {
                warn!(
                    kind = ?failure.kind,
                    at = %format_system_time(failure.occurred_at),
                    message = %failure.message,
                    "synchronization degraded"
                );
            }
        }

        if view.status != previous.status {
            info!(status = ?view.status, "synchronization status changed");
        }

        previous = view;
    }
}

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,movie_quiz_client=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
