//! Scripted in-memory game service used by unit tests.

use std::{
    collections::VecDeque,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::sync::Notify;

use crate::{
    dto::{
        answer::{AnswerRequest, AnswerResponse},
        login::{LoginRequest, LoginResponse},
        movie::PreviousMovieResponse,
        phase::PhaseResponse,
        players::PlayerResponse,
    },
    remote::{RemoteError, RemoteGameService, RemoteResult},
};

const PHASE_ENDPOINT: &str = "game/phase";
const PLAYERS_ENDPOINT: &str = "game/players";
const PREVIOUS_MOVIE_ENDPOINT: &str = "game/previous-movie";

/// Build a phase payload with ten phases in total.
pub fn phase(name: &str, to_next_ms: u64, phase_number: u32) -> PhaseResponse {
    PhaseResponse {
        phase: name.into(),
        duration_from_start: Duration::from_millis(u64::from(phase_number) * 1_000),
        duration_to_next_phase: Duration::from_millis(to_next_ms),
        phase_number,
        total_phase: 10,
    }
}

pub fn player(name: &str, rank: i64) -> PlayerResponse {
    PlayerResponse {
        name: name.into(),
        rank,
        score: rank as f64 * 10.0,
        total_win: 0.0,
        answered: false,
        bonus: false,
    }
}

pub fn previous_movie(title: &str) -> PreviousMovieResponse {
    PreviousMovieResponse {
        title: title.into(),
        french_title: format!("{title} (VF)"),
        poster_url: format!("https://posters.example.org/{}.jpg", title.to_lowercase()),
    }
}

/// Number of calls received per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub phase: usize,
    pub players: usize,
    pub previous_movie: usize,
    pub answers: usize,
    pub logins: usize,
}

enum ScriptedPhase {
    Ok(PhaseResponse),
    Transport,
    Malformed,
}

#[derive(Default)]
struct Counters {
    phase: AtomicUsize,
    players: AtomicUsize,
    previous_movie: AtomicUsize,
    answers: AtomicUsize,
    logins: AtomicUsize,
}

#[derive(Default)]
struct FakeInner {
    phases: Mutex<VecDeque<ScriptedPhase>>,
    last_phase: Mutex<Option<PhaseResponse>>,
    players: Mutex<Vec<PlayerResponse>>,
    previous_movie: Mutex<Option<PreviousMovieResponse>>,
    answer_message: Mutex<Option<String>>,
    submitted: Mutex<Vec<String>>,
    fail_players: AtomicBool,
    fail_previous_movie: AtomicBool,
    fail_answers: AtomicBool,
    phase_gate: Mutex<Option<Arc<Notify>>>,
    players_gate: Mutex<Option<Arc<Notify>>>,
    counters: Counters,
}

/// In-memory [`RemoteGameService`] answering from a script.
///
/// Phase responses are consumed in order; once the script runs dry the last successful phase
/// is repeated.
#[derive(Clone, Default)]
pub struct FakeRemote {
    inner: Arc<FakeInner>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_phase(&self, phase: PhaseResponse) {
        self.script(ScriptedPhase::Ok(phase));
    }

    pub fn push_phase_failure(&self) {
        self.script(ScriptedPhase::Transport);
    }

    pub fn push_phase_malformed(&self) {
        self.script(ScriptedPhase::Malformed);
    }

    pub fn set_players(&self, players: Vec<PlayerResponse>) {
        *self.inner.players.lock().unwrap() = players;
    }

    pub fn set_previous_movie(&self, movie: PreviousMovieResponse) {
        *self.inner.previous_movie.lock().unwrap() = Some(movie);
    }

    pub fn set_answer_message(&self, message: &str) {
        *self.inner.answer_message.lock().unwrap() = Some(message.into());
    }

    pub fn fail_players(&self, fail: bool) {
        self.inner.fail_players.store(fail, Ordering::SeqCst);
    }

    pub fn fail_previous_movie(&self, fail: bool) {
        self.inner.fail_previous_movie.store(fail, Ordering::SeqCst);
    }

    pub fn fail_answers(&self, fail: bool) {
        self.inner.fail_answers.store(fail, Ordering::SeqCst);
    }

    /// Block phase fetches until the returned handle is notified.
    pub fn hold_phases(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.inner.phase_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Block players fetches until the returned handle is notified.
    pub fn hold_players(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.inner.players_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Calls {
        let counters = &self.inner.counters;
        Calls {
            phase: counters.phase.load(Ordering::SeqCst),
            players: counters.players.load(Ordering::SeqCst),
            previous_movie: counters.previous_movie.load(Ordering::SeqCst),
            answers: counters.answers.load(Ordering::SeqCst),
            logins: counters.logins.load(Ordering::SeqCst),
        }
    }

    /// Titles received by the answer endpoint, in order.
    pub fn submitted_answers(&self) -> Vec<String> {
        self.inner.submitted.lock().unwrap().clone()
    }

    fn script(&self, entry: ScriptedPhase) {
        self.inner.phases.lock().unwrap().push_back(entry);
    }

    fn next_phase(&self) -> RemoteResult<PhaseResponse> {
        let scripted = self.inner.phases.lock().unwrap().pop_front();
        match scripted {
            Some(ScriptedPhase::Ok(phase)) => {
                *self.inner.last_phase.lock().unwrap() = Some(phase.clone());
                Ok(phase)
            }
            Some(ScriptedPhase::Transport) => Err(RemoteError::transport(
                PHASE_ENDPOINT,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
            Some(ScriptedPhase::Malformed) => Err(RemoteError::malformed(
                PHASE_ENDPOINT,
                io::Error::new(io::ErrorKind::InvalidData, "missing field `phase`"),
            )),
            None => self.inner.last_phase.lock().unwrap().clone().ok_or_else(|| {
                RemoteError::transport(PHASE_ENDPOINT, io::Error::other("no phase scripted"))
            }),
        }
    }
}

async fn wait_for(gate: Option<Arc<Notify>>) {
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

impl RemoteGameService for FakeRemote {
    fn fetch_phase(&self) -> BoxFuture<'static, RemoteResult<PhaseResponse>> {
        self.inner.counters.phase.fetch_add(1, Ordering::SeqCst);
        let remote = self.clone();
        let gate = self.inner.phase_gate.lock().unwrap().clone();
        Box::pin(async move {
            wait_for(gate).await;
            remote.next_phase()
        })
    }

    fn fetch_players(&self) -> BoxFuture<'static, RemoteResult<Vec<PlayerResponse>>> {
        self.inner.counters.players.fetch_add(1, Ordering::SeqCst);
        let remote = self.clone();
        let gate = self.inner.players_gate.lock().unwrap().clone();
        Box::pin(async move {
            wait_for(gate).await;
            if remote.inner.fail_players.load(Ordering::SeqCst) {
                return Err(RemoteError::transport(
                    PLAYERS_ENDPOINT,
                    io::Error::new(io::ErrorKind::TimedOut, "timed out"),
                ));
            }
            Ok(remote.inner.players.lock().unwrap().clone())
        })
    }

    fn fetch_previous_movie(&self) -> BoxFuture<'static, RemoteResult<PreviousMovieResponse>> {
        self.inner.counters.previous_movie.fetch_add(1, Ordering::SeqCst);
        let remote = self.clone();
        Box::pin(async move {
            if remote.inner.fail_previous_movie.load(Ordering::SeqCst) {
                return Err(RemoteError::transport(
                    PREVIOUS_MOVIE_ENDPOINT,
                    io::Error::new(io::ErrorKind::TimedOut, "timed out"),
                ));
            }
            let movie = remote.inner.previous_movie.lock().unwrap().clone();
            Ok(movie.unwrap_or_else(|| previous_movie("Unknown")))
        })
    }

    fn submit_answer(
        &self,
        request: AnswerRequest,
    ) -> BoxFuture<'static, RemoteResult<AnswerResponse>> {
        self.inner.counters.answers.fetch_add(1, Ordering::SeqCst);
        let remote = self.clone();
        Box::pin(async move {
            if remote.inner.fail_answers.load(Ordering::SeqCst) {
                return Err(RemoteError::transport(
                    "game/answer",
                    io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"),
                ));
            }
            remote.inner.submitted.lock().unwrap().push(request.title);
            let message = remote
                .inner
                .answer_message
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| "ko".into());
            Ok(AnswerResponse { message })
        })
    }

    fn login(&self, request: LoginRequest) -> BoxFuture<'static, RemoteResult<LoginResponse>> {
        self.inner.counters.logins.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            Ok(LoginResponse {
                message: format!("welcome {}", request.username),
            })
        })
    }
}
